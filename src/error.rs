use std::path::PathBuf;
use thiserror::Error;

/// 应用程序错误类型
#[derive(Debug, Error)]
pub enum AppError {
    /// 记事本文本语法错误（可恢复）
    #[error("语法错误: {0}")]
    Grammar(#[from] GrammarError),
    /// 查找失败
    #[error("未找到: {0}")]
    NotFound(#[from] NotFoundError),
    /// 文件操作错误
    #[error("文件错误: {0}")]
    File(#[from] FileError),
    /// API 调用错误
    #[error("API错误: {0}")]
    Api(#[from] ApiError),
    /// 结果文件名格式错误
    #[error("格式错误: {0}")]
    Format(#[from] FormatError),
    /// XML / JSON / CSV 解码错误
    #[error("解码错误: {0}")]
    Decode(#[from] DecodeError),
    /// 配置错误
    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),
}

/// 提交记录行的语法错误
#[derive(Debug, Error)]
pub enum GrammarError {
    /// 字段数量不足
    #[error("字段不足 - 找到 {found} 个, 无法解析 {missing}")]
    InsufficientFields { found: usize, missing: &'static str },
    /// 序号不是整数
    #[error("无效的序号 '{token}': {source}")]
    InvalidIndex {
        token: String,
        source: std::num::ParseIntError,
    },
    /// 日期时间格式错误
    #[error("无效的日期时间 '{value}': {source}")]
    InvalidDateTime {
        value: String,
        source: chrono::ParseError,
    },
    /// 数值格式错误
    #[error("无效的数值 '{token}': {source}")]
    InvalidNumber {
        token: String,
        source: std::num::ParseFloatError,
    },
    /// 数值不是有限值（nan / inf）
    #[error("数值必须为有限值: '{token}'")]
    NonFiniteNumber { token: String },
}

/// 查找失败
#[derive(Debug, Error)]
pub enum NotFoundError {
    /// 学生代码未注册
    #[error("学生代码未注册: {code}")]
    Student { code: String },
    /// 结果文件不存在
    #[error("文件不存在: {}", path.display())]
    File { path: PathBuf },
    /// 解析器名称未知
    #[error("未知的解析器: {name}")]
    Parser { name: String },
}

/// 文件操作错误
#[derive(Debug, Error)]
pub enum FileError {
    /// 读取文件失败
    #[error("读取文件失败 ({}): {source}", path.display())]
    ReadFailed {
        path: PathBuf,
        source: std::io::Error,
    },
    /// 写入文件失败
    #[error("写入文件失败 ({}): {source}", path.display())]
    WriteFailed {
        path: PathBuf,
        source: std::io::Error,
    },
    /// 删除文件失败
    #[error("删除文件失败 ({}): {source}", path.display())]
    DeleteFailed {
        path: PathBuf,
        source: std::io::Error,
    },
    /// 创建目录失败
    #[error("创建目录失败 ({}): {source}", path.display())]
    CreateDirFailed {
        path: PathBuf,
        source: std::io::Error,
    },
    /// glob 模式无效
    #[error("无效的匹配模式 '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        source: glob::PatternError,
    },
    /// 模式不是结果目录内的文件名模式
    #[error("匹配模式只能是文件名: '{pattern}'")]
    PatternOutsideRoot { pattern: String },
}

/// API 调用错误
#[derive(Debug, Error)]
pub enum ApiError {
    /// 网络请求失败
    #[error("API请求失败 ({endpoint}): {source}")]
    RequestFailed {
        endpoint: String,
        source: reqwest::Error,
    },
    /// 非 2xx 状态码
    #[error("API返回错误状态 ({endpoint}): {status}")]
    BadStatus { endpoint: String, status: u16 },
    /// 读取响应体失败
    #[error("读取响应体失败 ({endpoint}): {source}")]
    BodyReadFailed {
        endpoint: String,
        source: reqwest::Error,
    },
}

/// 结果文件名格式错误
#[derive(Debug, Error)]
pub enum FormatError {
    /// 文件名不是 name.timestamp.ext 三段式
    #[error("文件名 '{file_name}' 应为三段, 实际 {found} 段")]
    SegmentCount { file_name: String, found: usize },
    /// 未知扩展名
    #[error("文件名 '{file_name}' 的扩展名未知: {extension}")]
    UnknownExtension {
        file_name: String,
        extension: String,
    },
    /// 时间戳格式错误
    #[error("文件名 '{file_name}' 的时间戳无效: {timestamp}")]
    InvalidTimestamp {
        file_name: String,
        timestamp: String,
    },
    /// 逻辑名称为空或包含分隔符
    #[error("无效的逻辑名称: '{name}'")]
    InvalidLogicalName { name: String },
}

/// 序列化协作者的解码错误
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("XML解析失败: {0}")]
    Xml(#[from] quick_xml::DeError),
    #[error("内容不是有效的 UTF-8: {0}")]
    Utf8(#[from] std::str::Utf8Error),
    #[error("JSON解析失败: {0}")]
    Json(#[from] serde_json::Error),
    #[error("CSV处理失败: {0}")]
    Csv(#[from] csv::Error),
}

/// 配置错误
#[derive(Debug, Error)]
pub enum ConfigError {
    /// 配置文件读取失败
    #[error("无法读取配置文件 ({}): {source}", path.display())]
    ReadFailed {
        path: PathBuf,
        source: std::io::Error,
    },
    /// TOML 解析失败
    #[error("TOML解析失败 ({}): {source}", path.display())]
    TomlParseFailed {
        path: PathBuf,
        source: toml::de::Error,
    },
    /// 环境变量解析失败
    #[error("环境变量 {var_name} 解析失败: 值 '{value}' 无法转换为 {expected_type}")]
    EnvVarParseFailed {
        var_name: String,
        value: String,
        expected_type: &'static str,
    },
}

// ========== 从常见错误类型转换 ==========

impl From<quick_xml::DeError> for AppError {
    fn from(err: quick_xml::DeError) -> Self {
        AppError::Decode(DecodeError::Xml(err))
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Decode(DecodeError::Json(err))
    }
}

impl From<csv::Error> for AppError {
    fn from(err: csv::Error) -> Self {
        AppError::Decode(DecodeError::Csv(err))
    }
}

// ========== 便捷构造函数 ==========

impl AppError {
    /// 创建文件读取错误；文件不存在时归类为 NotFound
    pub fn file_read_failed(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        if source.kind() == std::io::ErrorKind::NotFound {
            AppError::NotFound(NotFoundError::File { path })
        } else {
            AppError::File(FileError::ReadFailed { path, source })
        }
    }

    /// 创建文件写入错误
    pub fn file_write_failed(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        AppError::File(FileError::WriteFailed {
            path: path.into(),
            source,
        })
    }

    /// 创建API请求失败错误
    pub fn api_request_failed(endpoint: impl Into<String>, source: reqwest::Error) -> Self {
        AppError::Api(ApiError::RequestFailed {
            endpoint: endpoint.into(),
            source,
        })
    }
}

// ========== Result 类型别名 ==========

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;
