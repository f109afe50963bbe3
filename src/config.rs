use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::{AppResult, ConfigError};

/// 默认配置文件（相对 $HOME）
const DEFAULT_CONFIG_PATH: &str = ".config/notepad-stats/config.toml";

/// 程序配置文件
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// 记事本服务配置
    pub muni: MuniConfig,
    /// 记事本格式名称
    pub parser: String,
    /// 结果目录，为空时使用当前目录
    pub results: Option<PathBuf>,
    /// 不发送请求
    pub dry_run: bool,
    /// 额外写入不带时间戳的副本
    pub without_timestamp: bool,
    /// 学生注册表文件
    pub students_register: Option<PathBuf>,
    /// 日志级别
    pub log_level: Option<String>,
}

/// 记事本服务配置
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct MuniConfig {
    pub url: String,
    pub token: String,
    pub course: String,
    pub faculty_id: u32,
}

impl Default for MuniConfig {
    fn default() -> Self {
        Self {
            url: "https://is.muni.cz".to_string(),
            token: String::new(),
            course: String::new(),
            faculty_id: 0,
        }
    }
}

impl Config {
    /// 加载配置：默认值 → 配置文件 → 环境变量
    ///
    /// # 参数
    /// - `path`: 显式指定的配置文件，不存在时报错；
    ///   未指定时尝试默认位置，不存在则跳过
    pub fn load(path: Option<&Path>) -> AppResult<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => match default_config_path().filter(|p| p.is_file()) {
                Some(path) => Self::from_file(&path)?,
                None => Self::default(),
            },
        };
        config.apply_env(|name| std::env::var(name).ok())?;
        Ok(config)
    }

    /// 从 TOML 文件读取
    pub fn from_file(path: &Path) -> AppResult<Self> {
        debug!("读取配置文件: {}", path.display());
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::ReadFailed {
            path: path.to_path_buf(),
            source,
        })?;
        let config = toml::from_str(&content).map_err(|source| ConfigError::TomlParseFailed {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(config)
    }

    /// 用环境变量覆盖配置
    ///
    /// # 参数
    /// - `lookup`: 变量查找函数
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup("MUNI_URL") {
            self.muni.url = v;
        }
        if let Some(v) = lookup("MUNI_TOKEN") {
            self.muni.token = v;
        }
        if let Some(v) = lookup("MUNI_COURSE") {
            self.muni.course = v;
        }
        if let Some(v) = lookup("MUNI_FACULTY_ID") {
            self.muni.faculty_id = parse_env("MUNI_FACULTY_ID", v, "u32")?;
        }
        if let Some(v) = lookup("RESULTS_DIR") {
            self.results = Some(PathBuf::from(v));
        }
        if let Some(v) = lookup("NOTEPAD_PARSER") {
            self.parser = v;
        }
        if let Some(v) = lookup("DRY_RUN") {
            self.dry_run = parse_env("DRY_RUN", v, "bool")?;
        }
        if let Some(v) = lookup("STUDENTS_REGISTER") {
            self.students_register = Some(PathBuf::from(v));
        }
        if let Some(v) = lookup("LOG_LEVEL") {
            self.log_level = Some(v);
        }
        Ok(())
    }
}

fn parse_env<T: std::str::FromStr>(
    var_name: &str,
    value: String,
    expected_type: &'static str,
) -> Result<T, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::EnvVarParseFailed {
            var_name: var_name.to_string(),
            value,
            expected_type,
        })
}

fn default_config_path() -> Option<PathBuf> {
    std::env::var_os("HOME").map(|home| PathBuf::from(home).join(DEFAULT_CONFIG_PATH))
}
