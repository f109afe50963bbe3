//! 结果文件的标识
//!
//! 文件名格式为 `name.timestamp.ext`，时间戳不含冒号以便作为文件名。

use regex::Regex;
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use crate::error::FormatError;

/// 时间戳格式（字典序即时间序）
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H-%M-%S";

/// 文件名字段分隔符
pub const FIELD_SEPARATOR: char = '.';

static TIMESTAMP_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\d{4}-\d{2}-\d{2}T\d{2}-\d{2}-\d{2}$").expect("timestamp regex is valid")
});

/// 获取当前时间戳
pub fn current_timestamp() -> String {
    chrono::Local::now().format(TIMESTAMP_FORMAT).to_string()
}

/// 时间戳是否符合文件名格式
pub fn is_valid_timestamp(timestamp: &str) -> bool {
    TIMESTAMP_RE.is_match(timestamp)
}

/// 结果文件扩展名
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Extension {
    Xml,
    Json,
    Csv,
}

impl Extension {
    pub fn as_str(self) -> &'static str {
        match self {
            Extension::Xml => "xml",
            Extension::Json => "json",
            Extension::Csv => "csv",
        }
    }
}

impl fmt::Display for Extension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Extension {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "xml" => Ok(Extension::Xml),
            "json" => Ok(Extension::Json),
            "csv" => Ok(Extension::Csv),
            _ => Err(()),
        }
    }
}

/// 结果存储中的一个条目
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultItem {
    /// 逻辑名称（如记事本代号）
    pub name: String,
    /// 为空表示尚未打时间戳
    pub timestamp: Option<String>,
    pub extension: Extension,
    /// 文件内容，仅列举时为空
    pub data: Option<Vec<u8>>,
}

impl ResultItem {
    /// 创建新的结果条目
    pub fn new(name: impl Into<String>, timestamp: impl Into<String>, extension: Extension) -> Self {
        Self {
            name: name.into(),
            timestamp: Some(timestamp.into()),
            extension,
            data: None,
        }
    }

    /// 创建尚未打时间戳的条目
    pub fn untimed(name: impl Into<String>, extension: Extension) -> Self {
        Self {
            name: name.into(),
            timestamp: None,
            extension,
            data: None,
        }
    }

    pub fn with_data(mut self, data: Vec<u8>) -> Self {
        self.data = Some(data);
        self
    }

    /// 同名同时间戳、不同格式的派生条目
    pub fn derive(&self, extension: Extension) -> Self {
        Self {
            name: self.name.clone(),
            timestamp: self.timestamp.clone(),
            extension,
            data: None,
        }
    }

    /// 编码为文件名
    ///
    /// 无时间戳时为 `name.ext`
    pub fn file_name(&self) -> String {
        match &self.timestamp {
            Some(timestamp) => format!(
                "{}{sep}{}{sep}{}",
                self.name,
                timestamp,
                self.extension,
                sep = FIELD_SEPARATOR
            ),
            None => format!("{}{}{}", self.name, FIELD_SEPARATOR, self.extension),
        }
    }

    /// 从文件名解码
    ///
    /// # 参数
    /// - `file_name`: 不含目录的文件名
    ///
    /// # 返回
    /// 必须恰好三段且扩展名、时间戳合法，否则返回 `FormatError`
    pub fn from_file_name(file_name: &str) -> Result<Self, FormatError> {
        let parts: Vec<&str> = file_name.split(FIELD_SEPARATOR).collect();
        if parts.len() != 3 {
            return Err(FormatError::SegmentCount {
                file_name: file_name.to_string(),
                found: parts.len(),
            });
        }

        let (name, timestamp, extension) = (parts[0], parts[1], parts[2]);
        if name.is_empty() {
            return Err(FormatError::InvalidLogicalName {
                name: name.to_string(),
            });
        }
        if !is_valid_timestamp(timestamp) {
            return Err(FormatError::InvalidTimestamp {
                file_name: file_name.to_string(),
                timestamp: timestamp.to_string(),
            });
        }
        let extension =
            Extension::from_str(extension).map_err(|_| FormatError::UnknownExtension {
                file_name: file_name.to_string(),
                extension: extension.to_string(),
            })?;

        Ok(Self::new(name, timestamp, extension))
    }

    /// 校验逻辑名称：非空，且不含字段分隔符或路径分隔符
    pub fn validate_name(&self) -> Result<(), FormatError> {
        let invalid = self.name.is_empty()
            || self
                .name
                .chars()
                .any(|c| c == FIELD_SEPARATOR || std::path::is_separator(c));
        if invalid {
            return Err(FormatError::InvalidLogicalName {
                name: self.name.clone(),
            });
        }
        Ok(())
    }

    /// 用于排序的时间戳，缺失时为空串
    pub fn timestamp_str(&self) -> &str {
        self.timestamp.as_deref().unwrap_or("")
    }
}

impl fmt::Display for ResultItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.file_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_name_round_trip() {
        let item = ResultItem::new("hw01", "2020-02-18T08-45-00", Extension::Json);
        assert_eq!(item.file_name(), "hw01.2020-02-18T08-45-00.json");
        assert_eq!(ResultItem::from_file_name(&item.file_name()).unwrap(), item);
    }

    #[test]
    fn untimed_item_has_two_segments() {
        let item = ResultItem::untimed("hw01", Extension::Csv);
        assert_eq!(item.file_name(), "hw01.csv");
        assert!(matches!(
            ResultItem::from_file_name("hw01.csv"),
            Err(FormatError::SegmentCount { found: 2, .. })
        ));
    }

    #[test]
    fn rejects_extra_segments() {
        assert!(matches!(
            ResultItem::from_file_name("a.b.2020-02-18T08-45-00.xml"),
            Err(FormatError::SegmentCount { found: 4, .. })
        ));
    }

    #[test]
    fn rejects_unknown_extension_and_bad_timestamp() {
        assert!(matches!(
            ResultItem::from_file_name("hw01.2020-02-18T08-45-00.txt"),
            Err(FormatError::UnknownExtension { .. })
        ));
        assert!(matches!(
            ResultItem::from_file_name("hw01.2020-02-18T08:45:00.xml"),
            Err(FormatError::SegmentCount { .. }) | Err(FormatError::InvalidTimestamp { .. })
        ));
        assert!(matches!(
            ResultItem::from_file_name("hw01.yesterday.xml"),
            Err(FormatError::InvalidTimestamp { .. })
        ));
    }

    #[test]
    fn name_validation() {
        assert!(ResultItem::untimed("hw01", Extension::Xml).validate_name().is_ok());
        assert!(ResultItem::untimed("hw.01", Extension::Xml).validate_name().is_err());
        assert!(ResultItem::untimed("a/b", Extension::Xml).validate_name().is_err());
        assert!(ResultItem::untimed("", Extension::Xml).validate_name().is_err());
    }

    #[test]
    fn current_timestamp_matches_format() {
        assert!(is_valid_timestamp(&current_timestamp()));
    }
}
