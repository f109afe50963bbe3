//! 记事本格式表
//!
//! 已知格式是封闭集合，按名称查表得到对应的解析方式。

use phf::phf_map;
use std::fmt;
use tracing::warn;

use crate::error::NotFoundError;
use crate::models::Submission;
use crate::services::submission_parser;

/// 记事本内容格式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NotepadFormat {
    /// Kontr 自动写入的功能分
    #[default]
    Kontr,
}

static FORMATS: phf::Map<&'static str, NotepadFormat> = phf_map! {
    "default" => NotepadFormat::Kontr,
    "kontr" => NotepadFormat::Kontr,
};

impl NotepadFormat {
    /// 按名称查找格式
    pub fn from_name(name: &str) -> Result<Self, NotFoundError> {
        let key = name.trim().to_ascii_lowercase();
        FORMATS
            .get(key.as_str())
            .copied()
            .ok_or_else(|| NotFoundError::Parser {
                name: name.to_string(),
            })
    }

    /// 按名称查找，未知或为空时使用默认格式
    pub fn get_or_default(name: &str) -> Self {
        if name.trim().is_empty() {
            return Self::default();
        }
        Self::from_name(name).unwrap_or_else(|e| {
            warn!(
                "{}, 可用: {}, 使用默认解析器",
                e,
                Self::known_names().join(", ")
            );
            Self::default()
        })
    }

    /// 所有已注册的名称
    pub fn known_names() -> Vec<&'static str> {
        let mut names: Vec<&'static str> = FORMATS.keys().copied().collect();
        names.sort_unstable();
        names
    }

    pub fn name(self) -> &'static str {
        match self {
            NotepadFormat::Kontr => "kontr",
        }
    }

    /// 解析一个学生的记事本文本
    pub fn parse(self, content: &str) -> Vec<Submission> {
        match self {
            NotepadFormat::Kontr => submission_parser::parse_kontr_content(content),
        }
    }
}

impl fmt::Display for NotepadFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
