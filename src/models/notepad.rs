use serde::{Deserialize, Serialize};

use crate::error::{AppResult, DecodeError};

/// 记事本导出的完整内容
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NotepadContent {
    #[serde(rename = "STUDENT", default)]
    pub students: Vec<StudentContent>,
}

/// 记事本中一个学生的条目
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StudentContent {
    /// 记事本文本
    #[serde(rename = "OBSAH", default)]
    pub content: String,
    /// 学生外部代码
    #[serde(rename = "UCO", default)]
    pub code: String,
    #[serde(rename = "ZMENIL", default)]
    pub changed_by: String,
}

impl NotepadContent {
    /// 解析记事本 XML，内容必须是 UTF-8
    pub fn from_xml(data: &[u8]) -> AppResult<Self> {
        let text = std::str::from_utf8(data).map_err(DecodeError::from)?;
        Ok(quick_xml::de::from_str(text)?)
    }
}
