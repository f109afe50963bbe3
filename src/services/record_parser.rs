/// 记事本记录解析服务
///
/// 为每个学生分配稳定标识，并用选定的格式解析其记事本文本
use tracing::{debug, info, warn};

use crate::error::AppResult;
use crate::models::{NotepadContent, StudentRecord};
use crate::services::notepad_format::NotepadFormat;
use crate::services::students_register::StudentsRegister;
use crate::utils::logging::truncate_text;

/// 记录解析器
pub struct RecordParser {
    register: StudentsRegister,
    format: NotepadFormat,
}

impl RecordParser {
    pub fn new(register: StudentsRegister, format: NotepadFormat) -> Self {
        Self { register, format }
    }

    pub fn register(&self) -> &StudentsRegister {
        &self.register
    }

    /// 解析原始 XML 内容
    pub fn parse_xml(&mut self, data: &[u8]) -> AppResult<Vec<StudentRecord>> {
        let content = NotepadContent::from_xml(data)?;
        Ok(self.parse(&content))
    }

    /// 解析已解码的记事本内容
    ///
    /// 输出顺序与输入一致；每个学生都有一条记录，
    /// 即使其文本中没有可解析的提交
    pub fn parse(&mut self, content: &NotepadContent) -> Vec<StudentRecord> {
        let mut records = Vec::with_capacity(content.students.len());

        for student in &content.students {
            if student.code.trim().is_empty() {
                warn!(
                    "学生代码为空, 内容: {}",
                    truncate_text(student.content.trim(), 40)
                );
            }
            let id = self.register.resolve_or_create(student.code.trim());

            let mut record = StudentRecord::new(id);
            record.submissions = self.format.parse(&student.content);
            debug!(
                "学生 {} -> {}: {} 条提交",
                student.code,
                id,
                record.submissions.len()
            );
            records.push(record);
        }

        info!(
            "解析完成: {} 个学生 (格式: {})",
            records.len(),
            self.format
        );
        records
    }
}
