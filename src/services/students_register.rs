//! 学生身份注册表
//!
//! 外部学生代码 → 内部 UUID，只增不减；可导出/导入以在多次运行间保持稳定。

use std::collections::HashMap;
use std::fs;
use std::path::Path;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{AppError, AppResult, NotFoundError};

/// 学生身份注册表
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StudentsRegister {
    users: HashMap<String, Uuid>,
}

impl StudentsRegister {
    pub fn new() -> Self {
        Self::default()
    }

    /// 显式登记一个映射（覆盖已有值）
    pub fn register(&mut self, code: impl Into<String>, id: Uuid) {
        self.users.insert(code.into(), id);
    }

    /// 获取已有标识，不存在时生成新的并登记
    pub fn resolve_or_create(&mut self, code: &str) -> Uuid {
        if let Some(id) = self.users.get(code) {
            return *id;
        }
        let id = Uuid::new_v4();
        debug!("登记新学生 {} -> {}", code, id);
        self.users.insert(code.to_string(), id);
        id
    }

    /// 只读查找
    pub fn lookup(&self, code: &str) -> Result<Uuid, NotFoundError> {
        self.users
            .get(code)
            .copied()
            .ok_or_else(|| NotFoundError::Student {
                code: code.to_string(),
            })
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }

    /// 导出为 JSON 文件
    ///
    /// # 参数
    /// - `path`: 目标文件路径
    pub fn export_to(&self, path: &Path) -> AppResult<()> {
        let content = serde_json::to_vec_pretty(&self.users)?;
        fs::write(path, content).map_err(|e| AppError::file_write_failed(path, e))?;
        info!("已导出 {} 个学生到 {}", self.users.len(), path.display());
        Ok(())
    }

    /// 从 JSON 文件导入，与现有映射合并
    ///
    /// # 参数
    /// - `path`: 源文件路径
    ///
    /// # 返回
    /// 返回导入的条目数
    pub fn import_from(&mut self, path: &Path) -> AppResult<usize> {
        let content = fs::read(path).map_err(|e| AppError::file_read_failed(path, e))?;
        let users: HashMap<String, Uuid> = serde_json::from_slice(&content)?;
        let count = users.len();
        self.users.extend(users);
        info!("已从 {} 导入 {} 个学生", path.display(), count);
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_code_same_identity() {
        let mut register = StudentsRegister::new();
        let first = register.resolve_or_create("123456");
        let second = register.resolve_or_create("123456");
        assert_eq!(first, second);
        assert_eq!(register.len(), 1);
    }

    #[test]
    fn different_codes_differ() {
        let mut register = StudentsRegister::new();
        let a = register.resolve_or_create("1");
        let b = register.resolve_or_create("2");
        assert_ne!(a, b);
    }

    #[test]
    fn lookup_missing_code() {
        let register = StudentsRegister::new();
        assert!(matches!(
            register.lookup("404"),
            Err(NotFoundError::Student { .. })
        ));
    }

    #[test]
    fn explicit_registration_is_resolved() {
        let mut register = StudentsRegister::new();
        let id = Uuid::new_v4();
        register.register("42", id);
        assert_eq!(register.resolve_or_create("42"), id);
        assert_eq!(register.lookup("42").unwrap(), id);
    }

    #[test]
    fn export_then_import_keeps_identities() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("students.json");

        let mut register = StudentsRegister::new();
        let id = register.resolve_or_create("777");
        register.export_to(&path).unwrap();

        let mut restored = StudentsRegister::new();
        restored.resolve_or_create("888");
        assert_eq!(restored.import_from(&path).unwrap(), 1);
        assert_eq!(restored.lookup("777").unwrap(), id);
        assert_eq!(restored.len(), 2);
    }

    #[test]
    fn import_missing_file_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let mut register = StudentsRegister::new();
        let err = register.import_from(&dir.path().join("nope.json")).unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }
}
