//! 版本化结果存储
//!
//! 扁平目录，每个结果一个文件，文件名为 `name.timestamp.ext`。
//! 写入即覆盖，不加锁。

use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, warn};

use crate::error::{AppError, AppResult, FileError};
use crate::models::{current_timestamp, ResultItem};
use crate::services::result_catalog;

/// 结果存储
#[derive(Debug, Clone)]
pub struct ResultStore {
    root: PathBuf,
    /// 是否额外写入不带时间戳的副本
    untimed_copies: bool,
}

/// 清理结果
#[derive(Debug, Default)]
pub struct PruneReport {
    pub removed: Vec<ResultItem>,
    pub failed: Vec<(ResultItem, AppError)>,
}

impl ResultStore {
    /// 创建结果存储，未指定目录时使用当前工作目录
    pub fn new(root: Option<PathBuf>) -> Self {
        let root = root.unwrap_or_else(|| {
            std::env::current_dir().unwrap_or_else(|e| {
                warn!("无法获取当前工作目录: {}", e);
                PathBuf::from(".")
            })
        });
        info!("结果目录: {}", root.display());
        Self {
            root,
            untimed_copies: false,
        }
    }

    pub fn with_untimed_copies(mut self, enabled: bool) -> Self {
        self.untimed_copies = enabled;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// 确保结果目录存在
    pub fn ensure_root(&self) -> AppResult<()> {
        fs::create_dir_all(&self.root).map_err(|source| {
            AppError::File(FileError::CreateDirFailed {
                path: self.root.clone(),
                source,
            })
        })
    }

    /// 条目对应的完整路径
    pub fn path_of(&self, item: &ResultItem) -> PathBuf {
        self.root.join(item.file_name())
    }

    /// 写入条目
    ///
    /// 未设置时间戳时使用当前时间；同名文件直接覆盖
    ///
    /// # 返回
    /// 返回写入的路径
    pub fn store(&self, item: &mut ResultItem) -> AppResult<PathBuf> {
        item.validate_name()?;
        if item.timestamp.is_none() {
            item.timestamp = Some(current_timestamp());
        }

        let path = self.write(item)?;
        if self.untimed_copies {
            self.store_without_timestamp(item)?;
        }
        Ok(path)
    }

    /// 以 `name.ext` 写入条目
    pub fn store_without_timestamp(&self, item: &ResultItem) -> AppResult<PathBuf> {
        item.validate_name()?;
        let mut untimed = item.clone();
        untimed.timestamp = None;
        self.write(&untimed)
    }

    fn write(&self, item: &ResultItem) -> AppResult<PathBuf> {
        let path = self.path_of(item);
        info!(
            "保存结果: {} ({} 字节)",
            path.display(),
            item.data.as_ref().map_or(0, Vec::len)
        );
        fs::write(&path, item.data.as_deref().unwrap_or_default())
            .map_err(|e| AppError::file_write_failed(&path, e))?;
        Ok(path)
    }

    /// 读取条目内容，文件不存在时返回 NotFound
    pub fn read(&self, item: &ResultItem) -> AppResult<Vec<u8>> {
        let path = self.path_of(item);
        fs::read(&path).map_err(|e| {
            error!("无法读取文件 {}: {}", path.display(), e);
            AppError::file_read_failed(&path, e)
        })
    }

    /// 读取条目并填充 `data`
    pub fn load(&self, mut item: ResultItem) -> AppResult<ResultItem> {
        item.data = Some(self.read(&item)?);
        Ok(item)
    }

    /// 删除条目对应的文件
    pub fn remove(&self, item: &ResultItem) -> AppResult<()> {
        let path = self.path_of(item);
        fs::remove_file(&path).map_err(|source| {
            AppError::File(FileError::DeleteFailed {
                path: path.clone(),
                source,
            })
        })
    }

    /// 在结果目录中展开一个 glob 模式
    ///
    /// 模式只能是文件名；绝对路径或带路径分隔符的模式返回错误
    ///
    /// # 返回
    /// 返回匹配的文件名（不含目录），按 glob 的顺序
    pub fn glob(&self, pattern: &str) -> AppResult<Vec<String>> {
        if pattern == ".."
            || Path::new(pattern).is_absolute()
            || pattern.chars().any(std::path::is_separator)
        {
            return Err(AppError::File(FileError::PatternOutsideRoot {
                pattern: pattern.to_string(),
            }));
        }

        let escaped_root = glob::Pattern::escape(&self.root.to_string_lossy());
        let full_pattern = Path::new(&escaped_root).join(pattern);
        let full_pattern = full_pattern.to_string_lossy();
        debug!("展开模式 {} -> {}", pattern, full_pattern);

        let paths = glob::glob(&full_pattern).map_err(|source| {
            AppError::File(FileError::InvalidPattern {
                pattern: pattern.to_string(),
                source,
            })
        })?;

        let mut file_names = Vec::new();
        for entry in paths {
            match entry {
                Ok(path) if path.is_file() => {
                    if let Some(name) = path.file_name() {
                        file_names.push(name.to_string_lossy().into_owned());
                    }
                }
                Ok(_) => {}
                Err(e) => warn!("glob 遍历出错: {}", e),
            }
        }

        debug!("模式 {} 匹配到 {} 个文件", pattern, file_names.len());
        Ok(file_names)
    }

    /// 依次展开多个模式并拼接结果，允许重复
    ///
    /// 无效模式记录日志后跳过
    pub fn glob_all<S: AsRef<str>>(&self, patterns: &[S]) -> Vec<String> {
        let mut file_names = Vec::new();
        for pattern in patterns {
            match self.glob(pattern.as_ref()) {
                Ok(found) => file_names.extend(found),
                Err(e) => warn!("{}", e),
            }
        }
        file_names
    }

    /// 展开模式并解码为条目，跳过不符合命名格式的文件
    pub fn items<S: AsRef<str>>(&self, patterns: &[S]) -> Vec<ResultItem> {
        self.glob_all(patterns)
            .into_iter()
            .filter_map(|file_name| match ResultItem::from_file_name(&file_name) {
                Ok(item) => Some(item),
                Err(e) => {
                    debug!("跳过文件: {}", e);
                    None
                }
            })
            .collect()
    }

    /// 按保留策略删除旧条目
    ///
    /// 降序排序后保留下标 `0..=limit`，删除其余条目；
    /// 单个删除失败不影响其它条目
    pub fn prune(&self, items: Vec<ResultItem>, limit: usize) -> PruneReport {
        let (kept, expired) = result_catalog::split_for_retention(items, limit);
        debug!("保留 {} 个条目, 待删除 {} 个", kept.len(), expired.len());

        let mut report = PruneReport::default();
        for item in expired {
            match self.remove(&item) {
                Ok(()) => {
                    info!("已删除: {}", item);
                    report.removed.push(item);
                }
                Err(e) => {
                    error!("无法删除 {}: {}", item, e);
                    report.failed.push((item, e));
                }
            }
        }
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{FormatError, NotFoundError};
    use crate::models::Extension;
    use tempfile::TempDir;

    fn store_in(dir: &TempDir) -> ResultStore {
        ResultStore::new(Some(dir.path().to_path_buf()))
    }

    #[test]
    fn store_then_read() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);

        let mut item =
            ResultItem::new("hw01", "2020-02-18T08-45-00", Extension::Xml).with_data(b"<x/>".to_vec());
        let path = store.store(&mut item).unwrap();

        assert_eq!(path, dir.path().join("hw01.2020-02-18T08-45-00.xml"));
        assert_eq!(store.read(&item).unwrap(), b"<x/>");
    }

    #[test]
    fn store_stamps_missing_timestamp() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);

        let mut item = ResultItem::untimed("hw01", Extension::Json).with_data(b"[]".to_vec());
        store.store(&mut item).unwrap();

        let ts = item.timestamp.clone().unwrap();
        assert!(crate::models::result_item::is_valid_timestamp(&ts));
        assert!(store.path_of(&item).is_file());
    }

    #[test]
    fn same_name_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);

        let mut first = ResultItem::new("hw01", "2020-02-18T08-45-00", Extension::Xml)
            .with_data(b"one".to_vec());
        let mut second = first.clone().with_data(b"two".to_vec());
        store.store(&mut first).unwrap();
        store.store(&mut second).unwrap();

        assert_eq!(store.read(&first).unwrap(), b"two");
    }

    #[test]
    fn untimed_copy_is_written_when_enabled() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir).with_untimed_copies(true);

        let mut item = ResultItem::new("hw01", "2020-02-18T08-45-00", Extension::Csv)
            .with_data(b"a,b".to_vec());
        store.store(&mut item).unwrap();

        assert_eq!(fs::read(dir.path().join("hw01.csv")).unwrap(), b"a,b");
        // 两段式文件不出现在列表中
        assert_eq!(store.items(&["*"]).len(), 1);
    }

    #[test]
    fn rejects_dotted_names() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        let mut item = ResultItem::untimed("hw.01", Extension::Xml);
        assert!(matches!(
            store.store(&mut item),
            Err(AppError::Format(FormatError::InvalidLogicalName { .. }))
        ));
    }

    #[test]
    fn missing_file_read_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        let item = ResultItem::new("ghost", "2020-02-18T08-45-00", Extension::Xml);
        assert!(matches!(
            store.read(&item),
            Err(AppError::NotFound(NotFoundError::File { .. }))
        ));
    }

    #[test]
    fn glob_all_concatenates_and_keeps_duplicates() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        for name in ["hw01.2020-02-18T08-45-00.xml", "hw02.2020-02-18T08-45-00.xml"] {
            fs::write(dir.path().join(name), b"").unwrap();
        }

        let found = store.glob_all(&["hw01*", "*.xml"]);
        assert_eq!(
            found,
            vec![
                "hw01.2020-02-18T08-45-00.xml",
                "hw01.2020-02-18T08-45-00.xml",
                "hw02.2020-02-18T08-45-00.xml",
            ]
        );
    }

    #[test]
    fn patterns_cannot_leave_the_root() {
        let outer = tempfile::tempdir().unwrap();
        let root = outer.path().join("results");
        fs::create_dir(&root).unwrap();
        let name = "hw01.2020-02-18T08-45-00.xml";
        fs::write(outer.path().join(name), b"outside").unwrap();
        fs::write(root.join(name), b"inside").unwrap();
        let store = ResultStore::new(Some(root.clone()));

        let absolute = format!("{}/*", outer.path().display());
        for pattern in [absolute.as_str(), "../*", "sub/*", ".."] {
            assert!(
                matches!(
                    store.glob(pattern),
                    Err(AppError::File(FileError::PatternOutsideRoot { .. }))
                ),
                "{} should be rejected",
                pattern
            );
        }

        assert!(store.items(&["../*"]).is_empty());
        let report = store.prune(store.items(&[absolute.as_str(), "../hw01.*"]), 0);
        assert!(report.removed.is_empty());
        assert_eq!(fs::read(root.join(name)).unwrap(), b"inside");
    }

    #[test]
    fn items_skip_foreign_files() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        fs::write(dir.path().join("hw01.2020-02-18T08-45-00.xml"), b"").unwrap();
        fs::write(dir.path().join("students.json"), b"{}").unwrap();
        fs::write(dir.path().join("notes.txt"), b"").unwrap();
        fs::create_dir(dir.path().join("sub.2020-02-18T08-45-00.xml")).unwrap();

        let items = store.items(&["*"]);
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].name, "hw01");
    }

    #[test]
    fn prune_deletes_oldest() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        let stamps = [
            "2020-02-18T08-45-00",
            "2020-02-19T08-45-00",
            "2020-02-20T08-45-00",
        ];
        for ts in stamps {
            let mut item = ResultItem::new("hw01", ts, Extension::Xml).with_data(Vec::new());
            store.store(&mut item).unwrap();
        }

        let report = store.prune(store.items(&["hw01.*"]), 1);
        assert_eq!(report.removed.len(), 1);
        assert_eq!(report.removed[0].timestamp_str(), stamps[0]);
        assert!(report.failed.is_empty());

        let remaining: Vec<String> = store.items(&["*"]).iter().map(|i| i.file_name()).collect();
        assert_eq!(remaining.len(), 2);
        assert!(!dir.path().join("hw01.2020-02-18T08-45-00.xml").exists());
    }

    #[test]
    fn prune_reports_delete_failures() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        let items = vec![
            ResultItem::new("a", "2020-02-20T08-45-00", Extension::Xml),
            ResultItem::new("a", "2020-02-18T08-45-00", Extension::Xml),
        ];

        let report = store.prune(items, 0);
        assert!(report.removed.is_empty());
        assert_eq!(report.failed.len(), 1);
    }
}
