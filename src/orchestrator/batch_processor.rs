//! 批量处理器 - 编排层
//!
//! ## 职责
//!
//! 持有客户端、解析器和结果存储，按顺序处理一批条目：
//!
//! - **获取**：任一失败即中止（fail-fast）
//! - **解析 / 转换 / 清理 / 导出最新**：单项失败只记录，继续处理其余条目
//!
//! 每个批次都会输出成功和失败的汇总。

use std::path::PathBuf;
use tracing::{error, info, warn};

use crate::clients::NotepadClient;
use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::models::{current_timestamp, ResultItem};
use crate::orchestrator::item_processor::{self, ParsedNotepad};
use crate::services::result_catalog::{self, LatestItems, ResultTree};
use crate::services::{NotepadFormat, RecordParser, ResultStore, StudentsRegister};
use crate::utils::logging::log_batch_summary;

/// 匹配全部文件的模式
const ALL_PATTERN: &str = "*";

/// 批处理中失败的条目
#[derive(Debug)]
pub struct BatchFailure {
    pub item: String,
    pub error: AppError,
}

/// 批处理结果
#[derive(Debug)]
pub struct BatchReport<T> {
    pub succeeded: Vec<T>,
    pub failed: Vec<BatchFailure>,
}

impl<T> Default for BatchReport<T> {
    fn default() -> Self {
        Self {
            succeeded: Vec::new(),
            failed: Vec::new(),
        }
    }
}

/// 可在汇总中显示的产物
pub trait Artifact {
    fn artifact_name(&self) -> String;
}

impl Artifact for ResultItem {
    fn artifact_name(&self) -> String {
        self.file_name()
    }
}

impl Artifact for ParsedNotepad {
    fn artifact_name(&self) -> String {
        self.item.file_name()
    }
}

impl<T: Artifact> BatchReport<T> {
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }

    fn fail(&mut self, item: impl Into<String>, error: AppError) {
        let item = item.into();
        error!("处理 {} 失败: {}", item, error);
        self.failed.push(BatchFailure { item, error });
    }

    /// 输出批处理汇总
    pub fn log_summary(&self, operation: &str) {
        let succeeded: Vec<String> = self.succeeded.iter().map(Artifact::artifact_name).collect();
        let failed: Vec<(String, String)> = self
            .failed
            .iter()
            .map(|f| (f.item.clone(), f.error.to_string()))
            .collect();
        log_batch_summary(operation, &succeeded, &failed);
    }
}

/// 应用主结构
pub struct App {
    config: Config,
    client: NotepadClient,
    parser: RecordParser,
    store: ResultStore,
}

impl App {
    /// 初始化应用
    ///
    /// 配置了学生注册表且文件存在时先导入
    pub fn initialize(config: Config) -> AppResult<Self> {
        let format = NotepadFormat::get_or_default(&config.parser);
        info!("记事本格式: {}", format);

        let mut register = StudentsRegister::new();
        if let Some(path) = config.students_register.as_deref() {
            if path.is_file() {
                register.import_from(path)?;
            } else {
                info!("学生注册表 {} 不存在, 将新建", path.display());
            }
        }

        let store = ResultStore::new(config.results.clone())
            .with_untimed_copies(config.without_timestamp);
        store.ensure_root()?;

        Ok(Self {
            client: NotepadClient::new(&config),
            parser: RecordParser::new(register, format),
            store,
            config,
        })
    }

    pub fn store(&self) -> &ResultStore {
        &self.store
    }

    pub fn register(&self) -> &StudentsRegister {
        self.parser.register()
    }

    /// 获取记事本，所有条目共用当前时间戳
    pub async fn fetch<S: AsRef<str>>(&self, notepads: &[S]) -> AppResult<Vec<ResultItem>> {
        self.fetch_with_timestamp(notepads, &current_timestamp()).await
    }

    /// 以指定时间戳获取记事本
    ///
    /// 任一记事本失败即返回错误
    pub async fn fetch_with_timestamp<S: AsRef<str>>(
        &self,
        notepads: &[S],
        timestamp: &str,
    ) -> AppResult<Vec<ResultItem>> {
        let mut items = Vec::with_capacity(notepads.len());

        for notepad in notepads {
            let notepad = notepad.as_ref();
            match item_processor::fetch_one(&self.client, &self.store, notepad, timestamp).await {
                Ok(item) => items.push(item),
                Err(e) => {
                    error!("无法获取记事本 {}: {}", notepad, e);
                    return Err(e);
                }
            }
        }

        info!("✓ 已获取 {} 个记事本", items.len());
        Ok(items)
    }

    /// 解析匹配的 XML 文件并保存为 JSON
    pub fn parse<S: AsRef<str>>(&mut self, patterns: &[S]) -> BatchReport<ParsedNotepad> {
        let mut report = BatchReport::default();

        for file_name in self.store.glob_all(&with_default_pattern(patterns)) {
            match item_processor::parse_one(&mut self.parser, &self.store, &file_name) {
                Ok(Some(parsed)) => report.succeeded.push(parsed),
                Ok(None) => {}
                Err(e) => report.fail(file_name, e),
            }
        }

        if let Err(e) = self.export_register() {
            let target = self
                .config
                .students_register
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_default();
            report.fail(target, e);
        }

        report.log_summary("解析");
        report
    }

    /// 将匹配的 JSON 文件转换为 CSV
    pub fn convert_to_csv<S: AsRef<str>>(&self, patterns: &[S]) -> BatchReport<ResultItem> {
        let mut report = BatchReport::default();

        for file_name in self.store.glob_all(&with_default_pattern(patterns)) {
            match item_processor::convert_one(&self.store, &file_name) {
                Ok(Some(item)) => report.succeeded.push(item),
                Ok(None) => {}
                Err(e) => report.fail(file_name, e),
            }
        }

        report.log_summary("CSV 转换");
        report
    }

    /// 列出匹配的条目（时间戳降序）
    pub fn list<S: AsRef<str>>(&self, patterns: &[S]) -> Vec<ResultItem> {
        let mut items = self.store.items(&with_default_pattern(patterns));
        result_catalog::sort_by_timestamp_desc(&mut items);
        items
    }

    /// 按名称、扩展名分组的树形视图
    pub fn tree<S: AsRef<str>>(&self, patterns: &[S]) -> ResultTree {
        let items = self.store.items(&with_default_pattern(patterns));
        result_catalog::categorize_by_name_then_extension(&items)
    }

    /// 清理旧条目，保留最新的 `limit + 1` 个
    ///
    /// 模式为空时不匹配任何条目
    pub fn clean<S: AsRef<str>>(&self, patterns: &[S], limit: usize) -> BatchReport<ResultItem> {
        if patterns.is_empty() {
            warn!("未指定清理模式, 不删除任何条目");
            return BatchReport::default();
        }
        let items = self.store.items(patterns);
        let pruned = self.store.prune(items, limit);

        let mut report = BatchReport {
            succeeded: pruned.removed,
            failed: Vec::new(),
        };
        for (item, error) in pruned.failed {
            report.failed.push(BatchFailure {
                item: item.file_name(),
                error,
            });
        }

        report.log_summary("清理");
        report
    }

    /// 每个 (名称, 扩展名) 的最新条目
    pub fn latest(&self) -> LatestItems {
        let items = self.store.items(&[ALL_PATTERN]);
        result_catalog::select_latest_per_group(&items)
    }

    /// 将最新条目另存为 `name.ext`
    pub fn dump_latest(&self) -> BatchReport<ResultItem> {
        let mut report = BatchReport::default();

        for item in self.latest().into_values().flat_map(|exts| exts.into_values()) {
            let name = item.file_name();
            let result = self
                .store
                .load(item)
                .and_then(|loaded| self.store.store_without_timestamp(&loaded).map(|_| loaded));
            match result {
                Ok(loaded) => report.succeeded.push(loaded),
                Err(e) => report.fail(name, e),
            }
        }

        report.log_summary("导出最新");
        report
    }

    /// 导出学生注册表（若已配置）
    fn export_register(&self) -> AppResult<Option<PathBuf>> {
        let Some(path) = self.config.students_register.as_ref() else {
            return Ok(None);
        };
        if self.register().is_empty() {
            warn!("学生注册表为空, 跳过导出");
            return Ok(None);
        }
        self.register().export_to(path)?;
        Ok(Some(path.clone()))
    }
}

fn with_default_pattern<S: AsRef<str>>(patterns: &[S]) -> Vec<String> {
    if patterns.is_empty() {
        vec![ALL_PATTERN.to_string()]
    } else {
        patterns.iter().map(|p| p.as_ref().to_string()).collect()
    }
}
