//! # Notepad Stats
//!
//! 从课程记事本获取 Kontr 评分记录，解析为学生提交历史，
//! 并以带时间戳的文件保存、列举、转换和清理。
//!
//! ## 架构设计
//!
//! ### ① 数据层（Models）
//! - `models/` - 提交、学生记录、记事本 XML、结果条目、CSV 行
//!
//! ### ② 业务能力层（Services）
//! - `submission_parser` - 记事本文本语法
//! - `notepad_format` - 按名称选择格式
//! - `students_register` - 学生代码 → 稳定 UUID
//! - `record_parser` - 记事本 → 学生记录
//! - `result_store` / `result_catalog` - 版本化结果文件、分组与保留策略
//! - `csv_export` - 学生记录 → CSV
//!
//! ### ③ 客户端（Clients）
//! - `NotepadClient` - 记事本导出接口
//!
//! ### ④ 编排层（Orchestration）
//! - `orchestrator/batch_processor` - 批量获取、解析、转换、清理
//! - `orchestrator/item_processor` - 单个条目的处理
//!
//! ## 模块结构

pub mod cli;
pub mod clients;
pub mod config;
pub mod error;
pub mod models;
pub mod orchestrator;
pub mod services;
pub mod utils;

// 重新导出常用类型
pub use clients::NotepadClient;
pub use config::Config;
pub use error::{AppError, AppResult};
pub use models::{Extension, ResultItem, StudentRecord, Submission};
pub use orchestrator::{App, BatchReport};
pub use services::{NotepadFormat, RecordParser, ResultStore, StudentsRegister};
