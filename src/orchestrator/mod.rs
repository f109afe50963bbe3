//! 编排层（Orchestration Layer）
//!
//! ## 模块划分
//!
//! ### `batch_processor` - 批量处理器
//! - 持有客户端、解析器、结果存储（`App`）
//! - 展开模式、逐个调度条目
//! - 区分 fail-fast（获取）与 continue（解析 / 转换 / 清理）
//! - 输出批处理汇总（`BatchReport`）
//!
//! ### `item_processor` - 单个条目处理器
//! - 获取一个记事本
//! - 解析一个 XML 结果
//! - 转换一个 JSON 结果
//!
//! ## 层次关系
//!
//! ```text
//! batch_processor (处理 Vec<条目>)
//!     ↓
//! item_processor (处理单个条目)
//!     ↓
//! services (能力层：解析 / 存储 / 注册表 / CSV)
//!     ↓
//! clients (记事本 API)
//! ```

pub mod batch_processor;
pub mod item_processor;

// 重新导出主要类型
pub use batch_processor::{App, Artifact, BatchFailure, BatchReport};
pub use item_processor::ParsedNotepad;
