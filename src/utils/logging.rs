/// 日志工具模块
///
/// 提供日志初始化和批处理输出的辅助函数
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

/// 默认日志级别
const DEFAULT_LEVEL: &str = "warn";

/// 初始化日志（输出到 stderr）
///
/// # 参数
/// - `level`: 显式指定的级别，为空时读取 `LOG_LEVEL`，仍为空则使用 `warn`
pub fn init(level: Option<&str>) {
    let requested = level
        .map(str::to_string)
        .filter(|l| !l.trim().is_empty())
        .or_else(|| std::env::var("LOG_LEVEL").ok())
        .unwrap_or_else(|| DEFAULT_LEVEL.to_string());

    let (filter, invalid) = match EnvFilter::try_new(&requested) {
        Ok(filter) => (filter, false),
        Err(_) => (EnvFilter::new(DEFAULT_LEVEL), true),
    };

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();

    if invalid {
        warn!("无法解析日志级别 '{}', 使用 {}", requested, DEFAULT_LEVEL);
    }
}

/// 打印批处理统计信息
///
/// # 参数
/// - `operation`: 操作名称
/// - `succeeded`: 成功的条目
/// - `failed`: 失败的条目及原因
pub fn log_batch_summary(operation: &str, succeeded: &[String], failed: &[(String, String)]) {
    let total = succeeded.len() + failed.len();
    info!("{}", "=".repeat(60));
    info!("📊 {} 完成", operation);
    info!("✅ 成功: {}/{}", succeeded.len(), total);
    for name in succeeded {
        info!("  - {}", name);
    }
    if !failed.is_empty() {
        error!("❌ 失败: {}", failed.len());
        for (name, reason) in failed {
            error!("  - {}: {}", name, reason);
        }
    }
    info!("{}", "=".repeat(60));
}

/// 截断长文本用于日志显示
///
/// # 参数
/// - `text`: 原始文本
/// - `max_len`: 最大长度
///
/// # 返回
/// 返回截断后的文本
pub fn truncate_text(text: &str, max_len: usize) -> String {
    if text.chars().count() > max_len {
        text.chars().take(max_len).collect::<String>() + "..."
    } else {
        text.to_string()
    }
}
