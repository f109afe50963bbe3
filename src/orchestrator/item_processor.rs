//! 单个条目处理器 - 编排层
//!
//! 负责一个记事本 / 一个结果文件的完整处理：
//!
//! 1. **获取**：下载记事本并保存原始 XML
//! 2. **解析**：XML → 学生记录 → JSON
//! 3. **转换**：JSON → CSV
//!
//! 不符合命名格式或扩展名不匹配的文件返回 `None`，由批处理器跳过。

use tracing::{debug, info};

use crate::clients::NotepadClient;
use crate::error::AppResult;
use crate::models::{Extension, ResultItem, StudentRecord};
use crate::services::{csv_export, RecordParser, ResultStore};

/// 一个记事本的解析结果
#[derive(Debug, Clone)]
pub struct ParsedNotepad {
    /// 源 XML 条目
    pub source: ResultItem,
    /// 写入的 JSON 条目
    pub item: ResultItem,
    pub records: Vec<StudentRecord>,
}

/// 获取并保存一个记事本
///
/// # 参数
/// - `client`: 记事本客户端
/// - `store`: 结果存储
/// - `notepad`: 记事本代号
/// - `timestamp`: 本次运行共用的时间戳
pub async fn fetch_one(
    client: &NotepadClient,
    store: &ResultStore,
    notepad: &str,
    timestamp: &str,
) -> AppResult<ResultItem> {
    let data = client.fetch_raw(notepad).await?;

    let mut item = ResultItem::new(notepad, timestamp, Extension::Xml).with_data(data);
    store.store(&mut item)?;
    Ok(item)
}

/// 解析一个 XML 结果文件并保存为 JSON
///
/// # 返回
/// 非 XML 文件返回 `None`
pub fn parse_one(
    parser: &mut RecordParser,
    store: &ResultStore,
    file_name: &str,
) -> AppResult<Option<ParsedNotepad>> {
    let Some(source) = decode_with_extension(file_name, Extension::Xml) else {
        return Ok(None);
    };
    info!("解析记事本: {}", file_name);

    let data = store.read(&source)?;
    let records = parser.parse_xml(&data)?;

    let mut item = source
        .derive(Extension::Json)
        .with_data(StudentRecord::list_to_json(&records)?);
    store.store(&mut item)?;

    Ok(Some(ParsedNotepad {
        source,
        item,
        records,
    }))
}

/// 将一个 JSON 结果文件转换为 CSV
///
/// # 返回
/// 非 JSON 文件返回 `None`
pub fn convert_one(store: &ResultStore, file_name: &str) -> AppResult<Option<ResultItem>> {
    let Some(source) = decode_with_extension(file_name, Extension::Json) else {
        return Ok(None);
    };
    info!("转换为 CSV: {}", file_name);

    let data = store.read(&source)?;
    let mut item = source
        .derive(Extension::Csv)
        .with_data(csv_export::convert_json_to_csv(&data)?);
    store.store(&mut item)?;

    Ok(Some(item))
}

fn decode_with_extension(file_name: &str, expected: Extension) -> Option<ResultItem> {
    match ResultItem::from_file_name(file_name) {
        Ok(item) if item.extension == expected => Some(item),
        Ok(item) => {
            debug!("跳过 {}: 扩展名不是 {}", item, expected);
            None
        }
        Err(e) => {
            debug!("跳过: {}", e);
            None
        }
    }
}
