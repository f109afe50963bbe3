//! 结果条目的分组、排序与保留策略
//!
//! 只处理条目标识，不接触文件系统。

use std::collections::BTreeMap;

use crate::models::{Extension, ResultItem};

/// 名称 → 扩展名 → 条目
pub type ResultTree = BTreeMap<String, BTreeMap<Extension, Vec<ResultItem>>>;

/// 名称 → 扩展名 → 最新条目
pub type LatestItems = BTreeMap<String, BTreeMap<Extension, ResultItem>>;

/// 按时间戳降序排序（稳定排序）
///
/// 时间戳为定长零填充格式，字符串比较即时间比较
pub fn sort_by_timestamp_desc(items: &mut [ResultItem]) {
    items.sort_by(|a, b| b.timestamp_str().cmp(a.timestamp_str()));
}

/// 按逻辑名称分组，组内保持输入顺序
pub fn categorize_by_name(items: &[ResultItem]) -> BTreeMap<String, Vec<ResultItem>> {
    let mut result: BTreeMap<String, Vec<ResultItem>> = BTreeMap::new();
    for item in items {
        result.entry(item.name.clone()).or_default().push(item.clone());
    }
    result
}

/// 按扩展名分组，组内保持输入顺序
pub fn categorize_by_extension(items: &[ResultItem]) -> BTreeMap<Extension, Vec<ResultItem>> {
    let mut result: BTreeMap<Extension, Vec<ResultItem>> = BTreeMap::new();
    for item in items {
        result.entry(item.extension).or_default().push(item.clone());
    }
    result
}

/// 先按名称再按扩展名分组（树形视图）
pub fn categorize_by_name_then_extension(items: &[ResultItem]) -> ResultTree {
    categorize_by_name(items)
        .into_iter()
        .map(|(name, named)| (name, categorize_by_extension(&named)))
        .collect()
}

/// 每个 (名称, 扩展名) 组中时间戳最新的条目
pub fn select_latest_per_group(items: &[ResultItem]) -> LatestItems {
    let mut sorted = items.to_vec();
    sort_by_timestamp_desc(&mut sorted);

    categorize_by_name_then_extension(&sorted)
        .into_iter()
        .map(|(name, extensions)| {
            let latest = extensions
                .into_iter()
                .filter_map(|(ext, group)| group.into_iter().next().map(|item| (ext, item)))
                .collect();
            (name, latest)
        })
        .collect()
}

/// 划分保留与过期的条目
///
/// 降序排序后保留下标 `0..=limit`（共 `limit + 1` 个），其余过期
///
/// # 返回
/// 返回 (保留, 过期)
pub fn split_for_retention(
    mut items: Vec<ResultItem>,
    limit: usize,
) -> (Vec<ResultItem>, Vec<ResultItem>) {
    sort_by_timestamp_desc(&mut items);
    let keep = limit.saturating_add(1).min(items.len());
    let expired = items.split_off(keep);
    (items, expired)
}
