use serde::{Deserialize, Serialize};

/// CSV 表头（固定列顺序）
pub const CSV_HEADER: [&str; 8] = [
    "student_id",
    "index",
    "datetime",
    "date",
    "time",
    "points",
    "bonus",
    "final",
];

/// 一行扁平化的提交统计
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CsvStatistic {
    pub student_id: String,
    pub index: i64,
    pub datetime: String,
    pub date: String,
    pub time: String,
    pub points: f64,
    pub bonus: f64,
    #[serde(rename = "final")]
    pub is_final: bool,
}
