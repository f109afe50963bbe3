use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AppResult;

/// 一次提交的评分记录
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Submission {
    /// 提交序号
    pub index: i64,
    /// 提交时间，源数据缺失时为空
    pub datetime: Option<NaiveDateTime>,
    pub points: f64,
    #[serde(default)]
    pub bonus: f64,
    /// 是否为最终计分的提交
    #[serde(rename = "final")]
    pub is_final: bool,
}

impl Submission {
    /// 只有序号的提交（其余字段取默认值）
    pub fn with_index(index: i64) -> Self {
        Self {
            index,
            datetime: None,
            points: 0.0,
            bonus: 0.0,
            is_final: false,
        }
    }
}

/// 单个学生在一个记事本中的全部提交
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudentRecord {
    #[serde(rename = "uid")]
    pub id: Uuid,
    /// 保持源文本顺序
    pub submissions: Vec<Submission>,
}

impl StudentRecord {
    pub fn new(id: Uuid) -> Self {
        Self {
            id,
            submissions: Vec::new(),
        }
    }

    /// 序列化记录列表为 JSON
    pub fn list_to_json(records: &[StudentRecord]) -> AppResult<Vec<u8>> {
        Ok(serde_json::to_vec(records)?)
    }

    /// 从 JSON 反序列化记录列表
    pub fn list_from_json(data: &[u8]) -> AppResult<Vec<StudentRecord>> {
        Ok(serde_json::from_slice(data)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn json_uses_uid_and_final_keys() {
        let id = Uuid::new_v4();
        let mut record = StudentRecord::new(id);
        record.submissions.push(Submission {
            index: 1,
            datetime: NaiveDate::from_ymd_opt(2020, 2, 18)
                .and_then(|d| d.and_hms_opt(8, 45, 0)),
            points: 1.0,
            bonus: 0.0,
            is_final: true,
        });

        let json = StudentRecord::list_to_json(&[record.clone()]).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&json).unwrap();
        assert_eq!(value[0]["uid"], id.to_string());
        assert_eq!(value[0]["submissions"][0]["final"], true);
        assert_eq!(value[0]["submissions"][0]["datetime"], "2020-02-18T08:45:00");

        let back = StudentRecord::list_from_json(&json).unwrap();
        assert_eq!(back, vec![record]);
    }

    #[test]
    fn missing_datetime_serializes_as_null() {
        let mut record = StudentRecord::new(Uuid::new_v4());
        record.submissions.push(Submission::with_index(7));

        let json = StudentRecord::list_to_json(&[record]).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&json).unwrap();
        assert!(value[0]["submissions"][0]["datetime"].is_null());
    }
}
