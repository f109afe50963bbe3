/// CSV 导出服务
///
/// 将学生记录扁平化为每次提交一行
use crate::error::{AppError, AppResult, DecodeError};
use crate::models::{CsvStatistic, StudentRecord, CSV_HEADER};

const DATE_FORMAT: &str = "%Y-%m-%d";
const TIME_FORMAT: &str = "%H:%M";
const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M";

/// 将学生记录转换为 CSV 行
pub fn records_to_rows(records: &[StudentRecord]) -> Vec<CsvStatistic> {
    records
        .iter()
        .flat_map(|record| {
            record.submissions.iter().map(move |submission| {
                let format = |fmt: &str| {
                    submission
                        .datetime
                        .map(|dt| dt.format(fmt).to_string())
                        .unwrap_or_default()
                };
                CsvStatistic {
                    student_id: record.id.to_string(),
                    index: submission.index,
                    datetime: format(DATETIME_FORMAT),
                    date: format(DATE_FORMAT),
                    time: format(TIME_FORMAT),
                    points: submission.points,
                    bonus: submission.bonus,
                    is_final: submission.is_final,
                }
            })
        })
        .collect()
}

/// 编码为 CSV 字节，始终包含表头
pub fn write_csv(rows: &[CsvStatistic]) -> AppResult<Vec<u8>> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(Vec::new());

    writer.write_record(CSV_HEADER)?;
    for row in rows {
        writer.serialize(row)?;
    }

    writer
        .into_inner()
        .map_err(|e| AppError::Decode(DecodeError::Csv(csv::Error::from(e.into_error()))))
}

/// 从 CSV 字节读取行
pub fn read_csv_rows(data: &[u8]) -> AppResult<Vec<CsvStatistic>> {
    let mut reader = csv::ReaderBuilder::new().from_reader(data);
    let mut rows = Vec::new();
    for row in reader.deserialize() {
        let row: CsvStatistic = row?;
        rows.push(row);
    }
    Ok(rows)
}

/// JSON 记录 → CSV 字节
pub fn convert_json_to_csv(json: &[u8]) -> AppResult<Vec<u8>> {
    let records = StudentRecord::list_from_json(json)?;
    write_csv(&records_to_rows(&records))
}
