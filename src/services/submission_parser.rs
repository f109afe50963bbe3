//! 提交记录解析
//!
//! Kontr 写入记事本的格式：
//!
//! ```text
//! # zapsáno z Kontru 2020-02-18 08:45, v2.2.1
//!
//! %%       datum    cas  body
//!  1  2020-02-18  08:45    *1
//!
//! # POZOR: Tento blok NEUPRAVUJTE!
//! ```
//!
//! 每行按空白切分：`<序号> [<日期> <时间> [<分数> [<加分> [<最终标记>]]]]`。
//! 分数和最终标记可带 `*` 前缀，表示该提交为最终计分。

use chrono::NaiveDateTime;
use std::fmt;
use tracing::{debug, error, warn};

use crate::error::GrammarError;
use crate::models::Submission;

/// 日期 + 时间的格式
pub const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M";

/// 最终计分标记
const FINAL_MARKER: char = '*';

/// 数据段开始标记
const HEADER_MARKER: &str = "%%";

const COMMENT_MARKER: char = '#';

/// 单行解析失败
///
/// 序号解析成功后遇到的错误会带上部分结果，由调用方决定是否保留
#[derive(Debug)]
pub struct LineParseError {
    pub partial: Option<Submission>,
    pub error: GrammarError,
}

impl LineParseError {
    fn fatal(error: GrammarError) -> Self {
        Self {
            partial: None,
            error,
        }
    }

    fn partial(submission: Submission, error: GrammarError) -> Self {
        Self {
            partial: Some(submission),
            error,
        }
    }
}

impl fmt::Display for LineParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.partial {
            Some(partial) => write!(f, "{} (保留部分结果, 序号 {})", self.error, partial.index),
            None => write!(f, "{}", self.error),
        }
    }
}

impl std::error::Error for LineParseError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.error)
    }
}

/// 行类型
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    /// 空行或 `#` 注释
    Comment,
    /// `%%` 数据段标记
    Header,
    Data,
}

/// 判断行类型
pub fn classify_line(line: &str) -> LineKind {
    let trimmed = line.trim_start();
    if trimmed.is_empty() || trimmed.starts_with(COMMENT_MARKER) {
        LineKind::Comment
    } else if trimmed.starts_with(HEADER_MARKER) {
        LineKind::Header
    } else {
        LineKind::Data
    }
}

/// 解析整个记事本文本
///
/// 只有 `%%` 标记之后的数据行会被解析；单行失败只记录日志，
/// 带部分结果的行仍然保留。
pub fn parse_kontr_content(content: &str) -> Vec<Submission> {
    let mut found_header = false;
    let mut submissions = Vec::new();

    for (line_no, line) in content.lines().enumerate() {
        match classify_line(line) {
            LineKind::Comment => continue,
            LineKind::Header => {
                found_header = true;
            }
            LineKind::Data if !found_header => {
                debug!("跳过数据段之前的第 {} 行", line_no + 1);
            }
            LineKind::Data => match parse_submission_line(line) {
                Ok(submission) => submissions.push(submission),
                Err(LineParseError {
                    partial: Some(submission),
                    error,
                }) => {
                    warn!("第 {} 行不完整, 保留部分结果: {}", line_no + 1, error);
                    submissions.push(submission);
                }
                Err(LineParseError {
                    partial: None,
                    error: e,
                }) => {
                    error!("无法解析第 {} 行的提交记录: {}", line_no + 1, e);
                }
            },
        }
    }

    submissions
}

/// 解析单行提交记录
///
/// # 参数
/// - `line`: 数据段中的一行
///
/// # 返回
/// 完整解析时返回 `Ok`；字段缺失或格式错误时返回 `LineParseError`，
/// 其中 `partial` 保存已解析的字段
pub fn parse_submission_line(line: &str) -> Result<Submission, LineParseError> {
    let words: Vec<&str> = line.split_whitespace().collect();

    let Some(first) = words.first() else {
        return Err(LineParseError::fatal(GrammarError::InsufficientFields {
            found: 0,
            missing: "序号",
        }));
    };

    let index = first.parse::<i64>().map_err(|source| {
        LineParseError::fatal(GrammarError::InvalidIndex {
            token: first.to_string(),
            source,
        })
    })?;
    let mut submission = Submission::with_index(index);

    if words.len() < 3 {
        return Err(LineParseError::partial(
            submission,
            GrammarError::InsufficientFields {
                found: words.len(),
                missing: "日期时间",
            },
        ));
    }

    match parse_datetime(words[1], words[2]) {
        Ok(datetime) => submission.datetime = Some(datetime),
        Err(e) => return Err(LineParseError::partial(submission, e)),
    }

    let Some(points_token) = words.get(3) else {
        return Err(LineParseError::partial(
            submission,
            GrammarError::InsufficientFields {
                found: words.len(),
                missing: "分数",
            },
        ));
    };

    match parse_number_with_star(points_token) {
        Ok((points, is_final)) => {
            submission.points = points;
            submission.is_final = is_final;
        }
        Err(e) => return Err(LineParseError::partial(submission, e)),
    }

    let Some(bonus_token) = words.get(4) else {
        return Ok(submission);
    };

    match parse_number(bonus_token) {
        Ok(bonus) => submission.bonus = bonus,
        Err(e) => return Err(LineParseError::partial(submission, e)),
    }

    let Some(marker_token) = words.get(5) else {
        return Ok(submission);
    };

    // 第六列只取最终标记，数值本身忽略
    match parse_number_with_star(marker_token) {
        Ok((_, is_final)) => submission.is_final |= is_final,
        Err(e) => return Err(LineParseError::partial(submission, e)),
    }

    if words.len() > 6 {
        debug!("忽略多余的 {} 个字段: {}", words.len() - 6, line.trim());
    }

    Ok(submission)
}

/// 解析日期和时间两个字段
pub fn parse_datetime(date: &str, time: &str) -> Result<NaiveDateTime, GrammarError> {
    let full = format!("{} {}", date, time);
    NaiveDateTime::parse_from_str(&full, DATETIME_FORMAT).map_err(|source| {
        GrammarError::InvalidDateTime {
            value: full,
            source,
        }
    })
}

/// 解析可能带 `*` 前缀的数值
///
/// 负号位于星号之后，例如 `*-10`
///
/// # 返回
/// 返回 (数值, 是否为最终标记)
pub fn parse_number_with_star(token: &str) -> Result<(f64, bool), GrammarError> {
    match token.strip_prefix(FINAL_MARKER) {
        Some(rest) => Ok((parse_number(rest)?, true)),
        None => Ok((parse_number(token)?, false)),
    }
}

fn parse_number(token: &str) -> Result<f64, GrammarError> {
    let value = token
        .parse::<f64>()
        .map_err(|source| GrammarError::InvalidNumber {
            token: token.to_string(),
            source,
        })?;
    if !value.is_finite() {
        return Err(GrammarError::NonFiniteNumber {
            token: token.to_string(),
        });
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> Option<NaiveDateTime> {
        NaiveDate::from_ymd_opt(y, m, d).and_then(|date| date.and_hms_opt(h, min, 0))
    }

    // === 数值解析 ===

    #[test]
    fn number_with_star_variants() {
        assert_eq!(parse_number_with_star("*1").unwrap(), (1.0, true));
        assert_eq!(parse_number_with_star("1").unwrap(), (1.0, false));
        assert_eq!(parse_number_with_star("-1").unwrap(), (-1.0, false));
        assert_eq!(parse_number_with_star("*-10").unwrap(), (-10.0, true));
        assert_eq!(parse_number_with_star("2.5").unwrap(), (2.5, false));
    }

    #[test]
    fn number_with_star_rejects_garbage() {
        assert!(matches!(
            parse_number_with_star("*x"),
            Err(GrammarError::InvalidNumber { .. })
        ));
        assert!(parse_number_with_star("-*1").is_err());
        assert!(parse_number_with_star("*").is_err());
    }

    #[test]
    fn number_with_star_rejects_non_finite() {
        for token in ["nan", "*nan", "inf", "-inf", "*infinity", "NaN"] {
            assert!(
                matches!(
                    parse_number_with_star(token),
                    Err(GrammarError::NonFiniteNumber { .. })
                ),
                "{} should be rejected",
                token
            );
        }
    }

    #[test]
    fn non_finite_points_keep_partial() {
        let err = parse_submission_line("1 2020-02-18 08:45 nan").unwrap_err();
        assert!(matches!(err.error, GrammarError::NonFiniteNumber { .. }));
        let partial = err.partial.unwrap();
        assert_eq!(partial.index, 1);
        assert_eq!(partial.points, 0.0);

        let err = parse_submission_line("2 2020-02-18 08:45 *3 inf").unwrap_err();
        let partial = err.partial.unwrap();
        assert_eq!(partial.points, 3.0);
        assert_eq!(partial.bonus, 0.0);
    }

    // === 单行解析 ===

    #[test]
    fn four_fields_final() {
        let submission = parse_submission_line(" 1  2020-02-18  08:45    *1 ").unwrap();
        assert_eq!(
            submission,
            Submission {
                index: 1,
                datetime: at(2020, 2, 18, 8, 45),
                points: 1.0,
                bonus: 0.0,
                is_final: true,
            }
        );
    }

    #[test]
    fn four_fields_not_final() {
        let submission = parse_submission_line(" 3  2020-02-18  08:45    10 ").unwrap();
        assert_eq!(submission.index, 3);
        assert_eq!(submission.datetime, at(2020, 2, 18, 8, 45));
        assert_eq!(submission.points, 10.0);
        assert!(!submission.is_final);
        assert_eq!(submission.bonus, 0.0);
    }

    #[test]
    fn bonus_and_trailing_marker() {
        let submission = parse_submission_line("2 2020-03-01 23:59 5 1.5 *0").unwrap();
        assert_eq!(submission.points, 5.0);
        assert_eq!(submission.bonus, 1.5);
        assert!(submission.is_final);
    }

    #[test]
    fn trailing_marker_never_clears_final() {
        let submission = parse_submission_line("2 2020-03-01 23:59 *5 0 3").unwrap();
        assert!(submission.is_final);
    }

    #[test]
    fn index_only_is_partial() {
        let err = parse_submission_line("4").unwrap_err();
        assert!(matches!(
            err.error,
            GrammarError::InsufficientFields { found: 1, .. }
        ));
        let partial = err.partial.unwrap();
        assert_eq!(partial.index, 4);
        assert!(partial.datetime.is_none());
    }

    #[test]
    fn missing_points_keeps_datetime() {
        let err = parse_submission_line("5 2020-02-18 08:45").unwrap_err();
        let partial = err.partial.unwrap();
        assert_eq!(partial.index, 5);
        assert_eq!(partial.datetime, at(2020, 2, 18, 8, 45));
    }

    #[test]
    fn bad_datetime_is_reported() {
        let err = parse_submission_line("6 2020-13-18 08:45 1").unwrap_err();
        assert!(matches!(err.error, GrammarError::InvalidDateTime { .. }));
        assert_eq!(err.partial.unwrap().index, 6);
    }

    #[test]
    fn bad_sixth_token_keeps_earlier_fields() {
        let err = parse_submission_line("7 2020-02-18 08:45 *3 1 oops").unwrap_err();
        let partial = err.partial.unwrap();
        assert_eq!(partial.points, 3.0);
        assert_eq!(partial.bonus, 1.0);
        assert!(partial.is_final);
    }

    #[test]
    fn empty_or_non_numeric_index_has_no_partial() {
        assert!(parse_submission_line("   ").unwrap_err().partial.is_none());
        let err = parse_submission_line("datum 2020-02-18 08:45 1").unwrap_err();
        assert!(matches!(err.error, GrammarError::InvalidIndex { .. }));
        assert!(err.partial.is_none());
    }

    #[test]
    fn index_matches_first_token() {
        for line in ["12 2020-02-18 08:45 0", "-3 2020-02-18 08:45 *2 1"] {
            let expected: i64 = line.split_whitespace().next().unwrap().parse().unwrap();
            assert_eq!(parse_submission_line(line).unwrap().index, expected);
        }
    }

    // === 整段解析 ===

    #[test]
    fn lines_before_header_are_ignored() {
        let content = "1 2020-02-18 08:45 *1\n%% datum cas body\n2 2020-02-19 09:00 3\n";
        let submissions = parse_kontr_content(content);
        assert_eq!(submissions.len(), 1);
        assert_eq!(submissions[0].index, 2);
    }

    #[test]
    fn comments_and_blank_lines_do_not_consume_slots() {
        let content = "\
# zapsáno z Kontru 2020-02-18 08:45, v2.2.1

%%       datum    cas  body
 1  2020-02-18  08:45    *1

# POZOR: Tento blok NEUPRAVUJTE!
 2  2020-02-19  10:00    4
";
        let submissions = parse_kontr_content(content);
        let indexes: Vec<i64> = submissions.iter().map(|s| s.index).collect();
        assert_eq!(indexes, vec![1, 2]);
        assert!(submissions[0].is_final);
    }

    #[test]
    fn malformed_lines_are_recovered() {
        let content = "%%\nfoo bar\n3 2020-02-18\n4 2020-02-18 08:45 2\n";
        let submissions = parse_kontr_content(content);
        let indexes: Vec<i64> = submissions.iter().map(|s| s.index).collect();
        assert_eq!(indexes, vec![3, 4]);
    }

    #[test]
    fn no_header_means_no_submissions() {
        assert!(parse_kontr_content("1 2020-02-18 08:45 1\n").is_empty());
    }

    #[test]
    fn classify() {
        assert_eq!(classify_line(""), LineKind::Comment);
        assert_eq!(classify_line("  # note"), LineKind::Comment);
        assert_eq!(classify_line("%% datum"), LineKind::Header);
        assert_eq!(classify_line(" 1 x"), LineKind::Data);
    }
}
