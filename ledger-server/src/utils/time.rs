//! 时间工具函数: 业务时区转换
//!
//! 业务日期 (YYYY-MM-DD) 与 Unix millis 之间的换算统一在这里完成，
//! repository 层只接收 `i64` 时间戳和日期字符串。

use chrono::NaiveDate;
use chrono_tz::Tz;

use super::{LedgerError, LedgerResult};
use shared::error::ErrorCode;

/// 月结和月度报表允许的最早年份
pub const MIN_REPORT_YEAR: i32 = 2000;

/// 解析日期字符串 (YYYY-MM-DD)
pub fn parse_date(date: &str) -> LedgerResult<NaiveDate> {
    shared::util::parse_business_date(date).ok_or_else(|| {
        LedgerError::Validation(
            ErrorCode::InvalidFormat,
            format!("Invalid date format: {date}"),
        )
    })
}

/// 日期开始 (00:00:00) → Unix millis (业务时区)
pub fn day_start_millis(date: NaiveDate, tz: Tz) -> i64 {
    let naive = date.and_time(chrono::NaiveTime::MIN);
    naive
        .and_local_timezone(tz)
        .earliest()
        .map(|dt| dt.timestamp_millis())
        .unwrap_or_else(|| naive.and_utc().timestamp_millis())
}

/// 月份边界: (当月第一天, 当月最后一天, 次月第一天)
///
/// 年份早于 [`MIN_REPORT_YEAR`] 或月份不在 1..=12 时返回 Validation。
pub fn month_bounds(year: i32, month: u32) -> LedgerResult<(NaiveDate, NaiveDate, NaiveDate)> {
    let invalid = || {
        LedgerError::Validation(
            ErrorCode::InvalidPeriod,
            format!("Invalid period: {year}-{month:02}"),
        )
    };
    if year < MIN_REPORT_YEAR || !(1..=12).contains(&month) {
        return Err(invalid());
    }
    let first = NaiveDate::from_ymd_opt(year, month, 1).ok_or_else(invalid)?;
    let next_first = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    }
    .ok_or_else(invalid)?;
    let last = next_first.pred_opt().ok_or_else(invalid)?;
    Ok((first, last, next_first))
}
