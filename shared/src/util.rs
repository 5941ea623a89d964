/// 获取当前 UTC 时间戳（毫秒）
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// 业务日期格式 (YYYY-MM-DD)
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// 解析业务日期字符串，格式不符返回 None
pub fn parse_business_date(date: &str) -> Option<chrono::NaiveDate> {
    chrono::NaiveDate::parse_from_str(date, DATE_FORMAT).ok()
}
