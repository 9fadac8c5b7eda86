use chrono::{Datelike, Duration, Local, NaiveDate};

/// 月分表后缀，如 2026-08-29 -> "y2026m08"
pub fn partition_suffix(date: NaiveDate) -> String {
    format!("y{}m{:02}", date.year(), date.month())
}

/// 上一个月的分表后缀（按自然月回退一天取月份）
pub fn previous_partition_suffix(date: NaiveDate) -> String {
    let first = date.with_day(1).unwrap();
    partition_suffix(first - Duration::days(1))
}

pub fn is_first_day_of_month(date: NaiveDate) -> bool {
    date.day() == 1
}

/// run 头表的日期字段，如 "20260829"
pub fn compact_date(date: NaiveDate) -> String {
    date.format("%Y%m%d").to_string()
}

/// run 头表的时间字段，如 "0415"
pub fn compact_time_now() -> String {
    Local::now().format("%H%M").to_string()
}

pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// 银行报文里的请求时间戳（RFC3339）
pub fn request_date_time() -> String {
    Local::now().to_rfc3339()
}
