//! 日期时间工具
//!
//! - HTTP 日期（RFC 1123）格式化与解析，用于请求签名和时钟偏差检测
//! - 毫秒级 Unix 时间戳 <-> `DateTime<Utc>` 的 Serde 适配

use chrono::{DateTime, Utc};

/// 格式化为 RFC 1123 HTTP 日期，例如 `Tue, 15 Nov 1994 08:12:31 GMT`
pub fn format_http_date(dt: DateTime<Utc>) -> String {
    dt.format("%a, %d %b %Y %H:%M:%S GMT").to_string()
}

/// 解析 HTTP 日期头（RFC 1123 / RFC 2822 兼容）
pub fn parse_http_date(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc2822(value.trim())
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

/// 毫秒时间戳字段的 Serde 适配，用法：`#[serde(with = "crate::utils::datetime::millis")]`
pub mod millis {
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(dt: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_i64(dt.timestamp_millis())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        use serde::de::Error;

        let ts = i64::deserialize(deserializer)?;
        DateTime::from_timestamp_millis(ts)
            .ok_or_else(|| Error::custom(format!("Invalid millisecond timestamp: {ts}")))
    }
}
