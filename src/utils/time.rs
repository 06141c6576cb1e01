//! 时间处理工具

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;

/// 获取 N 小时前的时间
pub fn hours_ago(hours: i64) -> DateTime<Utc> {
    Utc::now() - Duration::hours(hours)
}

/// 格式化为 ISO 8601
pub fn format_iso8601(dt: &DateTime<Utc>) -> String {
    dt.format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string()
}

/// 解析 ISO 8601 时间字符串
pub fn parse_iso8601(s: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
    DateTime::parse_from_rfc3339(s).map(|dt| dt.with_timezone(&Utc))
}

/// 解析后端返回的时间
///
/// 后端既可能返回带时区的 RFC 3339，也可能返回不带时区的时间（按 UTC 处理），
/// 日期字段（如截止日期）只有 `YYYY-MM-DD`，按当天 0 点处理。
pub fn parse_api_datetime(s: &str) -> Result<DateTime<Utc>, String> {
    if let Ok(dt) = parse_iso8601(s) {
        return Ok(dt);
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
            return Ok(Utc.from_utc_datetime(&naive));
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        if let Some(naive) = date.and_hms_opt(0, 0, 0) {
            return Ok(Utc.from_utc_datetime(&naive));
        }
    }
    Err(format!("无法解析的时间格式: {}", s))
}

/// 按展示时区格式化（dd/MM/yyyy HH:mm:ss）
pub fn format_local(dt: &DateTime<Utc>, tz: &Tz) -> String {
    dt.with_timezone(tz).format("%d/%m/%Y %H:%M:%S").to_string()
}

/// 按展示时区格式化为时分
pub fn format_local_time(dt: &DateTime<Utc>, tz: &Tz) -> String {
    dt.with_timezone(tz).format("%H:%M:%S").to_string()
}

/// serde 辅助：宽松解析后端时间字段
pub mod api_datetime {
    use super::{format_iso8601, parse_api_datetime};
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(dt: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format_iso8601(dt))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        let s = String::deserialize(deserializer)?;
        parse_api_datetime(&s).map_err(serde::de::Error::custom)
    }

    /// 可选时间字段（缺失或 null 均为 None）
    pub mod option {
        use super::super::{format_iso8601, parse_api_datetime};
        use chrono::{DateTime, Utc};
        use serde::{Deserialize, Deserializer, Serializer};

        pub fn serialize<S: Serializer>(
            dt: &Option<DateTime<Utc>>,
            serializer: S,
        ) -> Result<S::Ok, S::Error> {
            match dt {
                Some(dt) => serializer.serialize_str(&format_iso8601(dt)),
                None => serializer.serialize_none(),
            }
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(
            deserializer: D,
        ) -> Result<Option<DateTime<Utc>>, D::Error> {
            match Option::<String>::deserialize(deserializer)? {
                Some(s) => parse_api_datetime(&s).map(Some).map_err(serde::de::Error::custom),
                None => Ok(None),
            }
        }
    }
}
