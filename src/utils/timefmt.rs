//! Serde helper for `HH:MM` times. The store's wire format carries slot times
//! without seconds, which chrono's default `NaiveTime` serde does not accept.

use chrono::NaiveTime;
use serde::{self, Deserialize, Deserializer, Serializer};

pub const TIME_FORMAT: &str = "%H:%M";

pub fn serialize<S>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&time.format(TIME_FORMAT).to_string())
}

pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveTime, D::Error>
where
    D: Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    parse_time(&s).map_err(serde::de::Error::custom)
}

/// Parses `HH:MM`, tolerating a trailing seconds component (`HH:MM:SS`) since
/// Postgres time columns round-trip with seconds attached.
pub fn parse_time(s: &str) -> Result<NaiveTime, String> {
    NaiveTime::parse_from_str(s, TIME_FORMAT)
        .or_else(|_| NaiveTime::parse_from_str(s, "%H:%M:%S"))
        .map_err(|e| format!("invalid time '{}': {}", s, e))
}

pub fn format_time(time: NaiveTime) -> String {
    time.format(TIME_FORMAT).to_string()
}
