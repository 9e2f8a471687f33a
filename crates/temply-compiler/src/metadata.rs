//! Template metadata header.
//!
//! A template may open with a comment of `key: value` lines:
//!
//! ```text
//! {#-
//! description: Order confirmation
//! created_at: 2024-07-01 12:34:56
//! created_by: alice
//! -#}
//! ```
//!
//! Timestamps are wall-clock times in JST (UTC+9).

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, TimeZone};

const OPEN: &str = "{#-";
const CLOSE: &str = "-#}";

/// Format timestamps render with.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
const DATETIME_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%Y/%m/%d %H:%M:%S"];
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d"];

const JST_OFFSET_SECS: i32 = 9 * 3600;

pub fn jst() -> FixedOffset {
    FixedOffset::east_opt(JST_OFFSET_SECS).expect("UTC+9 is a valid offset")
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Metadata {
    pub description: Option<String>,
    pub created_at: Option<DateTime<FixedOffset>>,
    pub created_by: Option<String>,
    pub updated_at: Option<DateTime<FixedOffset>>,
    pub updated_by: Option<String>,
}

impl Metadata {
    /// Metadata from the header of `source`; empty when there is none.
    pub fn parse(source: &str) -> Self {
        Self::split(source).0
    }

    /// Splits `source` into its metadata and the text after the header.
    pub fn split(source: &str) -> (Self, &str) {
        let Some(rest) = source.strip_prefix(OPEN) else {
            return (Self::default(), source);
        };
        let Some(end) = rest.find(CLOSE) else {
            return (Self::default(), source);
        };

        let mut meta = Self::default();
        for line in rest[..end].lines() {
            let Some((key, value)) = line.split_once(':') else {
                continue;
            };
            let value = value.trim();
            let value = (!value.is_empty()).then(|| value.to_string());
            match key.trim() {
                "description" => meta.description = value,
                "created_at" => meta.created_at = value.as_deref().and_then(parse_timestamp),
                "created_by" => meta.created_by = value,
                "updated_at" => meta.updated_at = value.as_deref().and_then(parse_timestamp),
                "updated_by" => meta.updated_by = value,
                other => tracing::trace!(key = other, "ignoring metadata key"),
            }
        }
        (meta, &rest[end + CLOSE.len()..])
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// The header comment, every key present.
    pub fn to_comment(&self) -> String {
        let text = |value: &Option<String>| value.clone().unwrap_or_default();
        let lines = [
            OPEN.to_string(),
            format!("description: {}", text(&self.description)),
            format!("created_at: {}", format_timestamp(self.created_at)),
            format!("created_by: {}", text(&self.created_by)),
            format!("updated_at: {}", format_timestamp(self.updated_at)),
            format!("updated_by: {}", text(&self.updated_by)),
            CLOSE.to_string(),
        ];
        lines.join("\n")
    }
}

/// Reads a JST wall-clock timestamp; `None` when no accepted format matches.
pub fn parse_timestamp(value: &str) -> Option<DateTime<FixedOffset>> {
    let naive = DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|fmt| NaiveDate::parse_from_str(value, fmt).ok())
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })?;
    jst().from_local_datetime(&naive).single()
}

fn format_timestamp(value: Option<DateTime<FixedOffset>>) -> String {
    value
        .map(|ts| ts.with_timezone(&jst()).format(TIMESTAMP_FORMAT).to_string())
        .unwrap_or_default()
}
