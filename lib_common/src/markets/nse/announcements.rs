//! # NSE Corporate Announcements
//!
//! Raw announcement records are kept as the provider sent them; only the
//! fields listed on `NormalizedAnnouncement` are ever read. Normalization
//! never fails: missing or falsy fields become `""` and a timestamp that does
//! not match the provider format is passed through as-is.

use chrono::{NaiveDateTime, Timelike};
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use static_init::dynamic;

/// Segment stamped on every normalized record.
pub const SEGMENT: &str = "SME";

/// Format of `announcementTime` as sent by the provider.
pub const PROVIDER_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// ISO-8601 local date-time, no offset, second precision.
pub const ISO_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Exact textual shape of `PROVIDER_TIME_FORMAT`. chrono alone accepts a
/// missing separator and surrounding whitespace.
#[dynamic]
static PROVIDER_TIME_SHAPE: Result<Regex, regex::Error> =
    Regex::new(r"^[0-9]{4}-[0-9]{1,2}-[0-9]{1,2} [0-9]{1,2}:[0-9]{1,2}:[0-9]{1,2}$");

/// An announcement exactly as returned by the provider: an unordered bag of
/// JSON fields, any of which may be absent or null.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawAnnouncement(Map<String, Value>);

impl RawAnnouncement {
    /// Wraps an already parsed JSON object.
    pub fn new(fields: Map<String, Value>) -> Self {
        Self(fields)
    }

    /// Returns the raw value under `key`, if present.
    pub fn field(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Returns the value under `key`, or `""` when it is absent or falsy.
    fn field_or_empty(&self, key: &str) -> Value {
        match self.field(key) {
            Some(v) if is_truthy(v) => v.clone(),
            _ => Value::String(String::new()),
        }
    }
}

impl From<Map<String, Value>> for RawAnnouncement {
    fn from(fields: Map<String, Value>) -> Self {
        Self::new(fields)
    }
}

/// The stable output shape served to clients.
///
/// Passthrough fields hold the provider's JSON value unchanged when it is
/// truthy (so a numeric `id` stays numeric) and `""` otherwise. No field is
/// ever null.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedAnnouncement {
    /// From the provider's `id`.
    pub announcement_id: Value,
    /// Trading symbol of the issuer.
    pub symbol: Value,
    /// From the provider's `companyName`.
    pub company_name: Value,
    /// Headline of the announcement.
    pub subject: Value,
    /// The provider timestamp, untouched.
    pub announcement_time: Value,
    /// `announcement_time` in ISO-8601 when it parses, otherwise the same value.
    pub formatted_time: Value,
    /// From the provider's `attachmentUrl`.
    pub pdf_url: Value,
    /// Always `SEGMENT`.
    pub segment: String,
    /// From the provider's `documentType`.
    pub document_type: Value,
    /// Free-text body of the announcement.
    pub description: Value,
}

impl From<&RawAnnouncement> for NormalizedAnnouncement {
    fn from(raw: &RawAnnouncement) -> Self {
        normalize(raw)
    }
}

/// Maps a raw provider record into the fixed output schema.
pub fn normalize(raw: &RawAnnouncement) -> NormalizedAnnouncement {
    let announcement_time = raw.field_or_empty("announcementTime");
    let formatted_time = format_time(&announcement_time);

    NormalizedAnnouncement {
        announcement_id: raw.field_or_empty("id"),
        symbol: raw.field_or_empty("symbol"),
        company_name: raw.field_or_empty("companyName"),
        subject: raw.field_or_empty("subject"),
        announcement_time,
        formatted_time,
        pdf_url: raw.field_or_empty("attachmentUrl"),
        segment: SEGMENT.to_string(),
        document_type: raw.field_or_empty("documentType"),
        description: raw.field_or_empty("description"),
    }
}

/// Normalizes every record, preserving order.
pub fn normalize_all(raws: &[RawAnnouncement]) -> Vec<NormalizedAnnouncement> {
    raws.iter().map(normalize).collect()
}

/// Reformats a provider timestamp into ISO-8601.
///
/// Anything that is not a string in `PROVIDER_TIME_FORMAT` comes back unchanged,
/// including leap seconds (`23:59:60`).
pub fn format_time(value: &Value) -> Value {
    match value {
        Value::String(s) if has_provider_shape(s) => {
            match NaiveDateTime::parse_from_str(s, PROVIDER_TIME_FORMAT) {
                Ok(dt) if dt.nanosecond() < 1_000_000_000 => {
                    Value::String(dt.format(ISO_TIME_FORMAT).to_string())
                }
                _ => value.clone(),
            }
        }
        _ => value.clone(),
    }
}

fn has_provider_shape(s: &str) -> bool {
    PROVIDER_TIME_SHAPE
        .as_ref()
        .is_ok_and(|shape| shape.is_match(s))
}

/// JSON truthiness: null, false, zero, and empty strings, arrays and objects are falsy.
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}
