//! Typed clinical records
//!
//! Raw NDJSON lines are untyped JSON objects. This module is the single
//! narrowing boundary: one constructor per resource type extracts the fields
//! the pipeline consumes and applies the defaults, everything else is ignored.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde_json::Value;

/// Class code used when an encounter carries none
pub const UNKNOWN_CLASS: &str = "unknown";

/// Identifier used in notes when an encounter carries no `id`
pub const UNKNOWN_ID: &str = "unknown";

/// An encounter, narrowed from a FHIR `Encounter` resource
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncounterRecord {
    /// Resource id (`"unknown"` if absent)
    pub id: String,

    /// Encounter class code (`"unknown"` if absent)
    pub class_code: String,

    /// `period.start` as it appeared in the source
    pub period_start: Option<String>,

    /// `period.end` as it appeared in the source
    pub period_end: Option<String>,

    /// `subject.reference`, e.g. `Patient/123`
    pub subject_reference: Option<String>,
}

impl EncounterRecord {
    /// Extracts an encounter from a parsed JSON object
    ///
    /// `class` is read from the R4 shape (`class.code`) and falls back to the
    /// R5 shape (`class[0].coding[0].code`).
    ///
    /// # Examples
    ///
    /// ```
    /// use tally::domain::records::EncounterRecord;
    /// use serde_json::json;
    ///
    /// let record = EncounterRecord::from_json(&json!({
    ///     "id": "enc-1",
    ///     "class": {"code": "AMB"},
    ///     "period": {"start": "2024-03-01T08:00:00Z"},
    ///     "subject": {"reference": "Patient/1"}
    /// }));
    /// assert_eq!(record.class_code, "AMB");
    /// assert_eq!(record.start_date(), Some("2024-03-01".to_string()));
    /// ```
    pub fn from_json(value: &Value) -> Self {
        let period = value.get("period");
        Self {
            id: str_field(value, "id").unwrap_or_else(|| UNKNOWN_ID.to_string()),
            class_code: class_code(value).unwrap_or_else(|| UNKNOWN_CLASS.to_string()),
            period_start: period.and_then(|p| str_field(p, "start")),
            period_end: period.and_then(|p| str_field(p, "end")),
            subject_reference: value.get("subject").and_then(|s| str_field(s, "reference")),
        }
    }

    /// Calendar day of `period.start` as `YYYY-MM-DD`
    ///
    /// Taken from the leading date portion of the raw value, so the day is the
    /// one the source recorded, not a timezone-shifted one. `None` when the
    /// start is absent or does not begin with a valid date.
    pub fn start_date(&self) -> Option<String> {
        let start = self.period_start.as_deref()?;
        let day = start.get(..10)?;
        NaiveDate::parse_from_str(day, "%Y-%m-%d").ok()?;
        Some(day.to_string())
    }

    /// `period.start` as an instant, if parsable
    pub fn start_instant(&self) -> Option<DateTime<Utc>> {
        self.period_start.as_deref().and_then(parse_instant)
    }

    /// `period.end` as an instant, if parsable
    pub fn end_instant(&self) -> Option<DateTime<Utc>> {
        self.period_end.as_deref().and_then(parse_instant)
    }
}

/// A condition, narrowed from the first coding of a FHIR `Condition` resource
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConditionRecord {
    /// Code of the first coding (empty if absent)
    pub code: String,

    /// Display of the first coding (empty if absent)
    pub display: String,
}

impl ConditionRecord {
    /// Extracts a condition from a parsed JSON object
    ///
    /// Only `code.coding[0]` is considered. Returns `None` when that coding is
    /// missing or carries neither a code nor a display.
    pub fn from_json(value: &Value) -> Option<Self> {
        let coding = value.get("code")?.get("coding")?.as_array()?.first()?;
        let code = str_field(coding, "code");
        let display = str_field(coding, "display");
        if code.is_none() && display.is_none() {
            return None;
        }
        Some(Self {
            code: code.unwrap_or_default(),
            display: display.unwrap_or_default(),
        })
    }
}

/// Date-time layouts with a numeric offset that RFC 3339 parsing rejects
const OFFSET_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f%z", "%Y-%m-%dT%H:%M%z"];

/// Date-time layouts without an offset, taken as UTC
const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%dT%H:%MZ",
];

/// Parses a FHIR `dateTime`
///
/// Accepts RFC 3339, an offset without colon (`+0100`), minute precision with
/// or without an offset, a naive date-time (taken as UTC), or a bare date
/// (midnight UTC).
pub fn parse_instant(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Some(dt) = OFFSET_FORMATS
        .iter()
        .find_map(|format| DateTime::parse_from_str(raw, format).ok())
    {
        return Some(dt.with_timezone(&Utc));
    }
    if let Some(naive) = NAIVE_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
    {
        return Some(naive.and_utc());
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

fn str_field(value: &Value, key: &str) -> Option<String> {
    value
        .get(key)
        .and_then(Value::as_str)
        .map(str::to_string)
}

fn class_code(value: &Value) -> Option<String> {
    match value.get("class")? {
        Value::Object(_) => str_field(&value["class"], "code"),
        Value::Array(items) => {
            let first = items.first()?;
            first
                .get("coding")
                .and_then(Value::as_array)
                .and_then(|codings| codings.first())
                .and_then(|coding| str_field(coding, "code"))
                .or_else(|| str_field(first, "code"))
        }
        _ => None,
    }
}
