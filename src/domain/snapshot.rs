//! Derived artifact models
//!
//! These types serialize to the two JSON documents the pipeline produces:
//! the metrics summary and the volume forecast. Field names on the wire are
//! snake_case and fixed; consumers read them directly.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Encounters starting on one calendar day
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyCount {
    /// Day as `YYYY-MM-DD`
    pub date: String,
    /// Number of encounters
    pub count: u64,
}

impl DailyCount {
    /// Creates a daily count
    pub fn new(date: impl Into<String>, count: u64) -> Self {
        Self {
            date: date.into(),
            count,
        }
    }
}

/// Encounters per class code
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassBreakdown {
    /// Encounter class code
    #[serde(rename = "class")]
    pub class_code: String,
    /// Number of encounters
    pub count: u64,
}

/// Occurrences of one condition code
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConditionFrequency {
    pub code: String,
    pub display: String,
    pub count: u64,
}

/// Headline indicators
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Kpis {
    /// All encounter records read
    pub total_encounters: u64,

    /// Mean length of stay in days, 2 decimals; null without any valid stay
    #[serde(rename = "avg_los_days")]
    pub avg_length_of_stay_days: Option<f64>,

    /// Share of multi-visit patients with two consecutive visits ≤30 days apart
    #[serde(rename = "revisit_rate_30d")]
    pub revisit_rate_30_day: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Series {
    /// Ascending by date, one entry per distinct day
    pub encounters_by_day: Vec<DailyCount>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Breakdowns {
    /// Descending by count, ties ascending by class code
    pub encounters_by_class: Vec<ClassBreakdown>,
}

/// Metrics artifact: the result of one full aggregation run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    /// Wall-clock time of the run
    #[serde(with = "iso_millis")]
    pub generated_at: DateTime<Utc>,

    pub kpis: Kpis,

    pub series: Series,

    pub breakdowns: Breakdowns,

    /// At most 10 entries, descending by count, ties ascending by code
    pub top_conditions: Vec<ConditionFrequency>,

    /// Data-quality warnings, one per affected record
    pub notes: Vec<String>,
}

/// One projected day
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForecastPoint {
    pub date: String,

    #[serde(rename = "yhat")]
    pub predicted_value: i64,

    #[serde(rename = "lower")]
    pub lower_bound: i64,

    #[serde(rename = "upper")]
    pub upper_bound: i64,
}

/// Forecast artifact
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForecastSnapshot {
    #[serde(with = "iso_millis")]
    pub generated_at: DateTime<Utc>,

    /// Identifier of the forecasting method
    pub method: String,

    /// The window the forecast was computed from (≤28 days)
    pub history: Vec<DailyCount>,

    /// Exactly 14 points when history is non-empty, otherwise none
    pub forecast: Vec<ForecastPoint>,
}

/// `generated_at` on the wire: UTC, millisecond precision, `Z` suffix
pub mod iso_millis {
    use chrono::{DateTime, SecondsFormat, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&value.to_rfc3339_opts(SecondsFormat::Millis, true))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        DateTime::parse_from_rfc3339(&raw)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(serde::de::Error::custom)
    }
}
