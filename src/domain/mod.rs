//! Domain models and types for Tally.
//!
//! # Overview
//!
//! The domain layer provides:
//! - **Typed records** ([`EncounterRecord`], [`ConditionRecord`]) narrowed from raw JSON
//! - **Artifact models** ([`MetricsSnapshot`], [`ForecastSnapshot`])
//! - **Error types** ([`TallyError`]) and the [`Result`] alias
//! - **Label lookup** for encounter class codes ([`labels`])
//!
//! # Error Handling
//!
//! All fallible operations return [`Result<T, TallyError>`]. Structurally
//! invalid input is fatal; well-formed input with missing fields is tolerated
//! and surfaces as [`MetricsSnapshot::notes`]:
//!
//! ```rust
//! use tally::domain::Result;
//!
//! fn example() -> Result<()> {
//!     let files = tally::adapters::ndjson::find_ndjson_files("data/raw/fhir", "Encounter")?;
//!     println!("{} encounter files", files.len());
//!     Ok(())
//! }
//! ```

pub mod errors;
pub mod labels;
pub mod records;
pub mod result;
pub mod snapshot;

// Re-export commonly used types for convenience
pub use errors::TallyError;
pub use records::{ConditionRecord, EncounterRecord};
pub use result::Result;
pub use snapshot::{
    Breakdowns, ClassBreakdown, ConditionFrequency, DailyCount, ForecastPoint, ForecastSnapshot,
    Kpis, MetricsSnapshot, Series,
};
