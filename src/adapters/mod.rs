//! External system integrations for Tally.
//!
//! The pipeline's only external system is the filesystem holding the raw
//! export:
//!
//! - [`ndjson`] - File discovery and streaming NDJSON reading
//!
//! # Example
//!
//! ```rust,no_run
//! use tally::adapters::ndjson::{find_ndjson_files, NdjsonReader};
//!
//! # fn example() -> tally::domain::Result<()> {
//! for path in find_ndjson_files("data/raw/fhir", "Condition")? {
//!     for record in NdjsonReader::open(&path)? {
//!         let record = record?;
//!         println!("{}", record["id"]);
//!     }
//! }
//! # Ok(())
//! # }
//! ```

pub mod ndjson;
