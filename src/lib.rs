// Tally - FHIR encounter metrics and forecast builder
// Copyright (c) 2025 Tally Contributors
// Licensed under the MIT License

//! # Tally - FHIR Encounter Metrics and Forecast
//!
//! Tally turns a bulk FHIR export (one JSON resource per line, spread across
//! many `.ndjson` files) into two derived JSON artifacts: a metrics snapshot
//! and a 14-day encounter volume forecast.
//!
//! ## Overview
//!
//! This library provides the core functionality for:
//! - **Reading** NDJSON files as a lazy, line-numbered record stream
//! - **Discovering** input files recursively by resource prefix
//! - **Aggregating** encounters and conditions into KPIs, series and rankings
//! - **Forecasting** daily volume from a weekday-average baseline
//! - **Writing** both artifacts atomically and checking them afterwards
//!
//! ## Architecture
//!
//! Tally follows a layered architecture:
//!
//! - [`cli`] - Command-line interface and argument parsing
//! - [`core`] - Business logic (aggregate, forecast, pipeline, verification)
//! - [`adapters`] - NDJSON input
//! - [`domain`] - Core domain types and models
//! - [`config`] - Configuration management
//! - [`logging`] - Structured logging and observability
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use tally::config::load_config_or_default;
//! use tally::core::pipeline::PipelineCoordinator;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = load_config_or_default("tally.toml")?;
//!     let run = PipelineCoordinator::new(config).execute().await?;
//!
//!     println!("Derived {} encounters", run.metrics.kpis.total_encounters);
//!     Ok(())
//! }
//! ```
//!
//! ## Error Handling
//!
//! All fallible operations return [`domain::Result`], carrying a
//! [`domain::TallyError`]. Malformed input reports the file, the 1-based line
//! number and an excerpt of the offending line:
//!
//! ```rust,no_run
//! use tally::adapters::ndjson::NdjsonReader;
//! use tally::domain::TallyError;
//!
//! # fn example() -> tally::domain::Result<()> {
//! for record in NdjsonReader::open("Encounter.000.ndjson")? {
//!     match record {
//!         Ok(value) => println!("{}", value["id"]),
//!         Err(TallyError::MalformedRecord { line, .. }) => eprintln!("bad line {line}"),
//!         Err(e) => return Err(e),
//!     }
//! }
//! # Ok(())
//! # }
//! ```

pub mod adapters;
pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod logging;
