//! Core business logic for Tally.
//!
//! # Modules
//!
//! - [`aggregate`] - Per-file scanning and the metrics snapshot
//! - [`forecast`] - 14-day weekday-average forecast
//! - [`pipeline`] - Run orchestration and artifact writing
//! - [`verification`] - Checks on written artifacts
//!
//! # Derive Workflow
//!
//! 1. **Discover**: Find encounter and condition NDJSON files
//! 2. **Scan**: Read each file once into a partial aggregate
//! 3. **Merge**: Combine partials in discovery order
//! 4. **Derive**: Compute KPIs, breakdowns and the forecast
//! 5. **Write**: Replace both artifacts atomically
//!
//! # Example
//!
//! ```rust,no_run
//! use tally::config::load_config;
//! use tally::core::pipeline::PipelineCoordinator;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("tally.toml")?;
//! let run = PipelineCoordinator::new(config).execute().await?;
//!
//! println!("Encounters: {}", run.metrics.kpis.total_encounters);
//! println!("Forecast rows: {}", run.forecast.forecast.len());
//! # Ok(())
//! # }
//! ```

pub mod aggregate;
pub mod forecast;
pub mod pipeline;
pub mod verification;
