//! Rankscope Library
//!
//! A Rust library for harvesting search-performance metrics from a metered,
//! row-limited reporting API, merging them with point-in-time keyword
//! exports, and folding both into comparable aggregates across arbitrary
//! date ranges.
//!
//! ## Core Features
//!
//! - **Complete harvests against a truncating API**: the provider silently
//!   caps results past a row ceiling; dimensioned time-series requests are
//!   split into bounded chunks sized to stay well under it
//! - **Lookback-aware date windows**: ranges are validated against the
//!   provider's rolling history limit, clamping rather than failing
//! - **Comparison presets**: previous-period, week-over-week and
//!   year-over-year windows derived from a fixed preset vocabulary
//! - **Weighted aggregation**: impression-weighted positions, derived CTR,
//!   and first-vs-last-observation change percentages
//! - **Best-effort completeness**: truncated or failed chunks degrade to an
//!   advisory indicator instead of aborting a multi-minute harvest
//!
//! ## Architecture Overview
//!
//! - [`models`] - shared data structures for raw rows, canonical records,
//!   and aggregates
//! - [`window`] - pure date-range arithmetic: validation, chunk sizing,
//!   preset derivation
//! - [`provider`] - the reporting-API trait seam and its production client
//! - [`fetcher`] - bounded window queries and sequential chunked harvesting
//! - [`harvester`] - per-request strategy selection and orchestration
//! - [`normalizer`] - raw provider rows into canonical records
//! - [`aggregator`] - grouping, weighted means, period-over-period deltas
//! - [`columns`] - header-matching rule table for the import collaborator
//! - [`store`] - atomic per-source snapshots and stale-harvest discard
//! - [`config`] - configuration with file and environment support
//! - [`logging`] - structured logging setup
//! - [`display`] - terminal and JSON rendering
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use rankscope::harvester::{Harvester, HarvestMode};
//! use rankscope::models::{Credential, DateRange, Dimension};
//! use rankscope::provider::GscClient;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let credential = Credential::new(std::env::var("RANKSCOPE_TOKEN")?);
//! let client = GscClient::from_config(credential);
//! let harvester = Harvester::from_config(&client);
//!
//! let range = DateRange::new(
//!     chrono::NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(),
//!     chrono::NaiveDate::from_ymd_opt(2025, 6, 28).unwrap(),
//! );
//! let result = harvester
//!     .harvest("sc-domain:example.com", range, &[Dimension::Query], HarvestMode::Full)
//!     .await?;
//! println!("{} rows, complete: {}", result.rows.len(), result.completeness.is_complete());
//! # Ok(())
//! # }
//! ```

pub mod aggregator;
pub mod columns;
pub mod config;
pub mod display;
pub mod error;
pub mod fetcher;
pub mod harvester;
pub mod logging;
pub mod models;
pub mod normalizer;
pub mod provider;
pub mod store;
pub mod window;

pub use error::HarvestError;
pub use harvester::{HarvestMode, Harvester};
pub use models::*;
