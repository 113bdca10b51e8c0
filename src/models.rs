//! Core Data Models
//!
//! This module defines the data structures shared across the harvesting and
//! aggregation pipeline. Data flows through them in this order:
//!
//! 1. **Raw rows**: [`SearchAnalyticsRow`] - per-dimension-combination tuples
//!    as returned by the reporting API, alive for one fetch cycle only
//! 2. **Canonical records**: [`CanonicalMetric`] - the normalized shape shared
//!    by both metric sources
//! 3. **Aggregates**: [`TableRow`], [`ChartDataPoint`], [`ComparisonResult`] -
//!    grouped output handed to rendering
//!
//! ## Supporting Types
//!
//! - [`DateRange`] - inclusive ISO day range
//! - [`FetchChunk`] - one bounded sub-range query
//! - [`Completeness`] - advisory truncation/failure accounting per harvest
//! - [`Credential`] - opaque bearer credential handle, passed explicitly into
//!   every harvest call (no process-global token state)
//!
//! All wire-facing types use the provider's camelCase field names via serde
//! renames; internal-only fields stay snake_case.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Which collaborator a canonical record came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricSource {
    SearchConsole,
    Ahrefs,
}

/// Dimensions supported by the reporting API's query endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dimension {
    Query,
    Page,
    Country,
    Device,
    Date,
}

impl Dimension {
    pub fn as_str(&self) -> &'static str {
        match self {
            Dimension::Query => "query",
            Dimension::Page => "page",
            Dimension::Country => "country",
            Dimension::Device => "device",
            Dimension::Date => "date",
        }
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One row from the reporting API. `keys` is positional: it lines up with the
/// dimension list sent in the request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchAnalyticsRow {
    #[serde(default)]
    pub keys: Vec<String>,
    #[serde(default)]
    pub clicks: f64,
    #[serde(default)]
    pub impressions: f64,
    #[serde(default)]
    pub ctr: f64,
    #[serde(default)]
    pub position: f64,
}

/// Inclusive day range, `start <= end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    #[serde(rename = "startDate")]
    pub start: NaiveDate,
    #[serde(rename = "endDate")]
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    /// Number of days covered, inclusive of both endpoints.
    pub fn len_days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

/// One bounded query against the provider, sized to stay under the row cap.
#[derive(Debug, Clone)]
pub struct FetchChunk {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub dimensions: Vec<Dimension>,
}

/// Advisory per-harvest accounting. A truncated chunk is present but capped;
/// a failed chunk is missing entirely.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Completeness {
    #[serde(rename = "totalChunks")]
    pub total_chunks: usize,
    #[serde(rename = "chunksTruncated")]
    pub chunks_truncated: usize,
    #[serde(rename = "chunksFailed")]
    pub chunks_failed: usize,
}

impl Completeness {
    pub fn single(truncated: bool) -> Self {
        Self {
            total_chunks: 1,
            chunks_truncated: usize::from(truncated),
            chunks_failed: 0,
        }
    }

    pub fn is_complete(&self) -> bool {
        self.chunks_truncated == 0 && self.chunks_failed == 0
    }

    /// Fold another harvest's accounting into this one, for views built
    /// from several harvests (overview current + comparison).
    pub fn combine(self, other: Completeness) -> Completeness {
        Completeness {
            total_chunks: self.total_chunks + other.total_chunks,
            chunks_truncated: self.chunks_truncated + other.chunks_truncated,
            chunks_failed: self.chunks_failed + other.chunks_failed,
        }
    }
}

/// Output of one harvest call.
#[derive(Debug, Clone)]
pub struct HarvestResult {
    pub rows: Vec<SearchAnalyticsRow>,
    pub completeness: Completeness,
    pub range: DateRange,
}

/// The normalized record both sources map into.
///
/// `position` semantics differ by source: for the search console it is only
/// meaningful once impression-weighted over a cohort; for Ahrefs it is a
/// single point-in-time rank. The aggregator keeps them apart.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CanonicalMetric {
    pub date: NaiveDate,
    pub source: MetricSource,
    pub query: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub clicks: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub impressions: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ctr: Option<f64>,
    pub position: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub volume: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<f64>,
    #[serde(rename = "costPerClick", skip_serializing_if = "Option::is_none")]
    pub cost_per_click: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub traffic: Option<f64>,
    #[serde(rename = "serpFeatures", skip_serializing_if = "Option::is_none")]
    pub serp_features: Option<Vec<String>>,
    #[serde(rename = "previousTraffic", skip_serializing_if = "Option::is_none")]
    pub previous_traffic: Option<f64>,
    #[serde(rename = "previousPosition", skip_serializing_if = "Option::is_none")]
    pub previous_position: Option<f64>,
    #[serde(rename = "previousDate", skip_serializing_if = "Option::is_none")]
    pub previous_date: Option<NaiveDate>,
}

/// A pre-parsed row from the keyword-export collaborator. The CSV import
/// itself lives outside this crate; rows arrive already shaped like this.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AhrefsMetric {
    pub keyword: String,
    pub position: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub volume: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<f64>,
    #[serde(rename = "costPerClick", skip_serializing_if = "Option::is_none")]
    pub cost_per_click: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub traffic: Option<f64>,
    #[serde(rename = "serpFeatures", skip_serializing_if = "Option::is_none")]
    pub serp_features: Option<Vec<String>>,
    #[serde(rename = "previousTraffic", skip_serializing_if = "Option::is_none")]
    pub previous_traffic: Option<f64>,
    #[serde(rename = "previousPosition", skip_serializing_if = "Option::is_none")]
    pub previous_position: Option<f64>,
    #[serde(rename = "previousDate", skip_serializing_if = "Option::is_none")]
    pub previous_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
}

/// Summed/derived metrics for one period.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct AggregateStats {
    pub clicks: u64,
    pub impressions: u64,
    pub ctr: f64,
    pub position: f64,
}

/// Period-over-period deltas. Percentages are rounded to whole percent;
/// `position` is the absolute rank change, positive when rank improved.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DeltaStats {
    #[serde(rename = "clicksPct")]
    pub clicks_pct: f64,
    #[serde(rename = "impressionsPct")]
    pub impressions_pct: f64,
    #[serde(rename = "ctrPct")]
    pub ctr_pct: f64,
    #[serde(rename = "positionDelta")]
    pub position_delta: f64,
}

/// Overview comparison between the primary and comparison windows.
/// `changes` is `None` when the comparison window produced no rows.
#[derive(Debug, Clone, Serialize)]
pub struct ComparisonResult {
    pub current: AggregateStats,
    pub previous: AggregateStats,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub changes: Option<DeltaStats>,
}

/// Per-metric percent change within one grouped row, first observation
/// against last observation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RowChanges {
    pub clicks: f64,
    pub impressions: f64,
    pub ctr: f64,
    pub position: f64,
}

/// One aggregated row keyed by query or URL.
#[derive(Debug, Clone, Serialize)]
pub struct TableRow {
    pub key: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    pub clicks: u64,
    pub impressions: u64,
    pub ctr: f64,
    pub position: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub volume: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub traffic: Option<f64>,
    #[serde(rename = "serpFeatures", skip_serializing_if = "Option::is_none")]
    pub serp_features: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub changes: Option<RowChanges>,
}

/// One date-keyed point for chart rendering.
#[derive(Debug, Clone, Serialize)]
pub struct ChartDataPoint {
    pub date: NaiveDate,
    pub clicks: u64,
    pub impressions: u64,
    pub ctr: f64,
    pub position: f64,
}

/// Opaque credential handle supplied by the auth collaborator. Held by the
/// calling session and passed into each harvest; never cached module-wide.
#[derive(Clone)]
pub struct Credential {
    access_token: String,
}

impl Credential {
    pub fn new(access_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
        }
    }

    pub fn bearer(&self) -> &str {
        &self.access_token
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Keep tokens out of logs.
        f.write_str("Credential(***)")
    }
}
