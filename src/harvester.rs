//! Harvest orchestration.
//!
//! A harvest is one logical (site, range, dimensions, mode) request. The
//! harvester picks the cheapest fetch strategy that still covers the
//! request, runs it through [`ChunkedFetcher`], and returns rows plus an
//! advisory completeness report. Downstream consumers render whatever rows
//! arrive and separately surface a "data may be incomplete" indicator when
//! the completeness report says so.
//!
//! Strategy table:
//!
//! | dimensions | mode  | strategy                                         |
//! |------------|-------|--------------------------------------------------|
//! | none       | any   | single unchunked call (aggregate totals)         |
//! | some       | quick | single call at the small row cap (top-N views)   |
//! | with date  | full  | chunked time-series fetch, full coverage         |
//! | no date    | full  | single call at the provider's maximum row limit  |
//!
//! Non-time-series breakdowns are bounded by distinct-value cardinality, not
//! time, so the single max-limit call is acceptable for them.

use std::time::Duration;

use tracing::{info, info_span, Instrument};
use uuid::Uuid;

use crate::error::HarvestError;
use crate::fetcher::ChunkedFetcher;
use crate::models::{Completeness, DateRange, Dimension, HarvestResult};
use crate::provider::SearchAnalyticsApi;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HarvestMode {
    /// Latency over completeness: what an interactive top-N view needs.
    Quick,
    /// Full coverage, chunked when the date dimension demands it.
    Full,
}

pub struct Harvester<'a, P: SearchAnalyticsApi + ?Sized> {
    provider: &'a P,
    quick_row_limit: usize,
    max_row_limit: usize,
    inter_chunk_delay: Duration,
}

impl<'a, P: SearchAnalyticsApi + ?Sized> Harvester<'a, P> {
    pub fn new(
        provider: &'a P,
        quick_row_limit: usize,
        max_row_limit: usize,
        inter_chunk_delay: Duration,
    ) -> Self {
        Self {
            provider,
            quick_row_limit,
            max_row_limit,
            inter_chunk_delay,
        }
    }

    /// Build a harvester with the configured provider tuning values.
    pub fn from_config(provider: &'a P) -> Self {
        let config = crate::config::get_config();
        Self::new(
            provider,
            config.provider.quick_row_limit,
            config.provider.max_row_limit,
            Duration::from_millis(config.provider.inter_chunk_delay_ms),
        )
    }

    pub async fn harvest(
        &self,
        site: &str,
        range: DateRange,
        dimensions: &[Dimension],
        mode: HarvestMode,
    ) -> Result<HarvestResult, HarvestError> {
        let harvest_id = Uuid::new_v4();
        let span = info_span!(
            "harvest",
            harvest_id = %harvest_id,
            site,
            range = %range,
            mode = ?mode,
            dimensions = dimensions.len(),
        );

        async {
            let fetcher = ChunkedFetcher::new(self.provider, self.inter_chunk_delay);

            let (rows, completeness) = if dimensions.is_empty() {
                // Aggregate totals: one row group, one cheap request.
                let (rows, truncated) = fetcher
                    .fetch_window(site, range, dimensions, self.max_row_limit)
                    .await?;
                (rows, Completeness::single(truncated))
            } else {
                match mode {
                    HarvestMode::Quick => {
                        let (rows, truncated) = fetcher
                            .fetch_window(site, range, dimensions, self.quick_row_limit)
                            .await?;
                        (rows, Completeness::single(truncated))
                    }
                    HarvestMode::Full if dimensions.contains(&Dimension::Date) => {
                        fetcher
                            .fetch_chunked(site, range, dimensions, self.max_row_limit)
                            .await
                    }
                    HarvestMode::Full => {
                        let (rows, truncated) = fetcher
                            .fetch_window(site, range, dimensions, self.max_row_limit)
                            .await?;
                        (rows, Completeness::single(truncated))
                    }
                }
            };

            info!(
                rows = rows.len(),
                complete = completeness.is_complete(),
                "harvest finished"
            );

            Ok(HarvestResult {
                rows,
                completeness,
                range,
            })
        }
        .instrument(span)
        .await
    }
}
