//! Error taxonomy for harvest operations.
//!
//! Only genuinely fatal conditions are errors. Range clamping, chunk
//! truncation, per-chunk fetch failures, and empty results are all reported
//! in-band (warning annotations or [`crate::models::Completeness`] counters)
//! so callers can keep rendering partial data.

use chrono::NaiveDate;
use thiserror::Error;

use crate::provider::ProviderError;

#[derive(Debug, Error)]
pub enum HarvestError {
    /// The provider never returns future data; this blocks the whole call.
    #[error("end date {end} is after today ({today}); the provider has no future data")]
    RangeInvalid { end: NaiveDate, today: NaiveDate },

    #[error("start date {start} is after end date {end}")]
    RangeInverted { start: NaiveDate, end: NaiveDate },

    /// A provider failure on an unchunked call. Chunked harvests skip the
    /// failed chunk instead and count it in completeness.
    #[error(transparent)]
    Provider(#[from] ProviderError),
}
