//! Date-window arithmetic: range validation against the provider's lookback
//! limit, chunk-size selection, and comparison-preset derivation.
//!
//! Everything here is pure; no I/O and no shared state. The fetcher and CLI
//! build on these helpers for every harvest.

use chrono::{Duration, Months, NaiveDate};
use tracing::warn;

use crate::error::HarvestError;
use crate::models::DateRange;

/// A validated (and possibly adjusted) range. `clamped_from` holds the
/// original start date when it preceded the lookback boundary; the caller
/// proceeds with the adjusted range and surfaces the clamp as a warning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidatedRange {
    pub range: DateRange,
    pub clamped_from: Option<NaiveDate>,
}

/// Validate a requested range against `today` and the provider's maximum
/// lookback. A future end date is fatal; a too-early start date is clamped
/// upward to the boundary and reported, never rejected.
pub fn validate_range(
    start: NaiveDate,
    end: NaiveDate,
    today: NaiveDate,
    max_lookback_months: u32,
) -> Result<ValidatedRange, HarvestError> {
    if end > today {
        return Err(HarvestError::RangeInvalid { end, today });
    }
    if start > end {
        return Err(HarvestError::RangeInverted { start, end });
    }

    let boundary = months_back(today, max_lookback_months);
    if start < boundary {
        warn!(
            requested = %start,
            clamped_to = %boundary,
            lookback_months = max_lookback_months,
            "start date precedes provider lookback limit, clamping"
        );
        return Ok(ValidatedRange {
            range: DateRange::new(boundary, end),
            clamped_from: Some(start),
        });
    }

    Ok(ValidatedRange {
        range: DateRange::new(start, end),
        clamped_from: None,
    })
}

/// Chunk-size tiers for dimensioned queries. Returns 0 ("no chunking") when
/// no dimensions are requested: aggregate totals return one row per request
/// and never approach the row cap.
///
/// The tiers are tuning values, not a contract. What must hold: chunk size
/// never grows super-linearly with range length, and dimensioned queries
/// always chunk. With the query dimension a busy property produces a few
/// thousand rows per day, so even the 30-day tier stays an order of
/// magnitude under the 25k provider ceiling.
pub fn choose_chunk_size_days(total_days: i64, has_dimensions: bool) -> i64 {
    if !has_dimensions {
        return 0;
    }
    match total_days {
        d if d <= 31 => 7,
        d if d <= 92 => 14,
        d if d <= 184 => 21,
        _ => 30,
    }
}

/// The fixed vocabulary of comparison presets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComparisonPreset {
    Last24hVsPrevious,
    Last24hVsWeekAgo,
    Last7dVsPrevious,
    Last7dVsYearAgo,
    Last28dVsPrevious,
    Last28dVsYearAgo,
    Last3mVsPrevious,
    Last3mVsYearAgo,
    Last6mVsPrevious,
    Custom,
}

impl ComparisonPreset {
    /// All non-custom presets, in display order.
    pub const ALL: [ComparisonPreset; 9] = [
        ComparisonPreset::Last24hVsPrevious,
        ComparisonPreset::Last24hVsWeekAgo,
        ComparisonPreset::Last7dVsPrevious,
        ComparisonPreset::Last7dVsYearAgo,
        ComparisonPreset::Last28dVsPrevious,
        ComparisonPreset::Last28dVsYearAgo,
        ComparisonPreset::Last3mVsPrevious,
        ComparisonPreset::Last3mVsYearAgo,
        ComparisonPreset::Last6mVsPrevious,
    ];

    /// Parse a preset identifier. Unknown identifiers fall back to
    /// `last_28d_vs_previous`, the documented default.
    pub fn parse(id: &str) -> Self {
        match id.trim().to_ascii_lowercase().as_str() {
            "last_24h_vs_previous" => ComparisonPreset::Last24hVsPrevious,
            "last_24h_vs_week_ago" | "last_24h_vs_week_over_week" => {
                ComparisonPreset::Last24hVsWeekAgo
            }
            "last_7d_vs_previous" => ComparisonPreset::Last7dVsPrevious,
            "last_7d_vs_year_ago" | "last_7d_vs_year_over_year" => {
                ComparisonPreset::Last7dVsYearAgo
            }
            "last_28d_vs_previous" | "last_30d_vs_previous" => ComparisonPreset::Last28dVsPrevious,
            "last_28d_vs_year_ago" => ComparisonPreset::Last28dVsYearAgo,
            "last_3m_vs_previous" => ComparisonPreset::Last3mVsPrevious,
            "last_3m_vs_year_ago" => ComparisonPreset::Last3mVsYearAgo,
            "last_6m_vs_previous" => ComparisonPreset::Last6mVsPrevious,
            "custom" => ComparisonPreset::Custom,
            other => {
                warn!(preset = other, "unknown comparison preset, using last_28d_vs_previous");
                ComparisonPreset::Last28dVsPrevious
            }
        }
    }

    pub fn id(&self) -> &'static str {
        match self {
            ComparisonPreset::Last24hVsPrevious => "last_24h_vs_previous",
            ComparisonPreset::Last24hVsWeekAgo => "last_24h_vs_week_ago",
            ComparisonPreset::Last7dVsPrevious => "last_7d_vs_previous",
            ComparisonPreset::Last7dVsYearAgo => "last_7d_vs_year_ago",
            ComparisonPreset::Last28dVsPrevious => "last_28d_vs_previous",
            ComparisonPreset::Last28dVsYearAgo => "last_28d_vs_year_ago",
            ComparisonPreset::Last3mVsPrevious => "last_3m_vs_previous",
            ComparisonPreset::Last3mVsYearAgo => "last_3m_vs_year_ago",
            ComparisonPreset::Last6mVsPrevious => "last_6m_vs_previous",
            ComparisonPreset::Custom => "custom",
        }
    }
}

/// Primary window plus the derived comparison window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PresetRanges {
    pub primary: DateRange,
    pub comparison: DateRange,
}

/// Derive primary and comparison windows for a preset. Returns `None` for
/// `custom`: there, both ranges come from the caller.
///
/// "vs previous" slides the primary window back by its own span, so the
/// comparison is the immediately preceding window of equal length.
/// "vs year ago" shifts both boundaries back one calendar year; "vs week
/// ago" shifts them back seven days.
pub fn derive_preset(preset: ComparisonPreset, today: NaiveDate) -> Option<PresetRanges> {
    let last_days = |n: i64| DateRange::new(today - Duration::days(n), today);
    let last_months = |n: u32| DateRange::new(months_back(today, n), today);

    let (primary, comparison) = match preset {
        ComparisonPreset::Last24hVsPrevious => {
            let p = last_days(1);
            (p, previous_period(p))
        }
        ComparisonPreset::Last24hVsWeekAgo => {
            let p = last_days(1);
            (p, shift_days(p, 7))
        }
        ComparisonPreset::Last7dVsPrevious => {
            let p = last_days(7);
            (p, previous_period(p))
        }
        ComparisonPreset::Last7dVsYearAgo => {
            let p = last_days(7);
            (p, year_ago(p))
        }
        ComparisonPreset::Last28dVsPrevious => {
            let p = last_days(28);
            (p, previous_period(p))
        }
        ComparisonPreset::Last28dVsYearAgo => {
            let p = last_days(28);
            (p, year_ago(p))
        }
        ComparisonPreset::Last3mVsPrevious => {
            let p = last_months(3);
            (p, previous_period(p))
        }
        ComparisonPreset::Last3mVsYearAgo => {
            let p = last_months(3);
            (p, year_ago(p))
        }
        ComparisonPreset::Last6mVsPrevious => {
            let p = last_months(6);
            (p, previous_period(p))
        }
        ComparisonPreset::Custom => return None,
    };

    Some(PresetRanges {
        primary,
        comparison,
    })
}

fn previous_period(primary: DateRange) -> DateRange {
    let span = primary.end - primary.start;
    DateRange::new(primary.start - span, primary.start)
}

fn shift_days(range: DateRange, days: i64) -> DateRange {
    DateRange::new(
        range.start - Duration::days(days),
        range.end - Duration::days(days),
    )
}

fn year_ago(range: DateRange) -> DateRange {
    DateRange::new(months_back(range.start, 12), months_back(range.end, 12))
}

/// Calendar-month subtraction, saturating at the epoch floor rather than
/// failing on out-of-range dates.
fn months_back(date: NaiveDate, months: u32) -> NaiveDate {
    date.checked_sub_months(Months::new(months))
        .unwrap_or(NaiveDate::MIN)
}
