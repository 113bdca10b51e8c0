//! Grouping and aggregation over canonical records.
//!
//! Pure functions of their inputs; no shared state. Group keys are a
//! composite of query, URL, and SERP features. Within a group:
//!
//! - `clicks` and `impressions` are summed
//! - `position` is the impression-weighted mean over search-console rows
//!   only; point-in-time ranks from the keyword export are never blended
//!   into the weighted mean
//! - `ctr` is derived from the sums, never averaged
//! - period-over-period change compares first observation to last, with the
//!   zero-baseline convention: a zero first value yields 100 when the last
//!   value is positive, 0 otherwise
//!
//! Output ordering is descending by clicks with ties kept in the grouping
//! pass's insertion order, so equal inputs produce identical output.

use std::collections::HashMap;

use crate::models::{
    AggregateStats, CanonicalMetric, ChartDataPoint, ComparisonResult, DeltaStats, MetricSource,
    RowChanges, TableRow,
};

/// Which fields compose the group key. At least one must be set for
/// [`group_and_aggregate`] to produce anything.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AggregationKey {
    pub query: bool,
    pub url: bool,
    pub serp_features: bool,
}

impl AggregationKey {
    pub const QUERY: Self = Self {
        query: true,
        url: false,
        serp_features: false,
    };
    pub const URL: Self = Self {
        query: false,
        url: true,
        serp_features: false,
    };

    /// Composite key for one record, `None` when the record lacks a selected
    /// component (for example a URL-keyed pass over rows without URLs).
    fn key_of(&self, metric: &CanonicalMetric) -> Option<String> {
        let mut parts: Vec<&str> = Vec::new();
        if self.query {
            parts.push(&metric.query);
        }
        if self.url {
            parts.push(metric.url.as_deref()?);
        }
        let features;
        if self.serp_features {
            features = metric.serp_features.as_ref()?.join(",");
            parts.push(&features);
        }
        if parts.is_empty() {
            return None;
        }
        Some(parts.join("\u{1f}"))
    }
}

/// Percent change between a first and last observation, rounded to whole
/// percent. The zero-baseline case is an explicit convention, not an
/// approximation: 0 -> positive is reported as 100, 0 -> 0 as 0.
pub fn percent_change(first: f64, last: f64) -> f64 {
    if first > 0.0 {
        ((last - first) / first * 100.0).round()
    } else if last > 0.0 {
        100.0
    } else {
        0.0
    }
}

/// Group records by `key` and fold each group into one [`TableRow`].
pub fn group_and_aggregate(
    records: &[CanonicalMetric],
    key: AggregationKey,
    enable_comparison: bool,
) -> Vec<TableRow> {
    // Insertion-ordered grouping: the index map assigns each key its
    // first-seen slot so the later stable sort breaks ties predictably.
    let mut slots: HashMap<String, usize> = HashMap::new();
    let mut groups: Vec<(String, Vec<&CanonicalMetric>)> = Vec::new();

    for metric in records {
        let Some(group_key) = key.key_of(metric) else {
            continue;
        };
        match slots.get(&group_key) {
            Some(&slot) => groups[slot].1.push(metric),
            None => {
                slots.insert(group_key.clone(), groups.len());
                groups.push((group_key, vec![metric]));
            }
        }
    }

    let mut rows: Vec<TableRow> = groups
        .into_iter()
        .map(|(group_key, mut members)| {
            members.sort_by_key(|m| m.date);
            fold_group(group_key, &members, enable_comparison)
        })
        .collect();

    rows.sort_by(|a, b| b.clicks.cmp(&a.clicks));
    rows
}

fn fold_group(group_key: String, members: &[&CanonicalMetric], enable_comparison: bool) -> TableRow {
    let clicks: u64 = members.iter().filter_map(|m| m.clicks).sum();
    let impressions: u64 = members.iter().filter_map(|m| m.impressions).sum();
    let ctr = derived_ctr(clicks, impressions);
    let position = weighted_position(members.iter().copied());

    // Point-in-time fields come from the latest keyword-export row; the
    // members are already date-ordered.
    let latest_secondary = members
        .iter()
        .rev()
        .find(|m| m.source == MetricSource::Ahrefs);

    let display_key = group_key.replace('\u{1f}', " ");
    let url = members.iter().find_map(|m| m.url.clone());

    let changes = enable_comparison.then(|| RowChanges {
        clicks: series_change(members, |m| m.clicks.map(|v| v as f64)),
        impressions: series_change(members, |m| m.impressions.map(|v| v as f64)),
        ctr: series_change(members, |m| m.ctr),
        position: series_change(members, |m| {
            (m.source == MetricSource::SearchConsole).then_some(m.position)
        }),
    });

    TableRow {
        key: display_key,
        url,
        clicks,
        impressions,
        ctr,
        position,
        volume: latest_secondary.and_then(|m| m.volume),
        difficulty: latest_secondary.and_then(|m| m.difficulty),
        traffic: latest_secondary.and_then(|m| m.traffic),
        serp_features: latest_secondary.and_then(|m| m.serp_features.clone()),
        changes,
    }
}

/// First-observed vs last-observed change for one metric over date-ordered
/// members. Metrics absent from a row contribute no observation.
fn series_change(
    members: &[&CanonicalMetric],
    metric: impl Fn(&CanonicalMetric) -> Option<f64>,
) -> f64 {
    let mut observations = members.iter().copied().filter_map(|m| metric(m));
    let Some(first) = observations.next() else {
        return 0.0;
    };
    let last = observations.last().unwrap_or(first);
    percent_change(first, last)
}

/// Impression-weighted position over search-console rows. Zero-impression
/// rows contribute nothing to the mean. Groups with no search-console signal
/// fall back to the latest point-in-time rank from the keyword export.
fn weighted_position<'a>(members: impl Iterator<Item = &'a CanonicalMetric> + Clone) -> f64 {
    let mut weighted_sum = 0.0;
    let mut weight = 0.0;
    let mut saw_primary = false;

    for metric in members.clone() {
        if metric.source != MetricSource::SearchConsole {
            continue;
        }
        saw_primary = true;
        let impressions = metric.impressions.unwrap_or(0) as f64;
        weighted_sum += metric.position * impressions;
        weight += impressions;
    }

    if weight > 0.0 {
        weighted_sum / weight
    } else if saw_primary {
        0.0
    } else {
        members
            .filter(|m| m.source == MetricSource::Ahrefs)
            .last()
            .map(|m| m.position)
            .unwrap_or(0.0)
    }
}

fn derived_ctr(clicks: u64, impressions: u64) -> f64 {
    if impressions > 0 {
        clicks as f64 / impressions as f64
    } else {
        0.0
    }
}

/// Totals for one period.
pub fn aggregate_totals(records: &[CanonicalMetric]) -> AggregateStats {
    let clicks: u64 = records.iter().filter_map(|m| m.clicks).sum();
    let impressions: u64 = records.iter().filter_map(|m| m.impressions).sum();
    AggregateStats {
        clicks,
        impressions,
        ctr: derived_ctr(clicks, impressions),
        position: weighted_position(records.iter()),
    }
}

/// Overview comparison between the primary and comparison windows.
/// `changes` is `None` when the comparison window produced no rows: there is
/// nothing to compare against, which is distinct from comparing against
/// zeros.
pub fn compare_periods(
    current_records: &[CanonicalMetric],
    previous_records: &[CanonicalMetric],
) -> ComparisonResult {
    let current = aggregate_totals(current_records);
    let previous = aggregate_totals(previous_records);

    let changes = (!previous_records.is_empty()).then(|| DeltaStats {
        clicks_pct: percent_change(previous.clicks as f64, current.clicks as f64),
        impressions_pct: percent_change(previous.impressions as f64, current.impressions as f64),
        ctr_pct: percent_change(previous.ctr, current.ctr),
        // Rank improvements move the number down; report them as positive.
        position_delta: previous.position - current.position,
    });

    ComparisonResult {
        current,
        previous,
        changes,
    }
}

/// Date-keyed series for chart rendering, ascending by date.
pub fn chart_series(records: &[CanonicalMetric]) -> Vec<ChartDataPoint> {
    let mut by_date: HashMap<chrono::NaiveDate, Vec<&CanonicalMetric>> = HashMap::new();
    for metric in records {
        by_date.entry(metric.date).or_default().push(metric);
    }

    let mut points: Vec<ChartDataPoint> = by_date
        .into_iter()
        .map(|(date, members)| {
            let clicks: u64 = members.iter().filter_map(|m| m.clicks).sum();
            let impressions: u64 = members.iter().filter_map(|m| m.impressions).sum();
            ChartDataPoint {
                date,
                clicks,
                impressions,
                ctr: derived_ctr(clicks, impressions),
                position: weighted_position(members.iter().copied()),
            }
        })
        .collect();

    points.sort_by_key(|p| p.date);
    points
}
