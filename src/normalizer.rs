//! Mapping raw provider rows into [`CanonicalMetric`] records.
//!
//! Both normalizers are pure, deterministic, one-to-one mappings. Malformed
//! input is passed through with defaulted fields rather than rejected;
//! nothing here returns an error.

use chrono::NaiveDate;

use crate::models::{AhrefsMetric, CanonicalMetric, Dimension, MetricSource, SearchAnalyticsRow};

/// Maps search console rows into canonical records. `dimensions` is the
/// dimension list the rows were queried with; `keys` is positional against
/// it. Rows from queries without the date dimension aggregate over the whole
/// window and are assigned `range_end` as their date.
pub fn normalize_primary(
    rows: &[SearchAnalyticsRow],
    dimensions: &[Dimension],
    range_end: NaiveDate,
) -> Vec<CanonicalMetric> {
    rows.iter()
        .map(|row| {
            let mut query = String::new();
            let mut url = None;
            let mut date = range_end;

            for (dimension, key) in dimensions.iter().zip(row.keys.iter()) {
                match dimension {
                    Dimension::Query => query = key.clone(),
                    Dimension::Page => url = Some(key.clone()),
                    Dimension::Date => {
                        if let Ok(parsed) = NaiveDate::parse_from_str(key, "%Y-%m-%d") {
                            date = parsed;
                        }
                    }
                    Dimension::Country | Dimension::Device => {}
                }
            }

            CanonicalMetric {
                date,
                source: MetricSource::SearchConsole,
                query,
                url,
                clicks: Some(row.clicks.round() as u64),
                impressions: Some(row.impressions.round() as u64),
                ctr: Some(row.ctr),
                position: row.position,
                volume: None,
                difficulty: None,
                cost_per_click: None,
                traffic: None,
                serp_features: None,
                previous_traffic: None,
                previous_position: None,
                previous_date: None,
            }
        })
        .collect()
}

/// Maps pre-parsed keyword-export rows into canonical records. This source
/// embeds its own point-in-time comparison; the `previous_*` fields are
/// carried through unchanged rather than recomputed. Rows without their own
/// date are stamped with `imported_on`.
pub fn normalize_secondary(rows: &[AhrefsMetric], imported_on: NaiveDate) -> Vec<CanonicalMetric> {
    rows.iter()
        .map(|row| CanonicalMetric {
            date: row.date.unwrap_or(imported_on),
            source: MetricSource::Ahrefs,
            query: row.keyword.clone(),
            url: row.url.clone(),
            clicks: None,
            impressions: None,
            ctr: None,
            position: row.position,
            volume: row.volume,
            difficulty: row.difficulty,
            cost_per_click: row.cost_per_click,
            traffic: row.traffic,
            serp_features: row.serp_features.clone(),
            previous_traffic: row.previous_traffic,
            previous_position: row.previous_position,
            previous_date: row.previous_date,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn raw(keys: &[&str], clicks: f64, impressions: f64, position: f64) -> SearchAnalyticsRow {
        SearchAnalyticsRow {
            keys: keys.iter().map(|k| k.to_string()).collect(),
            clicks,
            impressions,
            ctr: if impressions > 0.0 { clicks / impressions } else { 0.0 },
            position,
        }
    }

    #[test]
    fn test_keys_map_positionally_to_dimensions() {
        let rows = vec![raw(
            &["rust harvester", "https://example.com/docs", "2025-06-03"],
            12.0,
            400.0,
            4.2,
        )];
        let dims = [Dimension::Query, Dimension::Page, Dimension::Date];
        let out = normalize_primary(&rows, &dims, d("2025-06-30"));

        assert_eq!(out.len(), 1);
        assert_eq!(out[0].query, "rust harvester");
        assert_eq!(out[0].url.as_deref(), Some("https://example.com/docs"));
        assert_eq!(out[0].date, d("2025-06-03"));
        assert_eq!(out[0].clicks, Some(12));
        assert_eq!(out[0].source, MetricSource::SearchConsole);
    }

    #[test]
    fn test_window_aggregates_get_end_date() {
        let rows = vec![raw(&["rust harvester"], 12.0, 400.0, 4.2)];
        let out = normalize_primary(&rows, &[Dimension::Query], d("2025-06-30"));
        assert_eq!(out[0].date, d("2025-06-30"));
    }

    #[test]
    fn test_malformed_date_key_defaults_to_window_end() {
        let rows = vec![raw(&["not-a-date"], 1.0, 1.0, 1.0)];
        let out = normalize_primary(&rows, &[Dimension::Date], d("2025-06-30"));
        assert_eq!(out[0].date, d("2025-06-30"));
    }

    #[test]
    fn test_missing_keys_default_fields() {
        let rows = vec![raw(&[], 3.0, 9.0, 2.0)];
        let out = normalize_primary(&rows, &[Dimension::Query, Dimension::Page], d("2025-06-30"));
        assert_eq!(out[0].query, "");
        assert_eq!(out[0].url, None);
    }

    #[test]
    fn test_normalize_primary_is_deterministic() {
        let rows = vec![
            raw(&["a"], 1.0, 10.0, 3.0),
            raw(&["b"], 2.0, 20.0, 6.0),
        ];
        let first = normalize_primary(&rows, &[Dimension::Query], d("2025-06-30"));
        let second = normalize_primary(&rows, &[Dimension::Query], d("2025-06-30"));
        assert_eq!(
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&second).unwrap()
        );
    }

    #[test]
    fn test_secondary_carries_embedded_comparison_through() {
        let rows = vec![AhrefsMetric {
            keyword: "rust harvester".to_string(),
            position: 7.0,
            url: Some("https://example.com/".to_string()),
            volume: Some(2400),
            difficulty: Some(38.0),
            cost_per_click: Some(1.25),
            traffic: Some(310.0),
            serp_features: Some(vec!["featured_snippet".to_string()]),
            previous_traffic: Some(280.0),
            previous_position: Some(9.0),
            previous_date: Some(d("2025-05-01")),
            date: None,
        }];
        let out = normalize_secondary(&rows, d("2025-06-01"));

        assert_eq!(out[0].source, MetricSource::Ahrefs);
        assert_eq!(out[0].date, d("2025-06-01"));
        assert_eq!(out[0].previous_position, Some(9.0));
        assert_eq!(out[0].previous_traffic, Some(280.0));
        assert_eq!(out[0].previous_date, Some(d("2025-05-01")));
        assert_eq!(out[0].clicks, None);
    }
}
