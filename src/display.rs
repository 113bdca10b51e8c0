//! Output Formatting and Display Management
//!
//! Renders overview, table, and chart results as colored terminal output or
//! structured JSON. Partial data renders normally; an advisory banner is
//! added when the harvest's completeness report says chunks were truncated
//! or missing. Only range-invalid errors block rendering, and those never
//! reach this module.

use colored::Colorize;
use serde_json::json;

use crate::models::{ChartDataPoint, ComparisonResult, Completeness, TableRow};

pub struct DisplayManager;

impl Default for DisplayManager {
    fn default() -> Self {
        Self::new()
    }
}

impl DisplayManager {
    pub fn new() -> Self {
        Self
    }

    pub fn display_overview(
        &self,
        comparison: &ComparisonResult,
        completeness: &Completeness,
        json_output: bool,
    ) {
        if json_output {
            let payload = json!({
                "overview": comparison,
                "completeness": completeness,
            });
            println!("{}", serde_json::to_string_pretty(&payload).unwrap_or_default());
            return;
        }

        self.print_banner(completeness);
        println!("{}", "Overview".bold());
        println!(
            "  {:<14} {:>12} {:>12}",
            "", "current".dimmed(), "previous".dimmed()
        );
        println!(
            "  {:<14} {:>12} {:>12}   {}",
            "clicks",
            comparison.current.clicks.to_string().yellow(),
            comparison.previous.clicks,
            comparison
                .changes
                .map(|c| format_pct(c.clicks_pct))
                .unwrap_or_default()
        );
        println!(
            "  {:<14} {:>12} {:>12}   {}",
            "impressions",
            comparison.current.impressions.to_string().yellow(),
            comparison.previous.impressions,
            comparison
                .changes
                .map(|c| format_pct(c.impressions_pct))
                .unwrap_or_default()
        );
        println!(
            "  {:<14} {:>12} {:>12}   {}",
            "ctr",
            format!("{:.2}%", comparison.current.ctr * 100.0).yellow(),
            format!("{:.2}%", comparison.previous.ctr * 100.0),
            comparison
                .changes
                .map(|c| format_pct(c.ctr_pct))
                .unwrap_or_default()
        );
        println!(
            "  {:<14} {:>12} {:>12}   {}",
            "position",
            format!("{:.1}", comparison.current.position).yellow(),
            format!("{:.1}", comparison.previous.position),
            comparison
                .changes
                .map(|c| format_delta(c.position_delta))
                .unwrap_or_default()
        );
        if comparison.changes.is_none() {
            println!("  {}", "no data in the comparison window".dimmed());
        }
    }

    pub fn display_table(
        &self,
        rows: &[TableRow],
        completeness: &Completeness,
        limit: Option<usize>,
        json_output: bool,
    ) {
        let shown = limit.unwrap_or(rows.len()).min(rows.len());

        if json_output {
            let payload = json!({
                "rows": &rows[..shown],
                "completeness": completeness,
            });
            println!("{}", serde_json::to_string_pretty(&payload).unwrap_or_default());
            return;
        }

        self.print_banner(completeness);
        if rows.is_empty() {
            println!("No rows for this range.");
            return;
        }

        println!(
            "{:<48} {:>8} {:>12} {:>7} {:>9} {:>8}",
            "key".bold(),
            "clicks".bold(),
            "impressions".bold(),
            "ctr".bold(),
            "position".bold(),
            "change".bold()
        );
        for row in &rows[..shown] {
            let change = row
                .changes
                .map(|c| format_pct(c.clicks))
                .unwrap_or_default();
            println!(
                "{:<48} {:>8} {:>12} {:>6.2}% {:>9.1} {:>8}",
                truncate_key(&row.key, 48).cyan(),
                row.clicks.to_string().yellow(),
                row.impressions,
                row.ctr * 100.0,
                row.position,
                change
            );
        }
        if shown < rows.len() {
            println!("{}", format!("... {} more rows", rows.len() - shown).dimmed());
        }
    }

    pub fn display_chart(
        &self,
        points: &[ChartDataPoint],
        completeness: &Completeness,
        limit: Option<usize>,
        json_output: bool,
    ) {
        // The series is date-ascending; a limit keeps the most recent part.
        let shown = limit.unwrap_or(points.len()).min(points.len());
        let points = &points[points.len() - shown..];

        if json_output {
            let payload = json!({
                "points": points,
                "completeness": completeness,
            });
            println!("{}", serde_json::to_string_pretty(&payload).unwrap_or_default());
            return;
        }

        self.print_banner(completeness);
        if points.is_empty() {
            println!("No data points for this range.");
            return;
        }

        let max_clicks = points.iter().map(|p| p.clicks).max().unwrap_or(0).max(1);
        for point in points {
            let width = (point.clicks * 40 / max_clicks) as usize;
            println!(
                "{} {:>7} {}",
                point.date.to_string().dimmed(),
                point.clicks.to_string().yellow(),
                "█".repeat(width).cyan()
            );
        }
    }

    fn print_banner(&self, completeness: &Completeness) {
        if !completeness.is_complete() {
            println!(
                "{}",
                format!(
                    "⚠ data may be incomplete ({} of {} chunks truncated, {} failed)",
                    completeness.chunks_truncated,
                    completeness.total_chunks,
                    completeness.chunks_failed
                )
                .yellow()
            );
        }
    }
}

fn format_pct(pct: f64) -> String {
    if pct > 0.0 {
        format!("+{pct:.0}%").green().to_string()
    } else if pct < 0.0 {
        format!("{pct:.0}%").red().to_string()
    } else {
        "0%".dimmed().to_string()
    }
}

fn format_delta(delta: f64) -> String {
    if delta > 0.0 {
        format!("+{delta:.1}").green().to_string()
    } else if delta < 0.0 {
        format!("{delta:.1}").red().to_string()
    } else {
        "0.0".dimmed().to_string()
    }
}

fn truncate_key(key: &str, max: usize) -> String {
    if key.chars().count() <= max {
        key.to_string()
    } else {
        let truncated: String = key.chars().take(max - 1).collect();
        format!("{truncated}…")
    }
}
