use anyhow::{anyhow, Context, Result};
use chrono::{NaiveDate, Utc};
use clap::{Args, Parser, Subcommand};
use std::process;

use rankscope::aggregator::{self, AggregationKey};
use rankscope::config::get_config;
use rankscope::display::DisplayManager;
use rankscope::harvester::{HarvestMode, Harvester};
use rankscope::logging::init_logging;
use rankscope::models::{AhrefsMetric, Credential, DateRange, Dimension, MetricSource};
use rankscope::normalizer::{normalize_primary, normalize_secondary};
use rankscope::provider::GscClient;
use rankscope::store::{MetricStore, Snapshot, ViewState};
use rankscope::window::{self, ComparisonPreset};

#[derive(Parser)]
#[command(name = "rankscope")]
#[command(about = "Harvest and aggregate search performance metrics")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct CommonArgs {
    /// Site identifier, e.g. sc-domain:example.com
    #[arg(long)]
    site: String,
    /// OAuth access token (falls back to RANKSCOPE_TOKEN)
    #[arg(long)]
    token: Option<String>,
    /// Comparison preset, e.g. last_28d_vs_previous
    #[arg(long, default_value = "last_28d_vs_previous")]
    preset: String,
    /// Start date (YYYY-MM-DD), required with --preset custom
    #[arg(long)]
    start: Option<String>,
    /// End date (YYYY-MM-DD), required with --preset custom
    #[arg(long)]
    end: Option<String>,
    /// Comparison start date (YYYY-MM-DD)
    #[arg(long)]
    compare_start: Option<String>,
    /// Comparison end date (YYYY-MM-DD)
    #[arg(long)]
    compare_end: Option<String>,
    /// Show at most N table rows or chart points (overview has nothing to cap)
    #[arg(long)]
    limit: Option<usize>,
    /// Output in JSON format
    #[arg(long)]
    json: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Aggregate totals for the range vs the comparison window
    Overview {
        #[command(flatten)]
        common: CommonArgs,
    },
    /// Query- or URL-keyed aggregate table
    Table {
        #[command(flatten)]
        common: CommonArgs,
        /// Group rows by this dimension
        #[arg(long, default_value = "query")]
        by: String,
        /// quick (low-latency top N) or full (complete coverage)
        #[arg(long, default_value = "full")]
        mode: String,
        /// Merge a pre-parsed keyword export (JSON array of rows)
        #[arg(long)]
        ahrefs: Option<String>,
    },
    /// Date-keyed series for the range
    Chart {
        #[command(flatten)]
        common: CommonArgs,
    },
    /// List comparison presets and their derived windows
    Presets {
        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    init_logging();
    let cli = Cli::parse();

    match cli.command {
        Commands::Overview { common } => {
            let json = common.json;
            run_overview(common).await.or_else(|e| handle_error(e, json))
        }
        Commands::Table {
            common,
            by,
            mode,
            ahrefs,
        } => {
            let json = common.json;
            run_table(common, &by, &mode, ahrefs)
                .await
                .or_else(|e| handle_error(e, json))
        }
        Commands::Chart { common } => {
            let json = common.json;
            run_chart(common).await.or_else(|e| handle_error(e, json))
        }
        Commands::Presets { json } => run_presets(json),
    }
}

/// Primary and comparison windows after preset derivation, date parsing,
/// and lookback clamping.
struct ResolvedRanges {
    primary: DateRange,
    comparison: Option<DateRange>,
}

fn resolve_ranges(common: &CommonArgs, today: NaiveDate) -> Result<ResolvedRanges> {
    let config = get_config();
    let lookback = config.provider.max_lookback_months;
    let preset = ComparisonPreset::parse(&common.preset);

    let (primary, comparison) = match window::derive_preset(preset, today) {
        Some(ranges) => (ranges.primary, Some(ranges.comparison)),
        None => {
            // custom: both windows come from the caller.
            let start = parse_date(
                common
                    .start
                    .as_deref()
                    .ok_or_else(|| anyhow!("--start is required with --preset custom"))?,
            )?;
            let end = parse_date(
                common
                    .end
                    .as_deref()
                    .ok_or_else(|| anyhow!("--end is required with --preset custom"))?,
            )?;
            let comparison = match (&common.compare_start, &common.compare_end) {
                (Some(cs), Some(ce)) => {
                    Some(DateRange::new(parse_date(cs)?, parse_date(ce)?))
                }
                (None, None) => None,
                _ => {
                    return Err(anyhow!(
                        "--compare-start and --compare-end must be given together"
                    ))
                }
            };
            (DateRange::new(start, end), comparison)
        }
    };

    let primary = check_range(primary, today, lookback, common.json)?;
    let comparison = comparison
        .map(|range| check_range(range, today, lookback, common.json))
        .transpose()?;

    Ok(ResolvedRanges {
        primary,
        comparison,
    })
}

fn check_range(
    range: DateRange,
    today: NaiveDate,
    lookback_months: u32,
    json: bool,
) -> Result<DateRange> {
    let validated = window::validate_range(range.start, range.end, today, lookback_months)?;
    if let Some(original) = validated.clamped_from {
        if !json {
            eprintln!(
                "⚠ start date {} precedes the provider's {}-month lookback, using {}",
                original, lookback_months, validated.range.start
            );
        }
    }
    Ok(validated.range)
}

fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .with_context(|| format!("Invalid date: {s}. Use YYYY-MM-DD"))
}

fn credential(common: &CommonArgs) -> Result<Credential> {
    let token = common
        .token
        .clone()
        .or_else(|| std::env::var("RANKSCOPE_TOKEN").ok())
        .ok_or_else(|| anyhow!("No credential: pass --token or set RANKSCOPE_TOKEN"))?;
    Ok(Credential::new(token))
}

async fn run_overview(common: CommonArgs) -> Result<()> {
    let today = Utc::now().date_naive();
    let ranges = resolve_ranges(&common, today)?;
    let client = GscClient::from_config(credential(&common)?);
    let harvester = Harvester::from_config(&client);

    // Totals are cheap aggregate calls; the two windows are independent
    // requests and may run concurrently.
    let (current, previous) = match ranges.comparison {
        Some(comparison) => {
            let (current, previous) = futures::try_join!(
                harvester.harvest(&common.site, ranges.primary, &[], HarvestMode::Full),
                harvester.harvest(&common.site, comparison, &[], HarvestMode::Full),
            )?;
            (current, Some(previous))
        }
        None => (
            harvester
                .harvest(&common.site, ranges.primary, &[], HarvestMode::Full)
                .await?,
            None,
        ),
    };

    let current_records = normalize_primary(&current.rows, &[], current.range.end);
    let previous_records = previous
        .as_ref()
        .map(|p| normalize_primary(&p.rows, &[], p.range.end))
        .unwrap_or_default();

    let comparison = aggregator::compare_periods(&current_records, &previous_records);
    let completeness = previous
        .map(|p| current.completeness.combine(p.completeness))
        .unwrap_or(current.completeness);

    DisplayManager::new().display_overview(&comparison, &completeness, common.json);
    Ok(())
}

async fn run_table(common: CommonArgs, by: &str, mode: &str, ahrefs: Option<String>) -> Result<()> {
    let today = Utc::now().date_naive();
    let ranges = resolve_ranges(&common, today)?;
    let client = GscClient::from_config(credential(&common)?);
    let harvester = Harvester::from_config(&client);

    let group_dimension = parse_by(by)?;
    let mode = parse_mode(mode)?;

    // Full mode adds the date dimension so rows stay time-ordered within
    // each group and first-vs-last changes are computable.
    let (dimensions, enable_comparison): (Vec<Dimension>, bool) = match mode {
        HarvestMode::Quick => (vec![group_dimension], false),
        HarvestMode::Full => (vec![group_dimension, Dimension::Date], true),
    };

    let result = harvester
        .harvest(&common.site, ranges.primary, &dimensions, mode)
        .await?;
    let completeness = result.completeness;

    let store = MetricStore::new();
    let view = ViewState::new();
    let generation = view.begin();

    let records = normalize_primary(&result.rows, &dimensions, result.range.end);
    view.try_commit(
        generation,
        &store,
        MetricSource::SearchConsole,
        Snapshot {
            records,
            completeness: Some(completeness),
        },
    );

    if let Some(path) = ahrefs {
        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read keyword export: {path}"))?;
        let rows: Vec<AhrefsMetric> = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse keyword export: {path}"))?;
        store.replace(
            MetricSource::Ahrefs,
            Snapshot {
                records: normalize_secondary(&rows, today),
                completeness: None,
            },
        );
    }

    let key = match group_dimension {
        Dimension::Page => AggregationKey::URL,
        _ => AggregationKey::QUERY,
    };
    let rows = aggregator::group_and_aggregate(&store.merged(), key, enable_comparison);

    let limit = common.limit.or(Some(get_config().output.table_limit));
    DisplayManager::new().display_table(&rows, &completeness, limit, common.json);
    Ok(())
}

async fn run_chart(common: CommonArgs) -> Result<()> {
    let today = Utc::now().date_naive();
    let ranges = resolve_ranges(&common, today)?;
    let client = GscClient::from_config(credential(&common)?);
    let harvester = Harvester::from_config(&client);

    let dimensions = [Dimension::Date];
    let result = harvester
        .harvest(&common.site, ranges.primary, &dimensions, HarvestMode::Full)
        .await?;

    let records = normalize_primary(&result.rows, &dimensions, result.range.end);
    let points = aggregator::chart_series(&records);

    DisplayManager::new().display_chart(&points, &result.completeness, common.limit, common.json);
    Ok(())
}

fn run_presets(json: bool) -> Result<()> {
    let today = Utc::now().date_naive();

    if json {
        let entries: Vec<serde_json::Value> = ComparisonPreset::ALL
            .iter()
            .filter_map(|preset| {
                window::derive_preset(*preset, today).map(|ranges| {
                    serde_json::json!({
                        "id": preset.id(),
                        "primary": ranges.primary,
                        "comparison": ranges.comparison,
                    })
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }

    println!("{:<26} {:<26} {}", "preset", "primary", "comparison");
    for preset in ComparisonPreset::ALL {
        if let Some(ranges) = window::derive_preset(preset, today) {
            println!(
                "{:<26} {:<26} {}",
                preset.id(),
                ranges.primary.to_string(),
                ranges.comparison
            );
        }
    }
    println!("{:<26} (ranges supplied by caller)", "custom");
    Ok(())
}

fn parse_by(by: &str) -> Result<Dimension> {
    match by.to_ascii_lowercase().as_str() {
        "query" => Ok(Dimension::Query),
        "page" | "url" => Ok(Dimension::Page),
        other => Err(anyhow!("Unknown grouping '{other}': use query or page")),
    }
}

fn parse_mode(mode: &str) -> Result<HarvestMode> {
    match mode.to_ascii_lowercase().as_str() {
        "quick" => Ok(HarvestMode::Quick),
        "full" => Ok(HarvestMode::Full),
        other => Err(anyhow!("Unknown mode '{other}': use quick or full")),
    }
}

fn handle_error(e: anyhow::Error, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::json!({ "error": e.to_string() }));
    } else {
        eprintln!("Error: {e:#}");
    }
    process::exit(1);
}
