//! Structured logging setup.
//!
//! Builds one layered subscriber from config: a console sink, a rolling
//! file sink, or both, each in pretty or JSON form. Harvest calls run
//! inside spans carrying `harvest_id`, `site`, and `range` (see
//! [`crate::harvester`]); the layers here are configured so those fields
//! reach the output - span close events on the pretty format, current-span
//! and span-list fields on the JSON format.

use std::path::Path;
use std::sync::OnceLock;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter, Layer, Registry,
};

use crate::config::get_config;

// The non-blocking file writer stops flushing once its guard drops; the
// process keeps it for its lifetime.
static FILE_GUARD: OnceLock<WorkerGuard> = OnceLock::new();

/// Initialize the logging system based on configuration.
pub fn init_logging() {
    let config = get_config();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.logging.level));
    let json = config.logging.format == "json";

    let mut layers: Vec<Box<dyn Layer<Registry> + Send + Sync>> = Vec::new();
    match config.logging.output.as_str() {
        "file" => layers.push(file_layer(json, &config.paths.log_directory)),
        "both" => {
            layers.push(console_layer(json));
            layers.push(file_layer(json, &config.paths.log_directory));
        }
        _ => layers.push(console_layer(json)),
    }

    tracing_subscriber::registry().with(layers).with(filter).init();
}

fn console_layer(json: bool) -> Box<dyn Layer<Registry> + Send + Sync> {
    if json {
        fmt::layer()
            .json()
            .with_current_span(true)
            .with_span_list(true)
            .with_target(true)
            .boxed()
    } else {
        // Span close events print each harvest's id, site, and range along
        // with its elapsed time.
        fmt::layer()
            .with_target(true)
            .with_ansi(true)
            .with_span_events(FmtSpan::CLOSE)
            .pretty()
            .boxed()
    }
}

fn file_layer(json: bool, log_dir: &Path) -> Box<dyn Layer<Registry> + Send + Sync> {
    let appender = tracing_appender::rolling::daily(log_dir, "rankscope.log");
    let (writer, guard) = tracing_appender::non_blocking(appender);
    let _ = FILE_GUARD.set(guard);

    if json {
        fmt::layer()
            .json()
            .with_writer(writer)
            .with_current_span(true)
            .with_span_list(true)
            .boxed()
    } else {
        fmt::layer()
            .with_writer(writer)
            .with_ansi(false)
            .with_span_events(FmtSpan::CLOSE)
            .boxed()
    }
}
