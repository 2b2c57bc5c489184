// LogMerge - main.rs
//
// Application entry point. Handles:
// 1. CLI argument parsing
// 2. Config loading (config.toml, then CLI overrides)
// 3. Logging initialisation (debug mode support)
// 4. Running the merge and writing the table

use clap::Parser;
use logmerge::app::pipeline::{self, PipelineOptions};
use logmerge::core::export::{self, ExportFormat};
use logmerge::core::timestamp;
use logmerge::platform::config::{self, AppConfig, PlatformPaths};
use logmerge::util::{self, error::LogMergeError};
use std::path::{Path, PathBuf};

/// LogMerge - merge access logs into one chronologically ordered table.
///
/// Point LogMerge at a directory of extracted .txt/.log files; every line
/// matching the access-log grammar becomes one row, timestamps are moved
/// into the canonical zone, and all files are merged in time order.
#[derive(Parser, Debug)]
#[command(name = "logmerge", version, about)]
struct Cli {
    /// Directory containing the log files.
    input: PathBuf,

    /// Output file (default: <INPUT>/merged_sorted.csv).
    #[arg(short = 'o', long = "output")]
    output: Option<PathBuf>,

    /// Output format: csv or json.
    #[arg(short = 'F', long = "format")]
    format: Option<String>,

    /// Config file (default: platform config directory).
    #[arg(short = 'c', long = "config")]
    config: Option<PathBuf>,

    /// Canonical timezone offset, e.g. "+05:30" or "UTC".
    #[arg(short = 'z', long = "timezone")]
    timezone: Option<String>,

    /// chrono format of the raw timestamps.
    #[arg(long = "timestamp-format")]
    timestamp_format: Option<String>,

    /// Treat raw timestamps as already local (no UTC conversion).
    #[arg(long = "source-local")]
    source_local: bool,

    /// Worker threads (0 = one per core).
    #[arg(short = 'j', long = "workers")]
    workers: Option<usize>,

    /// Enable debug logging (equivalent to RUST_LOG=debug).
    #[arg(short = 'd', long = "debug")]
    debug: bool,
}

fn main() {
    let cli = Cli::parse();

    let config_path = cli
        .config
        .clone()
        .unwrap_or_else(|| PlatformPaths::resolve().config_file());
    let (mut app_config, config_warnings) = config::load_config(&config_path);

    util::logging::init(
        cli.debug,
        app_config.log_level.as_deref(),
        app_config.log_file.as_deref(),
    );

    tracing::info!(
        version = util::constants::APP_VERSION,
        debug = cli.debug,
        "LogMerge starting"
    );

    for warning in &config_warnings {
        tracing::warn!(warning = %warning, "Config warning");
    }

    if let Err(e) = apply_overrides(&cli, &mut app_config).and_then(|()| run(&cli, &app_config)) {
        tracing::error!(error = %e, "Run failed");
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

/// CLI flags take priority over config.toml.
fn apply_overrides(cli: &Cli, config: &mut AppConfig) -> Result<(), LogMergeError> {
    use logmerge::util::error::ConfigError;

    if let Some(ref zone) = cli.timezone {
        config.canonical_zone =
            timestamp::parse_zone(zone).ok_or_else(|| ConfigError::ValueOutOfRange {
                field: "--timezone".to_string(),
                value: zone.clone(),
                expected: "a fixed offset such as \"+05:30\", \"-08:00\" or \"UTC\"".to_string(),
            })?;
    }

    if let Some(ref format) = cli.timestamp_format {
        timestamp::validate_format(format).map_err(|reason| ConfigError::ValueOutOfRange {
            field: "--timestamp-format".to_string(),
            value: format.clone(),
            expected: reason,
        })?;
        config.timestamp_input_format = format.clone();
    }

    if cli.source_local {
        config.assume_source_is_utc = false;
    }

    if let Some(workers) = cli.workers {
        config.worker_threads = workers.min(util::constants::MAX_WORKER_THREADS);
    }

    if let Some(ref name) = cli.format {
        config.export_format =
            ExportFormat::from_name(name).ok_or_else(|| ConfigError::ValueOutOfRange {
                field: "--format".to_string(),
                value: name.clone(),
                expected: "csv or json".to_string(),
            })?;
    }

    Ok(())
}

fn run(cli: &Cli, config: &AppConfig) -> Result<(), LogMergeError> {
    tracing::debug!(
        input = %cli.input.display(),
        assume_source_is_utc = config.assume_source_is_utc,
        canonical_zone = %timestamp::format_zone(&config.canonical_zone),
        input_format = %config.timestamp_input_format,
        "Effective configuration"
    );

    let options = PipelineOptions {
        discovery: config.discovery_config(),
        parse: config.parse_config(),
        worker_threads: config.worker_threads,
        cancel_flag: None,
    };

    let output = pipeline::run_directory(&cli.input, &options)?;

    for file in &output.summary.file_summaries {
        if file.malformed_count() > 0 {
            tracing::info!(
                file = %file.source_id,
                records = file.record_count,
                malformed = file.malformed_count(),
                "Skipped malformed lines"
            );
        }
    }

    let output_path = cli
        .output
        .clone()
        .unwrap_or_else(|| default_output_path(&cli.input, config));
    let rows = export::write_table(
        output.corpus.records(),
        &output_path,
        config.export_format,
    )?;

    println!(
        "Wrote {rows} rows from {} file(s) to {} ({} malformed line(s) skipped)",
        output.summary.files_processed,
        output_path.display(),
        output.summary.total_malformed
    );
    Ok(())
}

/// `<input>/<output_file_name>`, with the extension following the format.
fn default_output_path(input: &Path, config: &AppConfig) -> PathBuf {
    let path = input.join(&config.output_file_name);
    match config.export_format {
        ExportFormat::Csv => path,
        ExportFormat::Json => path.with_extension("json"),
    }
}
