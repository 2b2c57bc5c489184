// LogMerge - platform/config.rs
//
// Platform-specific configuration directory resolution and config.toml
// loading with startup validation.
//
// Uses the `directories` crate for XDG (Linux), AppData (Windows),
// Library (macOS) compliance.

use crate::core::aggregate::ParseConfig;
use crate::core::discovery::DiscoveryConfig;
use crate::core::export::ExportFormat;
use crate::core::timestamp::{self, TimestampConfig};
use crate::util::constants;
use crate::util::error::ConfigError;
use chrono::FixedOffset;
use directories::ProjectDirs;
use std::path::{Path, PathBuf};

/// Resolved platform paths for LogMerge configuration.
#[derive(Debug, Clone)]
pub struct PlatformPaths {
    /// Configuration directory (e.g. ~/.config/logmerge/ or %APPDATA%\LogMerge\config\)
    pub config_dir: PathBuf,
}

impl PlatformPaths {
    /// Resolve platform-appropriate paths.
    ///
    /// Falls back to current directory if platform dirs cannot be determined.
    pub fn resolve() -> Self {
        if let Some(proj_dirs) = ProjectDirs::from("", "", constants::APP_ID) {
            let config_dir = proj_dirs.config_dir().to_path_buf();
            tracing::debug!(config = %config_dir.display(), "Platform paths resolved");
            Self { config_dir }
        } else {
            tracing::warn!("Could not determine platform directories, using current directory");
            Self {
                config_dir: PathBuf::from("."),
            }
        }
    }

    /// Default location of config.toml.
    pub fn config_file(&self) -> PathBuf {
        self.config_dir.join(constants::CONFIG_FILE_NAME)
    }
}

// =============================================================================
// config.toml loading and validation
// =============================================================================

/// Raw deserialisable shape of config.toml.
///
/// Unknown keys are silently ignored for forward compatibility.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct RawConfig {
    pub discovery: DiscoverySection,
    pub parsing: ParsingSection,
    pub timestamps: TimestampsSection,
    pub export: ExportSection,
    pub logging: LoggingSection,
}

/// `[discovery]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct DiscoverySection {
    /// Maximum directory recursion depth (1 = input directory only).
    pub max_depth: Option<usize>,
    /// Include glob patterns, in enumeration priority order.
    pub include_patterns: Option<Vec<String>>,
}

/// `[parsing]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct ParsingSection {
    /// Number of worker threads (0 = auto).
    pub worker_threads: Option<usize>,
    /// Per-line diagnostics retained per file.
    pub max_parse_errors_per_file: Option<usize>,
    /// Files at least this large are memory-mapped.
    pub large_file_threshold_bytes: Option<u64>,
}

/// `[timestamps]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct TimestampsSection {
    /// Treat raw timestamps as UTC and convert into the canonical zone.
    pub assume_source_is_utc: Option<bool>,
    /// Canonical zone offset, e.g. "+05:30" or "UTC".
    pub canonical_timezone: Option<String>,
    /// chrono format string for raw timestamps.
    pub input_format: Option<String>,
}

/// `[export]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct ExportSection {
    /// "csv" or "json".
    pub format: Option<String>,
    /// File name written into the input directory when no output is given.
    pub output_file_name: Option<String>,
}

/// `[logging]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    /// Log level: "error", "warn", "info", "debug", "trace".
    pub level: Option<String>,
    /// Log file path (empty = stderr only).
    pub file: Option<String>,
}

/// Validated application configuration derived from `config.toml`.
///
/// Invalid values produce actionable warnings and fall back to defaults.
#[derive(Debug, Clone)]
pub struct AppConfig {
    // -- Discovery --
    pub max_depth: usize,
    pub include_patterns: Vec<String>,

    // -- Parsing --
    pub worker_threads: usize,
    pub max_parse_errors_per_file: usize,
    pub large_file_threshold: u64,

    // -- Timestamps --
    pub assume_source_is_utc: bool,
    pub canonical_zone: FixedOffset,
    pub timestamp_input_format: String,

    // -- Export --
    pub export_format: ExportFormat,
    pub output_file_name: String,

    // -- Logging --
    pub log_level: Option<String>,
    pub log_file: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            max_depth: constants::DEFAULT_MAX_DEPTH,
            include_patterns: constants::DEFAULT_INCLUDE_PATTERNS
                .iter()
                .map(|s| (*s).to_string())
                .collect(),
            worker_threads: constants::DEFAULT_WORKER_THREADS,
            max_parse_errors_per_file: constants::MAX_PARSE_ERRORS_PER_FILE,
            large_file_threshold: constants::DEFAULT_LARGE_FILE_THRESHOLD,
            assume_source_is_utc: constants::DEFAULT_ASSUME_SOURCE_IS_UTC,
            canonical_zone: timestamp::default_zone(),
            timestamp_input_format: constants::DEFAULT_TIMESTAMP_INPUT_FORMAT.to_string(),
            export_format: ExportFormat::default(),
            output_file_name: constants::DEFAULT_OUTPUT_FILE_NAME.to_string(),
            log_level: None,
            log_file: None,
        }
    }
}

impl AppConfig {
    pub fn timestamp_config(&self) -> TimestampConfig {
        TimestampConfig {
            assume_source_is_utc: self.assume_source_is_utc,
            canonical_zone: self.canonical_zone,
            input_format: self.timestamp_input_format.clone(),
        }
    }

    pub fn parse_config(&self) -> ParseConfig {
        ParseConfig {
            timestamps: self.timestamp_config(),
            max_parse_errors_per_file: self.max_parse_errors_per_file,
        }
    }

    pub fn discovery_config(&self) -> DiscoveryConfig {
        DiscoveryConfig {
            max_depth: self.max_depth,
            include_patterns: self.include_patterns.clone(),
            large_file_threshold: self.large_file_threshold,
        }
    }
}

/// Load and validate a config file.
///
/// Returns `AppConfig` with validated values and a list of non-fatal warnings.
/// If the file does not exist, returns defaults with no warnings (first run).
/// If the file is unreadable or unparseable, returns defaults with a warning;
/// the run still proceeds but the user is informed.
pub fn load_config(config_path: &Path) -> (AppConfig, Vec<String>) {
    if !config_path.exists() {
        tracing::debug!(path = %config_path.display(), "No config.toml found; using defaults");
        return (AppConfig::default(), Vec::new());
    }

    let result = std::fs::read_to_string(config_path)
        .map_err(|e| ConfigError::Io {
            path: config_path.to_path_buf(),
            source: e,
        })
        .and_then(|content| {
            toml::from_str::<RawConfig>(&content).map_err(|e| ConfigError::TomlParse {
                path: config_path.to_path_buf(),
                source: e,
            })
        });

    match result {
        Ok(raw) => {
            tracing::info!(path = %config_path.display(), "Loaded config.toml");
            validate(raw)
        }
        Err(e) => {
            let msg = format!("{e}. Using defaults.");
            tracing::warn!("{}", msg);
            (AppConfig::default(), vec![msg])
        }
    }
}

/// Validate each field against named constants, accumulating all problems.
pub fn validate(raw: RawConfig) -> (AppConfig, Vec<String>) {
    let mut config = AppConfig::default();
    let mut warnings: Vec<String> = Vec::new();
    let mut reject = |field: &str, value: String, expected: String| {
        warnings.push(
            ConfigError::ValueOutOfRange {
                field: field.to_string(),
                value,
                expected,
            }
            .to_string()
                + " Using default.",
        );
    };

    // -- Discovery --
    if let Some(depth) = raw.discovery.max_depth {
        if (1..=constants::ABSOLUTE_MAX_DEPTH).contains(&depth) {
            config.max_depth = depth;
        } else {
            reject(
                "discovery.max_depth",
                depth.to_string(),
                format!("1-{}", constants::ABSOLUTE_MAX_DEPTH),
            );
        }
    }

    if let Some(patterns) = raw.discovery.include_patterns {
        let invalid: Vec<&String> = patterns
            .iter()
            .filter(|p| glob::Pattern::new(p).is_err())
            .collect();
        if patterns.is_empty() || !invalid.is_empty() {
            reject(
                "discovery.include_patterns",
                format!("{patterns:?}"),
                "a non-empty list of valid glob patterns".to_string(),
            );
        } else {
            config.include_patterns = patterns;
        }
    }

    // -- Parsing --
    if let Some(threads) = raw.parsing.worker_threads {
        if threads <= constants::MAX_WORKER_THREADS {
            config.worker_threads = threads;
        } else {
            reject(
                "parsing.worker_threads",
                threads.to_string(),
                format!("0-{} (0 = one per core)", constants::MAX_WORKER_THREADS),
            );
        }
    }

    if let Some(max) = raw.parsing.max_parse_errors_per_file {
        config.max_parse_errors_per_file = max;
    }

    if let Some(bytes) = raw.parsing.large_file_threshold_bytes {
        config.large_file_threshold = bytes;
    }

    // -- Timestamps --
    if let Some(utc) = raw.timestamps.assume_source_is_utc {
        config.assume_source_is_utc = utc;
    }

    if let Some(ref zone) = raw.timestamps.canonical_timezone {
        match timestamp::parse_zone(zone) {
            Some(offset) => config.canonical_zone = offset,
            None => reject(
                "timestamps.canonical_timezone",
                zone.clone(),
                "a fixed offset such as \"+05:30\", \"-08:00\" or \"UTC\"".to_string(),
            ),
        }
    }

    if let Some(format) = raw.timestamps.input_format {
        match timestamp::validate_format(&format) {
            Ok(()) => config.timestamp_input_format = format,
            Err(reason) => reject("timestamps.input_format", format, reason),
        }
    }

    // -- Export --
    if let Some(ref name) = raw.export.format {
        match ExportFormat::from_name(name) {
            Some(format) => config.export_format = format,
            None => reject("export.format", name.clone(), "\"csv\" or \"json\"".to_string()),
        }
    }

    if let Some(name) = raw.export.output_file_name {
        if name.trim().is_empty() || name.contains(['/', '\\']) {
            reject(
                "export.output_file_name",
                name,
                "a bare file name".to_string(),
            );
        } else {
            config.output_file_name = name;
        }
    }

    // -- Logging --
    if let Some(ref level) = raw.logging.level {
        let valid = ["error", "warn", "info", "debug", "trace"];
        if valid.contains(&level.to_lowercase().as_str()) {
            config.log_level = Some(level.clone());
        } else {
            reject(
                "logging.level",
                level.clone(),
                "error, warn, info, debug, trace".to_string(),
            );
        }
    }

    if let Some(ref file) = raw.logging.file {
        if !file.is_empty() {
            config.log_file = Some(file.clone());
        }
    }

    if !warnings.is_empty() {
        tracing::warn!(
            count = warnings.len(),
            "Config validation produced warnings"
        );
    }

    (config, warnings)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn from_toml(text: &str) -> (AppConfig, Vec<String>) {
        validate(toml::from_str(text).unwrap())
    }

    #[test]
    fn test_empty_config_is_defaults() {
        let (config, warnings) = from_toml("");
        assert!(warnings.is_empty());
        assert!(config.assume_source_is_utc);
        assert_eq!(timestamp::format_zone(&config.canonical_zone), "+05:30");
        assert_eq!(config.timestamp_input_format, "%Y-%m-%d %H:%M:%S");
        assert_eq!(config.include_patterns, ["*.txt", "*.log"]);
        assert_eq!(config.export_format, ExportFormat::Csv);
    }

    #[test]
    fn test_valid_values_are_applied() {
        let (config, warnings) = from_toml(
            r#"
[discovery]
max_depth = 3
include_patterns = ["*.log"]

[parsing]
worker_threads = 4

[timestamps]
assume_source_is_utc = false
canonical_timezone = "UTC-03:00"
input_format = "%d/%m/%Y %H:%M:%S"

[export]
format = "json"
output_file_name = "out.json"

[logging]
level = "debug"
"#,
        );
        assert!(warnings.is_empty(), "{warnings:?}");
        assert_eq!(config.max_depth, 3);
        assert_eq!(config.include_patterns, ["*.log"]);
        assert_eq!(config.worker_threads, 4);
        assert!(!config.assume_source_is_utc);
        assert_eq!(config.canonical_zone.local_minus_utc(), -3 * 3_600);
        assert_eq!(config.timestamp_input_format, "%d/%m/%Y %H:%M:%S");
        assert_eq!(config.export_format, ExportFormat::Json);
        assert_eq!(config.output_file_name, "out.json");
        assert_eq!(config.log_level.as_deref(), Some("debug"));
    }

    #[test]
    fn test_invalid_values_fall_back_with_warnings() {
        let (config, warnings) = from_toml(
            r#"
[discovery]
max_depth = 0
include_patterns = []

[timestamps]
canonical_timezone = "Mars/Olympus"
input_format = "%H:%M"

[export]
format = "xlsx"
output_file_name = "../escape.csv"

[logging]
level = "loud"
"#,
        );
        assert_eq!(warnings.len(), 7, "{warnings:?}");
        assert_eq!(config.max_depth, constants::DEFAULT_MAX_DEPTH);
        assert_eq!(timestamp::format_zone(&config.canonical_zone), "+05:30");
        assert_eq!(config.timestamp_input_format, "%Y-%m-%d %H:%M:%S");
        assert_eq!(config.export_format, ExportFormat::Csv);
        assert_eq!(config.output_file_name, "merged_sorted.csv");
        assert!(config.log_level.is_none());
    }

    #[test]
    fn test_retired_file_limit_key_is_ignored() {
        let (config, warnings) = from_toml("[discovery]\nmax_files = 10\n");
        assert!(warnings.is_empty());
        assert_eq!(config.max_depth, constants::DEFAULT_MAX_DEPTH);
    }

    #[test]
    fn test_unknown_keys_are_ignored() {
        let (_, warnings) = from_toml("[future]\nflag = true\n[timestamps]\nnew_key = 1\n");
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_missing_file_is_defaults_without_warning() {
        let dir = tempfile::tempdir().unwrap();
        let (config, warnings) = load_config(&dir.path().join("config.toml"));
        assert!(warnings.is_empty());
        assert_eq!(config.max_depth, constants::DEFAULT_MAX_DEPTH);
    }

    #[test]
    fn test_unparseable_file_is_defaults_with_warning() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[timestamps\nbroken").unwrap();
        let (config, warnings) = load_config(&path);
        assert_eq!(warnings.len(), 1);
        assert!(config.assume_source_is_utc);
    }

    #[test]
    fn test_derived_engine_configs() {
        let config = AppConfig::default();
        assert_eq!(config.parse_config(), ParseConfig::default());
        assert_eq!(config.timestamp_config(), TimestampConfig::default());
        assert_eq!(config.discovery_config().max_depth, 1);
    }
}
