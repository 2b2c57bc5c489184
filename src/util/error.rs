// LogMerge - util/error.rs
//
// Typed error hierarchy with context-preserving error chains.
// All errors preserve the causal chain for diagnostic logging.
//
// Line- and file-level problems (`Rejection`, `ParseError`) are diagnostics,
// not failures: they are counted and logged but never returned through
// `LogMergeError`. Only the corpus-level `MergeError::EmptyCorpus` and the
// discovery, configuration and export failures reach the caller.

use std::fmt;
use std::io;
use std::path::PathBuf;

/// Top-level error type for all LogMerge operations.
/// Errors are categorised by the subsystem that produced them.
#[derive(Debug)]
pub enum LogMergeError {
    /// Input file discovery failed.
    Discovery(DiscoveryError),

    /// No usable records across the whole input set.
    Merge(MergeError),

    /// Writing the merged table failed.
    Export(ExportError),

    /// Configuration loading or validation failed.
    Config(ConfigError),

    /// The run was cancelled before the merge barrier was reached.
    Cancelled,
}

impl fmt::Display for LogMergeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Discovery(e) => write!(f, "Discovery error: {e}"),
            Self::Merge(e) => write!(f, "Merge error: {e}"),
            Self::Export(e) => write!(f, "Export error: {e}"),
            Self::Config(e) => write!(f, "Configuration error: {e}"),
            Self::Cancelled => f.write_str("Run cancelled"),
        }
    }
}

impl std::error::Error for LogMergeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Discovery(e) => Some(e),
            Self::Merge(e) => Some(e),
            Self::Export(e) => Some(e),
            Self::Config(e) => Some(e),
            Self::Cancelled => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Discovery errors
// ---------------------------------------------------------------------------

/// Errors related to input file discovery.
#[derive(Debug)]
pub enum DiscoveryError {
    /// The input path does not exist or is not accessible.
    RootNotFound { path: PathBuf },

    /// The input path is not a directory.
    NotADirectory { path: PathBuf },

    /// Permission denied accessing the input path.
    PermissionDenied { path: PathBuf, source: io::Error },

    /// The directory holds no file matching the include patterns.
    NoLogFiles { path: PathBuf, patterns: Vec<String> },
}

impl fmt::Display for DiscoveryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RootNotFound { path } => {
                write!(f, "Input path '{}' does not exist", path.display())
            }
            Self::NotADirectory { path } => {
                write!(f, "Input path '{}' is not a directory", path.display())
            }
            Self::PermissionDenied { path, source } => {
                write!(
                    f,
                    "Permission denied accessing '{}': {source}",
                    path.display()
                )
            }
            Self::NoLogFiles { path, patterns } => write!(
                f,
                "No files matching {} found in '{}'",
                patterns.join(", "),
                path.display()
            ),
        }
    }
}

impl std::error::Error for DiscoveryError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::PermissionDenied { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<DiscoveryError> for LogMergeError {
    fn from(e: DiscoveryError) -> Self {
        Self::Discovery(e)
    }
}

// ---------------------------------------------------------------------------
// Line rejections
// ---------------------------------------------------------------------------

/// Why a raw line did not yield a record. Ordinary return value of the
/// recognizer; each variant names the grammar step that failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    /// No `"] ["` between the head and the message bracket.
    MissingMessageBracket,

    /// No `" - "` between the timestamp and the severity label.
    MissingSeveritySeparator,

    /// No `"] "` before the trailing JSON payload.
    MissingPayloadBracket,

    /// The message tail has fewer whitespace tokens than required.
    TooFewTokens { found: usize, required: usize },

    /// The payload is not a JSON object.
    InvalidPayload { reason: String },
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingMessageBracket => f.write_str("missing \"] [\" message bracket"),
            Self::MissingSeveritySeparator => {
                f.write_str("missing \" - \" between timestamp and level")
            }
            Self::MissingPayloadBracket => f.write_str("missing \"] \" before JSON payload"),
            Self::TooFewTokens { found, required } => {
                write!(f, "message has {found} tokens, expected at least {required}")
            }
            Self::InvalidPayload { reason } => write!(f, "invalid JSON payload: {reason}"),
        }
    }
}

// ---------------------------------------------------------------------------
// Parse diagnostics
// ---------------------------------------------------------------------------

/// A per-line diagnostic recorded while aggregating one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// The line did not satisfy the grammar.
    LineRejected {
        source_id: String,
        line_number: u64,
        reason: Rejection,
    },

    /// The line parsed but its timestamp could not be resolved.
    TimestampUnresolved {
        source_id: String,
        line_number: u64,
        raw_timestamp: String,
        format: String,
    },
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LineRejected {
                source_id,
                line_number,
                reason,
            } => write!(f, "'{source_id}' line {line_number}: {reason}"),
            Self::TimestampUnresolved {
                source_id,
                line_number,
                raw_timestamp,
                format,
            } => write!(
                f,
                "'{source_id}' line {line_number}: cannot parse timestamp \
                 '{raw_timestamp}' with format '{format}'"
            ),
        }
    }
}

impl std::error::Error for ParseError {}

// ---------------------------------------------------------------------------
// Merge errors
// ---------------------------------------------------------------------------

/// Errors raised by the corpus merger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MergeError {
    /// Every input file aggregated to zero records.
    EmptyCorpus { files: usize },
}

impl fmt::Display for MergeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyCorpus { files } => write!(
                f,
                "No valid log entries parsed from {files} file(s)"
            ),
        }
    }
}

impl std::error::Error for MergeError {}

impl From<MergeError> for LogMergeError {
    fn from(e: MergeError) -> Self {
        Self::Merge(e)
    }
}

// ---------------------------------------------------------------------------
// Export errors
// ---------------------------------------------------------------------------

/// Errors related to writing the merged table.
#[derive(Debug)]
pub enum ExportError {
    /// I/O error writing the export file.
    Io { path: PathBuf, source: io::Error },

    /// CSV serialisation error.
    Csv { path: PathBuf, source: csv::Error },

    /// JSON serialisation error.
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },
}

impl fmt::Display for ExportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "Export I/O error '{}': {source}", path.display())
            }
            Self::Csv { path, source } => {
                write!(f, "CSV export error '{}': {source}", path.display())
            }
            Self::Json { path, source } => {
                write!(f, "JSON export error '{}': {source}", path.display())
            }
        }
    }
}

impl std::error::Error for ExportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Csv { source, .. } => Some(source),
            Self::Json { source, .. } => Some(source),
        }
    }
}

impl From<ExportError> for LogMergeError {
    fn from(e: ExportError) -> Self {
        Self::Export(e)
    }
}

// ---------------------------------------------------------------------------
// Config errors
// ---------------------------------------------------------------------------

/// Errors related to configuration loading.
#[derive(Debug)]
pub enum ConfigError {
    /// TOML parsing failed.
    TomlParse {
        path: PathBuf,
        source: toml::de::Error,
    },

    /// A config value is out of the allowed range or not recognised.
    ValueOutOfRange {
        field: String,
        value: String,
        expected: String,
    },

    /// I/O error reading config file.
    Io { path: PathBuf, source: io::Error },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TomlParse { path, source } => {
                write!(f, "Config parse error '{}': {source}", path.display())
            }
            Self::ValueOutOfRange {
                field,
                value,
                expected,
            } => write!(
                f,
                "Config '{field}' = '{value}' is out of range. Expected: {expected}"
            ),
            Self::Io { path, source } => {
                write!(f, "Config I/O error '{}': {source}", path.display())
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::TomlParse { source, .. } => Some(source),
            Self::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<ConfigError> for LogMergeError {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

/// Convenience type alias for LogMerge results.
pub type Result<T> = std::result::Result<T, LogMergeError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn test_empty_corpus_message_names_file_count() {
        let err = LogMergeError::from(MergeError::EmptyCorpus { files: 3 });
        assert_eq!(
            err.to_string(),
            "Merge error: No valid log entries parsed from 3 file(s)"
        );
        assert!(err.source().is_some());
    }

    #[test]
    fn test_parse_error_display_includes_line_and_reason() {
        let err = ParseError::LineRejected {
            source_id: "app.log".to_string(),
            line_number: 7,
            reason: Rejection::TooFewTokens {
                found: 3,
                required: 5,
            },
        };
        assert_eq!(
            err.to_string(),
            "'app.log' line 7: message has 3 tokens, expected at least 5"
        );
    }

    #[test]
    fn test_top_level_errors_name_their_subsystem() {
        let err = LogMergeError::from(ConfigError::ValueOutOfRange {
            field: "--timezone".to_string(),
            value: "Mars".to_string(),
            expected: "a fixed offset".to_string(),
        });
        assert!(err.to_string().starts_with("Configuration error: "));
        assert!(err.source().is_some());

        let err = LogMergeError::from(DiscoveryError::RootNotFound {
            path: PathBuf::from("/missing"),
        });
        assert!(err.to_string().starts_with("Discovery error: "));

        assert_eq!(LogMergeError::Cancelled.to_string(), "Run cancelled");
        assert!(LogMergeError::Cancelled.source().is_none());
    }

    #[test]
    fn test_no_log_files_lists_patterns() {
        let err = DiscoveryError::NoLogFiles {
            path: PathBuf::from("/tmp/upload"),
            patterns: vec!["*.txt".to_string(), "*.log".to_string()],
        };
        assert!(err.to_string().contains("*.txt, *.log"));
    }
}
