// LogMerge - core/aggregate.rs
//
// Per-file aggregation: recognise every line, resolve its timestamp, keep
// the survivors in line order and count the rest.
// Core layer: accepts text content, never touches the filesystem.

use crate::core::model::{FileAggregate, FileSummary, NormalizedRecord};
use crate::core::recognizer;
use crate::core::timestamp::{self, TimestampConfig};
use crate::util::error::ParseError;
use crate::util::logging;

/// Configuration for aggregation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseConfig {
    pub timestamps: TimestampConfig,
    pub max_parse_errors_per_file: usize,
}

impl Default for ParseConfig {
    fn default() -> Self {
        use crate::util::constants;
        Self {
            timestamps: TimestampConfig::default(),
            max_parse_errors_per_file: constants::MAX_PARSE_ERRORS_PER_FILE,
        }
    }
}

/// Result of aggregating a single file with diagnostics retained.
#[derive(Debug, Clone)]
pub struct ParseResult {
    /// Normalised records in line order.
    pub records: Vec<NormalizedRecord>,
    /// Per-line diagnostics (capped at max_parse_errors_per_file).
    pub errors: Vec<ParseError>,
    /// Counts and timestamp range.
    pub summary: FileSummary,
}

/// Aggregate one file's content.
///
/// Blank lines are skipped without being counted. Every other line either
/// becomes a record or increments `malformed_count`.
pub fn aggregate(content: &str, config: &TimestampConfig) -> FileAggregate {
    let parse_config = ParseConfig {
        timestamps: config.clone(),
        max_parse_errors_per_file: 0,
    };
    let result = aggregate_file("", content, &parse_config);
    FileAggregate {
        malformed_count: result.summary.malformed_count(),
        records: result.records,
    }
}

/// Aggregate one file, retaining typed diagnostics and a summary.
pub fn aggregate_file(source_id: &str, content: &str, config: &ParseConfig) -> ParseResult {
    let mut records = Vec::new();
    let mut errors = Vec::new();
    let mut summary = FileSummary {
        source_id: source_id.to_string(),
        ..FileSummary::default()
    };

    for (line_idx, line) in content.lines().enumerate() {
        summary.lines_processed += 1;
        let line_number = (line_idx as u64) + 1;

        if line.trim().is_empty() {
            continue;
        }

        let error = match normalize_line(line, &config.timestamps) {
            Ok(record) => {
                summary.earliest = Some(match summary.earliest {
                    Some(e) if e <= record.timestamp => e,
                    _ => record.timestamp,
                });
                summary.latest = Some(match summary.latest {
                    Some(l) if l >= record.timestamp => l,
                    _ => record.timestamp,
                });
                records.push(record);
                continue;
            }
            Err(LineFailure::Rejected(reason)) => {
                summary.rejected_lines += 1;
                ParseError::LineRejected {
                    source_id: source_id.to_string(),
                    line_number,
                    reason,
                }
            }
            Err(LineFailure::Unresolved(raw_timestamp)) => {
                summary.unresolved_timestamps += 1;
                ParseError::TimestampUnresolved {
                    source_id: source_id.to_string(),
                    line_number,
                    raw_timestamp,
                    format: config.timestamps.input_format.clone(),
                }
            }
        };

        tracing::trace!(
            file = source_id,
            line = line_number,
            text = logging::preview(line),
            "Line skipped"
        );
        if errors.len() < config.max_parse_errors_per_file {
            errors.push(error);
        }
    }

    summary.record_count = records.len();

    tracing::debug!(
        file = source_id,
        records = summary.record_count,
        rejected = summary.rejected_lines,
        unresolved = summary.unresolved_timestamps,
        lines = summary.lines_processed,
        "Aggregation complete"
    );

    ParseResult {
        records,
        errors,
        summary,
    }
}

/// Why a non-blank line produced no record.
enum LineFailure {
    Rejected(crate::util::error::Rejection),
    Unresolved(String),
}

fn normalize_line(line: &str, config: &TimestampConfig) -> Result<NormalizedRecord, LineFailure> {
    let parsed = recognizer::recognize(line).map_err(LineFailure::Rejected)?;
    match timestamp::normalize(&parsed.raw_timestamp, config) {
        Some(ts) => Ok(parsed.into_normalized(ts)),
        None => Err(LineFailure::Unresolved(parsed.raw_timestamp)),
    }
}
