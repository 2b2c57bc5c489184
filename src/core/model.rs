// LogMerge - core/model.rs
//
// Core data model types. Pure data definitions with no I/O and no
// platform dependencies. These types are the shared vocabulary across
// all layers.

use chrono::NaiveDateTime;
use serde::Serialize;
use std::path::PathBuf;

// =============================================================================
// Input
// =============================================================================

/// One input file as handed to the engine: an identifier (usually the file
/// name) and its full text content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceText {
    pub source_id: String,
    pub content: String,
}

impl SourceText {
    pub fn new(source_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            source_id: source_id.into(),
            content: content.into(),
        }
    }
}

/// Metadata about an input file found during discovery, before reading.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveredFile {
    /// Full path to the file.
    pub path: PathBuf,

    /// Identifier used in diagnostics: the path relative to the input root.
    pub source_id: String,

    /// File size in bytes.
    pub size: u64,

    /// Index of the first include pattern the file name matched. Primary key
    /// of the enumeration order.
    pub pattern_index: usize,

    /// Whether this file exceeds the large file threshold.
    pub is_large: bool,
}

// =============================================================================
// Records
// =============================================================================

/// A line that satisfied the grammar, before its timestamp is resolved.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedRecord {
    pub service_id: Option<String>,
    pub vno: Option<String>,
    pub ano: Option<String>,
    pub rt_area: Option<String>,
    pub url: String,
    pub status_code: String,
    /// Only ever set when `status_code` is `"200"`.
    pub response_time_ms: Option<f64>,
    pub app_version: Option<String>,
    pub raw_timestamp: String,
}

/// A record whose timestamp has been resolved into the canonical zone.
///
/// Serialises with the output column labels so the JSON export and the CSV
/// header agree.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NormalizedRecord {
    #[serde(rename = "Service Id")]
    pub service_id: Option<String>,
    #[serde(rename = "Vno")]
    pub vno: Option<String>,
    #[serde(rename = "Ano")]
    pub ano: Option<String>,
    #[serde(rename = "Rt Area")]
    pub rt_area: Option<String>,
    #[serde(rename = "URL")]
    pub url: String,
    #[serde(skip)]
    pub status_code: String,
    #[serde(rename = "Stayed Time")]
    pub response_time_ms: Option<f64>,
    #[serde(rename = "App Version")]
    pub app_version: Option<String>,
    /// Timezone-naive instant in the canonical zone.
    #[serde(rename = "Timestamp", serialize_with = "serialize_timestamp")]
    pub timestamp: NaiveDateTime,
}

impl ParsedRecord {
    /// Replace the raw timestamp with its resolved instant.
    pub fn into_normalized(self, timestamp: NaiveDateTime) -> NormalizedRecord {
        NormalizedRecord {
            service_id: self.service_id,
            vno: self.vno,
            ano: self.ano,
            rt_area: self.rt_area,
            url: self.url,
            status_code: self.status_code,
            response_time_ms: self.response_time_ms,
            app_version: self.app_version,
            timestamp,
        }
    }
}

fn serialize_timestamp<S: serde::Serializer>(
    ts: &NaiveDateTime,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.collect_str(&ts.format(crate::util::constants::OUTPUT_TIMESTAMP_FORMAT))
}

// =============================================================================
// Aggregation results
// =============================================================================

/// Output of aggregating one file: records in line order plus the number of
/// non-blank lines that produced nothing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FileAggregate {
    pub records: Vec<NormalizedRecord>,
    pub malformed_count: usize,
}

/// One file's contribution to the merge, tagged with its source.
#[derive(Debug, Clone, PartialEq)]
pub struct FileResult {
    pub source_id: String,
    pub records: Vec<NormalizedRecord>,
}

/// The merged, chronologically sorted record table.
#[derive(Debug, Clone, PartialEq)]
pub struct Corpus {
    records: Vec<NormalizedRecord>,
}

impl Corpus {
    /// Wrap records that are already in corpus order. Only the merger
    /// constructs these.
    pub(crate) fn from_sorted(records: Vec<NormalizedRecord>) -> Self {
        Self { records }
    }

    pub fn records(&self) -> &[NormalizedRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn into_records(self) -> Vec<NormalizedRecord> {
        self.records
    }
}

// =============================================================================
// Summaries
// =============================================================================

/// Per-file aggregation statistics.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FileSummary {
    pub source_id: String,

    /// Every line in the file, blank ones included.
    pub lines_processed: u64,

    /// Records that reached the merge.
    pub record_count: usize,

    /// Lines that failed the grammar.
    pub rejected_lines: usize,

    /// Lines that parsed but whose timestamp could not be resolved.
    pub unresolved_timestamps: usize,

    /// Earliest normalised timestamp (if any).
    pub earliest: Option<NaiveDateTime>,

    /// Latest normalised timestamp (if any).
    pub latest: Option<NaiveDateTime>,
}

impl FileSummary {
    /// Lines that contributed nothing: rejections plus unresolved timestamps.
    pub fn malformed_count(&self) -> usize {
        self.rejected_lines + self.unresolved_timestamps
    }
}

/// Statistics for a complete run.
#[derive(Debug, Clone, Default)]
pub struct MergeSummary {
    /// Files handed to the aggregator.
    pub files_processed: usize,

    /// Files contributing at least one record.
    pub files_with_records: usize,

    /// Files that could not be read.
    pub files_failed: usize,

    /// Records in the corpus.
    pub total_records: usize,

    /// Malformed lines across all files.
    pub total_malformed: usize,

    /// Per-file breakdown, in file-enumeration order.
    pub file_summaries: Vec<FileSummary>,

    /// Non-fatal warnings (unreadable files and the like).
    pub warnings: Vec<String>,

    /// Wall-clock duration of aggregation and merge.
    pub duration: std::time::Duration,
}
