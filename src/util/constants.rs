// LogMerge - util/constants.rs
//
// Single source of truth for all named constants, limits, and defaults.

// =============================================================================
// Application metadata
// =============================================================================

/// Application display name.
pub const APP_NAME: &str = "LogMerge";

/// Application identifier used for config/data directories.
pub const APP_ID: &str = "LogMerge";

/// Current application version (updated by release script).
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

// =============================================================================
// Discovery limits
// =============================================================================

/// Default directory recursion depth. 1 means the input directory's own
/// files only, which is where an extracted upload places its logs.
pub const DEFAULT_MAX_DEPTH: usize = 1;

/// Hard upper bound on max depth (prevents runaway traversal).
pub const ABSOLUTE_MAX_DEPTH: usize = 50;

/// Default include glob patterns. Order matters: it is the primary key of
/// the file-enumeration order, and with it the merge tie-break.
pub const DEFAULT_INCLUDE_PATTERNS: &[&str] = &["*.txt", "*.log"];

/// File size threshold in bytes above which files are memory-mapped.
pub const DEFAULT_LARGE_FILE_THRESHOLD: u64 = 100 * 1024 * 1024; // 100 MB

// =============================================================================
// Parsing
// =============================================================================

/// Default number of worker threads for parallel aggregation.
/// 0 means auto-detect (use available CPU cores).
pub const DEFAULT_WORKER_THREADS: usize = 0;

/// Hard upper bound on configured worker threads.
pub const MAX_WORKER_THREADS: usize = 256;

/// Maximum number of typed parse diagnostics retained per file. Counting
/// continues past this cap; only the detail records are dropped.
pub const MAX_PARSE_ERRORS_PER_FILE: usize = 1_000;

/// Maximum length of a raw line echoed into debug output.
pub const DEBUG_MAX_LINE_PREVIEW: usize = 200;

// =============================================================================
// Log grammar
// =============================================================================

/// Separates the `[timestamp - level]` head from the message bracket.
pub const MESSAGE_BRACKET_DELIMITER: &str = "] [";

/// Separates the timestamp from the severity label inside the head.
pub const SEVERITY_SEPARATOR: &str = " - ";

/// Last occurrence separates the message tail from the JSON payload.
pub const PAYLOAD_DELIMITER: &str = "] ";

/// Minimum whitespace tokens in the message tail.
pub const MIN_MESSAGE_TOKENS: usize = 5;

/// Zero-based token positions within the message tail.
pub const URL_TOKEN_INDEX: usize = 2;
pub const STATUS_TOKEN_INDEX: usize = 3;
pub const RESPONSE_TIME_TOKEN_INDEX: usize = 4;

/// The only status for which the response time is meaningful.
pub const SUCCESS_STATUS: &str = "200";

/// JSON payload keys.
pub const PAYLOAD_KEY_SERVICE_ID: &str = "sid";
pub const PAYLOAD_KEY_VNO: &str = "vno";
pub const PAYLOAD_KEY_ANO: &str = "ano";
pub const PAYLOAD_KEY_RT_AREA: &str = "rtarea";
pub const PAYLOAD_KEY_APP_VERSION: &str = "appVer";

// =============================================================================
// Timestamps
// =============================================================================

/// Default chrono format for the raw timestamp in the line head.
pub const DEFAULT_TIMESTAMP_INPUT_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Default canonical zone (India Standard Time, no DST).
pub const DEFAULT_CANONICAL_TIMEZONE: &str = "+05:30";

/// Source timestamps are UTC unless configured otherwise.
pub const DEFAULT_ASSUME_SOURCE_IS_UTC: bool = true;

/// Largest accepted offset magnitude for the canonical zone, in seconds.
pub const MAX_OFFSET_SECS: i32 = 18 * 3_600;

// =============================================================================
// Export
// =============================================================================

/// Output column labels, in order.
pub const OUTPUT_HEADERS: [&str; 8] = [
    "Service Id",
    "Vno",
    "Ano",
    "Rt Area",
    "URL",
    "Stayed Time",
    "App Version",
    "Timestamp",
];

/// Format used to serialise the `Timestamp` column.
pub const OUTPUT_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Default output file name, written into the input directory.
pub const DEFAULT_OUTPUT_FILE_NAME: &str = "merged_sorted.csv";

// =============================================================================
// Logging
// =============================================================================

/// Default log level.
pub const DEFAULT_LOG_LEVEL: &str = "info";

// =============================================================================
// Configuration
// =============================================================================

/// Configuration file name.
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Retry limits for transient I/O errors while reading inputs.
pub const MAX_READ_RETRIES: u32 = 3;
pub const READ_RETRY_DELAYS_MS: [u64; 3] = [50, 100, 200];
