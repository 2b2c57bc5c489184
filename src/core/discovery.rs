// LogMerge - core/discovery.rs
//
// Input file discovery inside an already-extracted upload directory.
//
// Architecture note: this module uses `walkdir` for directory traversal as an
// OS abstraction. It reads only file *metadata*, never contents; reading is
// owned by the app layer (app::pipeline).
//
// Enumeration order is part of the output contract: the merge tie-break for
// equal timestamps is file order, so files are ordered by the include pattern
// they matched first, then by relative path. Filesystem iteration order never
// leaks through.

use crate::core::model::DiscoveredFile;
use crate::util::error::DiscoveryError;
use std::path::Path;

// =============================================================================
// Configuration
// =============================================================================

/// Configuration for a discovery operation.
#[derive(Debug, Clone)]
pub struct DiscoveryConfig {
    /// Maximum directory recursion depth. 1 = the root's own files.
    pub max_depth: usize,

    /// Glob patterns (filename-only) a file must match to be included.
    /// Earlier patterns sort first.
    pub include_patterns: Vec<String>,

    /// File size (bytes) above which the `is_large` flag is set.
    pub large_file_threshold: u64,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        use crate::util::constants;
        Self {
            max_depth: constants::DEFAULT_MAX_DEPTH,
            include_patterns: constants::DEFAULT_INCLUDE_PATTERNS
                .iter()
                .map(|s| (*s).to_string())
                .collect(),
            large_file_threshold: constants::DEFAULT_LARGE_FILE_THRESHOLD,
        }
    }
}

// =============================================================================
// Discovery
// =============================================================================

/// Discover input files under `root`.
///
/// # Non-fatal errors
/// Entries that cannot be accessed are recorded as human-readable strings in
/// the returned warnings vector.
///
/// # Fatal errors
/// Returns `Err` if the root is invalid or nothing matched the include
/// patterns.
pub fn discover_files(
    root: &Path,
    config: &DiscoveryConfig,
) -> Result<(Vec<DiscoveredFile>, Vec<String>), DiscoveryError> {
    use crate::util::constants;

    // `fs::metadata` rather than `Path::is_dir` so access-denied is
    // distinguishable from not-found.
    match std::fs::metadata(root) {
        Ok(meta) if meta.is_dir() => {}
        Ok(_) => {
            return Err(DiscoveryError::NotADirectory {
                path: root.to_path_buf(),
            })
        }
        Err(e) if e.kind() == std::io::ErrorKind::PermissionDenied => {
            return Err(DiscoveryError::PermissionDenied {
                path: root.to_path_buf(),
                source: e,
            })
        }
        Err(_) => {
            return Err(DiscoveryError::RootNotFound {
                path: root.to_path_buf(),
            })
        }
    }

    let max_depth = config.max_depth.min(constants::ABSOLUTE_MAX_DEPTH);

    tracing::debug!(
        root = %root.display(),
        max_depth,
        include = ?config.include_patterns,
        "Discovery starting"
    );

    let include_pats = compile_patterns(&config.include_patterns);

    let mut files: Vec<DiscoveredFile> = Vec::new();
    let mut warnings: Vec<String> = Vec::new();

    let walker = walkdir::WalkDir::new(root)
        .max_depth(max_depth)
        .follow_links(false)
        .into_iter();

    for entry_result in walker {
        let entry = match entry_result {
            Ok(e) => e,
            Err(e) => {
                let path_str = e
                    .path()
                    .map(|p| p.display().to_string())
                    .unwrap_or_else(|| "<unknown>".to_string());
                let msg = format!("Cannot access '{path_str}': {e}");
                tracing::debug!(warning = %msg, "Discovery warning");
                warnings.push(msg);
                continue;
            }
        };

        if !entry.file_type().is_file() {
            continue;
        }

        let path = entry.path();

        let file_name = match path.file_name().and_then(|n| n.to_str()) {
            Some(n) => n,
            None => {
                warnings.push(format!("Skipping '{}': non-UTF-8 filename", path.display()));
                continue;
            }
        };

        let Some(pattern_index) = include_pats.iter().position(|p| p.matches(file_name)) else {
            tracing::trace!(file = file_name, "Not matched by include patterns");
            continue;
        };

        let size = match entry.metadata() {
            Ok(m) => m.len(),
            Err(e) => {
                let msg = format!("Cannot read metadata for '{}': {e}", path.display());
                tracing::debug!(warning = %msg, "Discovery warning");
                warnings.push(msg);
                continue;
            }
        };

        let source_id = path
            .strip_prefix(root)
            .unwrap_or(path)
            .to_string_lossy()
            .replace('\\', "/");

        files.push(DiscoveredFile {
            path: path.to_path_buf(),
            source_id,
            size,
            pattern_index,
            is_large: size >= config.large_file_threshold,
        });
    }

    files.sort_by(|a, b| {
        a.pattern_index
            .cmp(&b.pattern_index)
            .then_with(|| a.source_id.cmp(&b.source_id))
    });

    if files.is_empty() {
        return Err(DiscoveryError::NoLogFiles {
            path: root.to_path_buf(),
            patterns: config.include_patterns.clone(),
        });
    }

    tracing::debug!(
        files = files.len(),
        warnings = warnings.len(),
        "Discovery complete"
    );

    Ok((files, warnings))
}

// =============================================================================
// Glob helpers
// =============================================================================

/// Compile glob pattern strings. Patterns that fail to compile are logged
/// and skipped; config validation rejects them earlier, so this only fires
/// for programmatic callers.
fn compile_patterns(patterns: &[String]) -> Vec<glob::Pattern> {
    patterns
        .iter()
        .filter_map(|p| match glob::Pattern::new(p) {
            Ok(compiled) => Some(compiled),
            Err(e) => {
                tracing::warn!(pattern = p, error = %e, "Invalid glob pattern, skipping");
                None
            }
        })
        .collect()
}
