// LogMerge - app/pipeline.rs
//
// Run orchestration: discovery -> parallel per-file aggregation -> merge.
//
// Architecture:
//   - Files are indexed before any work starts. Aggregation runs on a rayon
//     pool and results are collected with an order-preserving parallel
//     collect, so completion order never affects the merge tie-break.
//   - The collect is the only join point; the merge needs every file.
//   - An optional `Arc<AtomicBool>` cancel flag is checked before each file
//     is read and before it is parsed. Per-file work is pure, so abandoning
//     it leaves nothing to roll back.
//   - Per-file failures (unreadable files, malformed lines) are non-fatal.

use crate::core::aggregate::{self, ParseConfig, ParseResult};
use crate::core::discovery::{self, DiscoveryConfig};
use crate::core::merge;
use crate::core::model::{Corpus, DiscoveredFile, FileResult, MergeSummary, SourceText};
use crate::platform::fs;
use crate::util::error::{LogMergeError, Result};
use rayon::prelude::*;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

/// Settings for one run.
#[derive(Debug, Clone, Default)]
pub struct PipelineOptions {
    pub discovery: DiscoveryConfig,
    pub parse: ParseConfig,
    /// 0 = rayon's global pool (one thread per core).
    pub worker_threads: usize,
    pub cancel_flag: Option<Arc<AtomicBool>>,
}

impl PipelineOptions {
    fn is_cancelled(&self) -> bool {
        self.cancel_flag
            .as_ref()
            .is_some_and(|f| f.load(Ordering::SeqCst))
    }
}

/// A merged corpus plus the statistics gathered while building it.
#[derive(Debug)]
pub struct PipelineOutput {
    pub corpus: Corpus,
    pub summary: MergeSummary,
}

/// Discover, aggregate and merge every log file under `root`.
pub fn run_directory(root: &Path, options: &PipelineOptions) -> Result<PipelineOutput> {
    let (files, warnings) = discovery::discover_files(root, &options.discovery)?;
    for warning in &warnings {
        tracing::warn!(warning = %warning, "Discovery warning");
    }

    tracing::info!(root = %root.display(), files = files.len(), "Input files discovered");

    let mut output = run_pool(options, || aggregate_discovered(&files, options))?;
    let mut all_warnings = warnings;
    all_warnings.append(&mut output.summary.warnings);
    output.summary.warnings = all_warnings;
    Ok(output)
}

/// Aggregate and merge in-memory sources, in the order given.
pub fn run_sources(sources: &[SourceText], options: &PipelineOptions) -> Result<PipelineOutput> {
    run_pool(options, || {
        let start = Instant::now();
        let outcomes: Vec<Option<ParseResult>> = sources
            .par_iter()
            .map(|source| {
                if options.is_cancelled() {
                    return None;
                }
                Some(aggregate::aggregate_file(
                    &source.source_id,
                    &source.content,
                    &options.parse,
                ))
            })
            .collect();
        finish(outcomes, Vec::new(), 0, options, start)
    })
}

/// Run `work` on a dedicated pool when a thread count is configured,
/// otherwise on rayon's global pool.
fn run_pool<F>(options: &PipelineOptions, work: F) -> Result<PipelineOutput>
where
    F: FnOnce() -> Result<PipelineOutput> + Send,
{
    if options.worker_threads == 0 {
        return work();
    }
    match rayon::ThreadPoolBuilder::new()
        .num_threads(options.worker_threads)
        .thread_name(|i| format!("logmerge-worker-{i}"))
        .build()
    {
        Ok(pool) => pool.install(work),
        Err(e) => {
            tracing::warn!(error = %e, "Cannot build worker pool; using the global pool");
            work()
        }
    }
}

/// Read and aggregate discovered files in parallel.
fn aggregate_discovered(
    files: &[DiscoveredFile],
    options: &PipelineOptions,
) -> Result<PipelineOutput> {
    let start = Instant::now();

    let outcomes: Vec<FileOutcome> = files
        .par_iter()
        .map(|file| {
            if options.is_cancelled() {
                return FileOutcome::Cancelled;
            }
            let content = match fs::read_file_content(&file.path, file.is_large) {
                Ok(c) => c,
                Err(e) => {
                    let msg = format!("Cannot read '{}': {e}", file.path.display());
                    tracing::warn!(warning = %msg, "File read failed");
                    return FileOutcome::Unreadable(msg);
                }
            };
            if options.is_cancelled() {
                return FileOutcome::Cancelled;
            }
            FileOutcome::Parsed(aggregate::aggregate_file(
                &file.source_id,
                &content,
                &options.parse,
            ))
        })
        .collect();

    let mut parsed = Vec::with_capacity(outcomes.len());
    let mut warnings = Vec::new();
    let mut files_failed = 0;
    for outcome in outcomes {
        match outcome {
            FileOutcome::Parsed(result) => parsed.push(Some(result)),
            FileOutcome::Unreadable(msg) => {
                files_failed += 1;
                warnings.push(msg);
            }
            FileOutcome::Cancelled => parsed.push(None),
        }
    }

    finish(parsed, warnings, files_failed, options, start)
}

enum FileOutcome {
    Parsed(ParseResult),
    Unreadable(String),
    Cancelled,
}

/// Join point: build summaries, then merge. `None` entries mark files
/// skipped because of cancellation.
fn finish(
    outcomes: Vec<Option<ParseResult>>,
    warnings: Vec<String>,
    files_failed: usize,
    options: &PipelineOptions,
    start: Instant,
) -> Result<PipelineOutput> {
    if options.is_cancelled() || outcomes.iter().any(Option::is_none) {
        tracing::info!("Run cancelled before merge");
        return Err(LogMergeError::Cancelled);
    }

    let mut summary = MergeSummary {
        files_processed: outcomes.len() + files_failed,
        files_failed,
        warnings,
        ..MergeSummary::default()
    };

    let mut file_results = Vec::with_capacity(outcomes.len());
    for result in outcomes.into_iter().flatten() {
        for err in &result.errors {
            tracing::debug!(error = %err, "Parse error");
        }
        if result.summary.record_count > 0 {
            summary.files_with_records += 1;
        }
        summary.total_malformed += result.summary.malformed_count();
        file_results.push(FileResult {
            source_id: result.summary.source_id.clone(),
            records: result.records,
        });
        summary.file_summaries.push(result.summary);
    }

    let corpus = merge::merge(file_results)?;

    summary.total_records = corpus.len();
    summary.duration = start.elapsed();

    tracing::info!(
        files = summary.files_processed,
        records = summary.total_records,
        malformed = summary.total_malformed,
        failed = summary.files_failed,
        elapsed_ms = summary.duration.as_millis() as u64,
        "Merge complete"
    );

    Ok(PipelineOutput { corpus, summary })
}
