// LogMerge - tests/e2e_pipeline.rs
//
// End-to-end tests for discovery, aggregation, merge and export.
//
// These run against real fixture files on disk with real walkdir traversal,
// real chrono timestamp conversion and the real csv writer.

use logmerge::app::pipeline::{run_directory, run_sources, PipelineOptions};
use logmerge::core::aggregate::ParseConfig;
use logmerge::core::export::{write_table, ExportFormat};
use logmerge::core::model::SourceText;
use logmerge::core::timestamp::{self, TimestampConfig};
use logmerge::platform::config::load_config;
use logmerge::util::error::{DiscoveryError, LogMergeError, MergeError};
use std::fs;
use std::path::PathBuf;

// =============================================================================
// Helpers
// =============================================================================

fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
}

fn options_with(timestamps: TimestampConfig) -> PipelineOptions {
    PipelineOptions {
        parse: ParseConfig {
            timestamps,
            ..ParseConfig::default()
        },
        ..PipelineOptions::default()
    }
}

// =============================================================================
// Directory runs
// =============================================================================

/// The fixture directory holds one .txt, one .log and one .md file. Only the
/// first two are read, and their records interleave by canonical time.
#[test]
fn e2e_fixture_directory_merges_by_canonical_time() {
    let output = run_directory(&fixtures_dir(), &PipelineOptions::default()).unwrap();

    let rows: Vec<(&str, String)> = output
        .corpus
        .records()
        .iter()
        .map(|r| {
            (
                r.url.as_str(),
                r.timestamp.format("%Y-%m-%d %H:%M:%S").to_string(),
            )
        })
        .collect();

    assert_eq!(
        rows,
        [
            ("/api/login", "2025-01-01 04:30:00".to_string()),
            ("/api/home", "2025-01-01 05:30:00".to_string()),
            ("/api/cart", "2025-01-01 12:34:56".to_string()),
        ]
    );

    let summary = &output.summary;
    assert_eq!(summary.files_processed, 2);
    assert_eq!(summary.files_with_records, 2);
    assert_eq!(summary.total_records, 3);
    // One rejected line in access_a.log, one bad timestamp in access_b.txt.
    assert_eq!(summary.total_malformed, 2);
    assert_eq!(summary.file_summaries[0].source_id, "access_b.txt");
    assert_eq!(summary.file_summaries[1].source_id, "access_a.log");
    assert_eq!(summary.file_summaries[1].rejected_lines, 1);
    assert_eq!(summary.file_summaries[0].unresolved_timestamps, 1);
}

/// Non-success statuses keep the row but drop the response time.
#[test]
fn e2e_response_time_only_for_success() {
    let output = run_directory(&fixtures_dir(), &PipelineOptions::default()).unwrap();
    let records = output.corpus.records();
    assert_eq!(records[0].response_time_ms, Some(87.5));
    assert_eq!(records[1].response_time_ms, Some(152.0));
    assert_eq!(records[2].status_code, "500");
    assert_eq!(records[2].response_time_ms, None);
}

/// Writing the merged corpus produces the fixed header and one row per record.
#[test]
fn e2e_csv_export_matches_expected_table() {
    let output = run_directory(&fixtures_dir(), &PipelineOptions::default()).unwrap();
    let out_dir = tempfile::tempdir().unwrap();
    let out_path = out_dir.path().join("merged_sorted.csv");

    let rows = write_table(output.corpus.records(), &out_path, ExportFormat::Csv).unwrap();
    assert_eq!(rows, 3);

    let text = fs::read_to_string(&out_path).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(
        lines,
        [
            "Service Id,Vno,Ano,Rt Area,URL,Stayed Time,App Version,Timestamp",
            "S-200,V9,A3,south,/api/login,87.5,4.1.9,2025-01-01 04:30:00",
            "S-100,V7,A1,north,/api/home,152.0,4.2.0,2025-01-01 05:30:00",
            "S-101,V7,A2,north,/api/cart,,4.2.0,2025-01-01 12:34:56",
        ]
    );
}

#[test]
fn e2e_json_export_uses_column_labels() {
    let output = run_directory(&fixtures_dir(), &PipelineOptions::default()).unwrap();
    let out_dir = tempfile::tempdir().unwrap();
    let out_path = out_dir.path().join("merged_sorted.json");

    write_table(output.corpus.records(), &out_path, ExportFormat::Json).unwrap();

    let value: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&out_path).unwrap()).unwrap();
    let rows = value.as_array().unwrap();
    assert_eq!(rows.len(), 3);
    assert_eq!(rows[0]["Service Id"], "S-200");
    assert_eq!(rows[0]["Timestamp"], "2025-01-01 04:30:00");
    assert!(rows[2]["Stayed Time"].is_null());
}

/// Timestamps already in local time pass through unchanged.
#[test]
fn e2e_source_local_timestamps_are_not_shifted() {
    let options = options_with(TimestampConfig {
        assume_source_is_utc: false,
        ..TimestampConfig::default()
    });
    let output = run_directory(&fixtures_dir(), &options).unwrap();
    let first = &output.corpus.records()[0];
    assert_eq!(first.url, "/api/login");
    assert_eq!(
        first.timestamp.format("%Y-%m-%d %H:%M:%S").to_string(),
        "2024-12-31 23:00:00"
    );
}

#[test]
fn e2e_directory_without_log_files_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("readme.md"), "nothing here").unwrap();

    let err = run_directory(dir.path(), &PipelineOptions::default()).unwrap_err();
    assert!(
        matches!(
            err,
            LogMergeError::Discovery(DiscoveryError::NoLogFiles { .. })
        ),
        "expected NoLogFiles, got {err:?}"
    );
}

#[test]
fn e2e_directory_of_only_malformed_lines_is_empty_corpus() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("a.log"), "garbage\n\nmore garbage\n").unwrap();
    fs::write(dir.path().join("b.txt"), "[bad] line\n").unwrap();

    let err = run_directory(dir.path(), &PipelineOptions::default()).unwrap_err();
    assert!(matches!(
        err,
        LogMergeError::Merge(MergeError::EmptyCorpus { files: 2 })
    ));
}

// =============================================================================
// In-memory sources
// =============================================================================

/// A file-1 record at midnight sorts after a file-2 record from the previous
/// hour; file-1's malformed line only adds to the count.
#[test]
fn e2e_in_memory_sources_interleave() {
    let file1 = "[2025-01-01 00:00:00 - INFO] [t0 t1 /a 200 10] {\"sid\":\"S1\"}\n\
                 not a log line";
    let file2 = "[2024-12-31 23:00:00 - INFO] [t0 t1 /b 200 20] {\"sid\":\"S2\"}";
    let sources = vec![SourceText::new("file1", file1), SourceText::new("file2", file2)];

    let output = run_sources(&sources, &PipelineOptions::default()).unwrap();
    let ids: Vec<_> = output
        .corpus
        .records()
        .iter()
        .map(|r| r.service_id.as_deref().unwrap_or(""))
        .collect();
    assert_eq!(ids, ["S2", "S1"]);
    assert_eq!(output.summary.total_malformed, 1);
}

/// 07:04:56 UTC is 12:34:56 at +05:30, and the CSV carries it verbatim.
#[test]
fn e2e_round_trip_to_canonical_zone() {
    let line = "[2025-03-10 07:04:56 - INFO] [t0 t1 /x 200 5] {\"sid\":\"S1\"}";
    let output = run_sources(&[SourceText::new("f", line)], &PipelineOptions::default()).unwrap();

    let mut buf = Vec::new();
    logmerge::core::export::export_csv(
        output.corpus.records(),
        &mut buf,
        std::path::Path::new("memory.csv"),
    )
    .unwrap();
    let text = String::from_utf8(buf).unwrap();
    assert!(
        text.lines()
            .nth(1)
            .is_some_and(|row| row.ends_with("2025-03-10 12:34:56")),
        "unexpected CSV: {text}"
    );
}

// =============================================================================
// Config-driven runs
// =============================================================================

/// A config.toml on disk changes zone and input format for the whole run.
#[test]
fn e2e_config_file_drives_timestamp_settings() {
    let dir = tempfile::tempdir().unwrap();
    let config_path = dir.path().join("config.toml");
    fs::write(
        &config_path,
        "[timestamps]\ncanonical_timezone = \"UTC\"\ninput_format = \"%d/%m/%Y %H:%M:%S\"\n",
    )
    .unwrap();

    let (config, warnings) = load_config(&config_path);
    assert!(warnings.is_empty(), "unexpected warnings: {warnings:?}");
    assert_eq!(timestamp::format_zone(&config.canonical_zone), "+00:00");

    let line = "[10/03/2025 07:04:56 - INFO] [t0 t1 /x 200 5] {}";
    let options = PipelineOptions {
        parse: config.parse_config(),
        ..PipelineOptions::default()
    };
    let output = run_sources(&[SourceText::new("f", line)], &options).unwrap();
    assert_eq!(
        output.corpus.records()[0]
            .timestamp
            .format("%Y-%m-%d %H:%M:%S")
            .to_string(),
        "2025-03-10 07:04:56"
    );
}
