// LogMerge - core/merge.rs
//
// Corpus assembly: concatenate per-file results in enumeration order, then
// stable-sort by timestamp. Equal timestamps keep their concatenated order
// (file first, then line), which is the only tie-break.

use crate::core::model::{Corpus, FileResult};
use crate::util::error::MergeError;

/// Merge per-file results into one chronologically ordered corpus.
///
/// Fails with `EmptyCorpus` when no file contributed a record.
pub fn merge(file_results: Vec<FileResult>) -> Result<Corpus, MergeError> {
    let files = file_results.len();
    let total: usize = file_results.iter().map(|f| f.records.len()).sum();

    if total == 0 {
        return Err(MergeError::EmptyCorpus { files });
    }

    let mut records = Vec::with_capacity(total);
    for file in file_results {
        records.extend(file.records);
    }

    // `sort_by_key` is a stable sort.
    records.sort_by_key(|r| r.timestamp);

    tracing::debug!(files, records = records.len(), "Corpus merged");

    Ok(Corpus::from_sorted(records))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::model::NormalizedRecord;
    use chrono::NaiveDateTime;

    fn record(ts: &str, url: &str) -> NormalizedRecord {
        NormalizedRecord {
            service_id: None,
            vno: None,
            ano: None,
            rt_area: None,
            url: url.to_string(),
            status_code: "200".to_string(),
            response_time_ms: Some(1.0),
            app_version: None,
            timestamp: NaiveDateTime::parse_from_str(ts, "%Y-%m-%d %H:%M:%S").unwrap(),
        }
    }

    fn file(id: &str, records: Vec<NormalizedRecord>) -> FileResult {
        FileResult {
            source_id: id.to_string(),
            records,
        }
    }

    fn urls(corpus: &Corpus) -> Vec<&str> {
        corpus.records().iter().map(|r| r.url.as_str()).collect()
    }

    #[test]
    fn test_merge_sorts_by_timestamp() {
        let corpus = merge(vec![
            file("a", vec![record("2025-01-01 00:00:00", "/a1")]),
            file("b", vec![record("2024-12-31 23:00:00", "/b1")]),
        ])
        .unwrap();
        assert_eq!(urls(&corpus), ["/b1", "/a1"]);
    }

    #[test]
    fn test_equal_timestamps_keep_file_order() {
        let ts = "2025-01-01 12:00:00";
        let corpus = merge(vec![
            file("a", vec![record(ts, "/a")]),
            file("b", vec![record(ts, "/b")]),
        ])
        .unwrap();
        assert_eq!(urls(&corpus), ["/a", "/b"]);

        let reversed = merge(vec![
            file("b", vec![record(ts, "/b")]),
            file("a", vec![record(ts, "/a")]),
        ])
        .unwrap();
        assert_eq!(urls(&reversed), ["/b", "/a"]);
    }

    #[test]
    fn test_equal_timestamps_keep_line_order_within_file() {
        let ts = "2025-01-01 12:00:00";
        let corpus = merge(vec![
            file(
                "a",
                vec![
                    record(ts, "/a1"),
                    record("2025-01-01 11:00:00", "/a0"),
                    record(ts, "/a2"),
                ],
            ),
            file("b", vec![record(ts, "/b1")]),
        ])
        .unwrap();
        assert_eq!(urls(&corpus), ["/a0", "/a1", "/a2", "/b1"]);
    }

    #[test]
    fn test_empty_files_are_skipped_when_others_have_records() {
        let corpus = merge(vec![
            file("empty", Vec::new()),
            file("a", vec![record("2025-01-01 00:00:00", "/a")]),
        ])
        .unwrap();
        assert_eq!(corpus.len(), 1);
    }

    #[test]
    fn test_all_empty_is_empty_corpus_error() {
        let result = merge(vec![file("a", Vec::new()), file("b", Vec::new())]);
        assert_eq!(result, Err(MergeError::EmptyCorpus { files: 2 }));
    }

    #[test]
    fn test_no_files_is_empty_corpus_error() {
        assert_eq!(merge(Vec::new()), Err(MergeError::EmptyCorpus { files: 0 }));
    }
}
