// LogMerge - core/export.rs
//
// CSV and JSON export of the merged corpus.
// Core layer: writes to any Write trait object; `write_table` is the only
// function that opens a file.

use crate::core::model::NormalizedRecord;
use crate::util::constants::{OUTPUT_HEADERS, OUTPUT_TIMESTAMP_FORMAT};
use crate::util::error::ExportError;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Output encodings for the merged table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExportFormat {
    #[default]
    Csv,
    Json,
}

impl ExportFormat {
    /// Parse a user-supplied format name (case-insensitive).
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "csv" => Some(Self::Csv),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

/// Write `records` to `path` in the given format, replacing any existing
/// file. Returns the number of rows written.
pub fn write_table(
    records: &[NormalizedRecord],
    path: &Path,
    format: ExportFormat,
) -> Result<usize, ExportError> {
    let file = File::create(path).map_err(|e| ExportError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;
    let writer = BufWriter::new(file);

    let count = match format {
        ExportFormat::Csv => export_csv(records, writer, path)?,
        ExportFormat::Json => export_json(records, writer, path)?,
    };

    tracing::info!(path = %path.display(), rows = count, ?format, "Table written");
    Ok(count)
}

/// Export records to CSV.
///
/// Writes: Service Id, Vno, Ano, Rt Area, URL, Stayed Time, App Version, Timestamp
pub fn export_csv<W: Write>(
    records: &[NormalizedRecord],
    writer: W,
    export_path: &Path,
) -> Result<usize, ExportError> {
    let csv_err = |e: csv::Error| ExportError::Csv {
        path: export_path.to_path_buf(),
        source: e,
    };
    let mut csv_writer = csv::Writer::from_writer(writer);

    csv_writer.write_record(OUTPUT_HEADERS).map_err(csv_err)?;

    let mut count = 0;
    for record in records {
        let stayed = record
            .response_time_ms
            .map(format_stayed_time)
            .unwrap_or_default();
        let ts = record.timestamp.format(OUTPUT_TIMESTAMP_FORMAT).to_string();

        csv_writer
            .write_record([
                record.service_id.as_deref().unwrap_or(""),
                record.vno.as_deref().unwrap_or(""),
                record.ano.as_deref().unwrap_or(""),
                record.rt_area.as_deref().unwrap_or(""),
                record.url.as_str(),
                stayed.as_str(),
                record.app_version.as_deref().unwrap_or(""),
                ts.as_str(),
            ])
            .map_err(csv_err)?;
        count += 1;
    }

    csv_writer.flush().map_err(|e| ExportError::Io {
        path: export_path.to_path_buf(),
        source: e,
    })?;

    Ok(count)
}

/// Export records to JSON (array of objects keyed by the column labels).
pub fn export_json<W: Write>(
    records: &[NormalizedRecord],
    mut writer: W,
    export_path: &Path,
) -> Result<usize, ExportError> {
    serde_json::to_writer_pretty(&mut writer, records).map_err(|e| ExportError::Json {
        path: export_path.to_path_buf(),
        source: e,
    })?;
    writer.flush().map_err(|e| ExportError::Io {
        path: export_path.to_path_buf(),
        source: e,
    })?;
    Ok(records.len())
}

/// Integral values keep one decimal place (`152.0`) so the column reads as
/// a float throughout.
fn format_stayed_time(ms: f64) -> String {
    if ms.is_finite() && ms.fract() == 0.0 {
        format!("{ms:.1}")
    } else {
        ms.to_string()
    }
}
