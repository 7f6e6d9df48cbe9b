//! # scamlink ingest (`ingest`)
//!
//! Loads victim and official report collections from headered CSV files.
//!
//! Parsing is deliberately forgiving, since report exports are hand edited:
//! - rows may be shorter or longer than the header; missing cells become
//!   empty strings and surplus cells are dropped;
//! - every header and cell is trimmed of surrounding whitespace;
//! - columns outside the report schema are kept on the [`RawRecord`] but play
//!   no part in normalization;
//! - blank lines are skipped and do not consume a row position.
//!
//! Every loaded row carries its zero-based position, which later identifies
//! it in match output (`"Victim 3"`).
//!
//! ```rust
//! use canonical::Field;
//! use ingest::read_raw_records;
//!
//! let csv = "phones, emails\n+91 98765 43210, a@b.example\n";
//! let rows = read_raw_records(csv.as_bytes(), "inline").unwrap();
//! assert_eq!(rows[0].get(Field::Emails), Some("a@b.example"));
//! assert_eq!(rows[0].get(Field::Websites), Some(""));
//! ```

mod error;

use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::time::Instant;

use canonical::{normalize_collection, NormalizeConfig, NormalizedRecord, RawRecord};
use tracing::{debug, info, warn, Level};

pub use crate::error::IngestError;

/// Read raw rows from any CSV source. `source` names the input in logs and
/// errors.
pub fn read_raw_records<R: Read>(reader: R, source: &str) -> Result<Vec<RawRecord>, IngestError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = csv_reader.headers()?.clone();
    if headers.iter().all(str::is_empty) {
        return Err(IngestError::MissingHeader(source.to_string()));
    }

    let mut rows = Vec::new();
    let mut padded_rows = 0usize;
    for (position, result) in csv_reader.records().enumerate() {
        let record = result?;
        let mut raw = RawRecord::new(position);
        for (name, value) in headers.iter().zip(record.iter()) {
            if name.is_empty() {
                continue;
            }
            // First occurrence of a duplicated header wins.
            raw.fields
                .entry(name.to_string())
                .or_insert_with(|| value.to_string());
        }
        if raw.ensure_all_fields() > 0 && record.len() < headers.len() {
            padded_rows += 1;
        }
        rows.push(raw);
    }

    if padded_rows > 0 {
        debug!(source, padded_rows, "ingest_short_rows");
    }
    Ok(rows)
}

/// Read raw rows from a CSV file.
pub fn load_raw_records(path: impl AsRef<Path>) -> Result<Vec<RawRecord>, IngestError> {
    let path = path.as_ref();
    let file = File::open(path)?;
    read_raw_records(file, &path.display().to_string())
}

/// Load and normalize a collection, labelling every record with `label`.
pub fn load_collection(
    path: impl AsRef<Path>,
    label: &str,
    cfg: &NormalizeConfig,
) -> Result<Vec<NormalizedRecord>, IngestError> {
    let path = path.as_ref();
    let span = tracing::span!(
        Level::INFO,
        "ingest.load_collection",
        label,
        path = %path.display()
    );
    let _guard = span.enter();
    let start = Instant::now();

    match load_raw_records(path) {
        Ok(raws) => {
            let records = normalize_collection(&raws, label, cfg);
            let elapsed_micros = start.elapsed().as_micros();
            info!(rows = records.len(), elapsed_micros, "ingest_success");
            Ok(records)
        }
        Err(err) => {
            let elapsed_micros = start.elapsed().as_micros();
            warn!(error = %err, elapsed_micros, "ingest_failure");
            Err(err)
        }
    }
}
