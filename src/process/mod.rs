// src/process/mod.rs
use anyhow::{Context, Result};
use csv::ReaderBuilder;
use std::io::Read;
use tracing::{debug, trace};

use crate::schema::{Dataset, Record};

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Parse CSV bytes (UTF-8, optional BOM) into a [`Dataset`].
pub fn parse_csv_bytes(data: &[u8]) -> Result<Dataset> {
    let data = data.strip_prefix(UTF8_BOM).unwrap_or(data);
    parse_csv(data)
}

/// Parse CSV text: the first record is the header row, every following
/// non-empty record becomes a [`Record`].
///
/// - short rows leave their trailing headers absent
/// - cells beyond the header row are ignored
/// - a repeated header keeps the value of its first column
/// - empty input gives zero headers and zero rows
pub fn parse_csv<R: Read>(reader: R) -> Result<Dataset> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true) // spreadsheet exports drop trailing empty cells
        .from_reader(reader);

    let mut records = rdr.records();
    let headers: Vec<String> = match records.next() {
        Some(first) => first
            .context("CSV parse error in header row")?
            .iter()
            .map(str::to_string)
            .collect(),
        None => {
            debug!("empty CSV");
            return Ok(Dataset::default());
        }
    };

    let mut rows = Vec::new();
    for (idx, result) in records.enumerate() {
        // +2: one-based, after the header row
        let record = result.with_context(|| format!("CSV parse error at line {}", idx + 2))?;
        if record.len() > headers.len() {
            trace!(
                line = idx + 2,
                extra = record.len() - headers.len(),
                "ignoring cells past the header row"
            );
        }
        rows.push(Record::from_pairs(
            headers.iter().map(String::as_str).zip(record.iter()),
        ));
    }

    debug!(headers = headers.len(), rows = rows.len(), "parsed CSV");
    Ok(Dataset::new(headers, rows))
}
