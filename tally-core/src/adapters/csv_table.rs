//! CSV decoding into a `Table`

use std::io::Read;
use std::path::Path;

use crate::domain::result::{Error, Result};
use crate::domain::Table;

/// Decode delimited text with a header row.
///
/// Rows shorter than the header are kept (missing cells read as empty);
/// rows longer than the header make the whole input malformed.
pub fn read_table<R: Read>(input: R) -> Result<Table> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(input);

    let headers: Vec<String> = reader.headers()?.iter().map(|h| h.to_string()).collect();
    if headers.is_empty() || (headers.len() == 1 && headers[0].is_empty()) {
        return Err(Error::decode("No columns to parse from file"));
    }

    let mut rows = Vec::new();
    for (i, result) in reader.records().enumerate() {
        let record = result?;
        if record.len() > headers.len() {
            // Header is line 1
            return Err(Error::decode(format!(
                "Expected {} fields in line {}, saw {}",
                headers.len(),
                record.position().map(|p| p.line()).unwrap_or(i as u64 + 2),
                record.len()
            )));
        }
        rows.push(record.iter().map(|c| c.to_string()).collect());
    }

    Ok(Table::new(headers, rows))
}

/// Decode an in-memory upload
pub fn read_table_bytes(bytes: &[u8]) -> Result<Table> {
    read_table(bytes)
}

/// Decode a file on disk
pub fn read_table_path(path: &Path) -> Result<Table> {
    let file = std::fs::File::open(path)?;
    read_table(std::io::BufReader::new(file))
}
