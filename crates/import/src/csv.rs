use std::fs::File;
use std::io::Read;
use std::path::Path;
use taxport_core::RawRow;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CsvError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),
    #[error("No data rows")]
    NoDataRows,
}

/// Reads a CSV export with a header row into raw rows keyed by header.
///
/// Cells are kept verbatim. A record shorter than the header leaves the
/// trailing fields absent; extra cells past the header are dropped.
pub fn read_rows<R: Read>(data: R) -> Result<Vec<RawRow>, CsvError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(data);

    let headers = reader.headers()?.clone();
    let mut rows = Vec::new();

    for result in reader.records() {
        let record = result?;

        if record.is_empty() {
            continue;
        }

        let mut row = RawRow::new();
        for (i, header) in headers.iter().enumerate() {
            row.insert(header, record.get(i).map(str::to_string));
        }
        rows.push(row);
    }

    if rows.is_empty() {
        return Err(CsvError::NoDataRows);
    }

    tracing::debug!(rows = rows.len(), columns = headers.len(), "Read CSV rows");
    Ok(rows)
}

pub fn read_path(path: &Path) -> Result<Vec<RawRow>, CsvError> {
    read_rows(File::open(path)?)
}
