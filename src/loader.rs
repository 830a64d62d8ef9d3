use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::models::Table;

#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to read input: {0}")]
    Read(#[from] std::io::Error),
    #[error("malformed CSV: {0}")]
    Csv(#[from] csv::Error),
    #[error("file is not valid UTF-8")]
    Encoding,
    #[error("no header row found after skipping {0} preamble lines")]
    MissingHeader(usize),
}

pub fn load_path(path: &Path, preamble_lines: usize) -> Result<Table, LoadError> {
    let file = std::fs::File::open(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let table = load_reader(file, preamble_lines)?;
    info!(
        path = %path.display(),
        rows = table.len(),
        columns = table.headers().len(),
        "loaded admissions export"
    );
    Ok(table)
}

/// Reads an export whose first `preamble_lines` lines are free text; the next
/// line is the header row. Header names are trimmed.
pub fn load_reader<R: Read>(mut reader: R, preamble_lines: usize) -> Result<Table, LoadError> {
    let mut bytes = Vec::new();
    reader.read_to_end(&mut bytes)?;
    let content = String::from_utf8(bytes).map_err(|_| LoadError::Encoding)?;
    let content = content.strip_prefix('\u{feff}').unwrap_or(&content);

    let body = skip_lines(content, preamble_lines);
    if body.trim().is_empty() {
        return Err(LoadError::MissingHeader(preamble_lines));
    }

    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(body.as_bytes());

    let headers: Vec<String> = csv_reader
        .headers()?
        .iter()
        .map(|header| header.trim().to_string())
        .collect();
    if headers.iter().all(|header| header.is_empty()) {
        return Err(LoadError::MissingHeader(preamble_lines));
    }

    let mut rows = Vec::new();
    for result in csv_reader.records() {
        let record = result?;
        rows.push(record.iter().map(str::to_string).collect());
    }
    debug!(rows = rows.len(), "parsed CSV body");

    Ok(Table::new(headers, rows))
}

fn skip_lines(content: &str, count: usize) -> &str {
    let mut rest = content;
    for _ in 0..count {
        match rest.find('\n') {
            Some(pos) => rest = &rest[pos + 1..],
            None => return "",
        }
    }
    rest
}

/// Writes the table back out as plain CSV: header row, then data rows.
pub fn export_writer<W: Write>(table: &Table, writer: W) -> Result<(), csv::Error> {
    let mut writer = csv::Writer::from_writer(writer);
    writer.write_record(table.headers())?;
    for row in table.rows() {
        writer.write_record(row)?;
    }
    writer.flush()?;
    Ok(())
}

pub fn export_path(table: &Table, path: &Path) -> anyhow::Result<()> {
    let file = std::fs::File::create(path)?;
    export_writer(table, file)?;
    info!(path = %path.display(), rows = table.len(), "exported filtered table");
    Ok(())
}
