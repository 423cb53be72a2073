//! CSV output for parsed transcripts and column input for synthesis.
//!
//! Tables have an `index` column holding the prompt key followed by one or
//! more value columns, one per language.

use std::fs::{File, OpenOptions};
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

use crate::transcript::SoundTable;

/// Header of the key column.
pub const INDEX_HEADER: &str = "index";

/// Value column label used when the caller does not pick one.
pub const DEFAULT_LABEL: &str = "english";

#[derive(thiserror::Error, Debug)]
pub enum TableError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("Refusing to overwrite existing output {}", .0.display())]
    AlreadyExists(PathBuf),
    #[error("Column '{0}' not found in header (the index column cannot be selected)")]
    ColumnNotFound(String),
}

/// Serialize `table` as CSV with the header `index,<label>`.
pub fn write_table<W: Write>(writer: W, label: &str, table: &SoundTable) -> Result<(), TableError> {
    let mut csv = csv::Writer::from_writer(writer);
    csv.write_record([INDEX_HEADER, label])?;
    for (key, value) in table.iter() {
        csv.write_record([key, value])?;
    }
    csv.flush()?;
    Ok(())
}

/// Write `table` to a new file at `path`.
///
/// Fails with [`TableError::AlreadyExists`] if the file is already there.
pub fn write_table_file(path: &Path, label: &str, table: &SoundTable) -> Result<(), TableError> {
    let file = OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(path)
        .map_err(|e| {
            if e.kind() == io::ErrorKind::AlreadyExists {
                TableError::AlreadyExists(path.to_path_buf())
            } else {
                TableError::Io(e)
            }
        })?;

    write_table(file, label, table)?;
    log::info!("Wrote {} rows to {}", table.len(), path.display());
    Ok(())
}

/// One row of the selected column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    pub index: String,
    pub message: String,
}

/// Iterates `(index, message)` rows of a single value column.
pub struct ColumnReader<R> {
    records: csv::StringRecordsIntoIter<R>,
    column: usize,
    label: String,
}

impl ColumnReader<File> {
    /// Open a CSV file and select the column whose trimmed header equals `column`.
    pub fn open(path: &Path, column: &str) -> Result<Self, TableError> {
        Self::from_reader(File::open(path)?, column)
    }
}

impl<R: Read> ColumnReader<R> {
    pub fn from_reader(reader: R, column: &str) -> Result<Self, TableError> {
        let mut csv = csv::ReaderBuilder::new().has_headers(true).from_reader(reader);

        let (index, label) = csv
            .headers()?
            .iter()
            .enumerate()
            .skip(1)
            .find(|(_, header)| header.trim() == column)
            .map(|(i, header)| (i, header.to_string()))
            .ok_or_else(|| TableError::ColumnNotFound(column.to_string()))?;

        log::debug!("Selected column {index} ('{label}')");

        Ok(Self {
            records: csv.into_records(),
            column: index,
            label,
        })
    }

    /// Header text of the selected column, as written in the file.
    pub fn label(&self) -> &str {
        &self.label
    }
}

impl<R: Read> Iterator for ColumnReader<R> {
    type Item = Result<Row, TableError>;

    fn next(&mut self) -> Option<Self::Item> {
        let record = match self.records.next()? {
            Ok(record) => record,
            Err(e) => return Some(Err(e.into())),
        };

        // The reader is not flexible, so every record is as wide as the header.
        Some(Ok(Row {
            index: record[0].to_string(),
            message: record[self.column].to_string(),
        }))
    }
}
