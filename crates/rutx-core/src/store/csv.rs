//! CSV store.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use csv::{ReaderBuilder, WriterBuilder};
use tracing::{debug, warn};

use super::{tax_id_column, RecordStore, Result};
use crate::error::StoreError;
use crate::models::customer::CustomerRecord;

/// Customer sheet stored as a UTF-8 CSV file, one record per line.
pub struct CsvStore {
    path: PathBuf,
}

impl CsvStore {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    fn read_rows(&self) -> Result<Vec<Vec<String>>> {
        let mut reader = ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_path(&self.path)
            .map_err(|e| self.open_error(e))?;

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record.map_err(|e| self.open_error(e))?;
            rows.push(record.iter().map(str::to_string).collect());
        }
        Ok(rows)
    }

    fn is_blank(rows: &[Vec<String>]) -> bool {
        rows.len() <= 1 && rows.iter().flatten().all(|cell| cell.trim().is_empty())
    }

    /// Write the header and one record, replacing whatever the file held.
    fn create(&self, record: &CustomerRecord) -> Result<()> {
        let mut writer = WriterBuilder::new()
            .from_path(&self.path)
            .map_err(|e| self.save_error(e))?;

        writer
            .write_record(CustomerRecord::headers())
            .map_err(|e| self.save_error(e))?;
        writer
            .write_record(record_cells(record))
            .map_err(|e| self.save_error(e))?;
        writer.flush().map_err(|e| self.save_error(e))
    }

    fn append_line(&self, record: &CustomerRecord) -> Result<()> {
        let needs_newline = !fs::read(&self.path)
            .map_err(|e| self.open_error(e))?
            .ends_with(b"\n");

        let mut file = OpenOptions::new()
            .append(true)
            .open(&self.path)
            .map_err(|e| self.open_error(e))?;
        if needs_newline {
            file.write_all(b"\n").map_err(|e| self.save_error(e))?;
        }

        let mut writer = WriterBuilder::new().from_writer(file);
        writer
            .write_record(record_cells(record))
            .map_err(|e| self.save_error(e))?;
        writer.flush().map_err(|e| self.save_error(e))
    }

    fn open_error(&self, e: impl std::fmt::Display) -> StoreError {
        StoreError::Open {
            path: self.path.clone(),
            reason: e.to_string(),
        }
    }

    fn save_error(&self, e: impl std::fmt::Display) -> StoreError {
        StoreError::Save {
            path: self.path.clone(),
            reason: e.to_string(),
        }
    }
}

impl RecordStore for CsvStore {
    fn path(&self) -> &Path {
        &self.path
    }

    fn exists(&self, tax_id: &str) -> bool {
        if !self.path.exists() {
            return false;
        }

        let rows = match self.read_rows() {
            Ok(rows) => rows,
            Err(e) => {
                warn!("Could not check for duplicates, continuing: {}", e);
                return false;
            }
        };

        let Some(header) = rows.first() else {
            return false;
        };
        let Some(column) = tax_id_column(header.iter().map(String::as_str)) else {
            debug!("No RUT column in header");
            return false;
        };

        rows.iter()
            .skip(1)
            .any(|row| row.get(column).is_some_and(|cell| cell == tax_id))
    }

    fn append(&mut self, record: &CustomerRecord) -> Result<()> {
        if !self.path.exists() || Self::is_blank(&self.read_rows()?) {
            debug!("Writing header to {}", self.path.display());
            return self.create(record);
        }

        self.append_line(record)
    }

    fn rows(&self) -> Result<Vec<Vec<String>>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        self.read_rows()
    }
}

fn record_cells(record: &CustomerRecord) -> [&str; 8] {
    record.to_row().map(|v| v.unwrap_or_default())
}
