//! Append-only customer stores keyed by RUT.
//!
//! The header row is written once, with the first record, and never changed
//! afterwards. `exists` followed by `append` is not atomic: two writers
//! sharing a file could both insert the same RUT.

mod csv;
mod xlsx;

pub use self::csv::CsvStore;
pub use self::xlsx::XlsxStore;

use std::path::Path;

use crate::error::StoreError;
use crate::models::customer::{CustomerRecord, Field};

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;

/// Trait for persistent customer sheets.
pub trait RecordStore {
    /// Location of the backing file.
    fn path(&self) -> &Path;

    /// Whether a row with this RUT is already stored.
    ///
    /// Returns `false` when the file does not exist yet, has no `RUT` column,
    /// or cannot be read.
    fn exists(&self, tax_id: &str) -> bool;

    /// Append a record, creating the file and its header row if needed.
    fn append(&mut self, record: &CustomerRecord) -> Result<()>;

    /// All rows, header included, as text. Empty when the file is missing.
    fn rows(&self) -> Result<Vec<Vec<String>>>;

    /// Number of data rows.
    fn len(&self) -> Result<usize> {
        Ok(self.rows()?.len().saturating_sub(1))
    }
}

impl<S: RecordStore + ?Sized> RecordStore for Box<S> {
    fn path(&self) -> &Path {
        (**self).path()
    }

    fn exists(&self, tax_id: &str) -> bool {
        (**self).exists(tax_id)
    }

    fn append(&mut self, record: &CustomerRecord) -> Result<()> {
        (**self).append(record)
    }

    fn rows(&self) -> Result<Vec<Vec<String>>> {
        (**self).rows()
    }
}

/// Index of the column whose header is exactly `RUT`.
fn tax_id_column<'a>(header: impl IntoIterator<Item = &'a str>) -> Option<usize> {
    let key = Field::TaxId.header();
    header.into_iter().position(|h| h == key)
}
