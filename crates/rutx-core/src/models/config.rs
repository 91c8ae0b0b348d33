//! Configuration structures for the extraction pipeline.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Result, RutxError};
use crate::store::{CsvStore, RecordStore, XlsxStore};

/// Main configuration for rutx.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RutxConfig {
    /// Record store configuration.
    pub store: StoreConfig,

    /// PDF/text source configuration.
    pub pdf: PdfConfig,

    /// Customer extraction configuration.
    pub extraction: ExtractionConfig,
}

/// On-disk format of the customer sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StoreFormat {
    /// Pick by file extension (`.csv` is CSV, anything else XLSX).
    #[default]
    Auto,
    /// Excel workbook.
    Xlsx,
    /// Comma-separated values.
    Csv,
}

/// Record store configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Path of the customer sheet.
    pub path: PathBuf,

    /// File format.
    pub format: StoreFormat,

    /// Worksheet name used when a new workbook is created.
    pub sheet_name: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("clientes.xlsx"),
            format: StoreFormat::Auto,
            sheet_name: "Clientes".to_string(),
        }
    }
}

impl StoreConfig {
    /// Resolve `Auto` against the configured path.
    pub fn resolved_format(&self) -> StoreFormat {
        match self.format {
            StoreFormat::Auto => {
                let is_csv = self
                    .path
                    .extension()
                    .and_then(|e| e.to_str())
                    .is_some_and(|e| e.eq_ignore_ascii_case("csv"));
                if is_csv { StoreFormat::Csv } else { StoreFormat::Xlsx }
            }
            other => other,
        }
    }
}

/// PDF/text source configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PdfConfig {
    /// Minimum number of non-whitespace characters for a document to count
    /// as having text.
    pub min_text_length: usize,
}

impl Default for PdfConfig {
    fn default() -> Self {
        Self { min_text_length: 1 }
    }
}

/// Customer extraction configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Run the whole-text fallback pass when the labeled section yields no RUT.
    pub enable_fallback: bool,

    /// Reject RUTs whose check digit does not match the modulo-11 checksum.
    pub validate_tax_id: bool,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            enable_fallback: true,
            validate_tax_id: false,
        }
    }
}

impl RutxConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content)
            .map_err(|e| RutxError::Config(format!("{}: {}", path.display(), e)))
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &Path) -> Result<()> {
        let content =
            serde_json::to_string_pretty(self).map_err(|e| RutxError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Open the configured record store.
    pub fn open_store(&self) -> Box<dyn RecordStore> {
        match self.store.resolved_format() {
            StoreFormat::Csv => Box::new(CsvStore::new(&self.store.path)),
            _ => Box::new(
                XlsxStore::new(&self.store.path).with_sheet_name(&self.store.sheet_name),
            ),
        }
    }
}
