//! Document intake: extract, check for duplicates, append.
//!
//! Every document ends in exactly one [`Outcome`]. Failures are reported,
//! never propagated, so a batch always runs to the end.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{ExtractionError, Result, RutxError};
use crate::invoice::CustomerExtractor;
use crate::models::customer::{CustomerRecord, Field};
use crate::store::RecordStore;

/// Result of ingesting one document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    /// Record appended to the store.
    Success,
    /// A row with the same RUT already exists; nothing written.
    Duplicate,
    /// No text, no RUT, or an I/O failure; nothing written.
    Error,
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Outcome::Success => "success",
            Outcome::Duplicate => "duplicate",
            Outcome::Error => "error",
        })
    }
}

/// What happened to one document.
#[derive(Debug, Clone, Serialize)]
pub struct DocumentReport {
    /// Where the text came from, usually a file path.
    pub source: String,
    pub outcome: Outcome,
    /// RUT of the extracted customer, when one was found.
    pub tax_id: Option<String>,
    /// Fields that could not be extracted.
    pub missing_fields: Vec<Field>,
    /// Error message for [`Outcome::Error`].
    pub message: Option<String>,
}

impl DocumentReport {
    fn error(source: &str, tax_id: Option<String>, err: &RutxError) -> Self {
        Self {
            source: source.to_string(),
            outcome: Outcome::Error,
            tax_id,
            missing_fields: Vec::new(),
            message: Some(err.to_string()),
        }
    }

    /// `Missing fields: Giro, Comuna`, or `None` when nothing is missing.
    pub fn warning(&self) -> Option<String> {
        if self.missing_fields.is_empty() {
            return None;
        }

        let names: Vec<&str> = self.missing_fields.iter().map(|f| f.header()).collect();
        Some(format!("Missing fields: {}", names.join(", ")))
    }
}

/// Outcome counts for a batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BatchSummary {
    pub success: usize,
    pub duplicate: usize,
    pub error: usize,
}

impl BatchSummary {
    pub fn record(&mut self, outcome: &Outcome) {
        match outcome {
            Outcome::Success => self.success += 1,
            Outcome::Duplicate => self.duplicate += 1,
            Outcome::Error => self.error += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.success + self.duplicate + self.error
    }
}

impl fmt::Display for BatchSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} added, {} duplicates, {} failed",
            self.success, self.duplicate, self.error
        )
    }
}

/// Reports for every document of a batch, in input order.
#[derive(Debug, Clone, Serialize)]
pub struct BatchReport {
    pub reports: Vec<DocumentReport>,
    pub summary: BatchSummary,
}

/// Runs extracted records into a store.
pub struct Intake<E, S> {
    extractor: E,
    store: S,
}

impl<E: CustomerExtractor, S: RecordStore> Intake<E, S> {
    pub fn new(extractor: E, store: S) -> Self {
        Self { extractor, store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Ingest one document whose text has already been read.
    ///
    /// A `text` error (unreadable file, no text layer) is reported as
    /// [`Outcome::Error`] without touching the store.
    pub fn ingest(&mut self, source: &str, text: Result<String>) -> DocumentReport {
        let text = match text {
            Ok(text) => text,
            Err(e) => {
                warn!("{}: {}", source, e);
                return DocumentReport::error(source, None, &e);
            }
        };

        let record = self.extractor.extract(&text);
        let Some(tax_id) = record.tax_id.clone() else {
            let err = RutxError::from(ExtractionError::MissingTaxId);
            warn!("{}: {}", source, err);
            return DocumentReport::error(source, None, &err);
        };

        let missing_fields = record.missing_fields();
        if !missing_fields.is_empty() {
            let names: Vec<&str> = missing_fields.iter().map(|f| f.header()).collect();
            warn!("{}: could not find {}", source, names.join(", "));
        }

        let outcome = if self.store.exists(&tax_id) {
            info!("{}: customer {} already stored", source, tax_id);
            Outcome::Duplicate
        } else if let Err(e) = self.append(&record) {
            warn!("{}: {}", source, e);
            return DocumentReport::error(source, Some(tax_id), &e);
        } else {
            info!("{}: added customer {}", source, tax_id);
            Outcome::Success
        };

        DocumentReport {
            source: source.to_string(),
            outcome,
            tax_id: Some(tax_id),
            missing_fields,
            message: None,
        }
    }

    /// Ingest documents one after another. Never stops early.
    pub fn ingest_batch<I>(&mut self, documents: I) -> BatchReport
    where
        I: IntoIterator<Item = (String, Result<String>)>,
    {
        let mut summary = BatchSummary::default();
        let reports = documents
            .into_iter()
            .map(|(source, text)| {
                let report = self.ingest(&source, text);
                summary.record(&report.outcome);
                report
            })
            .collect();

        info!("Batch finished: {}", summary);
        BatchReport { reports, summary }
    }

    fn append(&mut self, record: &CustomerRecord) -> Result<()> {
        self.store.append(record)?;
        Ok(())
    }
}
