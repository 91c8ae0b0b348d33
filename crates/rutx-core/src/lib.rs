//! Core library for Chilean invoice customer extraction.
//!
//! This crate provides:
//! - Customer field extraction (razón social, RUT, giro, dirección, comuna,
//!   ciudad, contacto, teléfono) from invoice text
//! - Deduplicating record stores backed by XLSX or CSV files
//! - Document intake that turns each document into a success, duplicate or
//!   error outcome
//! - PDF and plain-text sources

pub mod error;
pub mod models;
pub mod pdf;
pub mod source;
pub mod invoice;
pub mod store;
pub mod intake;

pub use error::{RutxError, Result};
pub use models::customer::{CustomerRecord, Field};
pub use models::config::RutxConfig;
pub use pdf::{PdfExtractor, PdfProcessor};
pub use invoice::{CustomerExtractor, CustomerParser, ExtractionPass, ExtractionResult};
pub use store::{CsvStore, RecordStore, XlsxStore};
pub use intake::{BatchReport, BatchSummary, DocumentReport, Intake, Outcome};
pub use source::read_document_text;
