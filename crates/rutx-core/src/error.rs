//! Error types for the rutx-core library.

use std::path::PathBuf;

use thiserror::Error;

/// Main error type for the rutx library.
#[derive(Error, Debug)]
pub enum RutxError {
    /// PDF processing error.
    #[error("PDF error: {0}")]
    Pdf(#[from] PdfError),

    /// Source document could not be turned into text.
    #[error("source error: {0}")]
    Source(#[from] SourceError),

    /// Customer extraction error.
    #[error("extraction error: {0}")]
    Extraction(#[from] ExtractionError),

    /// Record store error.
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Errors related to PDF processing.
#[derive(Error, Debug)]
pub enum PdfError {
    /// Failed to open/parse the PDF file.
    #[error("failed to parse PDF: {0}")]
    Parse(String),

    /// Failed to extract text from PDF.
    #[error("failed to extract text: {0}")]
    TextExtraction(String),

    /// The PDF is encrypted and cannot be processed.
    #[error("PDF is encrypted")]
    Encrypted,

    /// The PDF is empty or has no pages.
    #[error("PDF has no pages")]
    NoPages,

    /// Requested page is out of range.
    #[error("invalid page number: {0}")]
    InvalidPage(u32),
}

/// Errors raised while reading a source document as text.
#[derive(Error, Debug)]
pub enum SourceError {
    /// The file extension is not one we know how to read.
    #[error("unsupported file format: {0}")]
    Unsupported(String),

    /// The document produced no usable text.
    #[error("no text extracted from {}", .0.display())]
    NoText(PathBuf),
}

/// Errors related to customer field extraction.
#[derive(Error, Debug)]
pub enum ExtractionError {
    /// The identifying key could not be recovered from the text.
    #[error("no RUT found in document")]
    MissingTaxId,
}

/// Errors raised by a record store.
#[derive(Error, Debug)]
pub enum StoreError {
    /// The persisted sheet could not be opened.
    #[error("failed to open {}: {reason}", path.display())]
    Open { path: PathBuf, reason: String },

    /// The persisted sheet could not be written back.
    #[error("failed to save {}: {reason}", path.display())]
    Save { path: PathBuf, reason: String },
}

/// Result type for the rutx library.
pub type Result<T> = std::result::Result<T, RutxError>;
