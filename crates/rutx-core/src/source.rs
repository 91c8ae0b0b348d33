//! Turn a document on disk into text.

use std::path::Path;

use tracing::{debug, info};

use crate::error::{Result, SourceError};
use crate::models::config::PdfConfig;
use crate::pdf::PdfExtractor;

/// Read the text of a `.pdf` or `.txt` document.
///
/// Documents with fewer than `config.min_text_length` non-whitespace
/// characters are rejected with [`SourceError::NoText`].
pub fn read_document_text(path: &Path, config: &PdfConfig) -> Result<String> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_lowercase)
        .unwrap_or_default();

    let text = match extension.as_str() {
        "pdf" => {
            info!("Reading PDF: {}", path.display());
            let data = std::fs::read(path)?;
            PdfExtractor::text_from_bytes(&data)?
        }
        "txt" => {
            info!("Reading text file: {}", path.display());
            std::fs::read_to_string(path)?
        }
        _ => return Err(SourceError::Unsupported(path.display().to_string()).into()),
    };

    let visible = text.chars().filter(|c| !c.is_whitespace()).count();
    debug!("{} non-whitespace characters in {}", visible, path.display());
    if visible < config.min_text_length {
        return Err(SourceError::NoText(path.to_path_buf()).into());
    }

    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RutxError;

    #[test]
    fn test_read_text_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("factura.TXT");
        std::fs::write(&path, "SEÑOR(ES): ACME\n").unwrap();

        let text = read_document_text(&path, &PdfConfig::default()).unwrap();
        assert_eq!(text, "SEÑOR(ES): ACME\n");
    }

    #[test]
    fn test_unsupported_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("factura.docx");
        std::fs::write(&path, "x").unwrap();

        assert!(matches!(
            read_document_text(&path, &PdfConfig::default()),
            Err(RutxError::Source(SourceError::Unsupported(_)))
        ));
    }

    #[test]
    fn test_blank_text_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("vacio.txt");
        std::fs::write(&path, " \n\t\n").unwrap();

        assert!(matches!(
            read_document_text(&path, &PdfConfig::default()),
            Err(RutxError::Source(SourceError::NoText(_)))
        ));

        let strict = PdfConfig { min_text_length: 10 };
        std::fs::write(&path, "ACME").unwrap();
        assert!(read_document_text(&path, &strict).is_err());
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            read_document_text(&dir.path().join("nada.txt"), &PdfConfig::default()),
            Err(RutxError::Io(_))
        ));
    }
}
