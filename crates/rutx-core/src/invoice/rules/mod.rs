//! Rule-based field extractors for Chilean invoices.

pub mod labels;
pub mod patterns;
pub mod phone;
pub mod rut;

pub use labels::{apply_rules, Anchor, LabelRule, FALLBACK_RULES, PRIMARY_RULES};
pub use phone::{digits_only, format_phone, format_phone_loose, PhoneExtractor};
pub use rut::{
    compute_check_digit, format_rut, normalize_loose_rut, validate_rut, RutExtractor, RutMode,
};
pub use patterns::*;

/// Trait for field extractors.
pub trait FieldExtractor {
    /// The type of value this extractor produces.
    type Output;

    /// Extract the field from text.
    fn extract(&self, text: &str) -> Option<Self::Output>;

    /// Extract all occurrences of the field.
    fn extract_all(&self, text: &str) -> Vec<Self::Output>;
}

/// A value found in the source text.
#[derive(Debug, Clone)]
pub struct ExtractionMatch<T> {
    /// Extracted value.
    pub value: T,
    /// Position in source text.
    pub position: Option<(usize, usize)>,
    /// Source text that was matched.
    pub source: String,
}

impl<T> ExtractionMatch<T> {
    pub fn new(value: T, source: impl Into<String>) -> Self {
        Self {
            value,
            position: None,
            source: source.into(),
        }
    }

    pub fn with_position(mut self, start: usize, end: usize) -> Self {
        self.position = Some((start, end));
        self
    }

    /// Byte offset where the match starts, or 0 when unknown.
    pub fn start(&self) -> usize {
        self.position.map(|(s, _)| s).unwrap_or(0)
    }
}
