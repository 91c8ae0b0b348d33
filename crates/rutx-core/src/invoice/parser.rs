//! Two-pass customer parser for the "SEÑOR(ES)" invoice dialect.

use std::time::Instant;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::models::config::ExtractionConfig;
use crate::models::customer::{CustomerRecord, Field};

use super::rules::{
    apply_rules, FieldExtractor, PhoneExtractor, RutExtractor, RutMode, ADDRESSEE_MARKER,
    FALLBACK_RULES, PRIMARY_RULES, SECTION_END,
};
use super::CustomerExtractor;

/// Which pass recovered the RUT.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtractionPass {
    /// Found inside the labeled customer section.
    Primary,
    /// Found by the whole-text fallback.
    Fallback,
    /// No RUT anywhere.
    NotFound,
}

/// Result of customer extraction.
#[derive(Debug, Clone, Serialize)]
pub struct ExtractionResult {
    /// Extracted customer.
    pub record: CustomerRecord,
    /// Pass that produced the RUT.
    pub tax_id_pass: ExtractionPass,
    /// Extraction warnings.
    pub warnings: Vec<String>,
    /// Processing time in milliseconds.
    pub processing_time_ms: u64,
}

/// Customer parser: a strict pass over the labeled section, then a looser
/// whole-text pass when no RUT was found.
pub struct CustomerParser {
    /// Whether to run the fallback pass.
    fallback: bool,
    /// Whether to validate RUT check digits.
    validate_tax_id: bool,
}

impl CustomerParser {
    /// Create a new parser with default settings.
    pub fn new() -> Self {
        Self {
            fallback: true,
            validate_tax_id: false,
        }
    }

    /// Create a parser from the extraction configuration.
    pub fn from_config(config: &ExtractionConfig) -> Self {
        Self::new()
            .with_fallback(config.enable_fallback)
            .with_tax_id_validation(config.validate_tax_id)
    }

    /// Enable or disable the fallback pass.
    pub fn with_fallback(mut self, fallback: bool) -> Self {
        self.fallback = fallback;
        self
    }

    /// Set RUT check digit validation.
    pub fn with_tax_id_validation(mut self, validate: bool) -> Self {
        self.validate_tax_id = validate;
        self
    }

    /// Parse customer data from invoice text.
    pub fn parse(&self, text: &str) -> ExtractionResult {
        let start = Instant::now();

        info!("Extracting customer from {} characters of text", text.len());

        let mut warnings = Vec::new();
        let primary = self.primary_pass(text, &mut warnings);
        let (record, tax_id_pass) = if primary.tax_id.is_some() {
            (primary, ExtractionPass::Primary)
        } else if self.fallback {
            debug!("No RUT in customer section, trying whole-text fallback");
            let fallback = self.fallback_pass(text);
            let pass = if fallback.tax_id.is_some() {
                ExtractionPass::Fallback
            } else {
                ExtractionPass::NotFound
            };
            (primary.or(fallback), pass)
        } else {
            (primary, ExtractionPass::NotFound)
        };

        warnings.extend(
            record
                .missing_fields()
                .into_iter()
                .map(|field| format!("Could not extract {}", field)),
        );

        debug!(
            "Extracted RUT {:?} via {:?}, {} warnings",
            record.tax_id,
            tax_id_pass,
            warnings.len()
        );

        ExtractionResult {
            record,
            tax_id_pass,
            warnings,
            processing_time_ms: start.elapsed().as_millis() as u64,
        }
    }

    fn primary_pass(&self, text: &str, warnings: &mut Vec<String>) -> CustomerRecord {
        let Some(marker) = ADDRESSEE_MARKER.find(text) else {
            debug!("No SEÑOR(ES) marker in text");
            return CustomerRecord::default();
        };

        let rest = &text[marker.end()..];
        let section_len = SECTION_END.find(rest).map_or(rest.len(), |m| m.start());
        let section = &rest[..section_len];

        let ruts = RutExtractor::new(RutMode::Strict).with_validation(self.validate_tax_id);
        let tax_id = ruts.extract(section).map(|m| m.value);

        let labeled = ruts.extract_all(section);
        if labeled.iter().any(|m| Some(&m.value) != tax_id.as_ref()) {
            let sources: Vec<&str> = labeled.iter().map(|m| m.source.as_str()).collect();
            warnings.push(format!(
                "Conflicting RUT labels in customer section: {}",
                sources.join(" / ")
            ));
        }
        let phone = PhoneExtractor::labeled().extract(section).map(|m| m.value);

        apply_rules(&PRIMARY_RULES, &text[marker.start()..], section)
            .with_opt(Field::TaxId, tax_id)
            .with_opt(Field::Phone, phone)
    }

    fn fallback_pass(&self, text: &str) -> CustomerRecord {
        let Some(marker) = ADDRESSEE_MARKER.find(text) else {
            return CustomerRecord::default();
        };
        let from_marker = &text[marker.start()..];

        let tax_id = RutExtractor::new(RutMode::Loose)
            .with_validation(self.validate_tax_id)
            .extract(from_marker);

        // Remaining fields are only searched after the RUT.
        let body = tax_id.as_ref().map_or("", |m| &from_marker[m.start()..]);
        let phone = PhoneExtractor::compact().extract(body).map(|m| m.value);

        apply_rules(&FALLBACK_RULES, from_marker, body)
            .with_opt(Field::TaxId, tax_id.map(|m| m.value))
            .with_opt(Field::Phone, phone)
    }
}

impl Default for CustomerParser {
    fn default() -> Self {
        Self::new()
    }
}

impl CustomerExtractor for CustomerParser {
    fn extract(&self, text: &str) -> CustomerRecord {
        self.parse(text).record
    }
}
