//! Marker-to-terminator table for the labeled customer fields.
//!
//! Each rule names a start marker and the labels that may close the value.
//! A value runs from the first marker occurrence (leading whitespace and line
//! breaks skipped) to the first line break, the earliest terminator, or the
//! end of the text, whichever comes first.

use lazy_static::lazy_static;
use regex::Regex;
use tracing::trace;

use super::ExtractionMatch;
use crate::models::customer::{CustomerRecord, Field};

/// Which slice of the document a rule is searched in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Anchor {
    /// Text starting at the "SEÑOR(ES):" marker.
    Addressee,
    /// The pass-specific body: the customer section, or the text following
    /// the RUT in the fallback pass.
    Body,
}

/// One labeled field.
#[derive(Debug)]
pub struct LabelRule {
    pub field: Field,
    pub anchor: Anchor,
    marker: Regex,
    terminator: Option<Regex>,
}

impl LabelRule {
    /// Build a rule from case-insensitive marker and terminator patterns.
    pub fn new(field: Field, anchor: Anchor, marker: &str, terminators: &[&str]) -> Self {
        let marker = Regex::new(&format!("(?i){}", marker)).unwrap();
        let terminator = (!terminators.is_empty())
            .then(|| Regex::new(&format!("(?i){}", terminators.join("|"))).unwrap());

        Self {
            field,
            anchor,
            marker,
            terminator,
        }
    }

    /// Capture the value following the first marker occurrence.
    pub fn capture(&self, text: &str) -> Option<ExtractionMatch<String>> {
        let marker = self.marker.find(text)?;
        let after = &text[marker.end()..];
        let start = marker.end() + (after.len() - after.trim_start().len());

        let line = text[start..].split('\n').next().unwrap_or_default();
        let end = self
            .terminator
            .as_ref()
            .and_then(|t| t.find(line))
            .map_or(line.len(), |t| t.start());

        let value = line[..end].trim();
        if value.is_empty() {
            trace!("{} marker found but value is empty", self.field);
            return None;
        }

        Some(
            ExtractionMatch::new(value.to_string(), marker.as_str())
                .with_position(start, start + end),
        )
    }
}

/// Apply a rule table, taking each rule's text from its anchor.
pub fn apply_rules(rules: &[LabelRule], addressee: &str, body: &str) -> CustomerRecord {
    rules.iter().fold(CustomerRecord::default(), |record, rule| {
        let text = match rule.anchor {
            Anchor::Addressee => addressee,
            Anchor::Body => body,
        };
        record.with_opt(rule.field, rule.capture(text).map(|m| m.value))
    })
}

lazy_static! {
    /// Rules for the labeled customer section.
    pub static ref PRIMARY_RULES: Vec<LabelRule> = vec![
        LabelRule::new(Field::LegalName, Anchor::Addressee, r"SEÑOR\(ES\):", &[r"R\.U\.T\."]),
        LabelRule::new(Field::TradeActivity, Anchor::Body, r"GIRO:", &["DIRECC"]),
        LabelRule::new(Field::Address, Anchor::Body, r"DIRECCION:", &["COMUNA"]),
        // No colon: this dialect prints "COMUNA PROVIDENCIA CIUDAD: ...".
        LabelRule::new(Field::Commune, Anchor::Body, r"COMUNA", &["CIUDAD"]),
        LabelRule::new(Field::City, Anchor::Body, r"CIUDAD:", &["CONTACTO"]),
        LabelRule::new(Field::ContactName, Anchor::Body, r"CONTACTO:", &["F:"]),
    ];

    /// Rules for the whole-text fallback, searched after the RUT.
    pub static ref FALLBACK_RULES: Vec<LabelRule> = vec![
        LabelRule::new(Field::LegalName, Anchor::Addressee, r"SEÑOR\(ES\):", &[r"R\.U\.T\."]),
        LabelRule::new(Field::TradeActivity, Anchor::Body, r"GIRO:", &["DIRECC"]),
        LabelRule::new(Field::Address, Anchor::Body, r"DIRECCION:", &["COMUNA"]),
        LabelRule::new(Field::Commune, Anchor::Body, r"COMUNA:", &["CIUDAD"]),
        LabelRule::new(Field::City, Anchor::Body, r"CIUDAD:", &["CONTACTO"]),
        LabelRule::new(Field::ContactName, Anchor::Body, r"CONTACTO:", &["F:"]),
    ];
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rule(field: Field) -> &'static LabelRule {
        PRIMARY_RULES.iter().find(|r| r.field == field).unwrap()
    }

    #[test]
    fn test_capture_until_line_break() {
        let m = rule(Field::TradeActivity)
            .capture("GIRO: VENTA DE ALIMENTOS\nDIRECCION: X")
            .unwrap();
        assert_eq!(m.value, "VENTA DE ALIMENTOS");
    }

    #[test]
    fn test_capture_until_terminator_on_same_line() {
        let m = rule(Field::Commune)
            .capture("COMUNA PROVIDENCIA CIUDAD: SANTIAGO")
            .unwrap();
        assert_eq!(m.value, "PROVIDENCIA");

        let m = rule(Field::City)
            .capture("COMUNA PROVIDENCIA CIUDAD: SANTIAGO")
            .unwrap();
        assert_eq!(m.value, "SANTIAGO");
    }

    #[test]
    fn test_capture_is_case_insensitive() {
        let m = rule(Field::ContactName)
            .capture("contacto: Ana Rojas f: 912345678")
            .unwrap();
        assert_eq!(m.value, "Ana Rojas");
    }

    #[test]
    fn test_capture_skips_line_break_after_marker() {
        let m = rule(Field::Address).capture("DIRECCION:\n  LOS OLMOS 12\n").unwrap();
        assert_eq!(m.value, "LOS OLMOS 12");
    }

    #[test]
    fn test_capture_empty_value_is_absent() {
        assert!(rule(Field::TradeActivity).capture("GIRO:   DIRECCION: X").is_none());
        assert!(rule(Field::TradeActivity).capture("GIRO:").is_none());
        assert!(rule(Field::TradeActivity).capture("ACTIVIDAD: X").is_none());
    }

    #[test]
    fn test_legal_name_stops_at_rut() {
        let m = rule(Field::LegalName)
            .capture("SEÑOR(ES): ACME SPA R.U.T.: 1-9")
            .unwrap();
        assert_eq!(m.value, "ACME SPA");
    }

    #[test]
    fn test_fallback_commune_requires_colon() {
        let fallback = FALLBACK_RULES
            .iter()
            .find(|r| r.field == Field::Commune)
            .unwrap();
        assert!(fallback.capture("COMUNA MAIPU").is_none());
        assert_eq!(fallback.capture("COMUNA: MAIPU").unwrap().value, "MAIPU");
    }

    #[test]
    fn test_apply_rules_uses_anchors() {
        let record = apply_rules(
            &PRIMARY_RULES,
            "SEÑOR(ES): ACME\nGIRO: NOT THIS ONE",
            "GIRO: COMERCIO",
        );
        assert_eq!(record.get(Field::LegalName), Some("ACME"));
        assert_eq!(record.get(Field::TradeActivity), Some("COMERCIO"));
        assert_eq!(record.get(Field::TaxId), None);
    }
}
