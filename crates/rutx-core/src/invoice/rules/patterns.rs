//! Common regex patterns for Chilean invoice extraction.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // Customer block marker ("addressed to")
    pub static ref ADDRESSEE_MARKER: Regex = Regex::new(
        r"(?i)SEÑOR\(ES\):"
    ).unwrap();

    // Labels that close the customer block
    pub static ref SECTION_END: Regex = Regex::new(
        r"(?i)FACTURA|\bCOND\b|DETALLE|FECHA|FORMA DE PAGO"
    ).unwrap();

    // RUT with body and check digit, e.g. "R.U.T.: 76.543.210-K"
    pub static ref RUT_STRICT: Regex = Regex::new(
        r"(?i)R\.U\.T\.:\s*([0-9.]+)-\s*([0-9k]?)"
    ).unwrap();

    // RUT tolerating spacing around the hyphen only, e.g. "R.U.T.: 12.345.678 - 5"
    pub static ref RUT_LOOSE: Regex = Regex::new(
        r"(?i)R\.U\.T\.:\s*([0-9.]+(?:[ \t]*-[ \t]*[0-9k]?)?)"
    ).unwrap();

    // Phone after "F:", digits possibly split by spaces or dashes
    pub static ref PHONE_LABELED: Regex = Regex::new(
        r"(?i)F:\s*[:\-]?\s*([0-9][0-9\s\-]*)"
    ).unwrap();

    // Phone after "F:", one contiguous digit run
    pub static ref PHONE_COMPACT: Regex = Regex::new(
        r"(?i)F:\s*([0-9]+)"
    ).unwrap();

    pub static ref NON_DIGIT: Regex = Regex::new(r"\D").unwrap();

    pub static ref WHITESPACE: Regex = Regex::new(r"\s+").unwrap();
}
