//! Customer field extraction module.

mod parser;
pub mod rules;

pub use parser::{CustomerParser, ExtractionPass, ExtractionResult};

use crate::models::customer::CustomerRecord;

/// Trait for customer field extractors.
pub trait CustomerExtractor {
    /// Extract a customer record from plain invoice text.
    ///
    /// Never fails: fields that cannot be located are left empty.
    fn extract(&self, text: &str) -> CustomerRecord;
}
