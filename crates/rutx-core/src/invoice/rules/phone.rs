//! Phone extraction and normalization to Chilean dialing format.

use super::patterns::{NON_DIGIT, PHONE_COMPACT, PHONE_LABELED};
use super::{ExtractionMatch, FieldExtractor};

/// Phone field extractor.
///
/// The labeled variant accepts digit groups split by spaces or dashes and
/// always emits a `+56` prefix; the compact variant takes one digit run and
/// leaves unknown lengths as bare digits.
pub struct PhoneExtractor {
    compact: bool,
}

impl PhoneExtractor {
    /// Extractor for the labeled customer section.
    pub fn labeled() -> Self {
        Self { compact: false }
    }

    /// Extractor for the whole-text fallback.
    pub fn compact() -> Self {
        Self { compact: true }
    }

    fn from_captures(&self, caps: &regex::Captures<'_>) -> Option<ExtractionMatch<String>> {
        let number = caps.get(1)?;
        let value = if self.compact {
            format_phone_loose(number.as_str())
        } else {
            format_phone(number.as_str())
        }?;

        let full_match = caps.get(0)?;
        Some(
            ExtractionMatch::new(value, full_match.as_str())
                .with_position(full_match.start(), full_match.end()),
        )
    }

    fn pattern(&self) -> &'static regex::Regex {
        if self.compact { &*PHONE_COMPACT } else { &*PHONE_LABELED }
    }
}

impl FieldExtractor for PhoneExtractor {
    type Output = ExtractionMatch<String>;

    fn extract(&self, text: &str) -> Option<Self::Output> {
        let caps = self.pattern().captures(text)?;
        self.from_captures(&caps)
    }

    fn extract_all(&self, text: &str) -> Vec<Self::Output> {
        self.pattern()
            .captures_iter(text)
            .filter_map(|caps| self.from_captures(&caps))
            .collect()
    }
}

/// Strip everything that is not a digit.
pub fn digits_only(raw: &str) -> String {
    NON_DIGIT.replace_all(raw, "").into_owned()
}

/// Format a phone as `+569 XXXXXXXX` (mobile) or `+56 <digits>`.
///
/// - 9 digits starting with `9`: the leading `9` becomes part of the prefix
/// - 8 digits: treated as a mobile number without its `9`
/// - anything else: kept as-is behind `+56`
pub fn format_phone(raw: &str) -> Option<String> {
    let digits = digits_only(raw);
    if digits.is_empty() {
        return None;
    }

    Some(mobile_format(&digits).unwrap_or_else(|| format!("+56 {}", digits)))
}

/// Like [`format_phone`], but lengths other than 8/9 stay bare digits.
pub fn format_phone_loose(raw: &str) -> Option<String> {
    let digits = digits_only(raw);
    if digits.is_empty() {
        return None;
    }

    Some(mobile_format(&digits).unwrap_or(digits))
}

fn mobile_format(digits: &str) -> Option<String> {
    match digits.len() {
        9 if digits.starts_with('9') => Some(format!("+569 {}", &digits[1..])),
        8 => Some(format!("+569 {}", digits)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_phone() {
        assert_eq!(format_phone("912345678").as_deref(), Some("+569 12345678"));
        assert_eq!(format_phone("12345678").as_deref(), Some("+569 12345678"));
        assert_eq!(format_phone("1234567").as_deref(), Some("+56 1234567"));
        assert_eq!(format_phone("223456789").as_deref(), Some("+56 223456789"));
        assert_eq!(format_phone("9 8765-4321").as_deref(), Some("+569 87654321"));
        assert_eq!(format_phone(" - "), None);
    }

    #[test]
    fn test_format_phone_loose() {
        assert_eq!(format_phone_loose("912345678").as_deref(), Some("+569 12345678"));
        assert_eq!(format_phone_loose("22223333").as_deref(), Some("+569 22223333"));
        assert_eq!(format_phone_loose("1234567").as_deref(), Some("1234567"));
    }

    #[test]
    fn test_extract_labeled() {
        let text = "CONTACTO: ANA\nF: - 9 8765 4321\n";
        let m = PhoneExtractor::labeled().extract(text).unwrap();
        assert_eq!(m.value, "+569 87654321");
    }

    #[test]
    fn test_extract_compact_stops_at_space() {
        let text = "F: 2222 3333";
        let m = PhoneExtractor::compact().extract(text).unwrap();
        assert_eq!(m.value, "2222");
    }

    #[test]
    fn test_no_phone_label() {
        assert!(PhoneExtractor::labeled().extract("FONO 912345678").is_none());
    }
}
