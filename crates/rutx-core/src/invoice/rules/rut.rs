//! RUT (Chilean tax ID) extraction, formatting and validation.

use tracing::{debug, warn};

use super::patterns::{RUT_LOOSE, RUT_STRICT, WHITESPACE};
use super::{ExtractionMatch, FieldExtractor};

/// Which RUT pattern to apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RutMode {
    /// `R.U.T.: <dotted body>-<check>`, reformatted to `NN.NNN.NNN-D`.
    Strict,
    /// `R.U.T.:` followed by a dotted body and an optional check character,
    /// with spacing allowed around the hyphen; kept as written minus
    /// whitespace.
    Loose,
}

/// RUT field extractor.
pub struct RutExtractor {
    mode: RutMode,
    validate: bool,
}

impl RutExtractor {
    /// Create a new RUT extractor.
    pub fn new(mode: RutMode) -> Self {
        Self {
            mode,
            validate: false,
        }
    }

    /// Set whether to validate the modulo-11 check digit.
    pub fn with_validation(mut self, validate: bool) -> Self {
        self.validate = validate;
        self
    }

    fn from_captures(&self, caps: &regex::Captures<'_>) -> Option<ExtractionMatch<String>> {
        let body = caps.get(1)?;

        let value = match self.mode {
            RutMode::Strict => {
                let check = caps.get(2).map(|m| m.as_str()).unwrap_or("");
                if check.is_empty() {
                    warn!("RUT {} has no check digit, leaving it unset", body.as_str());
                    return None;
                }
                format_rut(body.as_str(), check)?
            }
            RutMode::Loose => normalize_loose_rut(body.as_str()),
        };

        if self.validate && !validate_rut(&value) {
            warn!("RUT {} fails check digit validation", value);
            return None;
        }

        let full_match = caps.get(0)?;
        debug!("Found RUT {} ({:?})", value, self.mode);
        Some(
            ExtractionMatch::new(value, full_match.as_str())
                .with_position(body.start(), full_match.end()),
        )
    }
}

impl FieldExtractor for RutExtractor {
    type Output = ExtractionMatch<String>;

    /// Only the first labeled occurrence is considered.
    fn extract(&self, text: &str) -> Option<Self::Output> {
        let caps = match self.mode {
            RutMode::Strict => RUT_STRICT.captures(text),
            RutMode::Loose => RUT_LOOSE.captures(text),
        }?;
        self.from_captures(&caps)
    }

    fn extract_all(&self, text: &str) -> Vec<Self::Output> {
        let pattern = match self.mode {
            RutMode::Strict => &*RUT_STRICT,
            RutMode::Loose => &*RUT_LOOSE,
        };

        pattern
            .captures_iter(text)
            .filter_map(|caps| self.from_captures(&caps))
            .collect()
    }
}

/// Format a RUT body and check character as `NN.NNN.NNN-D`.
///
/// Dots in `body` are ignored; leading zeros are dropped. Returns `None` when
/// the body holds no number or the check character is empty.
pub fn format_rut(body: &str, check: &str) -> Option<String> {
    let digits: String = body.chars().filter(|c| *c != '.').collect();
    let number: u64 = match digits.parse() {
        Ok(n) => n,
        Err(_) => {
            warn!("RUT body {:?} is not a number", body);
            return None;
        }
    };

    if check.is_empty() {
        return None;
    }

    Some(format!(
        "{}-{}",
        group_thousands(number),
        check.to_uppercase()
    ))
}

/// Remove all whitespace from a loosely matched RUT.
pub fn normalize_loose_rut(raw: &str) -> String {
    WHITESPACE.replace_all(raw.trim(), "").into_owned()
}

/// Compute the modulo-11 check character for a RUT body.
///
/// Weights 2..=7 are applied from the rightmost digit; 11 maps to `0` and
/// 10 to `K`.
pub fn compute_check_digit(body: &str) -> Option<char> {
    let digits: Vec<u32> = body
        .chars()
        .filter(|c| *c != '.')
        .map(|c| c.to_digit(10))
        .collect::<Option<Vec<_>>>()?;

    if digits.is_empty() {
        return None;
    }

    let sum: u32 = digits
        .iter()
        .rev()
        .zip([2u32, 3, 4, 5, 6, 7].iter().cycle())
        .map(|(d, w)| d * w)
        .sum();

    match 11 - (sum % 11) {
        11 => Some('0'),
        10 => Some('K'),
        n => char::from_digit(n, 10),
    }
}

/// Validate a RUT such as `76.543.210-3` or `10000013-k`.
pub fn validate_rut(rut: &str) -> bool {
    let Some((body, check)) = rut.rsplit_once('-') else {
        return false;
    };

    let mut check_chars = check.trim().chars();
    let (Some(check), None) = (check_chars.next(), check_chars.next()) else {
        return false;
    };

    compute_check_digit(body.trim()) == Some(check.to_ascii_uppercase())
}

fn group_thousands(number: u64) -> String {
    let digits = number.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);

    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(c);
    }

    grouped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_rut() {
        assert_eq!(format_rut("12345678", "9"), Some("12.345.678-9".to_string()));
        assert_eq!(format_rut("12.345.678", "k"), Some("12.345.678-K".to_string()));
        assert_eq!(format_rut("5.126.663", "3"), Some("5.126.663-3".to_string()));
        assert_eq!(format_rut("0076543210", "3"), Some("76.543.210-3".to_string()));
        assert_eq!(format_rut("999", "1"), Some("999-1".to_string()));
    }

    #[test]
    fn test_format_rut_rejects_bad_parts() {
        assert_eq!(format_rut("...", "1"), None);
        assert_eq!(format_rut("12345678", ""), None);
    }

    #[test]
    fn test_normalize_loose_rut() {
        assert_eq!(normalize_loose_rut("12.345.678 - 5"), "12.345.678-5");
        assert_eq!(normalize_loose_rut(" 12.345.678-\t5 "), "12.345.678-5");
    }

    #[test]
    fn test_check_digit() {
        assert_eq!(compute_check_digit("12345678"), Some('5'));
        assert_eq!(compute_check_digit("11.111.111"), Some('1'));
        assert_eq!(compute_check_digit("10000013"), Some('K'));
        assert_eq!(compute_check_digit("76123456"), Some('0'));
        assert_eq!(compute_check_digit("12a"), None);
    }

    #[test]
    fn test_validate_rut() {
        assert!(validate_rut("12.345.678-5"));
        assert!(validate_rut("10.000.013-k"));
        assert!(!validate_rut("12.345.678-9"));
        assert!(!validate_rut("12345678"));
        assert!(!validate_rut("12.345.678-55"));
    }

    #[test]
    fn test_extract_strict() {
        let text = "SEÑOR(ES): ACME\nR.U.T.: 76.543.210-3\nGIRO: VENTAS";
        let m = RutExtractor::new(RutMode::Strict).extract(text).unwrap();
        assert_eq!(m.value, "76.543.210-3");
        assert_eq!(&text[m.start()..m.start() + 10], "76.543.210");
    }

    #[test]
    fn test_extract_strict_lowercase_label_and_check() {
        let text = "r.u.t.: 11111111- k";
        let m = RutExtractor::new(RutMode::Strict).extract(text).unwrap();
        assert_eq!(m.value, "11.111.111-K");
    }

    #[test]
    fn test_extract_strict_missing_check_digit() {
        let text = "R.U.T.: 12.345.678-";
        assert!(RutExtractor::new(RutMode::Strict).extract(text).is_none());
    }

    #[test]
    fn test_extract_loose() {
        let text = "R.U.T.: 12.345.678 - 5\nGIRO: X";
        let m = RutExtractor::new(RutMode::Loose).extract(text).unwrap();
        assert_eq!(m.value, "12.345.678-5");
    }

    #[test]
    fn test_extract_loose_ignores_trailing_numbers() {
        let loose = RutExtractor::new(RutMode::Loose);

        let m = loose.extract("R.U.T.: 12.345.678-5   2024\n").unwrap();
        assert_eq!(m.value, "12.345.678-5");

        let m = loose.extract("R.U.T.: 12345678 -k 99 FONO").unwrap();
        assert_eq!(m.value, "12345678-k");

        let m = loose.extract("R.U.T.: 12.345.678 2024").unwrap();
        assert_eq!(m.value, "12.345.678");
    }

    #[test]
    fn test_validation_drops_bad_checksum() {
        let text = "R.U.T.: 12.345.678-9";
        let extractor = RutExtractor::new(RutMode::Strict).with_validation(true);
        assert!(extractor.extract(text).is_none());

        let text = "R.U.T.: 12.345.678-5";
        assert!(extractor.extract(text).is_some());
    }

    #[test]
    fn test_extract_all() {
        let text = "R.U.T.: 76.543.210-3\nR.U.T.: 11.111.111-1";
        let results = RutExtractor::new(RutMode::Strict).extract_all(text);
        assert_eq!(results.len(), 2);
        assert_eq!(results[1].value, "11.111.111-1");
    }
}
