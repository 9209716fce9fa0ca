//! CEP (Brazilian postal code) helpers
//!
//! A CEP is eight digits, usually written `NNNNN-NNN`.

/// Number of digits in a CEP
pub const CEP_DIGITS: usize = 8;

/// The digits of `raw` when there are exactly eight of them
///
/// ```
/// use cepsheet::cep::normalize_cep;
///
/// assert_eq!(normalize_cep("01310-100").as_deref(), Some("01310100"));
/// assert_eq!(normalize_cep(" 20.040-020 ").as_deref(), Some("20040020"));
/// assert_eq!(normalize_cep("1310-100"), None);
/// ```
pub fn normalize_cep(raw: &str) -> Option<String> {
    let digits: String = raw.chars().filter(char::is_ascii_digit).collect();
    (digits.len() == CEP_DIGITS).then_some(digits)
}

/// True when `raw` holds exactly eight digits once everything else is dropped
pub fn is_valid_cep(raw: &str) -> bool {
    normalize_cep(raw).is_some()
}

/// Render a CEP as `NNNNN-NNN`
///
/// Input with more than eight digits is returned unchanged. Shorter input is
/// reduced to its digits and only gets the hyphen once it has eight, so a
/// partially typed code stays readable.
pub fn format_cep(raw: &str) -> String {
    let digits: String = raw.chars().filter(char::is_ascii_digit).collect();
    match digits.len() {
        CEP_DIGITS => format!("{}-{}", &digits[..5], &digits[5..]),
        n if n < CEP_DIGITS => digits,
        _ => raw.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize() {
        assert_eq!(normalize_cep("01310100").as_deref(), Some("01310100"));
        assert_eq!(normalize_cep("CEP: 40070-110").as_deref(), Some("40070110"));
        assert_eq!(normalize_cep(""), None);
        assert_eq!(normalize_cep("013101000"), None);
        assert!(is_valid_cep("50030-230"));
        assert!(!is_valid_cep("5003-230"));
    }

    #[test]
    fn test_format() {
        assert_eq!(format_cep("01310100"), "01310-100");
        assert_eq!(format_cep("01310-100"), "01310-100");
        assert_eq!(format_cep("0131"), "0131");
        assert_eq!(format_cep("01a31"), "0131");
        assert_eq!(format_cep("0131010099"), "0131010099");
    }
}
