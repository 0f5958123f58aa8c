//! Phone number and country code normalization.
//!
//! The backend expects the national number as bare digits and the country
//! code separately as `+<1-3 digits>`. Clients send anything from
//! `(415) 555-1234` to `+14155551234`, so the raw input is cleaned and split
//! here before any request is made.

use std::sync::LazyLock;

use regex::Regex;

use crate::domains::tools::error::ValidationError;

static INTERNATIONAL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\+[0-9]{1,3})([0-9]+)$").expect("valid international phone regex"));

static COUNTRY_CODE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\+[0-9]{1,3}$").expect("valid country code regex"));

/// One-digit country calling codes (NANP and Russia/Kazakhstan).
const ONE_DIGIT_CODES: &[&str] = &["1", "7"];

/// Two-digit country calling codes.
///
/// Calling codes are prefix-free: when the leading digits match one of these
/// the code cannot be longer.
const TWO_DIGIT_CODES: &[&str] = &[
    "20", "27", "30", "31", "32", "33", "34", "36", "39", "40", "41", "43", "44", "45", "46",
    "47", "48", "49", "51", "52", "53", "54", "55", "56", "57", "58", "60", "61", "62", "63",
    "64", "65", "66", "81", "82", "84", "86", "90", "91", "92", "93", "94", "95", "98",
];

/// A phone number split into national digits and country code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedPhone {
    /// Digits only, no leading zeros, no country code.
    pub phone: String,
    /// `+` followed by 1 to 3 digits.
    pub country_code: String,
}

/// Normalize a raw phone number and candidate country code.
///
/// Parentheses, hyphens and whitespace are stripped. An international number
/// (`+...`) carries its own country code, which overrides `country_code`.
/// Leading zeros of the national number are dropped.
pub fn normalize_phone(raw_phone: &str, country_code: &str) -> Result<NormalizedPhone, ValidationError> {
    let cleaned: String = raw_phone
        .chars()
        .filter(|c| !matches!(c, '(' | ')' | '-') && !c.is_whitespace())
        .collect();

    let (digits, country_code) = if cleaned.starts_with('+') {
        split_international(&cleaned)?
    } else {
        (cleaned, country_code.trim().to_string())
    };

    let phone = digits.trim_start_matches('0');

    if phone.is_empty() || !phone.chars().all(|c| c.is_ascii_digit()) {
        return Err(ValidationError::InvalidFormat(format!(
            "phone number '{}' must contain digits only (separators and a leading + are allowed)",
            raw_phone.trim()
        )));
    }

    if !COUNTRY_CODE_RE.is_match(&country_code) {
        return Err(ValidationError::InvalidFormat(format!(
            "country code '{}' must be '+' followed by 1 to 3 digits",
            country_code
        )));
    }

    Ok(NormalizedPhone {
        phone: phone.to_string(),
        country_code,
    })
}

/// Split `+<code><number>` into `(number, code)`.
fn split_international(cleaned: &str) -> Result<(String, String), ValidationError> {
    let captures = INTERNATIONAL_RE.captures(cleaned).ok_or_else(|| {
        ValidationError::InvalidFormat(format!(
            "international phone number '{}' must be '+' followed by digits",
            cleaned
        ))
    })?;

    let digits = &cleaned[1..];
    let code_len = if digits.len() > 1 && ONE_DIGIT_CODES.contains(&&digits[..1]) {
        1
    } else if digits.len() > 2 && TWO_DIGIT_CODES.contains(&&digits[..2]) {
        2
    } else {
        // Three-digit (or unassigned) codes take the greedy match.
        return Ok((captures[2].to_string(), captures[1].to_string()));
    };

    Ok((
        digits[code_len..].to_string(),
        format!("+{}", &digits[..code_len]),
    ))
}
