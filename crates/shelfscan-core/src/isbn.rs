//! ISBN normalisation for the borrow flow.

use std::sync::LazyLock;

use regex::Regex;

/// 13 digits with a 978/979 prefix, or 9 digits plus a check digit or `X`.
/// ASCII digits only; `\d` would admit any Unicode decimal digit.
static ISBN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(97[89][0-9]{10}|[0-9]{9}[0-9X])$").expect("static regex is valid"));

/// Remove hyphens and whitespace.
pub fn clean_isbn(isbn: &str) -> String {
    isbn.chars()
        .filter(|c| *c != '-' && !c.is_whitespace())
        .collect()
}

/// Whether `isbn` (already cleaned) is a plausible ISBN-10 or ISBN-13.
///
/// Only the shape is checked; ISBN-10 check digits are not verified.
pub fn validate_isbn(isbn: &str) -> bool {
    ISBN_RE.is_match(isbn)
}

/// Convert an ISBN-10 to ISBN-13 (`978` prefix, recomputed check digit).
///
/// Input is cleaned first. Anything that is not 10 characters long comes
/// back cleaned but otherwise unchanged, so ISBN-13 input is a fixed point.
pub fn to_isbn13(isbn: &str) -> String {
    let cleaned = clean_isbn(isbn);
    if cleaned.chars().count() != 10 {
        return cleaned;
    }

    let mut isbn13: String = "978".chars().chain(cleaned.chars().take(9)).collect();
    let Some(check) = isbn13_check_digit(&isbn13) else {
        // Non-digit in the first nine characters; leave the input as typed.
        return cleaned;
    };
    isbn13.push(check);
    isbn13
}

/// Check digit over the first 12 digits, weights alternating 1 and 3.
fn isbn13_check_digit(first12: &str) -> Option<char> {
    let mut sum = 0;
    for (i, c) in first12.chars().take(12).enumerate() {
        let digit = c.to_digit(10)?;
        sum += if i % 2 == 0 { digit } else { digit * 3 };
    }
    char::from_digit((10 - sum % 10) % 10, 10)
}
