//! Field parsers.
//!
//! Each parser turns one raw string into its normalized value. A value that
//! is empty after cleaning comes back as `Ok(None)`; whether that is an
//! error is decided by the schema, not here.

use crate::constants::{CURRENCY_SCALE, CURRENCY_SYMBOL};
use crate::error::ParseError;
use crate::types::Currency;
use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use rust_decimal::{Decimal, RoundingStrategy};
use std::str::FromStr;

static NUMBER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[+-]?(\d+\.?\d*|\.\d+)([eE][+-]?\d+)?$").expect("valid number regex")
});

/// Parse a `DDMMYYYY` birth date.
///
/// The year is the last four digits and the month the two before it. The day
/// is whatever remains, so the unpadded `DMMYYYY` form found in real member
/// files is accepted too.
pub fn parse_date(field: &str, raw: &str) -> Result<Option<NaiveDate>, ParseError> {
    let s = raw.trim();
    if s.is_empty() {
        return Ok(None);
    }
    if !s.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ParseError::new(field, raw, "expected digits only (DDMMYYYY)"));
    }
    if s.len() != 7 && s.len() != 8 {
        return Err(ParseError::new(
            field,
            raw,
            format!("expected 8 digits (DDMMYYYY), got {}", s.len()),
        ));
    }

    let (day, rest) = s.split_at(s.len() - 6);
    let (month, year) = rest.split_at(2);
    // Digits only, so these cannot fail
    let day: u32 = day.parse().map_err(|_| ParseError::new(field, raw, "bad day"))?;
    let month: u32 = month.parse().map_err(|_| ParseError::new(field, raw, "bad month"))?;
    let year: i32 = year.parse().map_err(|_| ParseError::new(field, raw, "bad year"))?;

    if year == 0 {
        return Err(ParseError::new(field, raw, "not a calendar date"));
    }
    NaiveDate::from_ymd_opt(year, month, day)
        .map(Some)
        .ok_or_else(|| ParseError::new(field, raw, "not a calendar date"))
}

/// Parse a plain numeric amount into a [`Currency`].
///
/// Amounts are rounded to four fractional digits with round-half-to-even.
pub fn parse_currency(field: &str, raw: &str) -> Result<Option<Currency>, ParseError> {
    let s = raw.trim();
    if s.is_empty() {
        return Ok(None);
    }
    if !NUMBER.is_match(s) {
        return Err(ParseError::new(field, raw, "not a number"));
    }

    let parsed = if s.contains(['e', 'E']) {
        scientific(s)
    } else {
        Decimal::from_str(&plain_decimal(s)).map_err(|e| e.to_string())
    }
    .map_err(|reason| ParseError::new(field, raw, reason))?;

    let mut amount =
        parsed.round_dp_with_strategy(CURRENCY_SCALE, RoundingStrategy::MidpointNearestEven);
    amount.rescale(CURRENCY_SCALE);
    // rescale drops digits instead of overflowing the 96-bit mantissa
    if amount.scale() != CURRENCY_SCALE {
        return Err(ParseError::new(field, raw, "amount too large for 4-digit scale"));
    }
    if amount.is_zero() {
        amount.set_sign_positive(true);
    }

    Ok(Some(Currency {
        display: format_currency(&amount),
        amount,
    }))
}

// Exponents past Decimal's 28-digit scale are only accepted when the value
// is below 10^-5, which rounds to zero at four digits anyway.
fn scientific(s: &str) -> Result<Decimal, String> {
    let err = match Decimal::from_scientific(s) {
        Ok(d) => return Ok(d),
        Err(e) => e.to_string(),
    };
    let Some((mantissa, exponent)) = s.split_once(['e', 'E']) else {
        return Err(err);
    };
    let exponent: i64 = exponent.parse().map_err(|_| err.clone())?;
    let int_digits = mantissa
        .trim_start_matches(['+', '-'])
        .split('.')
        .next()
        .unwrap_or("")
        .trim_start_matches('0')
        .len() as i64;
    if int_digits + exponent <= -5 {
        Ok(Decimal::ZERO)
    } else {
        Err(err)
    }
}

// "5." -> "5", ".5" -> "0.5"
fn plain_decimal(s: &str) -> String {
    let (sign, body) = match s.strip_prefix(['+', '-']) {
        Some(body) => (&s[..1], body),
        None => ("", s),
    };
    let body = body.strip_suffix('.').unwrap_or(body);
    let sign = if sign == "+" { "" } else { sign };
    if body.starts_with('.') {
        format!("{sign}0{body}")
    } else {
        format!("{sign}{body}")
    }
}

/// Render an amount as `$1,234.5679`. Negative amounts keep the symbol first: `$-12.0000`.
pub fn format_currency(amount: &Decimal) -> String {
    let unsigned = amount.abs().to_string();
    let (int_part, frac_part) = unsigned.split_once('.').unwrap_or((unsigned.as_str(), ""));
    let sign = if amount.is_sign_negative() && !amount.is_zero() { "-" } else { "" };
    let grouped = group_thousands(int_part);

    if frac_part.is_empty() {
        format!("{CURRENCY_SYMBOL}{sign}{grouped}")
    } else {
        format!("{CURRENCY_SYMBOL}{sign}{grouped}.{frac_part}")
    }
}

fn group_thousands(digits: &str) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Cleanse a first or last name.
///
/// Leading non-alphabetic characters and trailing whitespace are removed,
/// then the name is capitalised (first letter upper-case, the rest lower-case).
pub fn parse_name(_field: &str, raw: &str) -> Result<Option<String>, ParseError> {
    let name = raw
        .trim_start_matches(|c: char| !c.is_ascii_alphabetic())
        .trim_end();

    let mut chars = name.chars();
    let Some(first) = chars.next() else {
        return Ok(None);
    };
    let capitalised: String = first.to_uppercase().chain(chars.as_str().to_lowercase().chars()).collect();
    Ok(Some(capitalised))
}

/// Trimmed pass-through.
pub fn parse_text(_field: &str, raw: &str) -> Result<Option<String>, ParseError> {
    let s = raw.trim();
    Ok((!s.is_empty()).then(|| s.to_string()))
}

/// Digit strings such as phone numbers and postcodes.
///
/// Internal whitespace is dropped; the result stays a string so leading zeros survive.
pub fn parse_numeric(field: &str, raw: &str) -> Result<Option<String>, ParseError> {
    let digits: String = raw.chars().filter(|c| !c.is_whitespace()).collect();
    if digits.is_empty() {
        return Ok(None);
    }
    if !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ParseError::new(field, raw, "expected digits only"));
    }
    Ok(Some(digits))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(raw: &str) -> Result<Option<String>, ParseError> {
        parse_date("dob", raw).map(|d| d.map(|d| d.format("%Y-%m-%d").to_string()))
    }

    fn currency(raw: &str) -> Option<(String, String)> {
        parse_currency("salary", raw)
            .unwrap()
            .map(|c| (c.amount.to_string(), c.display))
    }

    #[test]
    fn test_parse_date_valid() {
        assert_eq!(date("01012020").unwrap().as_deref(), Some("2020-01-01"));
        assert_eq!(date("11122021").unwrap().as_deref(), Some("2021-12-11"));
        assert_eq!(date("29022020").unwrap().as_deref(), Some("2020-02-29"));
        assert_eq!(date(" 01011990 ").unwrap().as_deref(), Some("1990-01-01"));
    }

    #[test]
    fn test_parse_date_unpadded_day() {
        assert_eq!(date("1011970").unwrap().as_deref(), Some("1970-01-01"));
    }

    #[test]
    fn test_parse_date_invalid() {
        for raw in ["31022020", "31042021", "01311950", "122190", "123456789", "0101199a", "00012020", "01010000"] {
            let err = date(raw).unwrap_err();
            assert_eq!(err.field, "dob");
            assert_eq!(err.raw, raw);
        }
    }

    #[test]
    fn test_parse_date_empty_is_absent() {
        assert_eq!(date("").unwrap(), None);
        assert_eq!(date("   ").unwrap(), None);
    }

    #[test]
    fn test_parse_currency_rounds_to_four_digits() {
        assert_eq!(currency("1234.56789"), Some(("1234.5679".into(), "$1,234.5679".into())));
        assert_eq!(currency("1112.2021"), Some(("1112.2021".into(), "$1,112.2021".into())));
        assert_eq!(currency("101"), Some(("101.0000".into(), "$101.0000".into())));
        assert_eq!(currency("5122190."), Some(("5122190.0000".into(), "$5,122,190.0000".into())));
        assert_eq!(currency("0"), Some(("0.0000".into(), "$0.0000".into())));
        assert_eq!(currency("50000.5"), Some(("50000.5000".into(), "$50,000.5000".into())));
    }

    #[test]
    fn test_parse_currency_half_to_even() {
        assert_eq!(currency("0.00005").unwrap().0, "0.0000");
        assert_eq!(currency("0.00015").unwrap().0, "0.0002");
        assert_eq!(currency("2.00025").unwrap().0, "2.0002");
    }

    #[test]
    fn test_parse_currency_other_forms() {
        assert_eq!(currency(".5").unwrap().1, "$0.5000");
        assert_eq!(currency("+12").unwrap().1, "$12.0000");
        assert_eq!(currency("-1234.5").unwrap().1, "$-1,234.5000");
        assert_eq!(currency("1.5e3").unwrap().1, "$1,500.0000");
        assert_eq!(currency("-0").unwrap().1, "$0.0000");
        assert_eq!(currency("1e-30").unwrap().0, "0.0000");
        assert_eq!(currency("-2.5E-40").unwrap().1, "$0.0000");
    }

    #[test]
    fn test_parse_currency_invalid() {
        for raw in [
            "01311950a",
            "abc",
            "1,000",
            "$100",
            "1.2.3",
            ".",
            "12345678901234567890123456",
            "99999999999999999999999999.99995",
            "1e40",
        ] {
            assert!(parse_currency("salary", raw).is_err(), "{raw} should fail");
        }
        assert_eq!(parse_currency("salary", "").unwrap(), None);
    }

    #[test]
    fn test_group_thousands() {
        assert_eq!(group_thousands("1"), "1");
        assert_eq!(group_thousands("123"), "123");
        assert_eq!(group_thousands("1234"), "1,234");
        assert_eq!(group_thousands("123456"), "123,456");
        assert_eq!(group_thousands("1234567"), "1,234,567");
    }

    #[test]
    fn test_parse_name() {
        let name = |raw: &str| parse_name("first", raw).unwrap();
        assert_eq!(name(" york ").as_deref(), Some("York"));
        assert_eq!(name("- York-").as_deref(), Some("York-"));
        assert_eq!(name("123York  ").as_deref(), Some("York"));
        assert_eq!(name("YORK").as_deref(), Some("York"));
        assert_eq!(name("   "), None);
        assert_eq!(name("1231-^12 3 "), None);
        assert_eq!(name(""), None);
    }

    #[test]
    fn test_parse_text_and_numeric() {
        assert_eq!(parse_text("email", "  a@b.com ").unwrap().as_deref(), Some("a@b.com"));
        assert_eq!(parse_text("email", "  ").unwrap(), None);
        assert_eq!(parse_numeric("phone", "0298765432").unwrap().as_deref(), Some("0298765432"));
        assert_eq!(parse_numeric("mobile", " 0404 123 456 ").unwrap().as_deref(), Some("0404123456"));
        assert!(parse_numeric("post", "20O0").is_err());
    }
}
