//! Conversions from raw column text to typed values.
//!
//! All conversions treat an empty input as an absent field. Only
//! [`account`] can fail, when the account structure digit is unknown.

use crate::types::{Account, AccountType, Communication};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::str::FromStr;

/// Number of implied decimals in every CODA amount.
pub const AMOUNT_DECIMALS: usize = 3;

/// Length of the sub-type tag in front of a structured reference.
const STRUCTURED_TAG_LEN: usize = 3;

/// Render a sign digit followed by a zero-padded amount as decimal text.
///
/// `"0000000000500860"` becomes `"500.860"`, `"1000000000500860"` becomes
/// `"-500.860"`. A field whose amount digits are all zero is the
/// "no balance" placeholder and yields `None`, whatever its sign digit.
pub fn amount_text(raw: &str) -> Option<String> {
    let mut chars = raw.chars();
    let sign = chars.next()?;
    let digits = chars.as_str();

    if digits.len() <= AMOUNT_DECIMALS || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    if digits.bytes().all(|b| b == b'0') {
        return None;
    }

    let (integral, decimals) = digits.split_at(digits.len() - AMOUNT_DECIMALS);
    let integral = match integral.trim_start_matches('0') {
        "" => "0",
        stripped => stripped,
    };
    let sign = if sign == '0' { "" } else { "-" };

    Some(format!("{}{}.{}", sign, integral, decimals))
}

/// Typed form of [`amount_text`]; the decimal keeps a scale of three.
pub fn amount(raw: &str) -> Option<Decimal> {
    amount_text(raw).and_then(|text| Decimal::from_str(&text).ok())
}

/// Parse a `DDMMYY` date. Anything else, including `000000`, is absent.
pub fn date(raw: &str) -> Option<NaiveDate> {
    if raw.len() != 6 || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }

    let day = raw.get(0..2)?.parse::<u32>().ok()?;
    let month = raw.get(2..4)?.parse::<u32>().ok()?;
    let year = raw.get(4..6)?.parse::<i32>().ok()?;

    // Assume 2000+ for years < 50, otherwise 1900+
    let full_year = if year < 50 { 2000 + year } else { 1900 + year };

    NaiveDate::from_ymd_opt(full_year, month, day)
}

/// Continuation number of a movement; zero means "not a continuation".
pub fn detail_number(raw: &str) -> Option<u32> {
    raw.parse::<u32>().ok().filter(|n| *n != 0)
}

/// Split a communication into a structured reference or free text.
///
/// A message starting with `1` is structured: the three-character tag is
/// dropped and the whole reference that follows is kept.
pub fn communication(raw: &str) -> Option<Communication> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if raw.starts_with('1') {
        let reference: String = raw.chars().skip(STRUCTURED_TAG_LEN).collect();
        Some(Communication::Structured(reference.trim().to_string()))
    } else {
        Some(Communication::FreeText(raw.to_string()))
    }
}

/// Collapse every run of whitespace into a single space.
pub fn address(raw: &str) -> Option<String> {
    let collapsed = raw.split_whitespace().collect::<Vec<_>>().join(" ");
    non_empty(&collapsed)
}

/// Whether an account column splits into type, filler and number.
pub fn account_is_well_formed(raw: &str) -> bool {
    split_account(raw).is_some()
}

/// Decode an account column into its type and number.
///
/// The number is cut, or right-padded with spaces, to the width of its
/// account type.
///
/// Returns `Ok(None)` when the column is missing or malformed and
/// `Err(digit)` when the type digit is not supported.
pub fn account(raw: &str) -> Result<Option<Account>, String> {
    let Some((digit, number)) = split_account(raw) else {
        return Ok(None);
    };

    let account_type = AccountType::from_digit(digit)?;
    let width = account_type.width();
    let number: String = number.chars().take(width).collect();
    let number = format!("{:<width$}", number, width = width);

    Ok(Some(Account {
        account_type,
        number,
    }))
}

/// Split `T FFF NNN...` into the type character and the number part.
fn split_account(raw: &str) -> Option<(char, &str)> {
    let mut chars = raw.char_indices();
    let (_, digit) = chars.next()?;
    let (start, _) = chars.nth(3)?;
    Some((digit, &raw[start..]))
}

/// Owned copy of a trimmed field, `None` when blank.
pub fn non_empty(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
