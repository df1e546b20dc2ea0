//! Validation of payment form fields.
//!
//! These checks back the inline indicators of the form: they never fail,
//! they only say whether a value is acceptable.

use rust_decimal::Decimal;
use std::str::FromStr;

/// Longest variable symbol, in digits.
pub const VARIABLE_SYMBOL_MAX_LEN: usize = 10;
/// Longest constant symbol, in digits.
pub const CONSTANT_SYMBOL_MAX_LEN: usize = 4;
/// Longest specific symbol, in digits.
pub const SPECIFIC_SYMBOL_MAX_LEN: usize = 10;

/// Check that a string is a positive amount of money.
///
/// The empty string is accepted (nothing entered yet). Only digits and a
/// `.` or `,` decimal separator are allowed, the value must be greater than
/// zero and at most two decimal places may be written.
pub fn is_valid_amount(amount: &str) -> bool {
    if amount.is_empty() {
        return true;
    }

    if !amount
        .chars()
        .all(|ch| ch.is_ascii_digit() || ch == '.' || ch == ',')
    {
        return false;
    }

    match parse_amount(amount) {
        Some(value) => value > Decimal::ZERO && value.scale() <= 2,
        None => false,
    }
}

/// Parse an amount, accepting `,` as decimal separator.
///
/// The scale of the result is the number of decimals as written, so
/// `"1.50"` keeps its trailing zero.
pub fn parse_amount(amount: &str) -> Option<Decimal> {
    let normalized = amount.trim().replace(',', ".");
    if !normalized.chars().any(|ch| ch.is_ascii_digit()) || normalized.matches('.').count() > 1 {
        return None;
    }
    Decimal::from_str(&normalized).ok()
}

/// Amount of a confirmed form: non-empty and accepted by [`is_valid_amount`].
pub fn payment_amount(amount: &str) -> Option<Decimal> {
    if amount.is_empty() || !is_valid_amount(amount) {
        return None;
    }
    parse_amount(amount)
}

/// Check that a string is a non-empty run of ASCII digits.
pub fn is_numeric(num: &str) -> bool {
    !num.is_empty() && num.chars().all(|ch| ch.is_ascii_digit())
}

fn is_valid_symbol(symbol: &str, max_len: usize) -> bool {
    symbol.is_empty() || (is_numeric(symbol) && symbol.len() <= max_len)
}

/// Variable symbol: optional, up to 10 digits.
pub fn is_valid_variable_symbol(symbol: &str) -> bool {
    is_valid_symbol(symbol, VARIABLE_SYMBOL_MAX_LEN)
}

/// Constant symbol: optional, up to 4 digits.
pub fn is_valid_constant_symbol(symbol: &str) -> bool {
    is_valid_symbol(symbol, CONSTANT_SYMBOL_MAX_LEN)
}

/// Specific symbol: optional, up to 10 digits.
pub fn is_valid_specific_symbol(symbol: &str) -> bool {
    is_valid_symbol(symbol, SPECIFIC_SYMBOL_MAX_LEN)
}
