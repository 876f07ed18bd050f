//! Conversion between decimal token strings and base units.
//!
//! `parse_ether("10")` is `10 * 10^18`; `format_ether` is its inverse and
//! prints the shortest exact decimal (`"0.0001"`, `"10"`).

use ridepay_types::{Allowance, TokenAmount, TOKEN_DECIMALS};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum UnitsError {
    #[error("invalid decimal number: {0:?}")]
    Invalid(String),

    #[error("too many decimal places in {value:?} (max {decimals})")]
    TooPrecise { value: String, decimals: u32 },

    #[error("value out of range: {0}")]
    Overflow(String),
}

/// Parse a non-negative decimal string into base units with `decimals` places.
pub fn parse_units(value: &str, decimals: u32) -> Result<TokenAmount, UnitsError> {
    let trimmed = value.trim();
    let (whole, frac) = match trimmed.split_once('.') {
        Some((w, f)) => (w, f),
        None => (trimmed, ""),
    };
    if (whole.is_empty() && frac.is_empty())
        || !whole.bytes().all(|b| b.is_ascii_digit())
        || !frac.bytes().all(|b| b.is_ascii_digit())
    {
        return Err(UnitsError::Invalid(value.to_string()));
    }

    let frac = frac.trim_end_matches('0');
    if frac.len() > decimals as usize {
        return Err(UnitsError::TooPrecise {
            value: value.to_string(),
            decimals,
        });
    }

    let overflow = || UnitsError::Overflow(value.to_string());
    let scale = 10u128.checked_pow(decimals).ok_or_else(overflow)?;
    let whole_units = if whole.is_empty() {
        0
    } else {
        whole.parse::<u128>().map_err(|_| overflow())?
    };
    let frac_units = if frac.is_empty() {
        0
    } else {
        let digits = frac.parse::<u128>().map_err(|_| overflow())?;
        digits * 10u128.pow(decimals - frac.len() as u32)
    };

    whole_units
        .checked_mul(scale)
        .and_then(|w| w.checked_add(frac_units))
        .map(TokenAmount::new)
        .ok_or_else(overflow)
}

/// `parse_units` with 18 decimals.
pub fn parse_ether(value: &str) -> Result<TokenAmount, UnitsError> {
    parse_units(value, TOKEN_DECIMALS)
}

/// Render base units as a decimal string with `decimals` places, trimmed.
pub fn format_units(raw: u128, decimals: u32) -> String {
    let scale = 10u128.pow(decimals);
    let whole = raw / scale;
    let frac = raw % scale;
    if frac == 0 {
        return whole.to_string();
    }
    let frac_str = format!("{:0width$}", frac, width = decimals as usize);
    format!("{}.{}", whole, frac_str.trim_end_matches('0'))
}

/// `format_units` with 18 decimals.
pub fn format_ether(amount: TokenAmount) -> String {
    format_units(amount.raw(), TOKEN_DECIMALS)
}

/// Format a possibly negative allowance with 18 decimals.
pub fn format_allowance(allowance: Allowance) -> String {
    let raw = allowance.raw();
    let magnitude = format_units(raw.unsigned_abs(), TOKEN_DECIMALS);
    if raw < 0 {
        format!("-{magnitude}")
    } else {
        magnitude
    }
}
