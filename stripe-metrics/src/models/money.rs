//! Minor to major currency unit conversion.
//!
//! Aggregation always works on integer minor units; conversion happens only
//! when values leave the engine.

use rust_decimal::Decimal;

const ZERO_DECIMAL_CURRENCIES: &[&str] = &[
    "bif", "clp", "djf", "gnf", "jpy", "kmf", "krw", "mga", "pyg", "rwf", "ugx", "vnd", "vuv",
    "xaf", "xof", "xpf",
];

const THREE_DECIMAL_CURRENCIES: &[&str] = &["bhd", "jod", "kwd", "omr", "tnd"];

/// Number of decimal places between the minor and the major unit.
pub fn minor_unit_exponent(currency: &str) -> u32 {
    let currency = currency.to_ascii_lowercase();
    if ZERO_DECIMAL_CURRENCIES.contains(&currency.as_str()) {
        0
    } else if THREE_DECIMAL_CURRENCIES.contains(&currency.as_str()) {
        3
    } else {
        2
    }
}

/// Exact decimal value of `minor` units.
pub fn to_major_units(minor: i64, exponent: u32) -> Decimal {
    Decimal::new(minor, exponent)
}
