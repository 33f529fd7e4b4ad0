//! Fixed-point rendering of capacities and token amounts.
//!
//! Values arrive as integers in their smallest unit. They are turned into
//! `rust_decimal::Decimal` with the unit's scale, rounded to that scale with
//! `RoundingStrategy::MidpointAwayFromZero`, and printed with trailing zeros
//! trimmed: `1_000_000` DP renders as `"1"`, `300_000` as `"0.3"`. No `f64`
//! anywhere.

use rust_decimal::{Decimal, RoundingStrategy};

use crate::error::CompileError;

/// Shannons per CKB, as a power of ten.
pub const CKB_DECIMALS: u32 = 8;

/// Smallest DP units per DP, as a power of ten.
pub const DP_DECIMALS: u32 = 6;

/// Render `value / 10^decimals` as a trimmed decimal string.
pub fn format_units(value: u64, decimals: u32) -> String {
    let amount = Decimal::from_i128_with_scale(i128::from(value), decimals);
    amount
        .round_dp_with_strategy(decimals, RoundingStrategy::MidpointAwayFromZero)
        .normalize()
        .to_string()
}

pub fn capacity_to_str(shannons: u64) -> String {
    format_units(shannons, CKB_DECIMALS)
}

pub fn dp_to_str(units: u64) -> String {
    format_units(units, DP_DECIMALS)
}

/// Checked sum of integer amounts.
pub fn checked_total(values: impl IntoIterator<Item = u64>, what: &str) -> Result<u64, CompileError> {
    values
        .into_iter()
        .try_fold(0u64, |acc, v| acc.checked_add(v))
        .ok_or_else(|| CompileError::InvalidAmount(format!("{} total overflows u64", what)))
}
