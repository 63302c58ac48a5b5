//! Liquidation seize math

use anchor_lang::prelude::*;
use crate::errors::RejectCode;
use crate::math::{mul_div_down, wad_div_down, wad_mul_down};
use crate::constants::WAD;

/// Collateral shares owed to the liquidator for `repay_amount` of debt.
///
/// `seize = repay * price_borrowed * incentive / (price_collateral * exchange_rate)`,
/// each step truncated so rounding never costs the protocol.
pub fn liquidate_calculate_seize_tokens(
    price_borrowed: u128,
    price_collateral: u128,
    collateral_exchange_rate: u128,
    liquidation_incentive: u128,
    repay_amount: u128,
) -> Result<(RejectCode, u128)> {
    if price_borrowed == 0 || price_collateral == 0 {
        return Ok((RejectCode::PriceError, 0));
    }

    let numerator = wad_mul_down(liquidation_incentive, price_borrowed)?;
    let denominator = wad_mul_down(price_collateral, collateral_exchange_rate)?;
    if denominator == 0 {
        return Ok((RejectCode::MathError, 0));
    }
    let ratio = wad_div_down(numerator, denominator)?;
    let seize_tokens = mul_div_down(ratio, repay_amount, WAD)?;

    Ok((RejectCode::NoError, seize_tokens))
}
