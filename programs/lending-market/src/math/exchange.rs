//! Exchange-rate share accounting
//!
//! `exchange_rate = (cash + total_borrows - total_reserves) / total_shares`,
//! falling back to the market's initial exchange rate while no shares exist.
//!
//! ## Rounding Rules (Always favor protocol)
//!
//! | Operation         | Convert            | Rounding |
//! |-------------------|--------------------|----------|
//! | Mint              | amount → shares    | DOWN     |
//! | Redeem (shares)   | shares → amount    | DOWN     |
//! | Redeem (amount)   | amount → shares    | UP       |
//! | Seize to reserves | shares → amount    | DOWN     |

use anchor_lang::prelude::*;
use crate::errors::LendingError;
use super::safe_math::{checked_add, checked_sub};
use super::wad::{wad_div_down, wad_div_up, wad_mul_down};

/// Current exchange rate of shares for underlying (WAD-scaled)
pub fn exchange_rate(
    cash: u128,
    total_borrows: u128,
    total_reserves: u128,
    total_shares: u128,
    initial_exchange_rate: u128,
) -> Result<u128> {
    if total_shares == 0 {
        return Ok(initial_exchange_rate);
    }
    let backing = checked_sub(checked_add(cash, total_borrows)?, total_reserves)?;
    wad_div_down(backing, total_shares)
}

/// Shares minted for a deposit of `amount`
pub fn amount_to_shares_down(amount: u128, exchange_rate: u128) -> Result<u128> {
    require!(exchange_rate > 0, LendingError::DivisionByZero);
    wad_div_down(amount, exchange_rate)
}

/// Shares burned to release exactly `amount`
pub fn amount_to_shares_up(amount: u128, exchange_rate: u128) -> Result<u128> {
    require!(exchange_rate > 0, LendingError::DivisionByZero);
    wad_div_up(amount, exchange_rate)
}

/// Underlying released for `shares`
pub fn shares_to_amount_down(shares: u128, exchange_rate: u128) -> Result<u128> {
    wad_mul_down(shares, exchange_rate)
}
