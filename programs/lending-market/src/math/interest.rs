//! Interest accrual logic for lending markets
//!
//! Interest is simple over the elapsed interval and compounds across
//! accruals through the borrow index.

use anchor_lang::prelude::*;
use crate::state::Market;
use super::safe_math::{checked_add, checked_mul, elapsed_seconds};
use super::wad::wad_mul_down;

/// Result of interest accrual
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccrualResult {
    /// Seconds covered by this accrual
    pub elapsed: u128,
    /// Per-second borrow rate used (WAD-scaled)
    pub borrow_rate: u128,
    /// Interest added to total borrows (underlying units)
    pub interest: u128,
    /// Portion of the interest added to reserves
    pub reserves_added: u128,
}

impl AccrualResult {
    fn noop() -> Self {
        Self { elapsed: 0, borrow_rate: 0, interest: 0, reserves_added: 0 }
    }
}

/// Accrue interest on a market
///
/// MUST be called before any operation that reads/writes market totals.
/// Calling it twice in the same instant is a no-op.
///
/// # Arguments
/// * `market` - Market account to accrue interest on
/// * `current_time` - Current Unix timestamp
/// * `borrow_rate` - Per-second borrow rate from the rate model (WAD-scaled)
pub fn accrue_interest_on_market(
    market: &mut Market,
    current_time: i64,
    borrow_rate: u128,
) -> Result<AccrualResult> {
    let elapsed = elapsed_seconds(market.accrual_timestamp, current_time);
    if elapsed == 0 {
        return Ok(AccrualResult::noop());
    }

    let simple_interest_factor = checked_mul(borrow_rate, elapsed)?;
    let interest = wad_mul_down(simple_interest_factor, market.total_borrows)?;
    let reserves_added = wad_mul_down(market.reserve_factor, interest)?;
    let index_delta = wad_mul_down(simple_interest_factor, market.borrow_index)?;

    market.total_borrows = checked_add(market.total_borrows, interest)?;
    market.total_reserves = checked_add(market.total_reserves, reserves_added)?;
    market.borrow_index = checked_add(market.borrow_index, index_delta)?;
    market.accrual_timestamp = current_time;

    Ok(AccrualResult { elapsed, borrow_rate, interest, reserves_added })
}
