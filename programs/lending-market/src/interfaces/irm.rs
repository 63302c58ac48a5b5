//! Interest Rate Model interface
//!
//! The jump-rate model returns a borrow rate per second (scaled 1e18 = WAD).
//!
//! Example: 5% APY ≈ 1.58e-9 per second = 1_585_489_599 when scaled by WAD

use anchor_lang::prelude::*;
use crate::constants::{WAD, SECONDS_PER_YEAR, MAX_BORROW_RATE_PER_SECOND};
use crate::errors::LendingError;
use crate::math::{checked_add, checked_sub, mul_div_down, wad_mul_down};

/// Kinked (jump) rate curve configuration
///
/// PDA Seeds: [PROGRAM_SEED_PREFIX, b"rate_model", id]
#[account]
#[derive(Default)]
pub struct JumpRateModel {
    pub bump: u8,

    /// Caller-chosen identifier, part of the PDA seeds
    pub id: u64,

    /// Owner who can update parameters
    pub owner: Pubkey,

    /// Rate at 0% utilization (per second, WAD-scaled)
    pub base_rate_per_second: u128,

    /// Slope below the kink (per second, WAD-scaled)
    pub multiplier_per_second: u128,

    /// Slope above the kink (per second, WAD-scaled)
    pub jump_multiplier_per_second: u128,

    /// Utilization point where the jump multiplier starts (WAD-scaled)
    pub kink: u128,
}

impl JumpRateModel {
    pub const SEED: &'static [u8] = b"rate_model";

    pub fn space() -> usize {
        8 +     // discriminator
        1 +     // bump
        8 +     // id
        32 +    // owner
        16 * 4  // rate parameters
    }

    /// Store yearly parameters as per-second rates
    pub fn set_parameters(
        &mut self,
        base_rate_per_year: u128,
        multiplier_per_year: u128,
        jump_multiplier_per_year: u128,
        kink: u128,
    ) -> Result<()> {
        require!(kink <= WAD, LendingError::InvalidRateParameters);
        self.base_rate_per_second = base_rate_per_year / SECONDS_PER_YEAR;
        self.multiplier_per_second = multiplier_per_year / SECONDS_PER_YEAR;
        self.jump_multiplier_per_second = jump_multiplier_per_year / SECONDS_PER_YEAR;
        self.kink = kink;
        Ok(())
    }

    /// Borrow utilization: borrows / (cash + borrows - reserves)
    pub fn utilization_rate(cash: u128, borrows: u128, reserves: u128) -> Result<u128> {
        if borrows == 0 {
            return Ok(0);
        }
        let gross = checked_add(cash, borrows)?;
        if reserves >= gross {
            return Ok(0);
        }
        mul_div_down(borrows, WAD, gross - reserves)
    }

    /// Uncapped borrow rate per second
    pub fn get_borrow_rate(&self, cash: u128, borrows: u128, reserves: u128) -> Result<u128> {
        let utilization = Self::utilization_rate(cash, borrows, reserves)?;

        if utilization <= self.kink {
            let variable = wad_mul_down(utilization, self.multiplier_per_second)?;
            return checked_add(self.base_rate_per_second, variable);
        }

        let normal_rate = checked_add(
            self.base_rate_per_second,
            wad_mul_down(self.kink, self.multiplier_per_second)?,
        )?;
        let excess = checked_sub(utilization, self.kink)?;
        checked_add(normal_rate, wad_mul_down(excess, self.jump_multiplier_per_second)?)
    }

    /// Borrow rate used for accrual, capped at MAX_BORROW_RATE_PER_SECOND
    pub fn accrual_rate(&self, cash: u128, borrows: u128, reserves: u128) -> Result<u128> {
        let rate = self.get_borrow_rate(cash, borrows, reserves)?;
        Ok(std::cmp::min(rate, MAX_BORROW_RATE_PER_SECOND))
    }

    /// Supply rate per second: utilization * borrow_rate * (1 - reserve_factor)
    pub fn get_supply_rate(
        &self,
        cash: u128,
        borrows: u128,
        reserves: u128,
        reserve_factor: u128,
    ) -> Result<u128> {
        let one_minus_reserve_factor = checked_sub(WAD, reserve_factor)?;
        let borrow_rate = self.accrual_rate(cash, borrows, reserves)?;
        let rate_to_pool = wad_mul_down(borrow_rate, one_minus_reserve_factor)?;
        let utilization = Self::utilization_rate(cash, borrows, reserves)?;
        wad_mul_down(utilization, rate_to_pool)
    }
}

// Example configurations:
//
// STABLE (USDC lending):
//   base_rate:  0.00e18
//   multiplier: 0.05e18  (5% at the kink)
//   jump:       1.09e18
//   kink:       0.80e18
//
// VOLATILE (ETH lending):
//   base_rate:  0.02e18
//   multiplier: 0.10e18
//   jump:       1.00e18
//   kink:       0.70e18
