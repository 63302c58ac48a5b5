//! Account membership
//!
//! Ordered set of markets an owner has entered, plus reward accruals that
//! are not tied to any single market.

use anchor_lang::prelude::*;
use crate::constants::{PROGRAM_SEED_PREFIX, MAX_ENTERED_MARKETS, MAX_REWARD_TOKENS};
use crate::errors::RejectCode;
use crate::math::checked_add;

/// PDA Seeds: [PROGRAM_SEED_PREFIX, b"membership", owner]
#[account]
#[derive(Default)]
pub struct AccountMembership {
    pub bump: u8,

    pub owner: Pubkey,

    /// Number of live entries in `entered_markets`
    pub entered_count: u8,

    /// Entered markets in entry order
    pub entered_markets: [Pubkey; MAX_ENTERED_MARKETS],

    /// Accrued but unclaimed rewards per reward type
    pub reward_accrued: [u128; MAX_REWARD_TOKENS],

    pub reserved: [u8; 32],
}

impl AccountMembership {
    pub const SEED: &'static [u8] = b"membership";

    pub fn space() -> usize {
        8 +                                 // discriminator
        1 +                                 // bump
        32 +                                // owner
        1 +                                 // entered_count
        (32 * MAX_ENTERED_MARKETS) +        // entered_markets
        (16 * MAX_REWARD_TOKENS) +          // reward_accrued
        32                                  // reserved
    }

    pub fn entered(&self) -> &[Pubkey] {
        &self.entered_markets[..self.entered_count as usize]
    }

    pub fn is_member(&self, market: &Pubkey) -> bool {
        self.entered().contains(market)
    }

    /// Add a market to the entered set.
    ///
    /// Entering an already-entered market is a no-op. `cap` is the
    /// comptroller's effective max assets.
    pub fn enter(&mut self, market: Pubkey, cap: usize) -> RejectCode {
        if self.is_member(&market) {
            return RejectCode::NoError;
        }
        let count = self.entered_count as usize;
        if count >= cap || count >= MAX_ENTERED_MARKETS {
            return RejectCode::TooManyAssets;
        }
        self.entered_markets[count] = market;
        self.entered_count += 1;
        RejectCode::NoError
    }

    /// Remove a market, preserving the order of the remaining entries.
    /// Returns false when the market was not entered.
    pub fn leave(&mut self, market: &Pubkey) -> bool {
        let count = self.entered_count as usize;
        let Some(idx) = self.entered().iter().position(|m| m == market) else {
            return false;
        };
        self.entered_markets.copy_within(idx + 1..count, idx);
        self.entered_markets[count - 1] = Pubkey::default();
        self.entered_count -= 1;
        true
    }

    pub fn accrue_reward(&mut self, reward_type: usize, amount: u128) -> Result<()> {
        self.reward_accrued[reward_type] = checked_add(self.reward_accrued[reward_type], amount)?;
        Ok(())
    }
}

/// Derive membership PDA
pub fn derive_membership(program_id: &Pubkey, owner: &Pubkey) -> (Pubkey, u8) {
    Pubkey::find_program_address(
        &[PROGRAM_SEED_PREFIX, AccountMembership::SEED, owner.as_ref()],
        program_id,
    )
}
