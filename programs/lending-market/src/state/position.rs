//! Position state account
//!
//! One account per owner per market, tracking the owner's supply shares,
//! borrow principal and reward index snapshots for that market.

use anchor_lang::prelude::*;
use crate::constants::{PROGRAM_SEED_PREFIX, MAX_REWARD_TOKENS};
use crate::math::PackedU256;

/// Owner position in a specific market
///
/// PDA Seeds: [PROGRAM_SEED_PREFIX, b"position", market, owner]
#[account]
#[derive(Default)]
pub struct Position {
    /// PDA bump seed
    pub bump: u8,

    /// Market this position belongs to
    pub market: Pubkey,

    /// Position owner
    pub owner: Pubkey,

    /// Supply shares (earn interest through the exchange rate)
    pub shares: u128,

    /// Borrow balance at the last snapshot
    pub borrow_principal: u128,

    /// Market borrow index when the principal was snapshotted
    pub borrow_index_snapshot: u128,

    /// Supply-side reward index snapshot per reward type
    pub supplier_reward_index: [PackedU256; MAX_REWARD_TOKENS],

    /// Borrow-side reward index snapshot per reward type
    pub borrower_reward_index: [PackedU256; MAX_REWARD_TOKENS],

    /// Reserved for future use
    pub reserved: [u8; 32],
}

impl Position {
    pub const SEED: &'static [u8] = b"position";

    pub fn space() -> usize {
        8 +                             // discriminator
        1 +                             // bump
        32 +                            // market
        32 +                            // owner
        16 +                            // shares
        16 +                            // borrow_principal
        16 +                            // borrow_index_snapshot
        (PackedU256::SIZE * MAX_REWARD_TOKENS) +    // supplier_reward_index
        (PackedU256::SIZE * MAX_REWARD_TOKENS) +    // borrower_reward_index
        32                              // reserved
    }

    pub fn new(market: Pubkey, owner: Pubkey, bump: u8) -> Self {
        Self { bump, market, owner, ..Self::default() }
    }

    pub fn is_empty(&self) -> bool {
        self.shares == 0 && !self.has_debt()
    }

    pub fn has_debt(&self) -> bool {
        self.borrow_principal > 0
    }
}

/// Derive position PDA
pub fn derive_position(
    program_id: &Pubkey,
    market: &Pubkey,
    owner: &Pubkey,
) -> (Pubkey, u8) {
    Pubkey::find_program_address(
        &[
            PROGRAM_SEED_PREFIX,
            Position::SEED,
            market.as_ref(),
            owner.as_ref(),
        ],
        program_id,
    )
}
