//! Liquidator allow-list entry

use anchor_lang::prelude::*;
use crate::constants::PROGRAM_SEED_PREFIX;

/// PDA Seeds: [PROGRAM_SEED_PREFIX, b"liquidator", liquidator]
#[account]
#[derive(Default)]
pub struct AllowedLiquidator {
    pub bump: u8,
    pub liquidator: Pubkey,
    pub allowed: bool,
}

impl AllowedLiquidator {
    pub const SEED: &'static [u8] = b"liquidator";

    pub fn space() -> usize {
        8 + 1 + 32 + 1
    }

    pub fn is_allowed(&self, liquidator: &Pubkey) -> bool {
        self.allowed && self.liquidator == *liquidator
    }
}

/// Derive allow-list entry PDA
pub fn derive_allowed_liquidator(program_id: &Pubkey, liquidator: &Pubkey) -> (Pubkey, u8) {
    Pubkey::find_program_address(
        &[PROGRAM_SEED_PREFIX, AllowedLiquidator::SEED, liquidator.as_ref()],
        program_id,
    )
}
