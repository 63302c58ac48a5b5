//! Market state account
//!
//! One account per underlying asset. Holds the interest-bearing ledger
//! (supply shares, borrows, reserves, cash, borrow index), the market's
//! risk parameters and its reward accumulators.

use anchor_lang::prelude::*;
use crate::constants::{PROGRAM_SEED_PREFIX, MAX_REWARD_TOKENS, REPAY_MAX};
use crate::errors::LendingError;
use crate::interfaces::JumpRateModel;
use crate::math::{
    checked_add, checked_sub, mul_div_down, wad_div_down, wad_mul_down,
    exchange_rate, amount_to_shares_down, amount_to_shares_up, shares_to_amount_down,
    accrue_interest_on_market, AccrualResult, PackedU256,
};
use super::position::Position;

/// Per reward token accumulator for one market
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MarketRewardState {
    /// Reward tokens per second shared by suppliers
    pub supply_speed: u64,
    /// Cumulative reward per supply share (1e36)
    pub supply_index: PackedU256,
    pub supply_timestamp: i64,
    /// Reward tokens per second shared by borrowers
    pub borrow_speed: u64,
    /// Cumulative reward per borrow share (1e36)
    pub borrow_index: PackedU256,
    pub borrow_timestamp: i64,
}

impl MarketRewardState {
    pub const SIZE: usize = 8 + PackedU256::SIZE + 8 + 8 + PackedU256::SIZE + 8;
}

/// Redemption request, either side fixed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RedeemAmount {
    Shares(u128),
    Underlying(u128),
}

/// Outcome of a seize on the collateral market
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SeizeResult {
    pub liquidator_shares: u128,
    pub protocol_shares: u128,
    pub protocol_amount: u128,
}

/// Lending market state
///
/// PDA Seeds: [PROGRAM_SEED_PREFIX, b"market", underlying_mint]
#[account]
#[derive(Default)]
pub struct Market {
    /// PDA bump seed
    pub bump: u8,

    /// Comptroller this market is governed by
    pub comptroller: Pubkey,

    /// Stable id (position in the comptroller arena)
    pub market_index: u16,

    // === Immutable Parameters (set at creation) ===

    pub underlying_mint: Pubkey,

    pub underlying_decimals: u8,

    /// Decimals of the supply share unit
    pub share_decimals: u8,

    /// Bump for the underlying vault PDA
    pub vault_bump: u8,

    /// Exchange rate used while no shares exist (WAD)
    pub initial_exchange_rate: u128,

    /// Ledger implementation version
    pub version: u8,

    // === Configuration ===

    pub interest_rate_model: Pubkey,

    pub price_feed: Pubkey,

    pub is_listed: bool,

    /// Fraction of supplied value usable as collateral (WAD)
    pub collateral_factor: u128,

    /// Fraction of interest set aside as reserves (WAD)
    pub reserve_factor: u128,

    /// Fraction of seized shares converted to reserves (WAD)
    pub protocol_seize_share: u128,

    /// Max total borrows, 0 = unlimited
    pub borrow_cap: u128,

    pub mint_paused: bool,

    pub borrow_paused: bool,

    // === Ledger ===

    pub total_supply_shares: u128,

    pub total_borrows: u128,

    pub total_reserves: u128,

    /// Underlying held by the market as tracked by the ledger
    pub cash: u128,

    /// Cumulative borrow interest index (WAD, starts at 1.0)
    pub borrow_index: u128,

    pub accrual_timestamp: i64,

    /// Non-zero while a state-mutating handler is in flight
    pub lock: u8,

    // === Rewards ===

    pub rewards: [MarketRewardState; MAX_REWARD_TOKENS],

    /// Reserved for future use
    pub reserved: [u8; 32],
}

impl Market {
    pub const SEED: &'static [u8] = b"market";
    pub const VAULT_SEED: &'static [u8] = b"vault";

    pub fn space() -> usize {
        8 +     // discriminator
        1 +     // bump
        32 +    // comptroller
        2 +     // market_index
        32 +    // underlying_mint
        1 +     // underlying_decimals
        1 +     // share_decimals
        1 +     // vault_bump
        16 +    // initial_exchange_rate
        1 +     // version
        32 +    // interest_rate_model
        32 +    // price_feed
        1 +     // is_listed
        16 +    // collateral_factor
        16 +    // reserve_factor
        16 +    // protocol_seize_share
        16 +    // borrow_cap
        1 +     // mint_paused
        1 +     // borrow_paused
        16 +    // total_supply_shares
        16 +    // total_borrows
        16 +    // total_reserves
        16 +    // cash
        16 +    // borrow_index
        8 +     // accrual_timestamp
        1 +     // lock
        (MarketRewardState::SIZE * MAX_REWARD_TOKENS) +
        32      // reserved
    }

    // === Lock ===

    pub fn is_locked(&self) -> bool {
        self.lock != 0
    }

    pub fn acquire_lock(&mut self) -> Result<()> {
        require!(!self.is_locked(), LendingError::MarketLocked);
        self.lock = 1;
        Ok(())
    }

    pub fn release_lock(&mut self) {
        self.lock = 0;
    }

    // === Views ===

    pub fn is_fresh(&self, now: i64) -> bool {
        self.accrual_timestamp == now
    }

    pub fn exchange_rate_stored(&self) -> Result<u128> {
        exchange_rate(
            self.cash,
            self.total_borrows,
            self.total_reserves,
            self.total_supply_shares,
            self.initial_exchange_rate,
        )
    }

    /// Outstanding debt of a position at the stored borrow index
    pub fn borrow_balance_stored(&self, position: &Position) -> Result<u128> {
        if position.borrow_principal == 0 {
            return Ok(0);
        }
        mul_div_down(
            position.borrow_principal,
            self.borrow_index,
            position.borrow_index_snapshot,
        )
    }

    pub fn balance_of_underlying(&self, position: &Position) -> Result<u128> {
        shares_to_amount_down(position.shares, self.exchange_rate_stored()?)
    }

    /// Total borrows expressed in index-1.0 units, the borrow-side reward base
    pub fn borrow_reward_base(&self) -> Result<u128> {
        wad_div_down(self.total_borrows, self.borrow_index)
    }

    /// A position's borrow in index-1.0 units
    pub fn borrower_reward_base(&self, position: &Position) -> Result<u128> {
        wad_div_down(self.borrow_balance_stored(position)?, self.borrow_index)
    }

    pub fn borrow_rate(&self, model: &JumpRateModel) -> Result<u128> {
        model.accrual_rate(self.cash, self.total_borrows, self.total_reserves)
    }

    pub fn supply_rate(&self, model: &JumpRateModel) -> Result<u128> {
        model.get_supply_rate(
            self.cash,
            self.total_borrows,
            self.total_reserves,
            self.reserve_factor,
        )
    }

    // === Ledger Operations ===

    /// Bring totals and the borrow index up to `now`
    pub fn accrue_interest(&mut self, model: &JumpRateModel, now: i64) -> Result<AccrualResult> {
        let rate = self.borrow_rate(model)?;
        accrue_interest_on_market(self, now, rate)
    }

    /// Deposit underlying for shares. Returns the shares minted.
    pub fn mint_fresh(&mut self, position: &mut Position, amount: u128) -> Result<u128> {
        require!(amount > 0, LendingError::ZeroAmount);

        let rate = self.exchange_rate_stored()?;
        let shares = amount_to_shares_down(amount, rate)?;
        require!(shares > 0, LendingError::ZeroAmount);

        self.cash = checked_add(self.cash, amount)?;
        self.total_supply_shares = checked_add(self.total_supply_shares, shares)?;
        position.shares = checked_add(position.shares, shares)?;

        Ok(shares)
    }

    /// Resolve a redemption request into (amount, shares) without moving funds
    pub fn redeem_amounts(&self, request: RedeemAmount) -> Result<(u128, u128)> {
        let rate = self.exchange_rate_stored()?;
        let (amount, shares) = match request {
            RedeemAmount::Shares(shares) => (shares_to_amount_down(shares, rate)?, shares),
            RedeemAmount::Underlying(amount) => (amount, amount_to_shares_up(amount, rate)?),
        };
        require!(amount > 0 && shares > 0, LendingError::ZeroAmount);
        Ok((amount, shares))
    }

    /// Burn shares for underlying. Returns (amount, shares).
    pub fn redeem_fresh(
        &mut self,
        position: &mut Position,
        request: RedeemAmount,
    ) -> Result<(u128, u128)> {
        let (amount, shares) = self.redeem_amounts(request)?;

        require!(position.shares >= shares, LendingError::InsufficientBalance);
        require!(self.cash >= amount, LendingError::InsufficientCash);

        position.shares = checked_sub(position.shares, shares)?;
        self.total_supply_shares = checked_sub(self.total_supply_shares, shares)?;
        self.cash = checked_sub(self.cash, amount)?;

        Ok((amount, shares))
    }

    /// Lend `amount` of underlying against the position
    pub fn borrow_fresh(&mut self, position: &mut Position, amount: u128) -> Result<()> {
        require!(amount > 0, LendingError::ZeroAmount);
        require!(self.cash >= amount, LendingError::InsufficientCash);

        let owed = self.borrow_balance_stored(position)?;
        position.borrow_principal = checked_add(owed, amount)?;
        position.borrow_index_snapshot = self.borrow_index;

        self.total_borrows = checked_add(self.total_borrows, amount)?;
        self.cash = checked_sub(self.cash, amount)?;
        Ok(())
    }

    /// Settle debt. `u64::MAX` as `amount` means the full balance.
    /// Returns the amount actually repaid.
    pub fn repay_borrow_fresh(&mut self, position: &mut Position, amount: u128) -> Result<u128> {
        require!(amount > 0, LendingError::ZeroAmount);

        let owed = self.borrow_balance_stored(position)?;
        let repay = if amount == REPAY_MAX as u128 {
            owed
        } else {
            require!(amount <= owed, LendingError::RepayExceedsBalance);
            amount
        };
        require!(repay > 0, LendingError::ZeroAmount);

        position.borrow_principal = checked_sub(owed, repay)?;
        position.borrow_index_snapshot = self.borrow_index;

        // Per-position rounding can leave the sum of balances above the total
        self.total_borrows = self.total_borrows.saturating_sub(repay);
        self.cash = checked_add(self.cash, repay)?;

        Ok(repay)
    }

    pub fn add_reserves_fresh(&mut self, amount: u128) -> Result<()> {
        require!(amount > 0, LendingError::ZeroAmount);
        self.cash = checked_add(self.cash, amount)?;
        self.total_reserves = checked_add(self.total_reserves, amount)?;
        Ok(())
    }

    pub fn reduce_reserves_fresh(&mut self, amount: u128) -> Result<()> {
        require!(amount > 0, LendingError::ZeroAmount);
        require!(self.cash >= amount, LendingError::InsufficientCash);
        require!(self.total_reserves >= amount, LendingError::InsufficientReserves);
        self.cash = checked_sub(self.cash, amount)?;
        self.total_reserves = checked_sub(self.total_reserves, amount)?;
        Ok(())
    }

    /// Move seized shares from borrower to liquidator.
    ///
    /// The protocol share is burned and its underlying value added to
    /// reserves, leaving the exchange rate unchanged up to rounding.
    pub fn seize_fresh(
        &mut self,
        borrower: &mut Position,
        liquidator: &mut Position,
        seize_shares: u128,
    ) -> Result<SeizeResult> {
        require!(borrower.shares >= seize_shares, LendingError::SeizeTooMuch);

        let protocol_shares = wad_mul_down(seize_shares, self.protocol_seize_share)?;
        let liquidator_shares = checked_sub(seize_shares, protocol_shares)?;
        let protocol_amount = wad_mul_down(self.exchange_rate_stored()?, protocol_shares)?;

        borrower.shares = checked_sub(borrower.shares, seize_shares)?;
        liquidator.shares = checked_add(liquidator.shares, liquidator_shares)?;
        self.total_reserves = checked_add(self.total_reserves, protocol_amount)?;
        self.total_supply_shares = checked_sub(self.total_supply_shares, protocol_shares)?;

        Ok(SeizeResult { liquidator_shares, protocol_shares, protocol_amount })
    }
}

/// Derive market PDA
pub fn derive_market(program_id: &Pubkey, underlying_mint: &Pubkey) -> (Pubkey, u8) {
    Pubkey::find_program_address(
        &[PROGRAM_SEED_PREFIX, Market::SEED, underlying_mint.as_ref()],
        program_id,
    )
}

/// Derive underlying vault PDA
pub fn derive_vault(program_id: &Pubkey, market: &Pubkey) -> (Pubkey, u8) {
    Pubkey::find_program_address(
        &[PROGRAM_SEED_PREFIX, Market::VAULT_SEED, market.as_ref()],
        program_id,
    )
}
