//! Permissionless accrual and read-only views
//!
//! Views emit an event and set the same values as return data
//! (little-endian, in event field order).

use anchor_lang::prelude::*;
use anchor_lang::solana_program::program::set_return_data;
use crate::constants::PROGRAM_SEED_PREFIX;
use crate::errors::LendingError;
use crate::events::{AccountLiquidity, AccountSnapshot, MarketState};
use crate::interfaces::JumpRateModel;
use crate::risk::account_liquidity;
use crate::state::{AccountMembership, Comptroller, Market, Position};
use super::loader::{accrue_market, load_account_snapshots};

fn return_words(words: &[u128]) {
    let data: Vec<u8> = words.iter().flat_map(|w| w.to_le_bytes()).collect();
    set_return_data(&data);
}

// ============================================================================
// Accrue Interest (Public)
// ============================================================================

#[derive(Accounts)]
pub struct AccrueInterest<'info> {
    #[account(
        mut,
        seeds = [PROGRAM_SEED_PREFIX, Market::SEED, market.underlying_mint.as_ref()],
        bump = market.bump,
    )]
    pub market: Box<Account<'info, Market>>,

    #[account(address = market.interest_rate_model @ LendingError::InvalidRateModel)]
    pub rate_model: Box<Account<'info, JumpRateModel>>,
}

pub fn accrue_interest_ix(ctx: Context<AccrueInterest>) -> Result<()> {
    require!(!ctx.accounts.market.is_locked(), LendingError::MarketLocked);
    let now = Clock::get()?.unix_timestamp;
    let key = ctx.accounts.market.key();
    accrue_market(key, &mut ctx.accounts.market, &ctx.accounts.rate_model, now)
}

// ============================================================================
// Account Liquidity
// ============================================================================

#[derive(Accounts)]
pub struct GetAccountLiquidity<'info> {
    #[account(
        seeds = [PROGRAM_SEED_PREFIX, Comptroller::SEED],
        bump = comptroller.bump,
    )]
    pub comptroller: Box<Account<'info, Comptroller>>,

    #[account(
        seeds = [PROGRAM_SEED_PREFIX, AccountMembership::SEED, membership.owner.as_ref()],
        bump = membership.bump,
    )]
    pub membership: Box<Account<'info, AccountMembership>>,
    // remaining_accounts: (market, position, price_feed) per entered market
}

/// Liquidity at the markets' stored state; accrue them first for current values
pub fn get_account_liquidity<'info>(
    ctx: Context<'_, '_, 'info, 'info, GetAccountLiquidity<'info>>,
) -> Result<()> {
    let now = Clock::get()?.unix_timestamp;
    let snapshots = load_account_snapshots(
        ctx.program_id,
        &ctx.accounts.comptroller.key(),
        &ctx.accounts.membership,
        ctx.remaining_accounts,
        &[],
        now,
        ctx.accounts.comptroller.max_stale_period,
    )?;
    let liquidity = account_liquidity(&snapshots)?;

    emit!(AccountLiquidity {
        account: ctx.accounts.membership.owner,
        liquidity: liquidity.liquidity,
        shortfall: liquidity.shortfall,
    });
    return_words(&[liquidity.liquidity, liquidity.shortfall]);
    Ok(())
}

// ============================================================================
// Market State
// ============================================================================

#[derive(Accounts)]
pub struct GetMarketState<'info> {
    #[account(
        seeds = [PROGRAM_SEED_PREFIX, Market::SEED, market.underlying_mint.as_ref()],
        bump = market.bump,
    )]
    pub market: Box<Account<'info, Market>>,

    #[account(address = market.interest_rate_model @ LendingError::InvalidRateModel)]
    pub rate_model: Box<Account<'info, JumpRateModel>>,
}

pub fn get_market_state(ctx: Context<GetMarketState>) -> Result<()> {
    let market = &ctx.accounts.market;
    let model = &ctx.accounts.rate_model;

    let state = MarketState {
        market: market.key(),
        exchange_rate: market.exchange_rate_stored()?,
        borrow_rate: market.borrow_rate(model)?,
        supply_rate: market.supply_rate(model)?,
        cash: market.cash,
        total_borrows: market.total_borrows,
        total_reserves: market.total_reserves,
        total_supply_shares: market.total_supply_shares,
    };
    return_words(&[
        state.exchange_rate,
        state.borrow_rate,
        state.supply_rate,
        state.cash,
        state.total_borrows,
        state.total_reserves,
        state.total_supply_shares,
    ]);
    emit!(state);
    Ok(())
}

// ============================================================================
// Account Snapshot
// ============================================================================

#[derive(Accounts)]
pub struct GetAccountSnapshot<'info> {
    #[account(
        seeds = [PROGRAM_SEED_PREFIX, Market::SEED, market.underlying_mint.as_ref()],
        bump = market.bump,
    )]
    pub market: Box<Account<'info, Market>>,

    #[account(
        seeds = [PROGRAM_SEED_PREFIX, Position::SEED, market.key().as_ref(), position.owner.as_ref()],
        bump = position.bump,
    )]
    pub position: Box<Account<'info, Position>>,
}

pub fn get_account_snapshot(ctx: Context<GetAccountSnapshot>) -> Result<()> {
    let market = &ctx.accounts.market;
    let position = &ctx.accounts.position;

    let snapshot = AccountSnapshot {
        market: market.key(),
        account: position.owner,
        shares: position.shares,
        borrow_balance: market.borrow_balance_stored(position)?,
        exchange_rate: market.exchange_rate_stored()?,
        balance_of_underlying: market.balance_of_underlying(position)?,
    };
    return_words(&[
        snapshot.shares,
        snapshot.borrow_balance,
        snapshot.exchange_rate,
        snapshot.balance_of_underlying,
    ]);
    emit!(snapshot);
    Ok(())
}
