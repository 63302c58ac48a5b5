//! Reserve instructions
//!
//! Anyone may add reserves; only the admin may withdraw them.

use anchor_lang::prelude::*;
use anchor_spl::token_interface::{Mint, TokenAccount, TokenInterface};
use crate::constants::PROGRAM_SEED_PREFIX;
use crate::errors::LendingError;
use crate::events::{ReservesAdded, ReservesReduced};
use crate::interfaces::JumpRateModel;
use crate::state::{Comptroller, Market};
use super::loader::{accrue_market, transfer_in, transfer_out};

// ============================================================================
// Add Reserves
// ============================================================================

#[derive(Accounts)]
pub struct AddReserves<'info> {
    #[account(mut)]
    pub benefactor: Signer<'info>,

    #[account(
        mut,
        seeds = [PROGRAM_SEED_PREFIX, Market::SEED, market.underlying_mint.as_ref()],
        bump = market.bump,
    )]
    pub market: Box<Account<'info, Market>>,

    #[account(address = market.interest_rate_model @ LendingError::InvalidRateModel)]
    pub rate_model: Box<Account<'info, JumpRateModel>>,

    #[account(address = market.underlying_mint @ LendingError::InvalidMint)]
    pub underlying_mint: Box<InterfaceAccount<'info, Mint>>,

    #[account(
        mut,
        constraint = benefactor_token_account.mint == market.underlying_mint @ LendingError::InvalidMint,
    )]
    pub benefactor_token_account: Box<InterfaceAccount<'info, TokenAccount>>,

    #[account(
        mut,
        seeds = [PROGRAM_SEED_PREFIX, Market::VAULT_SEED, market.key().as_ref()],
        bump = market.vault_bump,
    )]
    pub vault: Box<InterfaceAccount<'info, TokenAccount>>,

    pub token_program: Interface<'info, TokenInterface>,
}

pub fn add_reserves(ctx: Context<AddReserves>, amount: u64) -> Result<()> {
    // ===== CHECKS =====
    require!(amount > 0, LendingError::ZeroAmount);
    let now = Clock::get()?.unix_timestamp;
    let market_key = ctx.accounts.market.key();
    let accounts = &mut *ctx.accounts;

    accounts.market.acquire_lock()?;
    accrue_market(market_key, &mut accounts.market, &accounts.rate_model, now)?;

    // ===== EFFECTS =====
    accounts.market.add_reserves_fresh(amount as u128)?;
    accounts.market.exit(&crate::ID)?;

    // ===== INTERACTIONS =====
    transfer_in(
        accounts.token_program.to_account_info(),
        accounts.benefactor_token_account.to_account_info(),
        accounts.vault.to_account_info(),
        accounts.benefactor.to_account_info(),
        accounts.underlying_mint.to_account_info(),
        amount,
        accounts.underlying_mint.decimals,
    )?;
    accounts.market.release_lock();

    emit!(ReservesAdded {
        market: market_key,
        benefactor: accounts.benefactor.key(),
        amount: amount as u128,
        total_reserves: accounts.market.total_reserves,
    });
    Ok(())
}

// ============================================================================
// Reduce Reserves
// ============================================================================

#[derive(Accounts)]
pub struct ReduceReserves<'info> {
    pub admin: Signer<'info>,

    #[account(
        seeds = [PROGRAM_SEED_PREFIX, Comptroller::SEED],
        bump = comptroller.bump,
        constraint = comptroller.admin == admin.key() @ LendingError::Unauthorized,
    )]
    pub comptroller: Box<Account<'info, Comptroller>>,

    #[account(
        mut,
        seeds = [PROGRAM_SEED_PREFIX, Market::SEED, market.underlying_mint.as_ref()],
        bump = market.bump,
        constraint = market.comptroller == comptroller.key() @ LendingError::ComptrollerMismatch,
    )]
    pub market: Box<Account<'info, Market>>,

    #[account(address = market.interest_rate_model @ LendingError::InvalidRateModel)]
    pub rate_model: Box<Account<'info, JumpRateModel>>,

    #[account(address = market.underlying_mint @ LendingError::InvalidMint)]
    pub underlying_mint: Box<InterfaceAccount<'info, Mint>>,

    #[account(
        mut,
        constraint = receiver_token_account.mint == market.underlying_mint @ LendingError::InvalidMint,
    )]
    pub receiver_token_account: Box<InterfaceAccount<'info, TokenAccount>>,

    #[account(
        mut,
        seeds = [PROGRAM_SEED_PREFIX, Market::VAULT_SEED, market.key().as_ref()],
        bump = market.vault_bump,
    )]
    pub vault: Box<InterfaceAccount<'info, TokenAccount>>,

    pub token_program: Interface<'info, TokenInterface>,
}

pub fn reduce_reserves(ctx: Context<ReduceReserves>, amount: u64) -> Result<()> {
    // ===== CHECKS =====
    require!(amount > 0, LendingError::ZeroAmount);
    let now = Clock::get()?.unix_timestamp;
    let market_key = ctx.accounts.market.key();
    let accounts = &mut *ctx.accounts;

    accounts.market.acquire_lock()?;
    accrue_market(market_key, &mut accounts.market, &accounts.rate_model, now)?;

    // ===== EFFECTS =====
    accounts.market.reduce_reserves_fresh(amount as u128)?;
    accounts.market.exit(&crate::ID)?;

    // ===== INTERACTIONS =====
    let underlying_mint = accounts.market.underlying_mint;
    let bump = [accounts.market.bump];
    let seeds: &[&[u8]] = &[PROGRAM_SEED_PREFIX, Market::SEED, underlying_mint.as_ref(), &bump];

    transfer_out(
        accounts.token_program.to_account_info(),
        accounts.vault.to_account_info(),
        accounts.receiver_token_account.to_account_info(),
        accounts.market.to_account_info(),
        accounts.underlying_mint.to_account_info(),
        &[seeds],
        amount,
        accounts.underlying_mint.decimals,
    )?;
    accounts.market.release_lock();

    emit!(ReservesReduced {
        market: market_key,
        admin: accounts.admin.key(),
        amount: amount as u128,
        total_reserves: accounts.market.total_reserves,
    });
    Ok(())
}
