//! Borrow and repay instructions
//!
//! CEI Pattern: Checks → Effects → Interactions

use anchor_lang::prelude::*;
use anchor_spl::token_interface::{Mint, TokenAccount, TokenInterface};
use crate::constants::PROGRAM_SEED_PREFIX;
use crate::errors::LendingError;
use crate::events::{self, MarketEntered};
use crate::interfaces::{JumpRateModel, PriceFeed};
use crate::math::safe_u128_to_u64;
use crate::risk::{borrow_allowed, repay_borrow_allowed, AccountMarketSnapshot, RewardClock};
use crate::state::{AccountMembership, Comptroller, Market, Position};
use super::loader::{
    accrue_market, emit_distributed, load_account_snapshots, read_price, transfer_in,
    transfer_out, LiveMarket,
};

// ============================================================================
// Borrow
// ============================================================================

#[derive(Accounts)]
pub struct BorrowUnderlying<'info> {
    #[account(mut)]
    pub owner: Signer<'info>,

    #[account(
        seeds = [PROGRAM_SEED_PREFIX, Comptroller::SEED],
        bump = comptroller.bump,
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

    #[account(address = market.price_feed @ LendingError::InvalidPriceFeed)]
    pub price_feed: Box<Account<'info, PriceFeed>>,

    #[account(
        mut,
        seeds = [PROGRAM_SEED_PREFIX, Position::SEED, market.key().as_ref(), owner.key().as_ref()],
        bump = position.bump,
    )]
    pub position: Box<Account<'info, Position>>,

    #[account(
        mut,
        seeds = [PROGRAM_SEED_PREFIX, AccountMembership::SEED, owner.key().as_ref()],
        bump = membership.bump,
    )]
    pub membership: Box<Account<'info, AccountMembership>>,

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
    // remaining_accounts: (market, position, price_feed) per entered market
}

pub fn borrow<'info>(
    ctx: Context<'_, '_, 'info, 'info, BorrowUnderlying<'info>>,
    amount: u64,
) -> Result<()> {
    // ===== CHECKS =====
    require!(amount > 0, LendingError::ZeroAmount);

    let now = Clock::get()?.unix_timestamp;
    let market_key = ctx.accounts.market.key();
    let borrower = ctx.accounts.owner.key();
    let comptroller_key = ctx.accounts.comptroller.key();
    let max_stale_period = ctx.accounts.comptroller.max_stale_period;
    let cap = ctx.accounts.comptroller.entered_markets_cap();
    let clock = RewardClock {
        reward_tokens: ctx.accounts.comptroller.reward_tokens(),
        now,
    };
    let accounts = &mut *ctx.accounts;

    accounts.market.acquire_lock()?;
    accrue_market(market_key, &mut accounts.market, &accounts.rate_model, now)?;

    let snapshots = load_account_snapshots(
        ctx.program_id,
        &comptroller_key,
        &accounts.membership,
        ctx.remaining_accounts,
        &[LiveMarket {
            key: market_key,
            market: &accounts.market,
            position: &accounts.position,
        }],
        now,
        max_stale_period,
    )?;
    let price = read_price(
        &accounts.price_feed,
        &accounts.price_feed.key(),
        &accounts.market,
        now,
        max_stale_period,
    )?;
    let target = AccountMarketSnapshot::from_state(
        market_key,
        &accounts.market,
        &accounts.position,
        price,
    )?;

    let was_member = accounts.membership.is_member(&market_key);
    let distributed = borrow_allowed(
        &mut accounts.market,
        &mut accounts.position,
        &mut accounts.membership,
        cap,
        &snapshots,
        &target,
        amount as u128,
        clock,
    )?
    .into_result("borrow")?;
    emit_distributed(market_key, borrower, &distributed, true);
    if !was_member {
        emit!(MarketEntered {
            market: market_key,
            account: borrower,
        });
    }

    // ===== EFFECTS =====
    accounts.market.borrow_fresh(&mut accounts.position, amount as u128)?;
    let account_borrows = accounts.market.borrow_balance_stored(&accounts.position)?;
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

    emit!(events::Borrow {
        market: market_key,
        borrower,
        amount: amount as u128,
        account_borrows,
        total_borrows: accounts.market.total_borrows,
    });

    Ok(())
}

// ============================================================================
// Repay
// ============================================================================

#[derive(Accounts)]
pub struct RepayBorrow<'info> {
    #[account(mut)]
    pub payer: Signer<'info>,

    /// CHECK: Borrower whose debt is repaid
    pub borrower: UncheckedAccount<'info>,

    #[account(
        seeds = [PROGRAM_SEED_PREFIX, Comptroller::SEED],
        bump = comptroller.bump,
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

    #[account(
        mut,
        seeds = [PROGRAM_SEED_PREFIX, Position::SEED, market.key().as_ref(), borrower.key().as_ref()],
        bump = position.bump,
    )]
    pub position: Box<Account<'info, Position>>,

    #[account(
        mut,
        seeds = [PROGRAM_SEED_PREFIX, AccountMembership::SEED, borrower.key().as_ref()],
        bump = membership.bump,
    )]
    pub membership: Box<Account<'info, AccountMembership>>,

    #[account(address = market.underlying_mint @ LendingError::InvalidMint)]
    pub underlying_mint: Box<InterfaceAccount<'info, Mint>>,

    #[account(
        mut,
        constraint = payer_token_account.mint == market.underlying_mint @ LendingError::InvalidMint,
    )]
    pub payer_token_account: Box<InterfaceAccount<'info, TokenAccount>>,

    #[account(
        mut,
        seeds = [PROGRAM_SEED_PREFIX, Market::VAULT_SEED, market.key().as_ref()],
        bump = market.vault_bump,
    )]
    pub vault: Box<InterfaceAccount<'info, TokenAccount>>,

    pub token_program: Interface<'info, TokenInterface>,
}

/// Repay the caller's own debt. `u64::MAX` repays the full balance.
pub fn repay_borrow(ctx: Context<RepayBorrow>, amount: u64) -> Result<()> {
    require_keys_eq!(
        ctx.accounts.payer.key(),
        ctx.accounts.borrower.key(),
        LendingError::Unauthorized
    );
    repay_internal(ctx, amount)
}

pub fn repay_borrow_behalf(ctx: Context<RepayBorrow>, amount: u64) -> Result<()> {
    repay_internal(ctx, amount)
}

fn repay_internal(ctx: Context<RepayBorrow>, amount: u64) -> Result<()> {
    // ===== CHECKS =====
    require!(amount > 0, LendingError::ZeroAmount);

    let now = Clock::get()?.unix_timestamp;
    let market_key = ctx.accounts.market.key();
    let payer = ctx.accounts.payer.key();
    let borrower = ctx.accounts.borrower.key();
    let clock = RewardClock {
        reward_tokens: ctx.accounts.comptroller.reward_tokens(),
        now,
    };
    let accounts = &mut *ctx.accounts;

    accounts.market.acquire_lock()?;
    accrue_market(market_key, &mut accounts.market, &accounts.rate_model, now)?;

    let distributed = repay_borrow_allowed(
        &mut accounts.market,
        &mut accounts.position,
        &mut accounts.membership,
        clock,
    )?
    .into_result("repay borrow")?;
    emit_distributed(market_key, borrower, &distributed, true);

    // ===== EFFECTS =====
    let repaid = accounts.market.repay_borrow_fresh(&mut accounts.position, amount as u128)?;
    let repaid_u64 = safe_u128_to_u64(repaid)?;
    let account_borrows = accounts.market.borrow_balance_stored(&accounts.position)?;
    accounts.market.exit(&crate::ID)?;

    // ===== INTERACTIONS =====
    transfer_in(
        accounts.token_program.to_account_info(),
        accounts.payer_token_account.to_account_info(),
        accounts.vault.to_account_info(),
        accounts.payer.to_account_info(),
        accounts.underlying_mint.to_account_info(),
        repaid_u64,
        accounts.underlying_mint.decimals,
    )?;
    accounts.market.release_lock();

    emit!(events::RepayBorrow {
        market: market_key,
        payer,
        borrower,
        amount: repaid,
        account_borrows,
        total_borrows: accounts.market.total_borrows,
    });

    Ok(())
}
