//! Mint and redeem instructions
//!
//! CEI Pattern: Checks → Effects → Interactions

use anchor_lang::prelude::*;
use anchor_spl::token_interface::{Mint, TokenAccount, TokenInterface};
use crate::constants::PROGRAM_SEED_PREFIX;
use crate::errors::LendingError;
use crate::events;
use crate::interfaces::JumpRateModel;
use crate::math::safe_u128_to_u64;
use crate::risk::{mint_allowed, redeem_allowed, AccountMarketSnapshot, RewardClock};
use crate::state::{AccountMembership, Comptroller, Market, Position, RedeemAmount};
use super::loader::{
    accrue_market, emit_distributed, load_account_snapshots, transfer_in, transfer_out, LiveMarket,
};

// ============================================================================
// Mint
// ============================================================================

#[derive(Accounts)]
pub struct MintShares<'info> {
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
        constraint = owner_token_account.mint == market.underlying_mint @ LendingError::InvalidMint,
    )]
    pub owner_token_account: Box<InterfaceAccount<'info, TokenAccount>>,

    #[account(
        mut,
        seeds = [PROGRAM_SEED_PREFIX, Market::VAULT_SEED, market.key().as_ref()],
        bump = market.vault_bump,
    )]
    pub vault: Box<InterfaceAccount<'info, TokenAccount>>,

    pub token_program: Interface<'info, TokenInterface>,
}

pub fn mint(ctx: Context<MintShares>, amount: u64) -> Result<()> {
    // ===== CHECKS =====
    require!(amount > 0, LendingError::ZeroAmount);

    let now = Clock::get()?.unix_timestamp;
    let market_key = ctx.accounts.market.key();
    let minter = ctx.accounts.owner.key();
    let clock = RewardClock {
        reward_tokens: ctx.accounts.comptroller.reward_tokens(),
        now,
    };
    let accounts = &mut *ctx.accounts;

    accounts.market.acquire_lock()?;
    accrue_market(market_key, &mut accounts.market, &accounts.rate_model, now)?;

    let distributed = mint_allowed(
        &mut accounts.market,
        &mut accounts.position,
        &mut accounts.membership,
        clock,
    )?
    .into_result("mint")?;
    emit_distributed(market_key, minter, &distributed, false);

    // ===== EFFECTS =====
    let shares = accounts.market.mint_fresh(&mut accounts.position, amount as u128)?;
    accounts.market.exit(&crate::ID)?;

    // ===== INTERACTIONS =====
    transfer_in(
        accounts.token_program.to_account_info(),
        accounts.owner_token_account.to_account_info(),
        accounts.vault.to_account_info(),
        accounts.owner.to_account_info(),
        accounts.underlying_mint.to_account_info(),
        amount,
        accounts.underlying_mint.decimals,
    )?;
    accounts.market.release_lock();

    emit!(events::Mint {
        market: market_key,
        minter,
        amount: amount as u128,
        shares,
    });

    Ok(())
}

// ============================================================================
// Redeem
// ============================================================================

#[derive(Accounts)]
pub struct RedeemShares<'info> {
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

pub fn redeem<'info>(
    ctx: Context<'_, '_, 'info, 'info, RedeemShares<'info>>,
    shares: u128,
) -> Result<()> {
    redeem_internal(ctx, RedeemAmount::Shares(shares))
}

pub fn redeem_underlying<'info>(
    ctx: Context<'_, '_, 'info, 'info, RedeemShares<'info>>,
    amount: u64,
) -> Result<()> {
    redeem_internal(ctx, RedeemAmount::Underlying(amount as u128))
}

fn redeem_internal<'info>(
    ctx: Context<'_, '_, 'info, 'info, RedeemShares<'info>>,
    request: RedeemAmount,
) -> Result<()> {
    // ===== CHECKS =====
    let now = Clock::get()?.unix_timestamp;
    let market_key = ctx.accounts.market.key();
    let redeemer = ctx.accounts.owner.key();
    let comptroller_key = ctx.accounts.comptroller.key();
    let max_stale_period = ctx.accounts.comptroller.max_stale_period;
    let clock = RewardClock {
        reward_tokens: ctx.accounts.comptroller.reward_tokens(),
        now,
    };
    let accounts = &mut *ctx.accounts;

    accounts.market.acquire_lock()?;
    accrue_market(market_key, &mut accounts.market, &accounts.rate_model, now)?;
    let (_, redeem_shares) = accounts.market.redeem_amounts(request)?;

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
    // Not entered: the liquidity check does not apply and no price is needed
    let target = snapshots
        .iter()
        .find(|s| s.market == market_key)
        .copied()
        .unwrap_or(AccountMarketSnapshot { market: market_key, ..AccountMarketSnapshot::default() });

    let distributed = redeem_allowed(
        &mut accounts.market,
        &mut accounts.position,
        &mut accounts.membership,
        &snapshots,
        &target,
        redeem_shares,
        clock,
    )?
    .into_result("redeem")?;
    emit_distributed(market_key, redeemer, &distributed, false);

    // ===== EFFECTS =====
    let (amount, shares) = accounts.market.redeem_fresh(&mut accounts.position, request)?;
    let amount_u64 = safe_u128_to_u64(amount)?;
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
        amount_u64,
        accounts.underlying_mint.decimals,
    )?;
    accounts.market.release_lock();

    emit!(events::Redeem {
        market: market_key,
        redeemer,
        amount,
        shares,
    });

    Ok(())
}
