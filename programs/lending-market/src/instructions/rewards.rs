//! Reward token instructions
//!
//! - Register a reward token and its vault
//! - Set per-market supply and borrow speeds
//! - Refresh an account's accruals on a market
//! - Claim accrued rewards across markets

use anchor_lang::prelude::*;
use anchor_spl::token_interface::{Mint, TokenAccount, TokenInterface};
use crate::constants::PROGRAM_SEED_PREFIX;
use crate::errors::LendingError;
use crate::events::{RewardClaimed, RewardSpeedUpdated, RewardTokenAdded};
use crate::interfaces::JumpRateModel;
use crate::math::safe_u128_to_u64;
use crate::risk::{
    distribute_borrower, distribute_supplier, refresh_borrower, refresh_supplier,
    set_reward_speeds as apply_reward_speeds, update_borrow_index, update_supply_index, Distributed,
};
use crate::state::{AccountMembership, Comptroller, Market, Position};
use super::loader::{accrue_market, emit_distributed, load_account, store_account, transfer_out};
use super::market::UpdateMarketAccrued;

// ============================================================================
// Add Reward Token
// ============================================================================

#[derive(Accounts)]
pub struct AddRewardToken<'info> {
    #[account(mut)]
    pub admin: Signer<'info>,

    #[account(
        mut,
        seeds = [PROGRAM_SEED_PREFIX, Comptroller::SEED],
        bump = comptroller.bump,
        constraint = comptroller.admin == admin.key() @ LendingError::Unauthorized,
    )]
    pub comptroller: Box<Account<'info, Comptroller>>,

    pub reward_mint: Box<InterfaceAccount<'info, Mint>>,

    #[account(
        init,
        payer = admin,
        token::mint = reward_mint,
        token::authority = comptroller,
        token::token_program = token_program,
        seeds = [PROGRAM_SEED_PREFIX, Comptroller::REWARD_VAULT_SEED, reward_mint.key().as_ref()],
        bump,
    )]
    pub reward_vault: Box<InterfaceAccount<'info, TokenAccount>>,

    pub token_program: Interface<'info, TokenInterface>,
    pub system_program: Program<'info, System>,
}

pub fn add_reward_token(ctx: Context<AddRewardToken>) -> Result<()> {
    let mint = ctx.accounts.reward_mint.key();
    let reward_type = ctx
        .accounts
        .comptroller
        .add_reward_token(mint, ctx.bumps.reward_vault)?;

    emit!(RewardTokenAdded {
        reward_type,
        mint,
        vault: ctx.accounts.reward_vault.key(),
    });
    Ok(())
}

// ============================================================================
// Reward Speeds
// ============================================================================

/// Set both speeds for one reward token on one market.
/// Both indices first accrue under the previous speeds.
pub fn set_reward_speeds(
    ctx: Context<UpdateMarketAccrued>,
    reward_type: u8,
    supply_speed: u64,
    borrow_speed: u64,
) -> Result<()> {
    let t = ctx.accounts.comptroller.require_reward_type(reward_type)?;
    require!(ctx.accounts.market.is_listed, LendingError::MarketNotListed);
    ctx.accounts.accrue()?;

    let now = Clock::get()?.unix_timestamp;
    let market = &mut ctx.accounts.market;
    let (old_supply_speed, old_borrow_speed) =
        apply_reward_speeds(market, t, supply_speed, borrow_speed, now)?;

    emit!(RewardSpeedUpdated {
        market: market.key(),
        reward_type,
        old_supply_speed,
        new_supply_speed: supply_speed,
        old_borrow_speed,
        new_borrow_speed: borrow_speed,
    });
    Ok(())
}

// ============================================================================
// Distribute (Permissionless)
// ============================================================================

#[derive(Accounts)]
pub struct DistributeRewards<'info> {
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
        seeds = [PROGRAM_SEED_PREFIX, Position::SEED, market.key().as_ref(), position.owner.as_ref()],
        bump = position.bump,
    )]
    pub position: Box<Account<'info, Position>>,

    #[account(
        mut,
        seeds = [PROGRAM_SEED_PREFIX, AccountMembership::SEED, position.owner.as_ref()],
        bump = membership.bump,
    )]
    pub membership: Box<Account<'info, AccountMembership>>,
}

pub fn distribute_rewards(ctx: Context<DistributeRewards>) -> Result<()> {
    require!(!ctx.accounts.market.is_locked(), LendingError::MarketLocked);
    let now = Clock::get()?.unix_timestamp;
    let market_key = ctx.accounts.market.key();
    let account = ctx.accounts.position.owner;
    let reward_tokens = ctx.accounts.comptroller.reward_tokens();
    let accounts = &mut *ctx.accounts;

    accrue_market(market_key, &mut accounts.market, &accounts.rate_model, now)?;

    let supplied = refresh_supplier(
        &mut accounts.market,
        &mut accounts.position,
        &mut accounts.membership,
        reward_tokens,
        now,
    )?;
    let borrowed = refresh_borrower(
        &mut accounts.market,
        &mut accounts.position,
        &mut accounts.membership,
        reward_tokens,
        now,
    )?;

    emit_distributed(market_key, account, &supplied, false);
    emit_distributed(market_key, account, &borrowed, true);
    Ok(())
}

// ============================================================================
// Claim
// ============================================================================

#[derive(Accounts)]
pub struct ClaimReward<'info> {
    #[account(
        seeds = [PROGRAM_SEED_PREFIX, Comptroller::SEED],
        bump = comptroller.bump,
    )]
    pub comptroller: Box<Account<'info, Comptroller>>,

    /// CHECK: Account whose rewards are claimed; rewards only go to its token account
    pub holder: UncheckedAccount<'info>,

    #[account(
        mut,
        seeds = [PROGRAM_SEED_PREFIX, AccountMembership::SEED, holder.key().as_ref()],
        bump = membership.bump,
    )]
    pub membership: Box<Account<'info, AccountMembership>>,

    pub reward_mint: Box<InterfaceAccount<'info, Mint>>,

    #[account(
        mut,
        seeds = [PROGRAM_SEED_PREFIX, Comptroller::REWARD_VAULT_SEED, reward_mint.key().as_ref()],
        bump,
    )]
    pub reward_vault: Box<InterfaceAccount<'info, TokenAccount>>,

    #[account(
        mut,
        constraint = holder_token_account.mint == reward_mint.key() @ LendingError::InvalidMint,
        constraint = holder_token_account.owner == holder.key() @ LendingError::InvalidOwner,
    )]
    pub holder_token_account: Box<InterfaceAccount<'info, TokenAccount>>,

    pub token_program: Interface<'info, TokenInterface>,
    // remaining_accounts: (market, position) per market to distribute on
}

/// Distribute on every given market, then pay out the holder's accrual
/// when the vault can cover it in full. Otherwise the accrual is kept.
pub fn claim_reward<'info>(
    ctx: Context<'_, '_, 'info, 'info, ClaimReward<'info>>,
    reward_type: u8,
) -> Result<()> {
    // ===== CHECKS =====
    let t = ctx.accounts.comptroller.require_reward_type(reward_type)?;
    require_keys_eq!(
        ctx.accounts.comptroller.reward_mints[t],
        ctx.accounts.reward_mint.key(),
        LendingError::InvalidRewardToken
    );
    require!(
        ctx.remaining_accounts.len() % 2 == 0,
        LendingError::InvalidRemainingAccounts
    );

    let now = Clock::get()?.unix_timestamp;
    let holder = ctx.accounts.holder.key();
    let comptroller_key = ctx.accounts.comptroller.key();

    // ===== EFFECTS =====
    for pair in ctx.remaining_accounts.chunks_exact(2) {
        let market_key = pair[0].key();
        let mut market: Market = load_account(&pair[0], ctx.program_id)?;
        let mut position: Position = load_account(&pair[1], ctx.program_id)?;

        require_keys_eq!(market.comptroller, comptroller_key, LendingError::ComptrollerMismatch);
        require_keys_eq!(position.market, market_key, LendingError::InvalidRemainingAccounts);
        require_keys_eq!(position.owner, holder, LendingError::InvalidOwner);
        require!(!market.is_locked(), LendingError::MarketLocked);
        if !market.is_listed {
            continue;
        }

        let mut distributed = Distributed::default();
        update_supply_index(&mut market, t, now)?;
        distributed[t] = distribute_supplier(&market, &mut position, &mut ctx.accounts.membership, t)?;
        emit_distributed(market_key, holder, &distributed, false);

        update_borrow_index(&mut market, t, now)?;
        distributed[t] = distribute_borrower(&market, &mut position, &mut ctx.accounts.membership, t)?;
        emit_distributed(market_key, holder, &distributed, true);

        store_account(&pair[0], &market)?;
        store_account(&pair[1], &position)?;
    }

    let accrued = ctx.accounts.membership.reward_accrued[t];
    if accrued == 0 || accrued > ctx.accounts.reward_vault.amount as u128 {
        return Ok(());
    }
    let amount = safe_u128_to_u64(accrued)?;
    ctx.accounts.membership.reward_accrued[t] = 0;

    // ===== INTERACTIONS =====
    let bump = [ctx.accounts.comptroller.bump];
    let seeds: &[&[u8]] = &[PROGRAM_SEED_PREFIX, Comptroller::SEED, &bump];

    transfer_out(
        ctx.accounts.token_program.to_account_info(),
        ctx.accounts.reward_vault.to_account_info(),
        ctx.accounts.holder_token_account.to_account_info(),
        ctx.accounts.comptroller.to_account_info(),
        ctx.accounts.reward_mint.to_account_info(),
        &[seeds],
        amount,
        ctx.accounts.reward_mint.decimals,
    )?;

    emit!(RewardClaimed {
        account: holder,
        reward_type,
        amount: accrued,
    });
    Ok(())
}
