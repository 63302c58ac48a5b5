//! Liquidation instruction
//!
//! Both markets are accrued to the current instant, the liquidation runs
//! against working copies of every account it touches, and the result is
//! committed before the repayment transfer.

use anchor_lang::prelude::*;
use anchor_spl::token_interface::{Mint, TokenAccount, TokenInterface};
use crate::constants::PROGRAM_SEED_PREFIX;
use crate::errors::LendingError;
use crate::events;
use crate::interfaces::{JumpRateModel, PriceFeed};
use crate::math::safe_u128_to_u64;
use crate::risk::{self, LiquidationAccounts, LiquidationRequest};
use crate::state::{AccountMembership, AllowedLiquidator, Comptroller, Market, Position};
use super::loader::{accrue_market, load_account_snapshots, read_price, transfer_in, LiveMarket};

#[derive(Accounts)]
pub struct LiquidateBorrow<'info> {
    #[account(mut)]
    pub liquidator: Signer<'info>,

    /// CHECK: Borrower being liquidated
    pub borrower: UncheckedAccount<'info>,

    #[account(
        seeds = [PROGRAM_SEED_PREFIX, Comptroller::SEED],
        bump = comptroller.bump,
    )]
    pub comptroller: Box<Account<'info, Comptroller>>,

    // === Borrowed Market ===

    #[account(
        mut,
        seeds = [PROGRAM_SEED_PREFIX, Market::SEED, borrowed_market.underlying_mint.as_ref()],
        bump = borrowed_market.bump,
        constraint = borrowed_market.comptroller == comptroller.key() @ LendingError::ComptrollerMismatch,
    )]
    pub borrowed_market: Box<Account<'info, Market>>,

    #[account(address = borrowed_market.interest_rate_model @ LendingError::InvalidRateModel)]
    pub borrowed_rate_model: Box<Account<'info, JumpRateModel>>,

    #[account(address = borrowed_market.price_feed @ LendingError::InvalidPriceFeed)]
    pub borrowed_price_feed: Box<Account<'info, PriceFeed>>,

    #[account(
        mut,
        seeds = [PROGRAM_SEED_PREFIX, Position::SEED, borrowed_market.key().as_ref(), borrower.key().as_ref()],
        bump = borrower_borrow_position.bump,
    )]
    pub borrower_borrow_position: Box<Account<'info, Position>>,

    // === Collateral Market ===

    #[account(
        mut,
        seeds = [PROGRAM_SEED_PREFIX, Market::SEED, collateral_market.underlying_mint.as_ref()],
        bump = collateral_market.bump,
        constraint = collateral_market.comptroller == comptroller.key() @ LendingError::ComptrollerMismatch,
    )]
    pub collateral_market: Box<Account<'info, Market>>,

    #[account(address = collateral_market.interest_rate_model @ LendingError::InvalidRateModel)]
    pub collateral_rate_model: Box<Account<'info, JumpRateModel>>,

    #[account(address = collateral_market.price_feed @ LendingError::InvalidPriceFeed)]
    pub collateral_price_feed: Box<Account<'info, PriceFeed>>,

    #[account(
        mut,
        seeds = [PROGRAM_SEED_PREFIX, Position::SEED, collateral_market.key().as_ref(), borrower.key().as_ref()],
        bump = borrower_collateral_position.bump,
    )]
    pub borrower_collateral_position: Box<Account<'info, Position>>,

    #[account(
        init_if_needed,
        payer = liquidator,
        space = Position::space(),
        seeds = [PROGRAM_SEED_PREFIX, Position::SEED, collateral_market.key().as_ref(), liquidator.key().as_ref()],
        bump,
    )]
    pub liquidator_collateral_position: Box<Account<'info, Position>>,

    // === Membership ===

    #[account(
        mut,
        seeds = [PROGRAM_SEED_PREFIX, AccountMembership::SEED, borrower.key().as_ref()],
        bump = borrower_membership.bump,
    )]
    pub borrower_membership: Box<Account<'info, AccountMembership>>,

    #[account(
        init_if_needed,
        payer = liquidator,
        space = AccountMembership::space(),
        seeds = [PROGRAM_SEED_PREFIX, AccountMembership::SEED, liquidator.key().as_ref()],
        bump,
    )]
    pub liquidator_membership: Box<Account<'info, AccountMembership>>,

    #[account(
        seeds = [PROGRAM_SEED_PREFIX, AllowedLiquidator::SEED, liquidator.key().as_ref()],
        bump = allowed_liquidator.bump,
    )]
    pub allowed_liquidator: Option<Account<'info, AllowedLiquidator>>,

    // === Repayment ===

    #[account(address = borrowed_market.underlying_mint @ LendingError::InvalidMint)]
    pub borrowed_mint: Box<InterfaceAccount<'info, Mint>>,

    #[account(
        mut,
        constraint = liquidator_token_account.mint == borrowed_market.underlying_mint @ LendingError::InvalidMint,
    )]
    pub liquidator_token_account: Box<InterfaceAccount<'info, TokenAccount>>,

    #[account(
        mut,
        seeds = [PROGRAM_SEED_PREFIX, Market::VAULT_SEED, borrowed_market.key().as_ref()],
        bump = borrowed_market.vault_bump,
    )]
    pub borrowed_vault: Box<InterfaceAccount<'info, TokenAccount>>,

    pub token_program: Interface<'info, TokenInterface>,
    pub system_program: Program<'info, System>,
    // remaining_accounts: (market, position, price_feed) per market the borrower entered
}

pub fn liquidate_borrow<'info>(
    ctx: Context<'_, '_, 'info, 'info, LiquidateBorrow<'info>>,
    repay_amount: u64,
) -> Result<()> {
    // ===== CHECKS =====
    let now = Clock::get()?.unix_timestamp;
    let liquidator = ctx.accounts.liquidator.key();
    let borrower = ctx.accounts.borrower.key();
    let borrowed_key = ctx.accounts.borrowed_market.key();
    let collateral_key = ctx.accounts.collateral_market.key();
    let comptroller_key = ctx.accounts.comptroller.key();
    let max_stale_period = ctx.accounts.comptroller.max_stale_period;
    let liquidator_allowed = ctx
        .accounts
        .allowed_liquidator
        .as_ref()
        .is_some_and(|entry| entry.is_allowed(&liquidator));
    let accounts = &mut *ctx.accounts;

    if accounts.liquidator_collateral_position.owner == Pubkey::default() {
        **accounts.liquidator_collateral_position = Position::new(
            collateral_key,
            liquidator,
            ctx.bumps.liquidator_collateral_position,
        );
    }
    if accounts.liquidator_membership.owner == Pubkey::default() {
        accounts.liquidator_membership.bump = ctx.bumps.liquidator_membership;
        accounts.liquidator_membership.owner = liquidator;
    }

    accounts.borrowed_market.acquire_lock()?;
    accounts.collateral_market.acquire_lock()?;
    accrue_market(borrowed_key, &mut accounts.borrowed_market, &accounts.borrowed_rate_model, now)?;
    accrue_market(collateral_key, &mut accounts.collateral_market, &accounts.collateral_rate_model, now)?;

    let snapshots = load_account_snapshots(
        ctx.program_id,
        &comptroller_key,
        &accounts.borrower_membership,
        ctx.remaining_accounts,
        &[
            LiveMarket {
                key: borrowed_key,
                market: &accounts.borrowed_market,
                position: &accounts.borrower_borrow_position,
            },
            LiveMarket {
                key: collateral_key,
                market: &accounts.collateral_market,
                position: &accounts.borrower_collateral_position,
            },
        ],
        now,
        max_stale_period,
    )?;
    let price_borrowed = read_price(
        &accounts.borrowed_price_feed,
        &accounts.borrowed_price_feed.key(),
        &accounts.borrowed_market,
        now,
        max_stale_period,
    )?;
    let price_collateral = read_price(
        &accounts.collateral_price_feed,
        &accounts.collateral_price_feed.key(),
        &accounts.collateral_market,
        now,
        max_stale_period,
    )?;

    let request = LiquidationRequest {
        now,
        liquidator,
        borrower,
        liquidator_allowed,
        repay_amount: repay_amount as u128,
        borrowed_key,
        collateral_key,
        price_borrowed,
        price_collateral,
        close_factor: accounts.comptroller.close_factor,
        liquidation_incentive: accounts.comptroller.liquidation_incentive,
        seize_paused: accounts.comptroller.seize_paused,
        reward_tokens: accounts.comptroller.reward_tokens(),
        borrower_snapshots: &snapshots,
    };
    let working = LiquidationAccounts {
        borrowed_market: (**accounts.borrowed_market).clone(),
        collateral_market: (**accounts.collateral_market).clone(),
        borrower_borrow_position: (**accounts.borrower_borrow_position).clone(),
        borrower_collateral_position: (**accounts.borrower_collateral_position).clone(),
        liquidator_collateral_position: (**accounts.liquidator_collateral_position).clone(),
        borrower_membership: (**accounts.borrower_membership).clone(),
        liquidator_membership: (**accounts.liquidator_membership).clone(),
    };
    let outcome = risk::liquidate_borrow(&request, &working)?;

    // ===== EFFECTS =====
    let settled = outcome.accounts;
    **accounts.borrowed_market = settled.borrowed_market;
    **accounts.collateral_market = settled.collateral_market;
    **accounts.borrower_borrow_position = settled.borrower_borrow_position;
    **accounts.borrower_collateral_position = settled.borrower_collateral_position;
    **accounts.liquidator_collateral_position = settled.liquidator_collateral_position;
    **accounts.borrower_membership = settled.borrower_membership;
    **accounts.liquidator_membership = settled.liquidator_membership;

    let repay_u64 = safe_u128_to_u64(outcome.repay_amount)?;
    accounts.borrowed_market.exit(&crate::ID)?;
    accounts.collateral_market.exit(&crate::ID)?;

    // ===== INTERACTIONS =====
    transfer_in(
        accounts.token_program.to_account_info(),
        accounts.liquidator_token_account.to_account_info(),
        accounts.borrowed_vault.to_account_info(),
        accounts.liquidator.to_account_info(),
        accounts.borrowed_mint.to_account_info(),
        repay_u64,
        accounts.borrowed_mint.decimals,
    )?;
    accounts.borrowed_market.release_lock();
    accounts.collateral_market.release_lock();

    emit!(events::RepayBorrow {
        market: borrowed_key,
        payer: liquidator,
        borrower,
        amount: outcome.repay_amount,
        account_borrows: accounts
            .borrowed_market
            .borrow_balance_stored(&accounts.borrower_borrow_position)?,
        total_borrows: accounts.borrowed_market.total_borrows,
    });
    emit!(events::LiquidateBorrow {
        liquidator,
        borrower,
        borrowed_market: borrowed_key,
        collateral_market: collateral_key,
        repay_amount: outcome.repay_amount,
        seize_shares: outcome.seize_shares,
        protocol_seize_shares: outcome.seize.protocol_shares,
    });

    Ok(())
}
