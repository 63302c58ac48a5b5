//! Market creation and admin market parameters

use anchor_lang::prelude::*;
use anchor_spl::token_interface::{Mint, TokenAccount, TokenInterface};
use crate::constants::{
    PROGRAM_SEED_PREFIX, WAD, LEDGER_VERSION,
    COLLATERAL_FACTOR_MAX, RESERVE_FACTOR_MAX, PROTOCOL_SEIZE_SHARE_MAX,
};
use crate::errors::LendingError;
use crate::events::*;
use crate::interfaces::{JumpRateModel, PriceFeed, PriceOracle};
use crate::risk::INITIAL_REWARD_INDEX;
use crate::state::{Comptroller, Market, MarketRewardState};
use super::loader::accrue_market;

// ============================================================================
// Create Market
// ============================================================================

#[derive(Accounts)]
pub struct CreateMarket<'info> {
    #[account(mut)]
    pub admin: Signer<'info>,

    #[account(
        mut,
        seeds = [PROGRAM_SEED_PREFIX, Comptroller::SEED],
        bump = comptroller.bump,
        constraint = comptroller.admin == admin.key() @ LendingError::Unauthorized,
    )]
    pub comptroller: Box<Account<'info, Comptroller>>,

    pub underlying_mint: Box<InterfaceAccount<'info, Mint>>,

    #[account(
        init,
        payer = admin,
        space = Market::space(),
        seeds = [PROGRAM_SEED_PREFIX, Market::SEED, underlying_mint.key().as_ref()],
        bump,
    )]
    pub market: Box<Account<'info, Market>>,

    #[account(
        init,
        payer = admin,
        token::mint = underlying_mint,
        token::authority = market,
        token::token_program = token_program,
        seeds = [PROGRAM_SEED_PREFIX, Market::VAULT_SEED, market.key().as_ref()],
        bump,
    )]
    pub vault: Box<InterfaceAccount<'info, TokenAccount>>,

    pub rate_model: Box<Account<'info, JumpRateModel>>,

    #[account(
        constraint = price_feed.underlying_mint == underlying_mint.key() @ LendingError::InvalidPriceFeed,
    )]
    pub price_feed: Box<Account<'info, PriceFeed>>,

    pub token_program: Interface<'info, TokenInterface>,
    pub system_program: Program<'info, System>,
}

pub fn create_market(
    ctx: Context<CreateMarket>,
    initial_exchange_rate: u128,
    share_decimals: u8,
) -> Result<()> {
    require!(initial_exchange_rate > 0, LendingError::InvalidInput);

    let now = Clock::get()?.unix_timestamp;
    let market_key = ctx.accounts.market.key();
    let market_index = ctx.accounts.comptroller.register_market(market_key)?;

    let market = &mut ctx.accounts.market;
    market.bump = ctx.bumps.market;
    market.comptroller = ctx.accounts.comptroller.key();
    market.market_index = market_index;
    market.underlying_mint = ctx.accounts.underlying_mint.key();
    market.underlying_decimals = ctx.accounts.underlying_mint.decimals;
    market.share_decimals = share_decimals;
    market.vault_bump = ctx.bumps.vault;
    market.initial_exchange_rate = initial_exchange_rate;
    market.version = LEDGER_VERSION;
    market.interest_rate_model = ctx.accounts.rate_model.key();
    market.price_feed = ctx.accounts.price_feed.key();
    market.is_listed = false;
    market.collateral_factor = 0;
    market.reserve_factor = 0;
    market.protocol_seize_share = 0;
    market.borrow_cap = 0;
    market.mint_paused = false;
    market.borrow_paused = false;
    market.total_supply_shares = 0;
    market.total_borrows = 0;
    market.total_reserves = 0;
    market.cash = 0;
    market.borrow_index = WAD;
    market.accrual_timestamp = now;
    market.lock = 0;
    for state in market.rewards.iter_mut() {
        *state = MarketRewardState {
            supply_index: INITIAL_REWARD_INDEX,
            supply_timestamp: now,
            borrow_index: INITIAL_REWARD_INDEX,
            borrow_timestamp: now,
            ..MarketRewardState::default()
        };
    }

    emit!(MarketCreated {
        market: market_key,
        market_index,
        underlying_mint: market.underlying_mint,
        interest_rate_model: market.interest_rate_model,
        price_feed: market.price_feed,
        initial_exchange_rate,
        version: market.version,
    });

    Ok(())
}

// ============================================================================
// Market Parameters
// ============================================================================

/// Accounts for admin updates that do not touch the ledger
#[derive(Accounts)]
pub struct UpdateMarket<'info> {
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
}

pub fn list_market(ctx: Context<UpdateMarket>) -> Result<()> {
    let market = &mut ctx.accounts.market;
    require!(!market.is_listed, LendingError::MarketAlreadyListed);
    market.is_listed = true;

    emit!(MarketListed {
        market: market.key(),
        listed: true,
    });
    Ok(())
}

/// Stop supporting a market. The ledger is left as is; every gate rejects
/// with `MarketNotListed` until the market is listed again.
pub fn unlist_market(ctx: Context<UpdateMarket>) -> Result<()> {
    let market = &mut ctx.accounts.market;
    require!(market.is_listed, LendingError::MarketNotListed);
    market.is_listed = false;

    emit!(MarketListed {
        market: market.key(),
        listed: false,
    });
    Ok(())
}

pub fn set_borrow_cap(ctx: Context<UpdateMarket>, borrow_cap: u128) -> Result<()> {
    let market = &mut ctx.accounts.market;
    market.borrow_cap = borrow_cap;

    emit!(NewBorrowCap {
        market: market.key(),
        borrow_cap,
    });
    Ok(())
}

pub fn set_action_paused(
    ctx: Context<UpdateMarket>,
    mint_paused: bool,
    borrow_paused: bool,
) -> Result<()> {
    let market = &mut ctx.accounts.market;
    require!(market.is_listed, LendingError::MarketNotListed);
    market.mint_paused = mint_paused;
    market.borrow_paused = borrow_paused;

    emit!(ActionPausedSet {
        market: market.key(),
        mint_paused,
        borrow_paused,
    });
    Ok(())
}

// ============================================================================
// Collateral Factor
// ============================================================================

#[derive(Accounts)]
pub struct SetCollateralFactor<'info> {
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

    #[account(address = market.price_feed @ LendingError::InvalidPriceFeed)]
    pub price_feed: Box<Account<'info, PriceFeed>>,
}

pub fn set_collateral_factor(ctx: Context<SetCollateralFactor>, collateral_factor: u128) -> Result<()> {
    // ===== CHECKS =====
    require!(ctx.accounts.market.is_listed, LendingError::MarketNotListed);
    require!(
        collateral_factor <= COLLATERAL_FACTOR_MAX,
        LendingError::InvalidCollateralFactor
    );
    if collateral_factor != 0 {
        let now = Clock::get()?.unix_timestamp;
        ctx.accounts
            .price_feed
            .underlying_price(now, ctx.accounts.comptroller.max_stale_period)?;
    }

    // ===== EFFECTS =====
    let market = &mut ctx.accounts.market;
    let old_collateral_factor = market.collateral_factor;
    market.collateral_factor = collateral_factor;

    emit!(NewCollateralFactor {
        market: market.key(),
        old_collateral_factor,
        new_collateral_factor: collateral_factor,
    });
    Ok(())
}

// ============================================================================
// Ledger-Affecting Parameters (accrue first)
// ============================================================================

#[derive(Accounts)]
pub struct UpdateMarketAccrued<'info> {
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
}

impl<'info> UpdateMarketAccrued<'info> {
    pub(crate) fn accrue(&mut self) -> Result<()> {
        require!(!self.market.is_locked(), LendingError::MarketLocked);
        let now = Clock::get()?.unix_timestamp;
        let key = self.market.key();
        accrue_market(key, &mut self.market, &self.rate_model, now)
    }
}

pub fn set_reserve_factor(ctx: Context<UpdateMarketAccrued>, reserve_factor: u128) -> Result<()> {
    require!(reserve_factor <= RESERVE_FACTOR_MAX, LendingError::InvalidReserveFactor);
    ctx.accounts.accrue()?;

    let market = &mut ctx.accounts.market;
    let old_reserve_factor = market.reserve_factor;
    market.reserve_factor = reserve_factor;

    emit!(NewReserveFactor {
        market: market.key(),
        old_reserve_factor,
        new_reserve_factor: reserve_factor,
    });
    Ok(())
}

pub fn set_protocol_seize_share(ctx: Context<UpdateMarketAccrued>, share: u128) -> Result<()> {
    require!(share <= PROTOCOL_SEIZE_SHARE_MAX, LendingError::InvalidProtocolSeizeShare);
    ctx.accounts.accrue()?;

    let market = &mut ctx.accounts.market;
    let old_share = market.protocol_seize_share;
    market.protocol_seize_share = share;

    emit!(NewProtocolSeizeShare {
        market: market.key(),
        old_share,
        new_share: share,
    });
    Ok(())
}

#[derive(Accounts)]
pub struct SetInterestRateModel<'info> {
    pub market_update: UpdateMarketAccrued<'info>,

    pub new_rate_model: Box<Account<'info, JumpRateModel>>,
}

/// Switch the market's rate curve. Interest up to now accrues under the old one.
pub fn set_interest_rate_model(ctx: Context<SetInterestRateModel>) -> Result<()> {
    ctx.accounts.market_update.accrue()?;

    let new_model = ctx.accounts.new_rate_model.key();
    let market = &mut ctx.accounts.market_update.market;
    let old_model = market.interest_rate_model;
    market.interest_rate_model = new_model;

    emit!(NewInterestRateModel {
        market: market.key(),
        old_model,
        new_model,
    });
    Ok(())
}
