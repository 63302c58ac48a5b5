//! Pooled Lending Protocol on Solana
//!
//! Compound-style money markets sharing one risk controller.
//!
//! ## Features
//! - One market per underlying asset; suppliers hold interest-bearing shares
//! - Cross-market collateral through an account's entered markets
//! - Jump-rate interest model with per-second simple accrual
//! - Close factor and liquidation incentive bounded liquidations
//! - Per-market reward speeds for up to four reward tokens
//! - Token-2022 support through the token interface
//! - CEI pattern plus a per-market reentrancy lock
//! - Two-step admin transfer

use anchor_lang::prelude::*;

pub mod constants;
pub mod errors;
pub mod events;
pub mod math;
pub mod state;
pub mod interfaces;
pub mod risk;
pub mod instructions;

use instructions::*;

declare_id!("Fg6PaFpoGXkYsidMpWTK6W2BeZ7FEfcYkg476zPFsLnS");

#[program]
pub mod lending_market {
    use super::*;

    // =========================================================================
    // Admin Instructions
    // =========================================================================

    pub fn initialize(
        ctx: Context<Initialize>,
        admin: Pubkey,
        close_factor: u128,
        liquidation_incentive: u128,
        max_assets: u8,
    ) -> Result<()> {
        instructions::admin::initialize(ctx, admin, close_factor, liquidation_incentive, max_assets)
    }

    pub fn transfer_admin(ctx: Context<UpdateComptroller>, new_admin: Pubkey) -> Result<()> {
        instructions::admin::transfer_admin(ctx, new_admin)
    }

    pub fn accept_admin(ctx: Context<AcceptAdmin>) -> Result<()> {
        instructions::admin::accept_admin(ctx)
    }

    pub fn set_close_factor(ctx: Context<UpdateComptroller>, close_factor: u128) -> Result<()> {
        instructions::admin::set_close_factor(ctx, close_factor)
    }

    pub fn set_liquidation_incentive(
        ctx: Context<UpdateComptroller>,
        incentive: u128,
    ) -> Result<()> {
        instructions::admin::set_liquidation_incentive(ctx, incentive)
    }

    pub fn set_max_assets(ctx: Context<UpdateComptroller>, max_assets: u8) -> Result<()> {
        instructions::admin::set_max_assets(ctx, max_assets)
    }

    pub fn set_max_stale_period(ctx: Context<UpdateComptroller>, period: i64) -> Result<()> {
        instructions::admin::set_max_stale_period(ctx, period)
    }

    pub fn set_seize_paused(ctx: Context<UpdateComptroller>, paused: bool) -> Result<()> {
        instructions::admin::set_seize_paused(ctx, paused)
    }

    pub fn set_allowed_liquidator(
        ctx: Context<SetAllowedLiquidator>,
        allowed: bool,
    ) -> Result<()> {
        instructions::admin::set_allowed_liquidator(ctx, allowed)
    }

    // =========================================================================
    // Rate Model and Price Feed Instructions
    // =========================================================================

    pub fn create_rate_model(
        ctx: Context<CreateRateModel>,
        id: u64,
        owner: Pubkey,
        params: RateModelParams,
    ) -> Result<()> {
        instructions::rate_model::create_rate_model(ctx, id, owner, params)
    }

    pub fn update_rate_model(ctx: Context<UpdateRateModel>, params: RateModelParams) -> Result<()> {
        instructions::rate_model::update_rate_model(ctx, params)
    }

    pub fn create_price_feed(ctx: Context<CreatePriceFeed>, authority: Pubkey) -> Result<()> {
        instructions::price_feed::create_price_feed(ctx, authority)
    }

    pub fn publish_price(ctx: Context<PublishPrice>, price: u128) -> Result<()> {
        instructions::price_feed::publish_price(ctx, price)
    }

    // =========================================================================
    // Market Instructions
    // =========================================================================

    pub fn create_market(
        ctx: Context<CreateMarket>,
        initial_exchange_rate: u128,
        share_decimals: u8,
    ) -> Result<()> {
        instructions::market::create_market(ctx, initial_exchange_rate, share_decimals)
    }

    pub fn list_market(ctx: Context<UpdateMarket>) -> Result<()> {
        instructions::market::list_market(ctx)
    }

    pub fn unlist_market(ctx: Context<UpdateMarket>) -> Result<()> {
        instructions::market::unlist_market(ctx)
    }

    pub fn set_collateral_factor(
        ctx: Context<SetCollateralFactor>,
        collateral_factor: u128,
    ) -> Result<()> {
        instructions::market::set_collateral_factor(ctx, collateral_factor)
    }

    pub fn set_reserve_factor(ctx: Context<UpdateMarketAccrued>, reserve_factor: u128) -> Result<()> {
        instructions::market::set_reserve_factor(ctx, reserve_factor)
    }

    pub fn set_protocol_seize_share(ctx: Context<UpdateMarketAccrued>, share: u128) -> Result<()> {
        instructions::market::set_protocol_seize_share(ctx, share)
    }

    pub fn set_interest_rate_model(ctx: Context<SetInterestRateModel>) -> Result<()> {
        instructions::market::set_interest_rate_model(ctx)
    }

    pub fn set_borrow_cap(ctx: Context<UpdateMarket>, borrow_cap: u128) -> Result<()> {
        instructions::market::set_borrow_cap(ctx, borrow_cap)
    }

    pub fn set_action_paused(
        ctx: Context<UpdateMarket>,
        mint_paused: bool,
        borrow_paused: bool,
    ) -> Result<()> {
        instructions::market::set_action_paused(ctx, mint_paused, borrow_paused)
    }

    // =========================================================================
    // Position Instructions
    // =========================================================================

    pub fn open_position(ctx: Context<OpenPosition>) -> Result<()> {
        instructions::position::open_position(ctx)
    }

    pub fn close_position(ctx: Context<ClosePosition>) -> Result<()> {
        instructions::position::close_position(ctx)
    }

    pub fn enter_markets<'info>(
        ctx: Context<'_, '_, 'info, 'info, EnterMarkets<'info>>,
    ) -> Result<()> {
        instructions::position::enter_markets(ctx)
    }

    pub fn exit_market<'info>(ctx: Context<'_, '_, 'info, 'info, ExitMarket<'info>>) -> Result<()> {
        instructions::position::exit_market(ctx)
    }

    // =========================================================================
    // Supply Instructions
    // =========================================================================

    pub fn mint(ctx: Context<MintShares>, amount: u64) -> Result<()> {
        instructions::supply::mint(ctx, amount)
    }

    pub fn redeem<'info>(
        ctx: Context<'_, '_, 'info, 'info, RedeemShares<'info>>,
        shares: u128,
    ) -> Result<()> {
        instructions::supply::redeem(ctx, shares)
    }

    pub fn redeem_underlying<'info>(
        ctx: Context<'_, '_, 'info, 'info, RedeemShares<'info>>,
        amount: u64,
    ) -> Result<()> {
        instructions::supply::redeem_underlying(ctx, amount)
    }

    // =========================================================================
    // Borrow Instructions
    // =========================================================================

    pub fn borrow<'info>(
        ctx: Context<'_, '_, 'info, 'info, BorrowUnderlying<'info>>,
        amount: u64,
    ) -> Result<()> {
        instructions::borrow::borrow(ctx, amount)
    }

    pub fn repay_borrow(ctx: Context<RepayBorrow>, amount: u64) -> Result<()> {
        instructions::borrow::repay_borrow(ctx, amount)
    }

    pub fn repay_borrow_behalf(ctx: Context<RepayBorrow>, amount: u64) -> Result<()> {
        instructions::borrow::repay_borrow_behalf(ctx, amount)
    }

    // =========================================================================
    // Liquidation Instructions
    // =========================================================================

    pub fn liquidate_borrow<'info>(
        ctx: Context<'_, '_, 'info, 'info, LiquidateBorrow<'info>>,
        repay_amount: u64,
    ) -> Result<()> {
        instructions::liquidate::liquidate_borrow(ctx, repay_amount)
    }

    // =========================================================================
    // Reserve Instructions
    // =========================================================================

    pub fn add_reserves(ctx: Context<AddReserves>, amount: u64) -> Result<()> {
        instructions::reserves::add_reserves(ctx, amount)
    }

    pub fn reduce_reserves(ctx: Context<ReduceReserves>, amount: u64) -> Result<()> {
        instructions::reserves::reduce_reserves(ctx, amount)
    }

    // =========================================================================
    // Reward Instructions
    // =========================================================================

    pub fn add_reward_token(ctx: Context<AddRewardToken>) -> Result<()> {
        instructions::rewards::add_reward_token(ctx)
    }

    pub fn set_reward_speeds(
        ctx: Context<UpdateMarketAccrued>,
        reward_type: u8,
        supply_speed: u64,
        borrow_speed: u64,
    ) -> Result<()> {
        instructions::rewards::set_reward_speeds(ctx, reward_type, supply_speed, borrow_speed)
    }

    pub fn distribute_rewards(ctx: Context<DistributeRewards>) -> Result<()> {
        instructions::rewards::distribute_rewards(ctx)
    }

    pub fn claim_reward<'info>(
        ctx: Context<'_, '_, 'info, 'info, ClaimReward<'info>>,
        reward_type: u8,
    ) -> Result<()> {
        instructions::rewards::claim_reward(ctx, reward_type)
    }

    // =========================================================================
    // Utility Instructions
    // =========================================================================

    pub fn accrue_interest(ctx: Context<AccrueInterest>) -> Result<()> {
        instructions::utils::accrue_interest_ix(ctx)
    }

    pub fn get_account_liquidity<'info>(
        ctx: Context<'_, '_, 'info, 'info, GetAccountLiquidity<'info>>,
    ) -> Result<()> {
        instructions::utils::get_account_liquidity(ctx)
    }

    pub fn get_market_state(ctx: Context<GetMarketState>) -> Result<()> {
        instructions::utils::get_market_state(ctx)
    }

    pub fn get_account_snapshot(ctx: Context<GetAccountSnapshot>) -> Result<()> {
        instructions::utils::get_account_snapshot(ctx)
    }
}
