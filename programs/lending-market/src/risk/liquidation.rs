//! Liquidation protocol
//!
//! `Eligible -> RepayVerified -> SeizeCalculated -> SeizeAuthorized -> Settled`,
//! with any stage able to end in a rejection. The engine works on copies of
//! every account it touches and hands them back only once Settled, so a
//! rejection leaves the caller's state untouched.

use anchor_lang::prelude::*;
use crate::constants::REPAY_MAX;
use crate::errors::{LendingError, RejectCode};
use crate::state::{AccountMembership, Market, Position, SeizeResult};
use super::gates::{
    liquidate_borrow_allowed, repay_borrow_allowed, seize_allowed, LiquidateCheck, RewardClock,
};
use super::liquidity::{account_liquidity, AccountMarketSnapshot};
use super::seize::liquidate_calculate_seize_tokens;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LiquidationStage {
    Eligible,
    RepayVerified,
    SeizeCalculated,
    SeizeAuthorized,
    Settled,
}

/// Parameters of one liquidation
#[derive(Debug, Clone, Copy)]
pub struct LiquidationRequest<'a> {
    pub now: i64,
    pub liquidator: Pubkey,
    pub borrower: Pubkey,
    pub liquidator_allowed: bool,
    pub repay_amount: u128,
    pub borrowed_key: Pubkey,
    pub collateral_key: Pubkey,
    pub price_borrowed: u128,
    pub price_collateral: u128,
    pub close_factor: u128,
    pub liquidation_incentive: u128,
    pub seize_paused: bool,
    pub reward_tokens: usize,
    /// Borrower's entered markets, valued at the accrued state
    pub borrower_snapshots: &'a [AccountMarketSnapshot],
}

/// Every account a liquidation reads or writes
#[derive(Clone)]
pub struct LiquidationAccounts {
    pub borrowed_market: Market,
    pub collateral_market: Market,
    pub borrower_borrow_position: Position,
    pub borrower_collateral_position: Position,
    pub liquidator_collateral_position: Position,
    pub borrower_membership: AccountMembership,
    pub liquidator_membership: AccountMembership,
}

pub struct LiquidationOutcome {
    pub accounts: LiquidationAccounts,
    pub stage: LiquidationStage,
    pub repay_amount: u128,
    pub seize_shares: u128,
    pub seize: SeizeResult,
}

fn reject(stage: LiquidationStage, code: RejectCode) -> Result<()> {
    if code.is_ok() {
        return Ok(());
    }
    msg!("liquidation rejected at {:?}", stage);
    code.into_result("liquidate")
}

/// Run a liquidation to completion against copies of `accounts`
pub fn liquidate_borrow(
    request: &LiquidationRequest,
    accounts: &LiquidationAccounts,
) -> Result<LiquidationOutcome> {
    let mut work = accounts.clone();
    let clock = RewardClock { reward_tokens: request.reward_tokens, now: request.now };

    // === Eligible ===
    let mut stage = LiquidationStage::Eligible;
    require!(request.liquidator != request.borrower, LendingError::SelfLiquidation);
    require!(request.repay_amount > 0, LendingError::ZeroAmount);
    require!(
        request.repay_amount != REPAY_MAX as u128,
        LendingError::InvalidCloseAmount
    );
    require!(request.borrowed_key != request.collateral_key, LendingError::SameMarket);
    require!(work.borrowed_market.is_fresh(request.now), LendingError::MarketNotFresh);
    require!(work.collateral_market.is_fresh(request.now), LendingError::PriceNotAccrued);

    let borrower_liquidity = account_liquidity(request.borrower_snapshots)?;
    let borrow_balance = work
        .borrowed_market
        .borrow_balance_stored(&work.borrower_borrow_position)?;
    let code = liquidate_borrow_allowed(&LiquidateCheck {
        borrowed_market: &work.borrowed_market,
        collateral_market: &work.collateral_market,
        collateral_key: request.collateral_key,
        liquidator_allowed: request.liquidator_allowed,
        borrower_membership: &work.borrower_membership,
        borrower_liquidity,
        borrow_balance,
        repay_amount: request.repay_amount,
        close_factor: request.close_factor,
    })?;
    reject(stage, code)?;

    // === RepayVerified ===
    stage = LiquidationStage::RepayVerified;
    let gate = repay_borrow_allowed(
        &mut work.borrowed_market,
        &mut work.borrower_borrow_position,
        &mut work.borrower_membership,
        clock,
    )?;
    reject(stage, gate.code)?;
    let repay_amount = work
        .borrowed_market
        .repay_borrow_fresh(&mut work.borrower_borrow_position, request.repay_amount)?;

    // === SeizeCalculated ===
    stage = LiquidationStage::SeizeCalculated;
    let (code, seize_shares) = liquidate_calculate_seize_tokens(
        request.price_borrowed,
        request.price_collateral,
        work.collateral_market.exchange_rate_stored()?,
        request.liquidation_incentive,
        repay_amount,
    )?;
    reject(stage, code)?;

    // === SeizeAuthorized ===
    stage = LiquidationStage::SeizeAuthorized;
    let (gate, _) = seize_allowed(
        &mut work.collateral_market,
        request.collateral_key,
        &work.borrowed_market,
        request.seize_paused,
        &mut work.borrower_collateral_position,
        &mut work.borrower_membership,
        &mut work.liquidator_collateral_position,
        &mut work.liquidator_membership,
        clock,
    )?;
    reject(stage, gate.code)?;
    require!(
        work.borrower_collateral_position.shares >= seize_shares,
        LendingError::SeizeTooMuch
    );

    // === Settled ===
    let seize = work.collateral_market.seize_fresh(
        &mut work.borrower_collateral_position,
        &mut work.liquidator_collateral_position,
        seize_shares,
    )?;

    Ok(LiquidationOutcome {
        accounts: work,
        stage: LiquidationStage::Settled,
        repay_amount,
        seize_shares,
        seize,
    })
}
