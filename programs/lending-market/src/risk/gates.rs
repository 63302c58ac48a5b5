//! Comptroller policy gates
//!
//! Each gate updates the affected reward index and distributes to the
//! acting account before evaluating policy, so the reward side effect
//! happens regardless of the outcome. Policy outcomes are `RejectCode`s;
//! pause switches and caps are hard errors.

use anchor_lang::prelude::*;
use crate::errors::{LendingError, RejectCode};
use crate::math::{checked_add, wad_mul_down};
use crate::state::{AccountMembership, Market, Position};
use super::liquidity::{
    hypothetical_account_liquidity, AccountMarketSnapshot, HypotheticalAction, Liquidity,
};
use super::rewards::{refresh_borrower, refresh_supplier, Distributed};

/// Reward bookkeeping inputs shared by the gates
#[derive(Debug, Clone, Copy)]
pub struct RewardClock {
    pub reward_tokens: usize,
    pub now: i64,
}

/// Gate outcome with the rewards distributed along the way
#[derive(Debug, Clone, Copy)]
pub struct GateOutcome {
    pub code: RejectCode,
    pub distributed: Distributed,
}

impl GateOutcome {
    pub fn into_result(self, action: &str) -> Result<Distributed> {
        self.code.into_result(action)?;
        Ok(self.distributed)
    }
}

pub fn mint_allowed(
    market: &mut Market,
    minter: &mut Position,
    membership: &mut AccountMembership,
    clock: RewardClock,
) -> Result<GateOutcome> {
    let distributed = refresh_supplier(market, minter, membership, clock.reward_tokens, clock.now)?;

    require!(!market.mint_paused, LendingError::MintPaused);
    let code = if market.is_listed {
        RejectCode::NoError
    } else {
        RejectCode::MarketNotListed
    };
    Ok(GateOutcome { code, distributed })
}

/// Liquidity check for redeeming `redeem_shares` from `target`.
/// Accounts that have not entered the market are never constrained.
pub fn redeem_allowed_internal(
    market: &Market,
    membership: &AccountMembership,
    snapshots: &[AccountMarketSnapshot],
    target: &AccountMarketSnapshot,
    redeem_shares: u128,
) -> Result<RejectCode> {
    if !market.is_listed {
        return Ok(RejectCode::MarketNotListed);
    }
    if !membership.is_member(&target.market) {
        return Ok(RejectCode::NoError);
    }

    let action = HypotheticalAction {
        target: *target,
        redeem_shares,
        borrow_amount: 0,
    };
    let liquidity = hypothetical_account_liquidity(snapshots, Some(&action))?;
    if liquidity.has_shortfall() {
        return Ok(RejectCode::InsufficientLiquidity);
    }
    Ok(RejectCode::NoError)
}

pub fn redeem_allowed(
    market: &mut Market,
    redeemer: &mut Position,
    membership: &mut AccountMembership,
    snapshots: &[AccountMarketSnapshot],
    target: &AccountMarketSnapshot,
    redeem_shares: u128,
    clock: RewardClock,
) -> Result<GateOutcome> {
    let distributed = refresh_supplier(market, redeemer, membership, clock.reward_tokens, clock.now)?;
    let code = redeem_allowed_internal(market, membership, snapshots, target, redeem_shares)?;
    Ok(GateOutcome { code, distributed })
}

/// Borrow gate. Enters the market for the borrower when needed.
///
/// `snapshots` are the borrower's entered markets before this call. A
/// market entered here joins the fold through `target`, so its own supply
/// counts as collateral for the borrow.
#[allow(clippy::too_many_arguments)]
pub fn borrow_allowed(
    market: &mut Market,
    borrower: &mut Position,
    membership: &mut AccountMembership,
    entered_markets_cap: usize,
    snapshots: &[AccountMarketSnapshot],
    target: &AccountMarketSnapshot,
    borrow_amount: u128,
    clock: RewardClock,
) -> Result<GateOutcome> {
    let distributed = refresh_borrower(market, borrower, membership, clock.reward_tokens, clock.now)?;
    let outcome = move |code: RejectCode| -> Result<GateOutcome> { Ok(GateOutcome { code, distributed }) };

    require!(!market.borrow_paused, LendingError::BorrowPaused);
    if !market.is_listed {
        return outcome(RejectCode::MarketNotListed);
    }

    let was_member = membership.is_member(&target.market);
    let entered = membership.enter(target.market, entered_markets_cap);
    if !entered.is_ok() {
        return outcome(entered);
    }

    if target.price == 0 {
        return outcome(RejectCode::PriceError);
    }

    if market.borrow_cap != 0 {
        let next_total = checked_add(market.total_borrows, borrow_amount)?;
        require!(next_total <= market.borrow_cap, LendingError::BorrowCapReached);
    }

    let mut folded = snapshots.to_vec();
    if !was_member && !folded.iter().any(|s| s.market == target.market) {
        folded.push(*target);
    }

    let action = HypotheticalAction {
        target: *target,
        redeem_shares: 0,
        borrow_amount,
    };
    let liquidity = hypothetical_account_liquidity(&folded, Some(&action))?;
    if liquidity.has_shortfall() {
        return outcome(RejectCode::InsufficientLiquidity);
    }
    outcome(RejectCode::NoError)
}

pub fn repay_borrow_allowed(
    market: &mut Market,
    borrower: &mut Position,
    membership: &mut AccountMembership,
    clock: RewardClock,
) -> Result<GateOutcome> {
    let distributed = refresh_borrower(market, borrower, membership, clock.reward_tokens, clock.now)?;
    let code = if market.is_listed {
        RejectCode::NoError
    } else {
        RejectCode::MarketNotListed
    };
    Ok(GateOutcome { code, distributed })
}

/// Inputs to the liquidation eligibility check
#[derive(Clone, Copy)]
pub struct LiquidateCheck<'a> {
    pub borrowed_market: &'a Market,
    pub collateral_market: &'a Market,
    pub collateral_key: Pubkey,
    pub liquidator_allowed: bool,
    pub borrower_membership: &'a AccountMembership,
    pub borrower_liquidity: Liquidity,
    pub borrow_balance: u128,
    pub repay_amount: u128,
    pub close_factor: u128,
}

pub fn liquidate_borrow_allowed(check: &LiquidateCheck) -> Result<RejectCode> {
    if !check.borrowed_market.is_listed || !check.collateral_market.is_listed {
        return Ok(RejectCode::MarketNotListed);
    }
    if !check.liquidator_allowed {
        return Ok(RejectCode::Unauthorized);
    }
    if !check.borrower_membership.is_member(&check.collateral_key) {
        return Ok(RejectCode::MarketNotEntered);
    }
    if !check.borrower_liquidity.has_shortfall() {
        return Ok(RejectCode::InsufficientShortfall);
    }

    let max_close = wad_mul_down(check.close_factor, check.borrow_balance)?;
    if check.repay_amount > max_close {
        return Ok(RejectCode::TooMuchRepay);
    }
    Ok(RejectCode::NoError)
}

/// Seize gate. Distributes collateral-market supply rewards to both sides.
#[allow(clippy::too_many_arguments)]
pub fn seize_allowed(
    collateral_market: &mut Market,
    collateral_key: Pubkey,
    borrowed_market: &Market,
    seize_paused: bool,
    borrower: &mut Position,
    borrower_membership: &mut AccountMembership,
    liquidator: &mut Position,
    liquidator_membership: &mut AccountMembership,
    clock: RewardClock,
) -> Result<(GateOutcome, Distributed)> {
    let to_borrower = refresh_supplier(
        collateral_market,
        borrower,
        borrower_membership,
        clock.reward_tokens,
        clock.now,
    )?;
    let to_liquidator = refresh_supplier(
        collateral_market,
        liquidator,
        liquidator_membership,
        clock.reward_tokens,
        clock.now,
    )?;

    require!(!seize_paused, LendingError::SeizePaused);

    let code = if !collateral_market.is_listed || !borrowed_market.is_listed {
        RejectCode::MarketNotListed
    } else if collateral_market.comptroller != borrowed_market.comptroller {
        RejectCode::ComptrollerMismatch
    } else if !borrower_membership.is_member(&collateral_key) {
        RejectCode::MarketNotEntered
    } else {
        RejectCode::NoError
    };

    Ok((GateOutcome { code, distributed: to_borrower }, to_liquidator))
}

/// Exit gate: no debt in the market and the full balance must be redeemable
pub fn exit_market_allowed(
    market: &Market,
    position: &Position,
    membership: &AccountMembership,
    snapshots: &[AccountMarketSnapshot],
    target: &AccountMarketSnapshot,
) -> Result<RejectCode> {
    if market.borrow_balance_stored(position)? != 0 {
        return Ok(RejectCode::NonzeroBorrowBalance);
    }
    redeem_allowed_internal(market, membership, snapshots, target, position.shares)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::WAD;

    fn listed_market() -> Market {
        Market {
            is_listed: true,
            borrow_index: WAD,
            initial_exchange_rate: WAD,
            cash: 1_000 * WAD,
            collateral_factor: WAD / 2,
            ..Market::default()
        }
    }

    fn clock() -> RewardClock {
        RewardClock { reward_tokens: 0, now: 0 }
    }

    fn target(key: Pubkey, shares: u128) -> AccountMarketSnapshot {
        AccountMarketSnapshot {
            market: key,
            shares,
            borrow_balance: 0,
            exchange_rate: WAD,
            collateral_factor: WAD / 2,
            price: WAD,
        }
    }

    #[test]
    fn test_mint_gate() {
        let mut market = listed_market();
        let outcome = mint_allowed(
            &mut market,
            &mut Position::default(),
            &mut AccountMembership::default(),
            clock(),
        )
        .unwrap();
        assert_eq!(outcome.code, RejectCode::NoError);

        market.is_listed = false;
        let outcome = mint_allowed(
            &mut market,
            &mut Position::default(),
            &mut AccountMembership::default(),
            clock(),
        )
        .unwrap();
        assert_eq!(outcome.code, RejectCode::MarketNotListed);

        market.mint_paused = true;
        assert!(mint_allowed(
            &mut market,
            &mut Position::default(),
            &mut AccountMembership::default(),
            clock(),
        )
        .is_err());
    }

    #[test]
    fn test_redeem_not_entered_is_unconstrained() {
        let mut market = listed_market();
        let key = Pubkey::new_unique();
        let snapshot = target(key, 10 * WAD);
        let outcome = redeem_allowed(
            &mut market,
            &mut Position::default(),
            &mut AccountMembership::default(),
            &[],
            &snapshot,
            10 * WAD,
            clock(),
        )
        .unwrap();
        assert_eq!(outcome.code, RejectCode::NoError);
    }

    #[test]
    fn test_borrow_enters_market_and_checks_liquidity() {
        let mut market = listed_market();
        let key = Pubkey::new_unique();
        let mut membership = AccountMembership::default();
        let collateral = AccountMarketSnapshot {
            shares: 100 * WAD,
            ..target(Pubkey::new_unique(), 100 * WAD)
        };
        membership.enter(collateral.market, 16);

        let outcome = borrow_allowed(
            &mut market,
            &mut Position::default(),
            &mut membership,
            16,
            &[collateral],
            &target(key, 0),
            50 * WAD,
            clock(),
        )
        .unwrap();
        assert_eq!(outcome.code, RejectCode::NoError);
        assert!(membership.is_member(&key));

        let outcome = borrow_allowed(
            &mut market,
            &mut Position::default(),
            &mut membership,
            16,
            &[collateral],
            &target(key, 0),
            51 * WAD,
            clock(),
        )
        .unwrap();
        assert_eq!(outcome.code, RejectCode::InsufficientLiquidity);
    }

    #[test]
    fn test_first_borrow_counts_own_supply() {
        let mut market = listed_market();
        let key = Pubkey::new_unique();
        let mut membership = AccountMembership::default();
        // 100 shares at CF 0.5: 50 of borrowing power, market not yet entered
        let own = target(key, 100 * WAD);

        let outcome = borrow_allowed(
            &mut market,
            &mut Position::default(),
            &mut membership,
            16,
            &[],
            &own,
            10 * WAD,
            clock(),
        )
        .unwrap();
        assert_eq!(outcome.code, RejectCode::NoError);
        assert_eq!(membership.entered(), &[key]);

        let mut fresh = AccountMembership::default();
        let outcome = borrow_allowed(
            &mut market,
            &mut Position::default(),
            &mut fresh,
            16,
            &[],
            &own,
            51 * WAD,
            clock(),
        )
        .unwrap();
        assert_eq!(outcome.code, RejectCode::InsufficientLiquidity);
    }

    #[test]
    fn test_borrow_cap() {
        let mut market = listed_market();
        market.borrow_cap = 10 * WAD;
        let key = Pubkey::new_unique();
        let collateral = target(Pubkey::new_unique(), 1_000 * WAD);
        let mut membership = AccountMembership::default();
        membership.enter(collateral.market, 16);

        let result = borrow_allowed(
            &mut market,
            &mut Position::default(),
            &mut membership,
            16,
            &[collateral],
            &target(key, 0),
            11 * WAD,
            clock(),
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_borrow_too_many_assets() {
        let mut market = listed_market();
        let mut membership = AccountMembership::default();
        membership.enter(Pubkey::new_unique(), 1);

        let outcome = borrow_allowed(
            &mut market,
            &mut Position::default(),
            &mut membership,
            1,
            &[],
            &target(Pubkey::new_unique(), 0),
            WAD,
            clock(),
        )
        .unwrap();
        assert_eq!(outcome.code, RejectCode::TooManyAssets);
    }

    #[test]
    fn test_close_factor_limits_repay() {
        let borrowed = listed_market();
        let collateral = listed_market();
        let collateral_key = Pubkey::new_unique();
        let mut membership = AccountMembership::default();
        membership.enter(collateral_key, 16);

        let mut check = LiquidateCheck {
            borrowed_market: &borrowed,
            collateral_market: &collateral,
            collateral_key,
            liquidator_allowed: true,
            borrower_membership: &membership,
            borrower_liquidity: Liquidity { liquidity: 0, shortfall: WAD },
            borrow_balance: 100 * WAD,
            repay_amount: 51 * WAD,
            close_factor: WAD / 2,
        };
        assert_eq!(liquidate_borrow_allowed(&check).unwrap(), RejectCode::TooMuchRepay);

        check.repay_amount = 50 * WAD;
        assert_eq!(liquidate_borrow_allowed(&check).unwrap(), RejectCode::NoError);

        check.liquidator_allowed = false;
        assert_eq!(liquidate_borrow_allowed(&check).unwrap(), RejectCode::Unauthorized);

        check.liquidator_allowed = true;
        check.borrower_liquidity = Liquidity { liquidity: WAD, shortfall: 0 };
        assert_eq!(
            liquidate_borrow_allowed(&check).unwrap(),
            RejectCode::InsufficientShortfall
        );
    }

    #[test]
    fn test_seize_requires_membership() {
        let mut collateral = listed_market();
        let borrowed = listed_market();
        let (outcome, _) = seize_allowed(
            &mut collateral,
            Pubkey::new_unique(),
            &borrowed,
            false,
            &mut Position::default(),
            &mut AccountMembership::default(),
            &mut Position::default(),
            &mut AccountMembership::default(),
            clock(),
        )
        .unwrap();
        assert_eq!(outcome.code, RejectCode::MarketNotEntered);
    }

    #[test]
    fn test_exit_with_debt_rejected() {
        let market = listed_market();
        let position = Position {
            borrow_principal: WAD,
            borrow_index_snapshot: WAD,
            ..Position::default()
        };
        let key = Pubkey::new_unique();
        let code = exit_market_allowed(
            &market,
            &position,
            &AccountMembership::default(),
            &[],
            &target(key, 0),
        )
        .unwrap();
        assert_eq!(code, RejectCode::NonzeroBorrowBalance);
    }
}
