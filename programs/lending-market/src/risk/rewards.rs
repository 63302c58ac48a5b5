//! Reward accrual
//!
//! Each market keeps, per reward token, a supply index and a borrow index
//! that grow by `speed * dt * 1e36 / total_shares`. Accounts snapshot the
//! index and collect `(index - snapshot) * account_shares / 1e36` on every
//! touch. While a side has zero total shares its index holds still and the
//! timestamp advances, so that interval is never distributed.
//! Indices are stored as 256-bit values.

use anchor_lang::prelude::*;
use crate::constants::{REWARD_INDEX_SCALE, REWARD_INITIAL_INDEX, MAX_REWARD_TOKENS};
use crate::errors::LendingError;
use crate::math::{checked_mul, elapsed_seconds, PackedU256, U256};
use crate::state::{AccountMembership, Market, Position};

/// Rewards distributed to one account in one touch, per reward type
pub type Distributed = [u128; MAX_REWARD_TOKENS];

pub const INITIAL_REWARD_INDEX: PackedU256 = PackedU256::from_u128(REWARD_INITIAL_INDEX);

fn advance_index(
    index: &mut PackedU256,
    timestamp: &mut i64,
    speed: u64,
    total_shares: u128,
    now: i64,
) -> Result<()> {
    if index.is_zero() {
        *index = INITIAL_REWARD_INDEX;
        *timestamp = now;
        return Ok(());
    }

    let dt = elapsed_seconds(*timestamp, now);
    if dt == 0 {
        return Ok(());
    }

    if speed > 0 && total_shares > 0 {
        let accrued = checked_mul(speed as u128, dt)?;
        let ratio = U256::from(accrued)
            .checked_mul(U256::from(REWARD_INDEX_SCALE))
            .ok_or(LendingError::MathOverflow)?
            / U256::from(total_shares);
        let next = U256::from(*index)
            .checked_add(ratio)
            .ok_or(LendingError::MathOverflow)?;
        *index = next.into();
    }
    *timestamp = now;
    Ok(())
}

/// Zero snapshots count from the initial index
fn effective_snapshot(snapshot: PackedU256, index: U256) -> U256 {
    let initial = U256::from(REWARD_INITIAL_INDEX);
    if snapshot.is_zero() && index >= initial {
        return initial;
    }
    U256::from(snapshot)
}

/// `balance * (index - snapshot) / 1e36`, rounded down
fn reward_for(balance: u128, index: U256, snapshot: U256) -> Result<u128> {
    let delta = index
        .checked_sub(snapshot)
        .ok_or(LendingError::MathUnderflow)?;
    let amount = U256::from(balance)
        .checked_mul(delta)
        .ok_or(LendingError::MathOverflow)?
        / U256::from(REWARD_INDEX_SCALE);
    amount.try_to_u128().ok_or_else(|| LendingError::MathOverflow.into())
}

pub fn update_supply_index(market: &mut Market, reward_type: usize, now: i64) -> Result<()> {
    let total_shares = market.total_supply_shares;
    let state = &mut market.rewards[reward_type];
    advance_index(
        &mut state.supply_index,
        &mut state.supply_timestamp,
        state.supply_speed,
        total_shares,
        now,
    )
}

pub fn update_borrow_index(market: &mut Market, reward_type: usize, now: i64) -> Result<()> {
    let total_shares = market.borrow_reward_base()?;
    let state = &mut market.rewards[reward_type];
    advance_index(
        &mut state.borrow_index,
        &mut state.borrow_timestamp,
        state.borrow_speed,
        total_shares,
        now,
    )
}

/// Credit a supplier with rewards earned since its last snapshot
pub fn distribute_supplier(
    market: &Market,
    position: &mut Position,
    membership: &mut AccountMembership,
    reward_type: usize,
) -> Result<u128> {
    let stored = market.rewards[reward_type].supply_index;
    let index = U256::from(stored);
    let snapshot = effective_snapshot(position.supplier_reward_index[reward_type], index);
    position.supplier_reward_index[reward_type] = stored;

    let amount = reward_for(position.shares, index, snapshot)?;
    membership.accrue_reward(reward_type, amount)?;
    Ok(amount)
}

/// Credit a borrower with rewards earned since its last snapshot
pub fn distribute_borrower(
    market: &Market,
    position: &mut Position,
    membership: &mut AccountMembership,
    reward_type: usize,
) -> Result<u128> {
    let stored = market.rewards[reward_type].borrow_index;
    let index = U256::from(stored);
    let snapshot = effective_snapshot(position.borrower_reward_index[reward_type], index);
    position.borrower_reward_index[reward_type] = stored;

    let amount = reward_for(market.borrower_reward_base(position)?, index, snapshot)?;
    membership.accrue_reward(reward_type, amount)?;
    Ok(amount)
}

/// Update every supply index and distribute to one supplier
pub fn refresh_supplier(
    market: &mut Market,
    position: &mut Position,
    membership: &mut AccountMembership,
    reward_tokens: usize,
    now: i64,
) -> Result<Distributed> {
    let mut distributed = Distributed::default();
    for reward_type in 0..reward_tokens {
        update_supply_index(market, reward_type, now)?;
        distributed[reward_type] = distribute_supplier(market, position, membership, reward_type)?;
    }
    Ok(distributed)
}

/// Update every borrow index and distribute to one borrower
pub fn refresh_borrower(
    market: &mut Market,
    position: &mut Position,
    membership: &mut AccountMembership,
    reward_tokens: usize,
    now: i64,
) -> Result<Distributed> {
    let mut distributed = Distributed::default();
    for reward_type in 0..reward_tokens {
        update_borrow_index(market, reward_type, now)?;
        distributed[reward_type] = distribute_borrower(market, position, membership, reward_type)?;
    }
    Ok(distributed)
}

/// Change speeds after accruing both sides under the old speeds.
/// Returns the previous (supply, borrow) speeds.
pub fn set_reward_speeds(
    market: &mut Market,
    reward_type: usize,
    supply_speed: u64,
    borrow_speed: u64,
    now: i64,
) -> Result<(u64, u64)> {
    update_supply_index(market, reward_type, now)?;
    update_borrow_index(market, reward_type, now)?;

    let state = &mut market.rewards[reward_type];
    let previous = (state.supply_speed, state.borrow_speed);
    state.supply_speed = supply_speed;
    state.borrow_speed = borrow_speed;
    Ok(previous)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::WAD;

    fn market_with_speed(supply_speed: u64, borrow_speed: u64) -> Market {
        let mut market = Market {
            is_listed: true,
            borrow_index: WAD,
            initial_exchange_rate: WAD,
            ..Market::default()
        };
        set_reward_speeds(&mut market, 0, supply_speed, borrow_speed, 0).unwrap();
        market
    }

    fn supplier(market: &mut Market, shares: u128) -> Position {
        let mut position = Position::default();
        let mut membership = AccountMembership::default();
        refresh_supplier(market, &mut position, &mut membership, 1, 0).unwrap();
        position.shares = shares;
        market.total_supply_shares += shares;
        position
    }

    #[test]
    fn test_supply_rewards_split_by_shares() {
        let mut market = market_with_speed(100, 0);
        let mut alice = supplier(&mut market, 3 * WAD);
        let mut bob = supplier(&mut market, WAD);
        let mut alice_membership = AccountMembership::default();
        let mut bob_membership = AccountMembership::default();

        refresh_supplier(&mut market, &mut alice, &mut alice_membership, 1, 10).unwrap();
        refresh_supplier(&mut market, &mut bob, &mut bob_membership, 1, 10).unwrap();

        // 1000 tokens over 4 shares
        assert_eq!(alice_membership.reward_accrued[0], 750);
        assert_eq!(bob_membership.reward_accrued[0], 250);
    }

    #[test]
    fn test_idle_interval_is_dropped() {
        let mut market = market_with_speed(100, 0);

        update_supply_index(&mut market, 0, 50).unwrap();
        assert_eq!(market.rewards[0].supply_index, INITIAL_REWARD_INDEX);
        assert_eq!(market.rewards[0].supply_timestamp, 50);

        let mut alice = supplier(&mut market, WAD);
        let mut membership = AccountMembership::default();
        refresh_supplier(&mut market, &mut alice, &mut membership, 1, 60).unwrap();
        assert_eq!(membership.reward_accrued[0], 1_000);
    }

    #[test]
    fn test_second_touch_in_same_instant_pays_nothing() {
        let mut market = market_with_speed(100, 0);
        let mut alice = supplier(&mut market, WAD);
        let mut membership = AccountMembership::default();

        refresh_supplier(&mut market, &mut alice, &mut membership, 1, 10).unwrap();
        let again = refresh_supplier(&mut market, &mut alice, &mut membership, 1, 10).unwrap();

        assert_eq!(again[0], 0);
        assert_eq!(membership.reward_accrued[0], 1_000);
    }

    #[test]
    fn test_speed_change_accrues_under_old_speed() {
        let mut market = market_with_speed(100, 0);
        let mut alice = supplier(&mut market, WAD);

        let previous = set_reward_speeds(&mut market, 0, 10, 0, 10).unwrap();
        assert_eq!(previous, (100, 0));

        let mut membership = AccountMembership::default();
        refresh_supplier(&mut market, &mut alice, &mut membership, 1, 20).unwrap();
        assert_eq!(membership.reward_accrued[0], 1_000 + 100);
    }

    #[test]
    fn test_borrow_rewards_use_principal_over_index() {
        let mut market = market_with_speed(0, 100);
        let mut borrower = Position::default();
        let mut membership = AccountMembership::default();
        refresh_borrower(&mut market, &mut borrower, &mut membership, 1, 0).unwrap();

        market.cash = 1_000 * WAD;
        market.borrow_fresh(&mut borrower, 10 * WAD).unwrap();

        refresh_borrower(&mut market, &mut borrower, &mut membership, 1, 10).unwrap();
        // sole borrower collects everything (up to rounding)
        assert!(membership.reward_accrued[0] >= 999);
        assert!(membership.reward_accrued[0] <= 1_000);
    }

    #[test]
    fn test_late_joiner_does_not_collect_history() {
        let mut market = market_with_speed(100, 0);
        let _early = supplier(&mut market, WAD);
        update_supply_index(&mut market, 0, 100).unwrap();

        let mut late = Position::default();
        let mut membership = AccountMembership::default();
        refresh_supplier(&mut market, &mut late, &mut membership, 1, 100).unwrap();
        assert_eq!(membership.reward_accrued[0], 0);
        assert_eq!(late.supplier_reward_index[0], market.rewards[0].supply_index);
    }

    #[test]
    fn test_large_share_supply_still_accrues() {
        // 1M whole tokens (18 decimals) at a 0.02 exchange rate
        let total_shares = 50_000_000 * WAD;
        let mut market = market_with_speed(1_000_000, 0);
        let mut whale = supplier(&mut market, total_shares);
        let mut membership = AccountMembership::default();

        for round in 1..=100 {
            refresh_supplier(&mut market, &mut whale, &mut membership, 1, round * 10).unwrap();
        }

        // 1e9 emitted; at most one unit lost per touch
        let emitted = 1_000_000_000u128;
        let accrued = membership.reward_accrued[0];
        assert!(accrued <= emitted);
        assert!(emitted - accrued <= 100, "accrued {}", accrued);
    }

    #[test]
    fn test_dust_supplier_does_not_overflow_index() {
        let mut market = market_with_speed(u64::MAX, 0);
        let mut dust = supplier(&mut market, 1);
        let mut membership = AccountMembership::default();

        let year = 31_536_000;
        refresh_supplier(&mut market, &mut dust, &mut membership, 1, year).unwrap();
        assert_eq!(membership.reward_accrued[0], u64::MAX as u128 * year as u128);
    }
}
