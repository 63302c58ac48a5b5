//! Account liquidity fold
//!
//! `collateral = shares * exchange_rate * price * collateral_factor` and
//! `debt = borrow_balance * price`, summed over the entered markets.
//! Exactly one of liquidity and shortfall is non-zero, or both are zero.

use anchor_lang::prelude::*;
use crate::errors::LendingError;
use crate::math::{checked_add, wad_mul_down, shares_to_amount_down};
use crate::state::{Market, Position};

/// One entered market's contribution to an account's liquidity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AccountMarketSnapshot {
    pub market: Pubkey,
    pub shares: u128,
    pub borrow_balance: u128,
    pub exchange_rate: u128,
    pub collateral_factor: u128,
    pub price: u128,
}

impl AccountMarketSnapshot {
    pub fn from_state(
        key: Pubkey,
        market: &Market,
        position: &Position,
        price: u128,
    ) -> Result<Self> {
        Ok(Self {
            market: key,
            shares: position.shares,
            borrow_balance: market.borrow_balance_stored(position)?,
            exchange_rate: market.exchange_rate_stored()?,
            collateral_factor: market.collateral_factor,
            price,
        })
    }

    /// Risk-adjusted USD value of `shares` in this market (18 decimals)
    pub fn collateral_value(&self, shares: u128) -> Result<u128> {
        let underlying = shares_to_amount_down(shares, self.exchange_rate)?;
        let value = wad_mul_down(underlying, self.price)?;
        wad_mul_down(value, self.collateral_factor)
    }

    /// USD value of `amount` of underlying debt (18 decimals)
    pub fn debt_value(&self, amount: u128) -> Result<u128> {
        wad_mul_down(amount, self.price)
    }
}

/// (liquidity, shortfall) pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Liquidity {
    pub liquidity: u128,
    pub shortfall: u128,
}

impl Liquidity {
    fn from_sums(collateral: u128, debt: u128) -> Self {
        if collateral >= debt {
            Self { liquidity: collateral - debt, shortfall: 0 }
        } else {
            Self { liquidity: 0, shortfall: debt - collateral }
        }
    }

    pub fn has_shortfall(&self) -> bool {
        self.shortfall > 0
    }
}

/// A pending redeem or borrow in `target`, applied on top of the fold
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HypotheticalAction {
    pub target: AccountMarketSnapshot,
    pub redeem_shares: u128,
    pub borrow_amount: u128,
}

pub fn account_liquidity(snapshots: &[AccountMarketSnapshot]) -> Result<Liquidity> {
    hypothetical_account_liquidity(snapshots, None)
}

pub fn hypothetical_account_liquidity(
    snapshots: &[AccountMarketSnapshot],
    action: Option<&HypotheticalAction>,
) -> Result<Liquidity> {
    let mut sum_collateral = 0u128;
    let mut sum_borrow_plus_effects = 0u128;

    for snapshot in snapshots {
        require!(snapshot.price > 0, LendingError::OracleInvalidPrice);
        sum_collateral = checked_add(sum_collateral, snapshot.collateral_value(snapshot.shares)?)?;
        sum_borrow_plus_effects = checked_add(
            sum_borrow_plus_effects,
            snapshot.debt_value(snapshot.borrow_balance)?,
        )?;
    }

    if let Some(action) = action {
        require!(action.target.price > 0, LendingError::OracleInvalidPrice);
        sum_borrow_plus_effects = checked_add(
            sum_borrow_plus_effects,
            action.target.collateral_value(action.redeem_shares)?,
        )?;
        sum_borrow_plus_effects = checked_add(
            sum_borrow_plus_effects,
            action.target.debt_value(action.borrow_amount)?,
        )?;
    }

    Ok(Liquidity::from_sums(sum_collateral, sum_borrow_plus_effects))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::WAD;

    fn snapshot(shares: u128, borrow: u128, cf: u128) -> AccountMarketSnapshot {
        AccountMarketSnapshot {
            market: Pubkey::new_unique(),
            shares,
            borrow_balance: borrow,
            exchange_rate: WAD,
            collateral_factor: cf,
            price: WAD,
        }
    }

    #[test]
    fn test_shortfall_of_one_dollar() {
        let collateral = snapshot(100 * WAD, 0, WAD * 7 / 10);
        let debt = snapshot(0, 71 * WAD, 0);

        let result = account_liquidity(&[collateral, debt]).unwrap();

        assert_eq!(result, Liquidity { liquidity: 0, shortfall: WAD });
    }

    #[test]
    fn test_liquidity_when_collateralized() {
        let position = snapshot(100 * WAD, 50 * WAD, WAD * 7 / 10);
        let result = account_liquidity(&[position]).unwrap();
        assert_eq!(result, Liquidity { liquidity: 20 * WAD, shortfall: 0 });
    }

    #[test]
    fn test_empty_set_is_zero() {
        assert_eq!(account_liquidity(&[]).unwrap(), Liquidity::default());
    }

    #[test]
    fn test_hypothetical_redeem_and_borrow() {
        let position = snapshot(100 * WAD, 0, WAD / 2);

        let redeem = HypotheticalAction {
            target: position,
            redeem_shares: 60 * WAD,
            borrow_amount: 0,
        };
        let after_redeem = hypothetical_account_liquidity(&[position], Some(&redeem)).unwrap();
        assert_eq!(after_redeem.liquidity, 20 * WAD);

        let borrow = HypotheticalAction {
            target: position,
            redeem_shares: 0,
            borrow_amount: 51 * WAD,
        };
        let after_borrow = hypothetical_account_liquidity(&[position], Some(&borrow)).unwrap();
        assert_eq!(after_borrow.shortfall, WAD);
    }

    #[test]
    fn test_zero_price_fails_closed() {
        let mut position = snapshot(100 * WAD, 0, WAD / 2);
        position.price = 0;
        assert!(account_liquidity(&[position]).is_err());
    }

    #[test]
    fn test_price_scaling_for_six_decimal_asset() {
        // 1 USD per whole token with 6 decimals -> 1e30 per smallest unit
        let price = 1_000_000_000_000_000_000_000_000_000_000u128;
        let position = AccountMarketSnapshot {
            market: Pubkey::new_unique(),
            shares: 0,
            borrow_balance: 250_000_000, // 250 tokens
            exchange_rate: WAD,
            collateral_factor: 0,
            price,
        };
        let result = account_liquidity(&[position]).unwrap();
        assert_eq!(result.shortfall, 250 * WAD);
    }
}
