//! Risk controller state account
//!
//! Single global account holding the risk parameters shared by every
//! market, the market arena and the reward token registry.

use anchor_lang::prelude::*;
use crate::constants::{
    PROGRAM_SEED_PREFIX, MAX_MARKETS, MAX_REWARD_TOKENS, MAX_ENTERED_MARKETS,
    CLOSE_FACTOR_MIN, CLOSE_FACTOR_MAX,
    LIQUIDATION_INCENTIVE_MIN, LIQUIDATION_INCENTIVE_MAX,
};
use crate::errors::{LendingError, RejectCode};

/// Comptroller account
///
/// PDA Seeds: [PROGRAM_SEED_PREFIX, b"comptroller"]
#[account]
#[derive(Default)]
pub struct Comptroller {
    /// PDA bump seed
    pub bump: u8,

    /// Administrator of every market and risk parameter
    pub admin: Pubkey,

    /// Pending admin for 2-step transfer
    pub pending_admin: Pubkey,

    /// Max fraction of a borrow repayable in one liquidation (WAD)
    pub close_factor: u128,

    /// Collateral bonus paid to liquidators (WAD, >= 1.0)
    pub liquidation_incentive: u128,

    /// Max markets a single account may enter
    pub max_assets: u8,

    /// Oldest acceptable price age in seconds
    pub max_stale_period: i64,

    /// Global seize pause
    pub seize_paused: bool,

    /// Number of markets in the arena
    pub market_count: u16,

    /// Market arena in insertion order; index is the market's stable id
    pub markets: [Pubkey; MAX_MARKETS],

    /// Number of registered reward tokens
    pub reward_token_count: u8,

    /// Reward mints; the reward type is the index
    pub reward_mints: [Pubkey; MAX_REWARD_TOKENS],

    /// Bumps of the reward vault PDAs
    pub reward_vault_bumps: [u8; MAX_REWARD_TOKENS],

    /// Reserved for future upgrades
    pub reserved: [u8; 32],
}

impl Comptroller {
    pub const SEED: &'static [u8] = b"comptroller";
    pub const REWARD_VAULT_SEED: &'static [u8] = b"reward_vault";

    pub fn space() -> usize {
        8 +                             // discriminator
        1 +                             // bump
        32 +                            // admin
        32 +                            // pending_admin
        16 +                            // close_factor
        16 +                            // liquidation_incentive
        1 +                             // max_assets
        8 +                             // max_stale_period
        1 +                             // seize_paused
        2 +                             // market_count
        (32 * MAX_MARKETS) +            // markets
        1 +                             // reward_token_count
        (32 * MAX_REWARD_TOKENS) +      // reward_mints
        MAX_REWARD_TOKENS +             // reward_vault_bumps
        32                              // reserved
    }

    pub fn validate_close_factor(close_factor: u128) -> RejectCode {
        if !(CLOSE_FACTOR_MIN..=CLOSE_FACTOR_MAX).contains(&close_factor) {
            return RejectCode::InvalidCloseFactor;
        }
        RejectCode::NoError
    }

    pub fn validate_liquidation_incentive(incentive: u128) -> RejectCode {
        if !(LIQUIDATION_INCENTIVE_MIN..=LIQUIDATION_INCENTIVE_MAX).contains(&incentive) {
            return RejectCode::InvalidLiquidationIncentive;
        }
        RejectCode::NoError
    }

    /// Effective cap on entered markets
    pub fn entered_markets_cap(&self) -> usize {
        std::cmp::min(self.max_assets as usize, MAX_ENTERED_MARKETS)
    }

    pub fn is_registered_market(&self, market: &Pubkey) -> bool {
        self.markets[..self.market_count as usize].contains(market)
    }

    /// Append a market to the arena, returning its stable id
    pub fn register_market(&mut self, market: Pubkey) -> Result<u16> {
        require!(
            (self.market_count as usize) < MAX_MARKETS,
            LendingError::TooManyMarkets
        );
        require!(
            !self.is_registered_market(&market),
            LendingError::MarketAlreadyListed
        );

        let id = self.market_count;
        self.markets[id as usize] = market;
        self.market_count += 1;
        Ok(id)
    }

    pub fn reward_tokens(&self) -> usize {
        self.reward_token_count as usize
    }

    pub fn reward_type_of(&self, mint: &Pubkey) -> Option<usize> {
        self.reward_mints[..self.reward_tokens()]
            .iter()
            .position(|m| m == mint)
    }

    /// Register a reward mint, returning its reward type
    pub fn add_reward_token(&mut self, mint: Pubkey, vault_bump: u8) -> Result<u8> {
        require!(
            self.reward_tokens() < MAX_REWARD_TOKENS,
            LendingError::TooManyRewardTokens
        );
        require!(
            self.reward_type_of(&mint).is_none(),
            LendingError::RewardTokenExists
        );

        let reward_type = self.reward_token_count;
        self.reward_mints[reward_type as usize] = mint;
        self.reward_vault_bumps[reward_type as usize] = vault_bump;
        self.reward_token_count += 1;
        Ok(reward_type)
    }

    pub fn require_reward_type(&self, reward_type: u8) -> Result<usize> {
        require!(
            (reward_type as usize) < self.reward_tokens(),
            LendingError::InvalidRewardToken
        );
        Ok(reward_type as usize)
    }
}

/// Derive comptroller PDA
pub fn derive_comptroller(program_id: &Pubkey) -> (Pubkey, u8) {
    Pubkey::find_program_address(
        &[PROGRAM_SEED_PREFIX, Comptroller::SEED],
        program_id,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::WAD;

    #[test]
    fn test_close_factor_bounds() {
        assert_eq!(Comptroller::validate_close_factor(WAD / 2), RejectCode::NoError);
        assert_eq!(Comptroller::validate_close_factor(WAD / 20), RejectCode::NoError);
        assert_eq!(
            Comptroller::validate_close_factor(WAD / 100),
            RejectCode::InvalidCloseFactor
        );
        assert_eq!(
            Comptroller::validate_close_factor(WAD),
            RejectCode::InvalidCloseFactor
        );
    }

    #[test]
    fn test_liquidation_incentive_bounds() {
        assert_eq!(
            Comptroller::validate_liquidation_incentive(WAD * 108 / 100),
            RejectCode::NoError
        );
        assert_eq!(
            Comptroller::validate_liquidation_incentive(WAD - 1),
            RejectCode::InvalidLiquidationIncentive
        );
    }

    #[test]
    fn test_market_arena_is_insertion_ordered() {
        let mut comptroller = Comptroller::default();
        let a = Pubkey::new_unique();
        let b = Pubkey::new_unique();

        assert_eq!(comptroller.register_market(a).unwrap(), 0);
        assert_eq!(comptroller.register_market(b).unwrap(), 1);
        assert!(comptroller.register_market(a).is_err());
        assert_eq!(comptroller.markets[1], b);
    }

    #[test]
    fn test_arena_capacity() {
        let mut comptroller = Comptroller::default();
        for _ in 0..MAX_MARKETS {
            comptroller.register_market(Pubkey::new_unique()).unwrap();
        }
        assert!(comptroller.register_market(Pubkey::new_unique()).is_err());
    }

    #[test]
    fn test_reward_registry() {
        let mut comptroller = Comptroller::default();
        let mint = Pubkey::new_unique();

        assert_eq!(comptroller.add_reward_token(mint, 254).unwrap(), 0);
        assert!(comptroller.add_reward_token(mint, 254).is_err());
        assert_eq!(comptroller.reward_type_of(&mint), Some(0));
        assert!(comptroller.require_reward_type(0).is_ok());
        assert!(comptroller.require_reward_type(1).is_err());
    }

    #[test]
    fn test_entered_markets_cap() {
        let comptroller = Comptroller { max_assets: 200, ..Comptroller::default() };
        assert_eq!(comptroller.entered_markets_cap(), MAX_ENTERED_MARKETS);
        let comptroller = Comptroller { max_assets: 3, ..Comptroller::default() };
        assert_eq!(comptroller.entered_markets_cap(), 3);
    }
}
