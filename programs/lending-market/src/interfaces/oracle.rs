//! Price oracle interface
//!
//! An external adapter publishes prices into a `PriceFeed` account; the
//! engine only reads them. Price mantissa convention: USD per smallest
//! underlying unit scaled by 1e(36 - underlying_decimals), so
//! `amount * price / 1e18` is a USD value with 18 decimals.

use anchor_lang::prelude::*;
use crate::errors::LendingError;

/// Narrow read surface the risk engine consumes
pub trait PriceOracle {
    /// Latest price mantissa; fails closed on a zero or stale price
    fn underlying_price(&self, now: i64, max_stale_period: i64) -> Result<u128>;
}

/// Published price for one underlying mint
///
/// PDA Seeds: [PROGRAM_SEED_PREFIX, b"price_feed", underlying_mint]
#[account]
#[derive(Default)]
pub struct PriceFeed {
    pub bump: u8,

    /// Underlying mint this feed prices
    pub underlying_mint: Pubkey,

    /// Adapter allowed to publish
    pub authority: Pubkey,

    /// Price mantissa (see module docs)
    pub price: u128,

    /// Unix timestamp of the last publication
    pub publish_time: i64,
}

impl PriceFeed {
    pub const SEED: &'static [u8] = b"price_feed";

    pub fn space() -> usize {
        8 +     // discriminator
        1 +     // bump
        32 +    // underlying_mint
        32 +    // authority
        16 +    // price
        8       // publish_time
    }
}

impl PriceOracle for PriceFeed {
    fn underlying_price(&self, now: i64, max_stale_period: i64) -> Result<u128> {
        require!(self.price > 0, LendingError::OracleInvalidPrice);
        require!(self.publish_time <= now, LendingError::OracleInvalidPrice);
        require!(
            now - self.publish_time <= max_stale_period,
            LendingError::OracleStale
        );
        Ok(self.price)
    }
}
