//! Protocol constants and configuration bounds

/// Program-specific seed prefix for all PDAs
pub const PROGRAM_SEED_PREFIX: &[u8] = b"lending_v1";

// === Fixed-Point Constants ===

/// WAD = 1e18, the mantissa scale for rates, factors and exchange rates
pub const WAD: u128 = 1_000_000_000_000_000_000;

// === Interest Rate Constants ===

/// Seconds per year for rate conversions
pub const SECONDS_PER_YEAR: u128 = 31_536_000;

/// Maximum borrow rate per second (1000% APR cap)
pub const MAX_BORROW_RATE_PER_SECOND: u128 = WAD * 10 / SECONDS_PER_YEAR;

// === Risk Parameter Bounds ===

/// Close factor lower bound (5%)
pub const CLOSE_FACTOR_MIN: u128 = WAD / 20;

/// Close factor upper bound (90%)
pub const CLOSE_FACTOR_MAX: u128 = WAD * 9 / 10;

/// Collateral factor upper bound (90%)
pub const COLLATERAL_FACTOR_MAX: u128 = WAD * 9 / 10;

/// Liquidation incentive lower bound (no bonus)
pub const LIQUIDATION_INCENTIVE_MIN: u128 = WAD;

/// Liquidation incentive upper bound (50% bonus)
pub const LIQUIDATION_INCENTIVE_MAX: u128 = WAD * 3 / 2;

/// Reserve factor upper bound (100%)
pub const RESERVE_FACTOR_MAX: u128 = WAD;

/// Protocol seize share upper bound (100%)
pub const PROTOCOL_SEIZE_SHARE_MAX: u128 = WAD;

// === Capacity Limits ===

/// Maximum number of markets in the controller arena
pub const MAX_MARKETS: usize = 32;

/// Hard cap on markets a single account may enter
pub const MAX_ENTERED_MARKETS: usize = 16;

/// Maximum number of reward tokens
pub const MAX_REWARD_TOKENS: usize = 4;

// === Rewards ===

/// Reward index scale: reward tokens per share times 1e36
pub const REWARD_INDEX_SCALE: u128 = WAD * WAD;

/// Starting value for market reward indices
pub const REWARD_INITIAL_INDEX: u128 = REWARD_INDEX_SCALE;

// === Oracle ===

/// Default maximum age of a published price (seconds)
pub const DEFAULT_MAX_STALE_PERIOD: i64 = 960;

// === Ledger ===

/// Sentinel repay amount meaning "repay the full outstanding balance"
pub const REPAY_MAX: u64 = u64::MAX;

/// Ledger implementation version written into every new market
pub const LEDGER_VERSION: u8 = 1;

// === Safe Math Constants ===

/// Maximum value that fits in u64
pub const MAX_U64: u128 = u64::MAX as u128;
