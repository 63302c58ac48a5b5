use anchor_lang::prelude::*;

// === Comptroller Events ===

#[event]
pub struct ComptrollerInitialized {
    pub admin: Pubkey,
    pub close_factor: u128,
    pub liquidation_incentive: u128,
    pub max_assets: u8,
}

#[event]
pub struct AdminTransferStarted {
    pub current_admin: Pubkey,
    pub pending_admin: Pubkey,
}

#[event]
pub struct AdminTransferred {
    pub previous_admin: Pubkey,
    pub new_admin: Pubkey,
}

#[event]
pub struct NewCloseFactor {
    pub old_close_factor: u128,
    pub new_close_factor: u128,
}

#[event]
pub struct NewLiquidationIncentive {
    pub old_incentive: u128,
    pub new_incentive: u128,
}

#[event]
pub struct NewMaxAssets {
    pub old_max_assets: u8,
    pub new_max_assets: u8,
}

#[event]
pub struct NewMaxStalePeriod {
    pub old_period: i64,
    pub new_period: i64,
}

#[event]
pub struct SeizePausedSet {
    pub paused: bool,
}

#[event]
pub struct LiquidatorAllowanceSet {
    pub liquidator: Pubkey,
    pub allowed: bool,
}

// === Rate Model Events ===

#[event]
pub struct RateModelUpdated {
    pub rate_model: Pubkey,
    pub base_rate_per_second: u128,
    pub multiplier_per_second: u128,
    pub jump_multiplier_per_second: u128,
    pub kink: u128,
}

// === Oracle Events ===

#[event]
pub struct PriceFeedCreated {
    pub price_feed: Pubkey,
    pub underlying_mint: Pubkey,
    pub authority: Pubkey,
}

#[event]
pub struct PricePublished {
    pub price_feed: Pubkey,
    pub price: u128,
    pub publish_time: i64,
}

// === Market Events ===

#[event]
pub struct MarketCreated {
    pub market: Pubkey,
    pub market_index: u16,
    pub underlying_mint: Pubkey,
    pub interest_rate_model: Pubkey,
    pub price_feed: Pubkey,
    pub initial_exchange_rate: u128,
    pub version: u8,
}

#[event]
pub struct MarketListed {
    pub market: Pubkey,
    pub listed: bool,
}

#[event]
pub struct NewCollateralFactor {
    pub market: Pubkey,
    pub old_collateral_factor: u128,
    pub new_collateral_factor: u128,
}

#[event]
pub struct NewReserveFactor {
    pub market: Pubkey,
    pub old_reserve_factor: u128,
    pub new_reserve_factor: u128,
}

#[event]
pub struct NewProtocolSeizeShare {
    pub market: Pubkey,
    pub old_share: u128,
    pub new_share: u128,
}

#[event]
pub struct NewInterestRateModel {
    pub market: Pubkey,
    pub old_model: Pubkey,
    pub new_model: Pubkey,
}

#[event]
pub struct NewBorrowCap {
    pub market: Pubkey,
    pub borrow_cap: u128,
}

#[event]
pub struct ActionPausedSet {
    pub market: Pubkey,
    pub mint_paused: bool,
    pub borrow_paused: bool,
}

// === Position Events ===

#[event]
pub struct PositionOpened {
    pub market: Pubkey,
    pub owner: Pubkey,
}

#[event]
pub struct PositionClosed {
    pub market: Pubkey,
    pub owner: Pubkey,
}

#[event]
pub struct MarketEntered {
    pub market: Pubkey,
    pub account: Pubkey,
}

#[event]
pub struct MarketExited {
    pub market: Pubkey,
    pub account: Pubkey,
}

// === Ledger Events ===

#[event]
pub struct AccrueInterest {
    pub market: Pubkey,
    pub borrow_rate: u128,
    pub interest_accumulated: u128,
    pub borrow_index: u128,
    pub total_borrows: u128,
    pub total_reserves: u128,
}

#[event]
pub struct Mint {
    pub market: Pubkey,
    pub minter: Pubkey,
    pub amount: u128,
    pub shares: u128,
}

#[event]
pub struct Redeem {
    pub market: Pubkey,
    pub redeemer: Pubkey,
    pub amount: u128,
    pub shares: u128,
}

#[event]
pub struct Borrow {
    pub market: Pubkey,
    pub borrower: Pubkey,
    pub amount: u128,
    pub account_borrows: u128,
    pub total_borrows: u128,
}

#[event]
pub struct RepayBorrow {
    pub market: Pubkey,
    pub payer: Pubkey,
    pub borrower: Pubkey,
    pub amount: u128,
    pub account_borrows: u128,
    pub total_borrows: u128,
}

#[event]
pub struct LiquidateBorrow {
    pub liquidator: Pubkey,
    pub borrower: Pubkey,
    pub borrowed_market: Pubkey,
    pub collateral_market: Pubkey,
    pub repay_amount: u128,
    pub seize_shares: u128,
    pub protocol_seize_shares: u128,
}

#[event]
pub struct ReservesAdded {
    pub market: Pubkey,
    pub benefactor: Pubkey,
    pub amount: u128,
    pub total_reserves: u128,
}

#[event]
pub struct ReservesReduced {
    pub market: Pubkey,
    pub admin: Pubkey,
    pub amount: u128,
    pub total_reserves: u128,
}

// === View Events ===

#[event]
pub struct AccountLiquidity {
    pub account: Pubkey,
    pub liquidity: u128,
    pub shortfall: u128,
}

#[event]
pub struct MarketState {
    pub market: Pubkey,
    pub exchange_rate: u128,
    pub borrow_rate: u128,
    pub supply_rate: u128,
    pub cash: u128,
    pub total_borrows: u128,
    pub total_reserves: u128,
    pub total_supply_shares: u128,
}

#[event]
pub struct AccountSnapshot {
    pub market: Pubkey,
    pub account: Pubkey,
    pub shares: u128,
    pub borrow_balance: u128,
    pub exchange_rate: u128,
    pub balance_of_underlying: u128,
}

// === Reward Events ===

#[event]
pub struct RewardTokenAdded {
    pub reward_type: u8,
    pub mint: Pubkey,
    pub vault: Pubkey,
}

#[event]
pub struct RewardSpeedUpdated {
    pub market: Pubkey,
    pub reward_type: u8,
    pub old_supply_speed: u64,
    pub new_supply_speed: u64,
    pub old_borrow_speed: u64,
    pub new_borrow_speed: u64,
}

#[event]
pub struct RewardDistributed {
    pub market: Pubkey,
    pub account: Pubkey,
    pub reward_type: u8,
    pub borrow_side: bool,
    pub amount: u128,
}

#[event]
pub struct RewardClaimed {
    pub account: Pubkey,
    pub reward_type: u8,
    pub amount: u128,
}
