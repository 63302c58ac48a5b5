use anchor_lang::prelude::*;

#[error_code]
pub enum LendingError {
    // === Authorization Errors (6000-6009) ===
    #[msg("Caller is not authorized to perform this action")]
    Unauthorized = 6000,

    #[msg("Invalid owner for this operation")]
    InvalidOwner = 6001,

    #[msg("Liquidator is not on the allow-list")]
    LiquidatorNotAllowed = 6002,

    #[msg("Market belongs to a different comptroller")]
    ComptrollerMismatch = 6003,

    // === Input Validation Errors (6010-6029) ===
    #[msg("Amount must be greater than zero")]
    ZeroAmount = 6010,

    #[msg("Invalid input")]
    InvalidInput = 6011,

    #[msg("Close factor outside [5%, 90%]")]
    InvalidCloseFactor = 6012,

    #[msg("Collateral factor exceeds 90%")]
    InvalidCollateralFactor = 6013,

    #[msg("Liquidation incentive outside [100%, 150%]")]
    InvalidLiquidationIncentive = 6014,

    #[msg("Reserve factor exceeds 100%")]
    InvalidReserveFactor = 6015,

    #[msg("Protocol seize share exceeds 100%")]
    InvalidProtocolSeizeShare = 6016,

    #[msg("Invalid mint address")]
    InvalidMint = 6017,

    #[msg("Invalid price feed account")]
    InvalidPriceFeed = 6018,

    #[msg("Invalid interest rate model account")]
    InvalidRateModel = 6019,

    #[msg("Remaining accounts do not match the entered markets")]
    InvalidRemainingAccounts = 6020,

    #[msg("Invalid reward token")]
    InvalidRewardToken = 6021,

    #[msg("Liquidator cannot be the borrower")]
    SelfLiquidation = 6022,

    #[msg("Repay amount cannot be the repay-max sentinel")]
    InvalidCloseAmount = 6023,

    #[msg("Borrowed and collateral markets must differ")]
    SameMarket = 6024,

    // === Market Errors (6030-6049) ===
    #[msg("Market is not listed")]
    MarketNotListed = 6030,

    #[msg("Market is already listed")]
    MarketAlreadyListed = 6031,

    #[msg("Maximum number of markets reached")]
    TooManyMarkets = 6032,

    #[msg("Market not entered")]
    MarketNotEntered = 6033,

    #[msg("Too many assets entered")]
    TooManyAssets = 6034,

    #[msg("Market is locked by an in-flight operation")]
    MarketLocked = 6035,

    #[msg("Borrow cap reached")]
    BorrowCapReached = 6036,

    #[msg("Maximum number of reward tokens reached")]
    TooManyRewardTokens = 6037,

    #[msg("Reward token already registered")]
    RewardTokenExists = 6038,

    #[msg("Market interest was not accrued in this instant")]
    MarketNotFresh = 6039,

    // === Balance Errors (6050-6069) ===
    #[msg("Insufficient supply balance")]
    InsufficientBalance = 6050,

    #[msg("Insufficient cash in market")]
    InsufficientCash = 6051,

    #[msg("Insufficient account liquidity")]
    InsufficientLiquidity = 6052,

    #[msg("Repay amount exceeds borrow balance")]
    RepayExceedsBalance = 6053,

    #[msg("Reduce amount exceeds reserves")]
    InsufficientReserves = 6054,

    #[msg("Borrower balance cannot cover the seize")]
    SeizeTooMuch = 6055,

    // === Health Errors (6070-6079) ===
    #[msg("Account has no shortfall")]
    InsufficientShortfall = 6070,

    #[msg("Repay exceeds close factor")]
    TooMuchRepay = 6071,

    #[msg("Position is not empty, cannot close")]
    PositionNotEmpty = 6072,

    #[msg("Nonzero borrow balance")]
    NonzeroBorrowBalance = 6073,

    // === Pause Errors (6080-6089) ===
    #[msg("Mint is paused")]
    MintPaused = 6080,

    #[msg("Borrow is paused")]
    BorrowPaused = 6081,

    #[msg("Seize is paused")]
    SeizePaused = 6082,

    // === Oracle Errors (6090-6109) ===
    #[msg("Oracle price is stale")]
    OracleStale = 6090,

    #[msg("Oracle returned invalid price")]
    OracleInvalidPrice = 6091,

    #[msg("Collateral market was not accrued in this instant")]
    PriceNotAccrued = 6092,

    // === Rate Model Errors (6110-6119) ===
    #[msg("Rate model parameters invalid")]
    InvalidRateParameters = 6110,

    // === Math Errors (6120-6139) ===
    #[msg("Math overflow")]
    MathOverflow = 6120,

    #[msg("Math underflow")]
    MathUnderflow = 6121,

    #[msg("Division by zero")]
    DivisionByZero = 6122,

    #[msg("Amount exceeds u64 maximum")]
    AmountOverflow = 6123,

    // === Policy Rejection (6140) ===
    #[msg("Comptroller rejected the operation")]
    ComptrollerRejection = 6140,
}

/// Numeric policy outcome returned by the comptroller gates.
///
/// The discriminants are a stable wire mapping and must not be reordered.
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum RejectCode {
    NoError = 0,
    Unauthorized = 1,
    ComptrollerMismatch = 2,
    InsufficientShortfall = 3,
    InsufficientLiquidity = 4,
    InvalidCloseFactor = 5,
    InvalidCollateralFactor = 6,
    InvalidLiquidationIncentive = 7,
    MarketNotEntered = 8,
    MarketNotListed = 9,
    MarketAlreadyListed = 10,
    MathError = 11,
    NonzeroBorrowBalance = 12,
    PriceError = 13,
    Rejection = 14,
    SnapshotError = 15,
    TooManyAssets = 16,
    TooMuchRepay = 17,
}

impl RejectCode {
    pub fn code(self) -> u8 {
        self as u8
    }

    pub fn is_ok(self) -> bool {
        self == RejectCode::NoError
    }

    /// Convert a gate outcome into a result, logging the numeric code.
    pub fn into_result(self, action: &str) -> Result<()> {
        if self.is_ok() {
            return Ok(());
        }
        msg!("{} rejected ({:02})", action, self.code());
        Err(LendingError::from(self).into())
    }
}

impl From<RejectCode> for LendingError {
    fn from(code: RejectCode) -> Self {
        match code {
            RejectCode::Unauthorized => LendingError::LiquidatorNotAllowed,
            RejectCode::ComptrollerMismatch => LendingError::ComptrollerMismatch,
            RejectCode::InsufficientShortfall => LendingError::InsufficientShortfall,
            RejectCode::InsufficientLiquidity => LendingError::InsufficientLiquidity,
            RejectCode::InvalidCloseFactor => LendingError::InvalidCloseFactor,
            RejectCode::InvalidCollateralFactor => LendingError::InvalidCollateralFactor,
            RejectCode::InvalidLiquidationIncentive => LendingError::InvalidLiquidationIncentive,
            RejectCode::MarketNotEntered => LendingError::MarketNotEntered,
            RejectCode::MarketNotListed => LendingError::MarketNotListed,
            RejectCode::MarketAlreadyListed => LendingError::MarketAlreadyListed,
            RejectCode::MathError => LendingError::MathOverflow,
            RejectCode::NonzeroBorrowBalance => LendingError::NonzeroBorrowBalance,
            RejectCode::PriceError => LendingError::OracleInvalidPrice,
            RejectCode::TooManyAssets => LendingError::TooManyAssets,
            RejectCode::TooMuchRepay => LendingError::TooMuchRepay,
            RejectCode::NoError | RejectCode::Rejection | RejectCode::SnapshotError => {
                LendingError::ComptrollerRejection
            }
        }
    }
}
