//! Risk controller: account liquidity, policy gates, seize math,
//! reward accrual and the liquidation state machine.
//!
//! Everything here is pure over account state so it can run against
//! working copies and be exercised without a validator.

pub mod liquidity;
pub mod gates;
pub mod seize;
pub mod rewards;
pub mod liquidation;

pub use liquidity::*;
pub use gates::*;
pub use seize::*;
pub use rewards::*;
pub use liquidation::*;
