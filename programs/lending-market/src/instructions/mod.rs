//! Instruction handlers

pub mod loader;
pub mod admin;
pub mod rate_model;
pub mod price_feed;
pub mod market;
pub mod position;
pub mod supply;
pub mod borrow;
pub mod liquidate;
pub mod reserves;
pub mod rewards;
pub mod utils;

pub use admin::*;
pub use rate_model::*;
pub use price_feed::*;
pub use market::*;
pub use position::*;
pub use supply::*;
pub use borrow::*;
pub use liquidate::*;
pub use reserves::*;
pub use rewards::*;
pub use utils::*;
