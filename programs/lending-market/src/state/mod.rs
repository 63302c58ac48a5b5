//! State account structures

pub mod comptroller;
pub mod market;
pub mod position;
pub mod membership;
pub mod liquidator;

pub use comptroller::*;
pub use market::*;
pub use position::*;
pub use membership::*;
pub use liquidator::*;
