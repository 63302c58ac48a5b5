//! Math library modules for safe arithmetic operations

pub mod u256;
pub mod packed;
pub mod safe_math;
pub mod wad;
pub mod exchange;
pub mod interest;

pub use u256::U256;
pub use packed::PackedU256;
pub use safe_math::*;
pub use wad::*;
pub use exchange::*;
pub use interest::*;
