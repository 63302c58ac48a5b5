//! 256-bit unsigned integer for intermediate products
//!
//! Exchange-rate mantissas times share balances, and price mantissas times
//! underlying amounts, routinely exceed 128 bits before the final division.

#![allow(clippy::assign_op_pattern)]
#![allow(clippy::ptr_offset_with_cast)]
#![allow(clippy::manual_range_contains)]

use uint::construct_uint;

construct_uint! {
    pub struct U256(4);
}

impl U256 {
    /// Narrow to u128, returning None when the value does not fit
    pub fn try_to_u128(self) -> Option<u128> {
        if self.bits() > 128 {
            return None;
        }
        Some(self.as_u128())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wide_product_narrows_after_division() {
        let a = U256::from(u128::MAX);
        let b = U256::from(4u8);
        let wide = a * b;
        assert!(wide.try_to_u128().is_none());
        assert_eq!((wide / b).try_to_u128(), Some(u128::MAX));
    }
}
