//! Fixed-point WAD (1e18) arithmetic operations
//!
//! Values are u128 mantissas with WAD scaling. Products are formed in
//! 256 bits and narrowed after the division, so only the final result
//! has to fit in u128.

use anchor_lang::prelude::*;
use crate::errors::LendingError;
use crate::constants::WAD;
use super::u256::U256;

/// Multiply then divide, rounding DOWN
/// Order: (a * b) / c
///
/// # Arguments
/// * `a` - First multiplicand
/// * `b` - Second multiplicand
/// * `c` - Divisor (must be non-zero)
pub fn mul_div_down(a: u128, b: u128, c: u128) -> Result<u128> {
    if c == 0 {
        return Err(LendingError::DivisionByZero.into());
    }

    if a == 0 || b == 0 {
        return Ok(0);
    }

    let product = U256::from(a) * U256::from(b);
    (product / U256::from(c))
        .try_to_u128()
        .ok_or_else(|| LendingError::MathOverflow.into())
}

/// Multiply then divide, rounding UP
/// Formula: (a * b + c - 1) / c
pub fn mul_div_up(a: u128, b: u128, c: u128) -> Result<u128> {
    if c == 0 {
        return Err(LendingError::DivisionByZero.into());
    }

    if a == 0 || b == 0 {
        return Ok(0);
    }

    let divisor = U256::from(c);
    let product = U256::from(a) * U256::from(b);
    ((product + divisor - U256::one()) / divisor)
        .try_to_u128()
        .ok_or_else(|| LendingError::MathOverflow.into())
}

/// WAD multiplication (a * b / WAD), rounded down
#[inline]
pub fn wad_mul_down(a: u128, b: u128) -> Result<u128> {
    mul_div_down(a, b, WAD)
}

/// WAD division (a * WAD / b), rounded down
#[inline]
pub fn wad_div_down(a: u128, b: u128) -> Result<u128> {
    mul_div_down(a, WAD, b)
}

/// WAD division (a * WAD / b), rounded up
#[inline]
pub fn wad_div_up(a: u128, b: u128) -> Result<u128> {
    mul_div_up(a, WAD, b)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mul_div_down() {
        // 100 * 200 / 300 = 66.666... → 66
        assert_eq!(mul_div_down(100, 200, 300).unwrap(), 66);

        assert_eq!(mul_div_down(0, 100, 50).unwrap(), 0);
        assert_eq!(mul_div_down(100, 0, 50).unwrap(), 0);
        assert!(mul_div_down(100, 200, 0).is_err());
    }

    #[test]
    fn test_mul_div_up() {
        // 100 * 200 / 300 = 66.666... → 67
        assert_eq!(mul_div_up(100, 200, 300).unwrap(), 67);

        // Exact division should be same
        assert_eq!(mul_div_up(100, 200, 200).unwrap(), 100);
    }

    #[test]
    fn test_wide_intermediate() {
        // 2e26 * 1e20 overflows u128 but the quotient does not
        let rate = 200_000_000_000_000_000_000_000_000u128;
        let shares = 100_000_000_000_000_000_000u128;
        let amount = wad_mul_down(shares, rate).unwrap();
        assert_eq!(amount, 20_000_000_000_000_000_000_000_000_000u128);
    }

    #[test]
    fn test_result_overflow_is_error() {
        assert!(mul_div_down(u128::MAX, u128::MAX, 1).is_err());
    }

    #[test]
    fn test_wad_mul_div() {
        let half_wad = WAD / 2;

        // 0.5 * 1.0 = 0.5
        assert_eq!(wad_mul_down(half_wad, WAD).unwrap(), half_wad);
        // 0.5 * 0.5 = 0.25
        assert_eq!(wad_mul_down(half_wad, half_wad).unwrap(), WAD / 4);
        // 1 / 3 rounds both ways
        assert_eq!(wad_div_down(1, 3).unwrap(), 333_333_333_333_333_333);
        assert_eq!(wad_div_up(1, 3).unwrap(), 333_333_333_333_333_334);
    }
}
