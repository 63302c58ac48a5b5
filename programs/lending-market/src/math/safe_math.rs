//! Safe math utilities to prevent overflow/underflow
//!
//! All u128 → u64 conversions must go through safe_u128_to_u64()
//! so token transfer amounts never truncate silently.

use anchor_lang::prelude::*;
use crate::errors::LendingError;
use crate::constants::MAX_U64;

/// Safely convert u128 to u64, erroring on overflow
///
/// Use this for ALL token transfer amounts
///
/// # Example
/// ```ignore
/// let amount_u64 = safe_u128_to_u64(amount_u128)?;
/// transfer_tokens(..., amount_u64)?;
/// ```
#[inline]
pub fn safe_u128_to_u64(value: u128) -> Result<u64> {
    if value > MAX_U64 {
        return Err(LendingError::AmountOverflow.into());
    }
    Ok(value as u64)
}

/// Checked addition with custom error
#[inline]
pub fn checked_add(a: u128, b: u128) -> Result<u128> {
    a.checked_add(b).ok_or_else(|| LendingError::MathOverflow.into())
}

/// Checked subtraction with custom error
#[inline]
pub fn checked_sub(a: u128, b: u128) -> Result<u128> {
    a.checked_sub(b).ok_or_else(|| LendingError::MathUnderflow.into())
}

/// Checked multiplication with custom error
#[inline]
pub fn checked_mul(a: u128, b: u128) -> Result<u128> {
    a.checked_mul(b).ok_or_else(|| LendingError::MathOverflow.into())
}

/// Elapsed seconds between two clock readings, zero if the clock went backwards
#[inline]
pub fn elapsed_seconds(from: i64, to: i64) -> u128 {
    if to <= from {
        return 0;
    }
    (to - from) as u128
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_safe_u128_to_u64_within_range() {
        assert_eq!(safe_u128_to_u64(0).unwrap(), 0u64);
        assert_eq!(safe_u128_to_u64(1000).unwrap(), 1000u64);
        assert_eq!(safe_u128_to_u64(MAX_U64).unwrap(), u64::MAX);
    }

    #[test]
    fn test_safe_u128_to_u64_overflow() {
        let result = safe_u128_to_u64(MAX_U64 + 1);
        assert!(result.is_err());
    }

    #[test]
    fn test_checked_add() {
        assert_eq!(checked_add(1, 2).unwrap(), 3);
        assert!(checked_add(u128::MAX, 1).is_err());
    }

    #[test]
    fn test_checked_sub() {
        assert_eq!(checked_sub(5, 3).unwrap(), 2);
        assert!(checked_sub(3, 5).is_err());
    }

    #[test]
    fn test_checked_mul() {
        assert_eq!(checked_mul(3, 4).unwrap(), 12);
        assert!(checked_mul(u128::MAX, 2).is_err());
    }

    #[test]
    fn test_elapsed_seconds() {
        assert_eq!(elapsed_seconds(100, 160), 60);
        assert_eq!(elapsed_seconds(160, 100), 0);
        assert_eq!(elapsed_seconds(5, 5), 0);
    }
}
