//! 256-bit values as stored in account data

use anchor_lang::prelude::*;
use super::u256::U256;

/// Little-endian limbs of a `U256`
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PackedU256(pub [u64; 4]);

impl PackedU256 {
    pub const SIZE: usize = 32;

    pub const fn from_u128(value: u128) -> Self {
        Self([value as u64, (value >> 64) as u64, 0, 0])
    }

    pub fn is_zero(&self) -> bool {
        self.0 == [0; 4]
    }
}

impl From<U256> for PackedU256 {
    fn from(value: U256) -> Self {
        Self(value.0)
    }
}

impl From<PackedU256> for U256 {
    fn from(value: PackedU256) -> Self {
        U256(value.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_limbs_match_u256() {
        let value = U256::from(u128::MAX) * U256::from(1_000u32);
        let packed = PackedU256::from(value);
        assert_eq!(U256::from(packed), value);

        let small = PackedU256::from_u128(u128::MAX - 7);
        assert_eq!(U256::from(small), U256::from(u128::MAX - 7));
        assert!(PackedU256::default().is_zero());
    }
}
