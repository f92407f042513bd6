use crate::math::constants::Q64_RESOLUTION;
use crate::math::uint::{to_u128, U256, U512};
use crate::QuoteError;
use ruint::UintTryFrom;

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum MuldivError {
    Overflow,
    DenominatorZero,
}

/// Full precision `x * y / d` over 256-bit operands.
pub fn muldiv_u256(x: U256, y: U256, d: U256, round_up: bool) -> Result<U256, MuldivError> {
    if d.is_zero() {
        return Err(MuldivError::DenominatorZero);
    }

    let intermediate: U512 = U512::from(x) * U512::from(y);
    let (quotient, remainder) = intermediate.div_rem(U512::from(d));

    let result = if round_up && !remainder.is_zero() {
        quotient + U512::ONE
    } else {
        quotient
    };

    U256::uint_try_from(result).map_err(|_| MuldivError::Overflow)
}

/// `x * y / d` with a 256-bit intermediate, failing if the quotient leaves 128 bits.
pub fn mul_div(x: u128, y: u128, d: u128, round_up: bool) -> Result<u128, QuoteError> {
    let result = muldiv_u256(U256::from(x), U256::from(y), U256::from(d), round_up)?;
    to_u128(result).ok_or(QuoteError::Overflow)
}

/// `(x * y) >> 64`, rounding up when any shifted-out bit is set.
pub fn mul_shift_right(x: u128, y: u128, round_up: bool) -> Result<u128, QuoteError> {
    let product = U256::from(x) * U256::from(y);
    let shifted = product >> Q64_RESOLUTION as usize;
    let rounded = if round_up && !(product & U256::from(u64::MAX)).is_zero() {
        shifted + U256::ONE
    } else {
        shifted
    };
    to_u128(rounded).ok_or(QuoteError::Overflow)
}
