use crate::math::constants::Q64_RESOLUTION;
use crate::math::uint::{to_u128, to_u64, U256, U512};
use crate::QuoteError;
use num_traits::Zero;

fn sort_prices(sqrt_price_a: u128, sqrt_price_b: u128) -> (u128, u128) {
    if sqrt_price_a < sqrt_price_b {
        (sqrt_price_a, sqrt_price_b)
    } else {
        (sqrt_price_b, sqrt_price_a)
    }
}

/// Amount of token A between two prices: `L * (upper - lower) * 2^64 / (upper * lower)`.
pub fn amount_delta_a(
    sqrt_price_a: u128,
    sqrt_price_b: u128,
    liquidity: u128,
    round_up: bool,
) -> Result<u64, QuoteError> {
    let (lower, upper) = sort_prices(sqrt_price_a, sqrt_price_b);

    if liquidity.is_zero() || lower == upper {
        return Ok(0);
    }
    if lower.is_zero() {
        return Err(QuoteError::DivideByZero);
    }

    let numerator =
        (U512::from(liquidity) * U512::from(upper - lower)) << Q64_RESOLUTION as usize;
    let denominator = U512::from(lower) * U512::from(upper);
    let (quotient, remainder) = numerator.div_rem(denominator);

    let rounded = if round_up && !remainder.is_zero() {
        quotient + U512::ONE
    } else {
        quotient
    };

    u64::try_from(rounded).map_err(|_| QuoteError::ArithmeticError)
}

/// Amount of token B between two prices: `L * (upper - lower) / 2^64`.
pub fn amount_delta_b(
    sqrt_price_a: u128,
    sqrt_price_b: u128,
    liquidity: u128,
    round_up: bool,
) -> Result<u64, QuoteError> {
    let (lower, upper) = sort_prices(sqrt_price_a, sqrt_price_b);

    if liquidity.is_zero() || lower == upper {
        return Ok(0);
    }

    let product = U256::from(liquidity) * U256::from(upper - lower);
    let quotient = product >> Q64_RESOLUTION as usize;
    let rounded = if round_up && !(product & U256::from(u64::MAX)).is_zero() {
        quotient + U256::ONE
    } else {
        quotient
    };

    to_u64(rounded).ok_or(QuoteError::ArithmeticError)
}

/// Liquidity provided by `amount` of token A between two prices, rounded down.
pub fn liquidity_from_a(
    amount: u64,
    sqrt_price_a: u128,
    sqrt_price_b: u128,
) -> Result<u128, QuoteError> {
    let (lower, upper) = sort_prices(sqrt_price_a, sqrt_price_b);
    if lower == upper {
        return Err(QuoteError::DivideByZero);
    }

    let numerator = U512::from(amount) * U512::from(lower) * U512::from(upper);
    let quotient = (numerator / U512::from(upper - lower)) >> Q64_RESOLUTION as usize;

    u128::try_from(quotient).map_err(|_| QuoteError::Overflow)
}

/// Liquidity provided by `amount` of token B between two prices, rounded down.
pub fn liquidity_from_b(
    amount: u64,
    sqrt_price_a: u128,
    sqrt_price_b: u128,
) -> Result<u128, QuoteError> {
    let (lower, upper) = sort_prices(sqrt_price_a, sqrt_price_b);
    if lower == upper {
        return Err(QuoteError::DivideByZero);
    }

    let numerator = U256::from(amount) << Q64_RESOLUTION as usize;
    to_u128(numerator / U256::from(upper - lower)).ok_or(QuoteError::Overflow)
}
