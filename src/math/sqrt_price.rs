use crate::math::constants::{MAX_SQRT_PRICE, MIN_SQRT_PRICE, Q64_RESOLUTION};
use crate::math::uint::U512;
use crate::QuoteError;
use num_traits::Zero;

fn ensure_in_bounds(sqrt_price: u128) -> Result<u128, QuoteError> {
    if (MIN_SQRT_PRICE..=MAX_SQRT_PRICE).contains(&sqrt_price) {
        Ok(sqrt_price)
    } else {
        Err(QuoteError::InvalidSqrtPrice(sqrt_price))
    }
}

/// Price after adding (input) or removing (output) `amount` of token A.
///
/// Computes `L * p / (L ± amount * p)`, always rounding the price up.
pub fn next_sqrt_price_from_a(
    sqrt_price: u128,
    liquidity: u128,
    amount: u64,
    amount_is_input: bool,
) -> Result<u128, QuoteError> {
    if amount.is_zero() {
        return Ok(sqrt_price);
    }

    let product = U512::from(sqrt_price) * U512::from(amount);
    let liquidity_shifted = U512::from(liquidity) << Q64_RESOLUTION as usize;
    let numerator = (U512::from(liquidity) * U512::from(sqrt_price)) << Q64_RESOLUTION as usize;

    let denominator = if amount_is_input {
        liquidity_shifted + product
    } else {
        if liquidity_shifted <= product {
            return Err(QuoteError::DivideByZero);
        }
        liquidity_shifted - product
    };

    let (quotient, remainder) = numerator.div_rem(denominator);
    let rounded = if remainder.is_zero() {
        quotient
    } else {
        quotient + U512::ONE
    };

    let next = u128::try_from(rounded).map_err(|_| QuoteError::Overflow)?;
    ensure_in_bounds(next)
}

/// Price after adding (input) or removing (output) `amount` of token B.
///
/// Computes `p ± amount / L`, always rounding the price down.
pub fn next_sqrt_price_from_b(
    sqrt_price: u128,
    liquidity: u128,
    amount: u64,
    amount_is_input: bool,
) -> Result<u128, QuoteError> {
    if liquidity.is_zero() {
        return Err(QuoteError::DivideByZero);
    }

    let amount_x64 = u128::from(amount) << Q64_RESOLUTION;
    let next = if amount_is_input {
        sqrt_price.checked_add(amount_x64 / liquidity)
    } else {
        sqrt_price.checked_sub(amount_x64.div_ceil(liquidity))
    }
    .ok_or(QuoteError::Overflow)?;

    ensure_in_bounds(next)
}
