use crate::math::constants::{FEE_RATE_DENOMINATOR, PROTOCOL_FEE_RATE_DENOMINATOR};
use crate::math::delta::{amount_delta_a, amount_delta_b};
use crate::math::sqrt_price::{next_sqrt_price_from_a, next_sqrt_price_from_b};
use crate::QuoteError;

#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SwapStep {
    pub amount_in: u64,
    pub amount_out: u64,
    pub next_sqrt_price: u128,
    pub fee_amount: u64,
}

/// Amount left for price impact after the swap fee is taken, rounded down.
#[must_use]
pub fn apply_swap_fee(amount: u64, fee_rate: u16) -> u64 {
    let denominator = u128::from(FEE_RATE_DENOMINATOR);
    let after_fee = u128::from(amount) * (denominator - u128::from(fee_rate)) / denominator;
    // after_fee <= amount
    after_fee as u64
}

/// Fee owed on top of `amount_in`, rounded up.
pub fn swap_fee_on_input(amount_in: u64, fee_rate: u16) -> Result<u64, QuoteError> {
    let denominator = u128::from(FEE_RATE_DENOMINATOR) - u128::from(fee_rate);
    if denominator == 0 {
        return Err(QuoteError::DivideByZero);
    }
    let fee = (u128::from(amount_in) * u128::from(fee_rate)).div_ceil(denominator);
    u64::try_from(fee).map_err(|_| QuoteError::ArithmeticError)
}

#[must_use]
pub fn protocol_fee(fee_amount: u64, protocol_fee_rate: u16) -> u64 {
    let share = u128::from(fee_amount) * u128::from(protocol_fee_rate)
        / u128::from(PROTOCOL_FEE_RATE_DENOMINATOR);
    // protocol_fee_rate <= 10000 keeps the share within fee_amount
    share.min(u128::from(fee_amount)) as u64
}

fn fixed_delta(
    current: u128,
    target: u128,
    liquidity: u128,
    is_input: bool,
    a_to_b: bool,
) -> Result<u64, QuoteError> {
    if a_to_b == is_input {
        amount_delta_a(current, target, liquidity, is_input)
    } else {
        amount_delta_b(current, target, liquidity, is_input)
    }
}

fn unfixed_delta(
    current: u128,
    target: u128,
    liquidity: u128,
    is_input: bool,
    a_to_b: bool,
) -> Result<u64, QuoteError> {
    if a_to_b == is_input {
        amount_delta_b(current, target, liquidity, !is_input)
    } else {
        amount_delta_a(current, target, liquidity, !is_input)
    }
}

fn next_sqrt_price(
    current: u128,
    liquidity: u128,
    amount: u64,
    is_input: bool,
    a_to_b: bool,
) -> Result<u128, QuoteError> {
    if a_to_b == is_input {
        next_sqrt_price_from_a(current, liquidity, amount, is_input)
    } else {
        next_sqrt_price_from_b(current, liquidity, amount, is_input)
    }
}

/// Swaps as much of `amount_remaining` as fits between `current` and `target`.
///
/// The fixed side is the specified token (input when `is_input`), the unfixed
/// side is the computed token. A fixed delta too large for a token amount is
/// treated as "more than what remains", so the step stops short of the target.
pub fn compute_swap_step(
    amount_remaining: u64,
    fee_rate: u16,
    liquidity: u128,
    current_sqrt_price: u128,
    target_sqrt_price: u128,
    is_input: bool,
    a_to_b: bool,
) -> Result<SwapStep, QuoteError> {
    let initial_fixed = match fixed_delta(
        current_sqrt_price,
        target_sqrt_price,
        liquidity,
        is_input,
        a_to_b,
    ) {
        Ok(delta) => Some(delta),
        Err(QuoteError::ArithmeticError) => None,
        Err(err) => return Err(err),
    };

    let amount_calc = if is_input {
        apply_swap_fee(amount_remaining, fee_rate)
    } else {
        amount_remaining
    };

    let next_sqrt_price = match initial_fixed {
        Some(delta) if delta <= amount_calc => target_sqrt_price,
        _ => next_sqrt_price(current_sqrt_price, liquidity, amount_calc, is_input, a_to_b)?,
    };

    let is_max_swap = next_sqrt_price == target_sqrt_price;

    let unfixed = unfixed_delta(
        current_sqrt_price,
        next_sqrt_price,
        liquidity,
        is_input,
        a_to_b,
    )?;

    let fixed = match initial_fixed {
        Some(delta) if is_max_swap => delta,
        _ => fixed_delta(
            current_sqrt_price,
            next_sqrt_price,
            liquidity,
            is_input,
            a_to_b,
        )?,
    };

    let (amount_in, mut amount_out) = if is_input {
        (fixed, unfixed)
    } else {
        (unfixed, fixed)
    };

    if !is_input && amount_out > amount_remaining {
        amount_out = amount_remaining;
    }

    let fee_amount = if is_input && !is_max_swap {
        amount_remaining - amount_in
    } else {
        swap_fee_on_input(amount_in, fee_rate)?
    };

    Ok(SwapStep {
        amount_in,
        amount_out,
        next_sqrt_price,
        fee_amount,
    })
}
