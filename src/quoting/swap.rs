use crate::math::constants::{MAX_SQRT_PRICE, MAX_TICK_INDEX, MIN_SQRT_PRICE, MIN_TICK_INDEX};
use crate::math::slippage::SlippageTolerance;
use crate::math::swap::{compute_swap_step, protocol_fee};
use crate::math::tick::{sqrt_price_to_tick_index, tick_index_to_sqrt_price};
use crate::quoting::accumulator::{cross_tick, next_reward_infos};
use crate::quoting::tick_array::TickArraySequence;
use crate::quoting::types::{Address, TickArrayState, WhirlpoolState};
use crate::token_extension::{
    calculate_transfer_fee_excluded_amount, calculate_transfer_fee_included_amount,
    TokenExtensionContext,
};
use crate::QuoteError;
use alloc::vec::Vec;
use log::{debug, trace};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SwapParams {
    /// Gross input for exact-in, net output for exact-out.
    pub amount: u64,
    pub amount_specified_is_input: bool,
    pub a_to_b: bool,
    /// Price at which the swap stops, the protocol bound in the swap direction if `None`.
    pub sqrt_price_limit: Option<u128>,
    pub slippage_tolerance: SlippageTolerance,
    pub timestamp: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SwapTransferFee {
    pub deducting_from_estimated_amount_in: u64,
    pub deducted_from_estimated_amount_out: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SwapQuote {
    pub amount: u64,
    /// Minimum output for exact-in, maximum input for exact-out.
    pub other_amount_threshold: u64,
    pub sqrt_price_limit: u128,
    pub amount_specified_is_input: bool,
    pub a_to_b: bool,
    pub input_mint: Address,
    pub output_mint: Address,
    pub estimated_amount_in: u64,
    pub estimated_amount_out: u64,
    pub estimated_end_tick_index: i32,
    pub estimated_end_sqrt_price: u128,
    pub estimated_fee_amount: u64,
    pub transfer_fee: SwapTransferFee,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwapSimulation {
    pub quote: SwapQuote,
    pub pool_after: WhirlpoolState,
    pub tick_arrays_after: Vec<TickArrayState>,
}

struct SwapComputation {
    amount_a: u64,
    amount_b: u64,
    fee_amount: u64,
    sqrt_price_limit: u128,
    pool_after: WhirlpoolState,
    tick_arrays_after: Vec<TickArrayState>,
}

fn resolve_sqrt_price_limit(
    sqrt_price: u128,
    sqrt_price_limit: Option<u128>,
    a_to_b: bool,
) -> Result<u128, QuoteError> {
    let limit = match sqrt_price_limit {
        Some(limit) => limit,
        None if a_to_b => MIN_SQRT_PRICE,
        None => MAX_SQRT_PRICE,
    };

    if !(MIN_SQRT_PRICE..=MAX_SQRT_PRICE).contains(&limit) {
        return Err(QuoteError::InvalidSqrtPrice(limit));
    }
    if (a_to_b && limit >= sqrt_price) || (!a_to_b && limit <= sqrt_price) {
        return Err(QuoteError::InvalidSqrtPriceLimitDirection);
    }

    Ok(limit)
}

fn compute_swap(
    pool: &WhirlpoolState,
    mut tick_sequence: TickArraySequence,
    amount: u64,
    sqrt_price_limit: Option<u128>,
    amount_specified_is_input: bool,
    a_to_b: bool,
    timestamp: u64,
) -> Result<SwapComputation, QuoteError> {
    if amount == 0 {
        return Err(QuoteError::ZeroTradableAmount);
    }
    let sqrt_price_limit = resolve_sqrt_price_limit(pool.sqrt_price, sqrt_price_limit, a_to_b)?;

    let reward_infos = next_reward_infos(pool, timestamp)?;
    let reward_growths = reward_infos.map(|info| info.growth_global_x64);

    let mut amount_remaining = amount;
    let mut amount_calculated: u64 = 0;
    let mut sqrt_price = pool.sqrt_price;
    let mut tick_current_index = pool.tick_current_index;
    let mut liquidity = pool.liquidity;
    let mut fee_amount: u64 = 0;
    let mut protocol_fee_amount: u64 = 0;
    let (mut fee_growth_input, fee_growth_output) = if a_to_b {
        (pool.fee_growth_global_a, pool.fee_growth_global_b)
    } else {
        (pool.fee_growth_global_b, pool.fee_growth_global_a)
    };

    while amount_remaining > 0 && sqrt_price != sqrt_price_limit {
        let (next_tick_initialized, next_tick_index) = {
            let (tick, index) = if a_to_b {
                tick_sequence.prev_initialized_tick(tick_current_index)?
            } else {
                tick_sequence.next_initialized_tick(tick_current_index)?
            };
            let index_in_bounds = index.clamp(MIN_TICK_INDEX, MAX_TICK_INDEX);
            (
                tick.is_some_and(|t| t.initialized) && index == index_in_bounds,
                index_in_bounds,
            )
        };

        let next_tick_sqrt_price = tick_index_to_sqrt_price(next_tick_index)?;
        let target_sqrt_price = if a_to_b {
            next_tick_sqrt_price.max(sqrt_price_limit)
        } else {
            next_tick_sqrt_price.min(sqrt_price_limit)
        };

        let step = compute_swap_step(
            amount_remaining,
            pool.fee_rate,
            liquidity,
            sqrt_price,
            target_sqrt_price,
            amount_specified_is_input,
            a_to_b,
        )?;
        trace!(
            "swap step {} -> {}: in {} out {} fee {}",
            sqrt_price,
            step.next_sqrt_price,
            step.amount_in,
            step.amount_out,
            step.fee_amount
        );

        fee_amount = fee_amount
            .checked_add(step.fee_amount)
            .ok_or(QuoteError::ArithmeticError)?;

        if amount_specified_is_input {
            amount_remaining = step
                .amount_in
                .checked_add(step.fee_amount)
                .and_then(|used| amount_remaining.checked_sub(used))
                .ok_or(QuoteError::ArithmeticError)?;
            amount_calculated = amount_calculated
                .checked_add(step.amount_out)
                .ok_or(QuoteError::ArithmeticError)?;
        } else {
            amount_remaining = amount_remaining
                .checked_sub(step.amount_out)
                .ok_or(QuoteError::ArithmeticError)?;
            amount_calculated = step
                .amount_in
                .checked_add(step.fee_amount)
                .and_then(|paid| amount_calculated.checked_add(paid))
                .ok_or(QuoteError::ArithmeticError)?;
        }

        let protocol_share = protocol_fee(step.fee_amount, pool.protocol_fee_rate);
        protocol_fee_amount += protocol_share;
        let lp_fee = step.fee_amount - protocol_share;
        if liquidity > 0 {
            fee_growth_input =
                fee_growth_input.wrapping_add((u128::from(lp_fee) << 64) / liquidity);
        }

        if step.next_sqrt_price == next_tick_sqrt_price {
            if next_tick_initialized {
                let (fee_growth_a, fee_growth_b) = if a_to_b {
                    (fee_growth_input, fee_growth_output)
                } else {
                    (fee_growth_output, fee_growth_input)
                };
                let tick = tick_sequence.tick_mut(next_tick_index)?;
                cross_tick(tick, fee_growth_a, fee_growth_b, &reward_growths);

                let liquidity_net = if a_to_b {
                    tick.liquidity_net.checked_neg().ok_or(QuoteError::Overflow)?
                } else {
                    tick.liquidity_net
                };
                liquidity = liquidity
                    .checked_add_signed(liquidity_net)
                    .ok_or(QuoteError::Overflow)?;
                debug!("crossed tick {next_tick_index}, liquidity now {liquidity}");
            }
            tick_current_index = if a_to_b {
                next_tick_index - 1
            } else {
                next_tick_index
            };
        } else if step.next_sqrt_price != sqrt_price {
            tick_current_index = sqrt_price_to_tick_index(step.next_sqrt_price)?;
        }

        sqrt_price = step.next_sqrt_price;
    }

    if amount_remaining > 0 && !amount_specified_is_input {
        if liquidity == 0 {
            return Err(QuoteError::InsufficientLiquidity);
        }
        if sqrt_price_limit == MIN_SQRT_PRICE || sqrt_price_limit == MAX_SQRT_PRICE {
            return Err(QuoteError::SwapLiquidityExhausted);
        }
        debug!("exact-out swap partially filled, {amount_remaining} left at price limit");
    }

    let swapped = amount - amount_remaining;
    let (amount_a, amount_b) = if a_to_b == amount_specified_is_input {
        (swapped, amount_calculated)
    } else {
        (amount_calculated, swapped)
    };

    let mut pool_after = *pool;
    pool_after.sqrt_price = sqrt_price;
    pool_after.tick_current_index = tick_current_index;
    pool_after.liquidity = liquidity;
    pool_after.reward_infos = reward_infos;
    pool_after.reward_last_updated_timestamp = timestamp.max(pool.reward_last_updated_timestamp);
    if a_to_b {
        pool_after.fee_growth_global_a = fee_growth_input;
        pool_after.protocol_fee_owed_a = pool
            .protocol_fee_owed_a
            .checked_add(protocol_fee_amount)
            .ok_or(QuoteError::ArithmeticError)?;
    } else {
        pool_after.fee_growth_global_b = fee_growth_input;
        pool_after.protocol_fee_owed_b = pool
            .protocol_fee_owed_b
            .checked_add(protocol_fee_amount)
            .ok_or(QuoteError::ArithmeticError)?;
    }

    Ok(SwapComputation {
        amount_a,
        amount_b,
        fee_amount,
        sqrt_price_limit,
        pool_after,
        tick_arrays_after: tick_sequence.into_tick_arrays(),
    })
}

/// Simulates a swap over `tick_arrays`, returning the quote and the resulting state.
///
/// Exact-in quotes treat `params.amount` as the gross amount leaving the user's wallet and
/// report the net amount the user receives. Exact-out quotes treat it as the net amount the
/// user must receive and report the gross amount they must send.
pub fn simulate_swap(
    pool: &WhirlpoolState,
    tick_arrays: Vec<TickArrayState>,
    params: &SwapParams,
    extensions: &TokenExtensionContext,
) -> Result<SwapSimulation, QuoteError> {
    let tick_sequence = TickArraySequence::new(tick_arrays, pool.tick_spacing)?;
    let input_fee = extensions.transfer_fee(params.a_to_b);
    let output_fee = extensions.transfer_fee(!params.a_to_b);

    let specified = if params.amount_specified_is_input {
        calculate_transfer_fee_excluded_amount(input_fee.as_ref(), params.amount)?.amount
    } else {
        calculate_transfer_fee_included_amount(output_fee.as_ref(), params.amount)?.amount
    };

    let swap = compute_swap(
        pool,
        tick_sequence,
        specified,
        params.sqrt_price_limit,
        params.amount_specified_is_input,
        params.a_to_b,
        params.timestamp,
    )?;

    let (swap_in, swap_out) = if params.a_to_b {
        (swap.amount_a, swap.amount_b)
    } else {
        (swap.amount_b, swap.amount_a)
    };

    let (estimated_amount_in, estimated_amount_out, other_amount_threshold) =
        if params.amount_specified_is_input {
            let amount_in = if swap_in == specified {
                params.amount
            } else {
                calculate_transfer_fee_included_amount(input_fee.as_ref(), swap_in)?.amount
            };
            let amount_out =
                calculate_transfer_fee_excluded_amount(output_fee.as_ref(), swap_out)?.amount;
            let threshold = params.slippage_tolerance.min_amount(amount_out)?;
            (amount_in, amount_out, threshold)
        } else {
            let amount_out = if swap_out == specified {
                params.amount
            } else {
                calculate_transfer_fee_excluded_amount(output_fee.as_ref(), swap_out)?.amount
            };
            let amount_in =
                calculate_transfer_fee_included_amount(input_fee.as_ref(), swap_in)?.amount;
            let threshold = params.slippage_tolerance.max_amount(amount_in)?;
            (amount_in, amount_out, threshold)
        };

    let (input_mint, output_mint) = if params.a_to_b {
        (pool.token_mint_a, pool.token_mint_b)
    } else {
        (pool.token_mint_b, pool.token_mint_a)
    };

    let quote = SwapQuote {
        amount: params.amount,
        other_amount_threshold,
        sqrt_price_limit: swap.sqrt_price_limit,
        amount_specified_is_input: params.amount_specified_is_input,
        a_to_b: params.a_to_b,
        input_mint,
        output_mint,
        estimated_amount_in,
        estimated_amount_out,
        estimated_end_tick_index: swap.pool_after.tick_current_index,
        estimated_end_sqrt_price: swap.pool_after.sqrt_price,
        estimated_fee_amount: swap.fee_amount,
        transfer_fee: SwapTransferFee {
            deducting_from_estimated_amount_in: estimated_amount_in.saturating_sub(swap_in),
            deducted_from_estimated_amount_out: swap_out.saturating_sub(estimated_amount_out),
        },
    };
    debug!("swap quote: {quote:?}");

    Ok(SwapSimulation {
        quote,
        pool_after: swap.pool_after,
        tick_arrays_after: swap.tick_arrays_after,
    })
}

pub fn swap_quote(
    pool: &WhirlpoolState,
    tick_arrays: Vec<TickArrayState>,
    params: &SwapParams,
    extensions: &TokenExtensionContext,
) -> Result<SwapQuote, QuoteError> {
    simulate_swap(pool, tick_arrays, params, extensions).map(|simulation| simulation.quote)
}
