//! Per-tick "outside" accumulators and the growth they imply inside a range.

use crate::math::constants::NUM_REWARDS;
use crate::math::muldiv::mul_div;
use crate::quoting::types::{TickState, WhirlpoolRewardInfo, WhirlpoolState};
use crate::QuoteError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GrowthInside {
    pub fee_growth_inside_a: u128,
    pub fee_growth_inside_b: u128,
    pub reward_growths_inside: [u128; NUM_REWARDS],
}

fn outside_growths(tick: &TickState) -> (u128, u128, [u128; NUM_REWARDS]) {
    if tick.initialized {
        (
            tick.fee_growth_outside_a,
            tick.fee_growth_outside_b,
            tick.reward_growths_outside,
        )
    } else {
        (0, 0, [0; NUM_REWARDS])
    }
}

fn inside(global: u128, lower_outside: u128, upper_outside: u128, below: bool, above: bool) -> u128 {
    let growth_below = if below {
        lower_outside
    } else {
        global.wrapping_sub(lower_outside)
    };
    let growth_above = if above {
        upper_outside
    } else {
        global.wrapping_sub(upper_outside)
    };
    global.wrapping_sub(growth_below).wrapping_sub(growth_above)
}

/// Growth inside `[tick_lower_index, tick_upper_index)` given the current pool state.
///
/// All arithmetic wraps modulo 2^128; only differences between two readings are meaningful.
pub fn growth_inside_range(
    pool: &WhirlpoolState,
    tick_lower: &TickState,
    tick_upper: &TickState,
    tick_lower_index: i32,
    tick_upper_index: i32,
) -> GrowthInside {
    let current = pool.tick_current_index;
    // lower.outside holds growth below the lower tick while the price is at or above it
    let below = current >= tick_lower_index;
    // upper.outside holds growth above the upper tick while the price is below it
    let above = current < tick_upper_index;

    let (lower_a, lower_b, lower_rewards) = outside_growths(tick_lower);
    let (upper_a, upper_b, upper_rewards) = outside_growths(tick_upper);

    let mut reward_growths_inside = [0; NUM_REWARDS];
    for (i, growth) in reward_growths_inside.iter_mut().enumerate() {
        if pool.reward_infos[i].initialized() {
            *growth = inside(
                pool.reward_infos[i].growth_global_x64,
                lower_rewards[i],
                upper_rewards[i],
                below,
                above,
            );
        }
    }

    GrowthInside {
        fee_growth_inside_a: inside(pool.fee_growth_global_a, lower_a, upper_a, below, above),
        fee_growth_inside_b: inside(pool.fee_growth_global_b, lower_b, upper_b, below, above),
        reward_growths_inside,
    }
}

/// Reward infos advanced to `timestamp`.
///
/// Growth only accrues while there is in-range liquidity.
pub fn next_reward_infos(
    pool: &WhirlpoolState,
    timestamp: u64,
) -> Result<[WhirlpoolRewardInfo; NUM_REWARDS], QuoteError> {
    if timestamp < pool.reward_last_updated_timestamp {
        return Err(QuoteError::InvalidTimestamp);
    }

    let mut reward_infos = pool.reward_infos;
    let elapsed = timestamp - pool.reward_last_updated_timestamp;
    if pool.liquidity == 0 || elapsed == 0 {
        return Ok(reward_infos);
    }

    for reward in reward_infos.iter_mut().filter(|info| info.initialized()) {
        let growth_delta = mul_div(
            u128::from(elapsed),
            reward.emissions_per_second_x64,
            pool.liquidity,
            false,
        )?;
        reward.growth_global_x64 = reward.growth_global_x64.wrapping_add(growth_delta);
    }

    Ok(reward_infos)
}

pub fn pool_with_rewards_at(
    pool: &WhirlpoolState,
    timestamp: u64,
) -> Result<WhirlpoolState, QuoteError> {
    let mut updated = *pool;
    updated.reward_infos = next_reward_infos(pool, timestamp)?;
    updated.reward_last_updated_timestamp = timestamp;
    Ok(updated)
}

pub fn cross_tick(
    tick: &mut TickState,
    fee_growth_global_a: u128,
    fee_growth_global_b: u128,
    reward_growths_global: &[u128; NUM_REWARDS],
) {
    tick.fee_growth_outside_a = fee_growth_global_a.wrapping_sub(tick.fee_growth_outside_a);
    tick.fee_growth_outside_b = fee_growth_global_b.wrapping_sub(tick.fee_growth_outside_b);
    for (outside, global) in tick
        .reward_growths_outside
        .iter_mut()
        .zip(reward_growths_global.iter())
    {
        *outside = global.wrapping_sub(*outside);
    }
}
