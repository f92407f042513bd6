use crate::math::constants::{NUM_REWARDS, Q64_RESOLUTION};
use crate::math::uint::{to_u64, U256};
use crate::quoting::accumulator::{growth_inside_range, pool_with_rewards_at, GrowthInside};
use crate::quoting::types::{PositionState, TickState, WhirlpoolState};
use crate::token_extension::{calculate_transfer_fee_excluded_amount, TokenExtensionContext};
use crate::QuoteError;
use log::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CollectFeesQuote {
    pub fee_owed_a: u64,
    pub fee_owed_b: u64,
    pub transfer_fee_deducted_a: u64,
    pub transfer_fee_deducted_b: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RewardOwedQuote {
    pub rewards_owed: u64,
    pub transfer_fee_deducted: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CollectRewardsQuote {
    pub rewards: [RewardOwedQuote; NUM_REWARDS],
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FeesAndRewardsUpdate {
    pub pool: WhirlpoolState,
    pub position: PositionState,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CollectProtocolFeesQuote {
    pub amount_a: u64,
    pub amount_b: u64,
    pub transfer_fee_deducted_a: u64,
    pub transfer_fee_deducted_b: u64,
    pub pool_after: WhirlpoolState,
}

/// `(growth_now - checkpoint) * liquidity >> 64`, floor.
fn owed_since_checkpoint(
    growth_now: u128,
    checkpoint: u128,
    liquidity: u128,
) -> Result<u64, QuoteError> {
    let delta = growth_now.wrapping_sub(checkpoint);
    let owed = (U256::from(delta) * U256::from(liquidity)) >> Q64_RESOLUTION as usize;
    to_u64(owed).ok_or(QuoteError::ArithmeticError)
}

fn accrue(owed: u64, growth_now: u128, checkpoint: u128, liquidity: u128) -> Result<u64, QuoteError> {
    owed.checked_add(owed_since_checkpoint(growth_now, checkpoint, liquidity)?)
        .ok_or(QuoteError::ArithmeticError)
}

fn position_with_growth(
    position: &PositionState,
    growth: &GrowthInside,
    pool: &WhirlpoolState,
) -> Result<PositionState, QuoteError> {
    let mut updated = *position;

    updated.fee_owed_a = accrue(
        position.fee_owed_a,
        growth.fee_growth_inside_a,
        position.fee_growth_checkpoint_a,
        position.liquidity,
    )?;
    updated.fee_owed_b = accrue(
        position.fee_owed_b,
        growth.fee_growth_inside_b,
        position.fee_growth_checkpoint_b,
        position.liquidity,
    )?;
    updated.fee_growth_checkpoint_a = growth.fee_growth_inside_a;
    updated.fee_growth_checkpoint_b = growth.fee_growth_inside_b;

    for (i, reward) in updated.reward_infos.iter_mut().enumerate() {
        if !pool.reward_infos[i].initialized() {
            continue;
        }
        reward.amount_owed = accrue(
            reward.amount_owed,
            growth.reward_growths_inside[i],
            reward.growth_inside_checkpoint,
            position.liquidity,
        )?;
        reward.growth_inside_checkpoint = growth.reward_growths_inside[i];
    }

    Ok(updated)
}

pub fn collect_fees_quote(
    pool: &WhirlpoolState,
    position: &PositionState,
    tick_lower: &TickState,
    tick_upper: &TickState,
    extensions: &TokenExtensionContext,
) -> Result<CollectFeesQuote, QuoteError> {
    let growth = growth_inside_range(
        pool,
        tick_lower,
        tick_upper,
        position.tick_lower_index,
        position.tick_upper_index,
    );

    let fee_owed_a = accrue(
        position.fee_owed_a,
        growth.fee_growth_inside_a,
        position.fee_growth_checkpoint_a,
        position.liquidity,
    )?;
    let fee_owed_b = accrue(
        position.fee_owed_b,
        growth.fee_growth_inside_b,
        position.fee_growth_checkpoint_b,
        position.liquidity,
    )?;

    let net_a =
        calculate_transfer_fee_excluded_amount(extensions.transfer_fee_a().as_ref(), fee_owed_a)?;
    let net_b =
        calculate_transfer_fee_excluded_amount(extensions.transfer_fee_b().as_ref(), fee_owed_b)?;

    debug!(
        "fees owed {fee_owed_a}/{fee_owed_b}, net {}/{}",
        net_a.amount, net_b.amount
    );

    Ok(CollectFeesQuote {
        fee_owed_a: net_a.amount,
        fee_owed_b: net_b.amount,
        transfer_fee_deducted_a: net_a.fee,
        transfer_fee_deducted_b: net_b.fee,
    })
}

/// Rewards owed to `position` once reward emissions are advanced to `timestamp`.
pub fn collect_rewards_quote(
    pool: &WhirlpoolState,
    position: &PositionState,
    tick_lower: &TickState,
    tick_upper: &TickState,
    timestamp: u64,
    extensions: &TokenExtensionContext,
) -> Result<CollectRewardsQuote, QuoteError> {
    let pool = pool_with_rewards_at(pool, timestamp)?;
    let growth = growth_inside_range(
        &pool,
        tick_lower,
        tick_upper,
        position.tick_lower_index,
        position.tick_upper_index,
    );

    let mut rewards = [RewardOwedQuote::default(); NUM_REWARDS];
    for (i, quote) in rewards.iter_mut().enumerate() {
        if !pool.reward_infos[i].initialized() {
            continue;
        }

        let reward = &position.reward_infos[i];
        let owed = accrue(
            reward.amount_owed,
            growth.reward_growths_inside[i],
            reward.growth_inside_checkpoint,
            position.liquidity,
        )?;
        let net = calculate_transfer_fee_excluded_amount(
            extensions.reward_transfer_fee(i).as_ref(),
            owed,
        )?;
        *quote = RewardOwedQuote {
            rewards_owed: net.amount,
            transfer_fee_deducted: net.fee,
        };
    }

    Ok(CollectRewardsQuote { rewards })
}

/// Checkpoints `position` against the pool at `timestamp`, moving accrued growth into the owed amounts.
pub fn update_fees_and_rewards(
    pool: &WhirlpoolState,
    position: &PositionState,
    tick_lower: &TickState,
    tick_upper: &TickState,
    timestamp: u64,
) -> Result<FeesAndRewardsUpdate, QuoteError> {
    let pool = pool_with_rewards_at(pool, timestamp)?;
    let growth = growth_inside_range(
        &pool,
        tick_lower,
        tick_upper,
        position.tick_lower_index,
        position.tick_upper_index,
    );
    let position = position_with_growth(position, &growth, &pool)?;

    Ok(FeesAndRewardsUpdate { pool, position })
}

pub fn collect_protocol_fees_quote(
    pool: &WhirlpoolState,
    extensions: &TokenExtensionContext,
) -> Result<CollectProtocolFeesQuote, QuoteError> {
    let net_a = calculate_transfer_fee_excluded_amount(
        extensions.transfer_fee_a().as_ref(),
        pool.protocol_fee_owed_a,
    )?;
    let net_b = calculate_transfer_fee_excluded_amount(
        extensions.transfer_fee_b().as_ref(),
        pool.protocol_fee_owed_b,
    )?;

    let mut pool_after = *pool;
    pool_after.protocol_fee_owed_a = 0;
    pool_after.protocol_fee_owed_b = 0;

    Ok(CollectProtocolFeesQuote {
        amount_a: net_a.amount,
        amount_b: net_b.amount,
        transfer_fee_deducted_a: net_a.fee,
        transfer_fee_deducted_b: net_b.fee,
        pool_after,
    })
}
