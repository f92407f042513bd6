use crate::math::constants::{NUM_REWARDS, TICK_ARRAY_SIZE};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Address(pub [u8; 32]);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WhirlpoolRewardInfo {
    pub mint: Option<Address>,
    /// Q64.64 tokens emitted per second across all in-range liquidity.
    pub emissions_per_second_x64: u128,
    /// Q64.64 reward tokens earned per unit of liquidity since the slot was configured.
    pub growth_global_x64: u128,
}

impl WhirlpoolRewardInfo {
    #[must_use]
    pub fn initialized(&self) -> bool {
        self.mint.is_some()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WhirlpoolState {
    pub token_mint_a: Address,
    pub token_mint_b: Address,
    pub tick_spacing: u16,
    /// Swap fee in hundredths of a basis point.
    pub fee_rate: u16,
    /// Share of the swap fee kept by the protocol, in basis points.
    pub protocol_fee_rate: u16,
    pub liquidity: u128,
    pub sqrt_price: u128,
    pub tick_current_index: i32,
    pub fee_growth_global_a: u128,
    pub fee_growth_global_b: u128,
    pub protocol_fee_owed_a: u64,
    pub protocol_fee_owed_b: u64,
    pub reward_last_updated_timestamp: u64,
    pub reward_infos: [WhirlpoolRewardInfo; NUM_REWARDS],
}

impl WhirlpoolState {
    pub fn reward_growths(&self) -> [u128; NUM_REWARDS] {
        self.reward_infos.map(|info| info.growth_global_x64)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TickState {
    pub initialized: bool,
    /// Liquidity added when the price crosses this tick upwards.
    pub liquidity_net: i128,
    pub liquidity_gross: u128,
    pub fee_growth_outside_a: u128,
    pub fee_growth_outside_b: u128,
    pub reward_growths_outside: [u128; NUM_REWARDS],
}

/// Snapshot of a tick array account: `TICK_ARRAY_SIZE` consecutive initializable ticks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TickArrayState {
    pub start_tick_index: i32,
    pub ticks: [TickState; TICK_ARRAY_SIZE],
}

impl TickArrayState {
    pub fn empty(start_tick_index: i32) -> Self {
        Self {
            start_tick_index,
            ticks: [TickState::default(); TICK_ARRAY_SIZE],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PositionRewardInfo {
    pub growth_inside_checkpoint: u128,
    pub amount_owed: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PositionState {
    pub liquidity: u128,
    pub tick_lower_index: i32,
    pub tick_upper_index: i32,
    pub fee_growth_checkpoint_a: u128,
    pub fee_owed_a: u64,
    pub fee_growth_checkpoint_b: u128,
    pub fee_owed_b: u64,
    pub reward_infos: [PositionRewardInfo; NUM_REWARDS],
}
