//! Protocol constants shared by the on-chain program and every quote.

pub const MIN_TICK_INDEX: i32 = -443636;
pub const MAX_TICK_INDEX: i32 = 443636;

pub const MIN_SQRT_PRICE: u128 = 4295048016;
pub const MAX_SQRT_PRICE: u128 = 79226673515401279992447579055;

pub const TICK_ARRAY_SIZE: usize = 88;
pub const NUM_REWARDS: usize = 3;

/// Pool fee rates are expressed in hundredths of a basis point.
pub const FEE_RATE_DENOMINATOR: u32 = 1_000_000;
/// Protocol fee rates are basis points of the swap fee.
pub const PROTOCOL_FEE_RATE_DENOMINATOR: u16 = 10_000;
/// Transfer fees and slippage helpers use plain basis points.
pub const BPS_DENOMINATOR: u16 = 10_000;

pub const Q64_RESOLUTION: u32 = 64;
pub const Q64_ONE: u128 = 1 << Q64_RESOLUTION;
