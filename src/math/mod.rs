pub mod constants;
pub mod delta;
pub mod muldiv;
pub mod slippage;
pub mod sqrt_price;
pub mod swap;
pub mod tick;
pub(crate) mod uint;

pub use constants::*;
pub use delta::{amount_delta_a, amount_delta_b, liquidity_from_a, liquidity_from_b};
pub use muldiv::{mul_div, mul_shift_right};
pub use slippage::SlippageTolerance;
pub use sqrt_price::{next_sqrt_price_from_a, next_sqrt_price_from_b};
pub use tick::{sqrt_price_to_tick_index, tick_index_to_sqrt_price};
