pub mod accumulator;
pub mod liquidity;
pub mod position;
pub mod swap;
pub mod tick_array;
pub mod two_hop;
pub mod types;
