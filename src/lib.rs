#![cfg_attr(not(test), no_std)]
extern crate alloc;

pub use ruint::aliases::U256;

pub mod errors;
pub mod math;
pub mod quoting;
pub mod token_extension;

pub use errors::QuoteError;
