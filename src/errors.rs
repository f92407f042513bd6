//! Error types for whirlpool quoting.

use crate::math::muldiv::MuldivError;
use thiserror::Error;

/// Errors returned by every fallible quote operation.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash, Error)]
pub enum QuoteError {
    #[error("invalid tick index {0}")]
    InvalidTickIndex(i32),
    #[error("invalid tick spacing {0}")]
    InvalidTickSpacing(u16),
    #[error("invalid sqrt price {0}")]
    InvalidSqrtPrice(u128),
    #[error("invalid tick range [{0}, {1})")]
    InvalidTickRange(i32, i32),
    #[error("sqrt price limit is on the wrong side of the current price")]
    InvalidSqrtPriceLimitDirection,
    #[error("amount must be non-zero")]
    ZeroTradableAmount,
    #[error("arithmetic overflow")]
    Overflow,
    #[error("division by zero")]
    DivideByZero,
    #[error("token amount does not fit in u64")]
    /// A computed token amount exceeds the 64-bit token amount range.
    ArithmeticError,
    #[error("tick arrays are not a contiguous sequence")]
    TickArraySequenceInvalid,
    #[error("tick {0} is not covered by the supplied tick arrays")]
    TickArrayIndexOutOfBounds(i32),
    #[error("no liquidity to fill the swap")]
    InsufficientLiquidity,
    #[error("swap reached the price bound before being filled")]
    SwapLiquidityExhausted,
    #[error("quote mints do not chain")]
    TokenMintMismatch,
    #[error("transfer fee basis points above 10000")]
    InvalidTransferFee,
    #[error("slippage tolerance must be a fraction in [0, 1]")]
    InvalidSlippageTolerance,
    #[error("timestamp is before the last reward update")]
    InvalidTimestamp,
}

impl From<MuldivError> for QuoteError {
    fn from(value: MuldivError) -> Self {
        match value {
            MuldivError::Overflow => QuoteError::Overflow,
            MuldivError::DenominatorZero => QuoteError::DivideByZero,
        }
    }
}
