use crate::math::delta::{amount_delta_a, amount_delta_b, liquidity_from_a, liquidity_from_b};
use crate::math::slippage::SlippageTolerance;
use crate::math::tick::tick_index_to_sqrt_price;
use crate::math::{MAX_TICK_INDEX, MIN_TICK_INDEX};
use crate::token_extension::{
    calculate_transfer_fee_excluded_amount, calculate_transfer_fee_included_amount,
    TokenExtensionContext,
};
use crate::QuoteError;
use log::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PositionStatus {
    PriceBelowRange,
    PriceInRange,
    PriceAboveRange,
}

#[must_use]
pub fn position_status(tick_current_index: i32, tick_lower_index: i32, tick_upper_index: i32) -> PositionStatus {
    if tick_current_index < tick_lower_index {
        PositionStatus::PriceBelowRange
    } else if tick_current_index < tick_upper_index {
        PositionStatus::PriceInRange
    } else {
        PositionStatus::PriceAboveRange
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LiquidityRange {
    pub sqrt_price: u128,
    pub tick_current_index: i32,
    pub tick_lower_index: i32,
    pub tick_upper_index: i32,
}

impl LiquidityRange {
    fn validate(&self) -> Result<(u128, u128), QuoteError> {
        let (lower, upper) = (self.tick_lower_index, self.tick_upper_index);
        if lower >= upper || lower < MIN_TICK_INDEX || upper > MAX_TICK_INDEX {
            return Err(QuoteError::InvalidTickRange(lower, upper));
        }
        Ok((
            tick_index_to_sqrt_price(lower)?,
            tick_index_to_sqrt_price(upper)?,
        ))
    }

    pub fn status(&self) -> PositionStatus {
        position_status(
            self.tick_current_index,
            self.tick_lower_index,
            self.tick_upper_index,
        )
    }

    pub fn token_amounts(&self, liquidity: u128, round_up: bool) -> Result<(u64, u64), QuoteError> {
        let (lower, upper) = self.validate()?;
        match self.status() {
            PositionStatus::PriceBelowRange => {
                Ok((amount_delta_a(lower, upper, liquidity, round_up)?, 0))
            }
            PositionStatus::PriceInRange => Ok((
                amount_delta_a(self.sqrt_price, upper, liquidity, round_up)?,
                amount_delta_b(lower, self.sqrt_price, liquidity, round_up)?,
            )),
            PositionStatus::PriceAboveRange => {
                Ok((0, amount_delta_b(lower, upper, liquidity, round_up)?))
            }
        }
    }

    pub fn liquidity_from_token_a(&self, amount: u64) -> Result<u128, QuoteError> {
        let (lower, upper) = self.validate()?;
        match self.status() {
            PositionStatus::PriceBelowRange => liquidity_from_a(amount, lower, upper),
            PositionStatus::PriceInRange => liquidity_from_a(amount, self.sqrt_price, upper),
            PositionStatus::PriceAboveRange => Ok(0),
        }
    }

    pub fn liquidity_from_token_b(&self, amount: u64) -> Result<u128, QuoteError> {
        let (lower, upper) = self.validate()?;
        match self.status() {
            PositionStatus::PriceBelowRange => Ok(0),
            PositionStatus::PriceInRange => liquidity_from_b(amount, lower, self.sqrt_price),
            PositionStatus::PriceAboveRange => liquidity_from_b(amount, lower, upper),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct IncreaseLiquidityQuote {
    pub liquidity_delta: u128,
    /// Gross amounts to transfer in, transfer fees included.
    pub token_est_a: u64,
    pub token_est_b: u64,
    pub token_max_a: u64,
    pub token_max_b: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DecreaseLiquidityQuote {
    pub liquidity_delta: u128,
    /// Net amounts received, transfer fees excluded.
    pub token_est_a: u64,
    pub token_est_b: u64,
    pub token_min_a: u64,
    pub token_min_b: u64,
}

fn ensure_signed_liquidity(liquidity_delta: u128) -> Result<(), QuoteError> {
    i128::try_from(liquidity_delta)
        .map(|_| ())
        .map_err(|_| QuoteError::Overflow)
}

/// Amounts required to add `liquidity_delta`, rounded up and widened by slippage.
pub fn increase_liquidity_quote(
    liquidity_delta: u128,
    slippage_tolerance: SlippageTolerance,
    range: &LiquidityRange,
    extensions: &TokenExtensionContext,
) -> Result<IncreaseLiquidityQuote, QuoteError> {
    ensure_signed_liquidity(liquidity_delta)?;

    let (est_a, est_b) = range.token_amounts(liquidity_delta, true)?;
    let max_a = slippage_tolerance.max_amount(est_a)?;
    let max_b = slippage_tolerance.max_amount(est_b)?;

    let fee_a = extensions.transfer_fee_a();
    let fee_b = extensions.transfer_fee_b();

    let quote = IncreaseLiquidityQuote {
        liquidity_delta,
        token_est_a: calculate_transfer_fee_included_amount(fee_a.as_ref(), est_a)?.amount,
        token_est_b: calculate_transfer_fee_included_amount(fee_b.as_ref(), est_b)?.amount,
        token_max_a: calculate_transfer_fee_included_amount(fee_a.as_ref(), max_a)?.amount,
        token_max_b: calculate_transfer_fee_included_amount(fee_b.as_ref(), max_b)?.amount,
    };
    debug!("increase liquidity quote: {quote:?}");
    Ok(quote)
}

/// Amounts received for removing `liquidity_delta`, rounded down and narrowed by slippage.
pub fn decrease_liquidity_quote(
    liquidity_delta: u128,
    slippage_tolerance: SlippageTolerance,
    range: &LiquidityRange,
    extensions: &TokenExtensionContext,
) -> Result<DecreaseLiquidityQuote, QuoteError> {
    ensure_signed_liquidity(liquidity_delta)?;

    let (est_a, est_b) = range.token_amounts(liquidity_delta, false)?;
    let min_a = slippage_tolerance.min_amount(est_a)?;
    let min_b = slippage_tolerance.min_amount(est_b)?;

    let fee_a = extensions.transfer_fee_a();
    let fee_b = extensions.transfer_fee_b();

    let quote = DecreaseLiquidityQuote {
        liquidity_delta,
        token_est_a: calculate_transfer_fee_excluded_amount(fee_a.as_ref(), est_a)?.amount,
        token_est_b: calculate_transfer_fee_excluded_amount(fee_b.as_ref(), est_b)?.amount,
        token_min_a: calculate_transfer_fee_excluded_amount(fee_a.as_ref(), min_a)?.amount,
        token_min_b: calculate_transfer_fee_excluded_amount(fee_b.as_ref(), min_b)?.amount,
    };
    debug!("decrease liquidity quote: {quote:?}");
    Ok(quote)
}

pub fn increase_liquidity_quote_a(
    token_amount_a: u64,
    slippage_tolerance: SlippageTolerance,
    range: &LiquidityRange,
    extensions: &TokenExtensionContext,
) -> Result<IncreaseLiquidityQuote, QuoteError> {
    let net =
        calculate_transfer_fee_excluded_amount(extensions.transfer_fee_a().as_ref(), token_amount_a)?;
    let liquidity = range.liquidity_from_token_a(net.amount)?;
    increase_liquidity_quote(liquidity, slippage_tolerance, range, extensions)
}

pub fn increase_liquidity_quote_b(
    token_amount_b: u64,
    slippage_tolerance: SlippageTolerance,
    range: &LiquidityRange,
    extensions: &TokenExtensionContext,
) -> Result<IncreaseLiquidityQuote, QuoteError> {
    let net =
        calculate_transfer_fee_excluded_amount(extensions.transfer_fee_b().as_ref(), token_amount_b)?;
    let liquidity = range.liquidity_from_token_b(net.amount)?;
    increase_liquidity_quote(liquidity, slippage_tolerance, range, extensions)
}

pub fn decrease_liquidity_quote_a(
    token_amount_a: u64,
    slippage_tolerance: SlippageTolerance,
    range: &LiquidityRange,
    extensions: &TokenExtensionContext,
) -> Result<DecreaseLiquidityQuote, QuoteError> {
    let gross =
        calculate_transfer_fee_included_amount(extensions.transfer_fee_a().as_ref(), token_amount_a)?;
    let liquidity = range.liquidity_from_token_a(gross.amount)?;
    decrease_liquidity_quote(liquidity, slippage_tolerance, range, extensions)
}

pub fn decrease_liquidity_quote_b(
    token_amount_b: u64,
    slippage_tolerance: SlippageTolerance,
    range: &LiquidityRange,
    extensions: &TokenExtensionContext,
) -> Result<DecreaseLiquidityQuote, QuoteError> {
    let gross =
        calculate_transfer_fee_included_amount(extensions.transfer_fee_b().as_ref(), token_amount_b)?;
    let liquidity = range.liquidity_from_token_b(gross.amount)?;
    decrease_liquidity_quote(liquidity, slippage_tolerance, range, extensions)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token_extension::{MintExtensions, TokenProgram, TransferFee, TransferFeeConfig};

    const LIQUIDITY: u128 = 10_000_000;

    fn range(sqrt_price: u128, tick_current_index: i32) -> LiquidityRange {
        LiquidityRange {
            sqrt_price,
            tick_current_index,
            tick_lower_index: 29440,
            tick_upper_index: 33536,
        }
    }

    fn in_range() -> LiquidityRange {
        range(5 << 64, 32190)
    }

    fn slippage() -> SlippageTolerance {
        SlippageTolerance::from_bps(100).unwrap()
    }

    fn fee_on_a() -> TokenExtensionContext {
        TokenExtensionContext {
            mint_a: MintExtensions {
                token_program: TokenProgram::Token2022,
                transfer_fee_config: Some(TransferFeeConfig {
                    older_transfer_fee: TransferFee::new(100, u64::MAX),
                    newer_transfer_fee: TransferFee::new(100, u64::MAX),
                }),
                transfer_hook_program_id: None,
            },
            ..Default::default()
        }
    }

    mod status {
        use super::*;

        #[test]
        fn boundaries() {
            assert_eq!(position_status(-1, 0, 64), PositionStatus::PriceBelowRange);
            assert_eq!(position_status(0, 0, 64), PositionStatus::PriceInRange);
            assert_eq!(position_status(63, 0, 64), PositionStatus::PriceInRange);
            assert_eq!(position_status(64, 0, 64), PositionStatus::PriceAboveRange);
        }
    }

    mod increase {
        use super::*;

        #[test]
        fn in_range_rounds_up() {
            let quote = increase_liquidity_quote(
                LIQUIDITY,
                slippage(),
                &in_range(),
                &TokenExtensionContext::default(),
            )
            .unwrap();
            assert_eq!(
                quote,
                IncreaseLiquidityQuote {
                    liquidity_delta: LIQUIDITY,
                    token_est_a: 130130,
                    token_est_b: 6423784,
                    token_max_a: 131432,
                    token_max_b: 6488022,
                }
            );
        }

        #[test]
        fn below_range_only_token_a() {
            let quote = increase_liquidity_quote(
                LIQUIDITY,
                SlippageTolerance::ZERO,
                &range(1 << 64, 0),
                &TokenExtensionContext::default(),
            )
            .unwrap();
            assert_eq!(quote.token_est_a, 424960);
            assert_eq!(quote.token_est_b, 0);
        }

        #[test]
        fn above_range_only_token_b() {
            let quote = increase_liquidity_quote(
                LIQUIDITY,
                SlippageTolerance::ZERO,
                &range(10 << 64, 46054),
                &TokenExtensionContext::default(),
            )
            .unwrap();
            assert_eq!(quote.token_est_a, 0);
            assert_eq!(quote.token_est_b, 9903437);
        }

        #[test]
        fn transfer_fee_inclusive() {
            let quote =
                increase_liquidity_quote(LIQUIDITY, slippage(), &in_range(), &fee_on_a()).unwrap();
            assert_eq!(quote.token_est_a, 131445);
            assert_eq!(quote.token_max_a, 132760);
            assert_eq!(quote.token_est_b, 6423784);
        }

        #[test]
        fn by_token_a() {
            let quote = increase_liquidity_quote_a(
                130130,
                SlippageTolerance::ZERO,
                &in_range(),
                &TokenExtensionContext::default(),
            )
            .unwrap();
            assert_eq!(quote.liquidity_delta, 10000002);
            assert_eq!(quote.token_est_a, 130130);
            assert_eq!(quote.token_est_b, 6423786);
        }

        #[test]
        fn by_token_a_with_transfer_fee() {
            let quote =
                increase_liquidity_quote_a(1_000_000, SlippageTolerance::ZERO, &in_range(), &fee_on_a())
                    .unwrap();
            assert_eq!(quote.liquidity_delta, 76077787);
            assert_eq!(quote.token_est_a, 1_000_000);
            assert_eq!(quote.token_est_b, 48870727);
        }

        #[test]
        fn by_token_b() {
            let quote = increase_liquidity_quote_b(
                6423784,
                SlippageTolerance::ZERO,
                &in_range(),
                &TokenExtensionContext::default(),
            )
            .unwrap();
            assert_eq!(quote.liquidity_delta, LIQUIDITY);
            assert_eq!(quote.token_est_a, 130130);
        }

        #[test]
        fn token_not_held() {
            let quote = increase_liquidity_quote_b(
                1000,
                SlippageTolerance::ZERO,
                &range(1 << 64, 0),
                &TokenExtensionContext::default(),
            )
            .unwrap();
            assert_eq!(quote.liquidity_delta, 0);
            assert_eq!(quote.token_est_a, 0);
        }

        #[test]
        fn invalid_range() {
            let mut inverted = in_range();
            inverted.tick_lower_index = 33536;
            inverted.tick_upper_index = 29440;
            assert_eq!(
                increase_liquidity_quote(
                    LIQUIDITY,
                    slippage(),
                    &inverted,
                    &TokenExtensionContext::default()
                ),
                Err(QuoteError::InvalidTickRange(33536, 29440))
            );
        }

        #[test]
        fn amount_out_of_range() {
            assert_eq!(
                increase_liquidity_quote(
                    i128::MAX as u128,
                    slippage(),
                    &in_range(),
                    &TokenExtensionContext::default()
                ),
                Err(QuoteError::ArithmeticError)
            );
            assert_eq!(
                increase_liquidity_quote(
                    u128::MAX,
                    slippage(),
                    &in_range(),
                    &TokenExtensionContext::default()
                ),
                Err(QuoteError::Overflow)
            );
        }
    }

    mod decrease {
        use super::*;

        #[test]
        fn in_range_rounds_down() {
            let quote = decrease_liquidity_quote(
                LIQUIDITY,
                slippage(),
                &in_range(),
                &TokenExtensionContext::default(),
            )
            .unwrap();
            assert_eq!(
                quote,
                DecreaseLiquidityQuote {
                    liquidity_delta: LIQUIDITY,
                    token_est_a: 130129,
                    token_est_b: 6423783,
                    token_min_a: 128827,
                    token_min_b: 6359545,
                }
            );
        }

        #[test]
        fn transfer_fee_exclusive() {
            let quote =
                decrease_liquidity_quote(LIQUIDITY, slippage(), &in_range(), &fee_on_a()).unwrap();
            assert_eq!(quote.token_est_a, 128827);
            assert_eq!(quote.token_min_a, 127538);
            assert_eq!(quote.token_est_b, 6423783);
        }

        #[test]
        fn by_token_b() {
            let quote = decrease_liquidity_quote_b(
                6423784,
                SlippageTolerance::ZERO,
                &in_range(),
                &TokenExtensionContext::default(),
            )
            .unwrap();
            assert_eq!(quote.liquidity_delta, LIQUIDITY);
            assert_eq!(quote.token_est_b, 6423783);
        }
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn max_within_slippage(liquidity in 1..1u128 << 60, bps in 0..=10_000u16) {
                let slippage = SlippageTolerance::from_bps(bps).unwrap();
                let quote = increase_liquidity_quote(
                    liquidity, slippage, &in_range(), &TokenExtensionContext::default(),
                ).unwrap();
                prop_assert!(quote.token_max_a >= quote.token_est_a);
                let bound = u128::from(quote.token_est_a) * (10_000 + u128::from(bps)) / 10_000 + 1;
                prop_assert!(u128::from(quote.token_max_a) <= bound);
            }
        }
    }
}
