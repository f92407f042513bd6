use crate::math::constants::BPS_DENOMINATOR;
use crate::QuoteError;

/// Slippage tolerance as an exact fraction.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SlippageTolerance {
    pub numerator: u64,
    pub denominator: u64,
}

impl SlippageTolerance {
    pub const ZERO: Self = Self {
        numerator: 0,
        denominator: 1,
    };

    pub fn new(numerator: u64, denominator: u64) -> Result<Self, QuoteError> {
        if denominator == 0 || numerator > denominator {
            return Err(QuoteError::InvalidSlippageTolerance);
        }
        Ok(Self {
            numerator,
            denominator,
        })
    }

    pub fn from_bps(bps: u16) -> Result<Self, QuoteError> {
        Self::new(u64::from(bps), u64::from(BPS_DENOMINATOR))
    }

    fn validate(&self) -> Result<(), QuoteError> {
        Self::new(self.numerator, self.denominator).map(|_| ())
    }

    /// Upper bound for an amount the user is willing to pay, rounded up.
    pub fn max_amount(&self, amount: u64) -> Result<u64, QuoteError> {
        self.validate()?;
        let denominator = u128::from(self.denominator);
        let widened =
            (u128::from(amount) * (denominator + u128::from(self.numerator))).div_ceil(denominator);
        u64::try_from(widened).map_err(|_| QuoteError::ArithmeticError)
    }

    /// Lower bound for an amount the user is willing to receive, rounded down.
    pub fn min_amount(&self, amount: u64) -> Result<u64, QuoteError> {
        self.validate()?;
        let denominator = u128::from(self.denominator);
        let narrowed =
            u128::from(amount) * (denominator - u128::from(self.numerator)) / denominator;
        // narrowed <= amount
        Ok(narrowed as u64)
    }
}

impl Default for SlippageTolerance {
    fn default() -> Self {
        Self::ZERO
    }
}
