//! Token-2022 extension adjustments: transfer fees and transfer hooks.

use crate::math::constants::{BPS_DENOMINATOR, NUM_REWARDS};
use crate::quoting::types::Address;
use crate::QuoteError;

#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TokenProgram {
    #[default]
    Token,
    Token2022,
}

/// Transfer fee schedule effective from `epoch` onwards.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TransferFee {
    pub epoch: u64,
    pub basis_points: u16,
    pub maximum_fee: u64,
}

impl TransferFee {
    pub fn new(basis_points: u16, maximum_fee: u64) -> Self {
        Self {
            epoch: 0,
            basis_points,
            maximum_fee,
        }
    }
}

#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TransferFeeConfig {
    pub older_transfer_fee: TransferFee,
    pub newer_transfer_fee: TransferFee,
}

impl TransferFeeConfig {
    pub fn epoch_fee(&self, epoch: u64) -> TransferFee {
        if epoch >= self.newer_transfer_fee.epoch {
            self.newer_transfer_fee
        } else {
            self.older_transfer_fee
        }
    }
}

#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MintExtensions {
    pub token_program: TokenProgram,
    pub transfer_fee_config: Option<TransferFeeConfig>,
    pub transfer_hook_program_id: Option<Address>,
}

impl MintExtensions {
    pub fn transfer_fee(&self, epoch: u64) -> Option<TransferFee> {
        self.transfer_fee_config.map(|config| config.epoch_fee(epoch))
    }

    #[must_use]
    pub fn has_transfer_hook(&self) -> bool {
        self.transfer_hook_program_id.is_some()
    }
}

/// Extension data for every mint a quote touches, resolved once by the caller.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TokenExtensionContext {
    pub current_epoch: u64,
    pub mint_a: MintExtensions,
    pub mint_b: MintExtensions,
    pub reward_mints: [Option<MintExtensions>; NUM_REWARDS],
}

impl TokenExtensionContext {
    pub fn transfer_fee_a(&self) -> Option<TransferFee> {
        self.mint_a.transfer_fee(self.current_epoch)
    }

    pub fn transfer_fee_b(&self) -> Option<TransferFee> {
        self.mint_b.transfer_fee(self.current_epoch)
    }

    pub fn transfer_fee(&self, a: bool) -> Option<TransferFee> {
        if a {
            self.transfer_fee_a()
        } else {
            self.transfer_fee_b()
        }
    }

    pub fn reward_transfer_fee(&self, index: usize) -> Option<TransferFee> {
        self.reward_mints
            .get(index)
            .copied()
            .flatten()
            .and_then(|mint| mint.transfer_fee(self.current_epoch))
    }

    #[must_use]
    pub fn requires_extra_accounts(&self) -> bool {
        self.mint_a.has_transfer_hook() || self.mint_b.has_transfer_hook()
    }
}

#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TransferFeeIncludedAmount {
    pub amount: u64,
    pub fee: u64,
}

#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TransferFeeExcludedAmount {
    pub amount: u64,
    pub fee: u64,
}

fn validate(fee: &TransferFee) -> Result<(), QuoteError> {
    if fee.basis_points > BPS_DENOMINATOR {
        return Err(QuoteError::InvalidTransferFee);
    }
    Ok(())
}

/// Fee withheld when transferring `amount`: `ceil(amount * bps / 10000)` capped at the maximum.
pub fn transfer_fee_on_amount(fee: &TransferFee, amount: u64) -> Result<u64, QuoteError> {
    validate(fee)?;
    if fee.basis_points == 0 || amount == 0 {
        return Ok(0);
    }
    let raw = (u128::from(amount) * u128::from(fee.basis_points))
        .div_ceil(u128::from(BPS_DENOMINATOR));
    // raw <= amount
    Ok((raw as u64).min(fee.maximum_fee))
}

/// Net amount the destination receives when `amount` is sent.
pub fn calculate_transfer_fee_excluded_amount(
    transfer_fee: Option<&TransferFee>,
    amount: u64,
) -> Result<TransferFeeExcludedAmount, QuoteError> {
    let Some(fee) = transfer_fee else {
        return Ok(TransferFeeExcludedAmount { amount, fee: 0 });
    };

    let withheld = transfer_fee_on_amount(fee, amount)?;
    Ok(TransferFeeExcludedAmount {
        amount: amount - withheld,
        fee: withheld,
    })
}

/// Gross amount that must be sent so the destination receives `amount`.
pub fn calculate_transfer_fee_included_amount(
    transfer_fee: Option<&TransferFee>,
    amount: u64,
) -> Result<TransferFeeIncludedAmount, QuoteError> {
    let Some(fee) = transfer_fee else {
        return Ok(TransferFeeIncludedAmount { amount, fee: 0 });
    };
    validate(fee)?;

    if fee.basis_points == 0 || amount == 0 {
        return Ok(TransferFeeIncludedAmount { amount, fee: 0 });
    }

    let capped = || {
        amount
            .checked_add(fee.maximum_fee)
            .map(|gross| TransferFeeIncludedAmount {
                amount: gross,
                fee: fee.maximum_fee,
            })
            .ok_or(QuoteError::ArithmeticError)
    };

    if fee.basis_points == BPS_DENOMINATOR {
        return capped();
    }

    let denominator = u128::from(BPS_DENOMINATOR - fee.basis_points);
    let raw = (u128::from(amount) * u128::from(BPS_DENOMINATOR)).div_ceil(denominator);
    let raw_fee = raw - u128::from(amount);

    if raw_fee >= u128::from(fee.maximum_fee) {
        return capped();
    }

    let gross = u64::try_from(raw).map_err(|_| QuoteError::ArithmeticError)?;
    Ok(TransferFeeIncludedAmount {
        amount: gross,
        fee: gross - amount,
    })
}
