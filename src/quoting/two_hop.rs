use crate::quoting::swap::SwapQuote;
use crate::quoting::types::Address;
use crate::QuoteError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TwoHopSwapQuote {
    pub amount: u64,
    pub other_amount_threshold: u64,
    pub amount_specified_is_input: bool,
    pub input_mint: Address,
    pub intermediate_mint: Address,
    pub output_mint: Address,
    pub estimated_amount_in: u64,
    pub estimated_amount_out: u64,
    pub quote_one: SwapQuote,
    pub quote_two: SwapQuote,
}

/// Joins two single-pool quotes into a two-hop route.
///
/// For exact-in routes the specified amount comes from the first hop and the threshold
/// from the second; exact-out routes take them the other way around.
pub fn two_hop_swap_quote(
    quote_one: &SwapQuote,
    quote_two: &SwapQuote,
) -> Result<TwoHopSwapQuote, QuoteError> {
    if quote_one.output_mint != quote_two.input_mint
        || quote_one.amount_specified_is_input != quote_two.amount_specified_is_input
    {
        return Err(QuoteError::TokenMintMismatch);
    }

    let amount_specified_is_input = quote_one.amount_specified_is_input;
    let (amount, other_amount_threshold) = if amount_specified_is_input {
        (quote_one.amount, quote_two.other_amount_threshold)
    } else {
        (quote_two.amount, quote_one.other_amount_threshold)
    };

    Ok(TwoHopSwapQuote {
        amount,
        other_amount_threshold,
        amount_specified_is_input,
        input_mint: quote_one.input_mint,
        intermediate_mint: quote_one.output_mint,
        output_mint: quote_two.output_mint,
        estimated_amount_in: quote_one.estimated_amount_in,
        estimated_amount_out: quote_two.estimated_amount_out,
        quote_one: *quote_one,
        quote_two: *quote_two,
    })
}
