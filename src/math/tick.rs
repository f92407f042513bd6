use crate::math::constants::{
    MAX_SQRT_PRICE, MAX_TICK_INDEX, MIN_SQRT_PRICE, MIN_TICK_INDEX, TICK_ARRAY_SIZE,
};
use crate::math::uint::{to_u128, U256};
use crate::QuoteError;

/// `sqrt(1.0001)^(2^i)` in Q32.96 for `i` in `0..19`.
const POSITIVE_FACTORS: [u128; 19] = [
    79232123823359799118286999567,
    79236085330515764027303304731,
    79244008939048815603706035061,
    79259858533276714757314932305,
    79291567232598584799939703904,
    79355022692464371645785046466,
    79482085999252804386437311141,
    79736823300114093921829183326,
    80248749790819932309965073892,
    81282483887344747381513967011,
    83390072131320151908154831281,
    87770609709833776024991924138,
    97234110755111693312479820773,
    119332217159966728226237229890,
    179736315981702064433883588727,
    407748233172238350107850275304,
    2098478828474011932436660412517,
    55581415166113811149459800483533,
    38992368544603139932233054999993551,
];

/// `sqrt(1.0001)^-(2^i)` in Q64.64 for `i` in `0..19`.
const NEGATIVE_FACTORS: [u128; 19] = [
    18445821805675392311,
    18444899583751176498,
    18443055278223354162,
    18439367220385604838,
    18431993317065449817,
    18417254355718160513,
    18387811781193591352,
    18329067761203520168,
    18212142134806087854,
    17980523815641551639,
    17526086738831147013,
    16651378430235024244,
    15030750278693429944,
    12247334978882834399,
    8131365268884726200,
    3584323654723342297,
    696457651847595233,
    26294789957452057,
    37481735321082,
];

fn positive_tick_to_sqrt_price(tick: u32) -> Result<u128, QuoteError> {
    let mut ratio = if tick & 1 != 0 {
        U256::from(POSITIVE_FACTORS[0])
    } else {
        U256::ONE << 96
    };

    for (i, factor) in POSITIVE_FACTORS.iter().enumerate().skip(1) {
        if tick & (1 << i) != 0 {
            ratio = (ratio * U256::from(*factor)) >> 96;
        }
    }

    to_u128(ratio >> 32).ok_or(QuoteError::Overflow)
}

fn negative_tick_to_sqrt_price(tick: u32) -> u128 {
    let mut ratio: u128 = if tick & 1 != 0 {
        NEGATIVE_FACTORS[0]
    } else {
        1 << 64
    };

    // ratio <= 2^64 and every factor < 2^64, so the product fits in 128 bits
    for (i, factor) in NEGATIVE_FACTORS.iter().enumerate().skip(1) {
        if tick & (1 << i) != 0 {
            ratio = (ratio * factor) >> 64;
        }
    }

    ratio
}

/// Q64.64 square root price of `1.0001^tick`.
pub fn tick_index_to_sqrt_price(tick: i32) -> Result<u128, QuoteError> {
    if !(MIN_TICK_INDEX..=MAX_TICK_INDEX).contains(&tick) {
        return Err(QuoteError::InvalidTickIndex(tick));
    }

    if tick >= 0 {
        positive_tick_to_sqrt_price(tick.unsigned_abs())
    } else {
        Ok(negative_tick_to_sqrt_price(tick.unsigned_abs()))
    }
}

/// Greatest tick whose sqrt price is at or below `sqrt_price`.
pub fn sqrt_price_to_tick_index(sqrt_price: u128) -> Result<i32, QuoteError> {
    if !(MIN_SQRT_PRICE..=MAX_SQRT_PRICE).contains(&sqrt_price) {
        return Err(QuoteError::InvalidSqrtPrice(sqrt_price));
    }

    let mut low = MIN_TICK_INDEX;
    let mut high = MAX_TICK_INDEX;

    while low < high {
        let mid = low + (high - low + 1) / 2;
        if tick_index_to_sqrt_price(mid)? <= sqrt_price {
            low = mid;
        } else {
            high = mid - 1;
        }
    }

    Ok(low)
}

#[must_use]
pub fn ticks_per_array(tick_spacing: u16) -> i32 {
    TICK_ARRAY_SIZE as i32 * i32::from(tick_spacing)
}

fn nonzero_spacing(tick_spacing: u16) -> Result<i32, QuoteError> {
    if tick_spacing == 0 {
        return Err(QuoteError::InvalidTickSpacing(tick_spacing));
    }
    Ok(i32::from(tick_spacing))
}

pub fn tick_array_start_index(tick: i32, tick_spacing: u16) -> Result<i32, QuoteError> {
    nonzero_spacing(tick_spacing)?;
    let width = ticks_per_array(tick_spacing);
    Ok(tick.div_euclid(width) * width)
}

#[must_use]
pub fn is_tick_initializable(tick: i32, tick_spacing: u16) -> bool {
    tick_spacing != 0 && tick.rem_euclid(i32::from(tick_spacing)) == 0
}

/// Position of `tick` inside the tick array starting at `start_index`.
pub fn tick_offset_in_array(
    tick: i32,
    start_index: i32,
    tick_spacing: u16,
) -> Result<usize, QuoteError> {
    if !is_tick_initializable(tick, tick_spacing) {
        return Err(QuoteError::InvalidTickIndex(tick));
    }
    let offset = (tick - start_index) / i32::from(tick_spacing);
    if offset < 0 || offset as usize >= TICK_ARRAY_SIZE {
        return Err(QuoteError::TickArrayIndexOutOfBounds(tick));
    }
    Ok(offset as usize)
}

/// Lowest and highest ticks a full range position can use for `tick_spacing`.
pub fn full_range_tick_indexes(tick_spacing: u16) -> Result<(i32, i32), QuoteError> {
    let spacing = nonzero_spacing(tick_spacing)?;
    Ok((
        (MIN_TICK_INDEX / spacing) * spacing,
        (MAX_TICK_INDEX / spacing) * spacing,
    ))
}

pub fn prev_initializable_tick_index(tick: i32, tick_spacing: u16) -> Result<i32, QuoteError> {
    let spacing = nonzero_spacing(tick_spacing)?;
    Ok(tick.div_euclid(spacing) * spacing)
}

/// First initializable tick strictly above `tick`.
pub fn next_initializable_tick_index(tick: i32, tick_spacing: u16) -> Result<i32, QuoteError> {
    prev_initializable_tick_index(tick, tick_spacing)?
        .checked_add(i32::from(tick_spacing))
        .ok_or(QuoteError::Overflow)
}

/// Checks that `[lower, upper)` is an ordered range of initializable, in-bounds ticks.
pub fn validate_tick_range(lower: i32, upper: i32, tick_spacing: u16) -> Result<(), QuoteError> {
    let in_bounds = |t: i32| (MIN_TICK_INDEX..=MAX_TICK_INDEX).contains(&t);
    if lower >= upper
        || !in_bounds(lower)
        || !in_bounds(upper)
        || !is_tick_initializable(lower, tick_spacing)
        || !is_tick_initializable(upper, tick_spacing)
    {
        return Err(QuoteError::InvalidTickRange(lower, upper));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    mod tick_index_to_sqrt_price {
        use super::*;

        #[test]
        fn tick_examples() {
            assert_eq!(tick_index_to_sqrt_price(0).unwrap(), 18446744073709551616);
            assert_eq!(tick_index_to_sqrt_price(1).unwrap(), 18447666387855959850);
            assert_eq!(tick_index_to_sqrt_price(-1).unwrap(), 18445821805675392311);
            assert_eq!(tick_index_to_sqrt_price(64).unwrap(), 18505865242158250041);
            assert_eq!(tick_index_to_sqrt_price(-64).unwrap(), 18387811781193591352);
            assert_eq!(
                tick_index_to_sqrt_price(100_000).unwrap(),
                2737055259406582257880
            );
            assert_eq!(
                tick_index_to_sqrt_price(-100_000).unwrap(),
                124324258982887573
            );
            assert_eq!(
                tick_index_to_sqrt_price(32190).unwrap(),
                92232024937472262906
            );
        }

        #[test]
        fn bounds() {
            assert_eq!(
                tick_index_to_sqrt_price(MAX_TICK_INDEX).unwrap(),
                MAX_SQRT_PRICE
            );
            assert_eq!(
                tick_index_to_sqrt_price(MIN_TICK_INDEX).unwrap(),
                MIN_SQRT_PRICE
            );
            assert_eq!(
                tick_index_to_sqrt_price(MAX_TICK_INDEX - 1).unwrap(),
                79222712478800779441888593664
            );
        }

        #[test]
        fn out_of_range() {
            assert_eq!(
                tick_index_to_sqrt_price(MAX_TICK_INDEX + 1),
                Err(QuoteError::InvalidTickIndex(MAX_TICK_INDEX + 1))
            );
            assert_eq!(
                tick_index_to_sqrt_price(MIN_TICK_INDEX - 1),
                Err(QuoteError::InvalidTickIndex(MIN_TICK_INDEX - 1))
            );
        }
    }

    mod sqrt_price_to_tick_index {
        use super::*;

        #[test]
        fn examples() {
            assert_eq!(sqrt_price_to_tick_index(5 << 64).unwrap(), 32190);
            assert_eq!(sqrt_price_to_tick_index(1 << 64).unwrap(), 0);
            assert_eq!(sqrt_price_to_tick_index((1 << 64) - 1).unwrap(), -1);
        }

        #[test]
        fn bounds() {
            assert_eq!(
                sqrt_price_to_tick_index(MIN_SQRT_PRICE).unwrap(),
                MIN_TICK_INDEX
            );
            assert_eq!(
                sqrt_price_to_tick_index(MAX_SQRT_PRICE).unwrap(),
                MAX_TICK_INDEX
            );
            assert_eq!(
                sqrt_price_to_tick_index(MAX_SQRT_PRICE - 1).unwrap(),
                MAX_TICK_INDEX - 1
            );
        }

        #[test]
        fn out_of_range() {
            assert_eq!(
                sqrt_price_to_tick_index(MIN_SQRT_PRICE - 1),
                Err(QuoteError::InvalidSqrtPrice(MIN_SQRT_PRICE - 1))
            );
            assert_eq!(
                sqrt_price_to_tick_index(MAX_SQRT_PRICE + 1),
                Err(QuoteError::InvalidSqrtPrice(MAX_SQRT_PRICE + 1))
            );
        }
    }

    mod tick_arrays {
        use super::*;

        #[test]
        fn start_index() {
            assert_eq!(tick_array_start_index(32190, 64).unwrap(), 28160);
            assert_eq!(tick_array_start_index(-1, 64).unwrap(), -5632);
            assert_eq!(tick_array_start_index(-5633, 64).unwrap(), -11264);
            assert_eq!(tick_array_start_index(MAX_TICK_INDEX, 1).unwrap(), 443608);
            assert_eq!(tick_array_start_index(0, 2).unwrap(), 0);
        }

        #[test]
        fn offsets() {
            assert_eq!(tick_offset_in_array(29440, 28160, 64).unwrap(), 20);
            assert_eq!(tick_offset_in_array(33536, 28160, 64).unwrap(), 84);
            assert_eq!(
                tick_offset_in_array(33537, 28160, 64),
                Err(QuoteError::InvalidTickIndex(33537))
            );
            assert_eq!(
                tick_offset_in_array(28160 + 88 * 64, 28160, 64),
                Err(QuoteError::TickArrayIndexOutOfBounds(28160 + 88 * 64))
            );
        }

        #[test]
        fn initializable() {
            assert!(is_tick_initializable(-128, 64));
            assert!(!is_tick_initializable(-127, 64));
            assert_eq!(prev_initializable_tick_index(-1, 64).unwrap(), -64);
            assert_eq!(next_initializable_tick_index(-1, 64).unwrap(), 0);
            assert_eq!(next_initializable_tick_index(0, 64).unwrap(), 64);
            assert_eq!(full_range_tick_indexes(64).unwrap(), (-443584, 443584));
        }

        #[test]
        fn zero_spacing() {
            assert_eq!(tick_array_start_index(0, 0), Err(QuoteError::InvalidTickSpacing(0)));
            assert_eq!(prev_initializable_tick_index(5, 0), Err(QuoteError::InvalidTickSpacing(0)));
            assert_eq!(next_initializable_tick_index(5, 0), Err(QuoteError::InvalidTickSpacing(0)));
            assert_eq!(full_range_tick_indexes(0), Err(QuoteError::InvalidTickSpacing(0)));
            assert_eq!(next_initializable_tick_index(i32::MAX, 1), Err(QuoteError::Overflow));
        }

        #[test]
        fn tick_range() {
            assert!(validate_tick_range(29440, 33536, 64).is_ok());
            assert_eq!(
                validate_tick_range(33536, 29440, 64),
                Err(QuoteError::InvalidTickRange(33536, 29440))
            );
            assert_eq!(
                validate_tick_range(0, 0, 64),
                Err(QuoteError::InvalidTickRange(0, 0))
            );
            assert_eq!(
                validate_tick_range(1, 64, 64),
                Err(QuoteError::InvalidTickRange(1, 64))
            );
        }
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn tick_round_trip(tick in MIN_TICK_INDEX..=MAX_TICK_INDEX) {
                let sqrt_price = tick_index_to_sqrt_price(tick).unwrap();
                prop_assert_eq!(sqrt_price_to_tick_index(sqrt_price).unwrap(), tick);
            }

            #[test]
            fn strictly_monotonic(tick in MIN_TICK_INDEX..MAX_TICK_INDEX) {
                prop_assert!(
                    tick_index_to_sqrt_price(tick).unwrap()
                        < tick_index_to_sqrt_price(tick + 1).unwrap()
                );
            }

            #[test]
            fn price_between_ticks(sqrt_price in MIN_SQRT_PRICE..=MAX_SQRT_PRICE) {
                let tick = sqrt_price_to_tick_index(sqrt_price).unwrap();
                prop_assert!(tick_index_to_sqrt_price(tick).unwrap() <= sqrt_price);
                if tick < MAX_TICK_INDEX {
                    prop_assert!(tick_index_to_sqrt_price(tick + 1).unwrap() > sqrt_price);
                }
            }
        }
    }
}
