use crate::math::constants::{MAX_TICK_INDEX, MIN_TICK_INDEX, TICK_ARRAY_SIZE};
use crate::math::tick::{tick_array_start_index, tick_offset_in_array, ticks_per_array};
use crate::quoting::types::{TickArrayState, TickState};
use crate::QuoteError;
use alloc::vec::Vec;

/// Contiguous, ascending run of tick arrays a swap can walk through.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TickArraySequence {
    tick_arrays: Vec<TickArrayState>,
    tick_spacing: u16,
}

impl TickArraySequence {
    pub fn new(
        mut tick_arrays: Vec<TickArrayState>,
        tick_spacing: u16,
    ) -> Result<Self, QuoteError> {
        if tick_arrays.is_empty() || tick_spacing == 0 {
            return Err(QuoteError::TickArraySequenceInvalid);
        }

        tick_arrays.sort_by_key(|array| array.start_tick_index);

        let width = ticks_per_array(tick_spacing);
        let mut expected_start: Option<i32> = None;
        for array in &tick_arrays {
            if array.start_tick_index.rem_euclid(width) != 0
                || array.start_tick_index < MIN_TICK_INDEX - width
                || array.start_tick_index > MAX_TICK_INDEX
            {
                return Err(QuoteError::TickArraySequenceInvalid);
            }
            if let Some(expected) = expected_start {
                if array.start_tick_index != expected {
                    return Err(QuoteError::TickArraySequenceInvalid);
                }
            }
            expected_start = Some(array.start_tick_index + width);
        }

        Ok(Self {
            tick_arrays,
            tick_spacing,
        })
    }

    pub fn start_index(&self) -> i32 {
        self.tick_arrays
            .first()
            .map_or(0, |array| array.start_tick_index)
    }

    pub fn end_index(&self) -> i32 {
        self.tick_arrays.last().map_or(0, |array| {
            array.start_tick_index + ticks_per_array(self.tick_spacing) - 1
        })
    }

    fn last_initializable_index(&self) -> i32 {
        self.tick_arrays.last().map_or(0, |array| {
            array.start_tick_index + (TICK_ARRAY_SIZE as i32 - 1) * i32::from(self.tick_spacing)
        })
    }

    pub fn tick_spacing(&self) -> u16 {
        self.tick_spacing
    }

    fn locate(&self, tick_index: i32) -> Result<(usize, usize), QuoteError> {
        if tick_index < self.start_index() || tick_index > self.end_index() {
            return Err(QuoteError::TickArrayIndexOutOfBounds(tick_index));
        }
        let start = tick_array_start_index(tick_index, self.tick_spacing)?;
        let array_index = ((start - self.start_index()) / ticks_per_array(self.tick_spacing)) as usize;
        let offset = tick_offset_in_array(tick_index, start, self.tick_spacing)?;
        Ok((array_index, offset))
    }

    pub fn tick(&self, tick_index: i32) -> Result<&TickState, QuoteError> {
        let (array_index, offset) = self.locate(tick_index)?;
        self.tick_arrays
            .get(array_index)
            .map(|array| &array.ticks[offset])
            .ok_or(QuoteError::TickArrayIndexOutOfBounds(tick_index))
    }

    pub fn tick_mut(&mut self, tick_index: i32) -> Result<&mut TickState, QuoteError> {
        let (array_index, offset) = self.locate(tick_index)?;
        self.tick_arrays
            .get_mut(array_index)
            .map(|array| &mut array.ticks[offset])
            .ok_or(QuoteError::TickArrayIndexOutOfBounds(tick_index))
    }

    /// Nearest initialized tick strictly above the initializable tick at or below `tick_index`.
    ///
    /// Returns `(None, last_tick)` when no initialized tick remains in the sequence.
    pub fn next_initialized_tick(
        &self,
        tick_index: i32,
    ) -> Result<(Option<&TickState>, i32), QuoteError> {
        let spacing = i32::from(self.tick_spacing);
        let mut search = tick_index.div_euclid(spacing) * spacing + spacing;
        if search > self.end_index() {
            return Err(QuoteError::TickArrayIndexOutOfBounds(search));
        }

        let last = self.last_initializable_index();
        while search <= last {
            let tick = self.tick(search)?;
            if tick.initialized {
                return Ok((Some(tick), search));
            }
            search += spacing;
        }
        Ok((None, last))
    }

    /// Nearest initialized tick at or below `tick_index`.
    ///
    /// Returns `(None, first_tick)` when no initialized tick remains in the sequence.
    pub fn prev_initialized_tick(
        &self,
        tick_index: i32,
    ) -> Result<(Option<&TickState>, i32), QuoteError> {
        let spacing = i32::from(self.tick_spacing);
        let mut search = tick_index.div_euclid(spacing) * spacing;
        if search < self.start_index() {
            return Err(QuoteError::TickArrayIndexOutOfBounds(search));
        }

        let first = self.start_index();
        while search >= first {
            let tick = self.tick(search)?;
            if tick.initialized {
                return Ok((Some(tick), search));
            }
            search -= spacing;
        }
        Ok((None, first))
    }

    pub fn tick_arrays(&self) -> &[TickArrayState] {
        &self.tick_arrays
    }

    pub fn into_tick_arrays(self) -> Vec<TickArrayState> {
        self.tick_arrays
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    fn array_with(start: i32, initialized: &[usize]) -> TickArrayState {
        let mut array = TickArrayState::empty(start);
        for &offset in initialized {
            array.ticks[offset].initialized = true;
            array.ticks[offset].liquidity_net = offset as i128;
        }
        array
    }

    mod new {
        use super::*;

        #[test]
        fn sorts_arrays() {
            let sequence =
                TickArraySequence::new(vec![array_with(176, &[]), array_with(-176, &[]), array_with(0, &[])], 2)
                    .unwrap();
            assert_eq!(sequence.start_index(), -176);
            assert_eq!(sequence.end_index(), 351);
        }

        #[test]
        fn empty() {
            assert_eq!(
                TickArraySequence::new(vec![], 2),
                Err(QuoteError::TickArraySequenceInvalid)
            );
        }

        #[test]
        fn gap() {
            assert_eq!(
                TickArraySequence::new(vec![array_with(0, &[]), array_with(352, &[])], 2),
                Err(QuoteError::TickArraySequenceInvalid)
            );
        }

        #[test]
        fn duplicate() {
            assert_eq!(
                TickArraySequence::new(vec![array_with(0, &[]), array_with(0, &[])], 2),
                Err(QuoteError::TickArraySequenceInvalid)
            );
        }

        #[test]
        fn start_outside_tick_bounds() {
            let beyond_max = (MAX_TICK_INDEX / 176 + 1) * 176;
            assert_eq!(
                TickArraySequence::new(vec![array_with(beyond_max, &[])], 2),
                Err(QuoteError::TickArraySequenceInvalid)
            );
            assert_eq!(
                TickArraySequence::new(vec![array_with(i32::MAX / 176 * 176, &[])], 2),
                Err(QuoteError::TickArraySequenceInvalid)
            );
            let below_min = (MIN_TICK_INDEX / 176 - 2) * 176;
            assert_eq!(
                TickArraySequence::new(vec![array_with(below_min, &[])], 2),
                Err(QuoteError::TickArraySequenceInvalid)
            );
            let lowest = (MIN_TICK_INDEX / 176 - 1) * 176;
            assert!(TickArraySequence::new(vec![array_with(lowest, &[])], 2).is_ok());
        }

        #[test]
        fn misaligned() {
            assert_eq!(
                TickArraySequence::new(vec![array_with(2, &[])], 2),
                Err(QuoteError::TickArraySequenceInvalid)
            );
        }
    }

    mod search {
        use super::*;

        fn sequence() -> TickArraySequence {
            TickArraySequence::new(
                vec![array_with(-5632, &[87]), array_with(0, &[0, 10])],
                64,
            )
            .unwrap()
        }

        #[test]
        fn next_initialized() {
            let sequence = sequence();
            let (tick, index) = sequence.next_initialized_tick(-64).unwrap();
            assert_eq!(index, 0);
            assert_eq!(tick.map(|t| t.liquidity_net), Some(0));

            let (tick, index) = sequence.next_initialized_tick(0).unwrap();
            assert_eq!(index, 640);
            assert_eq!(tick.map(|t| t.liquidity_net), Some(10));

            // strictly above, even from a non-initializable tick
            let (_, index) = sequence.next_initialized_tick(-1).unwrap();
            assert_eq!(index, 0);
        }

        #[test]
        fn next_exhausted() {
            let sequence = sequence();
            let (tick, index) = sequence.next_initialized_tick(640).unwrap();
            assert!(tick.is_none());
            assert_eq!(index, 87 * 64);
        }

        #[test]
        fn next_out_of_bounds() {
            assert_eq!(
                sequence().next_initialized_tick(87 * 64),
                Err(QuoteError::TickArrayIndexOutOfBounds(88 * 64))
            );
        }

        #[test]
        fn prev_initialized() {
            let sequence = sequence();
            let (_, index) = sequence.prev_initialized_tick(700).unwrap();
            assert_eq!(index, 640);
            let (_, index) = sequence.prev_initialized_tick(640).unwrap();
            assert_eq!(index, 640);
            let (_, index) = sequence.prev_initialized_tick(639).unwrap();
            assert_eq!(index, 0);
            let (tick, index) = sequence.prev_initialized_tick(-1).unwrap();
            assert_eq!(index, -64);
            assert_eq!(tick.map(|t| t.liquidity_net), Some(87));
        }

        #[test]
        fn prev_exhausted() {
            let sequence = sequence();
            let (tick, index) = sequence.prev_initialized_tick(-128).unwrap();
            assert!(tick.is_none());
            assert_eq!(index, -5632);
        }

        #[test]
        fn prev_out_of_bounds() {
            assert_eq!(
                sequence().prev_initialized_tick(-5633),
                Err(QuoteError::TickArrayIndexOutOfBounds(-5696))
            );
        }

        #[test]
        fn tick_lookup() {
            let mut sequence = sequence();
            assert!(sequence.tick(640).unwrap().initialized);
            assert!(!sequence.tick(704).unwrap().initialized);
            sequence.tick_mut(704).unwrap().initialized = true;
            assert!(sequence.tick(704).unwrap().initialized);
            assert_eq!(
                sequence.tick(88 * 64),
                Err(QuoteError::TickArrayIndexOutOfBounds(88 * 64))
            );
        }
    }
}
