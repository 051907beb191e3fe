//! Block-level effect trait for interleaved PCM16 audio.
//!
//! The render path produces one interleaved block per period. Global
//! effects run in place on that block, once per period, after both render
//! halves have been mixed.
//!
//! ## Design Decisions
//!
//! - **Interleaved PCM16**: the block is exactly what the output sink
//!   consumes, so no conversion buffer is needed between stages.
//! - **Disabled means untouched**: an inactive effect must leave the block
//!   byte-identical.
//! - **No allocations**: implementations keep all state inline.

/// In-place processor for interleaved PCM16 blocks.
///
/// # Example
///
/// ```rust
/// use diapason_core::BlockEffect;
///
/// struct Invert;
///
/// impl BlockEffect for Invert {
///     fn process_block(&mut self, block: &mut [i16], _channels: usize) {
///         for s in block.iter_mut() {
///             *s = s.saturating_neg();
///         }
///     }
///
///     fn reset(&mut self) {}
/// }
///
/// let mut block = [1, -2, 3, -4];
/// Invert.process_block(&mut block, 2);
/// assert_eq!(block, [-1, 2, -3, 4]);
/// ```
pub trait BlockEffect {
    /// Processes one interleaved block in place.
    ///
    /// `block.len()` is `frames * channels`.
    fn process_block(&mut self, block: &mut [i16], channels: usize);

    /// Clears internal history without changing parameters.
    fn reset(&mut self);

    /// Whether the next call to [`process_block`](Self::process_block)
    /// may change the block.
    fn is_active(&self) -> bool {
        true
    }
}

/// Two block effects run back to back.
#[derive(Debug, Clone, Default)]
pub struct Serial<A, B> {
    /// First stage.
    pub first: A,
    /// Second stage, fed by the first.
    pub second: B,
}

impl<A, B> Serial<A, B> {
    /// Wires `first` into `second`.
    pub fn new(first: A, second: B) -> Self {
        Self { first, second }
    }
}

impl<A: BlockEffect, B: BlockEffect> BlockEffect for Serial<A, B> {
    fn process_block(&mut self, block: &mut [i16], channels: usize) {
        self.first.process_block(block, channels);
        self.second.process_block(block, channels);
    }

    fn reset(&mut self) {
        self.first.reset();
        self.second.reset();
    }

    fn is_active(&self) -> bool {
        self.first.is_active() || self.second.is_active()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct AddOne {
        calls: usize,
    }

    impl BlockEffect for AddOne {
        fn process_block(&mut self, block: &mut [i16], _channels: usize) {
            self.calls += 1;
            for s in block.iter_mut() {
                *s = s.saturating_add(1);
            }
        }

        fn reset(&mut self) {
            self.calls = 0;
        }

        fn is_active(&self) -> bool {
            false
        }
    }

    #[test]
    fn test_serial_runs_in_order() {
        let mut chain = Serial::new(AddOne { calls: 0 }, AddOne { calls: 0 });
        let mut block = [0i16; 4];
        chain.process_block(&mut block, 2);
        assert_eq!(block, [2; 4]);
        assert_eq!(chain.first.calls, 1);
        assert_eq!(chain.second.calls, 1);
        assert!(!chain.is_active());
        chain.reset();
        assert_eq!(chain.first.calls, 0);
    }
}
