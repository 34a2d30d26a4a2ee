use std::num::NonZeroUsize;
use std::slice::Chunks;

use super::command::PixelCoordinate;
use super::frame_codec::FrameCodecError;

/// Opcode plus value flag, and the terminator, each counted as one pair slot.
const RESERVED_PAIR_SLOTS: usize = 2;

/// Smallest report size that fits one coordinate pair.
pub const MIN_REPORT_SIZE: usize = 2 * (RESERVED_PAIR_SLOTS + 1);

/// Splits coordinate lists into groups that each fit one pixel-batch report.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct PixelBatcher {
    capacity: NonZeroUsize,
}

impl PixelBatcher {
    /// Creates a batcher for reports of `report_size` bytes.
    ///
    /// ```
    /// use macropad_oled::PixelBatcher;
    ///
    /// let batcher = PixelBatcher::new(32)?;
    /// assert_eq!(14, batcher.capacity());
    /// # Ok::<(), macropad_oled::FrameCodecError>(())
    /// ```
    ///
    /// # Errors
    ///
    /// Returns [`FrameCodecError::ReportSizeTooSmall`] when a report cannot
    /// carry a single coordinate.
    pub fn new(report_size: usize) -> Result<Self, FrameCodecError> {
        let pairs = (report_size / 2).saturating_sub(RESERVED_PAIR_SLOTS);
        let capacity =
            NonZeroUsize::new(pairs).ok_or(FrameCodecError::ReportSizeTooSmall {
                report_size,
                minimum: MIN_REPORT_SIZE,
            })?;
        Ok(Self { capacity })
    }

    /// Returns how many coordinates go into one report.
    #[must_use]
    pub fn capacity(self) -> usize {
        self.capacity.get()
    }

    /// Returns the groups in input order; only the last may be short.
    pub fn batches<'a>(&self, coordinates: &'a [PixelCoordinate]) -> Chunks<'a, PixelCoordinate> {
        coordinates.chunks(self.capacity.get())
    }

    /// Returns how many reports `count` coordinates need.
    #[must_use]
    pub fn batch_count(self, count: usize) -> usize {
        count.div_ceil(self.capacity.get())
    }
}
