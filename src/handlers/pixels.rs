use thiserror::Error;
use tracing::{Span, debug, instrument};
use tracing_indicatif::span_ext::IndicatifSpanExt;

use crate::error::ProtocolError;
use crate::hw::DeviceSession;
use crate::media::PixelImage;

use super::{Command, PixelCoordinate, PixelValue, UploadReceipt};

/// Errors returned while translating pixel coordinates.
#[derive(Debug, Error, Clone, Copy, Eq, PartialEq)]
pub enum PixelError {
    /// The offset pushed a coordinate past the one-byte wire range.
    #[error("pixel {coordinate} shifted by {offset} leaves the 0..=255 coordinate range")]
    CoordinateOverflow {
        coordinate: PixelCoordinate,
        offset: PixelOffset,
    },
}

/// Component-wise translation applied to every coordinate of a pixel write.
#[derive(Debug, Clone, Copy, Default, Eq, PartialEq, derive_more::Display)]
#[display("+({dx}, {dy})")]
pub struct PixelOffset {
    pub dx: u8,
    pub dy: u8,
}

impl PixelOffset {
    /// Creates an offset.
    #[must_use]
    pub const fn new(dx: u8, dy: u8) -> Self {
        Self { dx, dy }
    }

    /// Translates `coordinate` by this offset.
    ///
    /// ```
    /// use macropad_oled::{PixelCoordinate, PixelOffset};
    ///
    /// let shifted = PixelOffset::new(10, 2).apply(PixelCoordinate::new(1, 1))?;
    /// assert_eq!(PixelCoordinate::new(11, 3), shifted);
    /// # Ok::<(), macropad_oled::PixelError>(())
    /// ```
    ///
    /// # Errors
    ///
    /// Returns [`PixelError::CoordinateOverflow`] when either component exceeds
    /// `255`.
    pub fn apply(self, coordinate: PixelCoordinate) -> Result<PixelCoordinate, PixelError> {
        let overflow = PixelError::CoordinateOverflow {
            coordinate,
            offset: self,
        };
        let x = coordinate.x.checked_add(self.dx).ok_or(overflow)?;
        let y = coordinate.y.checked_add(self.dy).ok_or(overflow)?;
        Ok(PixelCoordinate::new(x, y))
    }
}

impl From<(u8, u8)> for PixelOffset {
    fn from((dx, dy): (u8, u8)) -> Self {
        Self { dx, dy }
    }
}

/// Handler for pixel set/clear writes.
pub struct PixelHandler;

impl PixelHandler {
    /// Translates every coordinate by `offset` and writes them in batches.
    ///
    /// Batches follow the input order and hold at most
    /// [`PixelBatcher::capacity`](super::PixelBatcher::capacity) coordinates.
    ///
    /// ```
    /// # async fn demo(mut session: macropad_oled::DeviceSession) -> Result<(), macropad_oled::ProtocolError> {
    /// use macropad_oled::{PixelCoordinate, PixelHandler, PixelOffset, PixelValue};
    ///
    /// let points = [PixelCoordinate::new(0, 0), PixelCoordinate::new(127, 63)];
    /// PixelHandler::set_pixels(&mut session, &points, PixelValue::On, PixelOffset::default())
    ///     .await?;
    /// # Ok(())
    /// # }
    /// ```
    ///
    /// # Errors
    ///
    /// Returns [`PixelError::CoordinateOverflow`] before writing anything when
    /// a translated coordinate leaves the byte range, or an error when a write
    /// fails. Batches written before a failed write stay applied.
    #[instrument(
        skip(session, coordinates),
        level = "info",
        fields(count = coordinates.len(), %value, %offset)
    )]
    pub async fn set_pixels(
        session: &mut DeviceSession,
        coordinates: &[PixelCoordinate],
        value: PixelValue,
        offset: PixelOffset,
    ) -> Result<UploadReceipt, ProtocolError> {
        let absolute = coordinates
            .iter()
            .map(|coordinate| offset.apply(*coordinate))
            .collect::<Result<Vec<_>, _>>()?;

        let batcher = session.profile().pixel_batcher();
        let total = batcher.batch_count(absolute.len());
        let span = Span::current();
        let mut receipt = UploadReceipt::default();
        for (index, group) in batcher.batches(&absolute).enumerate() {
            span.pb_set_message(&format!("Writing pixel batch {}/{total}", index + 1));
            let command = Command::SetPixelBatch {
                value,
                coordinates: group.to_vec(),
            };
            receipt.record(session.send(&command).await?);
        }
        debug!(frames = receipt.frames_written(), "pixel write finished");
        Ok(receipt)
    }

    /// Sets every on-pixel of `image`, shifted by `origin`.
    ///
    /// Off-pixels are left untouched; clear the display first for a clean
    /// picture.
    ///
    /// # Errors
    ///
    /// Returns the same errors as [`PixelHandler::set_pixels`].
    pub async fn draw_picture(
        session: &mut DeviceSession,
        image: &PixelImage,
        origin: PixelOffset,
    ) -> Result<UploadReceipt, ProtocolError> {
        let coordinates = image.on_pixels();
        Self::set_pixels(session, &coordinates, PixelValue::On, origin).await
    }
}
