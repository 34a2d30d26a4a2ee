use thiserror::Error;
use tracing::instrument;

use crate::error::ProtocolError;
use crate::hw::DeviceSession;

use super::Command;

const MIN_BRIGHTNESS: i32 = 0;
const MAX_BRIGHTNESS: i32 = 255;

/// Errors returned by brightness validation.
#[derive(Debug, Error, Clone, Copy, Eq, PartialEq)]
pub enum BrightnessError {
    /// The requested level was outside the accepted range.
    #[error("brightness {value} is out of range ({min}..={max})")]
    OutOfRange { value: i32, min: i32, max: i32 },
}

/// Validated OLED brightness in the inclusive range `0..=255`.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct Brightness(u8);

impl Brightness {
    /// Creates a validated brightness value.
    ///
    /// # Errors
    ///
    /// Returns an error when `value` is outside `0..=255`.
    ///
    /// ```
    /// use macropad_oled::Brightness;
    ///
    /// let value = Brightness::new(128)?;
    /// assert_eq!(128, value.value());
    /// assert!(Brightness::new(256).is_err());
    /// # Ok::<(), macropad_oled::BrightnessError>(())
    /// ```
    pub fn new(value: i32) -> Result<Self, BrightnessError> {
        u8::try_from(value)
            .map(Self)
            .map_err(|_out_of_range| BrightnessError::OutOfRange {
                value,
                min: MIN_BRIGHTNESS,
                max: MAX_BRIGHTNESS,
            })
    }

    /// Returns the underlying brightness byte.
    #[must_use]
    pub fn value(self) -> u8 {
        self.0
    }
}

impl From<u8> for Brightness {
    fn from(value: u8) -> Self {
        Self(value)
    }
}

/// Handler for brightness commands.
pub struct BrightnessHandler;

impl BrightnessHandler {
    /// Sends a brightness command.
    ///
    /// ```
    /// # async fn demo(mut session: macropad_oled::DeviceSession) -> Result<(), macropad_oled::ProtocolError> {
    /// use macropad_oled::{Brightness, BrightnessHandler};
    ///
    /// let brightness = Brightness::new(60)?;
    /// BrightnessHandler::set_brightness(&mut session, brightness).await?;
    /// # Ok(())
    /// # }
    /// ```
    ///
    /// # Errors
    ///
    /// Returns an error when the report write fails.
    #[instrument(skip(session), level = "debug", fields(level = brightness.value()))]
    pub async fn set_brightness(
        session: &mut DeviceSession,
        brightness: Brightness,
    ) -> Result<(), ProtocolError> {
        session.send(&Command::SetBrightness(brightness)).await?;
        Ok(())
    }

    /// Validates a raw level and sends it.
    ///
    /// # Errors
    ///
    /// Returns [`BrightnessError::OutOfRange`] without writing anything when
    /// `level` is outside `0..=255`, or an error when the report write fails.
    pub async fn set_level(session: &mut DeviceSession, level: i32) -> Result<(), ProtocolError> {
        let brightness = Brightness::new(level)?;
        Self::set_brightness(session, brightness).await
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case(0)]
    #[case(128)]
    #[case(255)]
    fn brightness_accepts_range(#[case] value: i32) {
        let brightness = Brightness::new(value).expect("valid brightness should construct");
        assert_eq!(value, i32::from(brightness.value()));
    }

    #[rstest]
    #[case(-1)]
    #[case(256)]
    #[case(1000)]
    fn brightness_rejects_out_of_range(#[case] value: i32) {
        let result = Brightness::new(value);
        assert_matches!(
            result,
            Err(BrightnessError::OutOfRange {
                value: rejected,
                min: MIN_BRIGHTNESS,
                max: MAX_BRIGHTNESS,
            }) if rejected == value
        );
    }

    #[test]
    fn frame_for_brightness_matches_protocol() {
        let brightness = Brightness::new(0x50).expect("test brightness should be valid");
        let frame = Command::SetBrightness(brightness)
            .to_frame(8)
            .expect("brightness command should encode cleanly");
        assert_eq!(&[0x00, 0x04, 0x50, 0x00, 0x00, 0x00, 0x00, 0x00], frame.as_bytes());
    }
}
