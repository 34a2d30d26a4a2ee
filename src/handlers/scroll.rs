use tracing::instrument;

use crate::error::ProtocolError;
use crate::hw::DeviceSession;

use super::Command;

/// Direction of the controller's built-in horizontal scroll.
#[derive(Debug, Clone, Copy, Eq, PartialEq, derive_more::Display)]
pub enum HardwareScroll {
    #[display("off")]
    Off,
    #[display("on")]
    On,
    #[display("right")]
    Right,
    #[display("left")]
    Left,
}

impl HardwareScroll {
    fn command(self) -> Command {
        match self {
            Self::Off => Command::ScrollOff,
            Self::On => Command::ScrollOn,
            Self::Right => Command::ScrollRight,
            Self::Left => Command::ScrollLeft,
        }
    }
}

/// Handler for the display controller's hardware scroll.
///
/// Speed and area operands are device-defined and passed through unchecked.
pub struct ScrollHandler;

impl ScrollHandler {
    /// Switches hardware scrolling on, off, or to a direction.
    ///
    /// # Errors
    ///
    /// Returns an error when the write fails.
    #[instrument(skip(session), level = "debug")]
    pub async fn set_scroll(
        session: &mut DeviceSession,
        scroll: HardwareScroll,
    ) -> Result<(), ProtocolError> {
        session.send(&scroll.command()).await?;
        Ok(())
    }

    /// Sets the scroll speed level, nominally `0..=7`.
    ///
    /// # Errors
    ///
    /// Returns an error when the write fails.
    #[instrument(skip(session), level = "debug")]
    pub async fn set_speed(session: &mut DeviceSession, level: u8) -> Result<(), ProtocolError> {
        session.send(&Command::ScrollSpeed { level }).await?;
        Ok(())
    }

    /// Restricts hardware scrolling to rows `start..=end`.
    ///
    /// # Errors
    ///
    /// Returns an error when the write fails.
    #[instrument(skip(session), level = "debug")]
    pub async fn set_area(
        session: &mut DeviceSession,
        start: u8,
        end: u8,
    ) -> Result<(), ProtocolError> {
        session.send(&Command::ScrollArea { start, end }).await?;
        Ok(())
    }
}
