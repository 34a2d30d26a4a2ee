use std::time::Duration;

use tracing::instrument;

use crate::error::ProtocolError;
use crate::hw::DeviceSession;
use crate::protocol::QueryKind;

use super::Command;

/// Screen power state.
#[derive(Debug, Clone, Copy, Eq, PartialEq, derive_more::Display)]
pub enum ScreenPower {
    /// Turn the panel off.
    #[display("off")]
    Off,
    /// Turn the panel on.
    #[display("on")]
    On,
}

impl ScreenPower {
    fn query_kind(self) -> QueryKind {
        match self {
            Self::Off => QueryKind::OledOff,
            Self::On => QueryKind::OledOn,
        }
    }

    /// Time the firmware needs before the panel reacts to further commands.
    #[must_use]
    pub fn settle_delay(self) -> Duration {
        match self {
            Self::Off => Duration::from_millis(200),
            Self::On => Duration::from_millis(500),
        }
    }
}

/// Handler for screen power commands.
pub struct PowerHandler;

impl PowerHandler {
    /// Switches the panel on or off and waits for it to settle.
    ///
    /// The firmware sends no reply, so nothing is read back.
    ///
    /// ```
    /// # async fn demo(mut session: macropad_oled::DeviceSession) -> Result<(), macropad_oled::ProtocolError> {
    /// use macropad_oled::{PowerHandler, ScreenPower};
    ///
    /// PowerHandler::set_power(&mut session, ScreenPower::On).await?;
    /// # Ok(())
    /// # }
    /// ```
    ///
    /// # Errors
    ///
    /// Returns an error when the write fails.
    #[instrument(skip(session), level = "debug")]
    pub async fn set_power(
        session: &mut DeviceSession,
        power: ScreenPower,
    ) -> Result<(), ProtocolError> {
        session.send(&Command::Query(power.query_kind())).await?;
        tokio::time::sleep(power.settle_delay()).await;
        Ok(())
    }
}
