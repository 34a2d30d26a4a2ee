use tracing::{instrument, warn};

use crate::error::ProtocolError;
use crate::hw::DeviceSession;

use super::FrameCodec;

/// Writes caller-assembled protocol bytes.
pub struct RawHandler;

impl RawHandler {
    /// Frames `bytes` like any other command and writes them.
    ///
    /// Nothing is validated beyond the report size; unknown opcodes go
    /// straight to the firmware.
    ///
    /// # Errors
    ///
    /// Returns [`FrameCodecError::FrameOverflow`](super::FrameCodecError::FrameOverflow)
    /// when `bytes` do not fit one report, or an error when the write fails.
    #[instrument(skip(session, bytes), level = "debug", fields(len = bytes.len()))]
    pub async fn send_raw(session: &mut DeviceSession, bytes: &[u8]) -> Result<usize, ProtocolError> {
        warn!("sending unchecked raw report");
        let frame = FrameCodec::encode(bytes, session.profile().report_size())?;
        Ok(session.write_frame(&frame).await?)
    }
}
