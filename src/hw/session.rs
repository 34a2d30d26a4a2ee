use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{instrument, trace};

use super::model::FoundDevice;
use super::profile::DeviceProfile;
use crate::error::{InteractionError, ProtocolError};
use crate::handlers::{Command, Frame};
use crate::utils::format_hex;

/// Raw access to one opened HID interface.
///
/// Implementations release the underlying handle when dropped, so a session
/// abandoned on an error path still frees the device.
#[async_trait]
pub(crate) trait ReportChannel: Send + fmt::Debug {
    /// Writes one complete report and returns how many bytes were accepted.
    async fn write_report(&mut self, report: &[u8]) -> Result<usize, InteractionError>;

    /// Reads at most `max_len` bytes, waiting no longer than `timeout`.
    async fn read_report(
        &mut self,
        max_len: usize,
        timeout: Duration,
    ) -> Result<Vec<u8>, InteractionError>;

    /// Releases the handle.
    async fn close(self: Box<Self>) -> Result<(), InteractionError>;
}

/// Exclusive connection to one matched device.
///
/// Every operation takes `&mut self`, so a query's write and its read can
/// never be interleaved with another operation on the same session.
#[derive(Debug)]
pub struct DeviceSession {
    device: FoundDevice,
    profile: DeviceProfile,
    channel: Box<dyn ReportChannel>,
}

impl DeviceSession {
    pub(crate) fn new(
        device: FoundDevice,
        profile: DeviceProfile,
        channel: Box<dyn ReportChannel>,
    ) -> Self {
        Self {
            device,
            profile,
            channel,
        }
    }

    /// Returns the enumerated interface this session is bound to.
    #[must_use]
    pub fn device(&self) -> &FoundDevice {
        &self.device
    }

    /// Returns the profile the session was opened with.
    #[must_use]
    pub fn profile(&self) -> &DeviceProfile {
        &self.profile
    }

    /// Encodes `command` into one report and writes it.
    ///
    /// Returns the number of bytes written.
    ///
    /// # Errors
    ///
    /// Returns an error when the command overflows the report size or the
    /// write fails.
    #[instrument(skip(self, command), level = "debug", fields(opcode = ?command.opcode()))]
    pub async fn send(&mut self, command: &Command) -> Result<usize, ProtocolError> {
        let frame = command.to_frame(self.profile.report_size())?;
        Ok(self.write_frame(&frame).await?)
    }

    /// Writes an already-encoded report.
    ///
    /// # Errors
    ///
    /// Returns an error when the backend rejects the write or accepts only
    /// part of the report.
    pub async fn write_frame(&mut self, frame: &Frame) -> Result<usize, InteractionError> {
        trace!(frame = %format_hex(frame.as_bytes()), "writing report");
        let written = self.channel.write_report(frame.as_bytes()).await?;
        if written < frame.len() {
            return Err(InteractionError::ShortWrite {
                expected: frame.len(),
                written,
            });
        }
        Ok(written)
    }

    /// Performs one read of up to one report, bounded by `timeout`.
    ///
    /// # Errors
    ///
    /// Returns [`InteractionError::ReadTimeout`] when nothing arrives in time.
    pub async fn read_report(&mut self, timeout: Duration) -> Result<Vec<u8>, InteractionError> {
        let payload = self
            .channel
            .read_report(self.profile.report_size(), timeout)
            .await?;
        trace!(payload = %format_hex(&payload), "read report");
        Ok(payload)
    }

    /// Releases the device handle.
    ///
    /// # Errors
    ///
    /// Returns an error when the backend fails to release the handle.
    #[instrument(skip(self), level = "debug", fields(path = self.device.path()))]
    pub async fn close(self) -> Result<(), InteractionError> {
        self.channel.close().await
    }
}
