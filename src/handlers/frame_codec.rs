use std::fmt;
use std::ops::Deref;

use thiserror::Error;

use crate::protocol::REPORT_ID;
use crate::utils::format_hex;

const HEADER_LEN: usize = 1;

/// Errors returned by report encoding.
#[derive(Debug, Error, Clone, Eq, PartialEq)]
pub enum FrameCodecError {
    /// The command does not fit in one report after the header byte.
    #[error(
        "frame overflow: {payload_len} command bytes plus the header exceed the {report_size}-byte report"
    )]
    FrameOverflow {
        payload_len: usize,
        report_size: usize,
    },
    /// The configured report size cannot carry even one pixel coordinate.
    #[error("report size {report_size} is too small; the protocol needs at least {minimum} bytes")]
    ReportSizeTooSmall { report_size: usize, minimum: usize },
}

/// One fixed-size outbound report.
///
/// Byte `0` is the channel header, followed by the command bytes and zero
/// padding up to the report size.
#[derive(Clone, Eq, PartialEq)]
pub struct Frame(Box<[u8]>);

impl Frame {
    /// Returns the full report bytes, header included.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Returns the bytes after the header, padding included.
    ///
    /// ```
    /// use macropad_oled::FrameCodec;
    ///
    /// let frame = FrameCodec::encode(&[0x04, 0x80], 4)?;
    /// assert_eq!(&[0x04, 0x80, 0x00], frame.body());
    /// # Ok::<(), macropad_oled::FrameCodecError>(())
    /// ```
    #[must_use]
    pub fn body(&self) -> &[u8] {
        &self.0[HEADER_LEN..]
    }
}

impl Deref for Frame {
    type Target = [u8];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl AsRef<[u8]> for Frame {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Debug for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Frame[{}]", format_hex(&self.0))
    }
}

/// Encodes protocol byte sequences into fixed-size reports.
pub struct FrameCodec;

impl FrameCodec {
    /// Wraps `command` into one report of exactly `report_size` bytes.
    ///
    /// ```
    /// use macropad_oled::FrameCodec;
    ///
    /// let frame = FrameCodec::encode(&[0x08, 0x00], 6)?;
    /// assert_eq!(&[0x00, 0x08, 0x00, 0x00, 0x00, 0x00], frame.as_bytes());
    /// # Ok::<(), macropad_oled::FrameCodecError>(())
    /// ```
    ///
    /// # Errors
    ///
    /// Returns [`FrameCodecError::FrameOverflow`] when `command` plus the
    /// header byte does not fit in `report_size`. Nothing is truncated.
    pub fn encode(command: &[u8], report_size: usize) -> Result<Frame, FrameCodecError> {
        if command.len() + HEADER_LEN > report_size {
            return Err(FrameCodecError::FrameOverflow {
                payload_len: command.len(),
                report_size,
            });
        }

        let mut report = vec![0x00; report_size];
        report[0] = REPORT_ID;
        report[HEADER_LEN..HEADER_LEN + command.len()].copy_from_slice(command);
        Ok(Frame(report.into_boxed_slice()))
    }

    /// Returns how many command bytes fit in one report.
    #[must_use]
    pub fn command_capacity(report_size: usize) -> usize {
        report_size.saturating_sub(HEADER_LEN)
    }
}
