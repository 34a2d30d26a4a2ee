use tracing::instrument;

use crate::error::ProtocolError;
use crate::hw::DeviceSession;

use super::{Command, UploadReceipt};

/// Handler for text-line writes and row erases.
pub struct LineHandler;

impl LineHandler {
    /// Erases `row`, then writes `text` to it.
    ///
    /// The text is sent as raw bytes; it is neither wrapped nor truncated.
    ///
    /// ```
    /// # async fn demo(mut session: macropad_oled::DeviceSession) -> Result<(), macropad_oled::ProtocolError> {
    /// use macropad_oled::LineHandler;
    ///
    /// let receipt = LineHandler::write_line(&mut session, 0, "Hi").await?;
    /// assert_eq!(2, receipt.frames_written());
    /// # Ok(())
    /// # }
    /// ```
    ///
    /// # Errors
    ///
    /// Returns [`FrameCodecError::FrameOverflow`](super::FrameCodecError::FrameOverflow)
    /// before writing anything when the text does not fit one report, or an
    /// error when a write fails.
    #[instrument(skip(session, text), level = "debug", fields(text_len = text.len()))]
    pub async fn write_line(
        session: &mut DeviceSession,
        row: u8,
        text: &str,
    ) -> Result<UploadReceipt, ProtocolError> {
        let write = Command::WriteLine {
            row,
            text: text.to_string(),
        };
        // Encode up front so an oversized line leaves the row untouched.
        let report_size = session.profile().report_size();
        let erase_frame = Command::ClearRow { row }.to_frame(report_size)?;
        let write_frame = write.to_frame(report_size)?;

        let mut receipt = UploadReceipt::default();
        receipt.record(session.write_frame(&erase_frame).await?);
        receipt.record(session.write_frame(&write_frame).await?);
        Ok(receipt)
    }

    /// Erases one row.
    ///
    /// Row `8` shares its operand with the clear-all command and erases every
    /// row.
    ///
    /// # Errors
    ///
    /// Returns an error when the write fails.
    #[instrument(skip(session), level = "debug")]
    pub async fn clear_row(session: &mut DeviceSession, row: u8) -> Result<(), ProtocolError> {
        session.send(&Command::ClearRow { row }).await?;
        Ok(())
    }

    /// Erases every row.
    ///
    /// # Errors
    ///
    /// Returns an error when the write fails.
    #[instrument(skip(session), level = "debug")]
    pub async fn clear_all(session: &mut DeviceSession) -> Result<(), ProtocolError> {
        session.send(&Command::ClearAll).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::handlers::FrameCodecError;
    use crate::hw::test_session;

    #[tokio::test]
    async fn write_line_erases_then_writes() {
        let (mut session, log) = test_session(32, "");

        let receipt = LineHandler::write_line(&mut session, 0, "Hi")
            .await
            .expect("write should succeed");

        let mut erase = vec![0x00; 32];
        erase[1] = 0x08;
        let mut write = vec![0x00; 32];
        write[1..5].copy_from_slice(&[0x01, 0x00, b'H', b'i']);
        assert_eq!(vec![erase, write], log.reports());
        assert_eq!(UploadReceipt::new(64, 2), receipt);
    }

    #[tokio::test]
    async fn oversized_line_writes_nothing() {
        let (mut session, log) = test_session(8, "");

        let result = LineHandler::write_line(&mut session, 1, "too long").await;

        assert_matches!(result, Err(ProtocolError::FrameCodec(error))
            if matches!(*error, FrameCodecError::FrameOverflow { payload_len: 10, report_size: 8 }));
        assert!(log.is_empty());
    }

    #[tokio::test]
    async fn clear_all_uses_erase_all_operand() {
        let (mut session, log) = test_session(8, "");

        LineHandler::clear_all(&mut session)
            .await
            .expect("clear should succeed");

        assert_eq!(
            vec![vec![0x00, 0x08, 0x08, 0x00, 0x00, 0x00, 0x00, 0x00]],
            log.reports()
        );
    }
}
