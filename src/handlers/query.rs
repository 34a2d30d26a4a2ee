use std::time::Duration;

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, instrument};

use crate::error::ProtocolError;
use crate::hw::DeviceSession;
use crate::protocol::{self, QueryKind};

use super::Command;

/// Read timeout used when the caller does not pick one.
pub const DEFAULT_QUERY_TIMEOUT: Duration = Duration::from_secs(1);

const MAX_REPLY_BYTES: usize = 8;

/// Errors returned when a query reply cannot be used.
#[derive(Debug, Error, Clone, Copy, Eq, PartialEq)]
pub enum QueryError {
    /// The read completed with zero bytes.
    #[error("the device sent an empty reply")]
    EmptyReply,
    /// The reply carries more significant bytes than a `u64` holds.
    #[error("reply has {significant_bytes} significant bytes; at most 8 fit an integer")]
    ReplyTooWide { significant_bytes: usize },
    /// The query kind is a command the firmware never answers.
    #[error("`{kind}` does not produce a reply")]
    NoReplyExpected { kind: QueryKind },
}

/// Little-endian integer decoded from a query reply.
///
/// Its meaning depends on the query: a boolean state, a layer index, a
/// brightness level or a count.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, derive_more::Display, derive_more::Into)]
pub struct QueryReply(u64);

impl QueryReply {
    /// Decodes reply bytes, least significant first.
    ///
    /// Trailing zero bytes are report padding and do not count towards the
    /// width.
    ///
    /// ```
    /// use macropad_oled::QueryReply;
    ///
    /// assert_eq!(5, QueryReply::decode(&[0x05, 0x00])?.value());
    /// assert_eq!(0x0102, QueryReply::decode(&[0x02, 0x01, 0x00, 0x00])?.value());
    /// # Ok::<(), macropad_oled::QueryError>(())
    /// ```
    ///
    /// # Errors
    ///
    /// Returns [`QueryError::EmptyReply`] for zero bytes and
    /// [`QueryError::ReplyTooWide`] when more than eight bytes are significant.
    pub fn decode(bytes: &[u8]) -> Result<Self, QueryError> {
        if bytes.is_empty() {
            return Err(QueryError::EmptyReply);
        }
        let significant = bytes
            .iter()
            .rposition(|byte| *byte != 0)
            .map_or(0, |index| index + 1);
        if significant > MAX_REPLY_BYTES {
            return Err(QueryError::ReplyTooWide {
                significant_bytes: significant,
            });
        }

        let mut word = [0u8; MAX_REPLY_BYTES];
        word[..significant].copy_from_slice(&bytes[..significant]);
        Ok(Self(u64::from_le_bytes(word)))
    }

    /// Returns the decoded integer.
    #[must_use]
    pub fn value(self) -> u64 {
        self.0
    }

    /// Returns whether the value is non-zero.
    #[must_use]
    pub fn as_bool(self) -> bool {
        self.0 != 0
    }
}

/// One write-then-read exchange over an exclusively borrowed session.
///
/// The channel does not correlate replies with requests. The mutable borrow
/// keeps any other write from landing between the query and its read. The
/// firmware also pushes a layer report on every layer change, which a read
/// cannot tell apart from a query reply.
///
/// A layer query is answered with two reports: the layer, then the current
/// brightness. Only the first is read here, so the brightness report stays
/// queued and is taken as the reply to whichever query comes next.
pub struct QuerySession<'a> {
    session: &'a mut DeviceSession,
    timeout: Duration,
}

impl<'a> QuerySession<'a> {
    /// Borrows `session` for queries with the default timeout.
    #[must_use]
    pub fn new(session: &'a mut DeviceSession) -> Self {
        Self {
            session,
            timeout: DEFAULT_QUERY_TIMEOUT,
        }
    }

    /// Overrides the read timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Writes the query for `kind` and decodes exactly one reply.
    ///
    /// ```
    /// # async fn demo(mut session: macropad_oled::DeviceSession) -> Result<(), macropad_oled::ProtocolError> {
    /// use macropad_oled::{QueryKind, QuerySession};
    ///
    /// let layer = QuerySession::new(&mut session).query(QueryKind::Layer).await?;
    /// println!("layer {layer}");
    /// # Ok(())
    /// # }
    /// ```
    ///
    /// # Errors
    ///
    /// Returns [`QueryError::NoReplyExpected`] without writing for power
    /// commands, a write error, [`InteractionError::ReadTimeout`] when no reply
    /// arrives in time, or a [`QueryError`] for an unusable reply.
    ///
    /// [`InteractionError::ReadTimeout`]: crate::InteractionError::ReadTimeout
    #[instrument(skip(self), level = "debug", fields(timeout = ?self.timeout))]
    pub async fn query(&mut self, kind: QueryKind) -> Result<QueryReply, ProtocolError> {
        if !protocol::query_metadata(kind).expects_reply() {
            return Err(QueryError::NoReplyExpected { kind }.into());
        }

        self.session.send(&Command::Query(kind)).await?;
        let payload = self.session.read_report(self.timeout).await?;
        let reply = QueryReply::decode(&payload)?;
        debug!(%reply, "query answered");
        Ok(reply)
    }

    /// Returns whether the OLED is on.
    ///
    /// # Errors
    ///
    /// Returns the same errors as [`QuerySession::query`].
    pub async fn oled_state(&mut self) -> Result<bool, ProtocolError> {
        Ok(self.query(QueryKind::OledState).await?.as_bool())
    }

    /// Returns the highest active keyboard layer.
    ///
    /// The firmware follows the layer with an unrequested brightness report;
    /// see [`QuerySession`].
    ///
    /// # Errors
    ///
    /// Returns the same errors as [`QuerySession::query`].
    pub async fn layer(&mut self) -> Result<u64, ProtocolError> {
        Ok(self.query(QueryKind::Layer).await?.value())
    }

    /// Returns the current OLED brightness.
    ///
    /// # Errors
    ///
    /// Returns the same errors as [`QuerySession::query`].
    pub async fn brightness(&mut self) -> Result<u64, ProtocolError> {
        Ok(self.query(QueryKind::Brightness).await?.value())
    }

    /// Returns how many characters fit on a line.
    ///
    /// # Errors
    ///
    /// Returns the same errors as [`QuerySession::query`].
    pub async fn max_chars(&mut self) -> Result<u64, ProtocolError> {
        Ok(self.query(QueryKind::MaxChars).await?.value())
    }

    /// Returns how many lines fit on the display.
    ///
    /// # Errors
    ///
    /// Returns the same errors as [`QuerySession::query`].
    pub async fn max_lines(&mut self) -> Result<u64, ProtocolError> {
        Ok(self.query(QueryKind::MaxLines).await?.value())
    }
}
