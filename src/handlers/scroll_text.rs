use std::collections::VecDeque;
use std::time::Duration;

use bon::Builder;
use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::{Span, debug, instrument};
use tracing_indicatif::span_ext::IndicatifSpanExt;

use crate::error::ProtocolError;
use crate::hw::DeviceSession;

use super::{LineHandler, UploadReceipt};

/// Pause between scroll frames when none is given.
pub const DEFAULT_SCROLL_DELAY: Duration = Duration::from_millis(100);

/// Spaces appended to text that already fills the line.
const LONG_TEXT_GAP: usize = 5;

/// Which way the text travels.
#[derive(Debug, Clone, Copy, Default, Eq, PartialEq, derive_more::Display)]
pub enum ScrollDirection {
    /// First character moves to the end on every step.
    #[default]
    #[display("left")]
    Left,
    /// Last character moves to the front on every step.
    #[display("right")]
    Right,
}

/// Text prepared for circular scrolling on a line of `columns` characters.
///
/// ```
/// use macropad_oled::{ScrollDirection, ScrollText};
///
/// let text = ScrollText::new("abc", 4);
/// let frames: Vec<String> = text.frames(ScrollDirection::Left).collect();
/// assert_eq!(vec!["abc ", "bc  ", "c  a", "  ab", " abc"], frames);
/// ```
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct ScrollText {
    padded: Vec<char>,
    columns: usize,
}

impl ScrollText {
    /// Pads `text` so repeated passes are separated by a visible gap.
    ///
    /// Text shorter than `columns` is padded to `columns + 1` characters;
    /// anything longer gets five trailing spaces.
    #[must_use]
    pub fn new(text: &str, columns: usize) -> Self {
        let mut padded: Vec<char> = text.chars().collect();
        let target = if padded.len() < columns {
            columns + 1
        } else {
            padded.len() + LONG_TEXT_GAP
        };
        padded.resize(target, ' ');
        Self { padded, columns }
    }

    /// Returns the padded text.
    #[must_use]
    pub fn padded(&self) -> String {
        self.padded.iter().collect()
    }

    /// Returns how many frames one pass produces.
    #[must_use]
    pub fn frame_count(&self) -> usize {
        self.padded.len()
    }

    /// Starts a fresh pass from the unrotated text.
    #[must_use]
    pub fn frames(&self, direction: ScrollDirection) -> ScrollFrames {
        ScrollFrames {
            ring: self.padded.iter().copied().collect(),
            columns: self.columns,
            direction,
            remaining: self.padded.len(),
        }
    }
}

/// One pass of line contents; frame `k` is the text rotated `k` times.
#[derive(Debug, Clone)]
pub struct ScrollFrames {
    ring: VecDeque<char>,
    columns: usize,
    direction: ScrollDirection,
    remaining: usize,
}

impl Iterator for ScrollFrames {
    type Item = String;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;
        let line = self.ring.iter().take(self.columns).collect();
        rotate(&mut self.ring, self.direction);
        Some(line)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl ExactSizeIterator for ScrollFrames {}

fn rotate(ring: &mut VecDeque<char>, direction: ScrollDirection) {
    match direction {
        ScrollDirection::Left => ring.rotate_left(1),
        ScrollDirection::Right => ring.rotate_right(1),
    }
}

/// Pacing and cancellation for a scroll animation.
#[derive(Debug, Clone, Builder)]
pub struct ScrollOptions {
    #[builder(default)]
    direction: ScrollDirection,
    #[builder(default = DEFAULT_SCROLL_DELAY)]
    delay: Duration,
    /// Checked between frames; a frame already being written always finishes.
    cancel: Option<CancellationToken>,
}

impl Default for ScrollOptions {
    fn default() -> Self {
        Self::builder().build()
    }
}

/// Result of one scroll pass.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize)]
pub struct ScrollReport {
    steps_shown: usize,
    cancelled: bool,
    #[serde(flatten)]
    receipt: UploadReceipt,
}

impl ScrollReport {
    /// Returns how many scroll steps reached the device.
    #[must_use]
    pub fn steps_shown(&self) -> usize {
        self.steps_shown
    }

    /// Returns whether the pass stopped early.
    #[must_use]
    pub fn cancelled(&self) -> bool {
        self.cancelled
    }

    /// Returns the report totals.
    #[must_use]
    pub fn receipt(&self) -> UploadReceipt {
        self.receipt
    }
}

/// Writes a scrolling line, one frame per rotation step.
pub struct ScrollTextAnimator;

impl ScrollTextAnimator {
    /// Runs one full pass over `text` on `row`.
    ///
    /// Each step is a full line write (erase, then text). The delay sits
    /// between steps; nothing else can use the session until the pass ends.
    ///
    /// ```
    /// # async fn demo(mut session: macropad_oled::DeviceSession) -> Result<(), macropad_oled::ProtocolError> {
    /// use macropad_oled::{ScrollOptions, ScrollTextAnimator};
    ///
    /// let report =
    ///     ScrollTextAnimator::scroll(&mut session, 0, "Now playing", ScrollOptions::default())
    ///         .await?;
    /// assert!(!report.cancelled());
    /// # Ok(())
    /// # }
    /// ```
    ///
    /// # Errors
    ///
    /// Returns an error when a line does not fit one report or a write fails.
    #[instrument(
        skip(session, text, options),
        level = "info",
        fields(text_len = text.len(), direction = %options.direction, delay = ?options.delay)
    )]
    pub async fn scroll(
        session: &mut DeviceSession,
        row: u8,
        text: &str,
        options: ScrollOptions,
    ) -> Result<ScrollReport, ProtocolError> {
        let scroll_text = ScrollText::new(text, session.profile().columns());
        let total = scroll_text.frame_count();
        let cancel = options.cancel.unwrap_or_default();
        let span = Span::current();

        let mut receipt = UploadReceipt::default();
        let mut steps_shown = 0;
        for (index, line) in scroll_text.frames(options.direction).enumerate() {
            if index > 0 && pause(options.delay, &cancel).await {
                debug!(steps_shown, "scroll cancelled");
                return Ok(ScrollReport {
                    steps_shown,
                    cancelled: true,
                    receipt,
                });
            }
            span.pb_set_message(&format!("Scrolling step {}/{total}", index + 1));
            let written = LineHandler::write_line(session, row, &line).await?;
            receipt.record_all(written);
            steps_shown += 1;
        }

        Ok(ScrollReport {
            steps_shown,
            cancelled: false,
            receipt,
        })
    }
}

/// Sleeps for `delay`; returns `true` when cancelled first.
async fn pause(delay: Duration, cancel: &CancellationToken) -> bool {
    tokio::select! {
        () = cancel.cancelled() => true,
        () = tokio::time::sleep(delay) => false,
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;
    use crate::hw::test_session;

    #[rstest]
    #[case("Hi", 21, 22)]
    #[case("", 4, 5)]
    #[case("abcd", 4, 9)]
    #[case("a much longer line than fits", 21, 33)]
    fn padding_depends_on_column_count(
        #[case] text: &str,
        #[case] columns: usize,
        #[case] expected_len: usize,
    ) {
        let scroll_text = ScrollText::new(text, columns);
        assert_eq!(expected_len, scroll_text.frame_count());
        assert!(scroll_text.padded().starts_with(text));
    }

    #[test]
    fn right_scroll_moves_last_character_to_front() {
        let frames: Vec<String> = ScrollText::new("abc", 4)
            .frames(ScrollDirection::Right)
            .take(3)
            .collect();
        assert_eq!(vec!["abc ", " abc", "  ab"], frames);
    }

    #[rstest]
    #[case(1)]
    #[case(7)]
    #[case(26)]
    fn opposite_rotations_cancel_out(#[case] steps: usize) {
        let scroll_text = ScrollText::new("exactly twenty-one ch", 21);
        let mut ring: VecDeque<char> = scroll_text.padded().chars().collect();

        for _ in 0..steps {
            rotate(&mut ring, ScrollDirection::Left);
        }
        for _ in 0..steps {
            rotate(&mut ring, ScrollDirection::Right);
        }

        assert_eq!(scroll_text.padded(), ring.into_iter().collect::<String>());
    }

    #[test]
    fn frames_restart_from_unrotated_text() {
        let scroll_text = ScrollText::new("abc", 4);
        let first: Vec<String> = scroll_text.frames(ScrollDirection::Left).collect();
        let second: Vec<String> = scroll_text.frames(ScrollDirection::Left).collect();
        assert_eq!(first, second);
    }

    #[tokio::test(start_paused = true)]
    async fn scroll_writes_erase_and_line_per_step() {
        let (mut session, log) = test_session(32, "");

        let report = ScrollTextAnimator::scroll(&mut session, 2, "Hi", ScrollOptions::default())
            .await
            .expect("scroll should succeed");

        assert_eq!(22, report.steps_shown());
        assert_eq!(44, log.len());
        let reports = log.reports();
        assert_eq!(&[0x00, 0x08, 0x02], &reports[0][..3]);
        assert_eq!(&[0x00, 0x01, 0x02, b'H', b'i', b' '], &reports[1][..6]);
        assert_eq!(&[0x00, 0x01, 0x02, b'i', b' '], &reports[3][..5]);
    }

    #[tokio::test(start_paused = true)]
    async fn cancelled_token_stops_after_first_step() {
        let (mut session, log) = test_session(32, "");
        let cancel = CancellationToken::new();
        cancel.cancel();
        let options = ScrollOptions::builder().cancel(cancel).build();

        let report = ScrollTextAnimator::scroll(&mut session, 0, "Hi", options)
            .await
            .expect("scroll should succeed");

        assert!(report.cancelled());
        assert_eq!(1, report.steps_shown());
        assert_eq!(2, log.len());
    }
}
