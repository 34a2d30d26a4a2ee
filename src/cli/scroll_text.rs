use std::io;
use std::time::Duration;

use anyhow::Result;
use clap::{Args, ValueEnum};
use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument};

use crate::cli::OutputFormat;
use crate::cli::control::write_json_line;
use crate::cli::query::parse_duration;
use crate::error::InteractionError;
use crate::hw::{DeviceProfile, DeviceSession, HardwareClient};
use crate::{
    DEFAULT_SCROLL_DELAY, ScrollDirection, ScrollOptions, ScrollTextAnimator, SessionHandler,
    UploadReceipt,
};

/// Arguments for `scroll-text`.
#[derive(Debug, Args)]
pub struct ScrollTextArgs {
    /// Zero-based text row.
    row: u8,
    /// Text to scroll.
    text: String,
    #[arg(long, value_enum, default_value = "left")]
    direction: Direction,
    /// Pause between steps (e.g. `100ms`).
    #[arg(long, value_parser = parse_duration, default_value = "100ms")]
    delay: Duration,
    /// Full passes to run; `0` repeats until Ctrl+C.
    #[arg(long, default_value_t = 1)]
    passes: u32,
}

impl ScrollTextArgs {
    /// Creates scroll-text arguments for one left-bound pass.
    ///
    /// ```
    /// use macropad_oled::ScrollTextArgs;
    ///
    /// let args = ScrollTextArgs::new(0, "Now playing");
    /// let _ = args;
    /// ```
    #[must_use]
    pub fn new(row: u8, text: impl Into<String>) -> Self {
        Self {
            row,
            text: text.into(),
            direction: Direction::Left,
            delay: DEFAULT_SCROLL_DELAY,
            passes: 1,
        }
    }

    /// Sets the pause between steps.
    #[must_use]
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Sets how many passes run; `0` repeats until cancelled.
    #[must_use]
    pub fn with_passes(mut self, passes: u32) -> Self {
        self.passes = passes;
        self
    }
}

/// Scroll direction selected on the command line.
#[derive(Debug, Clone, Copy, Eq, PartialEq, ValueEnum)]
pub enum Direction {
    Left,
    Right,
}

impl From<Direction> for ScrollDirection {
    fn from(direction: Direction) -> Self {
        match direction {
            Direction::Left => Self::Left,
            Direction::Right => Self::Right,
        }
    }
}

#[derive(Debug, Default, Serialize)]
struct ScrollTextSummary {
    action: &'static str,
    row: u8,
    passes: u32,
    steps_shown: usize,
    cancelled: bool,
    bytes_written: usize,
    frames_written: usize,
}

/// Executes the `scroll-text` command, stopping between steps on Ctrl+C.
#[instrument(skip(client, args, out), level = "info", fields(row = args.row, ?output_format))]
pub(crate) async fn run<W>(
    client: Box<dyn HardwareClient>,
    profile: DeviceProfile,
    args: &ScrollTextArgs,
    out: &mut W,
    output_format: OutputFormat,
) -> Result<()>
where
    W: io::Write,
{
    let mut session = SessionHandler::new(client, profile).connect_first().await?;
    let cancel = CancellationToken::new();

    let scroll_result = {
        let scrolling = scroll_passes(&mut session, args, cancel.clone());
        tokio::pin!(scrolling);
        tokio::select! {
            result = &mut scrolling => result,
            signal = tokio::signal::ctrl_c() => match signal {
                Ok(()) => {
                    debug!("Ctrl+C received, stopping after the current step");
                    cancel.cancel();
                    scrolling.await
                }
                Err(source) => Err(InteractionError::CtrlC { source }.into()),
            },
        }
    };
    let close_result = session.close().await;
    let summary = scroll_result?;
    close_result?;

    match output_format {
        OutputFormat::Pretty => {
            let suffix = if summary.cancelled {
                " (stopped by Ctrl+C)"
            } else {
                ""
            };
            writeln!(
                out,
                "Scrolled row {}: {} step(s) over {} pass(es), {} report(s){suffix}",
                summary.row, summary.steps_shown, summary.passes, summary.frames_written,
            )?;
        }
        OutputFormat::Json => write_json_line(out, &summary)?,
    }

    Ok(())
}

async fn scroll_passes(
    session: &mut DeviceSession,
    args: &ScrollTextArgs,
    cancel: CancellationToken,
) -> Result<ScrollTextSummary> {
    let mut summary = ScrollTextSummary {
        action: "scroll_text",
        row: args.row,
        ..ScrollTextSummary::default()
    };
    let mut receipt = UploadReceipt::default();

    while args.passes == 0 || summary.passes < args.passes {
        if summary.passes > 0 {
            tokio::select! {
                () = cancel.cancelled() => {
                    summary.cancelled = true;
                    break;
                }
                () = tokio::time::sleep(args.delay) => {}
            }
        }
        let options = ScrollOptions::builder()
            .direction(args.direction.into())
            .delay(args.delay)
            .cancel(cancel.clone())
            .build();
        let report = ScrollTextAnimator::scroll(session, args.row, &args.text, options).await?;
        receipt.record_all(report.receipt());
        summary.steps_shown += report.steps_shown();
        summary.passes += 1;
        if report.cancelled() {
            summary.cancelled = true;
            break;
        }
    }

    summary.bytes_written = receipt.bytes_written();
    summary.frames_written = receipt.frames_written();
    Ok(summary)
}
