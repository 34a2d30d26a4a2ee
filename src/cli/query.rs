use std::io;
use std::time::Duration;

use anyhow::Result;
use clap::{Args, ValueEnum};
use serde::Serialize;
use tracing::instrument;

use crate::cli::OutputFormat;
use crate::cli::control::write_json_line;
use crate::hw::{DeviceProfile, HardwareClient};
use crate::protocol::{self, QueryKind};
use crate::{DEFAULT_QUERY_TIMEOUT, QuerySession, SessionHandler};

/// Arguments for `query`.
#[derive(Debug, Args)]
pub struct QueryArgs {
    #[arg(value_enum)]
    target: QueryTarget,
    /// How long to wait for the reply (e.g. `250ms`, `2s`).
    #[arg(long, value_parser = parse_duration, default_value = "1s")]
    timeout: Duration,
}

impl QueryArgs {
    /// Creates query arguments with the default timeout.
    ///
    /// ```
    /// use macropad_oled::{QueryArgs, QueryTarget};
    ///
    /// let args = QueryArgs::new(QueryTarget::Layer);
    /// let _ = args;
    /// ```
    #[must_use]
    pub fn new(target: QueryTarget) -> Self {
        Self {
            target,
            timeout: DEFAULT_QUERY_TIMEOUT,
        }
    }
}

/// State that can be read back from the device.
#[derive(Debug, Clone, Copy, Eq, PartialEq, ValueEnum)]
pub enum QueryTarget {
    /// Whether the OLED is on.
    State,
    /// Highest active keyboard layer.
    Layer,
    /// Current OLED brightness.
    Brightness,
    /// Characters per line.
    MaxChars,
    /// Lines on the display.
    MaxLines,
}

impl QueryTarget {
    fn kind(self) -> QueryKind {
        match self {
            Self::State => QueryKind::OledState,
            Self::Layer => QueryKind::Layer,
            Self::Brightness => QueryKind::Brightness,
            Self::MaxChars => QueryKind::MaxChars,
            Self::MaxLines => QueryKind::MaxLines,
        }
    }
}

#[derive(Serialize)]
struct QueryResult {
    query: QueryKind,
    value: u64,
}

/// Executes the `query` command.
#[instrument(skip(client, out), level = "info", fields(?args, ?output_format))]
pub(crate) async fn run<W>(
    client: Box<dyn HardwareClient>,
    profile: DeviceProfile,
    args: &QueryArgs,
    out: &mut W,
    output_format: OutputFormat,
) -> Result<()>
where
    W: io::Write,
{
    let kind = args.target.kind();
    let mut session = SessionHandler::new(client, profile).connect_first().await?;
    let reply = QuerySession::new(&mut session)
        .with_timeout(args.timeout)
        .query(kind)
        .await;
    let close_result = session.close().await;
    let reply = reply?;
    close_result?;

    match output_format {
        OutputFormat::Pretty => {
            let description = protocol::query_metadata(kind).description();
            if kind == QueryKind::OledState {
                let state = if reply.as_bool() { "on" } else { "off" };
                writeln!(out, "{description}: {state}")?;
            } else {
                writeln!(out, "{description}: {reply}")?;
            }
        }
        OutputFormat::Json => write_json_line(
            out,
            &QueryResult {
                query: kind,
                value: reply.value(),
            },
        )?,
    }

    Ok(())
}

pub(crate) fn parse_duration(value: &str) -> Result<Duration, String> {
    humantime::parse_duration(value).map_err(|error| error.to_string())
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn parse_duration_accepts_humantime() {
        assert_eq!(Ok(Duration::from_millis(250)), parse_duration("250ms"));
    }

    #[test]
    fn every_target_expects_a_reply() {
        for target in QueryTarget::value_variants() {
            assert!(protocol::query_metadata(target.kind()).expects_reply());
        }
    }
}
