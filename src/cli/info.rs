use std::io;

use anyhow::Result;
use serde::Serialize;
use tracing::instrument;

use crate::SessionHandler;
use crate::cli::OutputFormat;
use crate::cli::control::write_json_line;
use crate::config::ProfileSource;
use crate::hw::{DeviceProfile, FoundDevice, HardwareClient};
use crate::terminal::TerminalClient;

use super::ui::{DeviceView, Painter, ProfileView};

#[derive(Serialize)]
struct InfoReport<'a> {
    device: &'a FoundDevice,
    profile: &'a DeviceProfile,
    profile_source: String,
}

/// Executes the `info` command.
#[instrument(skip(client, out, terminal_client), level = "info", fields(%source, ?output_format))]
pub(crate) async fn run<W>(
    client: Box<dyn HardwareClient>,
    profile: DeviceProfile,
    source: &ProfileSource,
    out: &mut W,
    terminal_client: &dyn TerminalClient,
    output_format: OutputFormat,
) -> Result<()>
where
    W: io::Write,
{
    let session = SessionHandler::new(client, profile).connect_first().await?;
    let device = session.device().clone();
    session.close().await?;

    match output_format {
        OutputFormat::Pretty => {
            let painter = Painter::new(terminal_client.stdout_is_terminal());
            writeln!(out, "{}", painter.heading("Device"))?;
            writeln!(out, "{}", DeviceView::new(&device, &painter))?;
            writeln!(out, "{}", painter.heading("Profile"))?;
            writeln!(out, "{}", ProfileView::new(&profile, source, &painter))?;
        }
        OutputFormat::Json => write_json_line(
            out,
            &InfoReport {
                device: &device,
                profile: &profile,
                profile_source: source.to_string(),
            },
        )?,
    }

    Ok(())
}
