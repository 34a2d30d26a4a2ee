use std::io;

use anyhow::Result;
use serde::Serialize;
use tracing::instrument;

use crate::cli::OutputFormat;
use crate::cli::control::write_json_line;
use crate::hw::{FoundDevice, HardwareClient, HidIdentity};
use crate::terminal::TerminalClient;

use super::ui::{DeviceListView, Painter, Spinner};

#[derive(Serialize)]
struct DeviceEntry<'a> {
    #[serde(flatten)]
    device: &'a FoundDevice,
    matches_profile: bool,
}

/// Executes the `devices` command.
#[instrument(skip(client, out, terminal_client), level = "info", fields(?output_format))]
pub(crate) async fn run<W>(
    client: Box<dyn HardwareClient>,
    wanted: Option<HidIdentity>,
    out: &mut W,
    terminal_client: &dyn TerminalClient,
    output_format: OutputFormat,
) -> Result<()>
where
    W: io::Write,
{
    let spinner = Spinner::new(terminal_client.stderr_is_terminal());
    let devices = spinner
        .wrap("Enumerating HID interfaces", client.enumerate())
        .await?;

    match output_format {
        OutputFormat::Pretty => {
            let painter = Painter::new(terminal_client.stdout_is_terminal());
            writeln!(out, "{}", DeviceListView::new(&devices, wanted, &painter))?;
        }
        OutputFormat::Json => {
            let entries: Vec<DeviceEntry<'_>> = devices
                .iter()
                .map(|device| DeviceEntry {
                    device,
                    matches_profile: wanted.is_some_and(|identity| device.matches(&identity)),
                })
                .collect();
            write_json_line(out, &entries)?;
        }
    }

    Ok(())
}
