use std::io;

use anyhow::{Context, Result};
use owo_colors::OwoColorize;
use tracing::{Span, instrument};
use tracing_indicatif::span_ext::IndicatifSpanExt;

use crate::cli::{Command, FakeArgs, LogLevel, RunOptions};
use crate::config;
use crate::hw::{
    DeviceProfile, DeviceSession, HardwareClient,
    fake_hardware_client as build_fake_hardware_client,
    real_hardware_client as build_real_hardware_client,
};
use crate::telemetry;
use crate::terminal::{SystemTerminalClient, TerminalClient};

/// Creates a hardware client backed by `hidapi`.
///
/// Without the `hid` feature every call fails with
/// [`InteractionError::BackendUnavailable`](crate::InteractionError::BackendUnavailable).
#[must_use]
pub fn real_hardware_client() -> Box<dyn HardwareClient> {
    build_real_hardware_client()
}

/// Creates a hardware client backed by fake HID fixtures.
#[must_use]
pub fn fake_hardware_client(fake_args: FakeArgs) -> Box<dyn HardwareClient> {
    build_fake_hardware_client(fake_args.into_backend_config())
}

/// Session-level app helper for opening the configured device.
pub struct SessionHandler {
    hardware_client: Box<dyn HardwareClient>,
    profile: DeviceProfile,
}

impl SessionHandler {
    /// Creates a session handler for `profile`.
    ///
    /// ```
    /// use macropad_oled::{DeviceProfile, SessionHandler, real_hardware_client};
    ///
    /// let profile = DeviceProfile::builder()
    ///     .vendor_id(0xFEED)
    ///     .product_id(0x0000)
    ///     .build()?;
    /// let handler = SessionHandler::new(real_hardware_client(), profile);
    /// let _ = handler;
    /// # Ok::<(), macropad_oled::ProfileError>(())
    /// ```
    #[must_use]
    pub fn new(hardware_client: Box<dyn HardwareClient>, profile: DeviceProfile) -> Self {
        Self {
            hardware_client,
            profile,
        }
    }

    /// Opens the first HID interface matching the profile identity.
    ///
    /// # Errors
    ///
    /// Returns an error if enumeration fails, nothing matches, or the device
    /// cannot be opened.
    #[instrument(skip(self), level = "info", fields(identity = %self.profile.identity()))]
    pub async fn connect_first(self) -> Result<DeviceSession> {
        let span = Span::current();
        span.pb_set_message(&format!("Opening {}", self.profile.identity()));
        span.pb_set_finish_message(&format!("{} Connected", "✓".green()));

        match self.hardware_client.open_first_device(self.profile).await {
            Ok(session) => Ok(session),
            Err(error) => {
                span.pb_set_finish_message(&format!("{} Connection failed", "✗".red()));
                Err(error.into())
            }
        }
    }
}

/// Runs the CLI command with default settings.
///
/// ```
/// # async fn run() -> anyhow::Result<()> {
/// use clap::Parser;
///
/// let args = macropad_oled::Args::try_parse_from([
///     "macropad-oled",
///     "--fake",
///     "--fake-devices",
///     "hid-0|FEED|0000|FF60|61",
///     "devices",
/// ])?;
/// let (command, maybe_fake_args) = args.into_command_and_fake_args()?;
/// let hardware_client = match maybe_fake_args {
///     Some(fake_args) => macropad_oled::fake_hardware_client(fake_args),
///     None => macropad_oled::real_hardware_client(),
/// };
/// let mut out = Vec::new();
/// macropad_oled::run(command, &mut out, hardware_client).await?;
/// # Ok(())
/// # }
/// ```
///
/// # Errors
///
/// Returns an error if tracing initialisation fails, the profile cannot be
/// loaded, device interaction fails, or output writing fails.
pub async fn run<W>(
    command: Command,
    out: &mut W,
    hardware_client: Box<dyn HardwareClient>,
) -> Result<()>
where
    W: io::Write,
{
    run_with_options(command, out, hardware_client, RunOptions::default()).await
}

/// Runs the CLI command with explicit settings.
///
/// # Errors
///
/// Returns an error if tracing initialisation fails, the profile cannot be
/// loaded, device interaction fails, or output writing fails.
pub async fn run_with_options<W>(
    command: Command,
    out: &mut W,
    hardware_client: Box<dyn HardwareClient>,
    options: RunOptions,
) -> Result<()>
where
    W: io::Write,
{
    run_with_clients(
        command,
        out,
        &SystemTerminalClient,
        hardware_client,
        options,
    )
    .await
}

/// Runs the CLI command with injected clients and explicit settings.
///
/// ```
/// # async fn run() -> anyhow::Result<()> {
/// use clap::Parser;
///
/// struct FakeTerminal;
/// impl macropad_oled::TerminalClient for FakeTerminal {
///     fn stdout_is_terminal(&self) -> bool { false }
///     fn stderr_is_terminal(&self) -> bool { false }
/// }
///
/// let args = macropad_oled::Args::try_parse_from([
///     "macropad-oled",
///     "--log-level",
///     "trace",
///     "--fake",
///     "--fake-devices",
///     "hid-0|FEED|0000|FF60|61",
///     "line",
///     "0",
///     "Hi",
/// ])?;
/// let options = args.run_options(macropad_oled::OutputFormat::Pretty);
/// let (command, maybe_fake_args) = args.into_command_and_fake_args()?;
/// let hardware_client = match maybe_fake_args {
///     Some(fake_args) => macropad_oled::fake_hardware_client(fake_args),
///     None => macropad_oled::real_hardware_client(),
/// };
/// let mut out = Vec::new();
/// macropad_oled::run_with_clients(command, &mut out, &FakeTerminal, hardware_client, options)
///     .await?;
/// # Ok(())
/// # }
/// ```
///
/// # Errors
///
/// Returns an error if tracing initialisation fails, the profile cannot be
/// loaded, device interaction fails, or output writing fails.
#[instrument(
    skip(command, out, terminal_client, hardware_client),
    level = "info",
    fields(command = %command_name(&command), log_level = ?options.log_level())
)]
pub async fn run_with_clients<W>(
    command: Command,
    out: &mut W,
    terminal_client: &dyn TerminalClient,
    hardware_client: Box<dyn HardwareClient>,
    options: RunOptions,
) -> Result<()>
where
    W: io::Write,
{
    telemetry::initialise_tracing(
        "macropad-oled",
        terminal_client.stderr_is_terminal(),
        options.log_level().map(LogLevel::as_level_filter),
    )?;

    let output_format = options.output_format();
    let (profile, source) =
        config::load_profile(options.config_path()).context("failed to load device profile")?;

    match command {
        Command::Info => {
            crate::cli::info::run(
                hardware_client,
                profile,
                &source,
                out,
                terminal_client,
                output_format,
            )
            .await
        }
        Command::Devices => {
            crate::cli::devices::run(
                hardware_client,
                Some(profile.identity()),
                out,
                terminal_client,
                output_format,
            )
            .await
        }
        Command::Query(args) => {
            crate::cli::query::run(hardware_client, profile, &args, out, output_format).await
        }
        Command::ScrollText(args) => {
            crate::cli::scroll_text::run(hardware_client, profile, &args, out, output_format)
                .await
        }
        Command::Control(action) => {
            crate::cli::control::run(hardware_client, profile, &action, out, output_format).await
        }
    }
}

fn command_name(command: &Command) -> &'static str {
    match command {
        Command::Info => "info",
        Command::Devices => "devices",
        Command::Query(_args) => "query",
        Command::ScrollText(_args) => "scroll-text",
        Command::Control(_action) => "control",
    }
}
