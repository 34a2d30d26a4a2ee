use std::path::PathBuf;

use bon::Builder;
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use tracing::level_filters::LevelFilter;

use crate::cli::control::ControlAction;
use crate::cli::query::QueryArgs;
use crate::cli::scroll_text::ScrollTextArgs;
use crate::error::{CliConfigError, FixtureError};
use crate::hw::{DeviceFixture, FakeBackendConfig, ReplyScript, WriteLog};

const BACKEND_HELP: &str = "\
Talking to a real macropad needs the hidapi backend, which is opt-in because it \
links against the platform HID library (libudev on Linux). Build with \
`cargo build --features hid`; without it only `--fake` runs reach a device.";

/// Command-line options for the macropad OLED tool.
#[derive(Debug, Parser)]
#[command(
    name = "macropad-oled",
    about = "Drive the OLED of a QMK macropad over raw HID.",
    after_long_help = BACKEND_HELP
)]
pub struct Args {
    /// Device profile file. Defaults to `config.toml` in the user config directory.
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Log level, overriding `RUST_LOG`.
    #[arg(long, global = true, value_enum)]
    log_level: Option<LogLevel>,
    /// Output format. Defaults to `pretty` on a terminal and `json` otherwise.
    #[arg(long, global = true, value_enum)]
    output: Option<OutputFormat>,
    /// Uses the fake HID backend with fixture-driven enumeration and replies.
    #[arg(long, global = true)]
    fake: bool,
    /// Fake HID interfaces in the form `path|vid|pid|usage_page|usage[|manufacturer|product];...`.
    #[arg(long, global = true, requires = "fake", required_if_eq("fake", "true"))]
    fake_devices: Option<DeviceFixture>,
    /// Fake read replies as comma-separated hexadecimal payloads (`-` for an empty reply).
    #[arg(long, global = true, requires = "fake")]
    fake_replies: Option<ReplyScript>,
    /// Zero-based index of a fake report write that fails.
    #[arg(long, global = true, requires = "fake")]
    fake_fail_write: Option<usize>,
    #[arg(skip)]
    fake_write_log: Option<WriteLog>,
    #[command(subcommand)]
    command: Command,
}

impl Args {
    /// Creates argument values directly without CLI parsing.
    ///
    /// ```
    /// use macropad_oled::{Args, Command};
    ///
    /// let args = Args::new(Command::Devices);
    /// assert_eq!(None, args.log_level());
    /// ```
    #[must_use]
    pub fn new(command: Command) -> Self {
        Self {
            config: None,
            log_level: None,
            output: None,
            fake: false,
            fake_devices: None,
            fake_replies: None,
            fake_fail_write: None,
            fake_write_log: None,
            command,
        }
    }

    /// Enables fake backend mode with pre-parsed fake configuration.
    #[must_use]
    pub fn with_fake(mut self, fake: FakeArgs) -> Self {
        let FakeArgs {
            devices,
            replies,
            write_log,
            fail_write_at,
        } = fake;

        self.fake = true;
        self.fake_devices = Some(devices);
        self.fake_replies = replies;
        self.fake_write_log = write_log;
        self.fake_fail_write = fail_write_at;
        self
    }

    /// Selects the device profile file.
    #[must_use]
    pub fn with_config(mut self, path: impl Into<PathBuf>) -> Self {
        self.config = Some(path.into());
        self
    }

    /// Selects the output format.
    #[must_use]
    pub fn with_output(mut self, output: OutputFormat) -> Self {
        self.output = Some(output);
        self
    }

    /// Returns the explicit log level, if any.
    #[must_use]
    pub fn log_level(&self) -> Option<LogLevel> {
        self.log_level
    }

    /// Returns the explicit output format, if any.
    #[must_use]
    pub fn output_format(&self) -> Option<OutputFormat> {
        self.output
    }

    /// Collects the run settings, falling back to `default_output` when no
    /// `--output` was given.
    #[must_use]
    pub fn run_options(&self, default_output: OutputFormat) -> RunOptions {
        RunOptions::builder()
            .maybe_config_path(self.config.clone())
            .maybe_log_level(self.log_level)
            .output_format(self.output.unwrap_or(default_output))
            .build()
    }

    /// Splits parsed CLI arguments into command and optional fake-client settings.
    ///
    /// # Errors
    ///
    /// Returns an error if CLI backend configuration is invalid.
    pub fn into_command_and_fake_args(self) -> anyhow::Result<(Command, Option<FakeArgs>)> {
        let Args {
            fake,
            fake_devices,
            fake_replies,
            fake_fail_write,
            fake_write_log,
            command,
            ..
        } = self;

        let fake_args = if fake {
            let Some(devices) = fake_devices else {
                return Err(CliConfigError::MissingFakeDeviceFixture.into());
            };
            Some(FakeArgs {
                devices,
                replies: fake_replies,
                write_log: fake_write_log,
                fail_write_at: fake_fail_write,
            })
        } else {
            None
        };

        Ok((command, fake_args))
    }
}

/// Fake backend arguments for programmatic runs.
///
/// ```
/// use macropad_oled::{FakeArgs, WriteLog};
///
/// let log = WriteLog::default();
/// let fake = FakeArgs::builder()
///     .devices("hid-0|FEED|0000|FF60|61")?
///     .replies("0500")?
///     .write_log(log.clone())
///     .build();
/// let _ = fake;
/// # Ok::<(), macropad_oled::FixtureError>(())
/// ```
#[derive(Debug, Builder)]
pub struct FakeArgs {
    #[builder(with = |value: &str| -> std::result::Result<_, FixtureError> { value.parse() })]
    devices: DeviceFixture,
    #[builder(with = |value: &str| -> std::result::Result<_, FixtureError> { value.parse() })]
    replies: Option<ReplyScript>,
    /// Receives a copy of every written report.
    write_log: Option<WriteLog>,
    fail_write_at: Option<usize>,
}

impl FakeArgs {
    pub(crate) fn into_backend_config(self) -> FakeBackendConfig {
        let Self {
            devices,
            replies,
            write_log,
            fail_write_at,
        } = self;

        FakeBackendConfig::builder()
            .device_fixture(devices)
            .maybe_replies(replies)
            .maybe_write_log(write_log)
            .maybe_fail_write_at(fail_write_at)
            .build()
    }
}

/// Settings that apply to every command.
#[derive(Debug, Clone, Default, Builder)]
pub struct RunOptions {
    config_path: Option<PathBuf>,
    log_level: Option<LogLevel>,
    #[builder(default)]
    output_format: OutputFormat,
}

impl RunOptions {
    /// Returns the explicit profile file, if any.
    #[must_use]
    pub fn config_path(&self) -> Option<&std::path::Path> {
        self.config_path.as_deref()
    }

    /// Returns the log-level override, if any.
    #[must_use]
    pub fn log_level(&self) -> Option<LogLevel> {
        self.log_level
    }

    /// Returns the output format.
    #[must_use]
    pub fn output_format(&self) -> OutputFormat {
        self.output_format
    }
}

/// Log verbosity accepted by `--log-level`.
#[derive(Debug, Clone, Copy, Eq, PartialEq, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub(crate) fn as_level_filter(self) -> LevelFilter {
        match self {
            Self::Error => LevelFilter::ERROR,
            Self::Warn => LevelFilter::WARN,
            Self::Info => LevelFilter::INFO,
            Self::Debug => LevelFilter::DEBUG,
            Self::Trace => LevelFilter::TRACE,
        }
    }
}

/// How command results are printed.
#[derive(Debug, Clone, Copy, Default, Eq, PartialEq, ValueEnum, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    /// Human-readable lines and tables.
    #[default]
    Pretty,
    /// One JSON document per result.
    Json,
}

/// Supported CLI commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Open the configured device and print its strings and profile.
    Info,
    /// List every visible HID interface.
    Devices,
    /// Query device state and print the decoded reply.
    Query(QueryArgs),
    /// Scroll text across one line until the pass ends or Ctrl+C.
    ScrollText(ScrollTextArgs),
    #[command(flatten)]
    Control(ControlAction),
}
