use derive_more::From;
use thiserror::Error;

use crate::handlers::{BrightnessError, FrameCodecError, PixelError, QueryError};
use crate::hw::HidIdentity;

/// Errors returned by HID device interaction.
#[derive(Debug, Error)]
pub enum InteractionError {
    #[error("no HID interface matching {identity} was found; is the device plugged in?")]
    DeviceNotFound { identity: HidIdentity },
    #[error("failed to write report to the device: {reason}")]
    WriteFailed { reason: String },
    #[error("short report write: {written} of {expected} bytes accepted")]
    ShortWrite { expected: usize, written: usize },
    #[error("report read timed out after {timeout_ms}ms")]
    ReadTimeout { timeout_ms: u64 },
    #[error("failed to read report from the device: {reason}")]
    ReadFailed { reason: String },
    #[error("failed to enumerate HID devices: {reason}")]
    Enumeration { reason: String },
    #[error("this build has no HID backend; rebuild with `--features hid` or pass --fake")]
    BackendUnavailable,
    #[error("failed while waiting for Ctrl+C")]
    CtrlC { source: std::io::Error },
    #[error(transparent)]
    Fixture(#[from] FixtureError),
}

/// Errors returned when parsing fake backend fixtures.
#[derive(Debug, Error)]
pub enum FixtureError {
    #[error("the fake device fixture is empty")]
    EmptyFixture,
    #[error("device fixture records must contain five or seven pipe-delimited fields")]
    InvalidRecordFieldCount,
    #[error("device fixture records cannot contain empty mandatory fields")]
    EmptyRecordField,
    #[error("invalid hexadecimal identifier `{value}`")]
    InvalidIdentifier { value: String },
    #[error("reply payload is not valid hexadecimal")]
    InvalidHex(#[from] hex::FromHexError),
}

/// Errors returned while resolving the device profile.
#[derive(Debug, Error)]
pub enum ProfileError {
    #[error(transparent)]
    ReportSize(#[from] FrameCodecError),
    #[error("device profile field `{field}` must be non-zero")]
    ZeroDimension { field: &'static str },
    #[error(
        "{columns} text columns need {needed}-byte reports to write a full line, \
         but the report size is {report_size}"
    )]
    LineTooWide {
        columns: usize,
        needed: usize,
        report_size: usize,
    },
}

/// Errors returned while loading the configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read configuration file `{path}`")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("failed to parse configuration file `{path}`")]
    Parse {
        path: String,
        source: Box<toml::de::Error>,
    },
    #[error("invalid device profile in `{path}`")]
    Profile { path: String, source: ProfileError },
}

/// Errors returned when validating runtime backend options.
#[derive(Debug, Error)]
pub(crate) enum CliConfigError {
    #[error("missing fake device fixture while fake mode is enabled")]
    MissingFakeDeviceFixture,
}

/// Errors returned by telemetry initialisation.
#[derive(Debug, Error)]
pub(crate) enum TelemetryError {
    #[error("failed to install tracing subscriber")]
    Subscriber(#[from] tracing_subscriber::util::TryInitError),
}

/// Top-level protocol errors wrapping module-specific error types.
#[derive(Debug, Error, From)]
pub enum ProtocolError {
    #[error(transparent)]
    #[from(FrameCodecError, Box<FrameCodecError>)]
    FrameCodec(Box<FrameCodecError>),
    #[error(transparent)]
    #[from(BrightnessError, Box<BrightnessError>)]
    Brightness(Box<BrightnessError>),
    #[error(transparent)]
    #[from(PixelError, Box<PixelError>)]
    Pixel(Box<PixelError>),
    #[error(transparent)]
    #[from(QueryError, Box<QueryError>)]
    Query(Box<QueryError>),
    #[error(transparent)]
    #[from(InteractionError, Box<InteractionError>)]
    Interaction(Box<InteractionError>),
}
