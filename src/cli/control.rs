use std::io;
use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{Context, Result};
use clap::{Args, Subcommand, ValueEnum};
use serde::Serialize;
use tracing::instrument;

use crate::cli::OutputFormat;
use crate::hw::{DeviceProfile, DeviceSession, HardwareClient};
use crate::media::PixelImage;
use crate::{
    Brightness, BrightnessHandler, HardwareScroll, LineHandler, PixelCoordinate, PixelHandler,
    PixelOffset, PixelValue, PowerHandler, RawHandler, ScreenPower, ScrollHandler, SessionHandler,
    UploadReceipt,
};

/// JSON result emitted by a display command.
#[derive(Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
enum ControlResult {
    Line {
        row: u8,
        text: String,
        bytes_written: usize,
        frames_written: usize,
    },
    Clear {
        row: Option<u8>,
    },
    Pixels {
        value: String,
        pixels: usize,
        bytes_written: usize,
        frames_written: usize,
    },
    Picture {
        path: String,
        pixels: usize,
        bytes_written: usize,
        frames_written: usize,
    },
    Brightness {
        value: u8,
    },
    Scroll {
        mode: String,
    },
    ScrollSpeed {
        level: u8,
    },
    ScrollArea {
        start: u8,
        end: u8,
    },
    Power {
        state: String,
    },
    Raw {
        bytes_written: usize,
    },
}

/// Commands that change what the display shows.
#[derive(Debug, Subcommand)]
pub enum ControlAction {
    /// Erase a row, then write text to it.
    Line(LineArgs),
    /// Erase one row, or every row when `--row` is omitted.
    Clear(ClearArgs),
    /// Set or clear individual pixels.
    Pixels(PixelsArgs),
    /// Draw a text bitmap where `1` marks an on-pixel.
    Picture(PictureArgs),
    /// Set OLED brightness (0..=255).
    Brightness(BrightnessArgs),
    /// Control the display controller's hardware scroll.
    Scroll(ScrollArgs),
    /// Turn the screen on or off.
    Power(PowerArgs),
    /// Send caller-assembled protocol bytes as one report.
    Raw(RawArgs),
}

/// Arguments for `line`.
#[derive(Debug, Args)]
pub struct LineArgs {
    /// Zero-based text row.
    row: u8,
    /// Text to write; it must fit one report.
    text: String,
}

impl LineArgs {
    /// Creates line-write arguments.
    ///
    /// ```
    /// use macropad_oled::LineArgs;
    ///
    /// let args = LineArgs::new(0, "Hi");
    /// let _ = args;
    /// ```
    #[must_use]
    pub fn new(row: u8, text: impl Into<String>) -> Self {
        Self {
            row,
            text: text.into(),
        }
    }
}

/// Arguments for `clear`.
#[derive(Debug, Args)]
pub struct ClearArgs {
    /// Row to erase.
    #[arg(long)]
    row: Option<u8>,
}

/// Arguments for `pixels`.
#[derive(Debug, Args)]
pub struct PixelsArgs {
    #[arg(value_enum)]
    value: PixelState,
    /// Coordinates as `x,y`.
    #[arg(required = true, value_parser = parse_coordinate)]
    coordinates: Vec<PixelCoordinate>,
    /// Added to every coordinate, as `dx,dy`.
    #[arg(long, value_parser = parse_offset, default_value = "0,0")]
    offset: PixelOffset,
}

/// Pixel value selected on the command line.
#[derive(Debug, Clone, Copy, Eq, PartialEq, ValueEnum)]
pub enum PixelState {
    Off,
    On,
}

impl PixelState {
    fn to_pixel_value(self) -> PixelValue {
        match self {
            Self::Off => PixelValue::Off,
            Self::On => PixelValue::On,
        }
    }
}

/// Arguments for `picture`.
#[derive(Debug, Args)]
pub struct PictureArgs {
    /// Text bitmap file.
    file: PathBuf,
    /// Top-left position of the picture, as `x,y`.
    #[arg(long, value_parser = parse_offset, default_value = "0,0")]
    origin: PixelOffset,
}

/// Arguments for `brightness`.
#[derive(Debug, Args)]
pub struct BrightnessArgs {
    #[arg(value_parser = parse_brightness, allow_negative_numbers = true)]
    brightness: Brightness,
}

impl BrightnessArgs {
    /// Creates brightness arguments.
    ///
    /// # Errors
    ///
    /// Returns an error when `value` is outside `0..=255`.
    pub fn new(value: i32) -> Result<Self, crate::BrightnessError> {
        let brightness = Brightness::new(value)?;
        Ok(Self { brightness })
    }
}

/// Arguments for `scroll`.
#[derive(Debug, Args)]
pub struct ScrollArgs {
    #[command(subcommand)]
    action: ScrollAction,
}

/// Hardware scroll operation.
#[derive(Debug, Clone, Copy, Subcommand)]
pub enum ScrollAction {
    /// Stop scrolling.
    Off,
    /// Start scrolling.
    On,
    /// Scroll towards the right.
    Right,
    /// Scroll towards the left.
    Left,
    /// Set the scroll speed level (nominally 0..=7, unchecked).
    Speed { level: u8 },
    /// Limit scrolling to a range of display pages (unchecked).
    Area { start: u8, end: u8 },
}

/// Arguments for `power`.
#[derive(Debug, Args)]
pub struct PowerArgs {
    #[arg(value_enum)]
    state: PowerState,
}

impl PowerArgs {
    /// Creates power arguments.
    #[must_use]
    pub fn new(state: PowerState) -> Self {
        Self { state }
    }
}

/// Requested power state.
#[derive(Debug, Clone, Copy, Eq, PartialEq, ValueEnum, derive_more::Display)]
pub enum PowerState {
    /// Turn the screen off.
    #[display("off")]
    Off,
    /// Turn the screen on.
    #[display("on")]
    On,
}

impl PowerState {
    fn to_handler_power(self) -> ScreenPower {
        match self {
            Self::Off => ScreenPower::Off,
            Self::On => ScreenPower::On,
        }
    }
}

/// Arguments for `raw`.
#[derive(Debug, Args)]
pub struct RawArgs {
    /// Command bytes as hexadecimal, without the report header.
    bytes: RawBytes,
}

/// Hexadecimal byte string parsed from the command line.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct RawBytes(Vec<u8>);

impl FromStr for RawBytes {
    type Err = hex::FromHexError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let compact: String = value.split_whitespace().collect();
        hex::decode(compact).map(Self)
    }
}

fn parse_pair(value: &str) -> Result<(u8, u8), String> {
    let Some((x, y)) = value.split_once(',') else {
        return Err(format!("expected `x,y`, got `{value}`"));
    };
    let x = x.trim().parse::<u8>().map_err(|error| error.to_string())?;
    let y = y.trim().parse::<u8>().map_err(|error| error.to_string())?;
    Ok((x, y))
}

fn parse_coordinate(value: &str) -> Result<PixelCoordinate, String> {
    parse_pair(value).map(PixelCoordinate::from)
}

fn parse_offset(value: &str) -> Result<PixelOffset, String> {
    parse_pair(value).map(PixelOffset::from)
}

fn parse_brightness(value: &str) -> Result<Brightness, String> {
    let parsed = value.parse::<i32>().map_err(|error| error.to_string())?;
    Brightness::new(parsed).map_err(|error| error.to_string())
}

/// Executes one display command.
#[instrument(skip(client, action, out), level = "info", fields(?action, ?output_format))]
pub(crate) async fn run<W>(
    client: Box<dyn HardwareClient>,
    profile: DeviceProfile,
    action: &ControlAction,
    out: &mut W,
    output_format: OutputFormat,
) -> Result<()>
where
    W: io::Write,
{
    let mut session = SessionHandler::new(client, profile).connect_first().await?;

    let command_result = run_with_session(&mut session, action, out, output_format).await;
    let close_result = session.close().await;

    if let Err(error) = close_result {
        if command_result.is_ok() {
            return Err(error.into());
        }
        tracing::trace!(?error, "failed to close session cleanly");
    }

    command_result
}

#[instrument(skip(session, action, out), level = "debug", fields(?output_format))]
async fn run_with_session<W>(
    session: &mut DeviceSession,
    action: &ControlAction,
    out: &mut W,
    output_format: OutputFormat,
) -> Result<()>
where
    W: io::Write,
{
    let (pretty, result) = match action {
        ControlAction::Line(args) => {
            let receipt = LineHandler::write_line(session, args.row, &args.text).await?;
            (
                format!(
                    "Wrote row {}: {} bytes in {} report(s)",
                    args.row,
                    receipt.bytes_written(),
                    receipt.frames_written()
                ),
                ControlResult::Line {
                    row: args.row,
                    text: args.text.clone(),
                    bytes_written: receipt.bytes_written(),
                    frames_written: receipt.frames_written(),
                },
            )
        }
        ControlAction::Clear(args) => {
            let pretty = match args.row {
                Some(row) => {
                    LineHandler::clear_row(session, row).await?;
                    format!("Cleared row {row}")
                }
                None => {
                    LineHandler::clear_all(session).await?;
                    "Cleared all rows".to_string()
                }
            };
            (pretty, ControlResult::Clear { row: args.row })
        }
        ControlAction::Pixels(args) => {
            let value = args.value.to_pixel_value();
            let receipt =
                PixelHandler::set_pixels(session, &args.coordinates, value, args.offset).await?;
            (
                pixel_summary(&format!("Set {} pixel(s) {value}", args.coordinates.len()), receipt),
                ControlResult::Pixels {
                    value: value.to_string(),
                    pixels: args.coordinates.len(),
                    bytes_written: receipt.bytes_written(),
                    frames_written: receipt.frames_written(),
                },
            )
        }
        ControlAction::Picture(args) => {
            let image = PixelImage::read(&args.file)
                .with_context(|| format!("failed to load picture `{}`", args.file.display()))?;
            let pixels = image.on_pixels().len();
            let receipt = PixelHandler::draw_picture(session, &image, args.origin).await?;
            (
                pixel_summary(&format!("Drew {pixels} pixel(s)"), receipt),
                ControlResult::Picture {
                    path: args.file.display().to_string(),
                    pixels,
                    bytes_written: receipt.bytes_written(),
                    frames_written: receipt.frames_written(),
                },
            )
        }
        ControlAction::Brightness(args) => {
            BrightnessHandler::set_brightness(session, args.brightness).await?;
            let value = args.brightness.value();
            (
                format!("Applied brightness: {value}"),
                ControlResult::Brightness { value },
            )
        }
        ControlAction::Scroll(args) => run_scroll(session, args.action).await?,
        ControlAction::Power(args) => {
            PowerHandler::set_power(session, args.state.to_handler_power()).await?;
            (
                format!("Applied power state: {}", args.state),
                ControlResult::Power {
                    state: args.state.to_string(),
                },
            )
        }
        ControlAction::Raw(args) => {
            let bytes_written = RawHandler::send_raw(session, &args.bytes.0).await?;
            (
                format!("Sent raw report: {bytes_written} bytes"),
                ControlResult::Raw { bytes_written },
            )
        }
    };

    match output_format {
        OutputFormat::Pretty => writeln!(out, "{pretty}")?,
        OutputFormat::Json => write_json_line(out, &result)?,
    }

    Ok(())
}

async fn run_scroll(
    session: &mut DeviceSession,
    action: ScrollAction,
) -> Result<(String, ControlResult)> {
    let scroll = match action {
        ScrollAction::Off => HardwareScroll::Off,
        ScrollAction::On => HardwareScroll::On,
        ScrollAction::Right => HardwareScroll::Right,
        ScrollAction::Left => HardwareScroll::Left,
        ScrollAction::Speed { level } => {
            ScrollHandler::set_speed(session, level).await?;
            return Ok((
                format!("Applied scroll speed: {level}"),
                ControlResult::ScrollSpeed { level },
            ));
        }
        ScrollAction::Area { start, end } => {
            ScrollHandler::set_area(session, start, end).await?;
            return Ok((
                format!("Applied scroll area: {start}..{end}"),
                ControlResult::ScrollArea { start, end },
            ));
        }
    };

    ScrollHandler::set_scroll(session, scroll).await?;
    Ok((
        format!("Applied hardware scroll: {scroll}"),
        ControlResult::Scroll {
            mode: scroll.to_string(),
        },
    ))
}

fn pixel_summary(prefix: &str, receipt: UploadReceipt) -> String {
    format!(
        "{prefix}: {} bytes in {} report(s)",
        receipt.bytes_written(),
        receipt.frames_written()
    )
}

pub(crate) fn write_json_line(out: &mut impl io::Write, value: &impl Serialize) -> Result<()> {
    serde_json::to_writer_pretty(&mut *out, value)?;
    writeln!(out)?;
    Ok(())
}
