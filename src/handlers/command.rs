use std::fmt;

use crate::protocol::{self, ERASE_ALL_ROWS, Opcode, PIXEL_TERMINATOR, QueryKind, ScrollOp};

use super::brightness::Brightness;
use super::frame_codec::{Frame, FrameCodec, FrameCodecError};

/// A pixel position in device space.
///
/// Values are not range-checked; coordinates outside the panel are passed
/// through for the firmware to handle.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Default)]
pub struct PixelCoordinate {
    pub x: u8,
    pub y: u8,
}

impl PixelCoordinate {
    /// Creates a coordinate.
    #[must_use]
    pub const fn new(x: u8, y: u8) -> Self {
        Self { x, y }
    }
}

impl From<(u8, u8)> for PixelCoordinate {
    fn from((x, y): (u8, u8)) -> Self {
        Self { x, y }
    }
}

impl fmt::Display for PixelCoordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Value written to every pixel in one batch.
#[derive(Debug, Clone, Copy, Eq, PartialEq, derive_more::Display)]
pub enum PixelValue {
    #[display("off")]
    Off,
    #[display("on")]
    On,
}

impl PixelValue {
    fn as_flag_byte(self) -> u8 {
        match self {
            Self::Off => 0x00,
            Self::On => 0x01,
        }
    }
}

/// One device operation, independent of any transport.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum Command {
    /// Write raw text bytes to a row.
    WriteLine { row: u8, text: String },
    /// Set or clear a batch of pixels.
    SetPixelBatch {
        value: PixelValue,
        coordinates: Vec<PixelCoordinate>,
    },
    /// Erase one row.
    ClearRow { row: u8 },
    /// Erase the whole display.
    ClearAll,
    ScrollOff,
    ScrollOn,
    ScrollRight,
    ScrollLeft,
    /// Set hardware scroll speed. Device-defined, unchecked (nominally `0..=7`).
    ScrollSpeed { level: u8 },
    /// Restrict hardware scrolling to a row range. Device-defined, unchecked.
    ScrollArea { start: u8, end: u8 },
    SetBrightness(Brightness),
    /// Query or power sub-command.
    Query(QueryKind),
}

impl Command {
    /// Returns the opcode family of this command.
    #[must_use]
    pub fn opcode(&self) -> Opcode {
        match self {
            Self::WriteLine { .. } => Opcode::WriteLine,
            Self::SetPixelBatch { .. } => Opcode::PixelBatch,
            Self::ClearRow { .. } | Self::ClearAll => Opcode::Erase,
            Self::ScrollOff
            | Self::ScrollOn
            | Self::ScrollRight
            | Self::ScrollLeft
            | Self::ScrollSpeed { .. }
            | Self::ScrollArea { .. } => Opcode::Scroll,
            Self::SetBrightness(_) => Opcode::Brightness,
            Self::Query(_) => Opcode::Query,
        }
    }

    /// Returns the protocol bytes for this command, before framing.
    ///
    /// ```
    /// use macropad_oled::DeviceCommand;
    ///
    /// let command = DeviceCommand::WriteLine { row: 2, text: "Hi".into() };
    /// assert_eq!(vec![0x01, 0x02, b'H', b'i'], command.encode());
    /// ```
    #[must_use]
    pub fn encode(&self) -> Vec<u8> {
        let opcode = self.opcode().as_byte();
        match self {
            Self::WriteLine { row, text } => {
                let mut bytes = Vec::with_capacity(2 + text.len());
                bytes.extend_from_slice(&[opcode, *row]);
                bytes.extend_from_slice(text.as_bytes());
                bytes
            }
            Self::SetPixelBatch { value, coordinates } => {
                let mut bytes = Vec::with_capacity(3 + coordinates.len() * 2);
                bytes.extend_from_slice(&[opcode, value.as_flag_byte()]);
                for coordinate in coordinates {
                    bytes.extend_from_slice(&[coordinate.x, coordinate.y]);
                }
                bytes.push(PIXEL_TERMINATOR);
                bytes
            }
            Self::ClearRow { row } => vec![opcode, *row],
            Self::ClearAll => vec![opcode, ERASE_ALL_ROWS],
            Self::ScrollOff => vec![opcode, ScrollOp::Off.as_byte()],
            Self::ScrollOn => vec![opcode, ScrollOp::On.as_byte()],
            Self::ScrollRight => vec![opcode, ScrollOp::Right.as_byte()],
            Self::ScrollLeft => vec![opcode, ScrollOp::Left.as_byte()],
            Self::ScrollSpeed { level } => vec![opcode, ScrollOp::Speed.as_byte(), *level],
            Self::ScrollArea { start, end } => {
                vec![opcode, ScrollOp::Area.as_byte(), *start, *end]
            }
            Self::SetBrightness(brightness) => vec![opcode, brightness.value()],
            Self::Query(kind) => vec![opcode, protocol::query_metadata(*kind).sub_opcode()],
        }
    }

    /// Encodes this command into one report of `report_size` bytes.
    ///
    /// # Errors
    ///
    /// Returns [`FrameCodecError::FrameOverflow`] when the command is too long
    /// for one report.
    pub fn to_frame(&self, report_size: usize) -> Result<Frame, FrameCodecError> {
        FrameCodec::encode(&self.encode(), report_size)
    }
}
