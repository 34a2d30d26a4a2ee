use serde_with::SerializeDisplay;
use strum_macros::{Display, EnumIter};

/// Channel header byte prefixed to every report.
pub(crate) const REPORT_ID: u8 = 0x00;

/// Marks the end of the coordinate list in a pixel-batch command.
pub(crate) const PIXEL_TERMINATOR: u8 = 0xFF;

/// Erase operand selecting every row instead of one.
pub(crate) const ERASE_ALL_ROWS: u8 = 0x08;

/// Command selector written as the first protocol byte after the header.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, EnumIter, Display)]
pub enum Opcode {
    #[strum(to_string = "write_line")]
    WriteLine,
    #[strum(to_string = "pixel_batch")]
    PixelBatch,
    #[strum(to_string = "scroll")]
    Scroll,
    #[strum(to_string = "brightness")]
    Brightness,
    #[strum(to_string = "query")]
    Query,
    #[strum(to_string = "erase")]
    Erase,
}

impl Opcode {
    /// Returns the wire byte for this opcode.
    #[must_use]
    pub const fn as_byte(self) -> u8 {
        match self {
            Self::WriteLine => 0x01,
            Self::PixelBatch => 0x02,
            Self::Scroll => 0x03,
            Self::Brightness => 0x04,
            Self::Query => 0x05,
            Self::Erase => 0x08,
        }
    }
}

/// Sub-opcodes of the scroll command family.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, EnumIter, Display)]
pub(crate) enum ScrollOp {
    #[strum(to_string = "off")]
    Off,
    #[strum(to_string = "on")]
    On,
    #[strum(to_string = "right")]
    Right,
    #[strum(to_string = "left")]
    Left,
    #[strum(to_string = "speed")]
    Speed,
    #[strum(to_string = "area")]
    Area,
}

impl ScrollOp {
    pub(crate) const fn as_byte(self) -> u8 {
        match self {
            Self::Off => 0x01,
            Self::On => 0x02,
            Self::Right => 0x03,
            Self::Left => 0x04,
            Self::Speed => 0x05,
            Self::Area => 0x06,
        }
    }
}

/// Sub-opcodes of the query command family.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, EnumIter, Display, SerializeDisplay)]
pub enum QueryKind {
    /// Whether the OLED is currently on.
    #[strum(to_string = "oled_state")]
    OledState,
    /// Turn the OLED on. The device does not reply.
    #[strum(to_string = "oled_on")]
    OledOn,
    /// Turn the OLED off. The device does not reply.
    #[strum(to_string = "oled_off")]
    OledOff,
    /// Highest active keyboard layer.
    #[strum(to_string = "layer")]
    Layer,
    /// Current OLED brightness.
    #[strum(to_string = "brightness")]
    Brightness,
    /// Characters that fit on one line.
    #[strum(to_string = "max_chars")]
    MaxChars,
    /// Lines that fit on the display.
    #[strum(to_string = "max_lines")]
    MaxLines,
}

/// Descriptive metadata for one query sub-opcode.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub(crate) struct QueryMetadata {
    sub_opcode: u8,
    description: &'static str,
    expects_reply: bool,
}

impl QueryMetadata {
    /// Wire byte following the query opcode.
    pub(crate) fn sub_opcode(self) -> u8 {
        self.sub_opcode
    }

    /// Human-readable meaning of the reply.
    pub(crate) fn description(self) -> &'static str {
        self.description
    }

    /// Whether the firmware answers this query with a report.
    pub(crate) fn expects_reply(self) -> bool {
        self.expects_reply
    }
}

/// Returns metadata for one query kind.
pub(crate) const fn query_metadata(kind: QueryKind) -> QueryMetadata {
    match kind {
        QueryKind::OledState => QueryMetadata {
            sub_opcode: 0x01,
            description: "OLED power state",
            expects_reply: true,
        },
        QueryKind::OledOn => QueryMetadata {
            sub_opcode: 0x02,
            description: "turn OLED on",
            expects_reply: false,
        },
        QueryKind::OledOff => QueryMetadata {
            sub_opcode: 0x03,
            description: "turn OLED off",
            expects_reply: false,
        },
        QueryKind::Layer => QueryMetadata {
            sub_opcode: 0x04,
            description: "highest active layer",
            expects_reply: true,
        },
        QueryKind::Brightness => QueryMetadata {
            sub_opcode: 0x05,
            description: "OLED brightness",
            expects_reply: true,
        },
        QueryKind::MaxChars => QueryMetadata {
            sub_opcode: 0x06,
            description: "characters per line",
            expects_reply: true,
        },
        QueryKind::MaxLines => QueryMetadata {
            sub_opcode: 0x07,
            description: "lines per display",
            expects_reply: true,
        },
    }
}
