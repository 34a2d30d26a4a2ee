pub(crate) mod command;
pub(crate) mod control;
pub(crate) mod devices;
pub(crate) mod info;
pub(crate) mod query;
pub(crate) mod scroll_text;
pub(crate) mod ui;

pub use self::command::{Args, Command, FakeArgs, LogLevel, OutputFormat, RunOptions};
pub use self::control::{
    BrightnessArgs, ClearArgs, ControlAction, LineArgs, PictureArgs, PixelState, PixelsArgs,
    PowerArgs, PowerState, RawArgs, RawBytes, ScrollAction, ScrollArgs,
};
pub use self::query::{QueryArgs, QueryTarget};
pub use self::scroll_text::{Direction, ScrollTextArgs};
