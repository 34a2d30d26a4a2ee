mod brightness;
mod command;
mod frame_codec;
mod pixel_batcher;
mod pixels;
mod power;
mod query;
mod raw;
mod receipt;
mod scroll;
mod scroll_text;
mod text_line;

pub use self::brightness::{Brightness, BrightnessError, BrightnessHandler};
pub use self::command::{Command, PixelCoordinate, PixelValue};
pub use self::frame_codec::{Frame, FrameCodec, FrameCodecError};
pub use self::pixel_batcher::{MIN_REPORT_SIZE, PixelBatcher};
pub use self::pixels::{PixelError, PixelHandler, PixelOffset};
pub use self::power::{PowerHandler, ScreenPower};
pub use self::query::{DEFAULT_QUERY_TIMEOUT, QueryError, QueryReply, QuerySession};
pub use self::raw::RawHandler;
pub use self::receipt::UploadReceipt;
pub use self::scroll::{HardwareScroll, ScrollHandler};
pub use self::scroll_text::{
    DEFAULT_SCROLL_DELAY, ScrollDirection, ScrollFrames, ScrollOptions, ScrollReport, ScrollText,
    ScrollTextAnimator,
};
pub use self::text_line::LineHandler;
