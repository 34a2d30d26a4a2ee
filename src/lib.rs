mod app;
mod cli;
mod config;
mod error;
mod handlers;
mod hw;
mod media;
mod protocol;
mod telemetry;
mod terminal;
mod utils;

pub use app::{
    SessionHandler, fake_hardware_client, real_hardware_client, run, run_with_clients,
    run_with_options,
};
pub use cli::{
    Args, BrightnessArgs, ClearArgs, Command, ControlAction, Direction, FakeArgs, LineArgs,
    LogLevel, OutputFormat, PictureArgs, PixelState, PixelsArgs, PowerArgs, PowerState, QueryArgs,
    QueryTarget, RawArgs, RawBytes, RunOptions, ScrollAction, ScrollArgs, ScrollTextArgs,
};
pub use config::{
    Config, DEFAULT_PRODUCT_ID, DEFAULT_VENDOR_ID, ProfileSource, default_config_path,
    load_profile,
};
pub use error::{
    ConfigError, FixtureError, InteractionError, ProfileError, ProtocolError,
};
pub use handlers::{
    Brightness, BrightnessError, BrightnessHandler, Command as DeviceCommand, DEFAULT_QUERY_TIMEOUT,
    DEFAULT_SCROLL_DELAY, Frame, FrameCodec, FrameCodecError, HardwareScroll, LineHandler,
    MIN_REPORT_SIZE, PixelBatcher, PixelCoordinate, PixelError, PixelHandler, PixelOffset,
    PixelValue, PowerHandler, QueryError, QueryReply, QuerySession, RawHandler, ScreenPower,
    ScrollDirection, ScrollFrames, ScrollHandler, ScrollOptions, ScrollReport, ScrollText,
    ScrollTextAnimator, UploadReceipt,
};
pub use hw::{
    DEFAULT_COLUMNS, DEFAULT_REPORT_SIZE, DEFAULT_ROWS, DEFAULT_USAGE, DEFAULT_USAGE_PAGE,
    DeviceFixture, DeviceProfile, DeviceSession, FoundDevice, HardwareClient, HidIdentity,
    ReplyScript, WriteLog,
};
pub use media::{PixelImage, PixelImageError};
pub use protocol::{Opcode, QueryKind};
pub use terminal::TerminalClient;
