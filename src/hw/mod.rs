mod fake_backend;
mod hardware;
#[cfg(feature = "hid")]
mod hid_backend;
mod model;
mod profile;
mod session;

pub(crate) use self::fake_backend::FakeBackendConfig;
#[cfg(test)]
pub(crate) use self::fake_backend::test_session;
pub use self::fake_backend::{DeviceFixture, ReplyScript, WriteLog};
pub use self::hardware::HardwareClient;
pub(crate) use self::hardware::{fake_hardware_client, real_hardware_client};
pub use self::model::{FoundDevice, HidIdentity};
pub use self::profile::{
    DEFAULT_COLUMNS, DEFAULT_REPORT_SIZE, DEFAULT_ROWS, DEFAULT_USAGE, DEFAULT_USAGE_PAGE,
    DeviceProfile,
};
pub use self::session::DeviceSession;
