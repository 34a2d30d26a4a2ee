use async_trait::async_trait;
use tracing::info;

use super::fake_backend::{FakeBackend, FakeBackendConfig};
use super::model::FoundDevice;
use super::profile::DeviceProfile;
use super::session::DeviceSession;
use crate::error::InteractionError;

/// Builds the hardware client for the real HID transport.
#[must_use]
pub(crate) fn real_hardware_client() -> Box<dyn HardwareClient> {
    Box::new(RealHardwareClient::default())
}

/// Builds a hardware client backed by fake fixtures.
#[must_use]
pub(crate) fn fake_hardware_client(config: FakeBackendConfig) -> Box<dyn HardwareClient> {
    info!("using fake HID backend");
    Box::new(FakeHardwareClient {
        backend: FakeBackend::new(config),
    })
}

#[async_trait]
pub trait HardwareClient: Send + Sync {
    /// Lists every visible HID interface.
    async fn enumerate(&self) -> Result<Vec<FoundDevice>, InteractionError>;

    /// Opens the first interface matching the profile identity.
    async fn open_first_device(
        self: Box<Self>,
        profile: DeviceProfile,
    ) -> Result<DeviceSession, InteractionError>;
}

#[derive(Debug, Default)]
struct RealHardwareClient {
    #[cfg(feature = "hid")]
    backend: super::hid_backend::HidBackend,
}

#[cfg(feature = "hid")]
#[async_trait]
impl HardwareClient for RealHardwareClient {
    async fn enumerate(&self) -> Result<Vec<FoundDevice>, InteractionError> {
        self.backend.enumerate()
    }

    async fn open_first_device(
        self: Box<Self>,
        profile: DeviceProfile,
    ) -> Result<DeviceSession, InteractionError> {
        let Self { backend } = *self;
        backend.open_first_matching_device(profile)
    }
}

#[cfg(not(feature = "hid"))]
#[async_trait]
impl HardwareClient for RealHardwareClient {
    async fn enumerate(&self) -> Result<Vec<FoundDevice>, InteractionError> {
        Err(InteractionError::BackendUnavailable)
    }

    async fn open_first_device(
        self: Box<Self>,
        _profile: DeviceProfile,
    ) -> Result<DeviceSession, InteractionError> {
        Err(InteractionError::BackendUnavailable)
    }
}

#[derive(Debug)]
struct FakeHardwareClient {
    backend: FakeBackend,
}

#[async_trait]
impl HardwareClient for FakeHardwareClient {
    async fn enumerate(&self) -> Result<Vec<FoundDevice>, InteractionError> {
        Ok(self.backend.devices().to_vec())
    }

    async fn open_first_device(
        self: Box<Self>,
        profile: DeviceProfile,
    ) -> Result<DeviceSession, InteractionError> {
        let Self { backend } = *self;
        backend.open_first_matching_device(profile)
    }
}
