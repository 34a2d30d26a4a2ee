use std::time::Duration;

use async_trait::async_trait;
use hidapi::{DeviceInfo, HidApi, HidDevice, HidError};
use tracing::{debug, info, instrument};

use super::model::{FoundDevice, HidIdentity};
use super::profile::DeviceProfile;
use super::session::{DeviceSession, ReportChannel};
use crate::error::InteractionError;

/// Real HID backend built on `hidapi`.
#[derive(Debug, Default)]
pub(crate) struct HidBackend;

impl HidBackend {
    #[instrument(skip(self), level = "debug")]
    pub(crate) fn enumerate(&self) -> Result<Vec<FoundDevice>, InteractionError> {
        let api = HidApi::new().map_err(enumeration_error)?;
        Ok(api.device_list().map(found_device).collect())
    }

    /// Opens the first enumerated interface matching the profile identity.
    #[instrument(skip(self), level = "debug", fields(identity = %profile.identity()))]
    pub(crate) fn open_first_matching_device(
        self,
        profile: DeviceProfile,
    ) -> Result<DeviceSession, InteractionError> {
        let identity = profile.identity();
        let api = HidApi::new().map_err(enumeration_error)?;
        let info = api
            .device_list()
            .find(|info| identity_of(info) == identity)
            .ok_or(InteractionError::DeviceNotFound { identity })?;

        let device = found_device(info);
        let handle = info
            .open_device(&api)
            .map_err(|error| InteractionError::Enumeration {
                reason: error.to_string(),
            })?;
        info!(path = device.path(), "opened HID interface");

        Ok(DeviceSession::new(
            device,
            profile,
            Box::new(HidChannel { device: handle }),
        ))
    }
}

/// Open `hidapi` handle; the device closes when this is dropped.
struct HidChannel {
    device: HidDevice,
}

impl std::fmt::Debug for HidChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HidChannel").finish_non_exhaustive()
    }
}

#[async_trait]
impl ReportChannel for HidChannel {
    async fn write_report(&mut self, report: &[u8]) -> Result<usize, InteractionError> {
        // hidapi treats byte 0 as the report id; the frame header is that byte.
        self.device
            .write(report)
            .map_err(|error| InteractionError::WriteFailed {
                reason: error.to_string(),
            })
    }

    async fn read_report(
        &mut self,
        max_len: usize,
        timeout: Duration,
    ) -> Result<Vec<u8>, InteractionError> {
        let timeout_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX);
        let mut buffer = vec![0; max_len];
        let read = self
            .device
            .read_timeout(&mut buffer, i32::try_from(timeout_ms).unwrap_or(i32::MAX))
            .map_err(|error| InteractionError::ReadFailed {
                reason: error.to_string(),
            })?;
        if read == 0 {
            return Err(InteractionError::ReadTimeout { timeout_ms });
        }
        buffer.truncate(read);
        Ok(buffer)
    }

    async fn close(self: Box<Self>) -> Result<(), InteractionError> {
        debug!("closing HID interface");
        drop(self);
        Ok(())
    }
}

fn identity_of(info: &DeviceInfo) -> HidIdentity {
    HidIdentity::new(
        info.vendor_id(),
        info.product_id(),
        info.usage_page(),
        info.usage(),
    )
}

fn found_device(info: &DeviceInfo) -> FoundDevice {
    FoundDevice::new(info.path().to_string_lossy().into_owned(), identity_of(info)).with_strings(
        info.manufacturer_string().map(str::to_string),
        info.product_string().map(str::to_string),
    )
}

fn enumeration_error(error: HidError) -> InteractionError {
    InteractionError::Enumeration {
        reason: error.to_string(),
    }
}
