use std::collections::VecDeque;
use std::str::FromStr;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use bon::Builder;
use tracing::debug;

use super::model::{FoundDevice, HidIdentity, first_matching};
use super::profile::DeviceProfile;
use super::session::{DeviceSession, ReportChannel};
use crate::error::{FixtureError, InteractionError};

/// Parsed fake enumeration fixture records.
///
/// Records are `;`-separated, each `path|vid|pid|usage_page|usage` with an
/// optional trailing `|manufacturer|product`. Identifiers are hexadecimal,
/// with or without a `0x` prefix.
#[derive(Debug, Clone, derive_more::Into)]
pub struct DeviceFixture {
    devices: Vec<FoundDevice>,
}

impl FromStr for DeviceFixture {
    type Err = FixtureError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let devices = parse_device_fixture(value)?;
        Ok(Self { devices })
    }
}

/// Scripted replies handed out by fake reads, in order.
///
/// Replies are comma-separated hexadecimal payloads; `-` is an empty reply.
#[derive(Debug, Clone, Default, derive_more::Into)]
pub struct ReplyScript {
    replies: Vec<Vec<u8>>,
}

impl FromStr for ReplyScript {
    type Err = FixtureError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let replies = parse_replies(value)?;
        Ok(Self { replies })
    }
}

/// Shared record of every report written to a fake device.
#[derive(Debug, Clone, Default)]
pub struct WriteLog {
    reports: Arc<Mutex<Vec<Vec<u8>>>>,
}

impl WriteLog {
    /// Returns a copy of the reports written so far.
    #[must_use]
    pub fn reports(&self) -> Vec<Vec<u8>> {
        self.lock().clone()
    }

    /// Returns how many reports were written.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Returns whether nothing was written.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn push(&self, report: &[u8]) {
        self.lock().push(report.to_vec());
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<Vec<u8>>> {
        self.reports.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Settings for constructing a fake hardware backend.
#[derive(Debug, Builder)]
pub(crate) struct FakeBackendConfig {
    device_fixture: DeviceFixture,
    #[builder(default)]
    replies: ReplyScript,
    #[builder(default)]
    write_log: WriteLog,
    /// Zero-based index of the write that fails.
    fail_write_at: Option<usize>,
}

/// Fake backend used in tests and non-hardware environments.
#[derive(Debug)]
pub(crate) struct FakeBackend {
    devices: Vec<FoundDevice>,
    replies: VecDeque<Vec<u8>>,
    write_log: WriteLog,
    fail_write_at: Option<usize>,
}

impl FakeBackend {
    pub(crate) fn new(config: FakeBackendConfig) -> Self {
        let replies: Vec<Vec<u8>> = config.replies.into();
        Self {
            devices: config.device_fixture.into(),
            replies: replies.into(),
            write_log: config.write_log,
            fail_write_at: config.fail_write_at,
        }
    }

    pub(crate) fn devices(&self) -> &[FoundDevice] {
        &self.devices
    }

    pub(crate) fn open_first_matching_device(
        self,
        profile: DeviceProfile,
    ) -> Result<DeviceSession, InteractionError> {
        let Self {
            devices,
            replies,
            write_log,
            fail_write_at,
        } = self;
        let identity = profile.identity();
        let device = first_matching(devices, &identity)
            .ok_or(InteractionError::DeviceNotFound { identity })?;
        debug!(path = device.path(), "opened fake device");

        let channel = FakeChannel {
            replies,
            write_log,
            fail_write_at,
            writes_attempted: 0,
        };
        Ok(DeviceSession::new(device, profile, Box::new(channel)))
    }
}

#[derive(Debug)]
struct FakeChannel {
    replies: VecDeque<Vec<u8>>,
    write_log: WriteLog,
    fail_write_at: Option<usize>,
    writes_attempted: usize,
}

#[async_trait]
impl ReportChannel for FakeChannel {
    async fn write_report(&mut self, report: &[u8]) -> Result<usize, InteractionError> {
        let index = self.writes_attempted;
        self.writes_attempted += 1;
        if self.fail_write_at == Some(index) {
            return Err(InteractionError::WriteFailed {
                reason: format!("fake write {index} rejected"),
            });
        }
        self.write_log.push(report);
        Ok(report.len())
    }

    async fn read_report(
        &mut self,
        max_len: usize,
        timeout: Duration,
    ) -> Result<Vec<u8>, InteractionError> {
        let Some(mut reply) = self.replies.pop_front() else {
            tokio::time::sleep(timeout).await;
            return Err(InteractionError::ReadTimeout {
                timeout_ms: u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
            });
        };
        reply.truncate(max_len);
        Ok(reply)
    }

    async fn close(self: Box<Self>) -> Result<(), InteractionError> {
        Ok(())
    }
}

/// Opens a fake session on the default macropad identity for unit tests.
#[cfg(test)]
pub(crate) fn test_session(report_size: usize, replies: &str) -> (DeviceSession, WriteLog) {
    let profile = DeviceProfile::builder()
        .vendor_id(0xFEED)
        .product_id(0x0000)
        .report_size(report_size)
        .columns(report_size.saturating_sub(3).clamp(1, super::profile::DEFAULT_COLUMNS))
        .build()
        .expect("test profile should be valid");
    let write_log = WriteLog::default();
    let config = FakeBackendConfig::builder()
        .device_fixture(
            "/dev/hidraw1|FEED|0000|FF60|61"
                .parse()
                .expect("test fixture should parse"),
        )
        .replies(replies.parse().expect("test replies should parse"))
        .write_log(write_log.clone())
        .build();
    let session = FakeBackend::new(config)
        .open_first_matching_device(profile)
        .expect("test device should match");
    (session, write_log)
}

fn parse_device_fixture(raw_fixture: &str) -> Result<Vec<FoundDevice>, FixtureError> {
    if raw_fixture.trim().is_empty() {
        return Err(FixtureError::EmptyFixture);
    }

    raw_fixture
        .split(';')
        .map(parse_device_record)
        .collect::<Result<Vec<_>, _>>()
}

fn parse_device_record(raw_record: &str) -> Result<FoundDevice, FixtureError> {
    let fields: Vec<&str> = raw_record.split('|').map(str::trim).collect();
    if fields.len() != 5 && fields.len() != 7 {
        return Err(FixtureError::InvalidRecordFieldCount);
    }
    if fields[..5].iter().any(|field| field.is_empty()) {
        return Err(FixtureError::EmptyRecordField);
    }

    let identity = HidIdentity::new(
        parse_identifier(fields[1])?,
        parse_identifier(fields[2])?,
        parse_identifier(fields[3])?,
        parse_identifier(fields[4])?,
    );
    let device = FoundDevice::new(fields[0].to_string(), identity);
    if fields.len() == 5 {
        return Ok(device);
    }

    Ok(device.with_strings(optional_field(fields[5]), optional_field(fields[6])))
}

fn parse_identifier(raw_value: &str) -> Result<u16, FixtureError> {
    let digits = raw_value
        .strip_prefix("0x")
        .or_else(|| raw_value.strip_prefix("0X"))
        .unwrap_or(raw_value);
    u16::from_str_radix(digits, 16).map_err(|_| FixtureError::InvalidIdentifier {
        value: raw_value.to_string(),
    })
}

fn optional_field(raw_value: &str) -> Option<String> {
    if raw_value.is_empty() || raw_value == "-" {
        None
    } else {
        Some(raw_value.to_string())
    }
}

fn parse_replies(raw_value: &str) -> Result<Vec<Vec<u8>>, FixtureError> {
    if raw_value.trim().is_empty() {
        return Ok(Vec::new());
    }
    raw_value
        .split(',')
        .map(str::trim)
        .map(|reply| {
            if reply == "-" {
                Ok(Vec::new())
            } else {
                hex::decode(reply).map_err(FixtureError::from)
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("/dev/hidraw1|FEED|0000|FF60|61", 1)]
    #[case("/dev/hidraw0|feed|0|1|6;/dev/hidraw1|0xFEED|0x0000|0xFF60|0x61|Acme|Macropad", 2)]
    fn parse_device_fixture_parses_records(#[case] fixture: &str, #[case] expected_count: usize) {
        let devices = parse_device_fixture(fixture).expect("fixture should parse");
        assert_eq!(expected_count, devices.len());
    }

    #[test]
    fn parse_device_fixture_keeps_strings() {
        let devices = parse_device_fixture("/dev/hidraw1|FEED|0000|FF60|61|Acme|-")
            .expect("fixture should parse");
        assert_eq!(Some("Acme"), devices[0].manufacturer());
        assert_eq!(None, devices[0].product());
    }

    #[rstest]
    #[case("/dev/hidraw1|FEED|0000|FF60")]
    #[case("/dev/hidraw1|FEED|0000|FF60|61|Acme")]
    fn parse_device_fixture_rejects_invalid_field_count(#[case] fixture: &str) {
        let result = parse_device_fixture(fixture);
        assert_matches!(result, Err(FixtureError::InvalidRecordFieldCount));
    }

    #[test]
    fn parse_device_fixture_rejects_bad_identifier() {
        let result = parse_device_fixture("/dev/hidraw1|FEED|zz|FF60|61");
        assert_matches!(
            result,
            Err(FixtureError::InvalidIdentifier { value }) if value == "zz"
        );
    }

    #[test]
    fn parse_replies_supports_empty_marker() {
        let replies = parse_replies("0500, -,01").expect("replies should parse");
        assert_eq!(vec![vec![0x05, 0x00], Vec::new(), vec![0x01]], replies);
    }

    #[test]
    fn parse_replies_rejects_odd_length() {
        let result = parse_replies("050");
        assert_matches!(result, Err(FixtureError::InvalidHex(_)));
    }

    #[tokio::test(start_paused = true)]
    async fn exhausted_reply_script_times_out() {
        let mut channel = FakeChannel {
            replies: VecDeque::new(),
            write_log: WriteLog::default(),
            fail_write_at: None,
            writes_attempted: 0,
        };

        let result = channel.read_report(32, Duration::from_millis(250)).await;

        assert_matches!(result, Err(InteractionError::ReadTimeout { timeout_ms: 250 }));
    }

    #[tokio::test]
    async fn injected_write_failure_skips_log() {
        let write_log = WriteLog::default();
        let mut channel = FakeChannel {
            replies: VecDeque::new(),
            write_log: write_log.clone(),
            fail_write_at: Some(1),
            writes_attempted: 0,
        };

        channel
            .write_report(&[0x00, 0x01])
            .await
            .expect("first write should succeed");
        let second = channel.write_report(&[0x00, 0x02]).await;

        assert_matches!(second, Err(InteractionError::WriteFailed { .. }));
        assert_eq!(vec![vec![0x00, 0x01]], write_log.reports());
    }
}
