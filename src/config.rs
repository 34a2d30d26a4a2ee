use std::fs;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use serde::Deserialize;
use tracing::debug;

use crate::error::ConfigError;
use crate::hw::{
    DEFAULT_COLUMNS, DEFAULT_REPORT_SIZE, DEFAULT_ROWS, DEFAULT_USAGE, DEFAULT_USAGE_PAGE,
    DeviceProfile,
};

const CONFIG_FILE_NAME: &str = "config.toml";

/// Vendor id used when no configuration file exists.
pub const DEFAULT_VENDOR_ID: u16 = 0xFEED;
/// Product id used when no configuration file exists.
pub const DEFAULT_PRODUCT_ID: u16 = 0x0000;

/// Parsed configuration file.
#[derive(Debug, Clone, Default, Eq, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    device: DeviceSection,
}

#[derive(Debug, Clone, Eq, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
struct DeviceSection {
    vendor_id: u16,
    product_id: u16,
    #[serde(default = "default_usage_page")]
    usage_page: u16,
    #[serde(default = "default_usage")]
    usage: u16,
    #[serde(default = "default_report_size")]
    raw_epsize: usize,
    #[serde(default = "default_columns")]
    columns: usize,
    #[serde(default = "default_rows")]
    rows: usize,
}

fn default_usage_page() -> u16 {
    DEFAULT_USAGE_PAGE
}

fn default_usage() -> u16 {
    DEFAULT_USAGE
}

fn default_report_size() -> usize {
    DEFAULT_REPORT_SIZE
}

fn default_columns() -> usize {
    DEFAULT_COLUMNS
}

fn default_rows() -> usize {
    DEFAULT_ROWS
}

impl Default for DeviceSection {
    fn default() -> Self {
        Self {
            vendor_id: DEFAULT_VENDOR_ID,
            product_id: DEFAULT_PRODUCT_ID,
            usage_page: DEFAULT_USAGE_PAGE,
            usage: DEFAULT_USAGE,
            raw_epsize: DEFAULT_REPORT_SIZE,
            columns: DEFAULT_COLUMNS,
            rows: DEFAULT_ROWS,
        }
    }
}

/// Where a device profile came from.
#[derive(Debug, Clone, Eq, PartialEq, derive_more::Display)]
pub enum ProfileSource {
    /// Read from a configuration file.
    #[display("{}", _0.display())]
    File(PathBuf),
    /// No configuration file was found.
    #[display("built-in defaults")]
    BuiltIn,
}

/// Resolves the device profile from `path`, or from the default location.
///
/// An explicit path must exist. A missing default file yields the built-in
/// profile.
///
/// # Errors
///
/// Returns an error when the file cannot be read, is not valid TOML, or
/// describes an unusable profile.
pub fn load_profile(path: Option<&Path>) -> Result<(DeviceProfile, ProfileSource), ConfigError> {
    let (path, explicit) = match path {
        Some(path) => (path.to_path_buf(), true),
        None => (default_config_path(), false),
    };

    if !explicit && !path.exists() {
        debug!(path = %path.display(), "no configuration file, using built-in profile");
        let profile = Config::default().into_profile(&path)?;
        return Ok((profile, ProfileSource::BuiltIn));
    }

    let config = Config::read(&path)?;
    let profile = config.into_profile(&path)?;
    Ok((profile, ProfileSource::File(path)))
}

impl Config {
    /// Reads and parses a configuration file.
    ///
    /// # Errors
    ///
    /// Returns an error when the file cannot be read or parsed.
    pub fn read(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::parse(&raw, path)
    }

    fn parse(raw: &str, path: &Path) -> Result<Self, ConfigError> {
        toml::from_str(raw).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source: Box::new(source),
        })
    }

    /// Validates the `[device]` table and builds the profile.
    ///
    /// # Errors
    ///
    /// Returns an error when the report size is below the protocol minimum or
    /// a text dimension is zero.
    pub fn into_profile(self, path: &Path) -> Result<DeviceProfile, ConfigError> {
        let device = self.device;
        DeviceProfile::builder()
            .vendor_id(device.vendor_id)
            .product_id(device.product_id)
            .usage_page(device.usage_page)
            .usage(device.usage)
            .report_size(device.raw_epsize)
            .columns(device.columns)
            .rows(device.rows)
            .build()
            .map_err(|source| ConfigError::Profile {
                path: path.display().to_string(),
                source,
            })
    }
}

/// Returns `<config dir>/config.toml` for this application.
#[must_use]
pub fn default_config_path() -> PathBuf {
    let Some(project_dirs) = ProjectDirs::from("io.github", "macropad-oled", "macropad-oled")
    else {
        return std::env::temp_dir()
            .join("macropad-oled")
            .join(CONFIG_FILE_NAME);
    };
    project_dirs.config_dir().join(CONFIG_FILE_NAME)
}

#[cfg(test)]
mod tests {
    use std::time::{SystemTime, UNIX_EPOCH};

    use assert_matches::assert_matches;
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::error::ProfileError;
    use crate::hw::HidIdentity;

    fn unique_temp_path(name: &str) -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("time should be after epoch")
            .as_nanos();
        std::env::temp_dir().join(format!("macropad-oled-{name}-{nanos}.toml"))
    }

    #[test]
    fn full_device_table_is_read() {
        let path = unique_temp_path("full");
        fs::write(
            &path,
            "[device]\nvendor_id = 0x4B50\nproduct_id = 0x1001\nusage_page = 0xFF00\n\
             usage = 0x01\nraw_epsize = 64\ncolumns = 16\nrows = 4\n",
        )
        .expect("config should be written");

        let (profile, source) = load_profile(Some(&path)).expect("config should load");

        assert_eq!(
            HidIdentity::new(0x4B50, 0x1001, 0xFF00, 0x01),
            profile.identity()
        );
        assert_eq!((64, 16, 4), (profile.report_size(), profile.columns(), profile.rows()));
        assert_eq!(ProfileSource::File(path.clone()), source);
        fs::remove_file(path).expect("config should be removed");
    }

    #[test]
    fn omitted_fields_use_qmk_defaults() {
        let config = Config::parse(
            "[device]\nvendor_id = 0xFEED\nproduct_id = 0x0000\n",
            Path::new("inline.toml"),
        )
        .expect("config should parse");

        let profile = config
            .into_profile(Path::new("inline.toml"))
            .expect("profile should be valid");

        assert_eq!(
            HidIdentity::new(0xFEED, 0x0000, 0xFF60, 0x61),
            profile.identity()
        );
        assert_eq!(32, profile.report_size());
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let result = Config::parse(
            "[device]\nvendor_id = 1\nproduct_id = 2\nepsize = 32\n",
            Path::new("typo.toml"),
        );
        assert_matches!(result, Err(ConfigError::Parse { path, .. }) if path == "typo.toml");
    }

    #[test]
    fn tiny_report_size_is_a_profile_error() {
        let config = Config::parse(
            "[device]\nvendor_id = 1\nproduct_id = 2\nraw_epsize = 5\n",
            Path::new("tiny.toml"),
        )
        .expect("config should parse");

        let result = config.into_profile(Path::new("tiny.toml"));

        assert_matches!(
            result,
            Err(ConfigError::Profile {
                source: ProfileError::ReportSize(_),
                ..
            })
        );
    }

    #[test]
    fn default_columns_need_a_wider_report() {
        let config = Config::parse(
            "[device]\nvendor_id = 1\nproduct_id = 2\nraw_epsize = 16\n",
            Path::new("narrow.toml"),
        )
        .expect("config should parse");

        let result = config.into_profile(Path::new("narrow.toml"));

        assert_matches!(
            result,
            Err(ConfigError::Profile {
                source: ProfileError::LineTooWide {
                    columns: 21,
                    report_size: 16,
                    ..
                },
                ..
            })
        );
    }

    #[test]
    fn explicit_missing_path_is_an_error() {
        let path = unique_temp_path("missing");
        let result = load_profile(Some(&path));
        assert_matches!(result, Err(ConfigError::Io { .. }));
    }
}
