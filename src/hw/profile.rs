use bon::bon;
use serde::Serialize;

use super::model::HidIdentity;
use crate::error::ProfileError;
use crate::handlers::PixelBatcher;

/// Header, opcode and row bytes sharing a line-write report with the text.
const LINE_REPORT_OVERHEAD: usize = 3;

/// QMK raw-HID usage page.
pub const DEFAULT_USAGE_PAGE: u16 = 0xFF60;
/// QMK raw-HID usage.
pub const DEFAULT_USAGE: u16 = 0x61;
/// QMK `RAW_EPSIZE`.
pub const DEFAULT_REPORT_SIZE: usize = 32;
/// Text columns of a 128x64 panel with the default 6x8 font.
pub const DEFAULT_COLUMNS: usize = 21;
/// Text rows of a 128x64 panel with the default 6x8 font.
pub const DEFAULT_ROWS: usize = 8;

/// Immutable description of the attached device, resolved once at startup.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize)]
pub struct DeviceProfile {
    identity: HidIdentity,
    report_size: usize,
    columns: usize,
    rows: usize,
    #[serde(skip)]
    batcher: PixelBatcher,
}

#[bon]
impl DeviceProfile {
    /// Creates a validated profile.
    ///
    /// ```
    /// use macropad_oled::DeviceProfile;
    ///
    /// let profile = DeviceProfile::builder()
    ///     .vendor_id(0xFEED)
    ///     .product_id(0x0000)
    ///     .build()?;
    /// assert_eq!(32, profile.report_size());
    /// assert_eq!(14, profile.pixel_batcher().capacity());
    /// # Ok::<(), macropad_oled::ProfileError>(())
    /// ```
    ///
    /// # Errors
    ///
    /// Returns an error when the report size cannot carry one pixel coordinate,
    /// when the text grid has a zero dimension, or when a full line of
    /// `columns` characters does not fit one report.
    #[builder]
    pub fn new(
        vendor_id: u16,
        product_id: u16,
        #[builder(default = DEFAULT_USAGE_PAGE)] usage_page: u16,
        #[builder(default = DEFAULT_USAGE)] usage: u16,
        #[builder(default = DEFAULT_REPORT_SIZE)] report_size: usize,
        #[builder(default = DEFAULT_COLUMNS)] columns: usize,
        #[builder(default = DEFAULT_ROWS)] rows: usize,
    ) -> Result<Self, ProfileError> {
        let batcher = PixelBatcher::new(report_size)?;
        if columns == 0 {
            return Err(ProfileError::ZeroDimension { field: "columns" });
        }
        if rows == 0 {
            return Err(ProfileError::ZeroDimension { field: "rows" });
        }
        let needed = columns.saturating_add(LINE_REPORT_OVERHEAD);
        if needed > report_size {
            return Err(ProfileError::LineTooWide {
                columns,
                needed,
                report_size,
            });
        }

        Ok(Self {
            identity: HidIdentity::new(vendor_id, product_id, usage_page, usage),
            report_size,
            columns,
            rows,
            batcher,
        })
    }
}

impl DeviceProfile {
    /// Returns the identifiers used to select the HID interface.
    #[must_use]
    pub fn identity(&self) -> HidIdentity {
        self.identity
    }

    /// Returns the fixed byte length of every report.
    #[must_use]
    pub fn report_size(&self) -> usize {
        self.report_size
    }

    /// Returns the number of text columns per line.
    #[must_use]
    pub fn columns(&self) -> usize {
        self.columns
    }

    /// Returns the number of text rows.
    #[must_use]
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Returns the pixel batcher sized for this report size.
    #[must_use]
    pub fn pixel_batcher(&self) -> PixelBatcher {
        self.batcher
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::handlers::FrameCodecError;

    #[test]
    fn builder_applies_qmk_defaults() {
        let profile = DeviceProfile::builder()
            .vendor_id(0x4B50)
            .product_id(0x1001)
            .build()
            .expect("default profile should be valid");

        assert_eq!(
            HidIdentity::new(0x4B50, 0x1001, 0xFF60, 0x61),
            profile.identity()
        );
        assert_eq!(21, profile.columns());
        assert_eq!(8, profile.rows());
    }

    #[test]
    fn builder_rejects_tiny_report_size() {
        let result = DeviceProfile::builder()
            .vendor_id(0x4B50)
            .product_id(0x1001)
            .report_size(4)
            .build();

        assert_matches!(
            result,
            Err(ProfileError::ReportSize(FrameCodecError::ReportSizeTooSmall {
                report_size: 4,
                ..
            }))
        );
    }

    #[test]
    fn builder_rejects_zero_columns() {
        let result = DeviceProfile::builder()
            .vendor_id(0x4B50)
            .product_id(0x1001)
            .columns(0)
            .build();

        assert_matches!(
            result,
            Err(ProfileError::ZeroDimension { field: "columns" })
        );
    }

    #[test]
    fn builder_rejects_columns_wider_than_a_line_report() {
        let result = DeviceProfile::builder()
            .vendor_id(0x4B50)
            .product_id(0x1001)
            .report_size(16)
            .columns(21)
            .build();

        assert_matches!(
            result,
            Err(ProfileError::LineTooWide {
                columns: 21,
                needed: 24,
                report_size: 16,
            })
        );
    }

    #[test]
    fn builder_accepts_a_line_that_exactly_fills_the_report() {
        let profile = DeviceProfile::builder()
            .vendor_id(0x4B50)
            .product_id(0x1001)
            .report_size(16)
            .columns(13)
            .build()
            .expect("13 columns plus overhead fill 16 bytes");

        assert_eq!(13, profile.columns());
    }
}
