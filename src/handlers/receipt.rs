use serde::Serialize;

/// Totals for an operation that wrote one or more reports.
#[derive(Debug, Clone, Copy, Default, Eq, PartialEq, Serialize)]
pub struct UploadReceipt {
    bytes_written: usize,
    frames_written: usize,
}

impl UploadReceipt {
    /// Creates a receipt.
    ///
    /// ```
    /// use macropad_oled::UploadReceipt;
    ///
    /// let receipt = UploadReceipt::new(96, 3);
    /// assert_eq!(96, receipt.bytes_written());
    /// assert_eq!(3, receipt.frames_written());
    /// ```
    #[must_use]
    pub fn new(bytes_written: usize, frames_written: usize) -> Self {
        Self {
            bytes_written,
            frames_written,
        }
    }

    /// Returns the total bytes accepted by the device.
    #[must_use]
    pub fn bytes_written(&self) -> usize {
        self.bytes_written
    }

    /// Returns the number of reports written.
    #[must_use]
    pub fn frames_written(&self) -> usize {
        self.frames_written
    }

    pub(crate) fn record(&mut self, bytes: usize) {
        self.bytes_written += bytes;
        self.frames_written += 1;
    }

    pub(crate) fn record_all(&mut self, other: UploadReceipt) {
        self.bytes_written += other.bytes_written;
        self.frames_written += other.frames_written;
    }
}
