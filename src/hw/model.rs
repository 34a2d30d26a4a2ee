use std::fmt;

use serde::Serialize;

/// The four identifiers a HID interface must match exactly.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Serialize)]
pub struct HidIdentity {
    pub vendor_id: u16,
    pub product_id: u16,
    pub usage_page: u16,
    pub usage: u16,
}

impl HidIdentity {
    /// Creates an identity from its four identifiers.
    #[must_use]
    pub const fn new(vendor_id: u16, product_id: u16, usage_page: u16, usage: u16) -> Self {
        Self {
            vendor_id,
            product_id,
            usage_page,
            usage,
        }
    }
}

impl fmt::Display for HidIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:04X}:{:04X} (usage page {:04X}, usage {:02X})",
            self.vendor_id, self.product_id, self.usage_page, self.usage
        )
    }
}

/// One enumerated HID interface.
#[derive(Debug, Clone, Eq, PartialEq, Serialize)]
pub struct FoundDevice {
    path: String,
    identity: HidIdentity,
    manufacturer: Option<String>,
    product: Option<String>,
}

impl FoundDevice {
    /// Creates a discovered-interface record.
    pub(crate) fn new(path: String, identity: HidIdentity) -> Self {
        Self {
            path,
            identity,
            manufacturer: None,
            product: None,
        }
    }

    pub(crate) fn with_strings(
        mut self,
        manufacturer: Option<String>,
        product: Option<String>,
    ) -> Self {
        self.manufacturer = manufacturer;
        self.product = product;
        self
    }

    /// Returns the backend-specific device path.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Returns the identifiers reported during enumeration.
    #[must_use]
    pub fn identity(&self) -> HidIdentity {
        self.identity
    }

    /// Returns the manufacturer string, if the device reports one.
    #[must_use]
    pub fn manufacturer(&self) -> Option<&str> {
        self.manufacturer.as_deref()
    }

    /// Returns the product string, if the device reports one.
    #[must_use]
    pub fn product(&self) -> Option<&str> {
        self.product.as_deref()
    }

    /// Returns whether all four identifiers match.
    pub(crate) fn matches(&self, identity: &HidIdentity) -> bool {
        self.identity == *identity
    }
}

/// Picks the first enumerated interface matching `identity`.
///
/// Several identical interfaces are not treated as an error; enumeration order
/// decides.
pub(crate) fn first_matching(
    devices: impl IntoIterator<Item = FoundDevice>,
    identity: &HidIdentity,
) -> Option<FoundDevice> {
    devices.into_iter().find(|device| device.matches(identity))
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    const MACROPAD: HidIdentity = HidIdentity::new(0xFEED, 0x0000, 0xFF60, 0x61);

    #[test]
    fn first_matching_requires_all_four_identifiers() {
        let keyboard_interface =
            FoundDevice::new("/dev/hidraw0".into(), HidIdentity::new(0xFEED, 0x0000, 0x01, 0x06));
        let raw_interface = FoundDevice::new("/dev/hidraw1".into(), MACROPAD);

        let found = first_matching([keyboard_interface, raw_interface], &MACROPAD);

        assert_eq!(Some("/dev/hidraw1"), found.as_ref().map(FoundDevice::path));
    }

    #[test]
    fn first_matching_prefers_enumeration_order() {
        let first = FoundDevice::new("/dev/hidraw3".into(), MACROPAD);
        let second = FoundDevice::new("/dev/hidraw4".into(), MACROPAD);

        let found = first_matching([first, second], &MACROPAD);

        assert_eq!(Some("/dev/hidraw3"), found.as_ref().map(FoundDevice::path));
    }

    #[test]
    fn identity_display_uses_hex() {
        assert_eq!(
            "FEED:0000 (usage page FF60, usage 61)",
            MACROPAD.to_string()
        );
    }
}
