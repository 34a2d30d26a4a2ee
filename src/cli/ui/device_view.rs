use std::fmt::{self, Display, Formatter};

use crate::hw::{FoundDevice, HidIdentity};
use crate::utils::format_descriptor;

use super::painter::Painter;
use super::table::Table;

/// Renders one `FoundDevice` as a key-value table.
pub(crate) struct DeviceView<'a> {
    device: &'a FoundDevice,
    painter: &'a Painter,
}

impl<'a> DeviceView<'a> {
    pub(crate) fn new(device: &'a FoundDevice, painter: &'a Painter) -> Self {
        Self { device, painter }
    }
}

impl Display for DeviceView<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let identity = self.device.identity();
        let table = Table::key_value(
            self.painter,
            vec![
                ("path", self.painter.value(self.device.path())),
                (
                    "manufacturer",
                    self.painter
                        .value(format_descriptor(self.device.manufacturer())),
                ),
                (
                    "product",
                    self.painter.value(format_descriptor(self.device.product())),
                ),
                (
                    "vendor_id",
                    self.painter.value(format!("{:04X}", identity.vendor_id)),
                ),
                (
                    "product_id",
                    self.painter.value(format!("{:04X}", identity.product_id)),
                ),
                (
                    "usage_page",
                    self.painter.value(format!("{:04X}", identity.usage_page)),
                ),
                ("usage", self.painter.value(format!("{:02X}", identity.usage))),
            ],
        );
        write!(f, "{table}")
    }
}

/// Renders every enumerated interface as one grid, marking profile matches.
pub(crate) struct DeviceListView<'a> {
    devices: &'a [FoundDevice],
    matching: Option<HidIdentity>,
    painter: &'a Painter,
}

impl<'a> DeviceListView<'a> {
    pub(crate) fn new(
        devices: &'a [FoundDevice],
        matching: Option<HidIdentity>,
        painter: &'a Painter,
    ) -> Self {
        Self {
            devices,
            matching,
            painter,
        }
    }
}

impl Display for DeviceListView<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        if self.devices.is_empty() {
            return write!(f, "{}", self.painter.warning("No HID interfaces found"));
        }

        let rows = self
            .devices
            .iter()
            .map(|device| {
                let identity = device.identity();
                let matched = self
                    .matching
                    .is_some_and(|wanted| device.matches(&wanted));
                vec![
                    if matched {
                        self.painter.success("*")
                    } else {
                        String::new()
                    },
                    device.path().to_string(),
                    format!("{:04X}:{:04X}", identity.vendor_id, identity.product_id),
                    format!("{:04X}/{:02X}", identity.usage_page, identity.usage),
                    format_descriptor(device.product()).to_string(),
                ]
            })
            .collect();
        let table = Table::grid(["", "path", "vid:pid", "usage", "product"], rows);
        write!(f, "{table}")
    }
}
