use std::fmt::{self, Display, Formatter};

use crate::config::ProfileSource;
use crate::hw::DeviceProfile;

use super::painter::Painter;
use super::table::Table;

/// Renders the resolved device profile.
pub(crate) struct ProfileView<'a> {
    profile: &'a DeviceProfile,
    source: &'a ProfileSource,
    painter: &'a Painter,
}

impl<'a> ProfileView<'a> {
    pub(crate) fn new(
        profile: &'a DeviceProfile,
        source: &'a ProfileSource,
        painter: &'a Painter,
    ) -> Self {
        Self {
            profile,
            source,
            painter,
        }
    }
}

impl Display for ProfileView<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let table = Table::key_value(
            self.painter,
            vec![
                ("source", self.painter.value(self.source.to_string())),
                (
                    "report_size",
                    self.painter.value(self.profile.report_size().to_string()),
                ),
                (
                    "text_grid",
                    self.painter.value(format!(
                        "{} x {}",
                        self.profile.columns(),
                        self.profile.rows()
                    )),
                ),
                (
                    "pixels_per_report",
                    self.painter
                        .value(self.profile.pixel_batcher().capacity().to_string()),
                ),
            ],
        );
        write!(f, "{table}")
    }
}
