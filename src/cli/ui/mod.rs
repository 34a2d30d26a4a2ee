mod device_view;
mod painter;
mod profile_view;
mod spinner;
mod table;

pub(crate) use self::device_view::{DeviceListView, DeviceView};
pub(crate) use self::painter::Painter;
pub(crate) use self::profile_view::ProfileView;
pub(crate) use self::spinner::Spinner;
