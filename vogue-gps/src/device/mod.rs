//! Device channel implementations
//!
//! - [`CharDevice`]: The kernel character device (`/dev/vogue_gps`)
//! - [`MockDevice`]: In-memory device for tests and dry runs

mod char_device;
pub mod constants;
mod mock;

pub use char_device::CharDevice;
pub use constants::{DEFAULT_DEVICE_PATH, GPS_VERSION};
pub use mock::{DeviceOp, MockControl, MockDevice};
