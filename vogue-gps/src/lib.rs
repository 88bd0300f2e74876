//! Vogue GPS - location HAL shim for the Vogue kernel GPS driver
//!
//! Bridges the `/dev/vogue_gps` character device to a host location
//! framework: it enables and disables the receiver, polls for fixes on an
//! adaptive schedule, decodes raw fix records into degrees, derives speed and
//! bearing from consecutive fixes, and reports status, location and satellite
//! visibility through [`GpsCallbacks`].
//!
//! ```no_run
//! use std::sync::Arc;
//! use vogue_gps::{GpsConfig, GpsInterface, LoggingCallbacks, VogueGps};
//!
//! let gps = VogueGps::open(GpsConfig::default());
//! gps.init(Arc::new(LoggingCallbacks))?;
//! gps.set_fix_frequency(5_000);
//! gps.start()?;
//! # Ok::<(), vogue_gps::Error>(())
//! ```

pub mod config;
pub mod core;
pub mod decode;
pub mod device;
pub mod error;
pub mod hal;
pub mod kinematics;
pub mod poller;

// Re-export commonly used types
pub use config::GpsConfig;
pub use crate::core::callbacks::{GpsCallbacks, LoggingCallbacks};
pub use crate::core::device::GpsDevice;
pub use crate::core::types::{
    AidingData, FixRecord, GpsLocation, GpsStatusValue, GpsUtcTime, LocationFlags, PositionMode,
    SvInfo, SvStatus,
};
pub use device::{CharDevice, MockControl, MockDevice};
pub use error::{Error, Result};
pub use hal::{GpsInterface, VogueGps};
pub use poller::PollerState;
