//! Core abstractions shared by the device layer, the poller and the host.
//!
//! - [`device::GpsDevice`]: Trait implemented by the kernel device channel
//! - [`callbacks::GpsCallbacks`]: Trait implemented by the host framework
//! - [`types`]: Fix records, decoded positions and host-facing payloads

pub mod callbacks;
pub mod device;
pub mod types;
