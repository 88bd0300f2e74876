//! GpsDevice trait definition

use crate::core::types::{DeviceInfo, FixRecord};
use crate::error::{Error, Result};
use std::time::Duration;

/// Outcome of a readiness wait
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Readiness {
    /// A fix record can be read without blocking
    Ready,
    /// Timeout elapsed with no data
    TimedOut,
}

/// Device channel to the kernel GPS driver
///
/// Implementations are owned by the poller thread after initialization and
/// are never shared; no internal synchronization is required.
pub trait GpsDevice: Send + 'static {
    /// Query protocol version and correction factor
    fn query_info(&mut self) -> Result<DeviceInfo>;

    /// Power up the receiver
    fn enable(&mut self) -> Result<()>;

    /// Power down the receiver
    fn disable(&mut self) -> Result<()>;

    /// Ask the receiver for a fresh fix (fire and forget)
    fn request_new_fix(&mut self) -> Result<()>;

    /// Wait up to `timeout` for a record to become readable
    ///
    /// Returns [`Error::Interrupted`] when woken early by a signal.
    fn wait_readable(&mut self, timeout: Duration) -> Result<Readiness>;

    /// Read exactly one fix record, retrying interrupted reads
    fn read_fix(&mut self) -> Result<FixRecord>;
}

/// Query device info and check the protocol version
///
/// Returns the correction factor on success.
pub fn connect<D: GpsDevice + ?Sized>(device: &mut D, expected_version: i32) -> Result<f64> {
    let info = device.query_info()?;
    log::debug!(
        "GPS device info: version={} correction_factor={}",
        info.version,
        info.correction_factor
    );

    if info.version != expected_version {
        log::error!(
            "Wrong GPS version: expected {}, device reports {}",
            expected_version,
            info.version
        );
        return Err(Error::ProtocolMismatch {
            expected: expected_version,
            actual: info.version,
        });
    }

    Ok(info.correction_factor)
}
