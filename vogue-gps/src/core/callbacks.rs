//! Host callback contract
//!
//! The host framework implements [`GpsCallbacks`]; the poller thread is the
//! only caller. [`CallbackSlot`] lets `init()` install or replace the
//! callbacks after the worker has already been spawned.

use crate::core::types::{GpsLocation, GpsStatusValue, SvStatus};
use parking_lot::RwLock;
use std::sync::Arc;

/// Receivers for status, location and satellite visibility
pub trait GpsCallbacks: Send + Sync {
    /// Engine / session status change
    fn status(&self, status: GpsStatusValue);

    /// New location fix
    fn location(&self, location: &GpsLocation);

    /// Satellite visibility update
    fn sv_status(&self, sv_status: &SvStatus);
}

/// Shared, replaceable callback table
#[derive(Clone, Default)]
pub struct CallbackSlot {
    inner: Arc<RwLock<Option<Arc<dyn GpsCallbacks>>>>,
}

impl CallbackSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install callbacks, replacing any previous set
    pub fn install(&self, callbacks: Arc<dyn GpsCallbacks>) {
        *self.inner.write() = Some(callbacks);
    }

    pub fn is_installed(&self) -> bool {
        self.inner.read().is_some()
    }

    pub fn status(&self, status: GpsStatusValue) {
        match self.current() {
            Some(cb) => cb.status(status),
            None => log::debug!("No callbacks installed, dropping status {:?}", status),
        }
    }

    pub fn location(&self, location: &GpsLocation) {
        match self.current() {
            Some(cb) => cb.location(location),
            None => log::debug!("No callbacks installed, dropping location"),
        }
    }

    pub fn sv_status(&self, sv_status: &SvStatus) {
        match self.current() {
            Some(cb) => cb.sv_status(sv_status),
            None => log::debug!("No callbacks installed, dropping sv status"),
        }
    }

    // Clone out so no lock is held while host code runs
    fn current(&self) -> Option<Arc<dyn GpsCallbacks>> {
        self.inner.read().clone()
    }
}

/// Callbacks that write every event to the log
///
/// Used by the monitor binary.
#[derive(Debug, Default)]
pub struct LoggingCallbacks;

impl GpsCallbacks for LoggingCallbacks {
    fn status(&self, status: GpsStatusValue) {
        log::info!("GPS status: {:?}", status);
    }

    fn location(&self, location: &GpsLocation) {
        log::info!(
            "Fix: lat={:.6} lon={:.6} acc={:.1}m speed={:.2}m/s bearing={:.1} t={} flags={:#06x}",
            location.latitude,
            location.longitude,
            location.accuracy,
            location.speed,
            location.bearing,
            location.timestamp,
            location.flags.bits()
        );
    }

    fn sv_status(&self, sv_status: &SvStatus) {
        log::debug!("Satellites in view: {}", sv_status.num_svs());
        for sv in &sv_status.sv_list {
            log::trace!("  prn={} snr={}", sv.prn, sv.snr);
        }
    }
}
