//! Host lifecycle interface
//!
//! [`GpsInterface`] is the contract the host location framework drives.
//! [`VogueGps`] implements it as an owned context: it is created empty,
//! opens and checks the device on the first `init()` or `start()`, and tears
//! everything down on `cleanup()` or drop.

use crate::config::GpsConfig;
use crate::core::callbacks::{CallbackSlot, GpsCallbacks};
use crate::core::device::{self, GpsDevice};
use crate::core::types::{AidingData, GpsUtcTime, PositionMode};
use crate::device::CharDevice;
use crate::error::{Error, Result};
use crate::poller::{Poller, PollerHandle, PollerState, SharedState};
use parking_lot::Mutex;
use std::any::Any;
use std::sync::Arc;

/// Lifecycle calls made by the host location framework
pub trait GpsInterface: Send + Sync {
    /// Install callbacks and bring up the device
    fn init(&self, callbacks: Arc<dyn GpsCallbacks>) -> Result<()>;

    /// Begin navigating
    fn start(&self) -> Result<()>;

    /// Stop navigating
    fn stop(&self) -> Result<()>;

    /// Set the desired interval between fixes (0 = one-shot)
    fn set_fix_frequency(&self, interval_ms: u32);

    /// Release the device and the worker thread
    fn cleanup(&self);

    /// Inject the current time (no effect on this device)
    fn inject_time(&self, time: GpsUtcTime, time_reference: i64, uncertainty: i32) -> Result<()>;

    /// Delete cached aiding data (no effect on this device)
    fn delete_aiding_data(&self, flags: AidingData);

    /// Set positioning mode and fix interval
    fn set_position_mode(&self, mode: PositionMode, interval_ms: u32) -> Result<()>;

    /// Look up an optional interface extension
    fn get_extension(&self, name: &str) -> Option<&dyn Any>;
}

type DeviceOpener<D> = Box<dyn FnMut() -> Result<D> + Send>;

enum PollerSlot {
    Uninitialized,
    Active(Poller),
    Terminated,
}

/// GPS context for the Vogue kernel driver
pub struct VogueGps<D: GpsDevice> {
    config: GpsConfig,
    opener: Mutex<DeviceOpener<D>>,
    callbacks: CallbackSlot,
    shared: Arc<SharedState>,
    poller: Mutex<PollerSlot>,
}

impl VogueGps<CharDevice> {
    /// Context for the character device named in `config.device.path`
    pub fn open(config: GpsConfig) -> Self {
        let path = config.device.path.clone();
        Self::new(config, move || CharDevice::open(&path))
    }
}

impl<D: GpsDevice> VogueGps<D> {
    /// Context that obtains its device from `opener` on first use
    ///
    /// `opener` is called again on the next `init()`/`start()` if
    /// initialization fails.
    pub fn new<F>(config: GpsConfig, opener: F) -> Self
    where
        F: FnMut() -> Result<D> + Send + 'static,
    {
        let interval = config.polling.clamp_interval(config.polling.fix_interval_ms);
        Self {
            config,
            opener: Mutex::new(Box::new(opener)),
            callbacks: CallbackSlot::new(),
            shared: Arc::new(SharedState::new(interval)),
            poller: Mutex::new(PollerSlot::Uninitialized),
        }
    }

    /// Context around an already opened device
    pub fn with_device(config: GpsConfig, device: D) -> Self {
        let mut device = Some(device);
        Self::new(config, move || {
            device.take().ok_or_else(|| {
                Error::Other("device was consumed by an earlier failed initialization".into())
            })
        })
    }

    /// Current poller state (Idle before initialization)
    pub fn state(&self) -> PollerState {
        self.shared.state()
    }

    /// Fix interval currently in effect
    pub fn fix_interval_ms(&self) -> u32 {
        self.shared.fix_interval_ms()
    }

    /// True once the device is open and the worker is running
    pub fn is_initialized(&self) -> bool {
        matches!(*self.poller.lock(), PollerSlot::Active(_))
    }

    /// Open, check and hand the device to a new worker (first call only)
    fn ensure_initialized(&self) -> Result<PollerHandle> {
        let mut slot = self.poller.lock();
        match &*slot {
            PollerSlot::Active(poller) => return Ok(poller.handle()),
            PollerSlot::Terminated => return Err(Error::Terminated),
            PollerSlot::Uninitialized => {}
        }

        log::info!("Initializing GPS device {}", self.config.device.path);
        let mut device = {
            let mut open = self.opener.lock();
            (*open)()?
        };
        let correction_factor = device::connect(&mut device, self.config.device.expected_version)?;
        log::info!("GPS correction factor: {}", correction_factor);

        let poller = Poller::spawn(
            device,
            correction_factor,
            &self.config,
            Arc::clone(&self.shared),
            self.callbacks.clone(),
        )?;
        let handle = poller.handle();
        *slot = PollerSlot::Active(poller);
        Ok(handle)
    }

    fn active_handle(&self) -> Option<PollerHandle> {
        match &*self.poller.lock() {
            PollerSlot::Active(poller) => Some(poller.handle()),
            _ => None,
        }
    }
}

impl<D: GpsDevice> GpsInterface for VogueGps<D> {
    fn init(&self, callbacks: Arc<dyn GpsCallbacks>) -> Result<()> {
        self.ensure_initialized()?;
        self.callbacks.install(callbacks);
        log::info!("GPS initialized");
        Ok(())
    }

    fn start(&self) -> Result<()> {
        let handle = self.ensure_initialized()?;
        log::debug!("GPS start requested");
        handle.start()
    }

    fn stop(&self) -> Result<()> {
        log::debug!("GPS stop requested");
        match self.active_handle() {
            Some(handle) => handle.stop().map(|_| ()),
            None => Ok(()),
        }
    }

    fn set_fix_frequency(&self, interval_ms: u32) {
        let interval = self.config.polling.clamp_interval(interval_ms);
        if interval != interval_ms {
            log::debug!(
                "Fix interval {} ms raised to minimum {} ms",
                interval_ms,
                interval
            );
        }
        log::debug!("Fix interval set to {} ms", interval);
        self.shared.set_fix_interval_ms(interval);
    }

    fn cleanup(&self) {
        let previous = std::mem::replace(&mut *self.poller.lock(), PollerSlot::Terminated);

        match previous {
            // The worker must still see Running to take the stop path
            PollerSlot::Active(mut poller) => {
                log::info!("GPS cleanup");
                if let Err(e) = poller.shutdown() {
                    log::error!("GPS poller shutdown failed: {}", e);
                }
            }
            PollerSlot::Uninitialized => self.shared.set_state(PollerState::Terminating),
            PollerSlot::Terminated => {}
        }
    }

    fn inject_time(&self, time: GpsUtcTime, time_reference: i64, uncertainty: i32) -> Result<()> {
        log::trace!(
            "Ignoring injected time {} (ref {}, uncertainty {})",
            time,
            time_reference,
            uncertainty
        );
        Ok(())
    }

    fn delete_aiding_data(&self, flags: AidingData) {
        log::trace!("Ignoring aiding data deletion {:#06x}", flags.0);
    }

    fn set_position_mode(&self, mode: PositionMode, interval_ms: u32) -> Result<()> {
        log::debug!("Position mode {:?} requested", mode);
        self.set_fix_frequency(interval_ms);
        Ok(())
    }

    fn get_extension(&self, name: &str) -> Option<&dyn Any> {
        log::debug!("No extension named {:?}", name);
        None
    }
}

impl<D: GpsDevice> Drop for VogueGps<D> {
    fn drop(&mut self) {
        self.cleanup();
    }
}
