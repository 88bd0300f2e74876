//! Adaptive poller
//!
//! One dedicated thread owns the device and everything derived from it
//! (last fix, schedule window). Host lifecycle calls become [`Command`]s on a
//! channel; `Start` and `Stop` block until the worker has applied them, so
//! `start()` returning `Ok` means the device is enabled, `SessionBegin` has
//! been delivered and the worker is Running.
//!
//! # Thread Model
//!
//! ```text
//! ┌───────────────┐  Command   ┌──────────────────┐   ioctl/poll/read  ┌────────┐
//! │ host threads  │ ─────────▶ │ vogue-gps-poller │ ─────────────────▶ │ device │
//! │ (VogueGps)    │ ◀───────── │   (Worker)       │                    └────────┘
//! └───────────────┘   reply    └──────────────────┘
//!                                      │ status / sv_status / location
//!                                      ▼
//!                               ┌──────────────┐
//!                               │ GpsCallbacks │
//!                               └──────────────┘
//! ```

mod schedule;
mod state;
mod tracker;
mod worker;

pub use schedule::{FIX_REQUEST_BIAS_MS, MIN_WINDOW_MS, ScheduleWindow};
pub use state::{PollerState, SharedState};
pub use tracker::FixTracker;

use crate::config::GpsConfig;
use crate::core::callbacks::CallbackSlot;
use crate::core::device::GpsDevice;
use crate::error::{Error, Result};
use crossbeam_channel::{Sender, bounded, unbounded};
use std::sync::Arc;
use std::thread::{self, JoinHandle, ThreadId};
use std::time::Duration;
use worker::Worker;

/// Requests handled by the worker thread
pub(crate) enum Command {
    /// Enable the device and begin polling
    Start(Sender<Result<()>>),
    /// Stop polling and power down; replies whether the receiver was on
    Stop(Sender<bool>),
    /// Stop if running and exit the thread
    Terminate,
}

/// Cloneable sender side of a running poller
#[derive(Clone)]
pub struct PollerHandle {
    commands: Sender<Command>,
    shared: Arc<SharedState>,
    worker: ThreadId,
}

impl PollerHandle {
    /// Start polling (no-op if already running)
    pub fn start(&self) -> Result<()> {
        self.check_caller()?;
        let (tx, rx) = bounded(1);
        self.commands
            .send(Command::Start(tx))
            .map_err(|_| Error::Terminated)?;
        rx.recv().map_err(|_| Error::Terminated)?
    }

    /// Stop polling; returns whether the receiver was on
    pub fn stop(&self) -> Result<bool> {
        self.check_caller()?;
        let (tx, rx) = bounded(1);
        self.commands
            .send(Command::Stop(tx))
            .map_err(|_| Error::Terminated)?;
        rx.recv().map_err(|_| Error::Terminated)
    }

    pub fn state(&self) -> PollerState {
        self.shared.state()
    }

    // A blocking request from inside a callback would wait on itself
    fn check_caller(&self) -> Result<()> {
        if thread::current().id() == self.worker {
            return Err(Error::Other(
                "lifecycle call made from the poller thread".to_string(),
            ));
        }
        Ok(())
    }
}

/// Owner of the poller thread
pub struct Poller {
    handle: PollerHandle,
    join: Option<JoinHandle<()>>,
}

impl Poller {
    /// Spawn the worker thread, moving `device` into it
    pub fn spawn<D: GpsDevice>(
        device: D,
        correction_factor: f64,
        config: &GpsConfig,
        shared: Arc<SharedState>,
        callbacks: CallbackSlot,
    ) -> Result<Self> {
        let (tx, rx) = unbounded();
        let worker = Worker::new(
            device,
            correction_factor,
            config.signal.units(),
            Duration::from_millis(config.polling.poll_slice_ms),
            Arc::clone(&shared),
            callbacks,
            rx,
        );

        let join = thread::Builder::new()
            .name("vogue-gps-poller".to_string())
            .spawn(move || worker.run())
            .map_err(|e| Error::Other(format!("Failed to spawn poller thread: {}", e)))?;

        let handle = PollerHandle {
            commands: tx,
            shared,
            worker: join.thread().id(),
        };

        Ok(Self {
            handle,
            join: Some(join),
        })
    }

    pub fn handle(&self) -> PollerHandle {
        self.handle.clone()
    }

    pub fn state(&self) -> PollerState {
        self.handle.state()
    }

    /// Stop, terminate and join the worker; safe to call repeatedly
    pub fn shutdown(&mut self) -> Result<()> {
        let Some(join) = self.join.take() else {
            return Ok(());
        };

        log::info!("Shutting down GPS poller...");
        // Send fails only if the worker is already gone
        let _ = self.handle.commands.send(Command::Terminate);

        if thread::current().id() == self.handle.worker {
            log::warn!("Poller shutdown requested from the poller thread, not joining");
            return Ok(());
        }

        let joined = join.join();
        self.handle.shared.set_state(PollerState::Terminating);
        joined.map_err(|_| Error::ThreadPanic)?;
        log::info!("GPS poller shutdown complete");
        Ok(())
    }
}

impl Drop for Poller {
    fn drop(&mut self) {
        let _ = self.shutdown();
    }
}
