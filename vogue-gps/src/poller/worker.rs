//! Poller thread main loop
//!
//! ```text
//!            Start                      Stop / one-shot fix
//!   ┌──────┐ ─────────────────▶ ┌─────────┐ ──────────┐
//!   │ Idle │                    │ Running │           │
//!   └──────┘ ◀───────────────── └─────────┘ ◀─────────┘
//!       │                            │
//!       └──────── Terminate ─────────┴──▶ Terminating (thread exits)
//! ```
//!
//! While Idle the thread blocks on the command channel. While Running it
//! waits on the device in slices of at most `poll_slice`, draining commands
//! after every slice so host calls are picked up promptly.

use super::Command;
use super::schedule::ScheduleWindow;
use super::state::{PollerState, SharedState};
use super::tracker::FixTracker;
use crate::config::SignalUnits;
use crate::core::callbacks::CallbackSlot;
use crate::core::device::{GpsDevice, Readiness};
use crate::core::types::GpsStatusValue;
use crate::decode;
use crate::error::Result;
use crossbeam_channel::{Receiver, TryRecvError};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

/// Pause after a non-transient wait or read error
const ERROR_BACKOFF: Duration = Duration::from_millis(10);

pub(super) struct Worker<D: GpsDevice> {
    device: D,
    correction_factor: f64,
    signal_units: SignalUnits,
    poll_slice: Duration,
    shared: Arc<SharedState>,
    callbacks: CallbackSlot,
    commands: Receiver<Command>,
    window: ScheduleWindow,
    tracker: FixTracker,
    /// Receiver powered; outlives Running after a one-shot fix
    enabled: bool,
}

impl<D: GpsDevice> Worker<D> {
    pub(super) fn new(
        device: D,
        correction_factor: f64,
        signal_units: SignalUnits,
        poll_slice: Duration,
        shared: Arc<SharedState>,
        callbacks: CallbackSlot,
        commands: Receiver<Command>,
    ) -> Self {
        let window = ScheduleWindow::new(shared.fix_interval_ms());
        Self {
            device,
            correction_factor,
            signal_units,
            poll_slice,
            shared,
            callbacks,
            commands,
            window,
            tracker: FixTracker::new(),
            enabled: false,
        }
    }

    /// Run until terminated; the device is closed when this returns
    pub(super) fn run(mut self) {
        log::info!("GPS poller thread started");

        loop {
            match self.shared.state() {
                PollerState::Terminating => break,
                PollerState::Idle => match self.commands.recv() {
                    Ok(cmd) => self.handle(cmd),
                    Err(_) => {
                        log::warn!("Command channel closed, terminating poller");
                        self.handle(Command::Terminate);
                    }
                },
                PollerState::Running => self.poll_once(),
            }
        }

        log::info!("GPS poller thread exiting");
    }

    fn handle(&mut self, cmd: Command) {
        match cmd {
            Command::Start(reply) => {
                let _ = reply.send(self.start_session());
            }
            Command::Stop(reply) => {
                let stopped = self.is_active();
                if stopped {
                    self.stop_session();
                }
                let _ = reply.send(stopped);
            }
            Command::Terminate => {
                if self.is_active() {
                    self.stop_session();
                }
                self.shared.set_state(PollerState::Terminating);
            }
        }
    }

    fn start_session(&mut self) -> Result<()> {
        if self.shared.state() == PollerState::Running {
            log::debug!("Start requested while already running");
            return Ok(());
        }

        if !self.enabled {
            self.device.enable()?;
            self.enabled = true;
        }
        self.tracker.reset();
        self.callbacks.status(GpsStatusValue::SessionBegin);
        self.window.reset(self.shared.fix_interval_ms());
        self.shared.set_state(PollerState::Running);

        log::info!(
            "GPS session started (fix interval {} ms)",
            self.shared.fix_interval_ms()
        );
        Ok(())
    }

    /// Running, or idle after a one-shot fix with the receiver still on
    fn is_active(&self) -> bool {
        self.enabled || self.shared.state() == PollerState::Running
    }

    fn stop_session(&mut self) {
        self.shared.set_state(PollerState::Idle);
        self.enabled = false;
        if let Err(e) = self.device.disable() {
            log::warn!("Failed to disable GPS: {}", e);
        }
        self.callbacks.status(GpsStatusValue::EngineOff);
        log::info!("GPS session stopped");
    }

    /// Apply queued commands; returns false once the state leaves Running
    fn drain_commands(&mut self) -> bool {
        loop {
            match self.commands.try_recv() {
                Ok(cmd) => self.handle(cmd),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    log::warn!("Command channel closed, terminating poller");
                    self.handle(Command::Terminate);
                    break;
                }
            }
        }
        self.shared.state() == PollerState::Running
    }

    fn poll_once(&mut self) {
        if self.window.is_expired() {
            // No fix within the window: ask the receiver explicitly
            log::debug!("Schedule window elapsed, requesting new fix");
            if let Err(e) = self.device.request_new_fix() {
                log::warn!("New fix request failed: {}", e);
            }
            self.window.reset(self.shared.fix_interval_ms());
            return;
        }

        let slice = self.window.remaining().min(self.poll_slice);
        let before = Instant::now();
        let result = self.device.wait_readable(slice);
        self.window.consume(before.elapsed());

        if !self.drain_commands() {
            return;
        }

        match result {
            Ok(Readiness::TimedOut) => {
                log::trace!("Wait slice elapsed, {:?} left", self.window.remaining());
            }
            Ok(Readiness::Ready) => self.handle_ready(),
            Err(e) if e.is_transient() => {
                log::trace!("Wait interrupted, {:?} left", self.window.remaining());
            }
            Err(e) => {
                log::warn!("Device wait failed: {}", e);
                thread::sleep(ERROR_BACKOFF);
            }
        }
    }

    fn handle_ready(&mut self) {
        let record = match self.device.read_fix() {
            Ok(record) => record,
            Err(e) => {
                log::warn!("Fix read failed: {}", e);
                thread::sleep(ERROR_BACKOFF);
                return;
            }
        };

        let sv_status = decode::sv_status(&record, self.signal_units);
        log::trace!("Signal update: {} satellites", sv_status.num_svs());
        self.callbacks.sv_status(&sv_status);

        let Some(location) = self.tracker.accept(&record, self.correction_factor) else {
            return;
        };

        log::debug!(
            "New fix at t={}: {:.6}, {:.6}",
            record.time,
            location.latitude,
            location.longitude
        );
        self.callbacks.location(&location);
        self.window.reset(self.shared.fix_interval_ms());

        if self.shared.is_one_shot() {
            log::info!("One-shot fix delivered, going idle with receiver on");
            self.shared.set_state(PollerState::Idle);
        }
    }
}
