//! Mock device for testing
//!
//! [`MockDevice`] is handed to the poller; the paired [`MockControl`] stays
//! with the test to inject records and inspect the control requests issued.

use crate::core::device::{GpsDevice, Readiness};
use crate::core::types::{DeviceInfo, FixRecord};
use crate::device::constants::GPS_VERSION;
use crate::error::{Error, Result};
use parking_lot::{Condvar, Mutex};
use std::collections::VecDeque;
use std::io;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

/// Operations recorded by the mock
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceOp {
    QueryInfo,
    Enable,
    Disable,
    RequestNewFix,
    Read,
}

struct MockState {
    info: DeviceInfo,
    pending: VecDeque<Vec<u8>>,
    ops: Vec<(DeviceOp, Instant)>,
    fail_enable: bool,
    interrupt_waits: Option<Duration>,
    closed: bool,
}

struct MockShared {
    state: Mutex<MockState>,
    changed: Condvar,
}

/// In-memory GPS device
pub struct MockDevice {
    shared: Arc<MockShared>,
}

/// Test-side handle to a [`MockDevice`]
#[derive(Clone)]
pub struct MockControl {
    shared: Arc<MockShared>,
}

impl MockDevice {
    /// Create a device reporting the expected version and a correction factor of 1.0
    pub fn new() -> (Self, MockControl) {
        let device = Self::with_info(DeviceInfo {
            version: GPS_VERSION,
            correction_factor: 1.0,
        });
        let control = device.control();
        (device, control)
    }

    /// Create a device reporting `info` from the info request
    pub fn with_info(info: DeviceInfo) -> Self {
        Self {
            shared: Arc::new(MockShared {
                state: Mutex::new(MockState {
                    info,
                    pending: VecDeque::new(),
                    ops: Vec::new(),
                    fail_enable: false,
                    interrupt_waits: None,
                    closed: false,
                }),
                changed: Condvar::new(),
            }),
        }
    }

    /// Get a control handle for this device
    pub fn control(&self) -> MockControl {
        MockControl {
            shared: Arc::clone(&self.shared),
        }
    }

    fn record(&self, op: DeviceOp) {
        let mut state = self.shared.state.lock();
        state.ops.push((op, Instant::now()));
        self.shared.changed.notify_all();
    }
}

impl MockControl {
    /// Queue a fix record for the next read
    pub fn inject_fix(&self, record: FixRecord) {
        self.inject_raw(record.to_bytes());
    }

    /// Queue raw bytes for the next read (short buffers produce read errors)
    pub fn inject_raw(&self, bytes: Vec<u8>) {
        let mut state = self.shared.state.lock();
        state.pending.push_back(bytes);
        self.shared.changed.notify_all();
    }

    /// Make `enable()` fail with a device error
    pub fn set_fail_enable(&self, fail: bool) {
        self.shared.state.lock().fail_enable = fail;
    }

    /// Make every wait return `Interrupted` after `after`
    pub fn set_interrupt_waits(&self, after: Option<Duration>) {
        self.shared.state.lock().interrupt_waits = after;
    }

    /// All recorded operations in order
    pub fn ops(&self) -> Vec<DeviceOp> {
        self.shared.state.lock().ops.iter().map(|(op, _)| *op).collect()
    }

    /// Recorded operations with the instant they happened
    pub fn timed_ops(&self) -> Vec<(DeviceOp, Instant)> {
        self.shared.state.lock().ops.clone()
    }

    /// Number of times `op` was issued
    pub fn count(&self, op: DeviceOp) -> usize {
        self.shared
            .state
            .lock()
            .ops
            .iter()
            .filter(|(o, _)| *o == op)
            .count()
    }

    /// Records not yet read
    pub fn pending(&self) -> usize {
        self.shared.state.lock().pending.len()
    }

    /// True once the device has been dropped by its owner
    pub fn is_closed(&self) -> bool {
        self.shared.state.lock().closed
    }

    /// Block until `op` has been issued `count` times or `timeout` elapses
    pub fn wait_for(&self, op: DeviceOp, count: usize, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        let mut state = self.shared.state.lock();
        loop {
            if state.ops.iter().filter(|(o, _)| *o == op).count() >= count {
                return true;
            }
            if self
                .shared
                .changed
                .wait_until(&mut state, deadline)
                .timed_out()
            {
                return state.ops.iter().filter(|(o, _)| *o == op).count() >= count;
            }
        }
    }

    /// Block until every queued record has been read or `timeout` elapses
    pub fn wait_drained(&self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        let mut state = self.shared.state.lock();
        while !state.pending.is_empty() {
            if self
                .shared
                .changed
                .wait_until(&mut state, deadline)
                .timed_out()
            {
                return state.pending.is_empty();
            }
        }
        true
    }
}

impl GpsDevice for MockDevice {
    fn query_info(&mut self) -> Result<DeviceInfo> {
        self.record(DeviceOp::QueryInfo);
        Ok(self.shared.state.lock().info)
    }

    fn enable(&mut self) -> Result<()> {
        if self.shared.state.lock().fail_enable {
            return Err(Error::DeviceError {
                op: "enable",
                source: io::Error::from_raw_os_error(libc::EIO),
            });
        }
        self.record(DeviceOp::Enable);
        Ok(())
    }

    fn disable(&mut self) -> Result<()> {
        self.record(DeviceOp::Disable);
        Ok(())
    }

    fn request_new_fix(&mut self) -> Result<()> {
        self.record(DeviceOp::RequestNewFix);
        Ok(())
    }

    fn wait_readable(&mut self, timeout: Duration) -> Result<Readiness> {
        let interrupt = self.shared.state.lock().interrupt_waits;
        if let Some(after) = interrupt {
            thread::sleep(after.min(timeout));
            return Err(Error::Interrupted);
        }

        let deadline = Instant::now() + timeout;
        let mut state = self.shared.state.lock();
        while state.pending.is_empty() {
            if self
                .shared
                .changed
                .wait_until(&mut state, deadline)
                .timed_out()
            {
                break;
            }
        }

        if state.pending.is_empty() {
            Ok(Readiness::TimedOut)
        } else {
            Ok(Readiness::Ready)
        }
    }

    fn read_fix(&mut self) -> Result<FixRecord> {
        let bytes = {
            let mut state = self.shared.state.lock();
            state.ops.push((DeviceOp::Read, Instant::now()));
            let bytes = state.pending.pop_front();
            self.shared.changed.notify_all();
            bytes
        };

        match bytes {
            Some(bytes) => FixRecord::from_bytes(&bytes),
            None => Err(Error::ReadError("no record available".to_string())),
        }
    }
}

impl Drop for MockDevice {
    fn drop(&mut self) {
        let mut state = self.shared.state.lock();
        state.closed = true;
        self.shared.changed.notify_all();
    }
}
