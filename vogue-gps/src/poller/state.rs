//! Poller state shared between the host and the worker thread
//!
//! The worker writes the state while it runs; the host writes the fix
//! interval. Both are atomics so reads never block on the worker.

use std::sync::atomic::{AtomicU8, AtomicU32, Ordering};

/// Worker lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum PollerState {
    /// Not polling the device
    Idle = 0,
    /// Waiting for and reading fixes
    Running = 1,
    /// Worker has exited or is exiting; absorbing
    Terminating = 2,
}

impl PollerState {
    fn from_u8(v: u8) -> Self {
        match v {
            0 => PollerState::Idle,
            1 => PollerState::Running,
            _ => PollerState::Terminating,
        }
    }
}

/// State visible to both sides
#[derive(Debug)]
pub struct SharedState {
    state: AtomicU8,
    fix_interval_ms: AtomicU32,
}

impl SharedState {
    pub fn new(fix_interval_ms: u32) -> Self {
        Self {
            state: AtomicU8::new(PollerState::Idle as u8),
            fix_interval_ms: AtomicU32::new(fix_interval_ms),
        }
    }

    pub fn state(&self) -> PollerState {
        PollerState::from_u8(self.state.load(Ordering::Acquire))
    }

    /// Terminating is never left once entered
    pub fn set_state(&self, next: PollerState) {
        let _ = self
            .state
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |current| {
                if current == PollerState::Terminating as u8 {
                    None
                } else {
                    Some(next as u8)
                }
            });
    }

    pub fn fix_interval_ms(&self) -> u32 {
        self.fix_interval_ms.load(Ordering::Relaxed)
    }

    pub fn set_fix_interval_ms(&self, interval_ms: u32) {
        self.fix_interval_ms.store(interval_ms, Ordering::Relaxed);
    }

    /// Zero interval means deliver one fix then go idle
    pub fn is_one_shot(&self) -> bool {
        self.fix_interval_ms() == 0
    }
}
