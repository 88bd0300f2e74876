//! Last-fix bookkeeping for one session

use crate::core::types::{DecodedPosition, FixRecord, GpsLocation};
use crate::decode::decode;
use crate::kinematics;

/// Tracks the last emitted fix to detect new fixes and derive kinematics
#[derive(Debug, Default)]
pub struct FixTracker {
    last_time: Option<u32>,
    last_position: Option<DecodedPosition>,
}

impl FixTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Forget the previous fix (called on every session start)
    pub fn reset(&mut self) {
        self.last_time = None;
        self.last_position = None;
    }

    /// Build a location if `record` carries a new fix
    ///
    /// A record whose timestamp equals the last emitted one only refreshes
    /// signal data and yields `None`.
    pub fn accept(&mut self, record: &FixRecord, correction_factor: f64) -> Option<GpsLocation> {
        if self.last_time == Some(record.time) {
            return None;
        }

        let elapsed = self
            .last_time
            .map(|t| record.time.wrapping_sub(t))
            .unwrap_or(0);
        let position = decode(record, correction_factor);
        let kinematics = kinematics::estimate(&position, self.last_position.as_ref(), elapsed);

        self.last_time = Some(record.time);
        self.last_position = Some(position);

        Some(GpsLocation::from_fix(&position, kinematics))
    }
}
