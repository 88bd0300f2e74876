//! Fix record decoding
//!
//! Turns the kernel's `struct gps_state` into host units:
//!
//! ```text
//! offset  size  field
//! 0       4     lat   (i32, degrees * 180000 * correction_factor)
//! 4       4     lng   (i32, same scale)
//! 8       4     time  (u32, device fix timestamp)
//! 12      256   sat_state[32] { sat_no: i32, signal_strength: i32 }
//! ```
//!
//! All fields are native-endian, matching the kernel that produced them.
//! Any full-size buffer decodes; there is no checksum.

use crate::config::SignalUnits;
use crate::core::types::{DecodedPosition, FixRecord, SatelliteState, SvInfo, SvStatus};
use crate::device::constants::{COORDINATE_SCALE, FIX_ACCURACY_M, FIX_RECORD_SIZE, MAX_SATELLITES};
use crate::error::{Error, Result};

const OFFSET_LAT: usize = 0;
const OFFSET_LNG: usize = 4;
const OFFSET_TIME: usize = 8;
const OFFSET_SATS: usize = 12;
const SAT_ENTRY_SIZE: usize = 8;

#[inline]
fn read_i32(buf: &[u8], offset: usize) -> i32 {
    i32::from_ne_bytes([
        buf[offset],
        buf[offset + 1],
        buf[offset + 2],
        buf[offset + 3],
    ])
}

impl FixRecord {
    /// Parse one record from device bytes
    ///
    /// Fails with [`Error::ReadError`] when fewer than
    /// [`FIX_RECORD_SIZE`] bytes are available.
    pub fn from_bytes(buf: &[u8]) -> Result<Self> {
        if buf.len() < FIX_RECORD_SIZE {
            return Err(Error::ReadError(format!(
                "short read: {} of {} bytes",
                buf.len(),
                FIX_RECORD_SIZE
            )));
        }

        let mut record = FixRecord::new(
            read_i32(buf, OFFSET_LAT),
            read_i32(buf, OFFSET_LNG),
            read_i32(buf, OFFSET_TIME) as u32,
        );
        for (i, slot) in record.sat_state.iter_mut().enumerate() {
            let base = OFFSET_SATS + i * SAT_ENTRY_SIZE;
            *slot = SatelliteState {
                sat_no: read_i32(buf, base),
                signal_strength: read_i32(buf, base + 4),
            };
        }
        Ok(record)
    }

    /// Encode in device layout
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(FIX_RECORD_SIZE);
        buf.extend_from_slice(&self.lat.to_ne_bytes());
        buf.extend_from_slice(&self.lng.to_ne_bytes());
        buf.extend_from_slice(&self.time.to_ne_bytes());
        for sat in &self.sat_state {
            buf.extend_from_slice(&sat.sat_no.to_ne_bytes());
            buf.extend_from_slice(&sat.signal_strength.to_ne_bytes());
        }
        buf
    }
}

/// Convert a raw record to degrees
pub fn decode(record: &FixRecord, correction_factor: f64) -> DecodedPosition {
    DecodedPosition {
        latitude: f64::from(record.lat) / COORDINATE_SCALE / correction_factor,
        longitude: f64::from(record.lng) / COORDINATE_SCALE / correction_factor,
        accuracy: FIX_ACCURACY_M,
        timestamp: record.time,
    }
}

/// Build the satellite visibility report for a record
pub fn sv_status(record: &FixRecord, units: SignalUnits) -> SvStatus {
    let mut sv_list = Vec::with_capacity(MAX_SATELLITES);
    for sat in record.satellites() {
        let snr = match units {
            SignalUnits::Raw => sat.signal_strength as f32,
            SignalUnits::Normalized { full_scale } => {
                (sat.signal_strength as f32 / full_scale).clamp(0.0, 1.0)
            }
        };
        sv_list.push(SvInfo {
            prn: sat.sat_no,
            snr,
        });
    }
    SvStatus { sv_list }
}
