//! Core data types for fix records, decoded positions and host callbacks.
//!
//! Device side:
//! - [`FixRecord`]: One raw record as read from the character device
//! - [`DeviceInfo`]: Answer to the info control request
//!
//! Host side:
//! - [`GpsLocation`], [`SvStatus`], [`GpsStatusValue`]: Callback payloads

use crate::device::constants::MAX_SATELLITES;
use std::ops::BitOr;

/// Milliseconds since the Unix epoch, as used by the host framework
pub type GpsUtcTime = i64;

/// One (satellite id, signal strength) slot of a fix record
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[repr(C)]
pub struct SatelliteState {
    /// Satellite PRN, zero terminates the list
    pub sat_no: i32,
    /// Signal strength in raw device units
    pub signal_strength: i32,
}

/// Raw fix record (kernel `struct gps_state`)
///
/// Latitude and longitude are scaled integers; see [`crate::decode`] for the
/// conversion to degrees.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(C)]
pub struct FixRecord {
    pub lat: i32,
    pub lng: i32,
    /// Device fix timestamp, unchanged between records that only carry new
    /// signal data
    pub time: u32,
    pub sat_state: [SatelliteState; MAX_SATELLITES],
}

impl FixRecord {
    /// Create a record with no visible satellites
    pub fn new(lat: i32, lng: i32, time: u32) -> Self {
        Self {
            lat,
            lng,
            time,
            sat_state: [SatelliteState::default(); MAX_SATELLITES],
        }
    }

    /// Fill the satellite slots from `(sat_no, signal_strength)` pairs
    ///
    /// Pairs beyond [`MAX_SATELLITES`] are dropped.
    pub fn with_satellites(mut self, sats: &[(i32, i32)]) -> Self {
        for (slot, &(sat_no, signal_strength)) in self.sat_state.iter_mut().zip(sats) {
            *slot = SatelliteState {
                sat_no,
                signal_strength,
            };
        }
        self
    }

    /// Visible satellites, stopping at the first zero id
    pub fn satellites(&self) -> impl Iterator<Item = &SatelliteState> {
        self.sat_state.iter().take_while(|s| s.sat_no != 0)
    }
}

/// Device info (kernel `struct gps_info`)
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[repr(C)]
pub struct DeviceInfo {
    pub version: i32,
    /// Divisor applied to scaled coordinates after the fixed scale
    pub correction_factor: f64,
}

/// Fix position converted to degrees
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DecodedPosition {
    pub latitude: f64,
    pub longitude: f64,
    /// Estimated accuracy in meters
    pub accuracy: f32,
    /// Device fix timestamp
    pub timestamp: u32,
}

impl DecodedPosition {
    /// True for exactly (0, 0), which doubles as "no previous fix"
    pub fn is_origin(&self) -> bool {
        self.latitude == 0.0 && self.longitude == 0.0
    }
}

/// Speed and bearing derived from two consecutive positions
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Kinematics {
    /// Meters per second
    pub speed: f32,
    /// Degrees in [0, 360)
    pub bearing: f32,
}

/// Validity flags of a [`GpsLocation`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LocationFlags(u16);

impl LocationFlags {
    pub const HAS_LAT_LONG: Self = Self(0x0001);
    pub const HAS_ALTITUDE: Self = Self(0x0002);
    pub const HAS_SPEED: Self = Self(0x0004);
    pub const HAS_BEARING: Self = Self(0x0008);
    pub const HAS_ACCURACY: Self = Self(0x0010);

    /// No fields valid
    pub const fn empty() -> Self {
        Self(0)
    }

    pub const fn bits(self) -> u16 {
        self.0
    }

    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn insert(&mut self, other: Self) {
        self.0 |= other.0;
    }
}

impl BitOr for LocationFlags {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

/// Location delivered to the host
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct GpsLocation {
    pub flags: LocationFlags,
    /// Degrees
    pub latitude: f64,
    /// Degrees
    pub longitude: f64,
    /// Meters above the WGS84 ellipsoid (never reported by this device)
    pub altitude: f64,
    /// Meters per second
    pub speed: f32,
    /// Degrees
    pub bearing: f32,
    /// Meters
    pub accuracy: f32,
    pub timestamp: GpsUtcTime,
}

impl GpsLocation {
    /// Build a location from a decoded position and optional kinematics
    pub fn from_fix(position: &DecodedPosition, kinematics: Option<Kinematics>) -> Self {
        let mut location = Self {
            flags: LocationFlags::HAS_LAT_LONG | LocationFlags::HAS_ACCURACY,
            latitude: position.latitude,
            longitude: position.longitude,
            accuracy: position.accuracy,
            timestamp: GpsUtcTime::from(position.timestamp),
            ..Self::default()
        };

        if let Some(k) = kinematics {
            location.speed = k.speed;
            location.bearing = k.bearing;
            location.flags.insert(LocationFlags::HAS_SPEED);
            location.flags.insert(LocationFlags::HAS_BEARING);
        }

        location
    }
}

/// One satellite in a visibility report
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SvInfo {
    /// Pseudo-random noise number (satellite id)
    pub prn: i32,
    /// Signal strength, raw or normalized depending on configuration
    pub snr: f32,
}

/// Satellite visibility report
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SvStatus {
    pub sv_list: Vec<SvInfo>,
}

impl SvStatus {
    /// Number of satellites in view
    pub fn num_svs(&self) -> usize {
        self.sv_list.len()
    }
}

/// Engine and session status reported to the host
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GpsStatusValue {
    SessionBegin,
    EngineOn,
    EngineOff,
}

/// Positioning mode requested by the host (accepted, not acted on)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PositionMode {
    Standalone,
    MsBased,
    MsAssisted,
}

/// Aiding data categories the host may ask to delete (accepted, not acted on)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AidingData(pub u16);

impl AidingData {
    pub const EPHEMERIS: Self = Self(0x0001);
    pub const ALMANAC: Self = Self(0x0002);
    pub const POSITION: Self = Self(0x0004);
    pub const TIME: Self = Self(0x0008);
    pub const ALL: Self = Self(0xFFFF);
}
