//! Speed and bearing from two consecutive fixes
//!
//! Works on decoded degrees directly; no geodesic model. One degree of arc is
//! taken as 60 nautical miles and one nautical mile as 1853 m, which holds
//! near sea level and for short hops.
//!
//! # Bearing
//!
//! ```text
//! base = atan(|Δlat| / |Δlon|) in degrees, or 0 when Δlon == 0
//!
//!   Δlat >= 0, Δlon >= 0   base
//!   Δlat >= 0, Δlon <  0   base + 90
//!   Δlat <  0, Δlon <  0   base + 180
//!   Δlat <  0, Δlon >= 0   base + 270
//! ```
//!
//! This is not a compass bearing, and `Δlon == 0` yields 0 or 270 rather
//! than 0 or 180.
//!
//! Radians are converted with the exact `to_degrees()` factor rather than
//! the `360 / 6.282` approximation; the two differ by about 0.015%.

use crate::core::types::{DecodedPosition, Kinematics};

/// Nautical miles per degree of arc
const NM_PER_DEGREE: f64 = 60.0;

/// Meters per nautical mile
const METERS_PER_NM: f64 = 1853.0;

/// Derive speed and bearing
///
/// `elapsed` is in device timestamp units. Returns `None` when there is no
/// usable previous position (absent or exactly at the origin) or when no
/// time has passed.
pub fn estimate(
    current: &DecodedPosition,
    previous: Option<&DecodedPosition>,
    elapsed: u32,
) -> Option<Kinematics> {
    let previous = previous.filter(|p| !p.is_origin())?;
    if elapsed == 0 {
        return None;
    }

    let d_lat = current.latitude - previous.latitude;
    let d_lon = current.longitude - previous.longitude;

    let distance_deg = (d_lat * d_lat + d_lon * d_lon).sqrt();
    let speed = NM_PER_DEGREE * distance_deg / f64::from(elapsed) * METERS_PER_NM;

    Some(Kinematics {
        speed: speed as f32,
        bearing: bearing(d_lat, d_lon) as f32,
    })
}

fn bearing(d_lat: f64, d_lon: f64) -> f64 {
    let mut bearing = if d_lon != 0.0 {
        (d_lat.abs() / d_lon.abs()).atan().to_degrees()
    } else {
        0.0
    };

    if d_lat < 0.0 {
        if d_lon < 0.0 {
            bearing += 180.0;
        } else {
            bearing += 270.0;
        }
    } else if d_lon < 0.0 {
        bearing += 90.0;
    }

    if bearing >= 360.0 {
        bearing -= 360.0;
    }
    bearing
}
