//! Constants for the Vogue kernel GPS driver

use crate::core::types::{DeviceInfo, FixRecord};

/// Device node created by the kernel driver
pub const DEFAULT_DEVICE_PATH: &str = "/dev/vogue_gps";

/// Protocol version this crate speaks
pub const GPS_VERSION: i32 = 1;

/// Satellite slots in one fix record
pub const MAX_SATELLITES: usize = 32;

/// Size of one fix record on the wire (268 bytes)
pub const FIX_RECORD_SIZE: usize = std::mem::size_of::<FixRecord>();

// Raw coordinates are degrees * SCALE * correction_factor
pub const COORDINATE_SCALE: f64 = 180_000.0;

/// Accuracy reported with every fix (meters)
pub const FIX_ACCURACY_M: f32 = 3.0;

// ioctl type byte
const GPS_IOC_MAGIC: u8 = b'G';

// ioctl command numbers
const VOGUE_GPS_ENABLE: u8 = 0;
const VOGUE_GPS_DISABLE: u8 = 1;
const VOGUE_GPS_NEW_FIX: u8 = 2;
const VOGUE_GPS_INFO: u8 = 3;

// asm-generic ioctl encoding: dir(2) | size(14) | type(8) | nr(8)
const IOC_NONE: u32 = 0;
const IOC_READ: u32 = 2;

const fn ioc(dir: u32, ty: u8, nr: u8, size: usize) -> u32 {
    (dir << 30) | ((size as u32) << 16) | ((ty as u32) << 8) | nr as u32
}

pub const VGPS_IOC_ENABLE: u32 = ioc(IOC_NONE, GPS_IOC_MAGIC, VOGUE_GPS_ENABLE, 0);
pub const VGPS_IOC_DISABLE: u32 = ioc(IOC_NONE, GPS_IOC_MAGIC, VOGUE_GPS_DISABLE, 0);
pub const VGPS_IOC_NEW_FIX: u32 = ioc(IOC_NONE, GPS_IOC_MAGIC, VOGUE_GPS_NEW_FIX, 0);
pub const VGPS_IOC_INFO: u32 = ioc(
    IOC_READ,
    GPS_IOC_MAGIC,
    VOGUE_GPS_INFO,
    std::mem::size_of::<DeviceInfo>(),
);
