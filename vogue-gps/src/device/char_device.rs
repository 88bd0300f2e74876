//! Character device implementation over `/dev/vogue_gps`

use super::constants::{
    FIX_RECORD_SIZE, VGPS_IOC_DISABLE, VGPS_IOC_ENABLE, VGPS_IOC_INFO, VGPS_IOC_NEW_FIX,
};
use crate::core::device::{GpsDevice, Readiness};
use crate::core::types::{DeviceInfo, FixRecord};
use crate::error::{Error, Result};
use std::fs::{File, OpenOptions};
use std::io::{self, Read};
use std::os::unix::io::{AsRawFd, RawFd};
use std::time::Duration;

/// Kernel GPS character device
///
/// The file descriptor is closed when the value is dropped.
pub struct CharDevice {
    file: File,
    path: String,
}

impl CharDevice {
    /// Open the device node read/write
    pub fn open(path: &str) -> Result<Self> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .open(path)
            .map_err(|source| Error::DeviceUnavailable {
                path: path.to_string(),
                source,
            })?;

        log::info!("Opened GPS device: {}", path);
        Ok(Self {
            file,
            path: path.to_string(),
        })
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    fn fd(&self) -> RawFd {
        self.file.as_raw_fd()
    }

    /// Issue an argument-less control request
    fn control(&self, op: &'static str, request: u32) -> Result<()> {
        // SAFETY: fd is owned by self.file and stays open for the call;
        // these requests take no argument.
        let rc = unsafe { libc::ioctl(self.fd(), request as _) };
        if rc < 0 {
            return Err(Error::DeviceError {
                op,
                source: io::Error::last_os_error(),
            });
        }
        log::trace!("ioctl {} ok", op);
        Ok(())
    }
}

impl GpsDevice for CharDevice {
    fn query_info(&mut self) -> Result<DeviceInfo> {
        let mut info = DeviceInfo::default();
        // SAFETY: VGPS_IOC_INFO writes one `struct gps_info`, which DeviceInfo
        // mirrors with #[repr(C)].
        let rc = unsafe {
            libc::ioctl(
                self.fd(),
                VGPS_IOC_INFO as _,
                &mut info as *mut DeviceInfo,
            )
        };
        if rc < 0 {
            return Err(Error::DeviceError {
                op: "info",
                source: io::Error::last_os_error(),
            });
        }
        Ok(info)
    }

    fn enable(&mut self) -> Result<()> {
        self.control("enable", VGPS_IOC_ENABLE)
    }

    fn disable(&mut self) -> Result<()> {
        self.control("disable", VGPS_IOC_DISABLE)
    }

    fn request_new_fix(&mut self) -> Result<()> {
        self.control("new_fix", VGPS_IOC_NEW_FIX)
    }

    fn wait_readable(&mut self, timeout: Duration) -> Result<Readiness> {
        let mut pfd = libc::pollfd {
            fd: self.fd(),
            events: libc::POLLIN,
            revents: 0,
        };
        let timeout_ms = timeout.as_millis().min(libc::c_int::MAX as u128) as libc::c_int;

        // SAFETY: pfd is a valid pollfd for the duration of the call.
        let rc = unsafe { libc::poll(&mut pfd, 1, timeout_ms) };
        if rc < 0 {
            let err = io::Error::last_os_error();
            if err.kind() == io::ErrorKind::Interrupted {
                return Err(Error::Interrupted);
            }
            return Err(Error::Io(err));
        }

        if rc == 0 {
            Ok(Readiness::TimedOut)
        } else if pfd.revents & (libc::POLLERR | libc::POLLNVAL) != 0 {
            Err(Error::Io(io::Error::other(format!(
                "poll reported revents={:#x}",
                pfd.revents
            ))))
        } else {
            Ok(Readiness::Ready)
        }
    }

    fn read_fix(&mut self) -> Result<FixRecord> {
        let mut buf = [0u8; FIX_RECORD_SIZE];
        let n = loop {
            match self.file.read(&mut buf) {
                Ok(n) => break n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(Error::ReadError(e.to_string())),
            }
        };
        FixRecord::from_bytes(&buf[..n])
    }
}

impl Drop for CharDevice {
    fn drop(&mut self) {
        log::info!("Closing GPS device: {}", self.path);
    }
}
