//! Configuration for vogue-gps
//!
//! Loads configuration from a TOML file. Every section is optional and falls
//! back to the values the Vogue driver shipped with.

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Top-level configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct GpsConfig {
    #[serde(default)]
    pub device: DeviceConfig,
    #[serde(default)]
    pub polling: PollingConfig,
    #[serde(default)]
    pub signal: SignalConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Device node settings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DeviceConfig {
    /// Character device path
    #[serde(default = "default_device_path")]
    pub path: String,

    /// Protocol version the driver must report
    #[serde(default = "default_expected_version")]
    pub expected_version: i32,

    /// Use the in-memory mock device instead of `path` (monitor binary only)
    #[serde(default)]
    pub mock: bool,
}

/// Poller timing
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PollingConfig {
    /// Initial fix interval in milliseconds (0 = one-shot)
    #[serde(default = "default_fix_interval_ms")]
    pub fix_interval_ms: u32,

    /// Lower bound applied to `set_fix_frequency`, disabled when absent
    #[serde(default)]
    pub min_fix_interval_ms: Option<u32>,

    /// Longest single readiness wait before the worker re-checks commands
    #[serde(default = "default_poll_slice_ms")]
    pub poll_slice_ms: u64,
}

/// Units delivered in `SvInfo::snr`
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SignalUnits {
    /// Raw device signal strength
    Raw,
    /// `raw / full_scale`, clamped to [0, 1]
    Normalized { full_scale: f32 },
}

/// Satellite signal reporting
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SignalConfig {
    /// Scale signal strengths into [0, 1] instead of passing raw values
    #[serde(default)]
    pub normalize: bool,

    /// Raw value that maps to 1.0 when `normalize` is set
    #[serde(default = "default_full_scale")]
    pub full_scale: f32,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_device_path() -> String {
    crate::device::DEFAULT_DEVICE_PATH.to_string()
}

fn default_expected_version() -> i32 {
    crate::device::GPS_VERSION
}

fn default_fix_interval_ms() -> u32 {
    60_000
}

fn default_poll_slice_ms() -> u64 {
    100
}

fn default_full_scale() -> f32 {
    64.0
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            path: default_device_path(),
            expected_version: default_expected_version(),
            mock: false,
        }
    }
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            fix_interval_ms: default_fix_interval_ms(),
            min_fix_interval_ms: None,
            poll_slice_ms: default_poll_slice_ms(),
        }
    }
}

impl Default for SignalConfig {
    fn default() -> Self {
        Self {
            normalize: false,
            full_scale: default_full_scale(),
        }
    }
}

impl SignalConfig {
    /// Units the poller reports satellite signal strength in
    pub fn units(&self) -> SignalUnits {
        if self.normalize {
            SignalUnits::Normalized {
                full_scale: self.full_scale,
            }
        } else {
            SignalUnits::Raw
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl PollingConfig {
    /// Apply the optional minimum clamp to a requested fix interval
    pub fn clamp_interval(&self, interval_ms: u32) -> u32 {
        match self.min_fix_interval_ms {
            Some(min) => interval_ms.max(min),
            None => interval_ms,
        }
    }
}

impl GpsConfig {
    /// Load configuration from TOML file
    ///
    /// # Example
    /// ```no_run
    /// use vogue_gps::config::GpsConfig;
    ///
    /// let config = GpsConfig::from_file("vogue-gps.toml")?;
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config: GpsConfig = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to TOML file
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let contents = toml::to_string_pretty(self)?;
        fs::write(path, contents)?;
        Ok(())
    }

    /// Reject values the poller cannot work with
    pub fn validate(&self) -> Result<()> {
        if self.polling.poll_slice_ms == 0 {
            return Err(crate::Error::Config(
                "polling.poll_slice_ms must be greater than zero".to_string(),
            ));
        }
        if self.signal.normalize && self.signal.full_scale <= 0.0 {
            return Err(crate::Error::Config(format!(
                "signal.full_scale must be positive, got {}",
                self.signal.full_scale
            )));
        }
        Ok(())
    }
}
