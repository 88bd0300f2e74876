//! Error types for vogue-gps

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// vogue-gps error types
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Device node could not be opened
    #[error("GPS device unavailable at {path}: {source}")]
    DeviceUnavailable {
        /// Device node path
        path: String,
        /// Underlying OS error
        source: std::io::Error,
    },

    /// Kernel driver speaks a different protocol version
    #[error("GPS protocol mismatch: expected version {expected}, device reports {actual}")]
    ProtocolMismatch {
        /// Version compiled into this crate
        expected: i32,
        /// Version reported by the driver
        actual: i32,
    },

    /// Control request (ioctl) failed
    #[error("GPS control request {op} failed: {source}")]
    DeviceError {
        /// Name of the control request
        op: &'static str,
        /// Underlying OS error
        source: std::io::Error,
    },

    /// Fix record could not be read
    #[error("Fix read failed: {0}")]
    ReadError(String),

    /// Wait or read interrupted by a signal, safe to retry
    #[error("Interrupted system call")]
    Interrupted,

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Poller has been torn down by `cleanup()`
    #[error("GPS poller terminated")]
    Terminated,

    /// Worker thread panicked
    #[error("Thread panicked")]
    ThreadPanic,

    /// Generic error with message
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// True for failures that are absorbed by retrying the same operation
    pub fn is_transient(&self) -> bool {
        match self {
            Error::Interrupted => true,
            Error::Io(e) => e.kind() == std::io::ErrorKind::Interrupted,
            _ => false,
        }
    }
}

impl From<toml::de::Error> for Error {
    fn from(e: toml::de::Error) -> Self {
        Error::Config(e.to_string())
    }
}

impl From<toml::ser::Error> for Error {
    fn from(e: toml::ser::Error) -> Self {
        Error::Config(e.to_string())
    }
}
