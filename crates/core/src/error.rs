//! Error type shared by discovery, scan resolution and the sensor runtimes

use iio_sens_types::Status;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum HalError {
    #[error("failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse {what} from {path}: {value:?}")]
    Parse {
        what: &'static str,
        path: PathBuf,
        value: String,
    },

    #[error("no sampling frequencies available in {0}")]
    NoSamplingFrequencies(PathBuf),

    #[error("no scale attribute found in {0}")]
    NoScale(PathBuf),

    #[error("invalid scan type {value:?} for channel {channel}")]
    InvalidScanType { channel: String, value: String },

    #[error("{device}: expected {expected} scan channels, found {found}")]
    ChannelCountMismatch {
        device: String,
        expected: usize,
        found: usize,
    },

    #[error("{device}: channel {channel} has index {index}, maximum is {max}")]
    ChannelIndexOutOfRange {
        device: String,
        channel: String,
        index: u8,
        max: usize,
    },

    #[error("{device}: more than one channel uses scan index {index}")]
    DuplicateChannelIndex { device: String, index: u8 },

    #[error("{device}: sensor type {sensor_type} has no physical layout")]
    UnsupportedSensorType { device: String, sensor_type: String },

    #[error("record of {len} bytes too short for channel {channel} at {start}..{end}")]
    RecordTooShort {
        channel: String,
        start: usize,
        end: usize,
        len: usize,
    },

    #[error("bad value: {0}")]
    BadValue(String),

    #[error("invalid operation: {0}")]
    InvalidOperation(String),
}

impl HalError {
    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        HalError::Io {
            path: path.into(),
            source,
        }
    }

    /// Result code handed to the HAL shim for this error
    pub fn status(&self) -> Status {
        match self {
            HalError::InvalidOperation(_) => Status::InvalidOperation,
            _ => Status::BadValue,
        }
    }
}

pub type Result<T> = std::result::Result<T, HalError>;

/// Collapse an operation result into the shim's result code
pub fn status_of(result: &Result<()>) -> Status {
    match result {
        Ok(()) => Status::Ok,
        Err(e) => e.status(),
    }
}
