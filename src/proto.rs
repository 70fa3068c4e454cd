pub mod codec;
pub mod command;

#[cfg(test)]
pub mod fake;

use std::time::Duration;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("invalid address '{0}': expected an IP address (e.g. 192.168.0.2) or COM port (e.g. COM3)")]
    InvalidAddress(String),

    #[error("{0}")]
    InvalidArgument(String),

    #[error("not connected, call connect() first")]
    NotConnected,

    #[error("I/O error: {:?}", _0)]
    Io(#[from] std::io::Error),

    #[error("Serial I/O error: {:?}", _0)]
    Serial(#[from] tokio_serial::Error),

    #[error("instrument did not respond within {0:?}")]
    Timeout(Duration),

    #[error("protocol error: {0}")]
    Protocol(String),

    #[error("instrument error {code}: {message}")]
    Instrument { code: i32, message: String },

    #[error("range overflow (reading {0:E}): use a wider range or check probe connections")]
    Overflow(f64),
}

pub type Result<T> = std::result::Result<T, Error>;
