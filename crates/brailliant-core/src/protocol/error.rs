//! Protocol errors

use thiserror::Error;

/// Errors that can occur during protocol communication
#[derive(Error, Debug)]
pub enum ProtocolError {
    #[error("Serial port error: {0}")]
    SerialError(String),

    #[error("Timed out waiting for the display")]
    Timeout,

    #[error("Not connected to a display")]
    NotConnected,

    #[error("Display not ready: {0}")]
    NotReady(String),

    #[error("Frame payload too large: {0} bytes (max 255)")]
    PayloadTooLarge(usize),

    #[error("Invalid frame: {0}")]
    InvalidFrame(String),

    #[error("No display found")]
    NoDisplayFound,

    #[error("Operation not supported on this transport: {0}")]
    Unsupported(&'static str),

    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}
