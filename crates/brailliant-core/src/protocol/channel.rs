//! Transport abstraction
//!
//! Narrow collaborator interface over the raw serial/HID I/O. The session
//! only ever talks to a [`Transport`]; concrete byte-level I/O (a serial
//! port, a HID handle) lives behind this boundary.

use std::io;
use std::time::Duration;

/// Abstraction over the byte-level transport carrying the display protocol
pub trait Transport: Send {
    /// Write raw bytes to the device
    fn write(&mut self, data: &[u8]) -> io::Result<()>;

    /// Block until input is available or the timeout elapses.
    /// Returns `true` if there is data to read.
    fn wait_for_data(&mut self, timeout: Duration) -> io::Result<bool>;

    /// Read exactly `buf.len()` bytes
    fn read_exact(&mut self, buf: &mut [u8]) -> io::Result<()>;

    /// Read up to `buf.len()` bytes, returning the number read.
    /// Used for whole-report reads on the HID path.
    fn read_available(&mut self, buf: &mut [u8]) -> io::Result<usize>;

    /// Fetch a feature report by report id (HID transports only)
    fn get_feature_report(&mut self, report_id: u8) -> io::Result<Vec<u8>>;

    /// Close the underlying device handle. Must be idempotent; the session
    /// calls this on every teardown path, including failed handshakes.
    fn close(&mut self) -> io::Result<()>;
}
