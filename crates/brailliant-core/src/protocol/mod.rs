//! Display Protocol Communication
//!
//! Implements the Brailliant BI/B wire protocol over its two transports:
//! a framed serial link (`0x1B <id> <len> <payload>`) and a HID report
//! channel (tagged fixed-format reports).

pub mod channel;
mod error;
mod frame;
mod render;
mod report;
pub mod serial;
mod session;

pub use channel::Transport;
pub use error::ProtocolError;
pub use frame::{Frame, MessageId};
pub use render::{braille_output_report, display_frame};
pub use report::{InputReport, ReportTag, CELL_COUNT_OFFSET};
pub use serial::{list_ports, open_port, PortInfo, SerialChannel};
pub use session::{Candidate, Session, SessionConfig, SessionState, TransportKind};

/// Baud rate for the serial link
pub const BAUD_RATE: u32 = 115_200;

/// Frame header marker for the serial protocol
pub const HEADER: u8 = 0x1B;

/// Default timeout for handshake waits and reads in milliseconds.
/// The display answers INIT well within 200ms on both USB and bluetooth.
pub const DEFAULT_TIMEOUT_MS: u64 = 200;

/// Maximum frame payload size (length is a single byte on the wire)
pub const MAX_PAYLOAD_SIZE: usize = 255;
