//! Session management
//!
//! Owns one active transport, negotiates the cell count, and turns the
//! incoming frame/report stream into finalized key combinations.

use std::collections::BTreeSet;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::input::{GestureConsumer, GestureOutcome, KeyCombination, KeyNameTable, KeyTracker};

use super::channel::Transport;
use super::frame::{Frame, MessageId};
use super::render::{braille_output_report, display_frame};
use super::report::{InputReport, ReportTag};
use super::{ProtocolError, DEFAULT_TIMEOUT_MS};

/// Read buffer size for whole-report HID reads
const HID_REPORT_BUF: usize = 64;

/// Which wire encoding the active transport speaks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransportKind {
    /// Framed serial link (`0x1B`-headed messages)
    Framed,
    /// HID report channel
    Hid,
}

/// Session lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionState {
    /// Handshake in progress
    Connecting,
    /// Negotiated and ready
    Connected,
    /// Closed; the transport handle has been released
    Closed,
}

/// Session configuration
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Handshake/read timeout in milliseconds
    pub timeout_ms: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            timeout_ms: DEFAULT_TIMEOUT_MS,
        }
    }
}

/// One device/port candidate, in caller preference order
pub struct Candidate {
    /// Wire encoding this candidate speaks
    pub kind: TransportKind,
    /// Human-readable label for logging (typically the port name)
    pub label: String,
    /// The transport handle to try
    pub transport: Box<dyn Transport>,
}

impl Candidate {
    /// A framed serial candidate
    pub fn framed(label: impl Into<String>, transport: Box<dyn Transport>) -> Self {
        Self {
            kind: TransportKind::Framed,
            label: label.into(),
            transport,
        }
    }

    /// A HID candidate
    pub fn hid(label: impl Into<String>, transport: Box<dyn Transport>) -> Self {
        Self {
            kind: TransportKind::Hid,
            label: label.into(),
            transport,
        }
    }
}

/// An open display session.
///
/// Created by [`Session::open`] once a candidate transport has negotiated a
/// positive cell count; the cell count is immutable for the session's
/// lifetime. Incoming key telemetry is normalized through the
/// [`KeyTracker`] and handed to the gesture consumer.
pub struct Session {
    transport: Box<dyn Transport>,
    kind: TransportKind,
    label: String,
    num_cells: u8,
    state: SessionState,
    config: SessionConfig,
    names: KeyNameTable,
    tracker: Mutex<KeyTracker>,
    consumer: Box<dyn GestureConsumer>,
}

impl Session {
    /// Try each candidate in order until one negotiates a positive cell
    /// count.
    ///
    /// Failed candidates have their transports closed before the next one
    /// is tried; if none succeeds the operation fails with
    /// [`ProtocolError::NoDisplayFound`] and no session exists.
    pub fn open(
        candidates: Vec<Candidate>,
        names: KeyNameTable,
        consumer: Box<dyn GestureConsumer>,
        config: SessionConfig,
    ) -> Result<Self, ProtocolError> {
        for candidate in candidates {
            let Candidate {
                kind,
                label,
                mut transport,
            } = candidate;

            let result = match kind {
                TransportKind::Framed => framed_handshake(transport.as_mut(), &config),
                TransportKind::Hid => hid_handshake(transport.as_mut()),
            };

            match result {
                Ok(cells) if cells > 0 => {
                    // A display responded.
                    info!(
                        "Found display with {} cells connected via {:?} ({})",
                        cells, kind, label
                    );
                    return Ok(Self {
                        transport,
                        kind,
                        label,
                        num_cells: cells,
                        state: SessionState::Connected,
                        config,
                        names,
                        tracker: Mutex::new(KeyTracker::new()),
                        consumer,
                    });
                }
                Ok(_) => {
                    debug!("No response from candidate {}", label);
                }
                Err(e) => {
                    warn!("Candidate {} failed: {}", label, e);
                }
            }

            // Make sure the device gets closed; if it doesn't, we may not
            // be able to re-open it later.
            if let Err(e) = transport.close() {
                warn!("Failed to close candidate {}: {}", label, e);
            }
        }

        Err(ProtocolError::NoDisplayFound)
    }

    /// Negotiated cell count
    pub fn num_cells(&self) -> u8 {
        self.num_cells
    }

    /// Active transport kind
    pub fn kind(&self) -> TransportKind {
        self.kind
    }

    /// Candidate label the session was opened with
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Current lifecycle state
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Configuration the session was opened with
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Snapshot of the currently pressed key codes
    pub fn pressed_keys(&self) -> BTreeSet<u8> {
        self.tracker().pressed().clone()
    }

    /// Write a line of cells to the display.
    ///
    /// `cells` must already be padded to exactly the negotiated cell
    /// count. No acknowledgement is awaited.
    pub fn display(&mut self, cells: &[u8]) -> Result<(), ProtocolError> {
        if self.state != SessionState::Connected {
            return Err(ProtocolError::NotConnected);
        }
        if self.num_cells == 0 {
            return Err(ProtocolError::NotReady(
                "cell count not negotiated".to_string(),
            ));
        }
        if cells.len() != self.num_cells as usize {
            return Err(ProtocolError::NotReady(format!(
                "cell buffer has {} bytes, display has {} cells",
                cells.len(),
                self.num_cells
            )));
        }

        let bytes = match self.kind {
            TransportKind::Framed => display_frame(cells)?.to_bytes(),
            TransportKind::Hid => braille_output_report(cells),
        };
        self.transport.write(&bytes)?;
        Ok(())
    }

    /// Process at most one pending delivery from the transport.
    ///
    /// Returns `true` if a frame or report was consumed, `false` on
    /// timeout. Transient protocol noise (stray bytes, unknown ids/tags)
    /// is logged and never surfaces as an error.
    pub fn pump(&mut self, timeout: Duration) -> Result<bool, ProtocolError> {
        if self.state != SessionState::Connected {
            return Err(ProtocolError::NotConnected);
        }
        if !self.transport.wait_for_data(timeout)? {
            return Ok(false);
        }

        match self.kind {
            TransportKind::Framed => {
                let mut first = [0u8; 1];
                self.transport.read_exact(&mut first)?;
                if let Some(frame) = Frame::read(first[0], self.transport.as_mut())? {
                    self.handle_frame(frame);
                }
            }
            TransportKind::Hid => {
                let mut buf = [0u8; HID_REPORT_BUF];
                let n = self.transport.read_available(&mut buf)?;
                if n == 0 {
                    return Ok(false);
                }
                self.handle_report(InputReport::parse(&buf[..n]));
            }
        }
        Ok(true)
    }

    /// Close the session. Idempotent; also invoked on drop.
    pub fn close(&mut self) {
        if self.state == SessionState::Closed {
            return;
        }
        self.state = SessionState::Closed;
        if let Err(e) = self.transport.close() {
            warn!("Failed to close transport for {}: {}", self.label, e);
        }
    }

    fn tracker(&self) -> MutexGuard<'_, KeyTracker> {
        self.tracker.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn handle_frame(&mut self, frame: Frame) {
        match frame.id() {
            Some(MessageId::InitResponse) => {
                // The cell count is immutable once negotiated; a runtime
                // INIT response is only interesting for its status byte.
                match frame.payload.first() {
                    Some(&status) if status != 0 => {
                        warn!(
                            "Display at {} reports communication not allowed",
                            self.label
                        );
                    }
                    _ => debug!("Ignoring INIT response after negotiation"),
                }
            }
            Some(MessageId::KeyDown) => match frame.payload.first() {
                Some(&code) => self.tracker().press(code),
                None => warn!("KEY_DOWN frame without a key code"),
            },
            Some(MessageId::KeyUp) => match frame.payload.first() {
                Some(&code) => {
                    let finalized = self.tracker().release(code);
                    if let Some(keys) = finalized {
                        self.dispatch(keys);
                    }
                }
                None => warn!("KEY_UP frame without a key code"),
            },
            Some(id) => {
                warn!("Unexpected host-bound message: {:?}", id);
            }
            None => {
                warn!(
                    "Unknown message: id {:#04x}, {} payload bytes",
                    frame.message_id,
                    frame.payload.len()
                );
            }
        }
    }

    fn handle_report(&mut self, report: InputReport) {
        match report {
            InputReport::Keys(keys) => {
                let finalized = self.tracker().update_set(keys);
                if let Some(keys) = finalized {
                    self.dispatch(keys);
                }
            }
            InputReport::PowerOff => debug!("Powering off"),
            InputReport::Capabilities { .. } => {
                debug!("Ignoring capabilities report after negotiation");
            }
            InputReport::Unrecognized(_) => {}
        }
    }

    /// Build the combination outside the tracker lock and hand it to the
    /// consumer; "no action for this gesture" is a no-op.
    fn dispatch(&mut self, keys: BTreeSet<u8>) {
        let combination = KeyCombination::from_keys(&self.names, keys);
        debug!("Gesture: {}", combination.id);
        if self.consumer.execute(&combination) == GestureOutcome::Unhandled {
            debug!("No action bound for gesture {}", combination.id);
        }
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.close();
    }
}

/// Framed handshake: bring the cell count from 0 to the value the display
/// reports, or 0 if this candidate fails.
fn framed_handshake(
    transport: &mut dyn Transport,
    config: &SessionConfig,
) -> Result<u8, ProtocolError> {
    let init = Frame::new(MessageId::Init, Vec::new())?;
    let init_bytes = init.to_bytes();

    transport.write(&init_bytes)?;
    // The display silently drops the very first command after a
    // reconnection, so send the init message again.
    transport.write(&init_bytes)?;

    let timeout = Duration::from_millis(config.timeout_ms);
    let mut cells = wait_for_cell_count(transport, timeout)?;
    if cells == 0 {
        // When connected via bluetooth, the display sometimes reports
        // communication not allowed on the first attempt.
        transport.write(&init_bytes)?;
        cells = wait_for_cell_count(transport, timeout)?;
    }
    Ok(cells)
}

/// Pump handshake responses until an INIT response carries a cell count or
/// the timeout elapses.
fn wait_for_cell_count(
    transport: &mut dyn Transport,
    timeout: Duration,
) -> Result<u8, ProtocolError> {
    let deadline = Instant::now() + timeout;

    loop {
        let now = Instant::now();
        if now >= deadline {
            return Ok(0);
        }
        if !transport.wait_for_data(deadline - now)? {
            return Ok(0);
        }

        let mut first = [0u8; 1];
        transport.read_exact(&mut first)?;
        let Some(frame) = Frame::read(first[0], transport)? else {
            continue;
        };

        match frame.id() {
            Some(MessageId::InitResponse) => match frame.payload.first() {
                Some(&status) if status != 0 => {
                    // Communication not allowed; retryable, cell count
                    // untouched.
                    warn!("Display reports communication not allowed");
                }
                _ => match frame.payload.get(2) {
                    Some(&cells) => return Ok(cells),
                    None => warn!(
                        "Short INIT response: {} payload bytes",
                        frame.payload.len()
                    ),
                },
            },
            _ => debug!(
                "Ignoring message {:#04x} during handshake",
                frame.message_id
            ),
        }
    }
}

/// HID handshake: the capabilities feature report is a synchronous
/// request/response transaction, so no retry is needed.
fn hid_handshake(transport: &mut dyn Transport) -> Result<u8, ProtocolError> {
    let data = transport.get_feature_report(ReportTag::Capabilities.to_byte())?;
    match InputReport::parse(&data) {
        InputReport::Capabilities { cells } => Ok(cells),
        _ => {
            warn!("Feature report was not a capabilities report");
            Ok(0)
        }
    }
}
