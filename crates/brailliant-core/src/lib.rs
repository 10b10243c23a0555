//! # Brailliant Driver Core
//!
//! Driver core for the HumanWare Brailliant BI/B series of refreshable
//! braille displays.

#![warn(missing_docs)]

//!
//! This library provides:
//! - Framed serial protocol encoding/decoding (`0x1B`-headed messages)
//! - HID input/feature report classification
//! - Transport-agnostic key press/release tracking and gesture assembly
//! - Cell buffer rendering to either wire format
//!
//! The display may be connected over a framed serial link (USB or
//! bluetooth) or a HID report channel; both are normalized into one
//! logical stream of [`input::KeyCombination`] events.
//!
//! ## Example
//!
//! ```rust,ignore
//! use brailliant_core::prelude::*;
//!
//! let candidates = vec![Candidate::framed(open_port("/dev/ttyUSB0")?)];
//! let mut session = Session::open(
//!     candidates,
//!     KeyNameTable::default(),
//!     Box::new(consumer),
//!     SessionConfig::default(),
//! )?;
//!
//! // Write a line of cells and pump incoming key events.
//! session.display(&cells)?;
//! session.pump(Duration::from_millis(200))?;
//! ```

pub mod input;
pub mod protocol;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::input::{
        GestureConsumer, GestureOutcome, KeyCombination, KeyNameTable, KeyTracker,
    };
    pub use crate::protocol::{
        Candidate, ProtocolError, Session, SessionConfig, SessionState, Transport, TransportKind,
    };
}

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
