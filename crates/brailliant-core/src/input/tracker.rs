//! Key press/release state machine
//!
//! Chorded input devices report releases one key at a time; without
//! suppression, releasing a 3-key chord would fire three garbled gestures.
//! The tracker guarantees exactly one finalized key set per physical
//! press-then-release cycle, captured at the instant of the first key-up.

use std::collections::BTreeSet;

/// Tracks the set of currently pressed key codes.
///
/// States: Idle (empty set) -> Active (non-empty) -> Releasing
/// (`ignore_releases` set, shrinking) -> Idle once empty. All transitions
/// are total; the tracker trusts device-reported releases and never infers
/// a release by timeout.
#[derive(Debug, Default)]
pub struct KeyTracker {
    pressed: BTreeSet<u8>,
    ignore_releases: bool,
}

impl KeyTracker {
    /// Create an idle tracker
    pub fn new() -> Self {
        Self::default()
    }

    /// The currently pressed key codes
    pub fn pressed(&self) -> &BTreeSet<u8> {
        &self.pressed
    }

    /// Whether the tracker is back in its idle state
    pub fn is_idle(&self) -> bool {
        self.pressed.is_empty() && !self.ignore_releases
    }

    /// Record a discrete key press (framed serial path).
    pub fn press(&mut self, code: u8) {
        self.pressed.insert(code);
        // This begins a new key combination.
        self.ignore_releases = false;
    }

    /// Record a discrete key release (framed serial path).
    ///
    /// The first release after one or more presses finalizes the
    /// combination: the returned set is the pressed set as it stood
    /// immediately before this release. Later releases of the same gesture
    /// return `None`; the code is removed either way.
    pub fn release(&mut self, code: u8) -> Option<BTreeSet<u8>> {
        let finalized = self.finalize();
        self.pressed.remove(&code);
        if self.pressed.is_empty() {
            self.ignore_releases = false;
        }
        finalized
    }

    /// Apply a whole-set update (HID path), inferring press vs. release
    /// from the membership change.
    ///
    /// Growth is a press; shrinkage is a release and finalizes the previous
    /// set. An equal-sized set with different membership means a release and
    /// a press crossed in one report: the previous set is finalized and the
    /// new set starts a fresh combination.
    pub fn update_set(&mut self, keys: BTreeSet<u8>) -> Option<BTreeSet<u8>> {
        let finalized = if keys.len() > self.pressed.len() {
            // Press. This begins a new key combination.
            self.ignore_releases = false;
            None
        } else if keys.len() < self.pressed.len() {
            self.finalize()
        } else if keys != self.pressed {
            let finalized = self.finalize();
            self.ignore_releases = false;
            finalized
        } else {
            None
        };

        self.pressed = keys;
        if self.pressed.is_empty() {
            self.ignore_releases = false;
        }
        finalized
    }

    /// Snapshot the active set at the first release of a gesture.
    fn finalize(&mut self) -> Option<BTreeSet<u8>> {
        if self.ignore_releases || self.pressed.is_empty() {
            return None;
        }
        // Any further releases are just the rest of the combination being
        // released, so they are suppressed.
        self.ignore_releases = true;
        Some(self.pressed.clone())
    }
}
