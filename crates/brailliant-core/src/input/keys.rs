//! Key codes and symbolic names
//!
//! The display reports each physical control as a small integer key code:
//! braille dots 1-8 are codes 2-9, space is 10, the command keys c1-c6 are
//! 11-16, the directional thumb keys are 17-20, and routing keys start
//! at 80 (code = 80 + column index).

use std::collections::BTreeMap;

/// Key code of braille dot 1 (dots 1-8 are contiguous from here)
pub const DOT1_KEY: u8 = 2;

/// Key code of braille dot 8
pub const DOT8_KEY: u8 = 9;

/// Key code of the space bar
pub const SPACE_KEY: u8 = 10;

/// First routing key code; routing index = code - this offset
pub const FIRST_ROUTING_KEY: u8 = 80;

/// Immutable mapping from key codes to symbolic names.
///
/// Constructed once at startup and never mutated; the gesture builder
/// resolves every finalized key through it. Codes at or above
/// [`FIRST_ROUTING_KEY`] are named `"routing"` and are not part of the
/// table itself.
#[derive(Debug, Clone)]
pub struct KeyNameTable {
    names: BTreeMap<u8, &'static str>,
}

impl KeyNameTable {
    /// Look up the symbolic name for a key code
    pub fn name(&self, code: u8) -> Option<&'static str> {
        self.names.get(&code).copied()
    }
}

impl Default for KeyNameTable {
    fn default() -> Self {
        let names = BTreeMap::from([
            // Braille keyboard.
            (2, "dot1"),
            (3, "dot2"),
            (4, "dot3"),
            (5, "dot4"),
            (6, "dot5"),
            (7, "dot6"),
            (8, "dot7"),
            (9, "dot8"),
            (10, "space"),
            // Command keys.
            (11, "c1"),
            (12, "c2"),
            (13, "c3"),
            (14, "c4"),
            (15, "c5"),
            (16, "c6"),
            // Thumb keys.
            (17, "up"),
            (18, "left"),
            (19, "right"),
            (20, "down"),
        ]);
        Self { names }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_table_names() {
        let table = KeyNameTable::default();
        assert_eq!(table.name(DOT1_KEY), Some("dot1"));
        assert_eq!(table.name(SPACE_KEY), Some("space"));
        assert_eq!(table.name(17), Some("up"));
        assert_eq!(table.name(20), Some("down"));
    }

    #[test]
    fn test_unknown_code_has_no_name() {
        let table = KeyNameTable::default();
        assert_eq!(table.name(1), None);
        assert_eq!(table.name(42), None);
        // Routing keys are resolved by range, not by the table.
        assert_eq!(table.name(FIRST_ROUTING_KEY), None);
    }
}
