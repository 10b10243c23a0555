//! Gesture assembly
//!
//! Maps a finalized key set into a structured combination: braille dot
//! mask, space flag, routing index, and a joined symbolic name.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use tracing::warn;

use super::keys::{KeyNameTable, DOT1_KEY, DOT8_KEY, FIRST_ROUTING_KEY, SPACE_KEY};

/// Result of handing a combination to the gesture consumer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GestureOutcome {
    /// The consumer acted on the gesture
    Handled,
    /// No action is bound to this gesture; not an error
    Unhandled,
}

/// Consumer of finalized key combinations (the gesture-dispatch
/// collaborator). Reporting [`GestureOutcome::Unhandled`] is a no-op.
pub trait GestureConsumer: Send {
    /// Act on one finalized combination
    fn execute(&mut self, combination: &KeyCombination) -> GestureOutcome;
}

/// One finalized chorded input: the set of keys active at the moment of
/// first release, produced at most once per press/release cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyCombination {
    /// The raw key codes captured at first release
    pub keys: BTreeSet<u8>,
    /// Braille dot bitmask (bit n = dot n+1); 0 unless every key is a dot
    /// or space
    pub dots: u8,
    /// Whether space was part of a braille input chord
    pub space: bool,
    /// Column index if a routing key was involved
    pub routing_index: Option<u8>,
    /// Symbolic names joined with `+`, in set iteration order.
    /// Display-only: not a stable identifier beyond the raw key set.
    pub id: String,
}

impl KeyCombination {
    /// Build a combination from a finalized key set.
    ///
    /// Braille chords and command/thumb/routing chords are mutually
    /// exclusive: any key outside the dot/space range downgrades the whole
    /// combination to non-braille input. Routing is evaluated independently
    /// for every key. Unknown codes are skipped for naming with a
    /// diagnostic but stay in the raw key set.
    pub fn from_keys(names: &KeyNameTable, keys: BTreeSet<u8>) -> Self {
        let mut dots = 0u8;
        let mut space = false;
        let mut routing_index = None;
        let mut is_braille_input = true;
        let mut resolved = Vec::new();

        for &key in &keys {
            if is_braille_input {
                if (DOT1_KEY..=DOT8_KEY).contains(&key) {
                    dots |= 1 << (key - DOT1_KEY);
                } else if key == SPACE_KEY {
                    space = true;
                } else {
                    // This is not braille input.
                    is_braille_input = false;
                    dots = 0;
                    space = false;
                }
            }
            if key >= FIRST_ROUTING_KEY {
                resolved.push("routing");
                routing_index = Some(key - FIRST_ROUTING_KEY);
            } else {
                match names.name(key) {
                    Some(name) => resolved.push(name),
                    None => warn!("Unknown key with id {}", key),
                }
            }
        }

        Self {
            keys,
            dots,
            space,
            routing_index,
            id: resolved.join("+"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn build(codes: &[u8]) -> KeyCombination {
        KeyCombination::from_keys(&KeyNameTable::default(), codes.iter().copied().collect())
    }

    #[test]
    fn test_braille_chord_dot1_space() {
        let combo = build(&[2, 10]);
        assert_eq!(combo.dots, 0b0000_0001);
        assert!(combo.space);
        assert_eq!(combo.routing_index, None);
        assert_eq!(combo.id, "dot1+space");
    }

    #[test]
    fn test_all_dots_mask() {
        let combo = build(&[2, 3, 4, 5, 6, 7, 8, 9]);
        assert_eq!(combo.dots, 0b1111_1111);
        assert!(!combo.space);
    }

    #[test]
    fn test_command_key_downgrades_braille() {
        // dot1 + space + c1: the command key makes the whole combination
        // non-braille even though dots were seen first.
        let combo = build(&[2, 10, 11]);
        assert_eq!(combo.dots, 0);
        assert!(!combo.space);
        assert_eq!(combo.id, "dot1+space+c1");
    }

    #[test]
    fn test_routing_key_index() {
        let combo = build(&[83]);
        assert_eq!(combo.routing_index, Some(3));
        assert_eq!(combo.id, "routing");
        assert_eq!(combo.dots, 0);
        assert!(!combo.space);
    }

    #[test]
    fn test_routing_mixed_with_thumb_key() {
        // Routing is evaluated for every key, even alongside non-routing
        // keys.
        let combo = build(&[17, 80]);
        assert_eq!(combo.routing_index, Some(0));
        assert_eq!(combo.id, "up+routing");
    }

    #[test]
    fn test_unknown_code_skipped_for_naming() {
        let combo = build(&[10, 42]);
        assert_eq!(combo.id, "space");
        // The raw set still carries the unknown code.
        assert!(combo.keys.contains(&42));
        // And an unknown code is not braille input.
        assert_eq!(combo.dots, 0);
        assert!(!combo.space);
    }

    #[test]
    fn test_thumb_chord() {
        let combo = build(&[17, 20]);
        assert_eq!(combo.id, "up+down");
        assert_eq!(combo.dots, 0);
    }
}
