//! HID report classification
//!
//! The first byte of every HID report is its tag; the remainder is a
//! fixed-format body. Unrecognized tags are diagnostics, never errors.

use std::collections::BTreeSet;

use tracing::warn;

/// Byte offset of the cell count within the capabilities report
pub const CELL_COUNT_OFFSET: usize = 24;

/// HID report tags
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportTag {
    /// Capabilities feature report (cell count at offset 24)
    Capabilities,
    /// Active key set (NUL-terminated list of key codes from byte 1)
    Keys,
    /// Braille output command (outbound only)
    BrailleOutput,
    /// Power-off notice (informational)
    PowerOff,
}

impl ReportTag {
    /// Get the wire byte for this report tag
    pub fn to_byte(self) -> u8 {
        match self {
            ReportTag::Capabilities => 0x01,
            ReportTag::Keys => 0x04,
            ReportTag::BrailleOutput => 0x05,
            ReportTag::PowerOff => 0x07,
        }
    }
}

/// One classified inbound HID report
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputReport {
    /// Capabilities report carrying the negotiated cell count
    Capabilities {
        /// Number of cells reported by the hardware
        cells: u8,
    },
    /// The complete set of currently active key codes
    Keys(BTreeSet<u8>),
    /// The display is powering off
    PowerOff,
    /// Unknown tag, or a report too short for its format; ignored
    Unrecognized(u8),
}

impl InputReport {
    /// Classify an inbound report buffer by its tag byte.
    ///
    /// Total over all inputs: garbled reports classify as `Unrecognized`
    /// with a diagnostic rather than failing.
    pub fn parse(data: &[u8]) -> Self {
        let Some(&tag) = data.first() else {
            warn!("Ignoring empty HID report");
            return InputReport::Unrecognized(0);
        };
        let body = &data[1..];

        match tag {
            0x01 => match body.get(CELL_COUNT_OFFSET) {
                Some(&cells) => InputReport::Capabilities { cells },
                None => {
                    warn!(
                        "Capabilities report too short: {} body bytes",
                        body.len()
                    );
                    InputReport::Unrecognized(tag)
                }
            },
            0x04 => {
                let keys = body
                    .iter()
                    .copied()
                    .take_while(|&b| b != 0)
                    .collect::<BTreeSet<u8>>();
                InputReport::Keys(keys)
            }
            0x07 => InputReport::PowerOff,
            _ => {
                warn!("Unknown report: tag {:#04x}, {} bytes", tag, data.len());
                InputReport::Unrecognized(tag)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn caps_report(cells: u8) -> Vec<u8> {
        let mut report = vec![0u8; 1 + CELL_COUNT_OFFSET + 1];
        report[0] = ReportTag::Capabilities.to_byte();
        report[1 + CELL_COUNT_OFFSET] = cells;
        report
    }

    #[test]
    fn test_capabilities_cell_count() {
        let parsed = InputReport::parse(&caps_report(18));
        assert_eq!(parsed, InputReport::Capabilities { cells: 18 });
    }

    #[test]
    fn test_capabilities_too_short() {
        let parsed = InputReport::parse(&[0x01, 0x00, 0x00]);
        assert_eq!(parsed, InputReport::Unrecognized(0x01));
    }

    #[test]
    fn test_keys_nul_terminated() {
        // Key codes 2 and 10 active; everything after the first NUL is
        // padding and must be ignored.
        let report = [0x04, 2, 10, 0, 7, 7, 7];
        let parsed = InputReport::parse(&report);
        assert_eq!(parsed, InputReport::Keys(BTreeSet::from([2, 10])));
    }

    #[test]
    fn test_keys_empty_set() {
        let parsed = InputReport::parse(&[0x04, 0, 0, 0]);
        assert_eq!(parsed, InputReport::Keys(BTreeSet::new()));
    }

    #[test]
    fn test_power_off() {
        assert_eq!(InputReport::parse(&[0x07]), InputReport::PowerOff);
    }

    #[test]
    fn test_unknown_tag_ignored() {
        assert_eq!(InputReport::parse(&[0x7F, 1, 2]), InputReport::Unrecognized(0x7F));
    }

    #[test]
    fn test_empty_report_ignored() {
        assert_eq!(InputReport::parse(&[]), InputReport::Unrecognized(0));
    }
}
