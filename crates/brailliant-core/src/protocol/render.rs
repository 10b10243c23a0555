//! Cell buffer rendering
//!
//! Converts a padded braille cell buffer into the transport-specific
//! output bytes. The caller is responsible for padding the buffer to the
//! negotiated cell count; no acknowledgement is awaited for either format.

use super::frame::{Frame, MessageId};
use super::report::ReportTag;
use super::ProtocolError;

/// Wrap a cell buffer as a DISPLAY frame for the framed serial transport
pub fn display_frame(cells: &[u8]) -> Result<Frame, ProtocolError> {
    Frame::new(MessageId::Display, cells.to_vec())
}

/// Wrap a cell buffer as a braille output report for the HID transport.
///
/// Layout: tag, module 1, offset 0, length byte, cell bytes.
pub fn braille_output_report(cells: &[u8]) -> Vec<u8> {
    let mut report = Vec::with_capacity(4 + cells.len());
    report.push(ReportTag::BrailleOutput.to_byte());
    report.push(0x01);
    report.push(0x00);
    report.push(cells.len() as u8);
    report.extend_from_slice(cells);
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_display_frame_wraps_cells() {
        let cells = [0x01, 0x03, 0x09, 0x19];
        let frame = display_frame(&cells).unwrap();
        assert_eq!(frame.id(), Some(MessageId::Display));
        assert_eq!(frame.payload, cells.to_vec());
        assert_eq!(frame.to_bytes(), vec![0x1B, 0x02, 4, 0x01, 0x03, 0x09, 0x19]);
    }

    #[test]
    fn test_braille_output_report_layout() {
        let cells = [0xFF, 0x00, 0x55];
        let report = braille_output_report(&cells);
        assert_eq!(report, vec![0x05, 0x01, 0x00, 3, 0xFF, 0x00, 0x55]);
    }

    #[test]
    fn test_oversized_cell_buffer_rejected() {
        let cells = vec![0u8; 256];
        assert!(display_frame(&cells).is_err());
    }
}
