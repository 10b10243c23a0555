//! Frame encoding/decoding
//!
//! Implements the framed serial message format:
//! - 1 byte: Header marker (0x1B)
//! - 1 byte: Message id
//! - 1 byte: Payload length
//! - N bytes: Payload

use tracing::warn;

use super::channel::Transport;
use super::{ProtocolError, HEADER, MAX_PAYLOAD_SIZE};

/// Message ids used on the framed serial link
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageId {
    /// Request cell count negotiation (empty payload)
    Init,
    /// Negotiation response: `payload[0]` = status, `payload[2]` = cell count
    InitResponse,
    /// Write cells to the display (payload = cell bytes)
    Display,
    /// Key press (`payload[0]` = key code)
    KeyDown,
    /// Key release (`payload[0]` = key code)
    KeyUp,
}

impl MessageId {
    /// Get the wire byte for this message id
    pub fn to_byte(self) -> u8 {
        match self {
            MessageId::Init => 0x00,
            MessageId::InitResponse => 0x01,
            MessageId::Display => 0x02,
            MessageId::KeyDown => 0x05,
            MessageId::KeyUp => 0x06,
        }
    }

    /// Decode a wire byte, `None` for ids this driver does not know
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            0x00 => Some(MessageId::Init),
            0x01 => Some(MessageId::InitResponse),
            0x02 => Some(MessageId::Display),
            0x05 => Some(MessageId::KeyDown),
            0x06 => Some(MessageId::KeyUp),
            _ => None,
        }
    }
}

/// One framed serial protocol message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// Raw message id byte (unknown ids are preserved, the session logs them)
    pub message_id: u8,
    /// Frame payload (at most 255 bytes)
    pub payload: Vec<u8>,
}

impl Frame {
    /// Create a new frame with the given message id and payload
    pub fn new(id: MessageId, payload: Vec<u8>) -> Result<Self, ProtocolError> {
        if payload.len() > MAX_PAYLOAD_SIZE {
            return Err(ProtocolError::PayloadTooLarge(payload.len()));
        }
        Ok(Self {
            message_id: id.to_byte(),
            payload,
        })
    }

    /// Interpret the message id byte, `None` if unrecognized
    pub fn id(&self) -> Option<MessageId> {
        MessageId::from_byte(self.message_id)
    }

    /// Encode the frame to raw bytes.
    /// The length prefix is computed from the actual payload buffer.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(3 + self.payload.len());
        bytes.push(HEADER);
        bytes.push(self.message_id);
        bytes.push(self.payload.len() as u8);
        bytes.extend_from_slice(&self.payload);
        bytes
    }

    /// Decode one complete frame from raw bytes
    pub fn from_bytes(data: &[u8]) -> Result<Self, ProtocolError> {
        if data.len() < 3 {
            return Err(ProtocolError::InvalidFrame(format!(
                "truncated frame: {} bytes",
                data.len()
            )));
        }
        if data[0] != HEADER {
            return Err(ProtocolError::InvalidFrame(format!(
                "bad header byte {:#04x}",
                data[0]
            )));
        }
        let length = data[2] as usize;
        if data.len() < 3 + length {
            return Err(ProtocolError::InvalidFrame(format!(
                "payload shorter than declared length {}",
                length
            )));
        }
        Ok(Self {
            message_id: data[1],
            payload: data[3..3 + length].to_vec(),
        })
    }

    /// Read one frame from the transport, given the leading byte of the
    /// delivery.
    ///
    /// A leading byte that is not the header marker is discarded with a
    /// diagnostic and `Ok(None)` is returned; the transport delivers at
    /// most one logical packet per call, so no further resynchronization
    /// is attempted.
    pub fn read(
        first_byte: u8,
        transport: &mut dyn Transport,
    ) -> Result<Option<Self>, ProtocolError> {
        if first_byte != HEADER {
            warn!("Ignoring byte before header: {:#04x}", first_byte);
            return Ok(None);
        }

        let mut head = [0u8; 2];
        transport.read_exact(&mut head)?;
        let mut payload = vec![0u8; head[1] as usize];
        transport.read_exact(&mut payload)?;

        Ok(Some(Self {
            message_id: head[0],
            payload,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::channel::tests::LoopbackTransport;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_frame_roundtrip() {
        let original = Frame::new(MessageId::Display, vec![0x01, 0x02, 0x03]).unwrap();
        let encoded = original.to_bytes();
        let decoded = Frame::from_bytes(&encoded).expect("Should decode successfully");

        assert_eq!(original, decoded);
        assert_eq!(decoded.id(), Some(MessageId::Display));
    }

    #[test]
    fn test_empty_payload_roundtrip() {
        let original = Frame::new(MessageId::Init, Vec::new()).unwrap();
        let encoded = original.to_bytes();
        assert_eq!(encoded, vec![HEADER, 0x00, 0x00]);

        let decoded = Frame::from_bytes(&encoded).unwrap();
        assert_eq!(decoded, original);
    }

    #[test]
    fn test_max_payload_roundtrip() {
        let payload = vec![0xAA; 255];
        let original = Frame::new(MessageId::Display, payload.clone()).unwrap();
        let decoded = Frame::from_bytes(&original.to_bytes()).unwrap();
        assert_eq!(decoded.payload, payload);
    }

    #[test]
    fn test_oversized_payload_rejected() {
        let result = Frame::new(MessageId::Display, vec![0; 256]);
        assert!(matches!(result, Err(ProtocolError::PayloadTooLarge(256))));
    }

    #[test]
    fn test_bad_header_rejected() {
        let mut encoded = Frame::new(MessageId::Init, Vec::new()).unwrap().to_bytes();
        encoded[0] = 0x42;
        assert!(Frame::from_bytes(&encoded).is_err());
    }

    #[test]
    fn test_stray_byte_yields_no_frame() {
        let mut transport = LoopbackTransport::new();
        let stray = Frame::read(0x42, &mut transport).unwrap();
        assert!(stray.is_none());
    }

    #[test]
    fn test_read_after_stray_byte() {
        // One stray byte, then a valid KEY_DOWN frame: the stray byte costs
        // only a diagnostic and the next delivery decodes normally.
        let frame = Frame::new(MessageId::KeyDown, vec![10]).unwrap();
        let bytes = frame.to_bytes();
        let mut transport = LoopbackTransport::with_input(bytes[1..].to_vec());

        assert!(Frame::read(0x42, &mut transport).unwrap().is_none());
        let decoded = Frame::read(bytes[0], &mut transport).unwrap().unwrap();
        assert_eq!(decoded, frame);
    }

    #[test]
    fn test_unknown_message_id_preserved() {
        let decoded = Frame::from_bytes(&[HEADER, 0x7F, 0x01, 0x55]).unwrap();
        assert_eq!(decoded.message_id, 0x7F);
        assert_eq!(decoded.id(), None);
        assert_eq!(decoded.payload, vec![0x55]);
    }
}
