//! Wire frame encoding and decoding.
//!
//! A frame as it sits in the chip's FIFO:
//!
//! ```text
//! +--------+--------+--------+---------+-----------------+
//! | length | target | sender | control | payload (0..61) |
//! +--------+--------+--------+---------+-----------------+
//! ```
//!
//! `length` counts every byte after itself, so it is `payload.len() + 3`. The chip
//! caps a frame at 66 bytes.
//!
//! ## Limitations
//!
//! - Outbound payloads longer than [`MAX_PAYLOAD_LEN`] are truncated, not rejected
//! - Inbound length bytes above [`MAX_FRAME_LEN`] are clamped, so a noisy read can
//!   never overrun the receive buffer

use bitflags::bitflags;
use heapless::Vec;

use crate::consts::{
    FIFO_HEADER_LEN, FRAME_HEADER_LEN, MAX_ENCODED_LEN, MAX_FRAME_LEN, MAX_PAYLOAD_LEN,
    MAX_RX_PAYLOAD_LEN,
};

/// Payload storage sized for the largest frame the receiver can accept.
pub type Payload = Vec<u8, MAX_RX_PAYLOAD_LEN>;

/// An encoded frame, ready for a FIFO burst write.
pub type EncodedFrame = Vec<u8, MAX_ENCODED_LEN>;

bitflags! {
    /// The control byte of a frame.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct Control: u8 {
        /// This frame acknowledges an earlier one.
        const ACK_REPLY = 0x80;
        /// The sender wants this frame acknowledged.
        const ACK_REQUESTED = 0x40;
    }
}

#[cfg(feature = "defmt-0-3")]
impl defmt::Format for Control {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "Control({=u8:#x})", self.bits())
    }
}

impl Control {
    /// Control byte for an outbound frame.
    pub fn new(request_ack: bool, ack_reply: bool) -> Self {
        let mut control = Control::empty();
        control.set(Control::ACK_REPLY, ack_reply);
        control.set(Control::ACK_REQUESTED, request_ack);
        control
    }
}

/// The four bytes read from the FIFO ahead of the payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt-0-3", derive(defmt::Format))]
pub struct Header {
    /// Length byte, already clamped to [`MAX_FRAME_LEN`].
    pub length: u8,
    /// Destination address.
    pub target: u8,
    /// Source address.
    pub sender: u8,
    /// Control bits. Unknown bits are dropped.
    pub control: Control,
}

impl Header {
    /// Parses a raw FIFO header, clamping a corrupt length.
    pub fn parse(raw: [u8; FIFO_HEADER_LEN]) -> Self {
        Self {
            length: raw[0].min(MAX_FRAME_LEN),
            target: raw[1],
            sender: raw[2],
            control: Control::from_bits_truncate(raw[3]),
        }
    }

    /// Number of payload bytes following the header.
    pub fn payload_len(&self) -> usize {
        self.length.saturating_sub(FRAME_HEADER_LEN) as usize
    }

    /// `true` if this frame acknowledges an earlier one.
    pub fn is_ack_reply(&self) -> bool {
        self.control.contains(Control::ACK_REPLY)
    }

    /// `true` if the sender asked for an acknowledgement.
    pub fn requests_ack(&self) -> bool {
        self.control.contains(Control::ACK_REQUESTED)
    }
}

/// A decoded frame.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt-0-3", derive(defmt::Format))]
pub struct Frame {
    /// Destination address.
    pub target: u8,
    /// Source address.
    pub sender: u8,
    /// Control bits.
    pub control: Control,
    /// Payload bytes.
    pub payload: Payload,
}

impl Frame {
    /// Assembles a frame from a parsed header and the bytes read after it.
    ///
    /// At most [`Header::payload_len`] bytes of `payload` are kept.
    pub fn from_header(header: Header, payload: &[u8]) -> Self {
        let len = header.payload_len().min(payload.len());
        let mut bytes = Payload::new();
        // len <= MAX_RX_PAYLOAD_LEN by construction of the header
        let _ = bytes.extend_from_slice(&payload[..len]);
        Self {
            target: header.target,
            sender: header.sender,
            control: header.control,
            payload: bytes,
        }
    }
}

/// Encodes a frame as `[length, target, sender, control, payload...]`.
///
/// The FIFO write marker is added by the bus. Payloads longer than
/// [`MAX_PAYLOAD_LEN`] are truncated before the length is computed.
pub fn encode(
    target: u8,
    sender: u8,
    payload: &[u8],
    request_ack: bool,
    ack_reply: bool,
) -> EncodedFrame {
    let payload = if payload.len() > MAX_PAYLOAD_LEN {
        warn!(
            "payload of {} bytes truncated to {}",
            payload.len() as u32,
            MAX_PAYLOAD_LEN as u32
        );
        &payload[..MAX_PAYLOAD_LEN]
    } else {
        payload
    };

    let mut out = EncodedFrame::new();
    // capacity covers the header plus a truncated payload
    let _ = out.extend_from_slice(&[
        payload.len() as u8 + FRAME_HEADER_LEN,
        target,
        sender,
        Control::new(request_ack, ack_reply).bits(),
    ]);
    let _ = out.extend_from_slice(payload);
    out
}

/// Decodes `[length, target, sender, control, payload...]`.
///
/// Returns `None` when fewer than four header bytes are present. A length byte above
/// [`MAX_FRAME_LEN`] is clamped; a frame shorter than its length byte claims keeps the
/// bytes that are there.
pub fn decode(bytes: &[u8]) -> Option<Frame> {
    let raw: [u8; FIFO_HEADER_LEN] = bytes.get(..FIFO_HEADER_LEN)?.try_into().ok()?;
    let header = Header::parse(raw);
    Some(Frame::from_header(header, &bytes[FIFO_HEADER_LEN..]))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_layout() {
        let frame = encode(2, 1, b"hello", true, false);
        assert_eq!(
            frame.as_slice(),
            &[8, 2, 1, 0x40, b'h', b'e', b'l', b'l', b'o']
        );
    }

    #[test]
    fn test_encode_ack_reply_sets_bit7() {
        let frame = encode(1, 2, &[], false, true);
        assert_eq!(frame.as_slice(), &[3, 1, 2, 0x80]);
    }

    #[test]
    fn test_roundtrip_preserves_addresses_and_bits() {
        for len in [0usize, 1, 30, MAX_PAYLOAD_LEN] {
            let payload: std::vec::Vec<u8> = (0..len as u8).collect();
            let encoded = encode(0xFF, 9, &payload, true, false);
            let frame = decode(&encoded).unwrap();
            assert_eq!(frame.target, 0xFF);
            assert_eq!(frame.sender, 9);
            assert_eq!(frame.control, Control::ACK_REQUESTED);
            assert_eq!(frame.payload.as_slice(), payload.as_slice());
        }
    }

    #[test]
    fn test_oversized_payload_is_truncated() {
        let payload = [0xA5u8; 100];
        let encoded = encode(2, 1, &payload, false, false);
        assert_eq!(encoded[0] as usize, MAX_PAYLOAD_LEN + 3);
        assert_eq!(encoded.len(), MAX_ENCODED_LEN);

        let frame = decode(&encoded).unwrap();
        assert_eq!(frame.payload.len(), MAX_PAYLOAD_LEN);
    }

    #[test]
    fn test_corrupt_length_is_clamped() {
        let header = Header::parse([200, 1, 2, 0]);
        assert_eq!(header.length, MAX_FRAME_LEN);
        assert_eq!(header.payload_len(), MAX_RX_PAYLOAD_LEN);

        let mut bytes = vec![200u8, 1, 2, 0];
        bytes.extend(std::iter::repeat(0x11).take(120));
        let frame = decode(&bytes).unwrap();
        assert_eq!(frame.payload.len(), MAX_RX_PAYLOAD_LEN);
    }

    #[test]
    fn test_short_inputs() {
        assert_eq!(decode(&[5, 1, 2]), None);

        // length claims more than was read
        let frame = decode(&[10, 1, 2, 0, 0xAB]).unwrap();
        assert_eq!(frame.payload.as_slice(), &[0xAB]);

        // length below the header size
        let header = Header::parse([1, 1, 2, 0]);
        assert_eq!(header.payload_len(), 0);
    }

    #[test]
    fn test_header_flags() {
        let header = Header::parse([3, 1, 2, 0xC3]);
        assert!(header.is_ack_reply());
        assert!(header.requests_ack());
        assert_eq!(header.control.bits(), 0xC0);
    }
}
