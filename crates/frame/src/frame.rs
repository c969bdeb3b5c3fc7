use crate::{
    CHECKSUM_OFFSET, DATA_LEN, DATA_OFFSET, FRAME_LEN, LENGTH_OFFSET, MessageType, TIMESTAMP_OFFSET,
    TYPE_OFFSET, calculate_checksum,
};

/// Errors produced while encoding or decoding a [`Frame`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum FrameError {
    /// The recomputed checksum did not match the checksum carried on the
    /// wire; the frame is not delivered upstream.
    #[error("frame checksum mismatch")]
    ChecksumMismatch,
    /// A caller tried to build a frame whose payload exceeds
    /// [`crate::DATA_LEN`] significant bytes.
    #[error("payload of {len} bytes exceeds the {} byte limit", DATA_LEN)]
    PayloadTooLong {
        /// The offending payload length.
        len: usize,
    },
    /// The `type` byte did not match any known [`MessageType`].
    #[error("unknown frame type byte 0x{0:02x}")]
    UnknownType(u8),
    /// A payload did not split into the expected number of `&`-delimited
    /// subfields for its message type.
    #[error("expected {expected} fields, found {found}")]
    FieldArity {
        /// Number of subfields the schema expects.
        expected: usize,
        /// Number of subfields actually present.
        found: usize,
    },
    /// A subfield expected to be UTF-8 text was not.
    #[error("payload subfield is not valid UTF-8")]
    InvalidUtf8,
}

/// The 256-byte wire unit exchanged by every peer in the distortion
/// protocol.
///
/// `Frame` is a plain value: constructing one validates the payload length,
/// [`encode`] lays it out on the wire, and [`decode`] is the only way back
/// — there is no mutable in-place frame, so there is nothing for a caller
/// to corrupt after the fact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    msg_type: MessageType,
    payload: [u8; DATA_LEN],
    payload_len: u16,
    timestamp: u32,
}

impl Frame {
    /// Builds a frame carrying `payload` (at most [`crate::DATA_LEN`]
    /// bytes) and an explicit send timestamp (seconds since the epoch).
    pub fn new(msg_type: MessageType, payload: &[u8], timestamp: u32) -> Result<Self, FrameError> {
        if payload.len() > DATA_LEN {
            return Err(FrameError::PayloadTooLong { len: payload.len() });
        }
        let mut buf = [0u8; DATA_LEN];
        buf[..payload.len()].copy_from_slice(payload);
        Ok(Self {
            msg_type,
            payload: buf,
            payload_len: payload.len() as u16,
            timestamp,
        })
    }

    /// Builds a frame with an empty payload, e.g. acknowledgements and
    /// heartbeats.
    #[must_use]
    pub fn empty(msg_type: MessageType, timestamp: u32) -> Self {
        Self {
            msg_type,
            payload: [0u8; DATA_LEN],
            payload_len: 0,
            timestamp,
        }
    }

    /// This frame's message type.
    #[must_use]
    pub fn msg_type(&self) -> MessageType {
        self.msg_type
    }

    /// The significant payload bytes (excludes zero padding).
    #[must_use]
    pub fn payload(&self) -> &[u8] {
        &self.payload[..self.payload_len as usize]
    }

    /// The send-time timestamp carried by this frame. Receiver-informational
    /// only; it does not participate in the checksum.
    #[must_use]
    pub fn timestamp(&self) -> u32 {
        self.timestamp
    }
}

/// Encodes `frame` into its 256-byte wire form, computing the checksum over
/// everything preceding the checksum field.
#[must_use]
pub fn encode(frame: &Frame) -> [u8; FRAME_LEN] {
    let mut wire = [0u8; FRAME_LEN];
    wire[TYPE_OFFSET] = frame.msg_type.as_u8();
    wire[LENGTH_OFFSET..LENGTH_OFFSET + 2].copy_from_slice(&frame.payload_len.to_be_bytes());
    wire[DATA_OFFSET..DATA_OFFSET + DATA_LEN].copy_from_slice(&frame.payload);

    let checksum = calculate_checksum(&wire);
    wire[CHECKSUM_OFFSET..CHECKSUM_OFFSET + 2].copy_from_slice(&checksum.to_be_bytes());
    wire[TIMESTAMP_OFFSET..TIMESTAMP_OFFSET + 4].copy_from_slice(&frame.timestamp.to_be_bytes());
    wire
}

/// Decodes a 256-byte wire buffer into a [`Frame`], rejecting unknown
/// message types, over-length payloads, and checksum failures.
pub fn decode(wire: &[u8; FRAME_LEN]) -> Result<Frame, FrameError> {
    let msg_type = MessageType::try_from(wire[TYPE_OFFSET])?;

    let payload_len =
        u16::from_be_bytes([wire[LENGTH_OFFSET], wire[LENGTH_OFFSET + 1]]);
    if payload_len as usize > DATA_LEN {
        return Err(FrameError::PayloadTooLong {
            len: payload_len as usize,
        });
    }

    let carried_checksum =
        u16::from_be_bytes([wire[CHECKSUM_OFFSET], wire[CHECKSUM_OFFSET + 1]]);
    let expected_checksum = calculate_checksum(wire);
    if carried_checksum != expected_checksum {
        return Err(FrameError::ChecksumMismatch);
    }

    let timestamp = u32::from_be_bytes([
        wire[TIMESTAMP_OFFSET],
        wire[TIMESTAMP_OFFSET + 1],
        wire[TIMESTAMP_OFFSET + 2],
        wire[TIMESTAMP_OFFSET + 3],
    ]);

    let mut payload = [0u8; DATA_LEN];
    payload.copy_from_slice(&wire[DATA_OFFSET..DATA_OFFSET + DATA_LEN]);

    Ok(Frame {
        msg_type,
        payload,
        payload_len,
        timestamp,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip_preserves_frame() {
        let frame = Frame::new(MessageType::DistortReq, b"Text&hello.txt", 12).unwrap();
        let wire = encode(&frame);
        let decoded = decode(&wire).unwrap();
        assert_eq!(decoded, frame);
    }

    #[test]
    fn round_trip_empty_payload() {
        let frame = Frame::empty(MessageType::Heartbeat, 100);
        let wire = encode(&frame);
        assert_eq!(decode(&wire).unwrap(), frame);
    }

    #[test]
    fn single_bit_mutation_fails_validation() {
        let frame = Frame::new(MessageType::ConnectReq, b"alice&127.0.0.1&9000", 1).unwrap();
        let mut wire = encode(&frame);
        wire[10] ^= 0x01;
        assert_eq!(decode(&wire), Err(FrameError::ChecksumMismatch));
    }

    #[test]
    fn unknown_type_is_rejected() {
        let frame = Frame::empty(MessageType::Heartbeat, 1);
        let mut wire = encode(&frame);
        wire[0] = 0x7F;
        // Recompute checksum so only the type byte is implausible, not the
        // checksum too — otherwise UnknownType could be masked.
        let checksum = calculate_checksum(&wire);
        wire[crate::CHECKSUM_OFFSET..crate::CHECKSUM_OFFSET + 2]
            .copy_from_slice(&checksum.to_be_bytes());
        assert_eq!(decode(&wire), Err(FrameError::UnknownType(0x7F)));
    }

    #[test]
    fn payload_over_capacity_is_rejected() {
        let oversized = vec![b'x'; DATA_LEN + 1];
        assert_eq!(
            Frame::new(MessageType::FileData, &oversized, 0),
            Err(FrameError::PayloadTooLong {
                len: DATA_LEN + 1
            })
        );
    }
}
