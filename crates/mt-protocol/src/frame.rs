//! Frame header encoding/decoding
//!
//! The frame format uses an 8-byte header:
//! - stream: 1 byte (0 = stdin, 1 = stdout, 2 = stderr)
//! - reserved: 3 bytes (zero on encode, ignored on decode)
//! - payload_length: 4 bytes (u32, big-endian)

use bytes::{Buf, BufMut, BytesMut};

use crate::error::ProtocolError;
use crate::stream::StreamKind;

/// Size of the frame header in bytes
pub const HEADER_SIZE: usize = 8;

/// Marker written on the connection once local input is exhausted.
///
/// This is not a frame. The remote end watches for these four bytes as a
/// standalone message and treats them as end-of-input, which lets stdin be
/// finished while stdout and stderr keep flowing over the same connection.
pub const EOF_SENTINEL: [u8; 4] = [0xFF, 0xFF, 0xFF, 0xFF];

/// Frame header containing routing and length information
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameHeader {
    /// Stream the payload belongs to
    pub stream: StreamKind,
    /// Length of the payload in bytes
    pub payload_length: u32,
}

impl FrameHeader {
    /// Create a new frame header
    pub fn new(stream: StreamKind, payload_length: u32) -> Self {
        Self {
            stream,
            payload_length,
        }
    }

    /// Encode the header into a byte buffer
    pub fn encode(&self, dst: &mut BytesMut) {
        dst.reserve(HEADER_SIZE);
        dst.put_u8(self.stream.as_u8());
        dst.put_bytes(0, 3);
        dst.put_u32(self.payload_length);
    }

    /// Decode a header from a byte buffer
    ///
    /// Returns None if there aren't enough bytes in the buffer.
    /// Returns Err if the stream selector is unknown; in that case nothing
    /// is consumed from `src`.
    pub fn decode(src: &mut BytesMut) -> Result<Option<Self>, ProtocolError> {
        if src.len() < HEADER_SIZE {
            return Ok(None);
        }

        // Validate before consuming anything
        let selector = src[0];
        let stream = StreamKind::from_u8(selector).ok_or(ProtocolError::UnknownStream(selector))?;

        src.advance(4);
        let payload_length = src.get_u32();

        Ok(Some(Self {
            stream,
            payload_length,
        }))
    }
}
