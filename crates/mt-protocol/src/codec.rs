//! Tokio codec for multiplexed stdout/stderr frames

use bytes::{Bytes, BytesMut};
use tokio_util::codec::{Decoder, Encoder};

use crate::error::ProtocolError;
use crate::frame::{FrameHeader, HEADER_SIZE};
use crate::stream::StreamKind;

/// Upper bound on how much buffer space is reserved ahead of a large payload
const MAX_RESERVE: usize = 64 * 1024;

/// Largest payload accepted from the wire (16 MiB)
///
/// A header announcing more than this is treated as a corrupt stream rather
/// than buffered indefinitely.
pub const MAX_PAYLOAD_SIZE: usize = 16 * 1024 * 1024;

/// A complete frame with header and payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StdioFrame {
    /// Stream this frame belongs to
    pub stream: StreamKind,
    /// Raw payload bytes
    pub payload: Bytes,
}

impl StdioFrame {
    /// Create a new frame
    pub fn new(stream: StreamKind, payload: impl Into<Bytes>) -> Self {
        Self {
            stream,
            payload: payload.into(),
        }
    }
}

/// Codec for encoding/decoding stdio frames
#[derive(Debug, Default)]
pub struct StdioCodec {
    /// Current header being decoded (if any)
    pending_header: Option<FrameHeader>,
}

impl StdioCodec {
    /// Create a new codec
    pub fn new() -> Self {
        Self {
            pending_header: None,
        }
    }
}

impl Decoder for StdioCodec {
    type Item = StdioFrame;
    type Error = ProtocolError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        let header = match self.pending_header.take() {
            Some(h) => h,
            None => match FrameHeader::decode(src)? {
                Some(h) => {
                    if h.payload_length as usize > MAX_PAYLOAD_SIZE {
                        return Err(ProtocolError::PayloadTooLarge {
                            size: h.payload_length as usize,
                            max: MAX_PAYLOAD_SIZE,
                        });
                    }
                    h
                }
                None => return Ok(None),
            },
        };

        let payload_len = header.payload_length as usize;
        if src.len() < payload_len {
            src.reserve((payload_len - src.len()).min(MAX_RESERVE));
            self.pending_header = Some(header);
            return Ok(None);
        }

        let payload = src.split_to(payload_len).freeze();

        Ok(Some(StdioFrame {
            stream: header.stream,
            payload,
        }))
    }

    /// A connection that ends part-way through a frame is a normal end of
    /// stream, not a malformed one. The partial frame is discarded.
    fn decode_eof(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        if let Some(frame) = self.decode(src)? {
            return Ok(Some(frame));
        }

        if !src.is_empty() || self.pending_header.is_some() {
            tracing::debug!(
                buffered = src.len(),
                pending_header = ?self.pending_header,
                "Connection closed mid-frame, discarding partial frame"
            );
            src.clear();
            self.pending_header = None;
        }

        Ok(None)
    }
}

impl Encoder<StdioFrame> for StdioCodec {
    type Error = ProtocolError;

    fn encode(&mut self, frame: StdioFrame, dst: &mut BytesMut) -> Result<(), Self::Error> {
        let payload_len = frame.payload.len();
        let length = u32::try_from(payload_len).map_err(|_| ProtocolError::PayloadTooLarge {
            size: payload_len,
            max: u32::MAX as usize,
        })?;

        dst.reserve(HEADER_SIZE + payload_len);
        FrameHeader::new(frame.stream, length).encode(dst);
        dst.extend_from_slice(&frame.payload);

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;
    use tokio_util::codec::FramedRead;

    fn encode_all(frames: &[StdioFrame]) -> BytesMut {
        let mut codec = StdioCodec::new();
        let mut buf = BytesMut::new();
        for frame in frames {
            codec.encode(frame.clone(), &mut buf).unwrap();
        }
        buf
    }

    #[test]
    fn test_codec_interleaved_frames() {
        let frames = vec![
            StdioFrame::new(StreamKind::Stdout, "ready\n"),
            StdioFrame::new(StreamKind::Stderr, "warn\n"),
            StdioFrame::new(StreamKind::Stdout, "done\n"),
        ];
        let mut buf = encode_all(&frames);

        let mut codec = StdioCodec::new();
        for expected in &frames {
            let decoded = codec.decode(&mut buf).unwrap().unwrap();
            assert_eq!(&decoded, expected);
        }
        assert!(codec.decode(&mut buf).unwrap().is_none());
        assert!(buf.is_empty());
    }

    #[test]
    fn test_codec_wire_bytes() {
        let buf = encode_all(&[StdioFrame::new(StreamKind::Stdout, "hi")]);
        assert_eq!(&buf[..], &[1, 0, 0, 0, 0, 0, 0, 2, b'h', b'i']);
    }

    #[test]
    fn test_codec_empty_payload() {
        let mut buf = BytesMut::from(&[2u8, 0, 0, 0, 0, 0, 0, 0][..]);
        let mut codec = StdioCodec::new();
        let decoded = codec.decode(&mut buf).unwrap().unwrap();
        assert_eq!(decoded.stream, StreamKind::Stderr);
        assert!(decoded.payload.is_empty());
    }

    #[test]
    fn test_codec_partial_read() {
        let mut full = encode_all(&[StdioFrame::new(StreamKind::Stderr, "partial payload")]);
        let mut codec = StdioCodec::new();

        // Header split
        let mut partial = full.split_to(HEADER_SIZE - 1);
        assert!(codec.decode(&mut partial).unwrap().is_none());

        // Header complete, payload split
        partial.extend_from_slice(&full.split_to(4));
        assert!(codec.decode(&mut partial).unwrap().is_none());

        partial.extend_from_slice(&full);
        let decoded = codec.decode(&mut partial).unwrap().unwrap();
        assert_eq!(decoded.payload.as_ref(), b"partial payload");
    }

    #[test]
    fn test_codec_unknown_stream_consumes_no_payload() {
        let mut buf = BytesMut::from(&[9u8, 0, 0, 0, 0, 0, 0, 3, b'a', b'b', b'c'][..]);
        let mut codec = StdioCodec::new();
        let result = codec.decode(&mut buf);
        assert!(matches!(result, Err(ProtocolError::UnknownStream(9))));
        assert_eq!(buf.len(), 11);
    }

    #[test]
    fn test_codec_rejects_oversized_length() {
        // 0xFFFFFFFF announced, only a few bytes follow
        let mut buf = BytesMut::from(&[1u8, 0, 0, 0, 0xFF, 0xFF, 0xFF, 0xFF, b'x'][..]);
        let mut codec = StdioCodec::new();
        let result = codec.decode(&mut buf);
        assert!(matches!(
            result,
            Err(ProtocolError::PayloadTooLarge { size, max })
                if size == u32::MAX as usize && max == MAX_PAYLOAD_SIZE
        ));
    }

    #[test]
    fn test_codec_accepts_length_at_limit() {
        let mut buf = BytesMut::new();
        FrameHeader::new(StreamKind::Stdout, MAX_PAYLOAD_SIZE as u32).encode(&mut buf);
        let mut codec = StdioCodec::new();
        assert!(codec.decode(&mut buf).unwrap().is_none());
        assert!(codec.pending_header.is_some());
    }

    #[test]
    fn test_decode_eof_mid_payload_is_end_of_stream() {
        let mut buf = encode_all(&[StdioFrame::new(StreamKind::Stdout, "truncated")]);
        buf.truncate(HEADER_SIZE + 3);

        let mut codec = StdioCodec::new();
        assert!(codec.decode_eof(&mut buf).unwrap().is_none());
        assert!(buf.is_empty());
    }

    #[test]
    fn test_decode_eof_mid_header_is_end_of_stream() {
        let mut buf = BytesMut::from(&[1u8, 0, 0][..]);
        let mut codec = StdioCodec::new();
        assert!(codec.decode_eof(&mut buf).unwrap().is_none());
    }

    #[tokio::test]
    async fn test_framed_read_over_truncated_stream() {
        let mut wire = encode_all(&[
            StdioFrame::new(StreamKind::Stdout, "one"),
            StdioFrame::new(StreamKind::Stderr, "two"),
        ])
        .to_vec();
        // Start of a third frame that never completes
        wire.extend_from_slice(&[1, 0, 0, 0, 0, 0, 0, 50, b'x']);

        let mut framed = FramedRead::new(&wire[..], StdioCodec::new());
        let first = framed.next().await.unwrap().unwrap();
        let second = framed.next().await.unwrap().unwrap();
        assert_eq!(first.payload.as_ref(), b"one");
        assert_eq!(second.stream, StreamKind::Stderr);
        assert!(framed.next().await.is_none());
    }
}
