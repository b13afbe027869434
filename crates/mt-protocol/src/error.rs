//! Protocol error types

use thiserror::Error;

/// Errors that can occur while decoding the multiplexed output stream
#[derive(Error, Debug)]
pub enum ProtocolError {
    /// Frame header names a stream that does not exist
    #[error("Unknown stream selector: {0}")]
    UnknownStream(u8),

    /// Payload exceeds the length field or the decode limit
    #[error("Payload too large: {size} bytes exceeds maximum of {max} bytes")]
    PayloadTooLarge { size: usize, max: usize },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ProtocolError {
    /// Convert into an `io::Error` suitable for handing to a byte-stream reader
    pub fn into_io(self) -> std::io::Error {
        match self {
            ProtocolError::Io(e) => e,
            other => std::io::Error::new(std::io::ErrorKind::InvalidData, other),
        }
    }
}
