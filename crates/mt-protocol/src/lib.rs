//! mt-protocol: Wire protocol for mktmpio attach sessions
//!
//! In stdio mode the remote shell's stdout and stderr share one duplex
//! connection. Each chunk of output travels inside a frame tagged with the
//! stream it belongs to, using the same layout as docker's multiplexed
//! attach streams. Input flows the other way unframed and is terminated by
//! [`EOF_SENTINEL`].

pub mod codec;
pub mod error;
pub mod frame;
pub mod stream;

pub use codec::{StdioCodec, StdioFrame, MAX_PAYLOAD_SIZE};
pub use error::ProtocolError;
pub use frame::{FrameHeader, EOF_SENTINEL, HEADER_SIZE};
pub use stream::StreamKind;
