//! Attach sessions
//!
//! An attach session is one WebSocket connection to the shell of an
//! instance. In raw mode the connection is handed to the caller as a plain
//! byte stream. In stdio mode two pumps run alongside the caller:
//!
//! - the demultiplexer reads framed output and splits it into stdout and
//!   stderr readers
//! - the forwarder copies the caller's input to the connection and marks
//!   the end of input with [`mt_protocol::EOF_SENTINEL`]
//!
//! The pumps own opposite halves of the connection and never contend.

mod demux;
mod dialer;
mod forward;
mod pipe;
mod session;
mod transport;

pub use dialer::{attach_url, dial, WsConnection};
pub use pipe::{pipe, PipeReader, PipeWriter, PIPE_CAPACITY};
pub use session::{close_writer, RawReader, RawSession, RawWriter, StdioSession};
pub use transport::{MessageReader, MessageWriter};

use mt_core::config::ClientConfig;
use mt_core::{AttachMode, InstanceId, MtError};

/// Caller side of a stdio session's input
pub type InputWriter = PipeWriter;

/// Caller side of a stdio session's stdout or stderr
pub type OutputReader = PipeReader;

/// Attach to the pseudo-terminal of an instance
pub async fn attach_raw(config: &ClientConfig, id: &InstanceId) -> Result<RawSession, MtError> {
    let conn = dial(config, id, AttachMode::Raw).await?;
    Ok(RawSession::new(conn))
}

/// Attach to a non-interactive shell of an instance with separate stdio streams
pub async fn attach_stdio(config: &ClientConfig, id: &InstanceId) -> Result<StdioSession, MtError> {
    let conn = dial(config, id, AttachMode::Stdio).await?;
    Ok(StdioSession::from_connection(conn))
}
