//! Demultiplexing pump
//!
//! Decodes framed output from the connection and routes each payload to the
//! stdout or stderr endpoint.

use std::io;

use bytes::Bytes;
use futures::StreamExt;
use mt_core::MtError;
use mt_protocol::{ProtocolError, StdioCodec, StreamKind};
use tokio::io::AsyncRead;
use tokio_util::codec::FramedRead;
use tokio_util::sync::CancellationToken;

use super::pipe::PipeWriter;

/// One output endpoint as seen by the pump
struct Route {
    name: &'static str,
    writer: Option<PipeWriter>,
}

impl Route {
    fn new(name: &'static str, writer: PipeWriter) -> Self {
        Self {
            name,
            writer: Some(writer),
        }
    }

    /// Deliver a payload, stopping early if the session is cancelled
    ///
    /// Returns `false` when cancelled. A reader that has gone away only
    /// disables this route.
    async fn deliver(&mut self, payload: Bytes, cancel: &CancellationToken) -> bool {
        let Some(writer) = self.writer.as_mut() else {
            tracing::trace!(stream = self.name, len = payload.len(), "Discarding output");
            return true;
        };

        tokio::select! {
            biased;
            _ = cancel.cancelled() => false,
            result = writer.send(payload) => {
                if result.is_err() {
                    tracing::debug!(stream = self.name, "Output reader closed, discarding further output");
                    self.writer = None;
                }
                true
            }
        }
    }

    async fn fail(&mut self, message: &str) {
        if let Some(writer) = self.writer.take() {
            writer
                .fail(io::Error::new(io::ErrorKind::InvalidData, message.to_string()))
                .await;
        }
    }
}

/// Run the pump until the connection ends, a frame fails to decode, or the
/// session is cancelled
///
/// The endpoints are closed on return: with EOF for a clean end, a
/// cancellation, or a transport that drops mid-stream, and with an
/// `InvalidData` error for a decode failure.
pub(crate) async fn run_demux<R>(
    conn: R,
    stdout: PipeWriter,
    stderr: PipeWriter,
    cancel: CancellationToken,
) -> Result<(), MtError>
where
    R: AsyncRead + Unpin,
{
    let mut frames = FramedRead::new(conn, StdioCodec::new());
    let mut stdout = Route::new("stdout", stdout);
    let mut stderr = Route::new("stderr", stderr);

    loop {
        let next = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                tracing::debug!("Demux pump cancelled");
                return Ok(());
            }
            next = frames.next() => next,
        };

        let frame = match next {
            Some(Ok(frame)) => frame,
            Some(Err(ProtocolError::Io(e))) => {
                tracing::debug!("Attach connection dropped: {}", e);
                return Ok(());
            }
            Some(Err(e)) => {
                tracing::warn!("Failed to decode attach output: {}", e);
                let message = e.to_string();
                tokio::select! {
                    biased;
                    _ = cancel.cancelled() => {}
                    _ = async { tokio::join!(stdout.fail(&message), stderr.fail(&message)) } => {}
                }
                return Err(e.into());
            }
            None => {
                tracing::debug!("Attach output ended");
                return Ok(());
            }
        };

        tracing::trace!(stream = %frame.stream, len = frame.payload.len(), "Routing frame");

        if frame.payload.is_empty() {
            continue;
        }

        let route = match frame.stream {
            StreamKind::Stdout | StreamKind::Stdin => &mut stdout,
            StreamKind::Stderr => &mut stderr,
        };

        if !route.deliver(frame.payload, &cancel).await {
            tracing::debug!("Demux pump cancelled while delivering output");
            return Ok(());
        }
    }
}
