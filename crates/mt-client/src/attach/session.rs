//! Attach session handles

use std::io;
use std::pin::Pin;
use std::task::{Context, Poll};

use futures::stream::{SplitSink, SplitStream};
use futures::{SinkExt, StreamExt};
use mt_core::MtError;
use tokio::io::{AsyncRead, AsyncWrite, ReadBuf};
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::Message;
use tokio_util::sync::CancellationToken;

use super::demux::run_demux;
use super::dialer::WsConnection;
use super::forward::run_forward;
use super::pipe::pipe;
use super::transport::{ws_error, MessageReader, MessageWriter};
use super::{InputWriter, OutputReader};

/// Read half of a raw session
pub type RawReader = MessageReader<SplitStream<WsConnection>>;

/// Write half of a raw session
pub type RawWriter = MessageWriter<SplitSink<WsConnection, Message>>;

/// Raw pseudo-terminal session
///
/// Bytes pass through unmodified in both directions, control sequences
/// included. Every write is sent as one binary message once flushed.
pub struct RawSession {
    reader: RawReader,
    writer: RawWriter,
}

impl RawSession {
    /// Wrap an established attach connection
    pub fn new(conn: WsConnection) -> Self {
        let (sink, stream) = conn.split();
        Self {
            reader: MessageReader::new(stream),
            writer: MessageWriter::new(sink),
        }
    }

    /// Split into independently owned read and write halves
    pub fn into_split(self) -> (RawReader, RawWriter) {
        (self.reader, self.writer)
    }

    /// Perform the close handshake
    ///
    /// Closing a connection the peer already closed is not an error.
    pub async fn close(self) -> Result<(), MtError> {
        close_writer(self.writer).await
    }
}

/// Close the connection behind a raw write half
pub async fn close_writer(writer: RawWriter) -> Result<(), MtError> {
    let mut sink = writer.into_inner();
    match sink.close().await.map_err(ws_error) {
        Ok(()) | Err(MtError::StreamClosed) => {
            tracing::debug!("Raw session closed");
            Ok(())
        }
        Err(e) => Err(e),
    }
}

impl AsyncRead for RawSession {
    fn poll_read(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        Pin::new(&mut self.get_mut().reader).poll_read(cx, buf)
    }
}

impl AsyncWrite for RawSession {
    fn poll_write(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        Pin::new(&mut self.get_mut().writer).poll_write(cx, buf)
    }

    fn poll_flush(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Pin::new(&mut self.get_mut().writer).poll_flush(cx)
    }

    fn poll_shutdown(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Pin::new(&mut self.get_mut().writer).poll_shutdown(cx)
    }
}

/// Session with separate stdin, stdout and stderr endpoints
///
/// Two pumps run while the session is alive: one splits framed output into
/// the stdout and stderr readers, the other forwards the stdin writer to
/// the connection. Each endpoint can be taken once and closed on its own.
/// Shutting down or dropping the stdin writer sends the end-of-input
/// marker; the connection stays open for remaining output.
///
/// Dropping the session without calling [`close`](Self::close) tears it down
/// in the background.
pub struct StdioSession {
    stdin: Option<InputWriter>,
    stdout: Option<OutputReader>,
    stderr: Option<OutputReader>,
    demux: Option<JoinHandle<Result<(), MtError>>>,
    forward: Option<JoinHandle<Result<(), MtError>>>,
    cancel: CancellationToken,
}

impl StdioSession {
    /// Wire the pumps over an established attach connection
    pub fn from_connection(conn: WsConnection) -> Self {
        let (sink, stream) = conn.split();
        Self::from_io(MessageReader::new(stream), MessageWriter::new(sink))
    }

    /// Wire the pumps over any read/write pair
    ///
    /// `read` carries framed output, `write` receives raw input followed by
    /// the end-of-input marker.
    pub fn from_io<R, W>(read: R, write: W) -> Self
    where
        R: AsyncRead + Unpin + Send + 'static,
        W: AsyncWrite + Unpin + Send + 'static,
    {
        let cancel = CancellationToken::new();
        let (stdin_tx, stdin_rx) = pipe();
        let (stdout_tx, stdout_rx) = pipe();
        let (stderr_tx, stderr_rx) = pipe();

        let demux = tokio::spawn(run_demux(read, stdout_tx, stderr_tx, cancel.clone()));
        let forward = tokio::spawn(run_forward(stdin_rx, write, cancel.clone()));

        tracing::debug!("Stdio session started");

        Self {
            stdin: Some(stdin_tx),
            stdout: Some(stdout_rx),
            stderr: Some(stderr_rx),
            demux: Some(demux),
            forward: Some(forward),
            cancel,
        }
    }

    /// Take the stdin writer
    pub fn take_stdin(&mut self) -> Option<InputWriter> {
        self.stdin.take()
    }

    /// Take the stdout reader
    pub fn take_stdout(&mut self) -> Option<OutputReader> {
        self.stdout.take()
    }

    /// Take the stderr reader
    pub fn take_stderr(&mut self) -> Option<OutputReader> {
        self.stderr.take()
    }

    /// Close stdin if it has not been taken
    pub fn close_stdin(&mut self) {
        self.stdin = None;
    }

    /// Tear down the connection and wait for both pumps
    ///
    /// Stdin stops accepting writes. Input it already accepted is forwarded
    /// and followed by the end-of-input marker before the connection
    /// closes. Pending reads on the output endpoints end with EOF. Returns the
    /// forwarding error if input could not be written, otherwise the
    /// protocol error if output could not be decoded.
    pub async fn close(mut self) -> Result<(), MtError> {
        self.cancel.cancel();
        self.stdin = None;

        let forward = join_pump("forward", self.forward.take()).await;
        let demux = join_pump("demux", self.demux.take()).await;

        tracing::debug!("Stdio session closed");
        forward.and(demux)
    }
}

async fn join_pump(
    name: &str,
    handle: Option<JoinHandle<Result<(), MtError>>>,
) -> Result<(), MtError> {
    let Some(handle) = handle else {
        return Ok(());
    };
    match handle.await {
        Ok(result) => result,
        Err(e) => {
            tracing::warn!(pump = name, "Pump task failed: {}", e);
            Err(MtError::Io(io::Error::other(e)))
        }
    }
}

impl Drop for StdioSession {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}
