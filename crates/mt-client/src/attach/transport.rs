//! Byte-stream adapters over WebSocket messages
//!
//! Outgoing bytes are sent as one binary message per write. Incoming
//! message payloads are concatenated; message boundaries carry no meaning
//! for the reader.

use std::io;
use std::pin::Pin;
use std::task::{ready, Context, Poll};

use bytes::Bytes;
use futures::{Sink, Stream};
use mt_core::MtError;
use tokio::io::{AsyncRead, AsyncWrite, ReadBuf};
use tokio_tungstenite::tungstenite::error::ProtocolError as WsProtocolError;
use tokio_tungstenite::tungstenite::{Error as WsError, Message};

/// Reads the payloads of incoming messages as a continuous byte stream
///
/// A close frame, the end of the message stream, or the peer dropping the
/// connection without a close handshake reads as EOF.
pub struct MessageReader<S> {
    inner: S,
    /// Unread remainder of the last message
    pending: Bytes,
    closed: bool,
}

impl<S> MessageReader<S> {
    /// Wrap a stream of WebSocket messages
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            pending: Bytes::new(),
            closed: false,
        }
    }

    /// Consume the reader and return the underlying message stream
    pub fn into_inner(self) -> S {
        self.inner
    }
}

impl<S> AsyncRead for MessageReader<S>
where
    S: Stream<Item = Result<Message, WsError>> + Unpin,
{
    fn poll_read(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        let this = self.get_mut();

        loop {
            if !this.pending.is_empty() {
                let n = this.pending.len().min(buf.remaining());
                buf.put_slice(&this.pending.split_to(n));
                return Poll::Ready(Ok(()));
            }

            if this.closed {
                return Poll::Ready(Ok(()));
            }

            match ready!(Pin::new(&mut this.inner).poll_next(cx)) {
                Some(Ok(Message::Binary(data))) => this.pending = Bytes::from(data),
                Some(Ok(Message::Text(text))) => this.pending = Bytes::from(text),
                Some(Ok(Message::Close(frame))) => {
                    tracing::debug!(?frame, "Peer closed attach connection");
                    this.closed = true;
                }
                // Pings are answered by tungstenite itself
                Some(Ok(_)) => {}
                Some(Err(WsError::ConnectionClosed | WsError::AlreadyClosed)) | None => {
                    this.closed = true;
                }
                Some(Err(WsError::Protocol(WsProtocolError::ResetWithoutClosingHandshake))) => {
                    tracing::debug!("Peer dropped attach connection without closing");
                    this.closed = true;
                }
                Some(Err(e)) => return Poll::Ready(Err(ws_to_io(e))),
            }
        }
    }
}

/// Sends each write as one binary message
///
/// Data is only guaranteed to be on the wire after a flush. Shutdown
/// performs the WebSocket close handshake.
pub struct MessageWriter<S> {
    inner: S,
}

impl<S> MessageWriter<S> {
    /// Wrap a sink of WebSocket messages
    pub fn new(inner: S) -> Self {
        Self { inner }
    }

    /// Mutable access to the underlying sink
    pub fn get_mut(&mut self) -> &mut S {
        &mut self.inner
    }

    /// Consume the writer and return the underlying sink
    pub fn into_inner(self) -> S {
        self.inner
    }
}

impl<S> AsyncWrite for MessageWriter<S>
where
    S: Sink<Message, Error = WsError> + Unpin,
{
    fn poll_write(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        let mut sink = Pin::new(&mut self.get_mut().inner);
        ready!(sink.as_mut().poll_ready(cx)).map_err(ws_to_io)?;
        sink.start_send(Message::Binary(buf.to_vec()))
            .map_err(ws_to_io)?;
        Poll::Ready(Ok(buf.len()))
    }

    fn poll_flush(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Pin::new(&mut self.get_mut().inner)
            .poll_flush(cx)
            .map_err(ws_to_io)
    }

    fn poll_shutdown(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        match ready!(Pin::new(&mut self.get_mut().inner).poll_close(cx)) {
            Ok(()) | Err(WsError::ConnectionClosed | WsError::AlreadyClosed) => Poll::Ready(Ok(())),
            Err(e) => Poll::Ready(Err(ws_to_io(e))),
        }
    }
}

/// Map a WebSocket error onto the I/O error space of the byte-stream traits
pub(crate) fn ws_to_io(err: WsError) -> io::Error {
    match err {
        WsError::Io(e) => e,
        WsError::ConnectionClosed | WsError::AlreadyClosed => {
            io::Error::new(io::ErrorKind::BrokenPipe, "attach connection closed")
        }
        other => io::Error::other(other.to_string()),
    }
}

/// Map a WebSocket error from an established connection onto [`MtError`]
pub(crate) fn ws_error(err: WsError) -> MtError {
    match err {
        WsError::ConnectionClosed | WsError::AlreadyClosed => MtError::StreamClosed,
        other => MtError::Io(ws_to_io(other)),
    }
}
