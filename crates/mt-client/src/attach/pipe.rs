//! In-process byte pipes backing the stdio endpoints
//!
//! A pipe is a bounded channel of byte chunks. The writer half implements
//! `AsyncWrite` and the reader half `AsyncRead`, so each endpoint of a stdio
//! session can be closed on its own. A full pipe stalls its writer, which is
//! how a slow consumer pushes back on the connection.

use std::future::poll_fn;
use std::io;
use std::pin::Pin;
use std::task::{ready, Context, Poll};

use bytes::Bytes;
use tokio::io::{AsyncRead, AsyncWrite, ReadBuf};
use tokio::sync::mpsc;
use tokio_util::sync::PollSender;

/// Number of chunks a pipe buffers before its writer waits
pub const PIPE_CAPACITY: usize = 32;

/// Create a connected writer/reader pair
pub fn pipe() -> (PipeWriter, PipeReader) {
    let (tx, rx) = mpsc::channel(PIPE_CAPACITY);
    (
        PipeWriter {
            tx: PollSender::new(tx),
        },
        PipeReader {
            rx,
            pending: Bytes::new(),
        },
    )
}

/// Writing end of a pipe
///
/// Shutting it down or dropping it ends the stream for the reader.
pub struct PipeWriter {
    tx: PollSender<io::Result<Bytes>>,
}

impl PipeWriter {
    /// Deliver a chunk without copying it
    ///
    /// Fails with `BrokenPipe` once the reader has been dropped.
    pub async fn send(&mut self, chunk: Bytes) -> io::Result<()> {
        poll_fn(|cx| self.tx.poll_reserve(cx))
            .await
            .map_err(|_| broken_pipe())?;
        self.tx.send_item(Ok(chunk)).map_err(|_| broken_pipe())
    }

    /// End the stream with an error
    ///
    /// The reader sees every chunk sent before, then `err`.
    pub async fn fail(mut self, err: io::Error) {
        if poll_fn(|cx| self.tx.poll_reserve(cx)).await.is_ok() {
            let _ = self.tx.send_item(Err(err));
        }
    }
}

impl AsyncWrite for PipeWriter {
    fn poll_write(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        let this = self.get_mut();
        ready!(this.tx.poll_reserve(cx)).map_err(|_| broken_pipe())?;
        this.tx
            .send_item(Ok(Bytes::copy_from_slice(buf)))
            .map_err(|_| broken_pipe())?;
        Poll::Ready(Ok(buf.len()))
    }

    fn poll_flush(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Poll::Ready(Ok(()))
    }

    fn poll_shutdown(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        self.get_mut().tx.close();
        Poll::Ready(Ok(()))
    }
}

/// Reading end of a pipe
pub struct PipeReader {
    rx: mpsc::Receiver<io::Result<Bytes>>,
    /// Unread remainder of the current chunk
    pending: Bytes,
}

impl PipeReader {
    /// Stop accepting chunks
    ///
    /// Chunks already buffered can still be read, then the reader sees EOF.
    /// Further writes fail with `BrokenPipe`.
    pub fn close(&mut self) {
        self.rx.close();
    }
}

impl AsyncRead for PipeReader {
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

            match ready!(this.rx.poll_recv(cx)) {
                Some(Ok(chunk)) => this.pending = chunk,
                Some(Err(e)) => return Poll::Ready(Err(e)),
                None => return Poll::Ready(Ok(())),
            }
        }
    }
}

fn broken_pipe() -> io::Error {
    io::Error::new(io::ErrorKind::BrokenPipe, "pipe reader closed")
}
