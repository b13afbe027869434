//! Input forwarding pump
//!
//! Copies the caller's input to the connection unframed. End of input is
//! signalled with [`EOF_SENTINEL`] rather than a close, so output keeps
//! flowing after the remote side has seen the end of its stdin.

use mt_core::MtError;
use mt_protocol::EOF_SENTINEL;
use tokio::io::{AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio_util::sync::CancellationToken;

use super::pipe::PipeReader;

/// Read size for each forwarded chunk
const CHUNK_SIZE: usize = 32 * 1024;

/// Copy `input` to `conn` until end of input, then write the sentinel
///
/// Cancelling stops the pipe from accepting more input. Whatever was
/// written to it before is still forwarded, followed by the sentinel. Each
/// chunk is flushed on its own so it leaves as one message. Returns the
/// number of input bytes forwarded.
pub(crate) async fn forward_input<W>(
    input: &mut PipeReader,
    conn: &mut W,
    cancel: &CancellationToken,
) -> Result<u64, MtError>
where
    W: AsyncWrite + Unpin,
{
    let mut buf = vec![0u8; CHUNK_SIZE];
    let mut total = 0u64;
    let mut draining = false;

    loop {
        let n = if draining {
            input.read(&mut buf).await?
        } else {
            tokio::select! {
                biased;
                n = input.read(&mut buf) => n?,
                _ = cancel.cancelled() => {
                    tracing::debug!("Session closing, forwarding accepted input");
                    input.close();
                    draining = true;
                    continue;
                }
            }
        };
        if n == 0 {
            break;
        }
        conn.write_all(&buf[..n]).await.map_err(MtError::Forwarding)?;
        conn.flush().await.map_err(MtError::Forwarding)?;
        total += n as u64;
    }

    conn.write_all(&EOF_SENTINEL)
        .await
        .map_err(MtError::Forwarding)?;
    conn.flush().await.map_err(MtError::Forwarding)?;

    tracing::debug!(bytes = total, "Input ended, sent end-of-input marker");
    Ok(total)
}

/// Run the pump for the lifetime of the session
///
/// The write half stays open after the copy ends and is shut down, which
/// closes the connection, only once the session is cancelled.
pub(crate) async fn run_forward<W>(
    mut input: PipeReader,
    mut conn: W,
    cancel: CancellationToken,
) -> Result<(), MtError>
where
    W: AsyncWrite + Unpin,
{
    let outcome = forward_input(&mut input, &mut conn, &cancel)
        .await
        .map(|_| ());

    if let Err(e) = &outcome {
        tracing::warn!("Input forwarding stopped: {}", e);
    }

    // Input is no longer read; let writers see a broken pipe
    drop(input);

    cancel.cancelled().await;
    if let Err(e) = conn.shutdown().await {
        tracing::debug!("Closing attach connection: {}", e);
    }

    outcome
}
