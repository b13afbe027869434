//! Interactive raw-mode bridge between the local terminal and a raw session
//!
//! The terminal is put into raw mode and its bytes are forwarded exactly as
//! read, so escape sequences, bracketed paste and terminal query replies
//! reach the remote shell unchanged.

use std::io::Read;

use anyhow::Result;
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use mt_client::attach::close_writer;
use mt_client::RawSession;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::sync::mpsc;

/// Ctrl+] as sent by a terminal in raw mode
pub const DETACH_BYTE: u8 = 0x1d;

/// Restores cooked mode when dropped
struct RawModeGuard;

impl RawModeGuard {
    fn enable() -> Result<Self> {
        enable_raw_mode()?;
        Ok(Self)
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
    }
}

/// How a bridged session ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BridgeEnd {
    /// The user pressed the detach key
    Detached,
    /// The remote side closed the connection
    RemoteClosed,
}

/// Run an interactive session until the user detaches or the remote side
/// closes the connection
///
/// Ctrl+] detaches.
pub async fn run_raw_session(session: RawSession) -> Result<()> {
    let (mut reader, mut writer) = session.into_split();
    let guard = RawModeGuard::enable()?;

    let mut input = spawn_stdin_reader();
    let mut stdout = tokio::io::stdout();
    let outcome = bridge(&mut input, &mut reader, &mut writer, &mut stdout).await;

    drop(guard);
    close_writer(writer).await?;

    let end = outcome?;
    tracing::debug!(?end, "Raw session ended");
    Ok(())
}

/// Shuttle bytes between local input, the remote session and local output
///
/// Input chunks are written to `remote_in` unmodified up to the detach
/// byte. Remote output is copied to `local` as it arrives.
pub async fn bridge<R, W, O>(
    input: &mut mpsc::Receiver<Vec<u8>>,
    remote_out: &mut R,
    remote_in: &mut W,
    local: &mut O,
) -> Result<BridgeEnd>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
    O: AsyncWrite + Unpin,
{
    let mut buf = vec![0u8; 8192];

    loop {
        tokio::select! {
            Some(chunk) = input.recv() => {
                let (data, detach) = split_at_detach(&chunk);
                if !data.is_empty() {
                    remote_in.write_all(data).await?;
                    remote_in.flush().await?;
                }
                if detach {
                    tracing::debug!("Detach requested");
                    return Ok(BridgeEnd::Detached);
                }
            }

            result = remote_out.read(&mut buf) => {
                match result {
                    Ok(0) => return Ok(BridgeEnd::RemoteClosed),
                    Ok(n) => {
                        local.write_all(&buf[..n]).await?;
                        local.flush().await?;
                    }
                    Err(e) => {
                        tracing::warn!("Error reading from attach connection: {}", e);
                        return Ok(BridgeEnd::RemoteClosed);
                    }
                }
            }
        }
    }
}

/// Bytes to forward from `chunk`, and whether it contains the detach key
pub fn split_at_detach(chunk: &[u8]) -> (&[u8], bool) {
    match chunk.iter().position(|&b| b == DETACH_BYTE) {
        Some(at) => (&chunk[..at], true),
        None => (chunk, false),
    }
}

/// Read local stdin on a dedicated thread
///
/// A plain thread is used so a read blocked on the terminal never holds up
/// runtime shutdown. The channel closes at end of input.
pub(crate) fn spawn_stdin_reader() -> mpsc::Receiver<Vec<u8>> {
    let (tx, rx) = mpsc::channel(16);

    std::thread::spawn(move || {
        let mut stdin = std::io::stdin().lock();
        let mut buf = vec![0u8; 32 * 1024];
        loop {
            match stdin.read(&mut buf) {
                Ok(0) => break,
                Ok(n) => {
                    if tx.blocking_send(buf[..n].to_vec()).is_err() {
                        break;
                    }
                }
                Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
                Err(e) => {
                    tracing::warn!("Failed to read local stdin: {}", e);
                    break;
                }
            }
        }
    });

    rx
}
