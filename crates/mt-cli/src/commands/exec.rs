//! Exec command implementation

use anyhow::{Context, Result};
use mt_client::Client;
use mt_core::InstanceId;
use tokio::io::AsyncWriteExt;

use crate::terminal::spawn_stdin_reader;

/// Run a non-interactive shell on an instance
///
/// Local stdin is forwarded until it ends; remote stdout and stderr are
/// copied to the local ones until the instance closes the connection.
pub async fn exec_command(client: &Client, id: &str) -> Result<()> {
    let id = InstanceId::new(id);
    let mut session = client
        .attach_stdio(&id)
        .await
        .with_context(|| format!("Failed to attach to instance {}", id))?;

    let (mut stdin, mut stdout, mut stderr) =
        match (session.take_stdin(), session.take_stdout(), session.take_stderr()) {
            (Some(stdin), Some(stdout), Some(stderr)) => (stdin, stdout, stderr),
            _ => anyhow::bail!("Session endpoints already taken"),
        };

    let mut local_input = spawn_stdin_reader();
    let input = tokio::spawn(async move {
        while let Some(chunk) = local_input.recv().await {
            if let Err(e) = stdin.write_all(&chunk).await {
                tracing::debug!("Remote input closed: {}", e);
                return;
            }
        }
        // Sends the end-of-input marker
        let _ = stdin.shutdown().await;
    });

    let output = async {
        let mut local = tokio::io::stdout();
        let copied = tokio::io::copy(&mut stdout, &mut local).await;
        local.flush().await?;
        copied
    };
    let errors = async {
        let mut local = tokio::io::stderr();
        let copied = tokio::io::copy(&mut stderr, &mut local).await;
        local.flush().await?;
        copied
    };
    let (output, errors) = tokio::join!(output, errors);

    input.abort();
    let closed = session.close().await;

    output.context("Failed to copy remote stdout")?;
    errors.context("Failed to copy remote stderr")?;
    closed.context("Attach session failed")?;
    Ok(())
}
