//! Attach command implementation

use anyhow::{Context, Result};

use mt_client::Client;
use mt_core::InstanceId;

use crate::output::{print_info, print_success};
use crate::terminal::run_raw_session;

/// Attach the local terminal to the shell of an instance
pub async fn attach_command(client: &Client, id: &str) -> Result<()> {
    let id = InstanceId::new(id);

    print_info(&format!("Attaching to instance {}...", id));
    let session = client
        .attach(&id)
        .await
        .with_context(|| format!("Failed to attach to instance {}", id))?;
    print_info("Press Ctrl+] to detach");

    run_raw_session(session).await?;

    print_success("Detached from instance");
    Ok(())
}
