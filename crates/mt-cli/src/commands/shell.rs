//! Shell command implementation

use anyhow::{Context, Result};

use mt_client::Client;
use mt_core::traits::InstanceApi;

use crate::output::{print_error, print_info, print_success};

/// Create an instance, run its local client against it, then destroy it
pub async fn shell_command(client: &Client, kind: &str) -> Result<()> {
    let instance = client
        .create(kind)
        .await
        .with_context(|| format!("Failed to create {} instance", kind))?;
    print_success(&format!("Created {} instance {}", instance.kind, instance.id));

    let outcome = match instance.command() {
        Some(command) => {
            let display = instance.remote_shell.cmd.join(" ");
            print_info(&format!("Running {}", display));
            let mut command = tokio::process::Command::from(command);
            match command.status().await {
                Ok(status) if status.success() => Ok(()),
                Ok(status) => Err(anyhow::anyhow!("Shell exited with {}", status)),
                Err(e) => Err(anyhow::Error::new(e).context(format!("Failed to run {}", display))),
            }
        }
        None => Err(anyhow::anyhow!(
            "The service did not provide a shell command for {} instances",
            instance.kind
        )),
    };

    // The instance is torn down whatever happened to the shell
    match instance.destroy(client).await {
        Ok(()) => print_success(&format!("Destroyed instance {}", instance.id)),
        Err(e) => print_error(&format!("Failed to destroy instance {}: {}", instance.id, e)),
    }

    outcome
}
