//! Destroy command implementation

use anyhow::Result;

use mt_client::Client;
use mt_core::traits::InstanceApi;
use mt_core::InstanceId;

use crate::output::{print_error, print_success};

/// Destroy each instance, continuing past failures
pub async fn destroy_command(client: &Client, ids: &[String]) -> Result<()> {
    let mut failed = 0usize;

    for id in ids {
        let id = InstanceId::new(id.as_str());
        match client.destroy(&id).await {
            Ok(()) => print_success(&format!("Destroyed instance {}", id)),
            Err(e) => {
                print_error(&format!("Failed to destroy instance {}: {}", id, e));
                failed += 1;
            }
        }
    }

    if failed > 0 {
        anyhow::bail!("Failed to destroy {} instance(s)", failed);
    }

    Ok(())
}
