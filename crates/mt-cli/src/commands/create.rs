//! Create command implementation

use anyhow::{Context, Result};

use mt_client::Client;
use mt_core::traits::InstanceApi;

use crate::output::{format_env, format_instances, print_success};

/// Create an instance and print how to reach it
///
/// With `env` set only `export` lines are printed, suitable for `eval`.
pub async fn create_command(client: &Client, kind: &str, env: bool) -> Result<()> {
    let instance = client
        .create(kind)
        .await
        .with_context(|| format!("Failed to create {} instance", kind))?;

    if env {
        print!("{}", format_env(&instance));
        return Ok(());
    }

    print_success(&format!("Created {} instance {}", instance.kind, instance.id));
    println!("{}", format_instances(std::slice::from_ref(&instance)));
    Ok(())
}
