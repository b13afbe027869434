//! mktmpio CLI
//!
//! Creates temporary database servers on mktmpio, attaches to their shells
//! and destroys them again.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use mktmpio::commands;
use mt_client::Client;
use mt_core::config::{ConfigOverrides, TOKEN_ENV, URL_ENV};

#[derive(Parser)]
#[command(name = "mktmpio")]
#[command(author, version, about = "Create and use temporary database servers on mktmpio")]
#[command(propagate_version = true)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// API token (overrides the config file)
    #[arg(long, global = true, env = TOKEN_ENV, hide_env_values = true)]
    token: Option<String>,

    /// API base URL (overrides the config file)
    #[arg(long, global = true, env = URL_ENV)]
    url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create an instance
    Create {
        /// Service type, e.g. redis, postgres, mysql
        #[arg(value_name = "TYPE")]
        kind: String,
        /// Print shell export lines instead of a table
        #[arg(short, long)]
        env: bool,
    },

    /// Destroy instances
    #[command(alias = "rm")]
    Destroy {
        /// Instance identifier(s) to destroy
        #[arg(required = true)]
        ids: Vec<String>,
    },

    /// Attach the terminal to the shell of an instance
    Attach {
        /// Instance ID to attach to
        id: String,
    },

    /// Pipe stdin to a shell on an instance and print its stdout and stderr
    Exec {
        /// Instance ID to run against
        id: String,
    },

    /// Create an instance, open its client locally and destroy it on exit
    Shell {
        /// Service type, e.g. redis, postgres, mysql
        #[arg(value_name = "TYPE")]
        kind: String,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Show the effective configuration
    Show,
    /// Get a config value
    Get { key: String },
    /// Set a config value in the config file
    Set { key: String, value: String },
    /// Show config file path
    Path,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    let log_level = match (cli.quiet, cli.verbose) {
        (true, _) => "error",
        (false, 0) => "warn",
        (false, 1) => "info",
        (false, 2) => "debug",
        (false, _) => "trace",
    };

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| log_level.into()),
        ))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    let overrides = ConfigOverrides {
        token: cli.token,
        url: cli.url,
        ..ConfigOverrides::default()
    };
    let config_path = cli.config.as_deref();

    if let Commands::Config { action } = &cli.command {
        let config = commands::resolve_config(config_path, overrides, true)?;
        return match action {
            ConfigAction::Show => commands::config_show(config_path, &config),
            ConfigAction::Get { key } => commands::config_get(&config, key),
            ConfigAction::Set { key, value } => commands::config_set(config_path, key, value),
            ConfigAction::Path => {
                let path = config_path
                    .map(PathBuf::from)
                    .unwrap_or_else(mt_core::config::default_config_path);
                println!("{}", path.display());
                Ok(())
            }
        };
    }

    let config = commands::resolve_config(config_path, overrides, false)?;
    config.validate()?;
    let client = Client::new(config)?;

    match cli.command {
        Commands::Create { kind, env } => {
            commands::create_command(&client, &kind, env).await?;
        }
        Commands::Destroy { ids } => {
            commands::destroy_command(&client, &ids).await?;
        }
        Commands::Attach { id } => {
            commands::attach_command(&client, &id).await?;
        }
        Commands::Exec { id } => {
            commands::exec_command(&client, &id).await?;
        }
        Commands::Shell { kind } => {
            commands::shell_command(&client, &kind).await?;
        }
        Commands::Config { .. } => {}
    }

    Ok(())
}
