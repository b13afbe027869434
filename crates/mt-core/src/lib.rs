//! mt-core: Core abstractions and configuration for the mktmpio client
//!
//! This crate provides the shared configuration, error taxonomy, instance
//! model and collaborator traits used by the client library and the CLI.

pub mod config;
pub mod error;
pub mod instance;
pub mod traits;
pub mod types;

pub use error::{ApiError, ConfigError, ConnectionError, MtError};
pub use instance::{Instance, RemoteShell};
pub use types::{AttachMode, InstanceId};
