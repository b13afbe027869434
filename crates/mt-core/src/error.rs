//! Core error types for the mktmpio client

use mt_protocol::ProtocolError;
use std::path::PathBuf;
use thiserror::Error;

/// Top-level error type
#[derive(Error, Debug)]
pub enum MtError {
    /// Malformed multiplexed output stream
    #[error("Protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// Dialing or handshaking the attach connection failed
    #[error("Connection error: {0}")]
    Connection(#[from] ConnectionError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// REST API error
    #[error("API error: {0}")]
    Api(#[from] ApiError),

    /// Writing local input to the connection failed
    #[error("Input forwarding failed: {0}")]
    Forwarding(#[source] std::io::Error),

    /// The connection has already been closed
    #[error("Stream closed")]
    StreamClosed,

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Connection-related errors
#[derive(Error, Debug)]
pub enum ConnectionError {
    /// Server refused the upgrade (bad token, unknown instance, ...)
    #[error("Connection rejected with HTTP status {status}")]
    Rejected { status: u16 },

    /// TLS negotiation failed
    #[error("TLS error: {0}")]
    Tls(String),

    /// Network failure while dialing
    #[error("Network error: {0}")]
    Io(#[from] std::io::Error),

    /// Any other handshake failure
    #[error("Handshake failed: {0}")]
    Handshake(String),
}

/// Configuration-related errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Config file not found
    #[error("Config file not found: {0}")]
    NotFound(PathBuf),

    /// Service URL cannot be used
    #[error("Invalid service URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    /// No API token configured
    #[error("No API token configured (set MKTMPIO_TOKEN or run 'mktmpio config set token <TOKEN>')")]
    MissingToken,

    /// Invalid configuration
    #[error("Invalid config: {0}")]
    Invalid(String),

    /// TOML parse error
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),

    /// TOML serialize error
    #[error("TOML serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),

    /// Legacy YAML config could not be parsed
    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// REST API errors
#[derive(Error, Debug)]
pub enum ApiError {
    /// Request could not be sent or the response could not be read
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Server answered with an error
    #[error("Server error ({status}): {message}")]
    Server { status: u16, message: String },

    /// Response body was not the expected JSON
    #[error("Invalid response body: {0}")]
    Decode(#[from] serde_json::Error),
}
