//! mt-client: Client library for the mktmpio service
//!
//! Creates and destroys instances over the REST API and attaches to a
//! shell running next to an instance over a single WebSocket connection,
//! either as a raw pseudo-terminal or as separate stdin/stdout/stderr
//! streams.

pub mod attach;
pub mod client;
pub mod rest;

mod headers;

pub use attach::{InputWriter, OutputReader, RawSession, StdioSession};
pub use client::Client;
pub use rest::RestClient;
