//! mt-cli: Command-line interface for mktmpio
//!
//! Provides the `mktmpio` binary for creating and destroying instances and
//! attaching to their shells.

pub mod commands;
pub mod output;
pub mod terminal;
