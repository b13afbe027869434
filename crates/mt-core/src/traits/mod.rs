//! Core trait definitions

mod instance;

pub use instance::InstanceApi;
