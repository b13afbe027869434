//! Core domain types

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a provisioned instance
///
/// Opaque to the client; it is only ever echoed back to the service.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InstanceId(pub String);

impl InstanceId {
    /// Create a new instance ID
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the raw ID string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for InstanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for InstanceId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for InstanceId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// How an attach connection presents the remote shell
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttachMode {
    /// Pseudo-terminal passthrough, control sequences included
    Raw,
    /// Stdout and stderr multiplexed in frames, stdin forwarded unframed
    Stdio,
}

impl AttachMode {
    /// Value of the `stdio` query parameter for this mode
    pub fn stdio_flag(self) -> &'static str {
        match self {
            AttachMode::Raw => "false",
            AttachMode::Stdio => "true",
        }
    }
}

impl fmt::Display for AttachMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttachMode::Raw => write!(f, "raw"),
            AttachMode::Stdio => write!(f, "stdio"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_instance_id_is_opaque() {
        let id = InstanceId::from("12345678");
        assert_eq!(id.as_str(), "12345678");
        assert_eq!(format!("{}", InstanceId::new("a b/c")), "a b/c");
    }

    #[test]
    fn test_instance_id_serializes_as_string() {
        let id = InstanceId::new("abc");
        assert_eq!(serde_json::to_string(&id).unwrap(), r#""abc""#);
    }

    #[test]
    fn test_attach_mode_flag() {
        assert_eq!(AttachMode::Raw.stdio_flag(), "false");
        assert_eq!(AttachMode::Stdio.stdio_flag(), "true");
        assert_eq!(AttachMode::Stdio.to_string(), "stdio");
    }
}
