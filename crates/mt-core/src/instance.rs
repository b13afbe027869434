//! Provisioned instance model
//!
//! Instances are returned by the REST API as JSON. Besides connection
//! details they carry the command line of a local client (`remoteShell`)
//! that can talk to the remote server directly.

use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::process::Command;

use crate::error::MtError;
use crate::traits::InstanceApi;
use crate::types::InstanceId;

/// A server created on the mktmpio service
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Instance {
    pub id: InstanceId,
    pub host: String,
    pub port: u16,
    /// Set by the service instead of the other fields when a request fails
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub remote_shell: RemoteShell,
    /// Service type, e.g. `redis` or `postgres`
    #[serde(rename = "type")]
    pub kind: String,
    pub username: String,
    pub password: String,
}

/// Local client command for an instance
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RemoteShell {
    /// Program followed by its arguments
    #[serde(deserialize_with = "string_tokens")]
    pub cmd: Vec<String>,
    /// Extra environment for the program
    pub env: BTreeMap<String, String>,
}

/// The service mixes strings and numbers in command lines (`["redis-cli", "-p", 6379]`)
fn string_tokens<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let values = Option::<Vec<serde_json::Value>>::deserialize(deserializer)?.unwrap_or_default();

    values
        .into_iter()
        .map(|value| match value {
            serde_json::Value::String(s) => Ok(s),
            serde_json::Value::Number(n) => Ok(n.to_string()),
            serde_json::Value::Bool(b) => Ok(b.to_string()),
            other => Err(de::Error::custom(format!(
                "unsupported command token: {}",
                other
            ))),
        })
        .collect()
}

impl Instance {
    /// The service-reported error, if any
    pub fn error_message(&self) -> Option<&str> {
        self.error.as_deref().filter(|e| !e.is_empty())
    }

    /// Environment variables describing how to reach this instance
    ///
    /// Keys are prefixed with the upper-cased service type, e.g.
    /// `REDIS_HOST`, `REDIS_PORT`, `REDIS_USERNAME`, `REDIS_PASSWORD`.
    pub fn env_vars(&self) -> Vec<(String, String)> {
        vec![
            (self.env_key("host"), self.host.clone()),
            (self.env_key("port"), self.port.to_string()),
            (self.env_key("username"), self.username.clone()),
            (self.env_key("password"), self.password.clone()),
        ]
    }

    /// Build the local client command for this instance
    ///
    /// Returns `None` if the service did not supply a command.
    pub fn command(&self) -> Option<Command> {
        let (program, args) = self.remote_shell.cmd.split_first()?;

        let mut cmd = Command::new(program);
        cmd.args(args)
            .envs(self.remote_shell.env.iter())
            .envs(self.env_vars());
        Some(cmd)
    }

    /// Shut down and delete this instance through `api`
    pub async fn destroy<A>(&self, api: &A) -> Result<(), MtError>
    where
        A: InstanceApi + ?Sized,
    {
        api.destroy(&self.id).await
    }

    fn env_key(&self, field: &str) -> String {
        format!("{}_{}", self.kind, field).to_uppercase()
    }
}
