//! High-level client combining the REST API and attach sessions

use async_trait::async_trait;
use mt_core::config::ClientConfig;
use mt_core::traits::InstanceApi;
use mt_core::{Instance, InstanceId, MtError};

use crate::attach::{self, RawSession, StdioSession};
use crate::rest::RestClient;

/// Client for one mktmpio account
#[derive(Debug, Clone)]
pub struct Client {
    config: ClientConfig,
    rest: RestClient,
}

impl Client {
    /// Create a client from a resolved configuration
    pub fn new(config: ClientConfig) -> Result<Self, MtError> {
        let rest = RestClient::new(&config)?;
        Ok(Self { config, rest })
    }

    /// Configuration used for every request
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Attach to the pseudo-terminal of an instance
    pub async fn attach(&self, id: &InstanceId) -> Result<RawSession, MtError> {
        attach::attach_raw(&self.config, id).await
    }

    /// Attach to a shell of an instance with separate stdio streams
    pub async fn attach_stdio(&self, id: &InstanceId) -> Result<StdioSession, MtError> {
        attach::attach_stdio(&self.config, id).await
    }
}

#[async_trait]
impl InstanceApi for Client {
    async fn create(&self, kind: &str) -> Result<Instance, MtError> {
        self.rest.create(kind).await
    }

    async fn destroy(&self, id: &InstanceId) -> Result<(), MtError> {
        self.rest.destroy(id).await
    }
}
