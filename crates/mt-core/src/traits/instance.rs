//! Instance lifecycle trait

use async_trait::async_trait;

use crate::error::MtError;
use crate::instance::Instance;
use crate::types::InstanceId;

/// Creation and destruction of remote instances
///
/// Attach sessions never call `destroy` themselves; whoever owns the
/// instance tears it down once it is done with it.
#[async_trait]
pub trait InstanceApi: Send + Sync {
    /// Create an instance of the given service type
    async fn create(&self, kind: &str) -> Result<Instance, MtError>;

    /// Shut down and delete an instance
    async fn destroy(&self, id: &InstanceId) -> Result<(), MtError>;
}
