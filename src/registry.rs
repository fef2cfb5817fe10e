// Container-group registry: where the collector learns what to monitor

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use crate::client::{ApiClient, TransportError};
use crate::models::ContainerGroup;

/// Source of the current container-group list. The collector only reads;
/// group lifecycle belongs to the orchestration layer.
pub trait GroupRegistry: Send + Sync {
    fn groups<'a>(
        &'a self,
        cancel: &'a CancellationToken,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<ContainerGroup>, TransportError>> + Send + 'a>>;
}

/// Registry backed by the metrics API's own group-list endpoint.
pub struct RemoteRegistry {
    client: Arc<ApiClient>,
}

impl RemoteRegistry {
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self { client }
    }
}

impl GroupRegistry for RemoteRegistry {
    fn groups<'a>(
        &'a self,
        cancel: &'a CancellationToken,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<ContainerGroup>, TransportError>> + Send + 'a>>
    {
        Box::pin(self.client.list_groups(cancel))
    }
}
