//! Bindings from registered edges to their sites.

use gridlink_types::{EdgeEntry, EdgeId, SiteId};

use crate::error::CloudError;
use crate::store::KvStore;

/// Exclusive owner of the edge→site bindings.
#[derive(Clone, Debug, Default)]
pub struct EdgeRegistry {
    bindings: KvStore<EdgeId, SiteId>,
}

impl EdgeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the binding, overwriting any prior binding for `edge_id`.
    pub async fn bind(&self, edge_id: EdgeId, site_id: SiteId) {
        self.bindings.put(edge_id, site_id).await;
    }

    /// Return the bound site, or fail if the edge has no binding.
    pub async fn lookup(&self, edge_id: &EdgeId) -> Result<SiteId, CloudError> {
        self.bindings
            .get(edge_id)
            .await
            .ok_or(CloudError::NotRegistered)
    }

    /// All current bindings.
    pub async fn list(&self) -> Vec<EdgeEntry> {
        self.bindings
            .entries()
            .await
            .into_iter()
            .map(|(edge_id, site_id)| EdgeEntry { site_id, edge_id })
            .collect()
    }
}
