/*
Cloud coordinator for a fleet of edge devices.

Sites own one desired configuration document each. The cloud issues
single-use enrollment tokens for a site, redeems them exactly once to bind
an edge to that site, and answers configuration reads for registered
edges. All state is in memory; each map lives behind its own store and is
only ever touched through the operations below.
*/

mod api;
mod edges;
mod error;
mod store;
mod tokens;

pub use api::{router, start};
pub use edges::EdgeRegistry;
pub use error::CloudError;
pub use store::{ConfigStore, KvStore};
pub use tokens::TokenAuthority;

use serde_json::Value;
use tracing::info;

use gridlink_types::{EdgeEntry, EdgeId, EnrollmentToken, SiteId};

/// The registration protocol composition.
///
/// Turns `(edge_id, token)` into a durable edge→site binding and resolves
/// configuration reads for registered edges. A token can produce at most
/// one successful binding; two edges racing the same token cannot both
/// register against it.
#[derive(Clone, Debug, Default)]
pub struct Cloud {
    configs: ConfigStore,
    tokens: TokenAuthority,
    edges: EdgeRegistry,
}

impl Cloud {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the desired configuration for `site_id`, creating the site
    /// implicitly on first write.
    pub async fn set_desired_config(&self, site_id: SiteId, config: Value) {
        self.configs.put(site_id, config).await;
    }

    /// The current desired configuration for `site_id`.
    pub async fn desired_config(&self, site_id: &SiteId) -> Result<Value, CloudError> {
        self.configs.get(site_id).await
    }

    /// Issue a fresh single-use enrollment token for an existing site.
    pub async fn issue_token(&self, site_id: &SiteId) -> Result<EnrollmentToken, CloudError> {
        if !self.configs.contains(site_id).await {
            return Err(CloudError::SiteNotFound);
        }

        let token = self.tokens.issue(site_id.clone()).await?;
        info!(%site_id, "issued enrollment token");
        Ok(token)
    }

    /// Register an edge using an enrollment token.
    ///
    /// The token is redeemed first; if that fails no state changes at all.
    /// Redeem-then-bind is sequenced, not transactional: a crash in
    /// between leaves a consumed token with no binding, and the operator
    /// has to issue a new token.
    pub async fn register(
        &self,
        edge_id: EdgeId,
        token: &EnrollmentToken,
    ) -> Result<SiteId, CloudError> {
        let site_id = self.tokens.redeem(token).await?;
        self.edges.bind(edge_id.clone(), site_id.clone()).await;
        info!(%edge_id, %site_id, "edge registered");
        Ok(site_id)
    }

    /// Resolve the desired configuration for a registered edge: look up
    /// its site binding, then read that site's configuration.
    pub async fn config_for(&self, edge_id: &EdgeId) -> Result<Value, CloudError> {
        let site_id = self.edges.lookup(edge_id).await?;
        self.configs.get(&site_id).await
    }

    /// All registered edges and the sites they belong to.
    pub async fn list_edges(&self) -> Vec<EdgeEntry> {
        self.edges.list().await
    }
}
