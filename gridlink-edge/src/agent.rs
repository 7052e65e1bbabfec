//! Background synchronization agent.
//!
//! Owns the edge's registration state machine and the periodic
//! configuration refresh. The agent is the single writer of the cached
//! state; observers read it through a watch channel. Nothing in here is
//! ever fatal: every failure is logged and retried on the next tick.

use serde::Serialize;
use serde_json::Value;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{info, instrument, warn};

use gridlink_types::{EdgeId, EnrollmentToken, SiteId};

use crate::cloud::{ClientError, CloudClient};
use crate::config::Config;

/// Snapshot of the agent's state, published after every change.
#[derive(Clone, Debug, Serialize)]
pub struct EdgeStatus {
    pub edge_id: EdgeId,
    pub registered: bool,
    pub site_id: Option<SiteId>,
    pub config: Option<Value>,
}

impl EdgeStatus {
    /// The state every edge starts in: no binding, no cached config.
    pub fn unregistered(edge_id: EdgeId) -> Self {
        Self {
            edge_id,
            registered: false,
            site_id: None,
            config: None,
        }
    }
}

/// Drives registration and configuration refresh against the cloud.
pub struct SyncAgent {
    client: CloudClient,
    edge_id: EdgeId,
    poll_interval: Duration,
    /// Bootstrap credential. Kept across failed attempts so the next tick
    /// retries identically; cleared exactly once, on success.
    token: Option<EnrollmentToken>,
    site_id: Option<SiteId>,
    config: Option<Value>,
    status_tx: watch::Sender<EdgeStatus>,
}

impl SyncAgent {
    pub fn new(config: &Config, status_tx: watch::Sender<EdgeStatus>) -> Result<Self, ClientError> {
        let client = CloudClient::new(&config.cloud_url, &config.edge_id, config.request_timeout)?;

        Ok(Self {
            client,
            edge_id: config.edge_id.clone(),
            poll_interval: config.poll_interval,
            token: config.token.clone(),
            site_id: None,
            config: None,
            status_tx,
        })
    }

    /// Run the agent forever.
    ///
    /// The first tick runs immediately. Only one tick is in flight at a
    /// time; the interval to the next tick starts after the previous one
    /// completed, so polls never overlap.
    #[instrument(name = "agent", skip_all)]
    pub async fn run(mut self) {
        if self.token.is_none() {
            // without a credential there is nothing to retry; we serve the
            // local API and wait for an operator-provided token on restart
            warn!("no enrollment token provided, staying unregistered");
        }

        loop {
            self.tick().await;
            tokio::time::sleep(self.poll_interval).await;
        }
    }

    /// One scheduling tick: attempt registration while unregistered and a
    /// token is at hand, then refresh the configuration once registered.
    pub async fn tick(&mut self) {
        if self.site_id.is_none() && self.token.is_some() {
            self.try_register().await;
        }

        if self.site_id.is_some() {
            self.refresh_config().await;
        }
    }

    async fn try_register(&mut self) {
        let Some(token) = self.token.clone() else {
            return;
        };

        match self.client.register(&token).await {
            Ok(site_id) => {
                info!(%site_id, "registered with cloud");
                self.site_id = Some(site_id);
                // the token was consumed on the cloud side; never reuse it
                self.token = None;
                self.publish();
            }
            Err(e) => {
                // keep the token so the next tick retries identically
                warn!("registration failed: {e}");
            }
        }
    }

    async fn refresh_config(&mut self) {
        match self.client.desired_config().await {
            Ok(config) => {
                if self.config.as_ref() != Some(&config) {
                    info!("desired configuration updated");
                }
                self.config = Some(config);
                self.publish();
            }
            Err(e) => {
                // staleness is tolerated; keep the previous configuration
                warn!("config refresh failed: {e}");
            }
        }
    }

    fn publish(&self) {
        self.status_tx.send_replace(EdgeStatus {
            edge_id: self.edge_id.clone(),
            registered: self.site_id.is_some(),
            site_id: self.site_id.clone(),
            config: self.config.clone(),
        });
    }
}
