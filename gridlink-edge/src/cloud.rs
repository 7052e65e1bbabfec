//! HTTP client for the cloud coordinator's API.

use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde_json::Value;
use thiserror::Error;
use url::Url;

use gridlink_types::{EdgeId, EnrollmentToken, RegisterRequest, RegisterResponse, SiteId};

/// Errors from talking to the cloud.
///
/// The agent treats all of them the same way: log, keep local state
/// unchanged, retry on the next tick.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The cloud rejected the enrollment token.
    #[error("invalid or expired enrollment token")]
    InvalidToken,

    /// The edge is not registered, or its site has no configuration yet.
    #[error("not found")]
    NotFound,

    /// The cloud replied with an unexpected status.
    #[error("cloud replied: ({0})")]
    Status(StatusCode),

    /// Network failure, timeout, or an undecodable response body.
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("invalid cloud URL: {0}")]
    Endpoint(#[from] url::ParseError),
}

/// Client for the subset of the cloud API the agent needs.
#[derive(Clone, Debug)]
pub struct CloudClient {
    http: Client,
    edge_id: EdgeId,
    register_endpoint: Url,
    config_endpoint: Url,
}

impl CloudClient {
    /// Create a client for `edge_id` against the `base` URL.
    ///
    /// Every request carries the given timeout, so a hung call fails
    /// instead of stalling the agent forever.
    pub fn new(base: &Url, edge_id: &EdgeId, timeout: Duration) -> Result<Self, ClientError> {
        let http = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            http,
            edge_id: edge_id.clone(),
            register_endpoint: base.join("/api/edge/register")?,
            config_endpoint: base.join(&format!("/api/edges/{edge_id}/desired-config"))?,
        })
    }

    /// Redeem `token` for a site binding.
    pub async fn register(&self, token: &EnrollmentToken) -> Result<SiteId, ClientError> {
        let request = RegisterRequest {
            edge_id: self.edge_id.clone(),
            token: token.clone(),
        };

        let response = self
            .http
            .post(self.register_endpoint.clone())
            .json(&request)
            .send()
            .await?;

        match response.status() {
            status if status.is_success() => {
                let response: RegisterResponse = response.json().await?;
                Ok(response.site_id)
            }
            StatusCode::BAD_REQUEST => Err(ClientError::InvalidToken),
            status => Err(ClientError::Status(status)),
        }
    }

    /// Fetch the desired configuration the cloud holds for this edge.
    pub async fn desired_config(&self) -> Result<Value, ClientError> {
        let response = self.http.get(self.config_endpoint.clone()).send().await?;

        match response.status() {
            status if status.is_success() => Ok(response.json().await?),
            StatusCode::NOT_FOUND => Err(ClientError::NotFound),
            status => Err(ClientError::Status(status)),
        }
    }
}
