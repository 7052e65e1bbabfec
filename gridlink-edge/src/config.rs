use std::net::SocketAddr;
use std::time::Duration;

use url::Url;

use gridlink_types::{EdgeId, EnrollmentToken};

use crate::cli::Cli;

/// Runtime configuration for the edge controller.
#[derive(Clone, Debug)]
pub struct Config {
    pub edge_id: EdgeId,
    pub cloud_url: Url,
    /// Bootstrap credential; consumed on first successful registration.
    pub token: Option<EnrollmentToken>,
    pub local_address: SocketAddr,
    pub poll_interval: Duration,
    pub request_timeout: Duration,
}

impl TryFrom<Cli> for Config {
    type Error = url::ParseError;

    fn try_from(cli: Cli) -> Result<Self, Self::Error> {
        Ok(Self {
            edge_id: cli.edge_id,
            cloud_url: Url::parse(&cli.cloud_url)?,
            token: cli.token,
            local_address: cli.local_address,
            poll_interval: cli.poll_interval,
            request_timeout: cli.request_timeout,
        })
    }
}
