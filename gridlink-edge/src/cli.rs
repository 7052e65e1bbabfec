use clap::Parser;
use std::net::SocketAddr;
use std::num::ParseIntError;
use std::time::Duration;

use gridlink_types::{EdgeId, EnrollmentToken};

fn parse_duration(s: &str) -> Result<Duration, ParseIntError> {
    let millis: u64 = s.parse()?;
    Ok(Duration::from_millis(millis))
}

#[derive(Clone, Debug, Parser)]
#[command(version, about, long_about = None)] // read from Cargo.toml
pub struct Cli {
    /// Unique identifier for this edge device
    #[arg(env = "EDGE_ID", long = "edge-id", value_name = "id", default_value = "edge-1")]
    pub edge_id: EdgeId,

    /// Base URL of the cloud API
    #[arg(
        env = "CLOUD_URL",
        long = "cloud-url",
        value_name = "url",
        default_value = "http://cloud-api:8080"
    )]
    pub cloud_url: String,

    /// Single-use enrollment token for initial registration
    #[arg(env = "EDGE_TOKEN", long = "enrollment-token", value_name = "token")]
    pub token: Option<EnrollmentToken>,

    /// Local status API listen address
    #[arg(
        env = "EDGE_LOCAL_ADDRESS",
        long = "local-address",
        value_name = "addr",
        default_value = "0.0.0.0:8000"
    )]
    pub local_address: SocketAddr,

    /// Interval between synchronization ticks in milliseconds
    #[arg(
        env = "EDGE_POLL_INTERVAL_MS",
        long = "poll-interval-ms",
        value_name = "ms",
        value_parser = parse_duration,
        default_value = "15000"
    )]
    pub poll_interval: Duration,

    /// Timeout for a single request to the cloud in milliseconds
    #[arg(
        env = "EDGE_REQUEST_TIMEOUT_MS",
        long = "request-timeout-ms",
        value_name = "ms",
        value_parser = parse_duration,
        default_value = "10000"
    )]
    pub request_timeout: Duration,
}

pub fn parse() -> Cli {
    Parser::parse()
}
