use clap::Parser;
use std::net::SocketAddr;

#[derive(Clone, Debug, Parser)]
#[command(version, about, long_about = None)] // read from Cargo.toml
pub struct Cli {
    /// Address to serve the cloud HTTP API on
    #[arg(
        env = "CLOUD_LISTEN_ADDRESS",
        long = "listen-address",
        value_name = "addr",
        default_value = "0.0.0.0:8080"
    )]
    pub listen_address: SocketAddr,
}

pub fn parse() -> Cli {
    Parser::parse()
}
