use std::error::Error;

use tokio::net::TcpListener;
use tokio::sync::watch;
use tracing::debug;
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};

use gridlink_edge::agent::{EdgeStatus, SyncAgent};
use gridlink_edge::config::Config;
use gridlink_edge::{api, cli};

fn initialize_tracing() {
    // Initialize tracing subscriber for human-readable logs
    tracing_subscriber::registry()
        .with(
            // Use some log defaults. These can be overriden using RUST_LOG
            EnvFilter::try_from_default_env().unwrap_or(
                EnvFilter::default()
                    .add_directive("debug".parse().unwrap())
                    .add_directive("hyper=error".parse().unwrap())
                    .add_directive("reqwest=info".parse().unwrap())
                    .add_directive("tower_http=info".parse().unwrap()),
            ),
        )
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_span_events(FmtSpan::CLOSE)
                .event_format(fmt::format().compact().with_target(false).without_time()),
        )
        .init();
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    initialize_tracing();

    let cli = cli::parse();
    let config: Config = cli.try_into()?;
    debug!("{config:#?}");

    let (status_tx, status_rx) = watch::channel(EdgeStatus::unregistered(config.edge_id.clone()));

    // Bind first so a taken port fails fast
    let listener = TcpListener::bind(config.local_address).await?;
    debug!("bound to {}", config.local_address);

    let agent = SyncAgent::new(&config, status_tx)?;

    // Both run forever; reaching the end of the select means one of them
    // panicked, which terminates the process
    tokio::select! {
        _ = api::start(listener, status_rx) => Ok(()),
        _ = agent.run() => Ok(()),
    }
}
