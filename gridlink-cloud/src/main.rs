use std::error::Error;

use tokio::net::TcpListener;
use tracing::debug;
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};

mod cli;

use gridlink_cloud::Cloud;

fn initialize_tracing() {
    // Initialize tracing subscriber for human-readable logs
    tracing_subscriber::registry()
        .with(
            // Use some log defaults. These can be overriden using RUST_LOG
            EnvFilter::try_from_default_env().unwrap_or(
                EnvFilter::default()
                    .add_directive("debug".parse().unwrap())
                    .add_directive("hyper=error".parse().unwrap())
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
    debug!("{cli:#?}");

    let cloud = Cloud::new();

    // Bind first so a taken port fails fast
    let listener = TcpListener::bind(cli.listen_address).await?;
    debug!("bound to {}", cli.listen_address);

    gridlink_cloud::start(listener, cloud).await;

    Ok(())
}
