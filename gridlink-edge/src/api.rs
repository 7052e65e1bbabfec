//! Local HTTP API of the edge controller.
//!
//! Reports the agent's registration state and cached configuration, and
//! serves a handful of dummy measurement points for monitoring demos.

use axum::{
    body::Body,
    extract::State,
    http::{Request, Response},
    routing::get,
    Json, Router,
};
use serde_json::{json, Value};
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{
    debug_span,
    field::{display, Empty},
    info, instrument, Span,
};

use crate::agent::EdgeStatus;

type StatusRx = watch::Receiver<EdgeStatus>;

/// Build the router over the agent's status channel.
pub fn router(status_rx: StatusRx) -> Router {
    let app = Router::new()
        .route("/health", get(health))
        .route("/status", get(status))
        .route("/points", get(points));

    // Allow all origins so a browser UI can talk to the API directly
    let app = app.layer(
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any),
    );

    // Enable tracing
    let app = app.layer(
        TraceLayer::new_for_http()
            .make_span_with(|request: &Request<Body>| {
                debug_span!("request",
                    method = %request.method(),
                    uri = %request.uri().path(),
                    status = Empty,
                )
            })
            .on_response(|response: &Response<Body>, _: Duration, span: &Span| {
                span.record("status", display(response.status()));
            }),
    );

    app.with_state(status_rx)
}

/// Start the API on an already-bound listener.
#[instrument(name = "api", skip_all)]
pub async fn start(listener: TcpListener, status_rx: StatusRx) {
    let app = router(status_rx);

    info!("ready");

    // safe because `serve` will never return an error (or return at all).
    axum::serve(listener, app).await.unwrap()
}

async fn health() -> Json<Value> {
    Json(json!({"status": "ok"}))
}

/// Handle `GET /status`
///
/// Returns the edge id, whether it is registered, the bound site and the
/// last successfully fetched configuration.
async fn status(State(status_rx): State<StatusRx>) -> Json<EdgeStatus> {
    let status = status_rx.borrow().clone();
    Json(status)
}

/// Handle `GET /points`
///
/// Dummy measurement points simulating changing readings.
async fn points() -> Json<Value> {
    Json(json!({
        "pcc_active_power_kw": round(fastrand::f64() * 10.0 - 5.0, 100.0),
        "bess_soc_pct": round(20.0 + fastrand::f64() * 60.0, 10.0),
        "pv_power_kw": round(fastrand::f64() * 10.0, 100.0),
    }))
}

fn round(value: f64, scale: f64) -> f64 {
    (value * scale).round() / scale
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn setup_test_server() -> (u16, watch::Sender<EdgeStatus>) {
        let (status_tx, status_rx) = watch::channel(EdgeStatus::unregistered("edge-9".into()));

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();

        tokio::spawn(start(listener, status_rx));

        tokio::time::sleep(tokio::time::Duration::from_millis(10)).await;

        (port, status_tx)
    }

    #[tokio::test]
    async fn test_status_reflects_the_agent_channel() {
        let (port, status_tx) = setup_test_server().await;
        let client = reqwest::Client::new();

        let body: Value = client
            .get(format!("http://127.0.0.1:{port}/status"))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();

        assert_eq!(
            body,
            json!({
                "edge_id": "edge-9",
                "registered": false,
                "site_id": null,
                "config": null,
            })
        );

        status_tx.send_replace(EdgeStatus {
            edge_id: "edge-9".into(),
            registered: true,
            site_id: Some("site-A".into()),
            config: Some(json!({"v": 1})),
        });

        let body: Value = client
            .get(format!("http://127.0.0.1:{port}/status"))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();

        assert_eq!(
            body,
            json!({
                "edge_id": "edge-9",
                "registered": true,
                "site_id": "site-A",
                "config": {"v": 1},
            })
        );
    }

    #[tokio::test]
    async fn test_points_stay_within_their_ranges() {
        let (port, _status_tx) = setup_test_server().await;
        let client = reqwest::Client::new();

        for _ in 0..10 {
            let body: Value = client
                .get(format!("http://127.0.0.1:{port}/points"))
                .send()
                .await
                .unwrap()
                .json()
                .await
                .unwrap();

            let pcc = body["pcc_active_power_kw"].as_f64().unwrap();
            let soc = body["bess_soc_pct"].as_f64().unwrap();
            let pv = body["pv_power_kw"].as_f64().unwrap();

            assert!((-5.0..=5.0).contains(&pcc));
            assert!((20.0..=80.0).contains(&soc));
            assert!((0.0..=10.0).contains(&pv));
        }
    }

    #[tokio::test]
    async fn test_health() {
        let (port, _status_tx) = setup_test_server().await;
        let client = reqwest::Client::new();

        let body: Value = client
            .get(format!("http://127.0.0.1:{port}/health"))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();

        assert_eq!(body, json!({"status": "ok"}));
    }
}
