//! HTTP surface of the cloud coordinator.
//!
//! JSON in, JSON out. Failures come back as the matching status code with
//! a `{"detail": ...}` body.

use axum::{
    body::Body,
    extract::{Path, State},
    http::{Request, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use std::time::Duration;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{
    debug_span,
    field::{display, Empty},
    info, instrument, Span,
};

use gridlink_types::{EdgeId, EdgeList, RegisterRequest, RegisterResponse, SiteId, TokenResponse};

use crate::{Cloud, CloudError};

/// Build the router over a [`Cloud`] instance.
pub fn router(cloud: Cloud) -> Router {
    let app = Router::new()
        .route("/health", get(health))
        .route(
            "/api/sites/{site_id}/desired-config",
            post(set_desired_config).get(get_desired_config),
        )
        .route("/api/sites/{site_id}/enrollment-token", post(issue_token))
        .route("/api/edge/register", post(register_edge))
        .route("/api/edges/{edge_id}/desired-config", get(get_edge_config))
        .route("/api/edges", get(list_edges));

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

    app.with_state(cloud)
}

/// Start the API on an already-bound listener.
#[instrument(name = "api", skip_all)]
pub async fn start(listener: TcpListener, cloud: Cloud) {
    let app = router(cloud);

    info!("ready");

    // safe because `serve` will never return an error (or return at all).
    axum::serve(listener, app).await.unwrap()
}

async fn health() -> Json<Value> {
    Json(json!({"status": "ok"}))
}

/// Handle `POST /api/sites/{site_id}/desired-config`
///
/// Overwrites any existing configuration for the site.
async fn set_desired_config(
    State(cloud): State<Cloud>,
    Path(site_id): Path<SiteId>,
    Json(config): Json<Value>,
) -> Json<Value> {
    cloud.set_desired_config(site_id, config).await;
    Json(json!({"status": "saved"}))
}

/// Handle `GET /api/sites/{site_id}/desired-config`
async fn get_desired_config(
    State(cloud): State<Cloud>,
    Path(site_id): Path<SiteId>,
) -> Result<Json<Value>, CloudError> {
    cloud.desired_config(&site_id).await.map(Json)
}

/// Handle `POST /api/sites/{site_id}/enrollment-token`
///
/// The site must already have a configuration entry.
async fn issue_token(
    State(cloud): State<Cloud>,
    Path(site_id): Path<SiteId>,
) -> Result<Json<TokenResponse>, CloudError> {
    let token = cloud.issue_token(&site_id).await?;
    Ok(Json(TokenResponse { token }))
}

/// Handle `POST /api/edge/register`
///
/// Redeems the enrollment token and binds the edge to the token's site.
async fn register_edge(
    State(cloud): State<Cloud>,
    Json(request): Json<RegisterRequest>,
) -> Result<Json<RegisterResponse>, CloudError> {
    let site_id = cloud.register(request.edge_id, &request.token).await?;
    Ok(Json(RegisterResponse { site_id }))
}

/// Handle `GET /api/edges/{edge_id}/desired-config`
async fn get_edge_config(
    State(cloud): State<Cloud>,
    Path(edge_id): Path<EdgeId>,
) -> Result<Json<Value>, CloudError> {
    cloud.config_for(&edge_id).await.map(Json)
}

/// Handle `GET /api/edges`
async fn list_edges(State(cloud): State<Cloud>) -> Json<EdgeList> {
    Json(EdgeList {
        edges: cloud.list_edges().await,
    })
}
