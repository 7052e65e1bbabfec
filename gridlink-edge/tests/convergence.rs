//! End-to-end tests running the real cloud router and the real agent.

use std::time::Duration;

use serde_json::json;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tokio::time::timeout;
use url::Url;

use gridlink_cloud::{Cloud, CloudError};
use gridlink_edge::agent::{EdgeStatus, SyncAgent};
use gridlink_edge::config::Config;
use gridlink_types::SiteId;

async fn start_cloud() -> (Cloud, Url) {
    let cloud = Cloud::new();

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();

    tokio::spawn(gridlink_cloud::start(listener, cloud.clone()));
    tokio::time::sleep(Duration::from_millis(10)).await;

    let base = Url::parse(&format!("http://127.0.0.1:{port}")).unwrap();
    (cloud, base)
}

fn edge_config(base: Url, token: Option<gridlink_types::EnrollmentToken>) -> Config {
    Config {
        edge_id: "edge-9".into(),
        cloud_url: base,
        token,
        local_address: "127.0.0.1:0".parse().unwrap(),
        poll_interval: Duration::from_millis(50),
        request_timeout: Duration::from_secs(5),
    }
}

async fn wait_for<F>(rx: &mut watch::Receiver<EdgeStatus>, pred: F) -> EdgeStatus
where
    F: Fn(&EdgeStatus) -> bool,
{
    timeout(Duration::from_secs(2), async {
        loop {
            {
                let status = rx.borrow_and_update();
                if pred(&status) {
                    return status.clone();
                }
            }
            rx.changed().await.unwrap();
        }
    })
    .await
    .expect("agent did not reach the expected state in time")
}

#[tokio::test]
async fn agent_converges_and_tracks_config_updates() {
    let (cloud, base) = start_cloud().await;

    cloud
        .set_desired_config("site-A".into(), json!({"v": 1}))
        .await;
    let token = cloud.issue_token(&"site-A".into()).await.unwrap();

    let config = edge_config(base, Some(token.clone()));
    let (status_tx, mut status_rx) =
        watch::channel(EdgeStatus::unregistered(config.edge_id.clone()));
    let agent = SyncAgent::new(&config, status_tx).unwrap();
    tokio::spawn(agent.run());

    // the agent registers and pulls the config within its first tick
    let status = wait_for(&mut status_rx, |s| s.registered && s.config.is_some()).await;
    assert_eq!(status.site_id, Some("site-A".into()));
    assert_eq!(status.config, Some(json!({"v": 1})));

    // a config update is reflected within one polling interval
    cloud
        .set_desired_config("site-A".into(), json!({"v": 2}))
        .await;
    let status = wait_for(&mut status_rx, |s| s.config == Some(json!({"v": 2}))).await;
    assert!(status.registered);
    assert_eq!(status.site_id, Some("site-A".into()));

    // the token was consumed by the successful registration
    let reuse = cloud.register("edge-10".into(), &token).await;
    assert!(matches!(reuse, Err(CloudError::InvalidToken)));
}

#[tokio::test]
async fn agent_survives_an_invalid_token() {
    let (cloud, base) = start_cloud().await;

    // a token issued by some other authority; the cloud has never seen it
    let config = edge_config(base, Some("not-a-real-token".into()));
    let (status_tx, mut status_rx) =
        watch::channel(EdgeStatus::unregistered(config.edge_id.clone()));
    let agent = SyncAgent::new(&config, status_tx).unwrap();
    tokio::spawn(agent.run());

    // a few ticks pass without the agent registering or crashing
    tokio::time::sleep(Duration::from_millis(200)).await;
    assert!(!status_rx.borrow().registered);
    assert!(cloud.list_edges().await.is_empty());

    // the cloud never bound anything for the failed attempts
    let lookup = cloud.config_for(&"edge-9".into()).await;
    assert!(matches!(lookup, Err(CloudError::NotRegistered)));
}

#[tokio::test]
async fn two_edges_share_one_site_with_separate_tokens() {
    let (cloud, base) = start_cloud().await;

    cloud
        .set_desired_config("site-A".into(), json!({"mode": "peak-shave"}))
        .await;

    for edge in ["edge-1", "edge-2"] {
        let token = cloud.issue_token(&"site-A".into()).await.unwrap();
        let site_id = cloud.register(edge.into(), &token).await.unwrap();
        assert_eq!(site_id, SiteId::from("site-A"));
    }

    // an agent for a third edge with its own token joins the same site
    let token = cloud.issue_token(&"site-A".into()).await.unwrap();
    let mut config = edge_config(base, Some(token));
    config.edge_id = "edge-3".into();

    let (status_tx, mut status_rx) =
        watch::channel(EdgeStatus::unregistered(config.edge_id.clone()));
    let agent = SyncAgent::new(&config, status_tx).unwrap();
    tokio::spawn(agent.run());

    let status = wait_for(&mut status_rx, |s| s.registered).await;
    assert_eq!(status.site_id, Some("site-A".into()));
    assert_eq!(cloud.list_edges().await.len(), 3);
}
