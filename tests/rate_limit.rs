//! Rate limiting and shutdown behaviour against a live server.

use serde_json::Value;
use taskflow_monitor::config::MonitorConfig;
use taskflow_monitor::store::{MetricKind, MetricPayload};

mod common;

fn limited_config(limit: u32) -> MonitorConfig {
    let mut config = MonitorConfig::default();
    config.rate_limit.limit = limit;
    config.rate_limit.window_secs = 60;
    config
}

#[tokio::test]
async fn test_requests_over_the_limit_are_rejected() {
    let server = common::spawn_server(limited_config(3)).await;
    let client = common::client();

    for _ in 0..3 {
        let res = client.get(server.url("/ok")).send().await.unwrap();
        assert_eq!(res.status(), 200);
    }

    let res = client.get(server.url("/ok")).send().await.unwrap();
    assert_eq!(res.status(), 429);

    let retry_after: u64 = res.headers()["retry-after"].to_str().unwrap().parse().unwrap();
    assert!((1..=60).contains(&retry_after));
    assert_eq!(res.headers()["x-content-type-options"], "nosniff");

    let body: Value = res.json().await.unwrap();
    assert_eq!(body["error"], "Rate limit exceeded");
    assert!(body["retry_after"].as_f64().unwrap() <= 60.0);

    let events = server.state.store.snapshot(MetricKind::Security);
    assert_eq!(events.len(), 1);
    match &events[0].payload {
        MetricPayload::Security(e) => {
            assert_eq!(e.event_type, "rate_limit_exceeded");
            assert_eq!(e.details["client"], "127.0.0.1");
            assert_eq!(e.details["endpoint"], "/ok");
            assert_eq!(e.details["path"], "/ok");
        }
        other => panic!("unexpected payload {:?}", other),
    }

    // Rejected requests are still counted as traffic.
    let requests = server.state.store.snapshot(MetricKind::Request);
    assert_eq!(requests.len(), 4);
    assert_eq!(requests[3].as_request().unwrap().status_code, 429);

    server.stop().await.unwrap();
}

#[tokio::test]
async fn test_endpoints_keep_separate_windows() {
    let server = common::spawn_server(limited_config(2)).await;
    let client = common::client();

    for path in ["/ok", "/ok", "/tasks/1", "/tasks/2", "/monitoring/api/alerts", "/monitoring/health"] {
        let res = client.get(server.url(path)).send().await.unwrap();
        assert_eq!(res.status(), 200, "{} should be within its own limit", path);
    }

    let res = client.get(server.url("/ok")).send().await.unwrap();
    assert_eq!(res.status(), 429);
    let res = client.get(server.url("/tasks/3")).send().await.unwrap();
    assert_eq!(res.status(), 429);

    let res = client.get(server.url("/monitoring/api/alerts")).send().await.unwrap();
    assert_eq!(res.status(), 200);

    server.stop().await.unwrap();
}

#[tokio::test]
async fn test_disabled_limiter_lets_everything_through() {
    let mut config = limited_config(1);
    config.rate_limit.enabled = false;
    let server = common::spawn_server(config).await;
    let client = common::client();

    for _ in 0..5 {
        let res = client.get(server.url("/ok")).send().await.unwrap();
        assert_eq!(res.status(), 200);
    }
    assert_eq!(server.state.store.len(MetricKind::Security), 0);

    server.stop().await.unwrap();
}

#[tokio::test]
async fn test_server_stops_on_shutdown() {
    let server = common::spawn_server(MonitorConfig::default()).await;
    let client = common::client();
    let url = server.url("/ok");

    assert_eq!(client.get(&url).send().await.unwrap().status(), 200);
    server.stop().await.unwrap();

    assert!(client.get(&url).send().await.is_err());
}
