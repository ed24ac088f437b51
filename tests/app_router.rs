mod support;

use std::net::SocketAddr;
use std::str::FromStr;
use std::sync::Arc;

use axum::body::Body;
use axum::extract::ConnectInfo;
use axum::http::{Method, Request, StatusCode};
use ipnet::IpNet;

use support::{BrokenStore, ann, config, memory_app, post_register, send};
use waitlist_api::config::{AppConfig, CorsConfig, RateLimitConfig};
use waitlist_api::create_app;
use waitlist_api::store::MemoryStore;

#[tokio::test]
async fn register_only_accepts_post() {
    let (app, _) = memory_app(false);
    let req = Request::builder()
        .method(Method::GET)
        .uri("/api/register")
        .body(Body::empty())
        .unwrap();
    let (status, _) = send(&app, req).await;
    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
}

#[tokio::test]
async fn health_reports_store_state() {
    let (app, _) = memory_app(false);
    let req = Request::builder().uri("/health").body(Body::empty()).unwrap();
    let (status, body) = send(&app, req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["store"], "ok");

    let broken = create_app(&config(false), Arc::new(BrokenStore));
    let req = Request::builder().uri("/health").body(Body::empty()).unwrap();
    let (status, body) = send(&broken, req).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["store"], "error");
}

#[tokio::test]
async fn cors_preflight_allows_configured_origin() {
    let cfg = AppConfig {
        cors: CorsConfig::Origins(vec!["https://workshop.example".into()]),
        ..AppConfig::default()
    };
    let app = create_app(&cfg, Arc::new(MemoryStore::new()));

    let req = Request::builder()
        .method(Method::OPTIONS)
        .uri("/api/register")
        .header("Origin", "https://workshop.example")
        .header("Access-Control-Request-Method", "POST")
        .header("Access-Control-Request-Headers", "content-type")
        .body(Body::empty())
        .unwrap();
    let resp = tower::util::ServiceExt::oneshot(app, req).await.unwrap();
    assert!(resp.status().is_success());
    assert_eq!(
        resp.headers()
            .get("access-control-allow-origin")
            .and_then(|v| v.to_str().ok()),
        Some("https://workshop.example")
    );
}

#[tokio::test]
async fn cors_disabled_sends_no_headers() {
    let (app, _) = memory_app(false);
    let req = Request::builder()
        .uri("/health")
        .header("Origin", "https://elsewhere.example")
        .body(Body::empty())
        .unwrap();
    let resp = tower::util::ServiceExt::oneshot(app, req).await.unwrap();
    assert!(resp.headers().get("access-control-allow-origin").is_none());
}

fn limited_app(trusted: &[&str]) -> axum::Router {
    let cfg = AppConfig {
        rate_limit: RateLimitConfig { rps: 0.001, burst: 1.0 },
        trusted_proxies: trusted.iter().map(|s| IpNet::from_str(s).unwrap()).collect(),
        ..AppConfig::default()
    };
    create_app(&cfg, Arc::new(MemoryStore::new()))
}

fn health_from(peer: &str, forwarded_for: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().uri("/health");
    if let Some(ip) = forwarded_for {
        builder = builder.header("x-forwarded-for", ip);
    }
    let mut req = builder.body(Body::empty()).unwrap();
    let peer: SocketAddr = peer.parse().unwrap();
    req.extensions_mut().insert(ConnectInfo(peer));
    req
}

#[tokio::test]
async fn rate_limiter_blocks_after_burst() {
    let app = limited_app(&[]);

    let (status, _) = send(&app, health_from("1.2.3.4:4000", None)).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(&app, health_from("1.2.3.4:4001", None)).await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(body["code"], "RATE_LIMITED");

    // another client still has its own bucket
    let (status, _) = send(&app, health_from("5.6.7.8:4000", None)).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn forwarded_for_only_honoured_from_trusted_proxy() {
    // Untrusted peer: spoofed headers all land in the peer's bucket.
    let app = limited_app(&[]);
    let (status, _) = send(&app, health_from("9.9.9.9:1", Some("1.1.1.1"))).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = send(&app, health_from("9.9.9.9:1", Some("2.2.2.2"))).await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);

    // Trusted proxy: each forwarded client gets its own bucket.
    let app = limited_app(&["10.0.0.0/8"]);
    let (status, _) = send(&app, health_from("10.0.0.5:1", Some("1.1.1.1"))).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = send(&app, health_from("10.0.0.5:1", Some("2.2.2.2"))).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = send(&app, health_from("10.0.0.5:1", Some("1.1.1.1"))).await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
}

#[tokio::test]
async fn registration_is_rate_limited_too() {
    let app = limited_app(&[]);
    let mut req_body = ann();
    let (status, _) = post_register(&app, &req_body).await;
    assert_eq!(status, StatusCode::CREATED);

    req_body["email"] = serde_json::json!("second@gmail.com");
    let (status, _) = post_register(&app, &req_body).await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
}
