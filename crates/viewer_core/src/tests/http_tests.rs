use super::*;

use std::time::Duration;

use axum::{http::StatusCode, routing::get, Json, Router};
use tokio::net::TcpListener;

use crate::outcome::FetchFault;
use shared::error::ErrorCode;

async fn spawn_stub(app: Router) -> Url {
    std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind stub server");
    let addr = listener.local_addr().expect("stub addr");
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    Url::parse(&format!("http://{addr}")).expect("stub url")
}

#[tokio::test]
async fn fact_success_parses_payload() {
    let app = Router::new().route(
        "/fact",
        get(|| async { Json(serde_json::json!({"fact": "Cats rule", "length": 9})) }),
    );
    let source = HttpFactSource::new(Client::new(), spawn_stub(app).await);

    assert_eq!(
        source.fetch_fact().await,
        Outcome::Success(FactPayload {
            fact: "Cats rule".to_string(),
        })
    );
}

#[tokio::test]
async fn error_payload_body_becomes_domain_error() {
    let app = Router::new().route(
        "/fact",
        get(|| async {
            (
                StatusCode::TOO_MANY_REQUESTS,
                Json(serde_json::json!({"code": "rate_limited", "message": "slow down"})),
            )
        }),
    );
    let source = HttpFactSource::new(Client::new(), spawn_stub(app).await);

    match source.fetch_fact().await {
        Outcome::DomainError(error) => {
            assert_eq!(error.code, ErrorCode::RateLimited);
            assert_eq!(error.message, "slow down");
        }
        other => panic!("unexpected outcome: {other:?}"),
    }
}

#[tokio::test]
async fn bare_error_status_synthesizes_domain_error() {
    let app = Router::new().route(
        "/fact",
        get(|| async { (StatusCode::NOT_FOUND, "no cats here") }),
    );
    let source = HttpFactSource::new(Client::new(), spawn_stub(app).await);

    match source.fetch_fact().await {
        Outcome::DomainError(error) => {
            assert_eq!(error.code, ErrorCode::NotFound);
            assert_eq!(error.message, "no cats here");
        }
        other => panic!("unexpected outcome: {other:?}"),
    }
}

#[tokio::test]
async fn malformed_success_body_is_decode_fault() {
    let app = Router::new().route("/fact", get(|| async { "definitely not json" }));
    let source = HttpFactSource::new(Client::new(), spawn_stub(app).await);

    match source.fetch_fact().await {
        Outcome::TransportFault(FetchFault::Decode { .. }) => {}
        other => panic!("unexpected outcome: {other:?}"),
    }
}

#[tokio::test]
async fn slow_server_classifies_as_timeout() {
    let app = Router::new().route(
        "/fact",
        get(|| async {
            tokio::time::sleep(Duration::from_millis(500)).await;
            Json(serde_json::json!({"fact": "too late"}))
        }),
    );
    let client = reqwest::Client::builder()
        .timeout(Duration::from_millis(50))
        .build()
        .expect("client");
    let source = HttpFactSource::new(client, spawn_stub(app).await);

    assert_eq!(
        source.fetch_fact().await,
        Outcome::TransportFault(FetchFault::Timeout)
    );
}

#[tokio::test]
async fn unreachable_host_is_connect_fault() {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    drop(listener);

    let base = Url::parse(&format!("http://{addr}")).expect("url");
    let source = HttpFactSource::new(Client::new(), base);

    match source.fetch_fact().await {
        Outcome::TransportFault(FetchFault::Connect { .. }) => {}
        other => panic!("unexpected outcome: {other:?}"),
    }
}

#[tokio::test]
async fn image_search_parses_array_in_order() {
    let app = Router::new().route(
        "/v1/images/search",
        get(|| async {
            Json(serde_json::json!([
                {"id": "a1", "url": "https://cdn.example/1.jpg", "width": 100, "height": 80},
                {"id": "b2", "url": "https://cdn.example/2.jpg"},
            ]))
        }),
    );
    let source = HttpImageSource::new(Client::new(), spawn_stub(app).await);

    assert_eq!(
        source.fetch_random_images().await,
        Outcome::Success(vec![
            ImagePayload {
                url: "https://cdn.example/1.jpg".to_string(),
            },
            ImagePayload {
                url: "https://cdn.example/2.jpg".to_string(),
            },
        ])
    );
}
