//! HTTP-level tests for the real catalog client: bearer caching, the
//! single retry-after-401 path, and error mapping for non-2xx responses.

use std::time::Duration;

use promoflow::catalog::{CatalogClient, ShopeeCatalogClient};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn client_for(server: &MockServer) -> ShopeeCatalogClient {
    ShopeeCatalogClient::new(server.uri(), "user".to_string(), "pass".to_string(), Duration::from_secs(5)).unwrap()
}

#[tokio::test]
async fn search_succeeds_after_login() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({ "access_token": "tok-1" })))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/products/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "nodes": [{ "item_id": "1", "product_name": "Phone" }]
        })))
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    let nodes = client.search_products("iphone", 12).await.unwrap();
    assert_eq!(nodes.len(), 1);
    assert_eq!(nodes[0].item_id, "1");
}

#[tokio::test]
async fn retries_once_after_401_then_succeeds() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({ "access_token": "tok-1" })))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({ "access_token": "tok-2" })))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/products/search"))
        .respond_with(ResponseTemplate::new(401))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/products/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({ "nodes": [] })))
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    let nodes = client.search_products("iphone", 12).await.unwrap();
    assert!(nodes.is_empty());
}

#[tokio::test]
async fn missing_credentials_fail_fast() {
    let server = MockServer::start().await;
    let client = ShopeeCatalogClient::new(server.uri(), String::new(), String::new(), Duration::from_secs(5)).unwrap();
    let err = client.search_products("iphone", 12).await.unwrap_err();
    assert!(matches!(err, promoflow::error::CatalogError::CredentialsMissing));
}
