//! E2E tests for the identity-bridging OAuth flow

mod common;

use std::collections::HashMap;

use amberfeed::auth::{sign_state, BridgeState};
use common::{TestServer, TEST_STATE_SECRET};
use serde_json::Value;

fn location_header(response: &reqwest::Response) -> String {
    response
        .headers()
        .get("Location")
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default()
        .to_string()
}

fn query_params(location: &str) -> HashMap<String, String> {
    url::Url::parse(location)
        .unwrap()
        .query_pairs()
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect()
}

/// Drive the authorize endpoint and pull the signed state out of the
/// provider redirect.
async fn authorize_and_extract_state(server: &TestServer, client_redirect_uri: &str) -> String {
    let response = server
        .client
        .get(server.url(&format!(
            "/oauth/authorize?redirect_uri={}&response_type=code&client_id=x",
            urlencoding::encode(client_redirect_uri)
        )))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 302);
    let params = query_params(&location_header(&response));
    params.get("state").cloned().expect("state parameter")
}

#[tokio::test]
async fn test_authorize_redirects_to_provider() {
    let server = TestServer::new().await;

    let response = server
        .client
        .get(server.url(
            "/oauth/authorize?redirect_uri=https%3A%2F%2Felk.zone%2Fcb&response_type=code&client_id=x",
        ))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 302);
    let location = location_header(&response);
    assert!(location.starts_with(&format!("{}/login/oauth/authorize?", server.provider.uri())));

    let params = query_params(&location);
    assert_eq!(params["client_id"], "test-client-id");
    assert_eq!(params["scope"], "read:user");
    assert_eq!(
        params["redirect_uri"],
        format!("{}/oauth/provider/callback", server.public_base_url())
    );
    assert!(!params["state"].is_empty());
}

#[tokio::test]
async fn test_authorize_requires_redirect_uri() {
    let server = TestServer::new().await;

    let response = server
        .client
        .get(server.url("/oauth/authorize?response_type=code&client_id=x"))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 400);
}

#[tokio::test]
async fn test_callback_redirects_client_with_provider_token_as_code() {
    let server = TestServer::new().await;
    server.mock_provider_exchange("gh-token-123").await;
    server.mock_provider_login(common::TEST_OWNER_LOGIN).await;

    let state = authorize_and_extract_state(&server, "https://elk.zone/cb").await;

    let response = server
        .client
        .get(server.url(&format!(
            "/oauth/provider/callback?code=provider-code&state={}",
            urlencoding::encode(&state)
        )))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 302);
    let location = location_header(&response);
    assert!(location.starts_with("https://elk.zone/cb?code="));
    assert_eq!(location, "https://elk.zone/cb?code=gh-token-123");
}

#[tokio::test]
async fn test_callback_rejects_tampered_state() {
    let server = TestServer::new().await;
    server.mock_provider_exchange("gh-token-123").await;
    server.mock_provider_login(common::TEST_OWNER_LOGIN).await;

    let state = authorize_and_extract_state(&server, "https://elk.zone/cb").await;

    // Flip one character of the signed token.
    let mut tampered = state.clone();
    tampered.replace_range(0..1, if &state[0..1] == "A" { "B" } else { "A" });

    let response = server
        .client
        .get(server.url(&format!(
            "/oauth/provider/callback?code=provider-code&state={}",
            urlencoding::encode(&tampered)
        )))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 400);
}

#[tokio::test]
async fn test_callback_rejects_expired_state() {
    let server = TestServer::new().await;
    server.mock_provider_exchange("gh-token-123").await;
    server.mock_provider_login(common::TEST_OWNER_LOGIN).await;

    let stale = BridgeState {
        client_redirect_uri: "https://elk.zone/cb".to_string(),
        issued_at: chrono::Utc::now().timestamp_millis() - 601 * 1_000,
    };
    let state = sign_state(&stale, TEST_STATE_SECRET).unwrap();

    let response = server
        .client
        .get(server.url(&format!(
            "/oauth/provider/callback?code=provider-code&state={}",
            urlencoding::encode(&state)
        )))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 400);
}

#[tokio::test]
async fn test_callback_rejects_non_owner_identity() {
    let server = TestServer::new().await;
    server.mock_provider_exchange("gh-token-123").await;
    server.mock_provider_login("somebody-else").await;

    let state = authorize_and_extract_state(&server, "https://elk.zone/cb").await;

    let response = server
        .client
        .get(server.url(&format!(
            "/oauth/provider/callback?code=provider-code&state={}",
            urlencoding::encode(&state)
        )))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 403);
}

#[tokio::test]
async fn test_callback_without_provider_token_fails() {
    let server = TestServer::new().await;

    // Exchange succeeds at the HTTP level but carries no token.
    wiremock::Mock::given(wiremock::matchers::method("POST"))
        .and(wiremock::matchers::path("/login/oauth/access_token"))
        .respond_with(
            wiremock::ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({ "error": "bad_verification_code" })),
        )
        .mount(&server.provider)
        .await;

    let state = authorize_and_extract_state(&server, "https://elk.zone/cb").await;

    let response = server
        .client
        .get(server.url(&format!(
            "/oauth/provider/callback?code=provider-code&state={}",
            urlencoding::encode(&state)
        )))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 502);
}

#[tokio::test]
async fn test_callback_relays_provider_denial_to_client() {
    let server = TestServer::new().await;

    let state = authorize_and_extract_state(&server, "https://elk.zone/cb").await;

    let response = server
        .client
        .get(server.url(&format!(
            "/oauth/provider/callback?error=access_denied&state={}",
            urlencoding::encode(&state)
        )))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 302);
    assert_eq!(
        location_header(&response),
        "https://elk.zone/cb?error=access_denied"
    );
}

#[tokio::test]
async fn test_token_exchange_returns_code_verbatim() {
    let server = TestServer::new().await;

    let response = server
        .client
        .post(server.url("/oauth/token"))
        .json(&serde_json::json!({
            "grant_type": "authorization_code",
            "code": "gh-token-123",
            "client_id": "amberfeed",
        }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 200);
    let json: Value = response.json().await.unwrap();
    assert_eq!(json["access_token"], "gh-token-123");
    assert_eq!(json["token_type"], "Bearer");
    assert!(!json["scope"].as_str().unwrap().is_empty());
    assert!(json["created_at"].is_i64());
}

#[tokio::test]
async fn test_token_exchange_accepts_form_encoding() {
    let server = TestServer::new().await;

    let response = server
        .client
        .post(server.url("/oauth/token"))
        .form(&[
            ("grant_type", "authorization_code"),
            ("code", "gh-token-456"),
        ])
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 200);
    let json: Value = response.json().await.unwrap();
    assert_eq!(json["access_token"], "gh-token-456");
}

#[tokio::test]
async fn test_token_exchange_rejects_client_credentials_grant() {
    let server = TestServer::new().await;

    let response = server
        .client
        .post(server.url("/oauth/token"))
        .json(&serde_json::json!({
            "grant_type": "client_credentials",
            "client_id": "amberfeed",
        }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 400);
    let json: Value = response.json().await.unwrap();
    assert_eq!(json["error"], "invalid_grant");
    assert!(json["error_description"].is_string());
}

#[tokio::test]
async fn test_token_exchange_requires_code() {
    let server = TestServer::new().await;

    let response = server
        .client
        .post(server.url("/oauth/token"))
        .json(&serde_json::json!({
            "grant_type": "authorization_code",
        }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 400);
    let json: Value = response.json().await.unwrap();
    assert_eq!(json["error"], "invalid_grant");
}
