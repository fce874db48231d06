/*
[INPUT]:  Test configuration and mock server requirements
[OUTPUT]: Shared test utilities, fixtures, and mock helpers
[POS]:    Test infrastructure - shared across all test modules
[UPDATE]: When adding new test patterns or fixtures
*/

//! Common test utilities for carbonhub-adapter tests

#![allow(dead_code)]

use std::sync::Arc;

use carbonhub_adapter::{
    Authenticator, CarbonHubClient, ClientConfig, MemorySessionStore, SessionContext,
};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Setup a mock HTTP server for testing
pub async fn setup_mock_server() -> MockServer {
    MockServer::start().await
}

pub fn client_for(server: &MockServer) -> CarbonHubClient {
    CarbonHubClient::with_config(ClientConfig::with_api_host(server.uri()))
        .expect("client should build")
}

/// Authenticator backed by an in-memory store
pub fn authenticator_for(server: &MockServer) -> (Authenticator, Arc<MemorySessionStore>) {
    let store = Arc::new(MemorySessionStore::new());
    let sessions = SessionContext::new(store.clone());
    (Authenticator::new(client_for(server), sessions), store)
}

/// Success envelope around `data`
pub fn success(data: serde_json::Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(serde_json::json!({
        "status": "success",
        "message": "ok",
        "data": data,
    }))
}

/// Error envelope carrying `message`
pub fn failure(message: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(serde_json::json!({
        "status": "error",
        "message": message,
        "data": null,
    }))
}

pub async fn mount_challenge(server: &MockServer, challenge: &str) {
    Mock::given(method("POST"))
        .and(path("/auth/request-challenge"))
        .respond_with(success(serde_json::json!({ "challenge": challenge })))
        .mount(server)
        .await;
}
