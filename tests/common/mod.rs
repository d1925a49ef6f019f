//! Shared helpers for driving the router in-process.
#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use http_body_util::BodyExt;
use publish_notifier::{
    api::{AppState, router},
    config::Config,
    models::validation::{SIGNATURE_HEADER, sign_payload},
};
use serde_json::Value;
use tower::ServiceExt;
use wiremock::MockServer;

pub const SECRET: &str = "test-webhook-secret";
pub const SITE_URL: &str = "https://studio.test";
pub const RECIPIENT: &str = "team@studio.test";

/// Mock servers standing in for the chat webhook and the email API.
pub struct Upstreams {
    pub discord: MockServer,
    pub email: MockServer,
}

impl Upstreams {
    pub async fn start() -> Self {
        Self {
            discord: MockServer::start().await,
            email: MockServer::start().await,
        }
    }

    pub fn config(&self) -> Config {
        Config::from_vars(vec![
            ("SANITY_WEBHOOK_SECRET".to_string(), SECRET.to_string()),
            ("SITE_URL".to_string(), SITE_URL.to_string()),
            (
                "DISCORD_WEBHOOK_URL".to_string(),
                format!("{}/webhook", self.discord.uri()),
            ),
            ("RESEND_API_KEY".to_string(), "re_test".to_string()),
            ("RESEND_API_URL".to_string(), self.email.uri()),
            ("EMAIL_TEST_RECIPIENT".to_string(), RECIPIENT.to_string()),
            ("EMAIL_PREVIEW_BLOCK_LIMIT".to_string(), "2".to_string()),
        ])
        .unwrap()
    }

    pub fn app(&self) -> Router {
        build_app(&self.config())
    }
}

pub fn build_app(config: &Config) -> Router {
    router(Arc::new(AppState::from_config(config).unwrap()))
}

pub fn signed_header(body: &[u8]) -> String {
    sign_payload(SECRET, 1_760_000_000_000, body)
}

/// POST a publish webhook with an optional signature header.
pub async fn post_webhook(
    app: Router,
    body: &[u8],
    signature: Option<&str>,
) -> (StatusCode, Value) {
    let mut request = Request::builder()
        .method("POST")
        .uri("/api/webhooks/publish")
        .header("content-type", "application/json");
    if let Some(signature) = signature {
        request = request.header(SIGNATURE_HEADER, signature);
    }
    let request = request.body(Body::from(body.to_vec())).unwrap();

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json: Value = serde_json::from_slice(&bytes).unwrap();

    (status, json)
}

/// POST a correctly signed JSON document.
pub async fn post_signed(app: Router, document: &Value) -> (StatusCode, Value) {
    let body = serde_json::to_vec(document).unwrap();
    let signature = signed_header(&body);
    post_webhook(app, &body, Some(&signature)).await
}

pub async fn get_json(app: Router, uri: &str) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json: Value = serde_json::from_slice(&bytes).unwrap();

    (status, json)
}
