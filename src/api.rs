use std::{any::Any, sync::Arc};

use anyhow::{Error, Result};
use axum::{
    Router,
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::{get, post},
};
use tokio::net::TcpListener;
use tower_http::{catch_panic::CatchPanicLayer, trace::TraceLayer};
use tracing::{error, info};

use crate::{
    clients::{
        NotificationChannel, discord::DiscordClient, email::EmailClient, health::HealthChecker,
    },
    config::Config,
    error::WebhookError,
    models::{response::ApiResponse, validation::SIGNATURE_HEADER},
    templates::TemplateRegistry,
    utils::{PublishOutcome, process_publish_event},
};

pub struct AppState {
    pub webhook_secret: String,
    pub site_url: String,
    pub discord: Arc<dyn NotificationChannel>,
    pub email: Arc<dyn NotificationChannel>,
    pub health_checker: HealthChecker,
}

impl AppState {
    pub fn new(
        config: &Config,
        discord: Arc<dyn NotificationChannel>,
        email: Arc<dyn NotificationChannel>,
    ) -> Self {
        Self {
            webhook_secret: config.sanity_webhook_secret.clone(),
            site_url: config.site_url.clone(),
            discord,
            email,
            health_checker: HealthChecker::new(config),
        }
    }

    pub fn from_config(config: &Config) -> Result<Self, Error> {
        let discord = Arc::new(DiscordClient::new(config)?);
        let email = Arc::new(EmailClient::new(config, TemplateRegistry::default())?);

        Ok(Self::new(config, discord, email))
    }
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/api/webhooks/publish", post(publish_webhook))
        .layer(TraceLayer::new_for_http())
        .layer(CatchPanicLayer::custom(handle_panic))
        .with_state(state)
}

pub async fn run_api_server(config: Config) -> Result<(), Error> {
    let state = Arc::new(AppState::from_config(&config)?);
    let app = router(state);

    let addr = format!("0.0.0.0:{}", config.server_port);
    let listener = TcpListener::bind(&addr).await?;

    info!(address = %addr, "Publish notifier listening");

    axum::serve(listener, app).await?;

    Ok(())
}

async fn health_check(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    (StatusCode::OK, Json(state.health_checker.check_all()))
}

async fn publish_webhook(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response, WebhookError> {
    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|value| value.to_str().ok());

    let response = match process_publish_event(&state, signature, &body).await? {
        PublishOutcome::Ignored(event) => {
            let message = format!("Ignored document type '{}'", event.kind);
            Json(ApiResponse::success(event, message)).into_response()
        }
        PublishOutcome::Delivered(report) => {
            let message = if report.all_sent() {
                "Notifications sent".to_string()
            } else {
                "Notifications processed with failures".to_string()
            };
            Json(ApiResponse::success(report, message)).into_response()
        }
    };

    Ok(response)
}

fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = err
        .downcast_ref::<String>()
        .cloned()
        .or_else(|| err.downcast_ref::<&str>().map(|s| s.to_string()))
        .unwrap_or_else(|| "unknown panic".to_string());

    error!(panic = %detail, "Request handler panicked");

    let body = ApiResponse::<()>::error(
        "internal_error".to_string(),
        "Unexpected error while handling request".to_string(),
    );

    (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
}
