use anyhow::anyhow;
use serde_json::Value as JsonValue;
use tracing::{info, warn};

use crate::{
    api::AppState,
    clients::NotificationChannel,
    error::WebhookError,
    models::{
        document::{ContentDocument, ContentKind},
        payload::{NotificationPayload, normalize},
        response::{IgnoredEvent, NotificationReport},
        status::{ChannelError, ChannelResult, DeliveryReceipt},
        validation::validate_signature,
    },
};

#[derive(Debug)]
pub enum PublishOutcome {
    Ignored(IgnoredEvent),
    Delivered(NotificationReport),
}

/// Verifies, parses and fans out one publish event.
pub async fn process_publish_event(
    state: &AppState,
    signature: Option<&str>,
    body: &[u8],
) -> Result<PublishOutcome, WebhookError> {
    if let Err(e) = validate_signature(&state.webhook_secret, signature, body) {
        warn!(error = %e, "Rejecting publish webhook with invalid signature");
        return Err(e.into());
    }

    let raw: JsonValue = serde_json::from_slice(body)
        .map_err(|e| WebhookError::BadRequest(format!("Invalid JSON body: {}", e)))?;

    let tag = raw
        .get("_type")
        .and_then(JsonValue::as_str)
        .ok_or_else(|| WebhookError::BadRequest("Missing or invalid _type".to_string()))?;

    let Some(kind) = ContentKind::parse(tag) else {
        info!(kind = %tag, "Ignoring publish event for unsupported document type");
        return Ok(PublishOutcome::Ignored(IgnoredEvent::new(tag)));
    };

    let document: ContentDocument = serde_json::from_value(raw)
        .map_err(|e| anyhow!("Failed to read {} document: {}", kind, e))?;

    let payload = normalize(&document);

    info!(
        kind = %payload.kind,
        document_id = ?payload.document_id,
        slug = %payload.slug,
        "Processing publish event"
    );

    let report = deliver(
        &payload,
        state.discord.as_ref(),
        state.email.as_ref(),
        &state.site_url,
    )
    .await;

    Ok(PublishOutcome::Delivered(report))
}

/// Sends through both channels concurrently. A failure on one channel never
/// affects the other.
pub async fn deliver(
    payload: &NotificationPayload,
    discord: &dyn NotificationChannel,
    email: &dyn NotificationChannel,
    site_url: &str,
) -> NotificationReport {
    let (discord_outcome, email_outcome) =
        tokio::join!(discord.send(payload), email.send(payload));

    let discord_result = settle(discord.name(), &payload.slug, discord_outcome);
    let email_result = settle(email.name(), &payload.slug, email_outcome);

    NotificationReport::aggregate(discord_result, email_result, payload, site_url)
}

fn settle(
    channel: &str,
    slug: &str,
    outcome: Result<DeliveryReceipt, ChannelError>,
) -> ChannelResult {
    if let Err(e) = &outcome {
        warn!(channel, slug, error = %e, "Notification channel failed");
    }

    ChannelResult::from(outcome)
}
