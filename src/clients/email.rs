use std::{collections::HashMap, time::Duration};

use anyhow::{Error, Result, anyhow};
use async_trait::async_trait;
use reqwest::{Client, Response};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::{
    clients::NotificationChannel,
    config::Config,
    models::{
        email::{CreateBroadcastRequest, EmailApiResponse, SendEmailRequest},
        payload::NotificationPayload,
        status::{ChannelError, DeliveryReceipt},
        template::{RenderContext, RenderedEmail},
    },
    templates::TemplateRegistry,
};

pub struct EmailClient {
    http_client: Client,
    api_url: String,
    api_key: Option<String>,
    from: String,
    test_recipient: Option<String>,
    audience_id: Option<String>,
    render_context: RenderContext,
    templates: TemplateRegistry,
}

impl EmailClient {
    pub fn new(config: &Config, templates: TemplateRegistry) -> Result<Self, Error> {
        let http_client = Client::builder()
            .timeout(Duration::from_secs(config.http_timeout_seconds))
            .build()
            .map_err(|e| anyhow!("Failed to create HTTP client: {}", e))?;

        info!(
            api_url = %config.resend_api_url,
            configured = config.email_configured(),
            "Email client initialized"
        );

        Ok(Self {
            http_client,
            api_url: config.resend_api_url.trim_end_matches('/').to_string(),
            api_key: config.resend_api_key.clone(),
            from: config.email_from.clone(),
            test_recipient: config.email_test_recipient.clone(),
            audience_id: config.resend_audience_id.clone(),
            render_context: RenderContext {
                site_url: config.site_url.clone(),
                preview_block_limit: config.email_preview_block_limit,
                preview_char_limit: config.email_preview_char_limit,
            },
            templates,
        })
    }

    pub fn render(&self, payload: &NotificationPayload) -> Result<RenderedEmail, ChannelError> {
        self.templates
            .render(payload, &self.render_context)
            .map_err(|e| ChannelError::Render(e.to_string()))
    }

    /// Broadcasts to the audience configured by `RESEND_AUDIENCE_ID`.
    pub async fn broadcast_to_default_audience(
        &self,
        payload: &NotificationPayload,
    ) -> Result<DeliveryReceipt, ChannelError> {
        let audience_id = self
            .audience_id
            .as_deref()
            .ok_or(ChannelError::NotConfigured("email audience"))?;

        self.send_broadcast(audience_id, payload).await
    }

    /// Creates a broadcast for every contact in `audience_id` and sends it
    /// immediately. Not part of the publish flow.
    pub async fn send_broadcast(
        &self,
        audience_id: &str,
        payload: &NotificationPayload,
    ) -> Result<DeliveryReceipt, ChannelError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(ChannelError::NotConfigured("email"))?;
        let email = self.render(payload)?;

        let request = CreateBroadcastRequest {
            audience_id: audience_id.to_string(),
            from: self.from.clone(),
            subject: email.subject,
            html: email.body_html,
            text: email.body_text,
            name: Some(format!("{}: {}", payload.kind.label(), payload.slug)),
        };

        debug!(audience_id, slug = %payload.slug, "Creating email broadcast");

        let response = self
            .http_client
            .post(format!("{}/broadcasts", self.api_url))
            .bearer_auth(api_key)
            .json(&request)
            .send()
            .await?;
        let created = Self::accept(response).await?;

        let broadcast_id = created
            .provider_id
            .ok_or_else(|| ChannelError::Rejected {
                status: created.status_code,
                body: "broadcast response carried no id".to_string(),
            })?;

        let response = self
            .http_client
            .post(format!("{}/broadcasts/{}/send", self.api_url, broadcast_id))
            .bearer_auth(api_key)
            .json(&serde_json::json!({}))
            .send()
            .await?;
        let sent = Self::accept(response).await?;

        info!(audience_id, broadcast_id = %broadcast_id, "Email broadcast sent");

        Ok(DeliveryReceipt {
            status_code: sent.status_code,
            provider_id: Some(broadcast_id),
        })
    }

    async fn accept(response: Response) -> Result<DeliveryReceipt, ChannelError> {
        let status = response.status();

        if status.is_success() {
            let provider_id = response
                .json::<EmailApiResponse>()
                .await
                .ok()
                .and_then(|body| body.id);
            Ok(DeliveryReceipt {
                status_code: status.as_u16(),
                provider_id,
            })
        } else {
            let body = response.text().await.unwrap_or_default();
            warn!(status = status.as_u16(), body = %body, "Email API rejected request");
            Err(ChannelError::Rejected {
                status: status.as_u16(),
                body,
            })
        }
    }
}

#[async_trait]
impl NotificationChannel for EmailClient {
    fn name(&self) -> &'static str {
        "email"
    }

    async fn send(&self, payload: &NotificationPayload) -> Result<DeliveryReceipt, ChannelError> {
        let (Some(api_key), Some(recipient)) =
            (self.api_key.as_deref(), self.test_recipient.as_deref())
        else {
            return Err(ChannelError::NotConfigured("email"));
        };

        let email = self.render(payload)?;

        let headers = HashMap::from([("X-Entity-Ref-ID".to_string(), Uuid::new_v4().to_string())]);

        let request = SendEmailRequest {
            from: self.from.clone(),
            to: vec![recipient.to_string()],
            subject: email.subject,
            html: email.body_html,
            text: email.body_text,
            headers,
        };

        debug!(kind = %payload.kind, slug = %payload.slug, "Sending notification email");

        let response = self
            .http_client
            .post(format!("{}/emails", self.api_url))
            .bearer_auth(api_key)
            .json(&request)
            .send()
            .await?;

        let receipt = Self::accept(response).await?;

        info!(
            status = receipt.status_code,
            email_id = ?receipt.provider_id,
            slug = %payload.slug,
            "Notification email sent"
        );

        Ok(receipt)
    }
}
