use std::time::Duration;

use anyhow::{Error, Result, anyhow};
use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::{
    clients::NotificationChannel,
    config::Config,
    models::{
        document::ContentKind,
        payload::NotificationPayload,
        status::{ChannelError, DeliveryReceipt},
    },
};

/// Discord rejects `content` longer than this.
pub const MESSAGE_LIMIT: usize = 2000;

#[derive(Debug, Serialize)]
struct WebhookMessage<'a> {
    content: &'a str,
}

pub struct DiscordClient {
    http_client: Client,
    webhook_url: Option<String>,
    site_url: String,
}

impl DiscordClient {
    pub fn new(config: &Config) -> Result<Self, Error> {
        let http_client = Client::builder()
            .timeout(Duration::from_secs(config.http_timeout_seconds))
            .build()
            .map_err(|e| anyhow!("Failed to create HTTP client: {}", e))?;

        info!(
            configured = config.discord_configured(),
            "Discord client initialized"
        );

        Ok(Self {
            http_client,
            webhook_url: config.discord_webhook_url.clone(),
            site_url: config.site_url.clone(),
        })
    }

    pub fn build_message(&self, payload: &NotificationPayload) -> String {
        let message = compose(payload, &self.site_url, &payload.excerpt);
        let length = message.chars().count();
        if length <= MESSAGE_LIMIT {
            return message;
        }

        // Shorten the excerpt first so the heading and link survive.
        let overflow = length - MESSAGE_LIMIT;
        let keep = payload.excerpt.chars().count().saturating_sub(overflow + 1);
        let mut excerpt: String = payload.excerpt.chars().take(keep).collect();
        excerpt.push('…');

        let message = compose(payload, &self.site_url, &excerpt);
        if message.chars().count() <= MESSAGE_LIMIT {
            message
        } else {
            message.chars().take(MESSAGE_LIMIT).collect()
        }
    }
}

fn compose(payload: &NotificationPayload, site_url: &str, excerpt: &str) -> String {
    let url = payload.canonical_url(site_url);

    let author = payload
        .author
        .as_ref()
        .map(|author| match &author.role {
            Some(role) => format!("✍️ By {} · {}\n", author.name, role),
            None => format!("✍️ By {}\n", author.name),
        })
        .unwrap_or_default();

    match payload.kind {
        ContentKind::Post => format!(
            "📝 **New Post Published!**\n\n**{}**\n{}\n\n{}🔗 Read more: {}",
            payload.heading, excerpt, author, url
        ),
        ContentKind::Video => format!(
            "🎬 **New Video Released!**\n\n**{}**\n{}\n\n{}▶️ Watch now: {}",
            payload.heading, excerpt, author, url
        ),
    }
}

#[async_trait]
impl NotificationChannel for DiscordClient {
    fn name(&self) -> &'static str {
        "discord"
    }

    async fn send(&self, payload: &NotificationPayload) -> Result<DeliveryReceipt, ChannelError> {
        let webhook_url = self
            .webhook_url
            .as_deref()
            .ok_or(ChannelError::NotConfigured("discord"))?;

        let content = self.build_message(payload);

        debug!(
            kind = %payload.kind,
            slug = %payload.slug,
            length = content.chars().count(),
            "Sending Discord notification"
        );

        let response = self
            .http_client
            .post(webhook_url)
            .json(&WebhookMessage { content: &content })
            .send()
            .await?;

        let status = response.status();

        if status.is_success() {
            info!(status = status.as_u16(), slug = %payload.slug, "Discord notification sent");
            Ok(DeliveryReceipt {
                status_code: status.as_u16(),
                provider_id: None,
            })
        } else {
            let body = response.text().await.unwrap_or_default();
            warn!(status = status.as_u16(), body = %body, "Discord webhook rejected notification");
            Err(ChannelError::Rejected {
                status: status.as_u16(),
                body,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use wiremock::{
        Mock, MockServer, ResponseTemplate,
        matchers::{body_json, method, path},
    };

    use super::*;
    use crate::models::payload::Author;

    fn client_for(webhook_url: Option<&str>) -> DiscordClient {
        let mut vars = vec![
            ("SANITY_WEBHOOK_SECRET".to_string(), "secret".to_string()),
            ("SITE_URL".to_string(), "https://studio.test".to_string()),
        ];
        if let Some(url) = webhook_url {
            vars.push(("DISCORD_WEBHOOK_URL".to_string(), url.to_string()));
        }
        DiscordClient::new(&Config::from_vars(vars).unwrap()).unwrap()
    }

    fn client() -> DiscordClient {
        client_for(None)
    }

    fn payload(kind: ContentKind) -> NotificationPayload {
        NotificationPayload {
            kind,
            document_id: None,
            heading: "Rebrand".to_string(),
            slug: "rebrand".to_string(),
            excerpt: "A new look".to_string(),
            image_url: None,
            video_url: None,
            author: None,
            sections: Vec::new(),
        }
    }

    #[test]
    fn post_message_links_to_post() {
        let mut post = payload(ContentKind::Post);
        post.author = Some(Author {
            name: "Ada".to_string(),
            role: Some("Designer".to_string()),
            avatar_url: None,
        });

        let message = client().build_message(&post);

        assert_eq!(
            message,
            "📝 **New Post Published!**\n\n**Rebrand**\nA new look\n\n✍️ By Ada · Designer\n🔗 Read more: https://studio.test/posts/rebrand"
        );
    }

    #[test]
    fn video_message_uses_watch_link() {
        let message = client().build_message(&payload(ContentKind::Video));

        assert!(message.starts_with("🎬 **New Video Released!**"));
        assert!(message.ends_with("▶️ Watch now: https://studio.test/videos/rebrand"));
        assert!(!message.contains("By "));
    }

    #[test]
    fn oversized_excerpt_is_shortened_to_limit() {
        let mut post = payload(ContentKind::Post);
        post.excerpt = "é".repeat(5000);

        let message = client().build_message(&post);

        assert!(message.chars().count() <= MESSAGE_LIMIT);
        assert!(message.ends_with("https://studio.test/posts/rebrand"));
        assert!(message.contains('…'));
    }

    #[tokio::test]
    async fn unconfigured_webhook_fails_without_request() {
        let result = client().send(&payload(ContentKind::Post)).await;

        assert!(matches!(result, Err(ChannelError::NotConfigured("discord"))));
    }

    #[tokio::test]
    async fn posts_message_as_content_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/webhook"))
            .and(body_json(json!({
                "content": "📝 **New Post Published!**\n\n**Rebrand**\nA new look\n\n🔗 Read more: https://studio.test/posts/rebrand"
            })))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(Some(&format!("{}/webhook", server.uri())));
        let receipt = client.send(&payload(ContentKind::Post)).await.unwrap();

        assert_eq!(receipt.status_code, 204);
        assert!(receipt.provider_id.is_none());
    }

    #[tokio::test]
    async fn rejected_webhook_reports_status_and_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/webhook"))
            .respond_with(ResponseTemplate::new(404).set_body_string("Unknown Webhook"))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(Some(&format!("{}/webhook", server.uri())));
        let result = client.send(&payload(ContentKind::Post)).await;

        match result {
            Err(ChannelError::Rejected { status, body }) => {
                assert_eq!(status, 404);
                assert_eq!(body, "Unknown Webhook");
            }
            other => panic!("expected rejection, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn unreachable_webhook_is_a_transport_error() {
        let port = std::net::TcpListener::bind("127.0.0.1:0")
            .unwrap()
            .local_addr()
            .unwrap()
            .port();

        let client = client_for(Some(&format!("http://127.0.0.1:{}/webhook", port)));
        let error = client.send(&payload(ContentKind::Post)).await.unwrap_err();

        assert!(matches!(error, ChannelError::Transport(_)));
        assert!(error.status_code().is_none());
    }
}
