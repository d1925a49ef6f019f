use serde::Serialize;

use crate::models::{document::ContentKind, payload::NotificationPayload, status::ChannelResult};

#[derive(Debug, Clone, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    pub message: String,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T, message: String) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            message,
        }
    }

    pub fn error(error: String, message: String) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error),
            message,
        }
    }
}

/// Per-channel outcome of one publish event, plus the identity of the
/// content it was about.
#[derive(Debug, Clone, Serialize)]
pub struct NotificationReport {
    pub discord: &'static str,
    pub email: &'static str,
    pub channels: ChannelResults,
    pub content: ContentSummary,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChannelResults {
    pub discord: ChannelResult,
    pub email: ChannelResult,
}

#[derive(Debug, Clone, Serialize)]
pub struct ContentSummary {
    pub kind: ContentKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub document_id: Option<String>,
    pub heading: String,
    pub slug: String,
    pub url: String,
}

impl NotificationReport {
    pub fn aggregate(
        discord: ChannelResult,
        email: ChannelResult,
        payload: &NotificationPayload,
        site_url: &str,
    ) -> Self {
        Self {
            discord: discord.label(),
            email: email.label(),
            channels: ChannelResults { discord, email },
            content: ContentSummary {
                kind: payload.kind,
                document_id: payload.document_id.clone(),
                heading: payload.heading.clone(),
                slug: payload.slug.clone(),
                url: payload.canonical_url(site_url),
            },
        }
    }

    pub fn all_sent(&self) -> bool {
        self.channels.discord.success && self.channels.email.success
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct IgnoredEvent {
    pub status: &'static str,
    pub kind: String,
}

impl IgnoredEvent {
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            status: "ignored",
            kind: kind.into(),
        }
    }
}
