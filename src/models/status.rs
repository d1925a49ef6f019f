use serde::Serialize;
use thiserror::Error;

pub const SENT_LABEL: &str = "✅ Sent";
pub const FAILED_LABEL: &str = "❌ Failed";

/// What a channel returns when the provider accepted the notification.
#[derive(Debug, Clone, PartialEq)]
pub struct DeliveryReceipt {
    pub status_code: u16,
    pub provider_id: Option<String>,
}

#[derive(Debug, Error)]
pub enum ChannelError {
    #[error("{0} channel is not configured")]
    NotConfigured(&'static str),

    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("provider responded with status {status}: {body}")]
    Rejected { status: u16, body: String },

    #[error("render failed: {0}")]
    Render(String),
}

impl ChannelError {
    pub fn status_code(&self) -> Option<u16> {
        match self {
            ChannelError::Rejected { status, .. } => Some(*status),
            ChannelError::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

/// Outcome of one notification channel, reported in-band.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChannelResult {
    pub success: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_code: Option<u16>,

    /// Identifier the provider assigned to the accepted message.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider_id: Option<String>,

    /// Failure reason; absent on success.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ChannelResult {
    pub fn label(&self) -> &'static str {
        if self.success { SENT_LABEL } else { FAILED_LABEL }
    }
}

impl From<Result<DeliveryReceipt, ChannelError>> for ChannelResult {
    fn from(outcome: Result<DeliveryReceipt, ChannelError>) -> Self {
        match outcome {
            Ok(receipt) => Self {
                success: true,
                status_code: Some(receipt.status_code),
                provider_id: receipt.provider_id,
                message: None,
            },
            Err(e) => Self {
                success: false,
                status_code: e.status_code(),
                provider_id: None,
                message: Some(e.to_string()),
            },
        }
    }
}
