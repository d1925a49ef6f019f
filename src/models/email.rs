use std::collections::HashMap;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SendEmailRequest {
    pub from: String,
    pub to: Vec<String>,
    pub subject: String,
    pub html: String,
    pub text: String,

    #[serde(skip_serializing_if = "HashMap::is_empty", default)]
    pub headers: HashMap<String, String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateBroadcastRequest {
    pub audience_id: String,
    pub from: String,
    pub subject: String,
    pub html: String,
    pub text: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// Body returned by both `POST /emails` and `POST /broadcasts`.
#[derive(Debug, Clone, Deserialize)]
pub struct EmailApiResponse {
    pub id: Option<String>,
}
