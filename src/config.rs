use anyhow::{Error, Result, anyhow};
use dotenvy::dotenv;
use serde::Deserialize;

#[derive(Clone, Deserialize, Debug)]
pub struct Config {
    #[serde(default = "default_server_port")]
    pub server_port: u16,

    pub sanity_webhook_secret: String,
    pub site_url: String,

    pub discord_webhook_url: Option<String>,

    pub resend_api_key: Option<String>,
    #[serde(default = "default_resend_api_url")]
    pub resend_api_url: String,
    #[serde(default = "default_email_from")]
    pub email_from: String,
    pub email_test_recipient: Option<String>,
    pub resend_audience_id: Option<String>,

    #[serde(default = "default_preview_block_limit")]
    pub email_preview_block_limit: usize,
    #[serde(default = "default_preview_char_limit")]
    pub email_preview_char_limit: usize,

    #[serde(default = "default_http_timeout_seconds")]
    pub http_timeout_seconds: u64,
}

fn default_server_port() -> u16 {
    3000
}

fn default_resend_api_url() -> String {
    "https://api.resend.com".to_string()
}

fn default_email_from() -> String {
    "Notifications <notifications@example.com>".to_string()
}

fn default_preview_block_limit() -> usize {
    3
}

fn default_preview_char_limit() -> usize {
    280
}

fn default_http_timeout_seconds() -> u64 {
    10
}

impl Config {
    pub fn load() -> Result<Self, Error> {
        dotenv().ok();

        Self::from_vars(std::env::vars())
    }

    pub fn from_vars<I>(vars: I) -> Result<Self, Error>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        // Blank values count as unset.
        let vars = vars.into_iter().filter(|(_, value)| !value.trim().is_empty());

        let config = envy::from_iter::<_, Self>(vars)
            .map_err(|e| anyhow!("Invalid or missing environmental variable: {}", e))?;

        if config.email_preview_block_limit == 0 {
            return Err(anyhow!("EMAIL_PREVIEW_BLOCK_LIMIT must be at least 1"));
        }

        Ok(config)
    }

    pub fn discord_configured(&self) -> bool {
        self.discord_webhook_url.is_some()
    }

    pub fn email_configured(&self) -> bool {
        self.resend_api_key.is_some() && self.email_test_recipient.is_some()
    }
}
