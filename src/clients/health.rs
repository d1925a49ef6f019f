use std::collections::BTreeMap;

use chrono::Utc;
use tracing::{debug, warn};

use crate::{
    config::Config,
    models::health::{ChannelHealth, HealthCheckResponse, HealthStatus},
};

pub struct HealthChecker {
    discord_configured: bool,
    email_configured: bool,
}

impl HealthChecker {
    pub fn new(config: &Config) -> Self {
        Self {
            discord_configured: config.discord_configured(),
            email_configured: config.email_configured(),
        }
    }

    pub fn check_all(&self) -> HealthCheckResponse {
        let mut checks = BTreeMap::new();

        checks.insert(
            "discord".to_string(),
            Self::check_channel("discord", self.discord_configured, "DISCORD_WEBHOOK_URL"),
        );
        checks.insert(
            "email".to_string(),
            Self::check_channel(
                "email",
                self.email_configured,
                "RESEND_API_KEY and EMAIL_TEST_RECIPIENT",
            ),
        );

        let status = Self::determine_overall_status(&checks);

        HealthCheckResponse {
            status,
            timestamp: Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true),
            checks,
        }
    }

    fn check_channel(channel: &str, configured: bool, settings: &str) -> ChannelHealth {
        if configured {
            debug!(channel, "Channel configured");
            ChannelHealth::healthy()
        } else {
            warn!(channel, "Channel not configured, notifications will be reported as failed");
            ChannelHealth::degraded(format!("{} not set", settings))
        }
    }

    fn determine_overall_status(checks: &BTreeMap<String, ChannelHealth>) -> HealthStatus {
        let has_degraded = checks
            .values()
            .any(|health| health.status == HealthStatus::Degraded);

        if has_degraded {
            HealthStatus::Degraded
        } else {
            HealthStatus::Healthy
        }
    }
}
