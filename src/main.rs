use anyhow::{Error, Result};
use publish_notifier::{api::run_api_server, config::Config};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .json()
        .init();

    let config = Config::load()?;

    info!(
        port = config.server_port,
        site_url = %config.site_url,
        discord = config.discord_configured(),
        email = config.email_configured(),
        "Configuration validated"
    );

    run_api_server(config).await
}
