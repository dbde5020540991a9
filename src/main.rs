use std::sync::Arc;

use chatbot_client::ClientConfig;
use chatbot_client::frontend::terminal;
use chatbot_client::services::backend::{ChatBackend, HttpBackend};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("chatbot_client=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = ClientConfig::from_env()?;
    let http = HttpBackend::bootstrap(&config).await?;
    info!(base_url = %http.base_url(), "connected to chatbot backend");
    let backend: Arc<dyn ChatBackend> = Arc::new(http);

    terminal::run(config, backend).await
}
