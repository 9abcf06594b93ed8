use std::sync::Arc;

use clap::Parser;

use reminder_caller::config::AppConfig;
use reminder_caller::server::{create_router, AppState};
use reminder_caller::shutdown::{graceful_shutdown, wait_for_shutdown};

#[derive(Parser)]
#[command(name = "reminder-caller", about = "Call worker for appointment reminder calls")]
struct Cli {
    /// Path to configuration file
    #[arg(short, long)]
    config: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = AppConfig::load(cli.config.as_deref())?;
    reminder_caller::logging::init(&config.logging);
    config.validate_for_worker()?;

    tracing::info!(
        host = %config.server.host,
        port = %config.server.port,
        agent_name = %config.livekit.agent_name,
        recording = config.storage.is_some(),
        "Starting call worker"
    );

    let state = Arc::new(AppState::new(config.clone())?);

    let app = create_router(Arc::clone(&state));

    let listener = tokio::net::TcpListener::bind(format!(
        "{}:{}",
        config.server.host, config.server.port
    ))
    .await?;

    tracing::info!("Listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(wait_for_shutdown())
        .await?;

    graceful_shutdown(&state).await;

    Ok(())
}
