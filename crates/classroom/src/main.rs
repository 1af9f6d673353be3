//! Terminal client for the Classroom course-management backend.

mod api;
mod app;
mod config;
mod menu;
mod role;
mod session;
mod views;

use anyhow::Context;
use app::App;
use config::AppConfig;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("classroom=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = AppConfig::from_env().context("Invalid configuration")?;
    info!(base_url = %config.base_url, "Starting Classroom client");

    let mut app = App::new(&config).context("Could not initialize the client")?;
    app.run().await
}
