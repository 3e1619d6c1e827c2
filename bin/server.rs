// Activity Monitor - Web Server
// Slider form + REST API with Axum

use activity_monitor::server::{router, AppState};
use activity_monitor::{logging, MonitorConfig};
use anyhow::{Context, Result};

#[tokio::main]
async fn main() -> Result<()> {
    logging::init("info")?;

    let config = MonitorConfig::load()?;
    let monitor = config.monitor();
    log::info!("Home coordinate: {:?}", config.home);
    log::info!("Data source: {}", monitor.source_description());

    let addr = config.bind_address.clone();
    let app = router(AppState::new(monitor, config));

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to address {}", addr))?;

    log::info!("Server running on http://{}", addr);
    log::info!("  API: http://{}/api/analyze?threshold_km=20&spending_limit=500", addr);

    axum::serve(listener, app)
        .await
        .context("Failed to start server")?;

    Ok(())
}
