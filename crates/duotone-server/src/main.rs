//! Duotone server binary.

use duotone_server::{Server, ServerConfig, lan_urls};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> std::io::Result<()> {
    // A missing .env is fine.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = ServerConfig::from_env();
    let server = Server::bind(config).await?;
    let addr = server.local_addr()?;

    tracing::info!("Server running on http://localhost:{}", addr.port());
    let urls = lan_urls(addr.port());
    if !urls.is_empty() {
        tracing::info!("On your phone (same Wi-Fi), open:");
        for url in urls {
            tracing::info!("  -> {url}");
        }
    }
    if !server.config().static_dir.is_dir() {
        tracing::warn!(
            "Static directory {} not found; serving the built-in page at /",
            server.config().static_dir.display()
        );
    }

    server
        .run_until(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await;
    Ok(())
}
