use anyhow::Result;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use qrcode_api::{AppState, QrRenderer, ServerConfig, router};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = ServerConfig::from_env();
    let renderer = QrRenderer::new(&config.render)?;
    let app = router(AppState::new(renderer));

    let bind_address = config.bind_address();
    let tcp_listener = tokio::net::TcpListener::bind(&bind_address).await?;
    tracing::info!(
        address = %bind_address,
        logo_fetch_timeout = ?config.render.logo_fetch_timeout,
        "QR code API listening"
    );

    axum::serve(tcp_listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await?;
    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,tower_http=info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}
