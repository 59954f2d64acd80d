use std::net::SocketAddr;
use std::sync::Arc;

use egosms_gateway::{AppConfig, ProviderCredentials, SmsGateway, logging, server};
use tokio::net::TcpListener;
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load()?;
    if let Err(err) = logging::init(&config.logging) {
        eprintln!("failed to initialize logging: {err}");
    }

    let credentials = ProviderCredentials::from_env(&config.sms);
    let gateway = SmsGateway::from_config(&config.sms, &credentials)?;
    info!(
        sender = %credentials.sender,
        configured = gateway.is_configured(),
        "sms gateway ready"
    );

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    let listener = TcpListener::bind(addr).await?;
    info!("listening on {}", addr);

    axum::serve(listener, server::router(Arc::new(gateway)))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("shutting down");
    }
}
