use std::net::SocketAddr;

use payroll_engine::api::{AppState, create_router};
use payroll_engine::config::ConfigLoader;
use payroll_engine::telemetry::init_tracing;
use tokio::net::TcpListener;
use tokio::signal;
use tracing::{info, warn};

const DEFAULT_CONFIG_DIR: &str = "./config/default";

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for Ctrl+C");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config_dir =
        std::env::var("PAYROLL_CONFIG_DIR").unwrap_or_else(|_| DEFAULT_CONFIG_DIR.to_string());
    let config = ConfigLoader::load(&config_dir)?;

    init_tracing(&config.service().log_level);

    let addr: SocketAddr = config.service().listen_addr.parse()?;
    let state = AppState::from_config(&config)?;
    let app = create_router(state);

    let listener = TcpListener::bind(addr).await?;
    info!(
        address = %addr,
        config_dir = %config_dir,
        version = env!("CARGO_PKG_VERSION"),
        "Payroll engine listening"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}
