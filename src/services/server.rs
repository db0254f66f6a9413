//! Process runtime: settlement loop plus HTTP server, stopped together.

use tokio::net::TcpListener;
use tokio::signal;
use tokio::sync::watch;
use tracing::{error, info};

use crate::api::{create_router, AppState};
use crate::config::AppConfig;
use crate::error::{MeshError, Result};
use crate::services::SettlementTask;
use crate::simulation::{MeshState, Simulation};

/// Start the settlement loop and serve the HTTP API until Ctrl+C / SIGTERM
pub async fn run(config: AppConfig) -> Result<()> {
    let mesh = MeshState::new(Simulation::new(&config));

    let (stop_tx, stop_rx) = watch::channel(false);
    let settlement = SettlementTask::new(mesh.clone(), config.settlement.interval()).spawn(stop_rx);

    let app = create_router(AppState::new(mesh));
    let listener = TcpListener::bind((config.server.host.as_str(), config.server.port)).await?;
    info!(
        "CRE agent mesh listening on {}:{}",
        config.server.host, config.server.port
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("HTTP server stopped, stopping settlement loop");
    let _ = stop_tx.send(true);
    settlement
        .await
        .map_err(|e| MeshError::TaskAborted(e.to_string()))?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
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
