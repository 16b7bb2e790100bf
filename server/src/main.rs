//! Pharmadesk HTTP server binary.

use pharmadesk_server::{AppState, Config, bootstrap, build_router, metrics};
use std::net::{Ipv4Addr, SocketAddr};
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // .env is optional
    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pharmadesk=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Pharmadesk server");

    let config = Config::from_env()?;
    info!(
        bind = %config.server.bind_address(),
        database = config.database.url.is_some(),
        email_provider = ?config.email.provider,
        backup_key_required = config.backup.api_key.is_some(),
        upload_dir = %config.uploads.dir.display(),
        "Configuration loaded"
    );

    metrics::register_metrics();
    if let Some(port) = config.metrics_port {
        metrics::install_prometheus(SocketAddr::from((Ipv4Addr::UNSPECIFIED, port)))?;
    }

    if config.auth.admin_username.is_none() || config.auth.admin_password.is_none() {
        warn!("ADMIN_USERNAME/ADMIN_PASSWORD not set; every login will be rejected");
    }

    let collaborators = bootstrap::collaborators(&config).await?;
    let state = AppState::new(collaborators, &config);
    let app = build_router(state);

    let addr = config.server.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!(address = %addr, "Server listening");

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            info!("Received Ctrl+C signal, shutting down gracefully...");
        },
        () = terminate => {
            info!("Received SIGTERM signal, shutting down gracefully...");
        },
    }
}
