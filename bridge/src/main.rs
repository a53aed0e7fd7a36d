//! VidGrab notification bridge - runs the download notification service
//! until interrupted.

use tokio::sync::broadcast::error::RecvError;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use vidgrab_bridge::event_bus::BridgeEvent;
use vidgrab_bridge::{AppContext, BridgeConfig, DownloadNotificationService};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "vidgrab_bridge=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = BridgeConfig::from_env()?;
    tracing::info!(?config, "Starting VidGrab notification bridge");

    let context = AppContext::from_config(config);
    let mut events = context.events.subscribe();
    let service = DownloadNotificationService::new(context);

    // Observer standing in for the UI
    let observer = tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(BridgeEvent::StateChanged(state)) => {
                    tracing::debug!(state = %state, "Observed state change")
                }
                Ok(BridgeEvent::Task(event)) => {
                    tracing::debug!(task_id = %event.task_id(), kind = event.kind(), "Observed task event")
                }
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "Observer lagged behind the event bus")
                }
                Err(RecvError::Closed) => break,
            }
        }
    });

    service.start().await;
    shutdown_signal().await;

    service.destroy().await;
    observer.abort();
    tracing::info!("Bridge stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to listen for SIGTERM: {}", e);
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
    tracing::info!("Shutdown signal received");
}
