//! # habridged: the habridge daemon
//!
//! Composition root that wires all adapters together and starts the bridge.
//!
//! ## Responsibilities
//! - Load configuration (`habridge.toml`, env vars) and initialise logging
//! - Build the remote backend (openHAB or virtual), bounded by a timeout
//! - Assemble the configured accessories, skipping the ones whose required
//!   characteristics cannot be bound
//! - Serve the HTTP host surface until SIGINT/SIGTERM, then tear down every
//!   subscription
//!
//! ## Dependency rule
//! This is the **only** crate that depends on all other crates.
//! It is the wiring layer; no domain logic belongs here.

mod config;

use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::EnvFilter;

use habridge_adapter_http_axum::router;
use habridge_adapter_http_axum::state::AppState;
use habridge_adapter_openhab::OpenHabClient;
use habridge_adapter_virtual::VirtualRemote;
use habridge_app::event_bus::InProcessEventBus;
use habridge_app::ports::RemoteStateService;
use habridge_app::services::registry::AccessoryRegistry;
use habridge_app::services::timeout::TimedRemote;

use crate::config::{Backend, Config};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::load().context("failed to load configuration")?;

    let filter = EnvFilter::try_new(&config.logging.filter).unwrap_or_else(|err| {
        eprintln!("invalid log filter {:?}: {err}", config.logging.filter);
        EnvFilter::new("info")
    });
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let event_bus = Arc::new(InProcessEventBus::new(256));
    let timeout = config.remote.request_timeout();

    match config.remote.backend {
        Backend::Openhab => {
            tracing::info!(url = %config.openhab.url, "using openHAB backend");
            let client = OpenHabClient::new(config.openhab.clone());
            let events = client.start_events();
            let result = run(&config, TimedRemote::new(client, timeout), event_bus).await;
            events.abort();
            result
        }
        Backend::Virtual => {
            tracing::info!(items = config.virtual_items.len(), "using virtual backend");
            let remote = Arc::new(VirtualRemote::new(config.virtual_items.clone()));
            run(&config, TimedRemote::new(remote, timeout), event_bus).await
        }
    }
}

async fn run<R>(config: &Config, remote: R, event_bus: Arc<InProcessEventBus>) -> anyhow::Result<()>
where
    R: RemoteStateService + Clone + 'static,
{
    let registry = Arc::new(AccessoryRegistry::new(remote, Arc::clone(&event_bus)));
    let registered = registry.build(&config.accessories).await;
    tracing::info!(
        registered,
        configured = config.accessories.len(),
        "accessories assembled"
    );

    let listener = log_changes(&event_bus);
    let app = router::build(AppState::new(Arc::clone(&registry), event_bus));

    let bind_addr = config.bind_addr();
    let tcp = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {bind_addr}"))?;
    tracing::info!(%bind_addr, "habridged listening");

    let served = axum::serve(tcp, app)
        .with_graceful_shutdown(shutdown_signal())
        .await;

    registry.teardown();
    listener.abort();
    served.context("http server failed")
}

/// Trace every characteristic change pushed to the host.
fn log_changes(event_bus: &InProcessEventBus) -> tokio::task::JoinHandle<()> {
    let mut rx = event_bus.subscribe();
    tokio::spawn(async move {
        loop {
            match rx.recv().await {
                Ok(change) => tracing::debug!(
                    accessory = %change.accessory,
                    characteristic = %change.characteristic,
                    value = %change.value,
                    "characteristic changed"
                ),
                Err(tokio::sync::broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "change listener lagged");
                }
                Err(tokio::sync::broadcast::error::RecvError::Closed) => break,
            }
        }
    })
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %err, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                tracing::error!(error = %err, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
    tracing::info!("shutting down");
}
