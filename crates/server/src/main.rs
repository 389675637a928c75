//! NANO banking assistant server binary

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use nano_config::load_settings;
use nano_store::{
    InMemoryAuditStore, InMemoryConversationStore, InMemoryCustomerStore, InMemorySessionStore,
    SessionStore,
};

use nano_server::state::demo_customers;
use nano_server::{create_router, init_metrics, record_sessions_expired, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config_path = std::env::var("NANO_CONFIG").ok().map(PathBuf::from);
    let settings =
        load_settings(config_path.as_deref()).context("failed to load configuration")?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&settings.log_level)),
        )
        .init();

    let metrics_handle = match init_metrics() {
        Ok(handle) => Some(handle),
        Err(err) => {
            warn!(%err, "Metrics recorder not installed; /metrics will be unavailable");
            None
        }
    };

    let customers = Arc::new(InMemoryCustomerStore::new());
    for customer in demo_customers() {
        customers.insert_customer(customer);
    }
    let sessions: Arc<dyn SessionStore> = Arc::new(InMemorySessionStore::new());

    let state = AppState::new(
        settings.clone(),
        sessions.clone(),
        customers,
        Arc::new(InMemoryAuditStore::new()),
        Arc::new(InMemoryConversationStore::new()),
        metrics_handle,
    );

    // Background sweep marking idle sessions as expired.
    let sweep_sessions = sessions.clone();
    let timeout = chrono::Duration::minutes(settings.banking.session_timeout_minutes);
    let interval = Duration::from_secs(settings.banking.cleanup_interval_seconds);
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.tick().await;
        loop {
            ticker.tick().await;
            match sweep_sessions.expire_idle(timeout).await {
                Ok(expired) if expired > 0 => record_sessions_expired(expired),
                Ok(_) => {}
                Err(err) => warn!(%err, "Session expiry sweep failed"),
            }
        }
    });

    let app = create_router(state);
    let addr = format!("{}:{}", settings.server.host, settings.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;

    info!(%addr, bank = %settings.banking.bank_name, "NANO banking assistant listening");
    axum::serve(listener, app).await.context("server exited")?;

    Ok(())
}
