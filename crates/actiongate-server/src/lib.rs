pub mod auth;
pub mod error;
pub mod host;
pub mod routes;
pub mod state;

use std::sync::Arc;
use std::time::Duration;

use actiongate_core::config::Config;
use actiongate_core::{expand, validate_identities};
use axum::Router;
use tower_http::trace::TraceLayer;

use auth::AuthToken;
use host::Host;
use routes::RouteTable;
use state::AppState;

/// Expand composite actions, reject duplicate identities, and bind routes.
///
/// Fails only on duplicates; unroutable items are logged and skipped.
pub fn prepare(config: &Config) -> actiongate_core::Result<RouteTable> {
    let expanded = expand(config.items.clone());
    validate_identities(&expanded)?;
    Ok(RouteTable::build(&expanded))
}

/// Build the axum Router for a prepared route table.
/// Used by `serve_on()` callers and available for integration testing.
pub fn build_router(table: RouteTable, config: &Config, host: Arc<dyn Host>) -> Router {
    let app_state = AppState::new(host, Duration::from_secs(config.command_timeout_secs));
    table
        .into_router(AuthToken::new(config.token.clone()))
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}

/// Serve `app` on a pre-bound listener until Ctrl-C.
pub async fn serve_on(listener: tokio::net::TcpListener, app: Router) -> anyhow::Result<()> {
    let addr = listener.local_addr()?;
    tracing::info!("actiongate listening on http://{addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_err() {
        // No signal handler available; run until the process is killed.
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown requested");
}
