use actiongate_core::config::Config;
use actiongate_server::host::SystemHost;
use anyhow::Result;
use std::path::Path;
use std::sync::Arc;

/// Load, validate, bind, and serve until Ctrl-C.
///
/// Config and duplicate-identity errors are returned (the process exits
/// non-zero). An unavailable port is logged and ends startup cleanly.
pub fn run(config_path: &Path) -> Result<()> {
    let config = Config::load(config_path)?;
    tracing::info!("Config loaded from {}", config_path.display());

    let table = actiongate_server::prepare(&config)?;
    let addr = config.bind_addr();

    tracing::info!("Main: binding {addr}");
    if let Err(e) = probe_port(&addr) {
        tracing::error!("port unavailable at {addr}: {e}");
        return Ok(());
    }
    tracing::info!("Port bound OK");

    let app = actiongate_server::build_router(table, &config, Arc::new(SystemHost));
    let rt = tokio::runtime::Runtime::new()?;
    let result = rt.block_on(async move {
        // The probe above is best-effort; the port can still be taken here.
        let listener = match tokio::net::TcpListener::bind(&addr).await {
            Ok(l) => l,
            Err(e) => {
                tracing::error!("port unavailable at {addr}: {e}");
                return Ok(());
            }
        };
        actiongate_server::serve_on(listener, app).await
    });

    tracing::info!("Main exit");
    result
}

/// Check that `addr` can be bound right now. The socket is released again.
pub fn probe_port(addr: &str) -> std::io::Result<()> {
    std::net::TcpListener::bind(addr).map(drop)
}
