use std::sync::Arc;
use std::time::Duration;

use crate::host::Host;

/// Shared application state passed to all route handlers. Read-only.
#[derive(Clone)]
pub struct AppState {
    pub host: Arc<dyn Host>,
    pub command_timeout: Duration,
}

impl AppState {
    pub fn new(host: Arc<dyn Host>, command_timeout: Duration) -> Self {
        Self {
            host,
            command_timeout,
        }
    }
}
