use axum::Json;
use serde_json::{json, Value};

use crate::error::AppError;
use crate::state::AppState;

/// GET /killprocess/{id}: terminate one process named `process_name`.
///
/// Query parameters are accepted and ignored.
#[derive(Debug, Clone)]
pub struct KillProcess {
    pub process_name: String,
}

impl KillProcess {
    pub async fn invoke(&self, app: &AppState) -> Result<Json<Value>, AppError> {
        match app.host.terminate_first(&self.process_name).await {
            Ok(pid) => {
                tracing::info!(name = %self.process_name, pid, "terminated process");
                Ok(Json(json!({
                    "status": format!("Process {} terminated.", self.process_name)
                })))
            }
            Err(e) => {
                tracing::warn!(name = %self.process_name, "killprocess error: {e}");
                Err(e.into())
            }
        }
    }
}
