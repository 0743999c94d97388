use actiongate_core::args::InvocationArgs;
use axum::Json;
use serde_json::{json, Value};

use crate::error::AppError;
use crate::state::AppState;

/// GET /openfile/{id}: launch `path` detached with the merged arguments.
#[derive(Debug, Clone)]
pub struct OpenFile {
    pub path: String,
    pub default_args: String,
}

impl OpenFile {
    pub async fn invoke(
        &self,
        app: &AppState,
        query: Vec<(String, String)>,
    ) -> Result<Json<Value>, AppError> {
        let args = InvocationArgs::from_query(self.default_args.as_str(), query);
        let joined = args.joined();

        match app.host.spawn_detached(&self.path, &args.argv()).await {
            Ok(pid) => {
                tracing::info!(path = %self.path, args = %joined, ?pid, "opened");
                Ok(Json(json!({ "status": format!("Opened {} {}", self.path, joined) })))
            }
            Err(e) => {
                tracing::error!(path = %self.path, args = %joined, "openfile error: {e}");
                Err(e.into())
            }
        }
    }
}
