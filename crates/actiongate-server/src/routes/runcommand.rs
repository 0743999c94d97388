use actiongate_core::args::InvocationArgs;
use actiongate_core::ActionError;
use axum::Json;
use serde_json::{json, Value};

use crate::error::AppError;
use crate::state::AppState;

/// GET /runcommand/{id}: run `command` plus merged arguments through the
/// shell and return its output.
///
/// Waits for the command to finish, bounded by the configured timeout.
#[derive(Debug, Clone)]
pub struct RunCommand {
    pub command: String,
    pub default_args: String,
}

impl RunCommand {
    /// The full shell command line for a request with these query values.
    pub fn command_line(&self, args: &InvocationArgs) -> actiongate_core::Result<String> {
        let suffix = args.shell_suffix()?;
        Ok(format!("{} {suffix}", self.command).trim().to_string())
    }

    pub async fn invoke(
        &self,
        app: &AppState,
        query: Vec<(String, String)>,
    ) -> Result<Json<Value>, AppError> {
        let args = InvocationArgs::from_query(self.default_args.as_str(), query);
        let full_cmd = match self.command_line(&args) {
            Ok(line) => line,
            Err(e) => {
                tracing::error!(command = %self.command, "runcommand rejected: {e}");
                return Err(e.into());
            }
        };

        let out = match app.host.run_shell(&full_cmd, app.command_timeout).await {
            Ok(out) => out,
            Err(e) => {
                tracing::error!(command = %full_cmd, "runcommand error: {e}");
                return Err(e.into());
            }
        };

        if out.success {
            tracing::info!(command = %full_cmd, "executed");
            return Ok(Json(json!({ "status": "success", "output": out.output })));
        }

        let message = if out.output.trim().is_empty() {
            match out.code {
                Some(code) => format!("command exited with status {code}"),
                None => "command terminated by signal".to_string(),
            }
        } else {
            out.output
        };
        tracing::error!(command = %full_cmd, code = ?out.code, "cmd error: {message}");
        Err(ActionError::CommandFailed(message).into())
    }
}
