use actiongate_core::ActionError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

// ---------------------------------------------------------------------------
// AppError: unified error type for HTTP responses
// ---------------------------------------------------------------------------

/// Unified error type for HTTP responses. Always rendered as `{"error": ...}`.
#[derive(Debug)]
pub struct AppError(pub anyhow::Error);

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self.0.downcast_ref::<ActionError>() {
            Some(ActionError::ProcessNotFound(_)) => StatusCode::NOT_FOUND,
            Some(
                ActionError::ConfigLoad(_)
                | ActionError::DuplicateIdentity(_)
                | ActionError::ProcessTable(_)
                | ActionError::Spawn { .. }
                | ActionError::CommandFailed(_)
                | ActionError::CommandTimedOut(_)
                | ActionError::UnquotableArgument(_)
                | ActionError::Yaml(_),
            ) => StatusCode::INTERNAL_SERVER_ERROR,
            None => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = serde_json::json!({ "error": self.0.to_string() });
        (status, axum::Json(body)).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}
