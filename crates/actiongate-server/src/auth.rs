use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};

/// Header every caller must present.
pub const AUTH_HEADER: &str = "x-auth-token";

/// The process-wide shared secret. Immutable once the server starts.
#[derive(Clone)]
pub struct AuthToken(Arc<str>);

impl AuthToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(Arc::from(token.into()))
    }

    /// Exact equality; a missing header never matches.
    pub fn accepts(&self, supplied: Option<&str>) -> bool {
        supplied == Some(&*self.0)
    }
}

impl std::fmt::Debug for AuthToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("AuthToken(..)")
    }
}

/// Axum middleware placed around every action route.
///
/// Runs before the route's extractors and handler, so a rejected request
/// never reaches code with side effects.
pub async fn require_token(
    State(token): State<AuthToken>,
    req: Request,
    next: Next,
) -> Response {
    let supplied = req
        .headers()
        .get(AUTH_HEADER)
        .and_then(|v| v.to_str().ok());

    if token.accepts(supplied) {
        return next.run(req).await;
    }

    tracing::warn!(path = %req.uri().path(), "rejected request with missing or invalid token");
    (
        StatusCode::UNAUTHORIZED,
        Json(serde_json::json!({ "error": "Unauthorized" })),
    )
        .into_response()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, http::Request, middleware, routing::get, Router};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tower::ServiceExt;

    fn test_app(calls: Arc<AtomicUsize>) -> Router {
        let handler = move || {
            let calls = calls.clone();
            async move {
                calls.fetch_add(1, Ordering::SeqCst);
                "ok"
            }
        };
        Router::new().route(
            "/runcommand/1",
            get(handler).route_layer(middleware::from_fn_with_state(
                AuthToken::new("secret"),
                require_token,
            )),
        )
    }

    async fn send(app: Router, token: Option<&str>) -> Response {
        let mut req = Request::builder().uri("/runcommand/1");
        if let Some(t) = token {
            req = req.header("X-Auth-Token", t);
        }
        app.oneshot(req.body(Body::empty()).unwrap()).await.unwrap()
    }

    #[tokio::test]
    async fn matching_token_reaches_handler() {
        let calls = Arc::new(AtomicUsize::new(0));
        let resp = send(test_app(calls.clone()), Some("secret")).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn missing_token_is_rejected_before_handler() {
        let calls = Arc::new(AtomicUsize::new(0));
        let resp = send(test_app(calls.clone()), None).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn wrong_token_is_rejected_before_handler() {
        let calls = Arc::new(AtomicUsize::new(0));
        let resp = send(test_app(calls.clone()), Some("secret ")).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        let ct = resp
            .headers()
            .get("content-type")
            .unwrap()
            .to_str()
            .unwrap();
        assert!(ct.contains("application/json"));
    }

    #[test]
    fn accepts_is_exact() {
        let token = AuthToken::new("abc");
        assert!(token.accepts(Some("abc")));
        assert!(!token.accepts(Some("ABC")));
        assert!(!token.accepts(Some("")));
        assert!(!token.accepts(None));
    }
}
