pub mod killprocess;
pub mod openfile;
pub mod runcommand;

use std::collections::HashSet;
use std::future::Future;
use std::sync::Arc;

use actiongate_core::action::Unroutable;
use actiongate_core::{Action, BoundAction, Identity};
use axum::extract::{Query, State};
use axum::routing::{get, MethodRouter};
use axum::{middleware, Json, Router};
use serde::Serialize;
use serde_json::Value;

use crate::auth::{require_token, AuthToken};
use crate::error::AppError;
use crate::state::AppState;

use killprocess::KillProcess;
use openfile::OpenFile;
use runcommand::RunCommand;

/// One registered endpoint: an action identity plus the parameters its
/// handler was bound with.
#[derive(Debug, Clone)]
pub struct Route {
    pub identity: Identity,
    pub action: BoundAction,
}

impl Route {
    pub fn path(&self) -> String {
        self.identity.path()
    }

    pub fn endpoint(&self) -> String {
        self.identity.endpoint()
    }
}

/// Listing entry for `actiongate routes`.
#[derive(Debug, Clone, Serialize)]
pub struct RouteInfo {
    pub path: String,
    pub endpoint: String,
    pub action: String,
}

/// Immutable table of routes, built once at startup from expanded actions.
#[derive(Debug, Clone, Default)]
pub struct RouteTable {
    routes: Vec<Route>,
    skipped: Vec<(Identity, Unroutable)>,
}

impl RouteTable {
    /// Bind every routable action. Anything that cannot be routed (unknown
    /// type, missing field, unusable id) is logged and left out.
    pub fn build(actions: &[Action]) -> Self {
        tracing::info!("Registering routes...");
        let mut table = RouteTable::default();
        let mut endpoints = HashSet::new();

        for action in actions {
            let identity = action.identity();
            let bound = match action.bind() {
                Ok(bound) => bound,
                Err(reason) => {
                    tracing::warn!(item = %identity, "skipping action: {reason}");
                    table.skipped.push((identity, reason));
                    continue;
                }
            };
            if !endpoints.insert(identity.endpoint()) {
                tracing::warn!(item = %identity, "skipping action: endpoint already registered");
                continue;
            }
            tracing::info!("Registered {identity}");
            table.routes.push(Route {
                identity,
                action: bound,
            });
        }

        tracing::info!(count = table.routes.len(), "Routes registered.");
        table
    }

    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    pub fn skipped(&self) -> &[(Identity, Unroutable)] {
        &self.skipped
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    pub fn describe(&self) -> Vec<RouteInfo> {
        self.routes
            .iter()
            .map(|r| RouteInfo {
                path: r.path(),
                endpoint: r.endpoint(),
                action: r.action.describe(),
            })
            .collect()
    }

    /// Turn the table into an axum router. Every route is wrapped in the
    /// token check individually.
    pub fn into_router(self, token: AuthToken) -> Router<AppState> {
        let mut router = Router::new();
        for route in self.routes {
            let path = route.path();
            let method = match route.action {
                BoundAction::OpenFile { path, default_args } => bind_get(
                    OpenFile { path, default_args },
                    |app, open, query| async move { open.invoke(&app, query).await },
                ),
                BoundAction::KillProcess { process_name } => bind_get(
                    KillProcess { process_name },
                    |app, kill, _query| async move { kill.invoke(&app).await },
                ),
                BoundAction::RunCommand {
                    command,
                    default_args,
                } => bind_get(
                    RunCommand {
                        command,
                        default_args,
                    },
                    |app, run, query| async move { run.invoke(&app, query).await },
                ),
            };
            router = router.route(
                &path,
                method.route_layer(middleware::from_fn_with_state(
                    token.clone(),
                    require_token,
                )),
            );
        }
        router
    }
}

/// GET handler closing over its own copy of the bound parameters.
fn bind_get<T, F, Fut>(bound: T, call: F) -> MethodRouter<AppState>
where
    T: Send + Sync + 'static,
    F: Fn(AppState, Arc<T>, Vec<(String, String)>) -> Fut + Clone + Send + Sync + 'static,
    Fut: Future<Output = Result<Json<Value>, AppError>> + Send + 'static,
{
    let bound = Arc::new(bound);
    get(
        move |State(app): State<AppState>, Query(query): Query<Vec<(String, String)>>| {
            let bound = Arc::clone(&bound);
            let call = call.clone();
            async move { call(app, bound, query).await }
        },
    )
}

// ---------------------------------------------------------------------------
// Test double for handler unit tests
// ---------------------------------------------------------------------------


// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
