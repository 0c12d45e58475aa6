//! The two invocation routes and router composition.

use axum::{extract::DefaultBodyLimit, http::Method, routing::post, Router};
use tower_http::trace::TraceLayer;

use super::{handlers, middleware, state::AppState};

/// Path parameter standing in for the function name in route templates.
pub const FUNCTION_NAME_PARAM: &str = ":function_name";

/// A route that triggers a function, identified by name in its path.
#[derive(Debug, Clone)]
pub struct InvocationRoute {
    /// HTTP method the route answers on.
    pub method: Method,
    /// Axum path template containing [`FUNCTION_NAME_PARAM`].
    pub path: &'static str,
}

impl InvocationRoute {
    /// The concrete path that invokes `function_name` through this route.
    pub fn path_for(&self, function_name: &str) -> String {
        self.path.replace(FUNCTION_NAME_PARAM, function_name)
    }
}

/// Synchronous (`RequestResponse`) invocation: the Lambda `Invoke` API.
pub const INVOKE_ROUTE: InvocationRoute = InvocationRoute {
    method: Method::POST,
    path: "/2015-03-31/functions/:function_name/invocations",
};

/// Asynchronous (`Event`) invocation: the legacy Lambda `InvokeAsync` API.
pub const INVOKE_ASYNC_ROUTE: InvocationRoute = InvocationRoute {
    method: Method::POST,
    path: "/2014-11-13/functions/:function_name/invoke-async/",
};

/// Build the listener's [`Router`]: both invocation routes bound to `state`,
/// plus any `extra` routes registered by the embedding system.
///
/// `extra` must not set its own fallback.
pub fn build(state: AppState, extra: Router) -> Router {
    Router::new()
        .route(INVOKE_ASYNC_ROUTE.path, post(handlers::invoke_async))
        .route(INVOKE_ROUTE.path, post(handlers::invoke))
        .with_state(state)
        .merge(extra)
        .fallback(handlers::not_found)
        .layer(DefaultBodyLimit::max(middleware::MAX_PAYLOAD_BYTES))
        .layer(TraceLayer::new_for_http())
}
