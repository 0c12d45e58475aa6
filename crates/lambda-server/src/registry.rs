//! Function registry contract and an in-memory implementation.
//!
//! The invocation server never owns the set of loaded functions. It reads it
//! through [`FunctionRegistry`]: once per `start()` to report what is
//! reachable, and once per request to find the handler for a path's function
//! name.

use std::{collections::HashMap, fmt, future::Future, pin::Pin, sync::Arc};

use arc_swap::ArcSwap;
use axum::response::Response;
use bytes::Bytes;
use common::InvocationType;

/// Future returned by [`FunctionHandler::invoke`].
pub type InvocationFuture = Pin<Box<dyn Future<Output = Response> + Send + 'static>>;

/// A single invocation, as decoded from the HTTP request.
#[derive(Debug, Clone)]
pub struct InvocationRequest {
    /// Function name taken from the request path.
    pub function_name: String,
    /// How the caller asked for the function to be run.
    pub invocation_type: InvocationType,
    /// Raw request body, passed through undecoded.
    pub payload: Bytes,
    /// Decoded `X-Amz-Client-Context`, when the caller sent one.
    pub client_context: Option<serde_json::Value>,
}

/// Executes one function.
///
/// The returned response is sent to synchronous callers unchanged, so the
/// handler decides how its own failures map to status codes. Handlers must be
/// safe to invoke concurrently for distinct requests.
pub trait FunctionHandler: Send + Sync + 'static {
    fn invoke(&self, request: InvocationRequest) -> InvocationFuture;
}

/// [`FunctionHandler`] backed by an async closure. Built by [`handler_fn`].
#[derive(Clone)]
pub struct FnHandler<F> {
    f: F,
}

/// Wrap an async closure as a [`FunctionHandler`].
///
/// ```no_run
/// use axum::response::IntoResponse;
/// use lambda_server::registry::handler_fn;
///
/// let echo = handler_fn(|req| async move { req.payload.into_response() });
/// ```
pub fn handler_fn<F, Fut>(f: F) -> FnHandler<F>
where
    F: Fn(InvocationRequest) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Response> + Send + 'static,
{
    FnHandler { f }
}

impl<F, Fut> FunctionHandler for FnHandler<F>
where
    F: Fn(InvocationRequest) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Response> + Send + 'static,
{
    fn invoke(&self, request: InvocationRequest) -> InvocationFuture {
        Box::pin((self.f)(request))
    }
}

impl<F> fmt::Debug for FnHandler<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("FnHandler")
    }
}

/// Read-only view of the loaded functions.
pub trait FunctionRegistry: Send + Sync + 'static {
    /// Function name → display name, used for diagnostics only.
    fn function_name_pairs(&self) -> HashMap<String, String>;

    /// Names of all currently known functions, in registration order.
    fn function_names(&self) -> Vec<String>;

    /// The handler for `function_name`, if such a function is known.
    fn handler(&self, function_name: &str) -> Option<Arc<dyn FunctionHandler>>;
}

/// A function entry held by [`FunctionTable`].
#[derive(Clone)]
struct RegisteredFunction {
    name: String,
    display_name: String,
    handler: Arc<dyn FunctionHandler>,
}

/// In-memory [`FunctionRegistry`].
///
/// Backed by [`ArcSwap`] so request-time lookups never block and functions
/// can be registered while the server is already listening.
#[derive(Clone)]
pub struct FunctionTable {
    inner: Arc<ArcSwap<Vec<RegisteredFunction>>>,
}

impl FunctionTable {
    /// Create a new, empty [`FunctionTable`].
    pub fn new() -> Self {
        Self {
            inner: Arc::new(ArcSwap::from_pointee(Vec::new())),
        }
    }

    /// Register (or replace) a function.
    ///
    /// Replacing keeps the function's original position in
    /// [`FunctionRegistry::function_names`].
    pub fn register<H>(&self, name: impl Into<String>, display_name: impl Into<String>, handler: H)
    where
        H: FunctionHandler,
    {
        let entry = RegisteredFunction {
            name: name.into(),
            display_name: display_name.into(),
            handler: Arc::new(handler),
        };
        self.inner.rcu(|current| {
            let mut next = Vec::clone(current);
            match next.iter_mut().find(|f| f.name == entry.name) {
                Some(existing) => *existing = entry.clone(),
                None => next.push(entry.clone()),
            }
            next
        });
    }

    /// Number of registered functions.
    pub fn len(&self) -> usize {
        self.inner.load().len()
    }

    /// Return `true` if no functions are registered.
    pub fn is_empty(&self) -> bool {
        self.inner.load().is_empty()
    }
}

impl Default for FunctionTable {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for FunctionTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FunctionTable")
            .field("functions", &self.function_names())
            .finish()
    }
}

impl FunctionRegistry for FunctionTable {
    fn function_name_pairs(&self) -> HashMap<String, String> {
        self.inner
            .load()
            .iter()
            .map(|f| (f.name.clone(), f.display_name.clone()))
            .collect()
    }

    fn function_names(&self) -> Vec<String> {
        self.inner.load().iter().map(|f| f.name.clone()).collect()
    }

    fn handler(&self, function_name: &str) -> Option<Arc<dyn FunctionHandler>> {
        self.inner
            .load()
            .iter()
            .find(|f| f.name == function_name)
            .map(|f| Arc::clone(&f.handler))
    }
}
