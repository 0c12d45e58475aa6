//! Shared state injected into the invocation handlers.

use std::sync::Arc;

use crate::registry::{FunctionRegistry, FunctionTable};

/// State shared across all invocation handlers.
///
/// Holds only a reference to the external registry; handlers resolve the
/// function for each request through it, so functions registered after
/// `start()` are reachable without rebuilding the router.
#[derive(Clone)]
pub struct AppState {
    /// Source of truth for function handlers.
    pub registry: Arc<dyn FunctionRegistry>,
}

impl AppState {
    /// Create a new [`AppState`] over `registry`.
    pub fn new(registry: Arc<dyn FunctionRegistry>) -> Self {
        Self { registry }
    }
}

impl Default for AppState {
    /// Creates an [`AppState`] over an empty [`FunctionTable`], suitable for tests.
    fn default() -> Self {
        Self::new(Arc::new(FunctionTable::new()))
    }
}
