//! Single entry point for the embedding system's invocation concerns.

use std::{sync::Arc, time::Duration};

use axum::Router;

use crate::registry::FunctionRegistry;
use crate::server::{InvocationServer, ServerError, ServerOptions};

/// Owns one [`InvocationServer`] and forwards lifecycle and route calls to it.
#[derive(Debug)]
pub struct InvocationFacade {
    server: InvocationServer,
}

impl InvocationFacade {
    /// Build the facade and its server. No socket activity.
    ///
    /// # Errors
    ///
    /// Propagates TLS loading failures from [`InvocationServer::new`].
    pub fn new(options: ServerOptions, registry: Arc<dyn FunctionRegistry>) -> Result<Self, ServerError> {
        Ok(Self {
            server: InvocationServer::new(options, registry)?,
        })
    }

    /// See [`InvocationServer::start`]. Exits the process on bind failure.
    pub async fn start(&mut self) -> Result<(), ServerError> {
        self.server.start().await
    }

    /// See [`InvocationServer::try_start`].
    pub async fn try_start(&mut self) -> Result<(), ServerError> {
        self.server.try_start().await
    }

    /// See [`InvocationServer::stop`].
    pub async fn stop(&mut self, timeout: Option<Duration>) -> Result<(), ServerError> {
        self.server.stop(timeout).await
    }

    /// See [`InvocationServer::add_routes`].
    pub fn add_routes(&mut self, routes: Router) -> Result<(), ServerError> {
        self.server.add_routes(routes)
    }

    /// The underlying server, for test harnesses. Not a stable contract.
    pub fn server(&self) -> &InvocationServer {
        &self.server
    }
}
