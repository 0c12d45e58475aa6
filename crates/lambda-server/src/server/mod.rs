//! Lambda invocation server: listener lifecycle, TLS, and route wiring.
//!
//! # Responsibilities
//! - Load TLS material eagerly at construction (rustls).
//! - Compose the synchronous and asynchronous invocation routes on `start()`.
//! - Bind and serve; a bind failure terminates the process.
//! - Graceful `stop(timeout)`.
//! - Log which functions are reachable and at what URLs.

pub mod diagnostics;
pub mod error;
pub mod handlers;
pub mod listener;
pub mod middleware;
pub mod router;
pub mod state;
pub mod tls;

use std::{net::SocketAddr, path::PathBuf, sync::Arc, time::Duration};

use axum::Router;
use tokio::net::TcpListener;
use tokio_rustls::TlsAcceptor;
use tracing::{error, info};

use crate::registry::FunctionRegistry;
use diagnostics::{Diagnostics, Scheme};
pub use error::ServerError;
use listener::ListenerHandle;
use state::AppState;
use tls::TlsMaterial;

/// Where and how the invocation listener binds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerOptions {
    /// Bind host (name or address).
    pub host: String,
    /// Bind port. `0` lets the kernel choose.
    pub port: u16,
    /// Directory holding `cert.pem` and `key.pem`; `None` means plain HTTP.
    pub https_protocol: Option<PathBuf>,
}

/// Lifecycle of an [`InvocationServer`]. `Stopped` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    /// Constructed; no socket bound.
    Created,
    /// `start()` in progress.
    Starting,
    /// Bound and accepting connections.
    Listening,
    /// `stop()` in progress.
    Stopping,
    /// Fully stopped; cannot be restarted.
    Stopped,
}

/// Owns the invocation listener and its lifecycle.
pub struct InvocationServer {
    options: ServerOptions,
    registry: Arc<dyn FunctionRegistry>,
    tls: Option<Arc<rustls::ServerConfig>>,
    extra_routes: Router,
    state: LifecycleState,
    listener: Option<ListenerHandle>,
    diagnostics: Option<Diagnostics>,
}

impl InvocationServer {
    /// Construct the server without touching the network.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError::Tls`] if TLS is requested and either PEM file
    /// is missing, unreadable, or unparseable.
    pub fn new(options: ServerOptions, registry: Arc<dyn FunctionRegistry>) -> Result<Self, ServerError> {
        let tls = match &options.https_protocol {
            Some(dir) => {
                let material = TlsMaterial::load(dir)?;
                Some(tls::build_server_config(&material)?)
            }
            None => None,
        };

        Ok(Self {
            options,
            registry,
            tls,
            extra_routes: Router::new(),
            state: LifecycleState::Created,
            listener: None,
            diagnostics: None,
        })
    }

    /// Merge additional routes into the listener. Only valid before `start()`.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError::InvalidState`] once the server has started.
    pub fn add_routes(&mut self, routes: Router) -> Result<(), ServerError> {
        self.expect_state(LifecycleState::Created, "add routes")?;
        let current = std::mem::take(&mut self.extra_routes);
        self.extra_routes = current.merge(routes);
        Ok(())
    }

    /// Bind and start serving.
    ///
    /// A bind failure is logged with the configured port and terminates the
    /// process with exit status 1. Use [`InvocationServer::try_start`] to
    /// handle it instead.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError::InvalidState`] if the server is not `Created`.
    pub async fn start(&mut self) -> Result<(), ServerError> {
        match self.try_start().await {
            Err(ServerError::Bind { port, source, .. }) => {
                error!(
                    port,
                    error = %source,
                    "Unexpected error while starting lambda invocation server on port {port}"
                );
                std::process::exit(1);
            }
            other => other,
        }
    }

    /// Bind and start serving, returning bind failures to the caller.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError::Bind`] if the socket cannot be bound, or
    /// [`ServerError::InvalidState`] if the server is not `Created`.
    pub async fn try_start(&mut self) -> Result<(), ServerError> {
        self.expect_state(LifecycleState::Created, "start")?;
        self.state = LifecycleState::Starting;

        let router = router::build(
            AppState::new(Arc::clone(&self.registry)),
            std::mem::take(&mut self.extra_routes),
        );

        let ServerOptions { host, port, .. } = &self.options;
        let tcp = match TcpListener::bind((host.as_str(), *port)).await {
            Ok(tcp) => tcp,
            Err(source) => {
                self.state = LifecycleState::Stopped;
                return Err(ServerError::Bind {
                    host: host.clone(),
                    port: *port,
                    source,
                });
            }
        };

        let acceptor = self.tls.clone().map(TlsAcceptor::from);
        let handle = listener::serve(tcp, router, acceptor).map_err(|source| {
            self.state = LifecycleState::Stopped;
            ServerError::Bind {
                host: host.clone(),
                port: *port,
                source,
            }
        })?;

        let bound_port = handle.local_addr().port();
        let scheme = self.scheme();
        info!(
            scheme = %scheme,
            host = %host,
            port = bound_port,
            "Offline [http for lambda] listening on {scheme}://{host}:{bound_port}"
        );

        let diagnostics = Diagnostics::collect(scheme, host, bound_port, self.registry.as_ref());
        diagnostics.log();

        self.diagnostics = Some(diagnostics);
        self.listener = Some(handle);
        self.state = LifecycleState::Listening;
        Ok(())
    }

    /// Stop accepting and wait up to `timeout` for in-flight requests.
    ///
    /// `None` or a zero duration stops immediately.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError::InvalidState`] if the server is not `Listening`.
    pub async fn stop(&mut self, timeout: Option<Duration>) -> Result<(), ServerError> {
        self.expect_state(LifecycleState::Listening, "stop")?;
        self.state = LifecycleState::Stopping;

        if let Some(handle) = self.listener.take() {
            handle.stop(timeout).await;
        }

        self.state = LifecycleState::Stopped;
        info!(port = self.options.port, "lambda invocation server stopped");
        Ok(())
    }

    /// Current lifecycle state.
    pub fn state(&self) -> LifecycleState {
        self.state
    }

    /// Options the server was constructed with.
    pub fn options(&self) -> &ServerOptions {
        &self.options
    }

    /// `https` when TLS material was loaded, `http` otherwise.
    pub fn scheme(&self) -> Scheme {
        if self.tls.is_some() {
            Scheme::Https
        } else {
            Scheme::Http
        }
    }

    /// Bound socket address while listening.
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.listener.as_ref().map(ListenerHandle::local_addr)
    }

    /// Number of open connections while listening.
    pub fn open_connections(&self) -> usize {
        self.listener.as_ref().map_or(0, ListenerHandle::open_connections)
    }

    /// The reachability report produced by the last successful `start()`.
    pub fn diagnostics(&self) -> Option<&Diagnostics> {
        self.diagnostics.as_ref()
    }

    /// A router with the same invocation routes the listener serves, for
    /// driving requests in-process.
    pub fn router(&self) -> Router {
        router::build(AppState::new(Arc::clone(&self.registry)), Router::new())
    }

    fn expect_state(&self, expected: LifecycleState, operation: &'static str) -> Result<(), ServerError> {
        if self.state == expected {
            Ok(())
        } else {
            Err(ServerError::InvalidState {
                operation,
                state: self.state,
            })
        }
    }
}

impl std::fmt::Debug for InvocationServer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InvocationServer")
            .field("options", &self.options)
            .field("scheme", &self.scheme())
            .field("state", &self.state)
            .field("local_addr", &self.local_addr())
            .finish()
    }
}
