//! Errors produced by the invocation server lifecycle.

use thiserror::Error;

use super::{tls::TlsError, LifecycleState};

/// Invocation server error.
#[derive(Debug, Error)]
pub enum ServerError {
    /// TLS was requested but the material could not be loaded or parsed.
    #[error("invalid TLS configuration: {0}")]
    Tls(#[from] TlsError),

    /// The listener could not bind its socket.
    #[error("failed to bind {host}:{port}: {source}")]
    Bind {
        host: String,
        port: u16,
        #[source]
        source: std::io::Error,
    },

    /// A lifecycle call was made in a state that does not allow it.
    #[error("cannot {operation} while server is {state:?}")]
    InvalidState {
        operation: &'static str,
        state: LifecycleState,
    },
}
