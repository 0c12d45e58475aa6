//! Accept loop, per-connection serving, and graceful stop.
//!
//! Each accepted connection runs on its own task, tracked by a
//! [`TaskTracker`]. Two cancellation tokens drive shutdown:
//! - `shutdown`: stop accepting and ask every connection to finish its
//!   in-flight request, then close.
//! - `force`: drop whatever connections are still open.

use std::{net::SocketAddr, time::Duration};

use axum::{extract::Request, Router};
use hyper::body::Incoming;
use hyper_util::{
    rt::{TokioExecutor, TokioIo},
    server::conn::auto,
};
use tokio::{
    io::{AsyncRead, AsyncWrite},
    net::TcpListener,
    task::JoinHandle,
};
use tokio_rustls::TlsAcceptor;
use tokio_util::{sync::CancellationToken, task::TaskTracker};
use tower::Service;
use tracing::{debug, info, warn};

/// Handle to a running listener. Dropping it does not stop the listener;
/// call [`ListenerHandle::stop`].
#[derive(Debug)]
pub struct ListenerHandle {
    local_addr: SocketAddr,
    shutdown: CancellationToken,
    force: CancellationToken,
    connections: TaskTracker,
    accept_task: JoinHandle<()>,
}

impl ListenerHandle {
    /// Address the socket is bound to.
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Number of connections currently open.
    pub fn open_connections(&self) -> usize {
        self.connections.len()
    }

    /// Stop accepting, then wait up to `timeout` for open connections to
    /// finish before force-closing them.
    ///
    /// `None` or a zero duration closes every connection immediately.
    pub async fn stop(self, timeout: Option<Duration>) {
        self.shutdown.cancel();
        if let Err(e) = self.accept_task.await {
            warn!(error = %e, "accept loop ended abnormally");
        }
        self.connections.close();

        match timeout.filter(|t| !t.is_zero()) {
            Some(grace) => {
                if tokio::time::timeout(grace, self.connections.wait())
                    .await
                    .is_err()
                {
                    info!(
                        grace_ms = grace.as_millis() as u64,
                        remaining = self.connections.len(),
                        "grace period elapsed; closing remaining connections"
                    );
                    self.force.cancel();
                    self.connections.wait().await;
                }
            }
            None => {
                self.force.cancel();
                self.connections.wait().await;
            }
        }
    }
}

/// Start serving `router` on an already-bound `listener`.
///
/// When `tls` is set every connection must complete a TLS handshake before
/// HTTP is spoken.
pub fn serve(
    listener: TcpListener,
    router: Router,
    tls: Option<TlsAcceptor>,
) -> std::io::Result<ListenerHandle> {
    let local_addr = listener.local_addr()?;
    let shutdown = CancellationToken::new();
    let force = CancellationToken::new();
    let connections = TaskTracker::new();

    let accept_task = tokio::spawn(accept_loop(
        listener,
        router,
        tls,
        shutdown.clone(),
        force.clone(),
        connections.clone(),
    ));

    Ok(ListenerHandle {
        local_addr,
        shutdown,
        force,
        connections,
        accept_task,
    })
}

async fn accept_loop(
    listener: TcpListener,
    router: Router,
    tls: Option<TlsAcceptor>,
    shutdown: CancellationToken,
    force: CancellationToken,
    connections: TaskTracker,
) {
    loop {
        let (tcp, peer_addr) = tokio::select! {
            _ = shutdown.cancelled() => break,
            accepted = listener.accept() => match accepted {
                Ok(conn) => conn,
                Err(e) => {
                    // Transient (e.g. ECONNABORTED); keep accepting.
                    debug!(error = %e, "accept error");
                    continue;
                }
            },
        };
        debug!(%peer_addr, "accepted connection");

        let router = router.clone();
        let tls = tls.clone();
        let shutdown = shutdown.clone();
        let force = force.clone();
        connections.spawn(async move {
            match tls {
                Some(acceptor) => {
                    let handshake = tokio::select! {
                        _ = force.cancelled() => return,
                        res = acceptor.accept(tcp) => res,
                    };
                    match handshake {
                        Ok(stream) => serve_connection(stream, router, shutdown, force).await,
                        Err(e) => debug!(%peer_addr, error = %e, "TLS handshake failed"),
                    }
                }
                None => serve_connection(tcp, router, shutdown, force).await,
            }
        });
    }
    debug!("accept loop stopped");
}

/// Drive one HTTP connection until it closes, a graceful stop completes, or
/// it is force-closed.
async fn serve_connection<I>(
    io: I,
    router: Router,
    shutdown: CancellationToken,
    force: CancellationToken,
) where
    I: AsyncRead + AsyncWrite + Unpin + Send + 'static,
{
    let service = hyper::service::service_fn(move |request: Request<Incoming>| {
        router.clone().call(request)
    });

    let builder = auto::Builder::new(TokioExecutor::new());
    let conn = builder.serve_connection_with_upgrades(TokioIo::new(io), service);
    tokio::pin!(conn);

    let result = tokio::select! {
        res = conn.as_mut() => res,
        _ = force.cancelled() => return,
        _ = shutdown.cancelled() => {
            conn.as_mut().graceful_shutdown();
            tokio::select! {
                res = conn.as_mut() => res,
                _ = force.cancelled() => {
                    debug!("force-closing connection");
                    return;
                }
            }
        }
    };

    if let Err(e) = result {
        debug!(error = %e, "connection closed with error");
    }
}
