//! Local Lambda invocation server.
//!
//! Exposes the Lambda `Invoke` (synchronous) and `InvokeAsync` (asynchronous)
//! APIs over HTTP or HTTPS so that AWS SDK and CLI clients can call locally
//! loaded functions. Functions are supplied by the embedding system through a
//! [`registry::FunctionRegistry`].

pub mod config;
pub mod facade;
pub mod functions;
pub mod registry;
pub mod server;
pub mod telemetry;

pub use facade::InvocationFacade;
pub use registry::{handler_fn, FunctionHandler, FunctionRegistry, FunctionTable, InvocationRequest};
pub use server::{InvocationServer, LifecycleState, ServerError, ServerOptions};
