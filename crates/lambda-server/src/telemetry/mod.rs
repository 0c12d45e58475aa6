//! Structured logging, with optional OpenTelemetry span export.
//!
//! Log level is configurable via `LOG_LEVEL` (default: `info`); `RUST_LOG`
//! takes precedence when set.

pub mod init;

pub use init::{init_telemetry, shutdown_telemetry};
