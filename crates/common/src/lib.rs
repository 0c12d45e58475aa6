//! Wire types and route-level errors shared across `lambda-server` crates.

pub mod error;
pub mod protocol;

pub use error::InvokeError;
pub use protocol::InvocationType;
