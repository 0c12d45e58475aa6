//! Limits applied to every route.

/// Largest request body accepted, matching the Lambda synchronous payload limit.
pub const MAX_PAYLOAD_BYTES: usize = 6 * 1024 * 1024;
