//! Wire types for the Lambda Invoke API surface.
//!
//! Only the bodies produced by the invocation routes themselves live here.
//! Function results are opaque to the server and pass through untouched.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::error::InvokeError;

/// Request header selecting the invocation type on the `invocations` route.
pub const INVOCATION_TYPE_HEADER: &str = "x-amz-invocation-type";

/// Request header carrying a base64-encoded JSON client context.
pub const CLIENT_CONTEXT_HEADER: &str = "x-amz-client-context";

/// Response header naming the error type on route-level failures.
pub const ERROR_TYPE_HEADER: &str = "x-amzn-errortype";

// ---------------------------------------------------------------------------
// Invocation type
// ---------------------------------------------------------------------------

/// How the caller wants the function to be invoked.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum InvocationType {
    /// Hold the request open until the function returns, then return its result.
    #[default]
    RequestResponse,
    /// Acknowledge immediately and run the function in the background.
    Event,
    /// Validate the request without running the function.
    DryRun,
}

impl InvocationType {
    /// The header value for this invocation type.
    pub fn as_str(&self) -> &'static str {
        match self {
            InvocationType::RequestResponse => "RequestResponse",
            InvocationType::Event => "Event",
            InvocationType::DryRun => "DryRun",
        }
    }
}

impl fmt::Display for InvocationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InvocationType {
    type Err = InvokeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "RequestResponse" => Ok(InvocationType::RequestResponse),
            "Event" => Ok(InvocationType::Event),
            "DryRun" => Ok(InvocationType::DryRun),
            other => Err(InvokeError::UnsupportedInvocationType(other.to_owned())),
        }
    }
}

// ---------------------------------------------------------------------------
// Error response
// ---------------------------------------------------------------------------

/// Error body returned by the invocation routes when no function ran.
///
/// Mirrors the shape the Lambda service uses (`{"Type": ..., "Message": ...}`)
/// so that SDK clients surface the message unchanged.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Fault category: `"User"` for caller mistakes, `"Service"` otherwise.
    #[serde(rename = "Type")]
    pub kind: String,
    /// Human-readable description safe to expose to callers.
    #[serde(rename = "Message")]
    pub message: String,
}

impl ErrorResponse {
    /// Construct a caller-fault [`ErrorResponse`].
    pub fn user(message: impl Into<String>) -> Self {
        Self {
            kind: "User".into(),
            message: message.into(),
        }
    }
}

impl From<&InvokeError> for ErrorResponse {
    fn from(err: &InvokeError) -> Self {
        ErrorResponse::user(err.to_string())
    }
}

// ---------------------------------------------------------------------------
// InvokeAsync acknowledgement
// ---------------------------------------------------------------------------

/// Response body for the legacy `InvokeAsync` API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvokeAsyncResponse {
    /// Always `202`.
    #[serde(rename = "Status")]
    pub status: u16,
}

impl InvokeAsyncResponse {
    /// The acknowledgement sent once a function has been scheduled.
    pub fn accepted() -> Self {
        Self { status: 202 }
    }
}
