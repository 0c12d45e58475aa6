//! Errors raised by the invocation routes before any function runs.

use thiserror::Error;

/// Route-level invocation error.
///
/// Failures inside a function handler never become an [`InvokeError`]; the
/// handler shapes its own response. Variants map to HTTP status codes:
/// - [`InvokeError::ResourceNotFound`] → 404
/// - [`InvokeError::InvalidRequestContent`] → 400
/// - [`InvokeError::UnsupportedInvocationType`] → 400
#[derive(Debug, Error)]
pub enum InvokeError {
    /// No function with this name is known to the registry.
    #[error("Function not found: {0}")]
    ResourceNotFound(String),

    /// A request header or body could not be decoded.
    #[error("invalid request content: {0}")]
    InvalidRequestContent(String),

    /// The `X-Amz-Invocation-Type` header named an unknown invocation type.
    #[error("unsupported invocation type: {0}")]
    UnsupportedInvocationType(String),
}

impl InvokeError {
    /// Returns the HTTP status code that should be sent for this error.
    pub fn http_status(&self) -> u16 {
        match self {
            InvokeError::ResourceNotFound(_) => 404,
            InvokeError::InvalidRequestContent(_) => 400,
            InvokeError::UnsupportedInvocationType(_) => 400,
        }
    }

    /// Returns the Lambda error type sent in the `X-Amzn-ErrorType` header.
    pub fn error_type(&self) -> &'static str {
        match self {
            InvokeError::ResourceNotFound(_) => "ResourceNotFoundException",
            InvokeError::InvalidRequestContent(_) => "InvalidRequestContentException",
            InvokeError::UnsupportedInvocationType(_) => "InvalidParameterValueException",
        }
    }
}
