//! Axum request handlers for the two invocation routes.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use bytes::Bytes;
use common::protocol::{
    ErrorResponse, InvokeAsyncResponse, CLIENT_CONTEXT_HEADER, ERROR_TYPE_HEADER,
    INVOCATION_TYPE_HEADER,
};
use common::{InvocationType, InvokeError};
use tracing::{debug, warn};

use super::state::AppState;
use crate::registry::{FunctionHandler, InvocationRequest};

/// `POST /2015-03-31/functions/{functionName}/invocations`: the Lambda `Invoke` API.
///
/// `X-Amz-Invocation-Type` selects the behaviour:
/// - `RequestResponse` (default): wait for the function and return its
///   response unchanged.
/// - `Event`: schedule the function and return `202 Accepted` at once.
/// - `DryRun`: check the function exists and return `204 No Content`.
pub async fn invoke(
    State(state): State<AppState>,
    Path(function_name): Path<String>,
    headers: HeaderMap,
    payload: Bytes,
) -> Response {
    let invocation_type = match requested_invocation_type(&headers) {
        Ok(t) => t,
        Err(e) => return error_response(&e),
    };

    let (handler, request) =
        match prepare(&state, function_name, invocation_type, &headers, payload) {
            Ok(prepared) => prepared,
            Err(e) => return error_response(&e),
        };

    match invocation_type {
        InvocationType::RequestResponse => {
            debug!(function = %request.function_name, "invoking function");
            handler.invoke(request).await
        }
        InvocationType::Event => {
            schedule(handler, request);
            StatusCode::ACCEPTED.into_response()
        }
        InvocationType::DryRun => StatusCode::NO_CONTENT.into_response(),
    }
}

/// `POST /2014-11-13/functions/{functionName}/invoke-async/`: the legacy `InvokeAsync` API.
///
/// Always schedules the function and acknowledges with `{"Status":202}`.
pub async fn invoke_async(
    State(state): State<AppState>,
    Path(function_name): Path<String>,
    headers: HeaderMap,
    payload: Bytes,
) -> Response {
    match prepare(&state, function_name, InvocationType::Event, &headers, payload) {
        Ok((handler, request)) => {
            schedule(handler, request);
            (StatusCode::ACCEPTED, Json(InvokeAsyncResponse::accepted())).into_response()
        }
        Err(e) => error_response(&e),
    }
}

/// Catch-all 404 handler.
pub async fn not_found() -> impl IntoResponse {
    let err = ErrorResponse::user("the requested resource does not exist");
    (StatusCode::NOT_FOUND, Json(err))
}

// ---------------------------------------------------------------------------
// Request decoding helpers
// ---------------------------------------------------------------------------

/// Resolve the handler and decode the request for `function_name`.
///
/// The registry is consulted here, per request, never at route registration.
fn prepare(
    state: &AppState,
    function_name: String,
    invocation_type: InvocationType,
    headers: &HeaderMap,
    payload: Bytes,
) -> Result<(Arc<dyn FunctionHandler>, InvocationRequest), InvokeError> {
    let client_context = client_context(headers)?;
    let handler = state
        .registry
        .handler(&function_name)
        .ok_or_else(|| InvokeError::ResourceNotFound(function_name.clone()))?;

    let request = InvocationRequest {
        function_name,
        invocation_type,
        payload,
        client_context,
    };
    Ok((handler, request))
}

fn requested_invocation_type(headers: &HeaderMap) -> Result<InvocationType, InvokeError> {
    match headers.get(INVOCATION_TYPE_HEADER) {
        None => Ok(InvocationType::default()),
        Some(v) => v
            .to_str()
            .map_err(|_| {
                InvokeError::UnsupportedInvocationType(
                    String::from_utf8_lossy(v.as_bytes()).into_owned(),
                )
            })?
            .parse(),
    }
}

/// Decode `X-Amz-Client-Context`: base64 wrapping a JSON document.
fn client_context(headers: &HeaderMap) -> Result<Option<serde_json::Value>, InvokeError> {
    let Some(raw) = headers.get(CLIENT_CONTEXT_HEADER) else {
        return Ok(None);
    };
    let encoded = raw.to_str().map_err(|_| {
        InvokeError::InvalidRequestContent(
            "X-Amz-Client-Context header contains non-ASCII characters".into(),
        )
    })?;
    let decoded = STANDARD.decode(encoded.trim()).map_err(|e| {
        InvokeError::InvalidRequestContent(format!("X-Amz-Client-Context is not base64: {e}"))
    })?;
    serde_json::from_slice(&decoded).map(Some).map_err(|e| {
        InvokeError::InvalidRequestContent(format!("X-Amz-Client-Context is not JSON: {e}"))
    })
}

/// Run the function in the background. Its response is discarded.
fn schedule(handler: Arc<dyn FunctionHandler>, request: InvocationRequest) {
    let function_name = request.function_name.clone();
    let invocation = handler.invoke(request);
    tokio::spawn(async move {
        let resp = invocation.await;
        let status = resp.status();
        if status.is_server_error() {
            warn!(function = %function_name, status = status.as_u16(), "event invocation failed");
        } else {
            debug!(function = %function_name, status = status.as_u16(), "event invocation finished");
        }
    });
}

fn error_response(err: &InvokeError) -> Response {
    let status =
        StatusCode::from_u16(err.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (
        status,
        [(ERROR_TYPE_HEADER, err.error_type())],
        Json(ErrorResponse::from(err)),
    )
        .into_response()
}
