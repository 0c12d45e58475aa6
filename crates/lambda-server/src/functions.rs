//! Built-in functions registered by the standalone binary.

use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};

use crate::registry::{handler_fn, FunctionHandler, FunctionTable, InvocationRequest};

/// Name of the built-in echo function.
pub const ECHO: &str = "echo";

/// Returns the invocation payload as the response body.
pub fn echo() -> impl FunctionHandler {
    handler_fn(|req: InvocationRequest| async move { echo_response(req) })
}

fn echo_response(req: InvocationRequest) -> Response {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "application/json")],
        req.payload,
    )
        .into_response()
}

/// A table holding the built-in functions.
pub fn builtin_table() -> FunctionTable {
    let table = FunctionTable::new();
    table.register(ECHO, ECHO, echo());
    table
}
