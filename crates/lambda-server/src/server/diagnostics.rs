//! Reachability report logged after the listener binds.

use std::fmt;

use tracing::{debug, info};

use super::router::{InvocationRoute, INVOKE_ASYNC_ROUTE, INVOKE_ROUTE};
use crate::registry::FunctionRegistry;

/// Transport scheme of the listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scheme {
    Http,
    Https,
}

impl Scheme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Scheme::Http => "http",
            Scheme::Https => "https",
        }
    }
}

impl fmt::Display for Scheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One function as it was exposed when the server started.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExposedFunction {
    /// Name shown to the operator.
    pub display_name: String,
    /// Canonical name used in invocation paths.
    pub name: String,
    /// `METHOD url` for the synchronous route.
    pub invoke: String,
    /// `METHOD url` for the asynchronous route.
    pub invoke_async: String,
}

/// Snapshot of what a started server exposes.
///
/// Derived from the registry at `start()`; recomputing it is always valid.
#[derive(Debug, Clone)]
pub struct Diagnostics {
    /// `scheme://host:port` the listener answers on.
    pub base_url: String,
    /// Functions known at `start()`, in registry order.
    pub functions: Vec<ExposedFunction>,
}

impl Diagnostics {
    /// Snapshot `registry` for a listener at `scheme://host:port`.
    pub fn collect(scheme: Scheme, host: &str, port: u16, registry: &dyn FunctionRegistry) -> Self {
        let base_url = format!("{scheme}://{host}:{port}");
        let name_pairs = registry.function_name_pairs();

        let functions = registry
            .function_names()
            .into_iter()
            .map(|name| {
                let display_name = name_pairs.get(&name).cloned().unwrap_or_else(|| name.clone());
                ExposedFunction {
                    display_name,
                    invoke: route_line(&base_url, &INVOKE_ROUTE, &name),
                    invoke_async: route_line(&base_url, &INVOKE_ASYNC_ROUTE, &name),
                    name,
                }
            })
            .collect();

        Self {
            base_url,
            functions,
        }
    }

    /// Emit the report: exposed names at info, route listings at debug.
    pub fn log(&self) {
        info!(
            functions = self.functions.len(),
            "Function names exposed for local invocation by aws-sdk:\n{}",
            self.listing(|f| format!("{}: {}", f.display_name, f.name))
        );
        debug!(
            "Lambda Invocation Routes (for AWS SDK or AWS CLI):\n{}",
            self.listing(|f| f.invoke.clone())
        );
        debug!(
            "Lambda Async Invocation Routes (for AWS SDK or AWS CLI):\n{}",
            self.listing(|f| f.invoke_async.clone())
        );
    }

    fn listing(&self, line: impl Fn(&ExposedFunction) -> String) -> String {
        self.functions
            .iter()
            .map(|f| format!("           * {}", line(f)))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

fn route_line(base_url: &str, route: &InvocationRoute, function_name: &str) -> String {
    format!("{} {base_url}{}", route.method, route.path_for(function_name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::{handler_fn, FunctionTable};
    use axum::{http::StatusCode, response::IntoResponse};

    fn table(names: &[(&str, &str)]) -> FunctionTable {
        let table = FunctionTable::new();
        for (name, display) in names {
            table.register(
                *name,
                *display,
                handler_fn(|_req| async move { StatusCode::OK.into_response() }),
            );
        }
        table
    }

    #[test]
    fn scheme_display() {
        assert_eq!(Scheme::Http.to_string(), "http");
        assert_eq!(Scheme::Https.to_string(), "https");
    }

    #[test]
    fn collect_lists_each_function_once_in_order() {
        let t = table(&[("hello", "svc-dev-hello"), ("bye", "svc-dev-bye")]);
        let d = Diagnostics::collect(Scheme::Http, "localhost", 3002, &t);
        assert_eq!(d.base_url, "http://localhost:3002");
        let names: Vec<_> = d.functions.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["hello", "bye"]);
        assert_eq!(d.functions[0].display_name, "svc-dev-hello");
    }

    #[test]
    fn collect_substitutes_function_into_urls() {
        let t = table(&[("hello", "svc-dev-hello")]);
        let d = Diagnostics::collect(Scheme::Https, "127.0.0.1", 8443, &t);
        assert_eq!(
            d.functions[0].invoke,
            "POST https://127.0.0.1:8443/2015-03-31/functions/hello/invocations"
        );
        assert_eq!(
            d.functions[0].invoke_async,
            "POST https://127.0.0.1:8443/2014-11-13/functions/hello/invoke-async/"
        );
    }

    #[test]
    fn listing_uses_bullets() {
        let t = table(&[("a", "A"), ("b", "B")]);
        let d = Diagnostics::collect(Scheme::Http, "localhost", 1, &t);
        let text = d.listing(|f| format!("{}: {}", f.display_name, f.name));
        assert_eq!(text, "           * A: a\n           * B: b");
    }

    #[test]
    fn empty_registry_yields_no_functions() {
        let d = Diagnostics::collect(Scheme::Http, "localhost", 3002, &FunctionTable::new());
        assert!(d.functions.is_empty());
    }
}
