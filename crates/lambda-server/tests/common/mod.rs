//! Shared helpers for lambda-server integration tests.

#![allow(dead_code)]

use std::{path::Path, sync::Arc};

use lambda_server::server::router::{INVOKE_ASYNC_ROUTE, INVOKE_ROUTE};
use lambda_server::{FunctionTable, InvocationServer, ServerOptions};

pub fn plain_options() -> ServerOptions {
    ServerOptions {
        host: "127.0.0.1".into(),
        port: 0,
        https_protocol: None,
    }
}

pub fn tls_options(dir: &Path) -> ServerOptions {
    ServerOptions {
        https_protocol: Some(dir.to_path_buf()),
        ..plain_options()
    }
}

/// Construct and start a server over `table` on an ephemeral port.
pub async fn start(options: ServerOptions, table: &FunctionTable) -> InvocationServer {
    let mut server = InvocationServer::new(options, Arc::new(table.clone()))
        .expect("server construction");
    server.try_start().await.expect("server start");
    server
}

fn base_url(server: &InvocationServer) -> String {
    let addr = server.local_addr().expect("listening");
    format!("{}://{}", server.scheme(), addr)
}

pub fn invoke_url(server: &InvocationServer, function_name: &str) -> String {
    format!("{}{}", base_url(server), INVOKE_ROUTE.path_for(function_name))
}

pub fn invoke_async_url(server: &InvocationServer, function_name: &str) -> String {
    format!("{}{}", base_url(server), INVOKE_ASYNC_ROUTE.path_for(function_name))
}

/// Write a fresh self-signed `cert.pem` / `key.pem` pair into `dir`.
pub fn write_self_signed(dir: &Path) {
    let generated =
        rcgen::generate_simple_self_signed(vec!["localhost".into(), "127.0.0.1".into()])
            .expect("certificate generation");
    std::fs::write(dir.join("cert.pem"), generated.cert.pem()).unwrap();
    std::fs::write(dir.join("key.pem"), generated.key_pair.serialize_pem()).unwrap();
}
