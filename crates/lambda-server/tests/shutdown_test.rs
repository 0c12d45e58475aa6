//! Graceful stop with requests in flight.

mod common;

use std::{
    sync::Arc,
    time::{Duration, Instant},
};

use axum::response::IntoResponse;
use lambda_server::{handler_fn, FunctionTable, InvocationRequest, LifecycleState};
use tokio::sync::Notify;

/// A function that signals `started`, then sleeps for `work` before replying.
fn slow_table(started: Arc<Notify>, work: Duration) -> FunctionTable {
    let table = FunctionTable::new();
    table.register(
        "slow",
        "svc-dev-slow",
        handler_fn(move |_req: InvocationRequest| {
            let started = Arc::clone(&started);
            async move {
                started.notify_one();
                tokio::time::sleep(work).await;
                "finished".into_response()
            }
        }),
    );
    table
}

#[tokio::test]
async fn in_flight_request_completes_within_grace_period() {
    let started = Arc::new(Notify::new());
    let table = slow_table(Arc::clone(&started), Duration::from_millis(300));
    let mut server = common::start(common::plain_options(), &table).await;

    let url = common::invoke_url(&server, "slow");
    let request = tokio::spawn(async move {
        let resp = reqwest::Client::new().post(url).send().await?;
        Ok::<_, reqwest::Error>(resp.text().await?)
    });

    started.notified().await;
    assert_eq!(server.open_connections(), 1);
    server.stop(Some(Duration::from_secs(5))).await.unwrap();
    assert_eq!(server.state(), LifecycleState::Stopped);

    let body = request.await.unwrap().expect("response delivered");
    assert_eq!(body, "finished");
}

#[tokio::test]
async fn in_flight_request_is_closed_when_grace_period_elapses() {
    let started = Arc::new(Notify::new());
    let table = slow_table(Arc::clone(&started), Duration::from_secs(30));
    let mut server = common::start(common::plain_options(), &table).await;

    let url = common::invoke_url(&server, "slow");
    let request = tokio::spawn(async move {
        let resp = reqwest::Client::new().post(url).send().await?;
        Ok::<_, reqwest::Error>(resp.text().await?)
    });

    started.notified().await;
    let stopping = Instant::now();
    server.stop(Some(Duration::from_millis(200))).await.unwrap();
    let took = stopping.elapsed();
    assert!(took >= Duration::from_millis(200));
    assert!(took < Duration::from_secs(5), "stop waited {took:?}");

    let outcome = tokio::time::timeout(Duration::from_secs(5), request)
        .await
        .expect("client observed the close")
        .unwrap();
    assert!(outcome.is_err(), "no response expected after force-close");
}

#[tokio::test]
async fn stop_without_timeout_closes_immediately() {
    let started = Arc::new(Notify::new());
    let table = slow_table(Arc::clone(&started), Duration::from_secs(30));
    let mut server = common::start(common::plain_options(), &table).await;

    let url = common::invoke_url(&server, "slow");
    let request = tokio::spawn(async move { reqwest::Client::new().post(url).send().await });

    started.notified().await;
    let stopping = Instant::now();
    server.stop(None).await.unwrap();
    assert!(stopping.elapsed() < Duration::from_secs(2));
    assert!(request.await.unwrap().is_err());
}

#[tokio::test]
async fn stopped_listener_refuses_new_connections() {
    let table = FunctionTable::new();
    let mut server = common::start(common::plain_options(), &table).await;
    let addr = server.local_addr().unwrap();

    server.stop(Some(Duration::from_millis(100))).await.unwrap();

    assert!(tokio::net::TcpStream::connect(addr).await.is_err());
}
