//! Standalone HTTP server
//!
//! Drives [`App`] with hyper when the guestbook runs as a regular process
//! (container, VM, laptop) instead of behind a Lambda trigger.

use crate::{App, Request};
use hyper::{
    server::{conn::AddrIncoming, Builder},
    service::{make_service_fn, service_fn},
    Body, Server,
};
use std::{convert::Infallible, future::Future, net::SocketAddr, net::TcpListener, sync::Arc};
use tracing::info;

/// Serves `app` on `addr` until `shutdown` resolves
pub async fn serve<F>(app: Arc<App>, addr: SocketAddr, shutdown: F) -> Result<(), hyper::Error>
where
    F: Future<Output = ()>,
{
    run(app, Server::try_bind(&addr)?, shutdown).await
}

/// Serves `app` on an already bound listener until `shutdown` resolves
pub async fn serve_listener<F>(app: Arc<App>, listener: TcpListener, shutdown: F) -> Result<(), hyper::Error>
where
    F: Future<Output = ()>,
{
    run(app, Server::from_tcp(listener)?, shutdown).await
}

async fn run<F>(app: Arc<App>, builder: Builder<AddrIncoming>, shutdown: F) -> Result<(), hyper::Error>
where
    F: Future<Output = ()>,
{
    let make_service = make_service_fn(move |_conn| {
        let app = Arc::clone(&app);
        async move { Ok::<_, Infallible>(service_fn(move |request| call(Arc::clone(&app), request))) }
    });
    let server = builder.serve(make_service);
    info!(addr = %server.local_addr(), "guestbook listening");
    server.with_graceful_shutdown(shutdown).await?;
    info!("guestbook stopped");
    Ok(())
}

async fn call(app: Arc<App>, request: hyper::Request<Body>) -> Result<hyper::Response<Body>, hyper::Error> {
    let (parts, body) = request.into_parts();
    let body = hyper::body::to_bytes(body).await?;
    let response = app.handle(Request::from_parts(parts, body)).await;
    Ok(response.map(Body::from))
}
