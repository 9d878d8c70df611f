//! Local HTTP servers standing in for dining sites in tests.
use std::net::SocketAddr;

use axum::Router;
use tokio::net::TcpListener;

pub async fn serve(app: Router) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("binding to an ephemeral port should succeed");
    let addr = listener.local_addr().expect("listener should have an address");
    tokio::spawn(async move {
        axum::serve(listener, app)
            .await
            .expect("test server should keep running");
    });
    addr
}

/// An address nothing is listening on.
pub async fn unused_addr() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("binding to an ephemeral port should succeed");
    listener.local_addr().expect("listener should have an address")
}
