//! In-process mock gRPC servers.

use std::net::SocketAddr;

use tokio::net::TcpListener;
use tokio_stream::wrappers::TcpListenerStream;
use tonic::service::Routes;
use tonic::transport::{Channel, Endpoint, Server};

/// Serve `routes` on an ephemeral localhost port for the rest of the test.
///
/// Panics if the port cannot be bound.
pub async fn serve_routes(routes: Routes) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .unwrap_or_else(|e| panic!("failed to bind mock server: {e}"));
    let addr = listener
        .local_addr()
        .unwrap_or_else(|e| panic!("mock server has no local address: {e}"));

    tokio::spawn(async move {
        Server::builder()
            .add_routes(routes)
            .serve_with_incoming(TcpListenerStream::new(listener))
            .await
    });
    addr
}

/// Open a client channel to a server started with [`serve_routes`].
pub async fn connect(addr: SocketAddr) -> Channel {
    Endpoint::from_shared(format!("http://{addr}"))
        .unwrap_or_else(|e| panic!("invalid endpoint for {addr}: {e}"))
        .connect()
        .await
        .unwrap_or_else(|e| panic!("failed to connect to {addr}: {e}"))
}
