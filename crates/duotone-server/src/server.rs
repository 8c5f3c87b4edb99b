//! TCP accept loop.

use std::future::Future;
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use std::time::Duration;

use http::Method;
use tokio::net::{TcpListener, TcpStream};

use crate::config::ServerConfig;
use crate::error::ServerError;
use crate::routes::{self, AppState};
use crate::wire::{read_request, write_response};

/// How long a client may take to send its request.
const READ_TIMEOUT: Duration = Duration::from_secs(60);

/// Allowance for multipart framing around the uploaded file.
const FORM_OVERHEAD_BYTES: usize = 64 * 1024;

/// A bound, not yet running, server.
pub struct Server {
    listener: TcpListener,
    state: Arc<AppState>,
}

impl Server {
    /// Bind the listener described by `config`.
    pub async fn bind(config: ServerConfig) -> std::io::Result<Self> {
        let listener = TcpListener::bind(config.bind_addr()).await?;
        Ok(Self {
            listener,
            state: Arc::new(AppState::new(config)),
        })
    }

    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    pub fn config(&self) -> &ServerConfig {
        &self.state.config
    }

    /// Serve until the process is killed.
    pub async fn run(self) {
        self.run_until(std::future::pending()).await;
    }

    /// Serve until `shutdown` resolves. In-flight connections finish on
    /// their own tasks.
    pub async fn run_until(self, shutdown: impl Future<Output = ()>) {
        tokio::pin!(shutdown);
        loop {
            tokio::select! {
                () = &mut shutdown => {
                    tracing::info!("Shutting down");
                    break;
                }
                accepted = self.listener.accept() => {
                    let (stream, peer) = match accepted {
                        Ok(conn) => conn,
                        Err(e) => {
                            tracing::error!("Accept failed: {e}");
                            continue;
                        }
                    };
                    let state = Arc::clone(&self.state);
                    tokio::spawn(async move {
                        if let Err(e) = serve_connection(&state, stream, peer).await {
                            tracing::debug!("Connection {peer} ended: {e}");
                        }
                    });
                }
            }
        }
    }
}

async fn serve_connection(
    state: &AppState,
    mut stream: TcpStream,
    peer: SocketAddr,
) -> Result<(), ServerError> {
    let max_body = state
        .config
        .max_upload_bytes()
        .saturating_add(FORM_OVERHEAD_BYTES);

    let request = match tokio::time::timeout(READ_TIMEOUT, read_request(&mut stream, max_body)).await
    {
        Ok(Ok(request)) => request,
        Ok(Err(err)) if err.is_connection_error() => return Err(err),
        Ok(Err(err)) => {
            write_response(&mut stream, &err.to_response(), false).await?;
            return Err(err);
        }
        Err(_) => {
            let err = ServerError::Timeout;
            write_response(&mut stream, &err.to_response(), false).await?;
            return Err(err);
        }
    };

    let head_only = *request.method() == Method::HEAD;
    let method = request.method().clone();
    let path = request.uri().path().to_owned();

    let response = routes::handle(state, request, client_ip(peer)).await;
    tracing::info!("{peer} {method} {path} -> {}", response.status().as_u16());

    write_response(&mut stream, &response, head_only).await?;
    Ok(())
}

/// IPv4-mapped IPv6 peers count as their IPv4 address.
fn client_ip(peer: SocketAddr) -> IpAddr {
    match peer.ip() {
        IpAddr::V6(v6) => v6.to_ipv4_mapped().map_or(IpAddr::V6(v6), IpAddr::V4),
        ip => ip,
    }
}

/// URLs other devices on the local network can use to reach `port`.
///
/// Finds the outbound interface by connecting a UDP socket (no packets are
/// sent). Empty when there is no route or the address is loopback.
pub fn lan_urls(port: u16) -> Vec<String> {
    let Ok(socket) = std::net::UdpSocket::bind("0.0.0.0:0") else {
        return Vec::new();
    };
    if socket.connect("192.0.2.1:80").is_err() {
        return Vec::new();
    }
    match socket.local_addr().map(|addr| addr.ip()) {
        Ok(ip) if !ip.is_loopback() && !ip.is_unspecified() => {
            vec![format!("http://{ip}:{port}")]
        }
        _ => Vec::new(),
    }
}
