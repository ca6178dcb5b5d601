//! Ingestor stage: accepts `RawLog`s over HTTP and line-delimited TCP and
//! pushes them onto Q1 without loss under normal load (`spec.md` §4.1).

mod http;
mod tcp;

use crate::domain::RawLog;
use crate::error::PipelineError;
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::info;

/// Handle to the running Ingestor. `stop` initiates shutdown and waits for
/// both listeners (and their in-flight connections/requests) to finish.
pub struct Ingestor {
    http_handle: JoinHandle<()>,
    tcp_handle: JoinHandle<()>,
    shutdown: CancellationToken,
    http_port: u16,
    tcp_port: u16,
}

impl Ingestor {
    /// Bind the HTTP and TCP listeners and start accepting. Fails with
    /// `PipelineError::Bind` if either listener cannot be opened; on error,
    /// neither surface is left partially running.
    pub async fn start(
        http_port: u16,
        tcp_port: u16,
        raw_tx: mpsc::Sender<RawLog>,
        shutdown: CancellationToken,
    ) -> Result<Self, PipelineError> {
        let http_addr = format!("0.0.0.0:{http_port}");
        let http_listener =
            TcpListener::bind(&http_addr)
                .await
                .map_err(|source| PipelineError::Bind {
                    address: http_addr.clone(),
                    source,
                })?;
        let http_port = http_listener.local_addr().map(|a| a.port()).unwrap_or(http_port);
        info!("HTTP ingestor listening on {http_addr}");

        let tcp_addr = format!("0.0.0.0:{tcp_port}");
        let tcp_listener =
            TcpListener::bind(&tcp_addr)
                .await
                .map_err(|source| PipelineError::Bind {
                    address: tcp_addr.clone(),
                    source,
                })?;
        let tcp_port = tcp_listener.local_addr().map(|a| a.port()).unwrap_or(tcp_port);
        info!("TCP ingestor listening on {tcp_addr}");

        let router = http::router(raw_tx.clone(), shutdown.clone());
        let http_shutdown = shutdown.clone();
        let http_handle = tokio::spawn(async move {
            let result = axum::serve(http_listener, router)
                .with_graceful_shutdown(http_shutdown.cancelled_owned())
                .await;
            if let Err(e) = result {
                tracing::error!("HTTP ingestor server error: {e}");
            }
        });

        let tcp_shutdown = shutdown.clone();
        let tcp_handle = tokio::spawn(tcp::accept_loop(tcp_listener, raw_tx, tcp_shutdown));

        Ok(Self {
            http_handle,
            tcp_handle,
            shutdown,
            http_port,
            tcp_port,
        })
    }

    /// Initiate shutdown and wait for both listeners to fully stop.
    pub async fn stop(self) {
        self.shutdown.cancel();
        let _ = self.http_handle.await;
        let _ = self.tcp_handle.await;
        info!("Ingestor stopped");
    }

    /// The port the HTTP listener actually bound to (useful when started
    /// with port 0, e.g. in tests).
    #[must_use]
    pub fn local_http_port(&self) -> u16 {
        self.http_port
    }

    /// The port the TCP listener actually bound to (useful when started
    /// with port 0, e.g. in tests).
    #[must_use]
    pub fn local_tcp_port(&self) -> u16 {
        self.tcp_port
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpStream;

    #[tokio::test]
    async fn start_fails_with_bind_error_on_port_collision() {
        let occupied = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = occupied.local_addr().unwrap().port();

        let (tx, _rx) = mpsc::channel(8);
        let result = Ingestor::start(port, 0, tx, CancellationToken::new()).await;

        assert!(matches!(result, Err(PipelineError::Bind { .. })));
    }

    #[tokio::test]
    async fn stop_completes_after_cancelling_shutdown() {
        let (tx, _rx) = mpsc::channel(8);
        let ingestor = Ingestor::start(0, 0, tx, CancellationToken::new())
            .await
            .unwrap();
        ingestor.stop().await;
    }

    #[tokio::test]
    async fn stop_waits_for_in_flight_tcp_connections_to_end() {
        let (tx, _rx) = mpsc::channel(8);
        let ingestor = Ingestor::start(0, 0, tx, CancellationToken::new())
            .await
            .unwrap();

        let mut client = TcpStream::connect(("127.0.0.1", ingestor.local_tcp_port()))
            .await
            .unwrap();
        // No trailing newline and no close: the connection is still open and
        // the server's per-connection task is blocked mid-read when shutdown
        // fires.
        client.write_all(b"{\"timestamp\":\"t\"").await.unwrap();

        ingestor.stop().await;

        // `stop()` having returned means every connection task it spawned
        // has joined, so the server must have dropped its end of this
        // socket by now; the client should observe EOF rather than a
        // lingering half-open connection.
        let mut buf = [0u8; 1];
        let read = tokio::time::timeout(Duration::from_secs(1), client.read(&mut buf))
            .await
            .expect("client should observe EOF promptly after stop() returns")
            .unwrap();
        assert_eq!(read, 0, "server must have closed its end of the connection");
    }
}
