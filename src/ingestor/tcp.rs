//! TCP ingestion surface: newline-delimited JSON `RawLog`, one per line, no
//! framing handshake and no response (`spec.md` §6). Malformed lines are
//! logged and skipped; the connection is kept open.

use crate::domain::RawLog;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Accept connections until `shutdown` is cancelled, spawning one task per
/// connection into a `JoinSet`. Once the listener stops accepting, every
/// in-flight connection task is awaited before this function returns, so a
/// caller that joins `accept_loop`'s own handle has also joined every
/// connection it ever spawned.
pub async fn accept_loop(
    listener: TcpListener,
    raw_tx: mpsc::Sender<RawLog>,
    shutdown: CancellationToken,
) {
    let mut connections = JoinSet::new();

    loop {
        tokio::select! {
            accepted = listener.accept() => {
                match accepted {
                    Ok((stream, addr)) => {
                        info!(%addr, "TCP connection accepted");
                        let raw_tx = raw_tx.clone();
                        let conn_shutdown = shutdown.clone();
                        connections.spawn(handle_connection(stream, raw_tx, conn_shutdown));
                    }
                    Err(e) => warn!("TCP accept error: {e}"),
                }
            }
            () = shutdown.cancelled() => {
                info!("TCP listener shutting down, no longer accepting");
                break;
            }
        }
    }

    while let Some(result) = connections.join_next().await {
        if let Err(e) = result {
            tracing::error!("TCP connection task panicked: {e}");
        }
    }
    info!("all in-flight TCP connections ended");
}

async fn handle_connection(
    stream: TcpStream,
    raw_tx: mpsc::Sender<RawLog>,
    shutdown: CancellationToken,
) {
    let mut lines = BufReader::new(stream).lines();

    loop {
        let line = tokio::select! {
            line = lines.next_line() => line,
            () = shutdown.cancelled() => break,
        };

        let line = match line {
            Ok(Some(line)) => line,
            Ok(None) => break, // peer closed
            Err(e) => {
                warn!("TCP read error: {e}");
                break;
            }
        };

        if line.trim().is_empty() {
            continue;
        }

        let raw: RawLog = match serde_json::from_str(&line) {
            Ok(raw) => raw,
            Err(e) => {
                warn!("failed to decode RawLog from TCP line: {e}");
                continue;
            }
        };

        tokio::select! {
            res = raw_tx.send(raw) => {
                if res.is_err() {
                    break;
                }
            }
            () = shutdown.cancelled() => break,
        }
    }
}
