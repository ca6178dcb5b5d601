//! Parser stage: a fixed pool of workers drains Q1 (`RawLog`), derives the
//! IP / error-code / keyword fields, and enqueues `ParsedLog` onto Q2.
//!
//! Workers share one `Receiver` behind a `tokio::sync::Mutex` so that any
//! worker can pick up the next queued item (fan-out over a single bounded
//! channel); this may reorder records across or within a source once more
//! than one worker is active, which the spec explicitly allows
//! (`spec.md` §5).

mod extract;

use crate::domain::{ParsedLog, RawLog};
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::info;

pub use extract::{extract_error_code, extract_ip, extract_keywords};

/// Derive a `ParsedLog` from a `RawLog`. Purely functional: touches no
/// shared state, so callers need no synchronization around it.
#[must_use]
pub fn parse(raw: RawLog) -> ParsedLog {
    let ip = extract_ip(&raw.message);
    let error_code = extract_error_code(&raw.message);
    let keywords = extract_keywords(&raw.message);
    ParsedLog::from_raw(raw, ip, error_code, keywords)
}

/// Spawn `workers` parser tasks. Each drains Q1 until it is closed and
/// empty, then exits; an in-flight send to Q2 races the shutdown signal so
/// it yields promptly instead of blocking shutdown.
pub fn spawn(
    workers: usize,
    raw_rx: mpsc::Receiver<RawLog>,
    parsed_tx: mpsc::Sender<ParsedLog>,
    shutdown: CancellationToken,
) -> Vec<JoinHandle<()>> {
    let raw_rx = Arc::new(Mutex::new(raw_rx));
    (0..workers)
        .map(|id| {
            let raw_rx = raw_rx.clone();
            let parsed_tx = parsed_tx.clone();
            let shutdown = shutdown.clone();
            tokio::spawn(worker_loop(id, raw_rx, parsed_tx, shutdown))
        })
        .collect()
}

async fn worker_loop(
    id: usize,
    raw_rx: Arc<Mutex<mpsc::Receiver<RawLog>>>,
    parsed_tx: mpsc::Sender<ParsedLog>,
    shutdown: CancellationToken,
) {
    loop {
        let raw = {
            let mut rx = raw_rx.lock().await;
            rx.recv().await
        };
        let Some(raw) = raw else {
            break;
        };

        let parsed = parse(raw);
        tokio::select! {
            res = parsed_tx.send(parsed) => {
                if res.is_err() {
                    break;
                }
            }
            () = shutdown.cancelled() => {
                break;
            }
        }
    }
    info!(worker = id, "parser worker exiting");
}
