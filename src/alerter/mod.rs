//! Alerter stage: the sole consumer of Q3. Serializes each Alert to
//! indented JSON and writes it to both stdout (human-readable banner + JSON
//! + separator) and the configured alert file (JSON + newline, a JSON
//! sequence rather than a JSON array, so it can be streamed) (`spec.md`
//! §4.5, §6).

use crate::domain::Alert;
use crate::error::PipelineError;
use std::os::unix::fs::OpenOptionsExt;
use tokio::fs::File;
use tokio::io::{self, AsyncWriteExt};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

const FILE_MODE: u32 = 0o644;

pub struct Alerter {
    handle: JoinHandle<()>,
    shutdown: CancellationToken,
}

impl Alerter {
    /// Open `path` for append (creating it with mode 0644 if absent) and
    /// spawn the consumer loop. Fails with `PipelineError::FileOpen` if the
    /// file cannot be opened.
    pub async fn start(
        path: &str,
        alert_rx: mpsc::Receiver<Alert>,
        shutdown: CancellationToken,
    ) -> Result<Self, PipelineError> {
        let file = tokio::fs::OpenOptions::new()
            .append(true)
            .create(true)
            .mode(FILE_MODE)
            .open(path)
            .await
            .map_err(|source| PipelineError::FileOpen {
                path: path.to_string(),
                source,
            })?;

        let consume_shutdown = shutdown.clone();
        let handle = tokio::spawn(consume_loop(alert_rx, file, consume_shutdown));

        Ok(Self { handle, shutdown })
    }

    /// Stop accepting new work; the consumer loop drains whatever is left
    /// on Q3 before returning, then the file is closed.
    pub async fn stop(self) {
        self.shutdown.cancel();
        let _ = self.handle.await;
        info!("Alerter stopped");
    }
}

async fn consume_loop(mut alert_rx: mpsc::Receiver<Alert>, mut file: File, _shutdown: CancellationToken) {
    let mut stdout = io::stdout();

    while let Some(alert) = alert_rx.recv().await {
        write_alert(&alert, &mut file, &mut stdout).await;
    }

    info!("Alerter drained Q3, closing output file");
}

async fn write_alert(alert: &Alert, file: &mut File, stdout: &mut io::Stdout) {
    let json = match serde_json::to_string_pretty(alert) {
        Ok(json) => json,
        Err(e) => {
            error!("failed to serialize alert: {e}");
            return;
        }
    };

    let banner = format!(
        "ALERT: {} (Severity: {})\n",
        alert.reason,
        alert.severity.as_str()
    );

    if let Err(e) = stdout.write_all(banner.as_bytes()).await {
        error!("failed to write alert banner to stdout: {e}");
    }
    if let Err(e) = stdout.write_all(json.as_bytes()).await {
        error!("failed to write alert JSON to stdout: {e}");
    }
    if let Err(e) = stdout.write_all(b"\n---\n").await {
        error!("failed to write alert separator to stdout: {e}");
    }

    if let Err(e) = file.write_all(json.as_bytes()).await {
        error!("failed to write alert to output file: {e}");
        return;
    }
    if let Err(e) = file.write_all(b"\n").await {
        error!("failed to write newline to output file: {e}");
    }
}
