//! Wires the four stages together through the three bounded queues and
//! drives the authoritative shutdown sequence from `spec.md` §5:
//!
//! 1. Stop Ingestor (close listeners, cease accepting).
//! 2. Close Q1.
//! 3. Stop Parser workers (they drain Q1, then exit).
//! 4. Close Q2.
//! 5. Stop Analyzer (drains Q2, stops ticker, exits).
//! 6. Close Q3.
//! 7. Stop Alerter (drains Q3, closes file).
//!
//! Queues are owned by this module: each `Sender` is handed to exactly one
//! upstream stage and each `Receiver` to exactly one downstream stage, so a
//! queue closes automatically once every clone of its `Sender` is dropped —
//! which happens precisely when the owning stage's tasks have joined. There
//! is no separate "close the queue" step; it falls out of the join order.

use crate::alerter::Alerter;
use crate::analyzer::Analyzer;
use crate::config::PipelineConfig;
use crate::error::PipelineError;
use crate::ingestor::Ingestor;
use crate::parser;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::info;

pub struct Pipeline {
    ingestor: Ingestor,
    parser_handles: Vec<JoinHandle<()>>,
    analyzer: Analyzer,
    alerter: Alerter,
}

impl Pipeline {
    /// Create the three bounded queues and start all four stages. Fails
    /// with `PipelineError::Bind`/`FileOpen` if the ingestor's listeners or
    /// the alerter's output file cannot be opened; on failure no stage is
    /// left partially running.
    pub async fn start(
        config: &PipelineConfig,
        shutdown: CancellationToken,
    ) -> Result<Self, PipelineError> {
        let (raw_tx, raw_rx) = mpsc::channel(config.raw_queue_capacity);
        let (parsed_tx, parsed_rx) = mpsc::channel(config.parsed_queue_capacity);
        let (alert_tx, alert_rx) = mpsc::channel(config.alert_queue_capacity);

        let ingestor =
            Ingestor::start(config.http_port, config.tcp_port, raw_tx, shutdown.clone()).await?;

        let parser_handles = parser::spawn(config.parser_workers, raw_rx, parsed_tx, shutdown.clone());

        let analyzer = Analyzer::start(
            parsed_rx,
            alert_tx,
            config.window_duration,
            config.bloom_size_bits,
            config.bloom_hash_count,
            shutdown.clone(),
        );

        let alerter = Alerter::start(&config.alert_output_path, alert_rx, shutdown).await?;

        info!("pipeline started");
        Ok(Self {
            ingestor,
            parser_handles,
            analyzer,
            alerter,
        })
    }

    /// The port the HTTP ingestor actually bound to (useful when started
    /// with port 0, e.g. in tests).
    #[must_use]
    pub fn local_http_port(&self) -> u16 {
        self.ingestor.local_http_port()
    }

    /// The port the TCP ingestor actually bound to (useful when started
    /// with port 0, e.g. in tests).
    #[must_use]
    pub fn local_tcp_port(&self) -> u16 {
        self.ingestor.local_tcp_port()
    }

    /// Run the shutdown sequence documented above, in order.
    pub async fn shutdown(self) {
        info!("shutdown: stopping ingestor");
        self.ingestor.stop().await;

        info!("shutdown: stopping parser pool");
        for handle in self.parser_handles {
            if let Err(e) = handle.await {
                tracing::error!("parser worker task panicked: {e}");
            }
        }

        info!("shutdown: stopping analyzer");
        self.analyzer.stop().await;

        info!("shutdown: stopping alerter");
        self.alerter.stop().await;

        info!("shutdown complete");
    }
}
