//! Fixed, compile-time pipeline configuration.
//!
//! The spec treats configuration/CLI parsing as explicitly out of scope
//! (spec.md §1, §6): ports, queue capacities, worker count, window duration,
//! Bloom filter size and hash count, and the alert output path are all
//! compiled-in constants. `PipelineConfig` bundles them into one struct with
//! a `Default` impl so tests can override individual fields (e.g. a short
//! window, or a tempdir output path) without touching the process
//! environment.

use std::time::Duration;

/// HTTP ingestor port.
pub const HTTP_PORT: u16 = 8080;
/// TCP ingestor port.
pub const TCP_PORT: u16 = 8081;

/// Q1 capacity: Ingestor -> Parser.
pub const RAW_QUEUE_CAPACITY: usize = 1000;
/// Q2 capacity: Parser -> Analyzer.
pub const PARSED_QUEUE_CAPACITY: usize = 1000;
/// Q3 capacity: Analyzer -> Alerter.
pub const ALERT_QUEUE_CAPACITY: usize = 100;

/// Number of parser worker tasks.
pub const PARSER_WORKERS: usize = 4;

/// Window-counter reset interval.
pub const WINDOW_DURATION: Duration = Duration::from_secs(60);

/// Bloom filter bit-array size.
pub const BLOOM_SIZE_BITS: usize = 100_000;
/// Number of FNV-1a hash rounds used per Bloom filter operation.
pub const BLOOM_HASH_COUNT: u8 = 3;

/// Default path for the append-only alert sink.
pub const ALERT_OUTPUT_PATH: &str = "alerts.jsonl";

#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub http_port: u16,
    pub tcp_port: u16,
    pub raw_queue_capacity: usize,
    pub parsed_queue_capacity: usize,
    pub alert_queue_capacity: usize,
    pub parser_workers: usize,
    pub window_duration: Duration,
    pub bloom_size_bits: usize,
    pub bloom_hash_count: u8,
    pub alert_output_path: String,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            http_port: HTTP_PORT,
            tcp_port: TCP_PORT,
            raw_queue_capacity: RAW_QUEUE_CAPACITY,
            parsed_queue_capacity: PARSED_QUEUE_CAPACITY,
            alert_queue_capacity: ALERT_QUEUE_CAPACITY,
            parser_workers: PARSER_WORKERS,
            window_duration: WINDOW_DURATION,
            bloom_size_bits: BLOOM_SIZE_BITS,
            bloom_hash_count: BLOOM_HASH_COUNT,
            alert_output_path: ALERT_OUTPUT_PATH.to_string(),
        }
    }
}
