use thiserror::Error;

/// Fatal startup failures that abort the process before the pipeline
/// begins processing. Everything else (decode errors, backpressure,
/// serialization failures, alert-file I/O) is handled inline at the point
/// of occurrence per the spec's "no cross-component retries" rule and never
/// reaches `main`.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("failed to bind {address}: {source}")]
    Bind {
        address: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to open alert output file {path}: {source}")]
    FileOpen {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("server error: {0}")]
    Server(#[from] std::io::Error),
}
