#![deny(warnings)]
#![deny(rust_2018_idioms)]
#![deny(rust_2024_compatibility)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::doc_markdown)]

pub mod alerter;
pub mod analyzer;
pub mod bloom;
pub mod config;
pub mod domain;
pub mod error;
pub mod healthcheck;
pub mod ingestor;
pub mod parser;
pub mod pipeline;
pub mod window;

pub use healthcheck::{healthcheck, healthcheck_with_port};
