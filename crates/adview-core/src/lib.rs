//! Adview Core Library
//!
//! This crate provides the job models, error types and configuration that are
//! shared by the parser backends, the classification worker and the CLI.

pub mod config;
pub mod error;
pub mod models;
pub mod parser_types;

// Re-export commonly used types
pub use config::WorkerConfig;
pub use error::{ErrorMetadata, LogLevel, ParserError, WorkerError};
pub use models::{BannerType, FileHandle, FileSource, JobPhase, JobRequest, JobResult};
pub use parser_types::ParserBackend;
