//! Tracing initialization
//!
//! Logs always go to stderr: stdout carries the result stream.

mod init_basic;

pub use init_basic::{init_telemetry, shutdown_telemetry, LogFormat};
