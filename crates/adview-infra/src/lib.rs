//! Adview Infrastructure Library
//!
//! Shared infrastructure for the adview binaries:
//! - Telemetry initialization (tracing subscriber on stderr)

#[cfg(feature = "observability-basic")]
pub mod telemetry;

#[cfg(feature = "observability-basic")]
pub use telemetry::{init_telemetry, shutdown_telemetry, LogFormat};
