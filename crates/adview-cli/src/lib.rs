use std::collections::BTreeMap;
use std::path::PathBuf;

use adview_core::{FileHandle, JobRequest, WorkerConfig};
use serde::Deserialize;

/// One input line of `adview serve`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ServeRequest {
    pub id: String,
    pub path: PathBuf,
}

impl ServeRequest {
    /// Parse a JSON line. Blank lines yield `Ok(None)`.
    pub fn parse_line(line: &str) -> Result<Option<Self>, serde_json::Error> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(None);
        }
        serde_json::from_str(line).map(Some)
    }

    pub fn into_job(self) -> JobRequest {
        JobRequest::new(self.id, FileHandle::from_path(self.path))
    }
}

/// Ids posted to the worker and not yet answered.
///
/// Counts per id, so the same file classified twice needs two results.
#[derive(Debug, Default)]
pub struct Outstanding {
    pending: BTreeMap<String, usize>,
}

impl Outstanding {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn posted(&mut self, id: &str) {
        *self.pending.entry(id.to_string()).or_insert(0) += 1;
    }

    /// Returns false for an id that was never posted (or already answered).
    pub fn answered(&mut self, id: &str) -> bool {
        match self.pending.get_mut(id) {
            Some(count) => {
                *count -= 1;
                if *count == 0 {
                    self.pending.remove(id);
                }
                true
            }
            None => false,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Unanswered ids in sorted order, repeated per missing result.
    pub fn missing(&self) -> Vec<String> {
        self.pending
            .iter()
            .flat_map(|(id, count)| std::iter::repeat(id.clone()).take(*count))
            .collect()
    }
}

/// Initialize tracing for the CLI from the loaded configuration.
pub fn init_tracing(config: &WorkerConfig) -> anyhow::Result<()> {
    adview_infra::init_telemetry(
        "adview",
        &config.environment,
        adview_infra::LogFormat::from_json_flag(config.log_json),
    )
    .map_err(|e| anyhow::anyhow!("Failed to initialize tracing: {}", e))
}
