use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

use crate::error::WorkerError;
use crate::models::file::FileHandle;

/// Closed set of banner categories reported by the external parser.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum BannerType {
    /// Banner exported by Adobe Animate
    Adobe,
    /// Banner built with Google Web Designer
    Gwd,
    Other,
}

impl BannerType {
    pub const ALL: [BannerType; 3] = [BannerType::Adobe, BannerType::Gwd, BannerType::Other];

    pub fn as_str(&self) -> &'static str {
        match self {
            BannerType::Adobe => "adobe",
            BannerType::Gwd => "gwd",
            BannerType::Other => "other",
        }
    }
}

impl Display for BannerType {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}

/// Labels are matched exactly. Anything else is an unknown category and is
/// rejected rather than folded into [`BannerType::Other`].
impl FromStr for BannerType {
    type Err = WorkerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "adobe" => Ok(BannerType::Adobe),
            "gwd" => Ok(BannerType::Gwd),
            "other" => Ok(BannerType::Other),
            _ => Err(WorkerError::UnknownCategory {
                label: s.to_string(),
            }),
        }
    }
}

/// Inbound message: one classification request.
#[derive(Debug)]
pub struct JobRequest {
    /// Opaque correlation id, echoed back in the result
    pub id: String,
    pub file: FileHandle,
}

impl JobRequest {
    pub fn new(id: impl Into<String>, file: FileHandle) -> Self {
        Self {
            id: id.into(),
            file,
        }
    }
}

/// Outbound message: the classification of one request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct JobResult {
    pub id: String,
    #[serde(rename = "type")]
    pub banner_type: BannerType,
    pub url: String,
}

/// Lifecycle of a single handle invocation.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum JobPhase {
    Idle,
    Initializing,
    Reading,
    Delegating,
    Done,
    Failed,
}

impl JobPhase {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done | Self::Failed)
    }
}

impl Display for JobPhase {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            JobPhase::Idle => write!(f, "idle"),
            JobPhase::Initializing => write!(f, "initializing"),
            JobPhase::Reading => write!(f, "reading"),
            JobPhase::Delegating => write!(f, "delegating"),
            JobPhase::Done => write!(f, "done"),
            JobPhase::Failed => write!(f, "failed"),
        }
    }
}
