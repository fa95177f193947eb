pub mod file;
pub mod job;

pub use file::{FileHandle, FileSource};
pub use job::{BannerType, JobPhase, JobRequest, JobResult};
