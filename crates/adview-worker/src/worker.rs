use std::sync::Arc;

use adview_core::{
    BannerType, ErrorMetadata, FileHandle, JobPhase, JobRequest, JobResult, LogLevel,
    WorkerError,
};
use adview_parser::BannerParser;

/// Stateless classification unit.
///
/// Holds nothing across invocations except the injected parser, so clones can
/// run any number of jobs concurrently.
#[derive(Clone, Debug)]
pub struct ClassificationWorker {
    parser: Arc<dyn BannerParser>,
}

impl ClassificationWorker {
    pub fn new(parser: Arc<dyn BannerParser>) -> Self {
        Self { parser }
    }

    pub fn parser(&self) -> &Arc<dyn BannerParser> {
        &self.parser
    }

    /// Classify one job.
    ///
    /// Returns the result only when setup, read and parse all succeed and the
    /// parser's label is a known [`BannerType`]. Nothing is retried.
    #[tracing::instrument(
        name = "classify",
        skip(self, request),
        fields(job.id = %request.id, file = %request.file.name, parser = %self.parser.name())
    )]
    pub async fn handle(&self, request: JobRequest) -> Result<JobResult, WorkerError> {
        let JobRequest { id, file } = request;

        match self.run(&id, file).await {
            Ok(result) => {
                tracing::info!(
                    phase = %JobPhase::Done,
                    banner_type = %result.banner_type,
                    url = %result.url,
                    "Classification complete"
                );
                Ok(result)
            }
            Err(err) => {
                log_failure(&err);
                Err(err)
            }
        }
    }

    async fn run(&self, id: &str, file: FileHandle) -> Result<JobResult, WorkerError> {
        tracing::debug!(phase = %JobPhase::Initializing, "Setting up parser");
        self.parser.setup().await.map_err(WorkerError::Setup)?;

        tracing::debug!(phase = %JobPhase::Reading, "Reading file");
        let bytes = file.read_all().await?;

        tracing::debug!(phase = %JobPhase::Delegating, bytes = bytes.len(), "Delegating to parser");
        let parsed = self.parser.parse(bytes).await.map_err(WorkerError::Parse)?;

        let banner_type: BannerType = parsed.mode.parse()?;

        Ok(JobResult {
            id: id.to_string(),
            banner_type,
            url: parsed.url,
        })
    }
}

fn log_failure(err: &WorkerError) {
    let code = err.error_code();
    let recoverable = err.is_recoverable();
    match err.log_level() {
        LogLevel::Debug => tracing::debug!(
            phase = %JobPhase::Failed,
            error = %err,
            error_code = code,
            recoverable,
            "Classification failed"
        ),
        LogLevel::Warn => tracing::warn!(
            phase = %JobPhase::Failed,
            error = %err,
            error_code = code,
            recoverable,
            "Classification failed"
        ),
        LogLevel::Error => tracing::error!(
            phase = %JobPhase::Failed,
            error = %err,
            error_code = code,
            recoverable,
            "Classification failed"
        ),
    }
}
