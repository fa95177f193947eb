//! Mailbox runtime: inbound jobs in, results out.
//!
//! Every accepted request runs in its own task, so nothing serializes jobs
//! and results leave in completion order. Failed jobs emit nothing; callers
//! detect a missing response themselves.
//!
//! Shutdown: the loop stops once every [`WorkerHandle`] is dropped. It then
//! waits for in-flight jobs and closes the results channel.

use std::sync::Arc;

use adview_core::{JobRequest, JobResult, WorkerConfig, WorkerError};
use tokio::sync::{mpsc, Semaphore};
use tokio::task::{JoinHandle, JoinSet};

use crate::worker::ClassificationWorker;

/// Sending side of the worker's mailbox.
#[derive(Clone, Debug)]
pub struct WorkerHandle {
    tx: mpsc::Sender<JobRequest>,
}

impl WorkerHandle {
    /// Post a job. Waits while the inbox is full.
    pub async fn post(&self, request: JobRequest) -> Result<(), WorkerError> {
        self.tx
            .send(request)
            .await
            .map_err(|_| WorkerError::WorkerClosed)
    }

    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

/// A running worker: its mailbox, its results and the loop task.
#[derive(Debug)]
pub struct SpawnedWorker {
    pub handle: WorkerHandle,
    pub results: mpsc::Receiver<JobResult>,
    pub task: JoinHandle<()>,
}

impl ClassificationWorker {
    /// Start the mailbox loop on the current tokio runtime.
    pub fn spawn(self, config: &WorkerConfig) -> SpawnedWorker {
        let (tx, inbox) = mpsc::channel(config.inbox_capacity);
        let (outbox, results) = mpsc::channel(config.outbox_capacity);

        let limit = (config.max_in_flight > 0)
            .then(|| Arc::new(Semaphore::new(config.max_in_flight)));
        let max_in_flight = config.max_in_flight;

        let task = tokio::spawn(async move {
            self.mailbox_loop(inbox, outbox, limit, max_in_flight).await;
        });

        SpawnedWorker {
            handle: WorkerHandle { tx },
            results,
            task,
        }
    }

    async fn mailbox_loop(
        self,
        mut inbox: mpsc::Receiver<JobRequest>,
        outbox: mpsc::Sender<JobResult>,
        limit: Option<Arc<Semaphore>>,
        max_in_flight: usize,
    ) {
        tracing::info!(
            parser = %self.parser().name(),
            max_in_flight,
            "Classification worker started"
        );

        let mut tasks = JoinSet::new();

        loop {
            tokio::select! {
                maybe_request = inbox.recv() => {
                    let Some(request) = maybe_request else { break };

                    // Waiting here applies backpressure to the inbox; it does not
                    // order jobs relative to each other.
                    let permit = match &limit {
                        Some(semaphore) => match semaphore.clone().acquire_owned().await {
                            Ok(permit) => Some(permit),
                            Err(_) => break,
                        },
                        None => None,
                    };

                    let worker = self.clone();
                    let outbox = outbox.clone();
                    tasks.spawn(async move {
                        let _permit = permit;
                        if let Ok(result) = worker.handle(request).await {
                            let id = result.id.clone();
                            if outbox.send(result).await.is_err() {
                                tracing::debug!(job.id = %id, "Result receiver dropped, discarding result");
                            }
                        }
                    });
                }
                Some(joined) = tasks.join_next(), if !tasks.is_empty() => {
                    log_join(joined);
                }
            }
        }

        tracing::debug!(in_flight = tasks.len(), "Inbox closed, draining in-flight jobs");
        while let Some(joined) = tasks.join_next().await {
            log_join(joined);
        }

        tracing::info!("Classification worker stopped");
    }
}

fn log_join(joined: Result<(), tokio::task::JoinError>) {
    if let Err(e) = joined {
        if e.is_panic() {
            tracing::error!(error = %e, "Classification job panicked");
        }
    }
}
