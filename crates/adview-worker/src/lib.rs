//! Classification worker
//!
//! [`ClassificationWorker::handle`] runs one job: set up the parser, read the
//! file, delegate, validate the category. [`ClassificationWorker::spawn`] puts
//! the worker behind a mailbox so callers only talk to it by message.

pub mod mailbox;
pub mod worker;

pub use mailbox::{SpawnedWorker, WorkerHandle};
pub use worker::ClassificationWorker;
