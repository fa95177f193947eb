//! File handles carried by job requests.
//!
//! A handle refers to content the caller owns: a path on disk, a buffer
//! already in memory, or any async byte stream. The worker drains it exactly
//! once with [`FileHandle::read_all`].

use bytes::Bytes;
use std::fmt::{Debug, Formatter, Result as FmtResult};
use std::path::PathBuf;
use std::pin::Pin;
use tokio::io::{AsyncRead, AsyncReadExt};

use crate::error::WorkerError;

pub enum FileSource {
    Path(PathBuf),
    Memory(Bytes),
    Reader(Pin<Box<dyn AsyncRead + Send>>),
}

impl Debug for FileSource {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            FileSource::Path(path) => f.debug_tuple("Path").field(path).finish(),
            FileSource::Memory(bytes) => f.debug_tuple("Memory").field(&bytes.len()).finish(),
            FileSource::Reader(_) => f.write_str("Reader(..)"),
        }
    }
}

#[derive(Debug)]
pub struct FileHandle {
    /// Display name used in logs and errors
    pub name: String,
    pub source: FileSource,
}

impl FileHandle {
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        Self {
            name: path.display().to_string(),
            source: FileSource::Path(path),
        }
    }

    pub fn from_bytes(name: impl Into<String>, bytes: impl Into<Bytes>) -> Self {
        Self {
            name: name.into(),
            source: FileSource::Memory(bytes.into()),
        }
    }

    pub fn from_reader<R>(name: impl Into<String>, reader: R) -> Self
    where
        R: AsyncRead + Send + 'static,
    {
        Self {
            name: name.into(),
            source: FileSource::Reader(Box::pin(reader)),
        }
    }

    /// Read the entire content into memory.
    ///
    /// Any read failure aborts with [`WorkerError::Io`]; partially read data
    /// is discarded.
    pub async fn read_all(self) -> Result<Bytes, WorkerError> {
        let FileHandle { name, source } = self;

        let read = match source {
            FileSource::Memory(bytes) => return Ok(bytes),
            FileSource::Path(path) => tokio::fs::read(&path).await,
            FileSource::Reader(mut reader) => {
                let mut buf = Vec::new();
                reader.read_to_end(&mut buf).await.map(|_| buf)
            }
        };

        match read {
            Ok(buf) => {
                tracing::trace!(file = %name, bytes = buf.len(), "File read into memory");
                Ok(Bytes::from(buf))
            }
            Err(source) => Err(WorkerError::Io { name, source }),
        }
    }
}
