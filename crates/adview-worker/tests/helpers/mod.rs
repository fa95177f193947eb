#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use adview_core::{FileHandle, JobRequest, ParserError};
use adview_parser::{BannerParser, ParsedBanner};
use adview_worker::ClassificationWorker;
use async_trait::async_trait;
use bytes::Bytes;

/// In-process stand-in for the external parser.
#[derive(Debug, Default)]
pub struct StubParser {
    mode: String,
    url: String,
    /// Use the file content as the result url, to check request/result pairing
    url_from_content: bool,
    fail_setup: bool,
    fail_parse: bool,
    /// Content prefix that makes a parse take longer
    slow_prefix: Option<(Vec<u8>, Duration)>,
    parse_delay: Duration,
    pub setup_calls: AtomicUsize,
    pub parse_calls: AtomicUsize,
    in_flight: AtomicUsize,
    pub peak_in_flight: AtomicUsize,
}

impl StubParser {
    pub fn returning(mode: &str, url: &str) -> Self {
        Self {
            mode: mode.to_string(),
            url: url.to_string(),
            ..Self::default()
        }
    }

    pub fn echoing(mode: &str) -> Self {
        Self {
            mode: mode.to_string(),
            url_from_content: true,
            ..Self::default()
        }
    }

    pub fn failing_setup(mut self) -> Self {
        self.fail_setup = true;
        self
    }

    pub fn failing_parse(mut self) -> Self {
        self.fail_parse = true;
        self
    }

    pub fn slow_for(mut self, prefix: &[u8], delay: Duration) -> Self {
        self.slow_prefix = Some((prefix.to_vec(), delay));
        self
    }

    pub fn with_parse_delay(mut self, delay: Duration) -> Self {
        self.parse_delay = delay;
        self
    }

    pub fn setups(&self) -> usize {
        self.setup_calls.load(Ordering::SeqCst)
    }

    pub fn parses(&self) -> usize {
        self.parse_calls.load(Ordering::SeqCst)
    }

    pub fn peak(&self) -> usize {
        self.peak_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl BannerParser for StubParser {
    fn name(&self) -> &str {
        "stub"
    }

    async fn setup(&self) -> Result<(), ParserError> {
        self.setup_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_setup {
            return Err(ParserError::Transport("stub runtime unavailable".to_string()));
        }
        Ok(())
    }

    async fn parse(&self, bytes: Bytes) -> Result<ParsedBanner, ParserError> {
        self.parse_calls.fetch_add(1, Ordering::SeqCst);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_in_flight.fetch_max(now, Ordering::SeqCst);

        let mut delay = self.parse_delay;
        if let Some((prefix, slow)) = &self.slow_prefix {
            if bytes.starts_with(prefix) {
                delay = *slow;
            }
        }
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        if self.fail_parse {
            return Err(ParserError::Status {
                status: 422,
                body: "unsupported archive".to_string(),
            });
        }

        let url = if self.url_from_content {
            String::from_utf8_lossy(&bytes).into_owned()
        } else {
            self.url.clone()
        };

        Ok(ParsedBanner {
            mode: self.mode.clone(),
            url,
        })
    }
}

pub fn worker_with(parser: Arc<StubParser>) -> ClassificationWorker {
    ClassificationWorker::new(parser)
}

/// Request whose file content is its own id
pub fn echo_request(id: &str) -> JobRequest {
    JobRequest::new(id, FileHandle::from_bytes(format!("{}.zip", id), id.as_bytes().to_vec()))
}

pub fn failing_read_request(id: &str) -> JobRequest {
    let reader = tokio_test::io::Builder::new()
        .read_error(std::io::Error::new(
            std::io::ErrorKind::PermissionDenied,
            "permission denied",
        ))
        .build();
    JobRequest::new(id, FileHandle::from_reader(id, reader))
}
