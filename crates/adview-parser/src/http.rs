//! HTTP parse service backend
//!
//! Protocol:
//! - `POST {base}/v1/initialize` once per parser instance
//! - `POST {base}/v1/parse` with the raw file as `application/octet-stream`,
//!   answered by `{ "mode": "...", "url": "..." }`

use adview_core::ParserError;
use async_trait::async_trait;
use bytes::Bytes;
use std::fmt::{Debug, Formatter, Result as FmtResult};
use std::time::Duration;
use tokio::sync::OnceCell;

use crate::traits::{BannerParser, ParsedBanner};

/// Longest error body kept in a [`ParserError::Status`]
const MAX_ERROR_BODY: usize = 512;

pub struct HttpBannerParser {
    http_client: reqwest::Client,
    base_url: String,
    initialized: OnceCell<()>,
}

impl Debug for HttpBannerParser {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("HttpBannerParser")
            .field("base_url", &self.base_url)
            .field("initialized", &self.initialized.initialized())
            .finish()
    }
}

impl HttpBannerParser {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, ParserError> {
        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| {
                ParserError::Config(format!("Failed to create HTTP client for parser: {}", e))
            })?;

        Ok(Self {
            http_client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            initialized: OnceCell::new(),
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, ParserError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let mut body = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());
        if body.len() > MAX_ERROR_BODY {
            let mut cut = MAX_ERROR_BODY;
            while !body.is_char_boundary(cut) {
                cut -= 1;
            }
            body.truncate(cut);
        }

        Err(ParserError::Status {
            status: status.as_u16(),
            body,
        })
    }

    async fn initialize(&self) -> Result<(), ParserError> {
        let response = self
            .http_client
            .post(self.endpoint("/v1/initialize"))
            .send()
            .await
            .map_err(|e| ParserError::Transport(e.to_string()))?;

        Self::check_status(response).await?;
        tracing::info!(base_url = %self.base_url, "Parse service initialized");
        Ok(())
    }
}

#[async_trait]
impl BannerParser for HttpBannerParser {
    fn name(&self) -> &str {
        "http"
    }

    async fn setup(&self) -> Result<(), ParserError> {
        self.initialized
            .get_or_try_init(|| self.initialize())
            .await
            .map(|_| ())
    }

    async fn parse(&self, bytes: Bytes) -> Result<ParsedBanner, ParserError> {
        let size = bytes.len();
        let response = self
            .http_client
            .post(self.endpoint("/v1/parse"))
            .header("Content-Type", "application/octet-stream")
            .body(bytes)
            .send()
            .await
            .map_err(|e| ParserError::Transport(e.to_string()))?;

        let response = Self::check_status(response).await?;

        let parsed: ParsedBanner = response
            .json()
            .await
            .map_err(|e| ParserError::InvalidResponse(e.to_string()))?;

        tracing::debug!(bytes = size, mode = %parsed.mode, "Parse service answered");
        Ok(parsed)
    }
}
