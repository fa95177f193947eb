//! Parser abstraction trait

use adview_core::ParserError;
use async_trait::async_trait;
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;

/// Raw answer of the external parser.
///
/// `mode` is the parser's own category label and is not trusted: the worker
/// validates it against the closed banner category set.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ParsedBanner {
    pub mode: String,
    pub url: String,
}

/// Trait that every parser backend must implement
#[async_trait]
pub trait BannerParser: Send + Sync + Debug {
    /// Backend name, used in logs
    fn name(&self) -> &str;

    /// Prepare the backend. Called before every parse; must be idempotent.
    async fn setup(&self) -> Result<(), ParserError>;

    /// Classify a complete file
    async fn parse(&self, bytes: Bytes) -> Result<ParsedBanner, ParserError>;
}
