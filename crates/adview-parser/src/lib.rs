//! Adview Parser Library
//!
//! The banner parser is an external collaborator: it owns format detection
//! and content parsing, and the worker only ever sees it through the
//! [`BannerParser`] trait. This crate provides that trait and two backends:
//!
//! - [`HttpBannerParser`]: a remote parse service
//! - [`CommandBannerParser`]: a local executable fed through stdin/stdout

mod factory;
mod traits;

#[cfg(feature = "parser-command")]
mod command;
#[cfg(feature = "parser-http")]
mod http;

pub use factory::create_parser;
pub use traits::{BannerParser, ParsedBanner};

#[cfg(feature = "parser-command")]
pub use command::CommandBannerParser;
#[cfg(feature = "parser-http")]
pub use http::HttpBannerParser;

// Re-export from adview-core for convenience
pub use adview_core::{ParserBackend, ParserError};
