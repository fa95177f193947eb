use adview_core::{ParserBackend, ParserError, WorkerConfig};
use std::sync::Arc;

#[cfg(feature = "parser-command")]
use crate::CommandBannerParser;
#[cfg(feature = "parser-http")]
use crate::HttpBannerParser;
use crate::BannerParser;

/// Create a parser backend based on configuration
pub fn create_parser(config: &WorkerConfig) -> Result<Arc<dyn BannerParser>, ParserError> {
    match config.parser_backend {
        #[cfg(feature = "parser-http")]
        ParserBackend::Http => {
            let parser = HttpBannerParser::new(
                config.parser_url.clone(),
                std::time::Duration::from_secs(config.parser_timeout_secs),
            )?;
            Ok(Arc::new(parser))
        }

        #[cfg(not(feature = "parser-http"))]
        ParserBackend::Http => Err(ParserError::Config(
            "HTTP parser backend not available (parser-http feature not enabled)".to_string(),
        )),

        #[cfg(feature = "parser-command")]
        ParserBackend::Command => {
            let program = config.parser_command.clone().ok_or_else(|| {
                ParserError::Config("ADVIEW_PARSER_COMMAND not configured".to_string())
            })?;
            Ok(Arc::new(CommandBannerParser::new(
                program,
                config.parser_args.clone(),
            )))
        }

        #[cfg(not(feature = "parser-command"))]
        ParserBackend::Command => Err(ParserError::Config(
            "Command parser backend not available (parser-command feature not enabled)"
                .to_string(),
        )),
    }
}
