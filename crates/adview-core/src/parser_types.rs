use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

/// Parser backend types
///
/// Selects which external module implementation the worker delegates to.
/// It's defined in core because it's used in configuration.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParserBackend {
    /// Remote parse service reached over HTTP
    #[default]
    Http,
    /// Local executable fed through stdin/stdout
    Command,
}

impl FromStr for ParserBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "http" => Ok(ParserBackend::Http),
            "command" | "cmd" => Ok(ParserBackend::Command),
            _ => Err(anyhow::anyhow!("Invalid parser backend: {}", s)),
        }
    }
}

impl Display for ParserBackend {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            ParserBackend::Http => write!(f, "http"),
            ParserBackend::Command => write!(f, "command"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_backends() {
        assert_eq!("http".parse::<ParserBackend>().unwrap(), ParserBackend::Http);
        assert_eq!(" HTTP ".parse::<ParserBackend>().unwrap(), ParserBackend::Http);
        assert_eq!(
            "command".parse::<ParserBackend>().unwrap(),
            ParserBackend::Command
        );
        assert_eq!("cmd".parse::<ParserBackend>().unwrap(), ParserBackend::Command);
    }

    #[test]
    fn rejects_unknown_backend() {
        let err = "wasm".parse::<ParserBackend>().unwrap_err();
        assert!(err.to_string().contains("Invalid parser backend: wasm"));
    }

    #[test]
    fn display_round_trips() {
        for backend in [ParserBackend::Http, ParserBackend::Command] {
            assert_eq!(backend.to_string().parse::<ParserBackend>().unwrap(), backend);
        }
    }
}
