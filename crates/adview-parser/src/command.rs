//! Local executable backend
//!
//! Each parse spawns the configured program, writes the file to its stdin
//! and reads a single JSON object `{ "mode": "...", "url": "..." }` from its
//! stdout.

use adview_core::ParserError;
use async_trait::async_trait;
use bytes::Bytes;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tokio::sync::OnceCell;

use crate::traits::{BannerParser, ParsedBanner};

/// Longest stderr excerpt kept in a [`ParserError::Process`]
const MAX_STDERR: usize = 512;

#[derive(Debug)]
pub struct CommandBannerParser {
    program: PathBuf,
    args: Vec<String>,
    checked: OnceCell<()>,
}

impl CommandBannerParser {
    pub fn new(program: impl Into<PathBuf>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
            checked: OnceCell::new(),
        }
    }

    /// Bare program names are resolved through PATH at spawn time; explicit
    /// paths must point at an existing file.
    async fn check_program(&self) -> Result<(), ParserError> {
        if self.program.components().count() <= 1 && !self.program.is_absolute() {
            return Ok(());
        }

        let metadata = tokio::fs::metadata(&self.program).await.map_err(|e| {
            ParserError::Config(format!(
                "Parser executable {} is not accessible: {}",
                self.program.display(),
                e
            ))
        })?;

        if !metadata.is_file() {
            return Err(ParserError::Config(format!(
                "Parser executable {} is not a file",
                self.program.display()
            )));
        }

        Ok(())
    }

    pub fn program(&self) -> &Path {
        &self.program
    }
}

fn excerpt(raw: &[u8]) -> String {
    let text = String::from_utf8_lossy(raw);
    let text = text.trim();
    match text.char_indices().nth(MAX_STDERR) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}

#[async_trait]
impl BannerParser for CommandBannerParser {
    fn name(&self) -> &str {
        "command"
    }

    async fn setup(&self) -> Result<(), ParserError> {
        self.checked
            .get_or_try_init(|| self.check_program())
            .await
            .map(|_| ())
    }

    async fn parse(&self, bytes: Bytes) -> Result<ParsedBanner, ParserError> {
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                ParserError::Process(format!(
                    "Failed to spawn {}: {}",
                    self.program.display(),
                    e
                ))
            })?;

        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| ParserError::Process("Parser stdin was not captured".to_string()))?;

        // stdin is fed from its own task while wait_with_output drains stdout.
        let writer = tokio::spawn(async move {
            stdin.write_all(&bytes).await?;
            stdin.shutdown().await
        });

        let output = child.wait_with_output().await?;

        match writer.await {
            Ok(Ok(())) => {}
            // The parser may stop reading once it has decided.
            Ok(Err(e)) if e.kind() == std::io::ErrorKind::BrokenPipe => {}
            Ok(Err(e)) => return Err(ParserError::Io(e)),
            Err(e) => return Err(ParserError::Process(format!("stdin writer failed: {}", e))),
        }

        if !output.status.success() {
            return Err(ParserError::Process(format!(
                "{} exited with {}: {}",
                self.program.display(),
                output.status,
                excerpt(&output.stderr)
            )));
        }

        let parsed: ParsedBanner = serde_json::from_slice(&output.stdout).map_err(|e| {
            ParserError::InvalidResponse(format!(
                "{} (stdout: {})",
                e,
                excerpt(&output.stdout)
            ))
        })?;

        tracing::debug!(program = %self.program.display(), mode = %parsed.mode, "Parser process answered");
        Ok(parsed)
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    fn shell(script: &str) -> CommandBannerParser {
        CommandBannerParser::new("sh", vec!["-c".to_string(), script.to_string()])
    }

    #[tokio::test]
    async fn test_parse_reads_stdout_json() {
        let parser = shell(r#"cat > /dev/null; echo '{"mode":"gwd","url":"http://example/g"}'"#);
        parser.setup().await.unwrap();

        let parsed = parser.parse(Bytes::from_static(b"PK\x03\x04")).await.unwrap();
        assert_eq!(parsed.mode, "gwd");
        assert_eq!(parsed.url, "http://example/g");
    }

    #[tokio::test]
    async fn test_parse_feeds_whole_file_on_stdin() {
        let parser = shell(
            r#"n=$(wc -c | tr -d ' '); printf '{"mode":"other","url":"bytes:%s"}' "$n""#,
        );

        let payload = Bytes::from(vec![7u8; 200_000]);
        let parsed = parser.parse(payload).await.unwrap();
        assert_eq!(parsed.url, "bytes:200000");
    }

    #[tokio::test]
    async fn test_non_zero_exit_is_process_error() {
        let parser = shell("cat > /dev/null; echo 'unsupported archive' >&2; exit 3");

        let err = parser.parse(Bytes::from_static(b"x")).await.unwrap_err();
        match err {
            ParserError::Process(msg) => assert!(msg.contains("unsupported archive")),
            other => panic!("expected process error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_garbage_stdout_is_invalid_response() {
        let parser = shell("cat > /dev/null; echo not-json");

        let err = parser.parse(Bytes::from_static(b"x")).await.unwrap_err();
        assert!(matches!(err, ParserError::InvalidResponse(ref m) if m.contains("not-json")));
    }

    #[tokio::test]
    async fn test_parser_ignoring_stdin_still_answers() {
        let parser = shell(r#"echo '{"mode":"adobe","url":"u"}'"#);

        let parsed = parser.parse(Bytes::from(vec![0u8; 1 << 20])).await.unwrap();
        assert_eq!(parsed.mode, "adobe");
    }

    #[tokio::test]
    async fn test_setup_rejects_missing_executable() {
        let parser = CommandBannerParser::new("/nonexistent/adview-parse", Vec::new());
        let err = parser.setup().await.unwrap_err();
        assert!(matches!(err, ParserError::Config(_)));
    }

    #[tokio::test]
    async fn test_spawn_failure_is_process_error() {
        let parser = CommandBannerParser::new("adview-definitely-not-installed", Vec::new());
        parser.setup().await.unwrap();
        let err = parser.parse(Bytes::from_static(b"x")).await.unwrap_err();
        assert!(matches!(err, ParserError::Process(_)));
    }

    #[test]
    fn test_excerpt_truncates() {
        let long = vec![b'a'; MAX_STDERR * 2];
        let cut = excerpt(&long);
        assert_eq!(cut.len(), MAX_STDERR + 3);
        assert!(cut.ends_with("..."));
        assert_eq!(excerpt(b"  short \n"), "short");
    }
}
