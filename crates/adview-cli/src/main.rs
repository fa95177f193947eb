//! adview: classify banner archives through the external parser.
//!
//! Parser and worker settings come from ADVIEW_* environment variables
//! (a `.env` file is honoured). Results go to stdout as JSON lines, logs to stderr.

use std::path::PathBuf;

use adview_cli::{init_tracing, Outstanding, ServeRequest};
use adview_core::{FileHandle, JobRequest, JobResult, WorkerConfig};
use adview_parser::create_parser;
use adview_worker::{ClassificationWorker, SpawnedWorker};
use anyhow::Context;
use clap::{Parser, Subcommand};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

#[derive(Parser)]
#[command(name = "adview", about = "Banner classification worker")]
struct Cli {
    /// Override ADVIEW_MAX_IN_FLIGHT (0 = unbounded)
    #[arg(long, global = true)]
    max_in_flight: Option<usize>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Classify the given files, one job per file (id = path)
    Classify {
        /// Banner files to classify
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
    /// Read {"id","path"} JSON lines from stdin and answer on stdout
    Serve,
}

fn result_line(result: &JobResult) -> anyhow::Result<String> {
    let mut line = serde_json::to_string(result).context("Serialize result")?;
    line.push('\n');
    Ok(line)
}

fn start_worker(config: &WorkerConfig) -> anyhow::Result<SpawnedWorker> {
    let parser = create_parser(config).context("Failed to create parser")?;
    Ok(ClassificationWorker::new(parser).spawn(config))
}

async fn classify(config: WorkerConfig, files: Vec<PathBuf>) -> anyhow::Result<()> {
    let SpawnedWorker {
        handle,
        mut results,
        task,
    } = start_worker(&config)?;

    let mut outstanding = Outstanding::new();
    let jobs: Vec<JobRequest> = files
        .into_iter()
        .map(|path| {
            let id = path.display().to_string();
            outstanding.posted(&id);
            JobRequest::new(id, FileHandle::from_path(path))
        })
        .collect();

    // Post from a separate task so a full inbox never blocks draining results.
    let poster = tokio::spawn(async move {
        for job in jobs {
            let id = job.id.clone();
            if let Err(e) = handle.post(job).await {
                tracing::error!(job.id = %id, error = %e, "Failed to post job");
                break;
            }
        }
    });

    let mut stdout = tokio::io::stdout();
    while let Some(result) = results.recv().await {
        outstanding.answered(&result.id);
        stdout.write_all(result_line(&result)?.as_bytes()).await?;
        stdout.flush().await?;
    }

    poster.await.context("Job poster panicked")?;
    task.await.context("Worker loop panicked")?;

    if !outstanding.is_empty() {
        let missing = outstanding.missing();
        for id in &missing {
            eprintln!("no result: {}", id);
        }
        anyhow::bail!("{} job(s) produced no result", missing.len());
    }
    Ok(())
}

async fn serve(config: WorkerConfig) -> anyhow::Result<()> {
    let SpawnedWorker {
        handle,
        mut results,
        task,
    } = start_worker(&config)?;

    let writer = tokio::spawn(async move {
        let mut stdout = tokio::io::stdout();
        while let Some(result) = results.recv().await {
            stdout.write_all(result_line(&result)?.as_bytes()).await?;
            stdout.flush().await?;
        }
        Ok::<_, anyhow::Error>(())
    });

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut line_no = 0usize;
    while let Some(line) = lines.next_line().await.context("Failed to read stdin")? {
        line_no += 1;
        let request = match ServeRequest::parse_line(&line) {
            Ok(Some(request)) => request,
            Ok(None) => continue,
            Err(e) => {
                tracing::warn!(line = line_no, error = %e, "Skipping malformed request line");
                continue;
            }
        };
        handle
            .post(request.into_job())
            .await
            .context("Worker stopped accepting jobs")?;
    }

    tracing::info!(lines = line_no, "Input closed, waiting for in-flight jobs");
    drop(handle);
    task.await.context("Worker loop panicked")?;
    writer.await.context("Result writer panicked")??;
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = WorkerConfig::from_env().context("Failed to load configuration")?;
    if let Some(max_in_flight) = cli.max_in_flight {
        config.max_in_flight = max_in_flight;
    }
    config.validate().context("Invalid configuration")?;

    init_tracing(&config)?;
    tracing::debug!(
        backend = %config.parser_backend,
        environment = %config.environment,
        "Configuration loaded"
    );

    let outcome = match cli.command {
        Commands::Classify { files } => classify(config, files).await,
        Commands::Serve => serve(config).await,
    };

    adview_infra::shutdown_telemetry().await;
    outcome
}
