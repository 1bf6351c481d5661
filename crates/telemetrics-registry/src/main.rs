//! telemetrics agent
//!
//! - Settings: argv[1] or `telemetrics.yaml` (strict YAML)
//! - Input: stdin, one sample per line (`<namespace>/<id> <value> [dims...]`)
//! - Output: aggregates as JSON lines on stdout, every `flush_interval_ms`
//! - Final flush on EOF or Ctrl+C

use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::watch;
use tracing_subscriber::{fmt, EnvFilter};

use telemetrics_core::error::{Result, TelemetryError};
use telemetrics_registry::{config, flush, ingest::LineIngestor, JsonLinesChannel, TelemetryClient, TelemetryConfiguration};

#[tokio::main]
async fn main() -> ExitCode {
    fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with_writer(std::io::stderr)
        .init();

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, code = e.code().as_str(), "telemetrics agent failed");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<()> {
    let path = std::env::args().nth(1).unwrap_or_else(|| "telemetrics.yaml".to_string());
    let settings = config::load_from_file(&path)?;

    let configuration = TelemetryConfiguration::builder()
        .default_metric_configuration(settings.defaults.to_configuration()?)
        .channel(Arc::new(JsonLinesChannel::new(std::io::stdout())))
        .build()?;
    let client = TelemetryClient::new(&configuration);
    let ingestor = LineIngestor::new(config::declare_metrics(&settings, &client)?)?;

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let flusher = flush::spawn_flush_loop(
        client.clone(),
        Duration::from_millis(settings.flush_interval_ms),
        shutdown_rx,
    )?;

    tracing::info!(settings = %path, "telemetrics agent started");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        tokio::select! {
            line = lines.next_line() => match line {
                Ok(Some(line)) => match ingestor.ingest_line(&line) {
                    Ok(true) => {}
                    Ok(false) => tracing::debug!(line = %line, "sample ignored"),
                    Err(e) => tracing::warn!(line = %line, error = %e, "sample rejected"),
                },
                Ok(None) => break,
                Err(e) => {
                    tracing::warn!(error = %e, "stdin read failed");
                    break;
                }
            },
            _ = &mut ctrl_c => {
                tracing::info!("interrupted");
                break;
            }
        }
    }

    let _ = shutdown_tx.send(true);
    flusher
        .await
        .map_err(|e| TelemetryError::Channel(format!("flush task failed: {e}")))?;
    tracing::info!("telemetrics agent stopped");
    Ok(())
}
