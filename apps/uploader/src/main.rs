//! Flory uploader entry point.

mod cli;
mod config;

use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use flory_deploy::{RunPhase, UploadEvent, UploadOrchestrator};
use flory_device::{DeviceEndpoints, HttpTransferClient};
use flory_transfer::{Collection, collect_directory, format_bytes};
use tracing_subscriber::EnvFilter;

use crate::cli::Cli;
use crate::config::UploaderConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize structured logging.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let mut config = match UploaderConfig::load(cli.config.as_deref()) {
        Ok(c) => c,
        Err(e) => {
            tracing::warn!(error = %e, "failed to load config, using defaults");
            UploaderConfig::default()
        }
    };
    cli.apply(&mut config);
    if cli.save_config {
        let path = config.save(cli.config.as_deref())?;
        tracing::info!(path = %path.display(), "configuration saved");
    }

    let collect = config.collect_options();
    let collection = collect_directory(&cli.source, &collect)
        .await
        .with_context(|| format!("cannot collect {}", cli.source.display()))?;
    println!(
        "{}: folder contains {} files ({})",
        collection.label(&collect),
        collection.len(),
        format_bytes(collection.total_bytes())
    );

    if cli.dry_run {
        print_listing(&collection);
        return Ok(());
    }
    if collection.is_empty() {
        println!("Nothing to upload");
        return Ok(());
    }

    let endpoints = DeviceEndpoints::new(&config.host)?;
    let client = HttpTransferClient::new().context("cannot build HTTP client")?;
    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        device = %endpoints.base_url(),
        "starting upload"
    );

    let mut orchestrator =
        UploadOrchestrator::new(Arc::new(client), endpoints, config.upload_options());
    let mut events = orchestrator
        .take_events()
        .context("event stream already taken")?;

    let run = orchestrator.run(&collection.entries);
    tokio::pin!(run);
    let result = loop {
        tokio::select! {
            result = &mut run => break result,
            Some(event) = events.recv() => render(&event),
            _ = tokio::signal::ctrl_c() => {
                println!("Stopping after the current file...");
                orchestrator.cancel();
            }
        }
    };
    while let Ok(event) = events.try_recv() {
        render(&event);
    }

    let report = result.context("upload aborted")?;
    println!(
        "Uploaded {} files ({}) with {} requests",
        report.completed,
        format_bytes(report.bytes_sent),
        report.attempts
    );
    Ok(())
}

fn render(event: &UploadEvent) {
    match event {
        UploadEvent::Log(line) => println!("{line}"),
        UploadEvent::Progress {
            completed, total, ..
        } => {
            tracing::debug!(completed, total, "progress");
        }
        UploadEvent::Phase(phase) => tracing::debug!(?phase, "phase"),
        UploadEvent::Finished { phase, .. } => {
            if *phase == RunPhase::Done {
                tracing::info!("device updated");
            }
        }
    }
}

fn print_listing(collection: &Collection) {
    for entry in &collection.entries {
        println!("{:>10}  {}", format_bytes(entry.size), entry.relative_path);
    }
    println!(
        "{:>10}  total ({} files)",
        format_bytes(collection.total_bytes()),
        collection.len()
    );
}
