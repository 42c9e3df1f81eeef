mod cli;
mod config;
mod error;
mod metrics;
mod oozie;
mod poller;
mod pushgateway;
mod selector;
mod status;
mod ui;

use std::time::Duration;

use anyhow::{Context, Result, bail};
use chrono::Utc;
use clap::Parser;
use cli::{Cli, Command};
use config::ExporterConfig;
use oozie::OozieClient;
use poller::{CycleOutcome, Poller, fetch_metrics};
use pushgateway::PushgatewayExporter;
use tracing::info;
use tracing_subscriber::EnvFilter;

fn init_tracing(verbose: bool) {
    let fallback = if verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback)),
        )
        .with_target(false)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let mut config = ExporterConfig::load(cli.config.as_deref())?;
    config.apply_cli(&cli);
    config.validate()?;

    let source = OozieClient::new(&config).context("building Oozie client")?;

    match cli.command.unwrap_or(Command::Run) {
        Command::Run => {
            info!(
                server = %config.server,
                port = config.port,
                depth = config.depth,
                delay_secs = config.delay,
                pushgateway = %config.pushgateway,
                "starting exporter"
            );
            let sink = PushgatewayExporter::new(config.pushgateway.clone())?;
            Poller::new(
                source,
                sink,
                config.selection,
                config.skip_empty,
                Duration::from_secs(config.delay),
            )
            .run()
            .await;
        }
        Command::Once => {
            let sink = PushgatewayExporter::new(config.pushgateway.clone())?;
            let poller = Poller::new(source, sink, config.selection, config.skip_empty, Duration::ZERO);
            match poller.run_cycle().await? {
                CycleOutcome::Exported(report) => {
                    info!(
                        jobs = report.jobs,
                        workflows = report.workflows,
                        pushed = report.pushed,
                        "poll cycle finished"
                    );
                    if report.failed > 0 {
                        bail!("{} of {} pushes failed", report.failed, report.workflows);
                    }
                }
                CycleOutcome::Skipped => {}
            }
        }
        Command::Show => {
            let metrics =
                fetch_metrics(&source, config.selection, config.skip_empty, Utc::now()).await?;
            print!("{}", ui::render_table(&metrics));
        }
    }

    Ok(())
}
