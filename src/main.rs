use anyhow::{Context, Result};
use docker_pipeline::cli::output::{format_report, style, CROSS, INFO};
use docker_pipeline::cli::{output::ConsoleReporter, Cli};
use docker_pipeline::client::{DockerClient, EngineClientConfig};
use docker_pipeline::core::{Manifest, Pipeline};
use docker_pipeline::execution::ExecutionEngine;
use std::sync::Arc;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[tokio::main]
async fn main() {
    let cli = Cli::from_args();

    if let Err(e) = run(cli).await {
        eprintln!("{} {:#}", CROSS, style(&e).red());
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    // Initialize logging; RUST_LOG overrides the flag
    let log_level = if cli.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));
    let subscriber = FmtSubscriber::builder().with_env_filter(filter).finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set logging subscriber")?;

    // Load manifest
    let manifest = Manifest::from_file(&cli.manifest).context("failed to load manifest")?;
    let pipeline = Pipeline::new(manifest).context("failed to build pipeline")?;

    println!(
        "{} Loaded {} ({} tasks, {} volumes)",
        INFO,
        style(cli.manifest.display()).bold(),
        pipeline.len(),
        pipeline.volumes().len()
    );

    // Connect to the container engine
    let mut client_config = EngineClientConfig::default();
    if let Some(host) = &cli.host {
        client_config = client_config.with_endpoint(host.clone());
    }
    let client = DockerClient::new(&client_config).context("failed to create docker client")?;

    let mut engine = ExecutionEngine::new(client);
    let reporter = Arc::new(ConsoleReporter::new(!cli.quiet));
    engine.add_event_handler(move |event| reporter.handle(event));

    // Execute pipeline
    println!();
    let report = engine
        .execute(&pipeline, &cli.args)
        .await
        .context("failed to execute the pipeline")?;

    println!("\n{}", format_report(&report));

    Ok(())
}
