mod args;
mod metrics;

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use audiobatch_core::{
    config_warnings, load_config, load_config_from_env, validate_config, BatchRunner, Converter,
    FfmpegConverter, FfprobeTagReader, RunSummary,
};

use args::{Cli, CONFIG_ENV_VAR};

/// Exit status when the run finished but some files failed.
const EXIT_WITH_ERRORS: i32 = 2;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.log_json);

    match run(cli).await {
        Ok(summary) if summary.has_errors() => std::process::exit(EXIT_WITH_ERRORS),
        Ok(_) => {}
        Err(e) => {
            error!("Fatal error: {:#}", e);
            std::process::exit(1);
        }
    }
}

fn init_logging(verbose: bool, json: bool) {
    let default_filter = if verbose { "debug" } else { "info" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| default_filter.into());

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

async fn run(cli: Cli) -> Result<RunSummary> {
    // Load configuration
    let cwd = std::env::current_dir().context("Failed to read current directory")?;
    let env_path = std::env::var_os(CONFIG_ENV_VAR).map(Into::into);
    let mut config = match cli.config_path(env_path, &cwd) {
        Some(path) => {
            info!("Loading configuration from {:?}", path);
            load_config(&path)
                .with_context(|| format!("Failed to load config from {:?}", path))?
        }
        None => {
            info!("No configuration file, using defaults");
            load_config_from_env().context("Failed to read configuration from environment")?
        }
    };

    cli.apply(&mut config);
    validate_config(&config).context("Configuration validation failed")?;
    for warning in config_warnings(&config) {
        warn!("{}", warning);
    }

    info!(
        "Output: {} ({}), mirror structure: {}, parallel conversions: {}",
        config.conversion.output_format,
        config.conversion.output_quality,
        config.conversion.mirror_structure,
        config.encoder.max_parallel_conversions
    );

    // Check the encoder before touching the file system
    let converter = FfmpegConverter::new(config.encoder.clone());
    converter
        .validate()
        .await
        .context("ffmpeg is not available")?;

    let tag_reader = FfprobeTagReader::from_config(&config.encoder);
    let runner = BatchRunner::new(Arc::new(converter), Arc::new(tag_reader))
        .with_max_parallel(config.encoder.max_parallel_conversions);

    // Ctrl-C stops the run between files
    let cancel = runner.cancel_handle();
    tokio::spawn(async move {
        if signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, finishing conversions in flight");
            cancel.cancel();
        }
    });

    let summary = runner
        .run(&cli.inputs, &config.conversion, cli.input_mode())
        .await
        .context("Conversion run failed")?;

    if cli.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&summary).context("Failed to serialize summary")?
        );
    } else {
        print_summary(&summary);
    }

    if let Some(path) = &cli.metrics_file {
        metrics::write_metrics(path)
            .with_context(|| format!("Failed to write metrics to {:?}", path))?;
    }

    Ok(summary)
}

fn print_summary(summary: &RunSummary) {
    println!(
        "total: {}, converted: {}, skipped: {}, errors: {}{}",
        summary.total,
        summary.converted,
        summary.skipped,
        summary.errors,
        if summary.cancelled { " (cancelled)" } else { "" }
    );
    match &summary.report_path {
        Some(path) => println!("{}", path.display()),
        None => println!("{}", summary.output_root.display()),
    }
}
