//! `run` command implementation.

use anyhow::{Context, Result};
use contracts::DispatchBlueprint;
use dispatcher::CancellationToken;
use std::time::Duration;
use tracing::{info, warn};

use crate::cli::RunArgs;
use crate::error::CliError;
use crate::pipeline::{DispatchJob, JobConfig};

/// Execute the `run` command
pub async fn run_dispatch(args: &RunArgs) -> Result<()> {
    info!(config = %args.config.display(), "Loading configuration");

    if !args.config.exists() {
        return Err(CliError::config_not_found(args.config.display().to_string()).into());
    }

    let mut blueprint = config_loader::ConfigLoader::load_from_path(&args.config)
        .with_context(|| format!("Failed to load config from {}", args.config.display()))?;

    // Apply CLI overrides
    if let Some(retry_delay_ms) = args.retry_delay_ms {
        if retry_delay_ms == 0 {
            return Err(CliError::invalid_override("retry_delay_ms", "must be > 0").into());
        }
        info!(retry_delay_ms, "Overriding retry delay from CLI");
        blueprint.dispatcher.retry_delay_ms = retry_delay_ms;
    }

    info!(
        processor = %blueprint.processor.name,
        kind = ?blueprint.processor.kind,
        max_batch_size = blueprint.processor.max_batch_size,
        min_period_ms = blueprint.processor.min_period_ms,
        retry_delay_ms = blueprint.dispatcher.retry_delay_ms,
        "Configuration loaded"
    );

    // Dry run - just validate and exit
    if args.dry_run {
        info!("Dry run mode - configuration is valid, exiting");
        print_config_summary(&blueprint);
        return Ok(());
    }

    if !args.input.exists() {
        return Err(CliError::input_not_found(args.input.display().to_string()).into());
    }

    let job = DispatchJob::new(JobConfig {
        blueprint,
        input: args.input.clone(),
        resume_from: args.resume_from,
        timeout: seconds(args.timeout),
        skip_blank: args.skip_blank,
        progress_interval: seconds(args.progress_interval),
    });

    // Signals cancel the token; the dispatcher stops at the next batch
    // boundary and still reports its progress.
    let token = CancellationToken::new();
    let shutdown = tokio::spawn(cancel_on_shutdown_signal(token.clone()));

    info!("Starting dispatch...");
    let result = job.run(token).await;
    shutdown.abort();

    let report = result.context("Dispatch setup failed")?;

    if args.json {
        let json = serde_json::to_string_pretty(&report).context("Failed to serialize report")?;
        println!("{}", json);
    } else {
        report.print_summary();
    }

    match report.interrupted_by {
        Some(reason) => Err(CliError::interrupted(report.progress, reason).into()),
        None => {
            info!(
                progress = %report.progress,
                items = report.items_this_run,
                duration_secs = report.duration_secs,
                "Dispatch finished"
            );
            Ok(())
        }
    }
}

fn seconds(value: u64) -> Option<Duration> {
    (value > 0).then(|| Duration::from_secs(value))
}

/// Cancel `token` on Ctrl+C or SIGTERM
async fn cancel_on_shutdown_signal(token: CancellationToken) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    warn!("Received shutdown signal, stopping after the current batch...");
    token.cancel();
}

/// Print configuration summary for dry-run mode
fn print_config_summary(blueprint: &DispatchBlueprint) {
    let processor = &blueprint.processor;

    println!("\n=== Configuration Summary ===\n");
    println!("Processor:");
    println!("  Name: {}", processor.name);
    println!("  Kind: {:?}", processor.kind);
    println!("  Max batch size: {}", processor.max_batch_size);
    println!("  Min period: {}ms", processor.min_period_ms);
    println!("  Enforce quota: {}", processor.enforce_quota);

    println!("\nDispatcher:");
    println!("  Retry delay: {}ms", blueprint.dispatcher.retry_delay_ms);
    match blueprint.dispatcher.max_empty_batches {
        Some(max) => println!("  Max empty batches: {}", max),
        None => println!("  Max empty batches: unlimited"),
    }

    println!();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_seconds_disables() {
        assert_eq!(seconds(0), None);
        assert_eq!(seconds(3), Some(Duration::from_secs(3)));
    }
}
