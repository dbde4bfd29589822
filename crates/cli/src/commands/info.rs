//! `info` command implementation.

use std::collections::BTreeMap;

use anyhow::{Context, Result};
use contracts::DispatchBlueprint;
use serde::Serialize;
use tracing::info;

use crate::cli::InfoArgs;

/// Configuration info for JSON output
#[derive(Serialize)]
struct ConfigInfo {
    version: String,
    dispatcher: DispatcherInfo,
    processor: ProcessorInfo,
}

#[derive(Serialize)]
struct DispatcherInfo {
    retry_delay_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_empty_batches: Option<u32>,
}

#[derive(Serialize)]
struct ProcessorInfo {
    name: String,
    kind: String,
    max_batch_size: usize,
    min_period_ms: u64,
    enforce_quota: bool,
    /// Upper bound on throughput implied by the limits
    #[serde(skip_serializing_if = "Option::is_none")]
    max_items_per_sec: Option<f64>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    params: BTreeMap<String, String>,
}

/// Execute the `info` command
pub fn run_info(args: &InfoArgs) -> Result<()> {
    info!(config = %args.config.display(), "Loading configuration info");

    if !args.config.exists() {
        anyhow::bail!("Configuration file not found: {}", args.config.display());
    }

    let blueprint = config_loader::ConfigLoader::load_from_path(&args.config)
        .with_context(|| format!("Failed to load config from {}", args.config.display()))?;

    let info = build_config_info(&blueprint, args);
    if args.json {
        let json =
            serde_json::to_string_pretty(&info).context("Failed to serialize config info")?;
        println!("{}", json);
    } else {
        print_config_info(&info);
    }

    Ok(())
}

fn build_config_info(blueprint: &DispatchBlueprint, args: &InfoArgs) -> ConfigInfo {
    let processor = &blueprint.processor;

    let max_items_per_sec = (processor.min_period_ms > 0)
        .then(|| processor.max_batch_size as f64 * 1000.0 / processor.min_period_ms as f64);

    let params = if args.params {
        processor
            .params
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    } else {
        BTreeMap::new()
    };

    ConfigInfo {
        version: format!("{:?}", blueprint.version),
        dispatcher: DispatcherInfo {
            retry_delay_ms: blueprint.dispatcher.retry_delay_ms,
            max_empty_batches: blueprint.dispatcher.max_empty_batches,
        },
        processor: ProcessorInfo {
            name: processor.name.clone(),
            kind: format!("{:?}", processor.kind),
            max_batch_size: processor.max_batch_size,
            min_period_ms: processor.min_period_ms,
            enforce_quota: processor.enforce_quota,
            max_items_per_sec,
            params,
        },
    }
}

fn print_config_info(info: &ConfigInfo) {
    println!("╔══════════════════════════════════════════════════════════════╗");
    println!("║               Batch Dispatch Configuration                   ║");
    println!("╚══════════════════════════════════════════════════════════════╝\n");

    println!("⚙️  Dispatcher");
    println!("   ├─ Version: {}", info.version);
    println!("   ├─ Retry delay: {}ms", info.dispatcher.retry_delay_ms);
    match info.dispatcher.max_empty_batches {
        Some(max) => println!("   └─ Max empty batches: {}", max),
        None => println!("   └─ Max empty batches: unlimited"),
    }

    let processor = &info.processor;
    println!("\n📤 Processor");
    println!("   ├─ Name: {} ({})", processor.name, processor.kind);
    println!("   ├─ Max batch size: {}", processor.max_batch_size);
    println!("   ├─ Min period: {}ms", processor.min_period_ms);
    match processor.max_items_per_sec {
        Some(rate) => println!("   ├─ Max throughput: {:.2} items/s", rate),
        None => println!("   ├─ Max throughput: unpaced"),
    }

    if processor.params.is_empty() {
        println!("   └─ Enforce quota: {}", processor.enforce_quota);
    } else {
        println!("   ├─ Enforce quota: {}", processor.enforce_quota);
        println!("   └─ Params:");
        let count = processor.params.len();
        for (i, (key, value)) in processor.params.iter().enumerate() {
            let prefix = if i == count - 1 { "└─" } else { "├─" };
            println!("      {} {} = {}", prefix, key, value);
        }
    }

    println!();
}
