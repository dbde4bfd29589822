//! `validate` command implementation.

use anyhow::{Context, Result};
use contracts::DispatchBlueprint;
use serde::Serialize;
use tracing::info;

use crate::cli::ValidateArgs;

/// Validation result for JSON output
#[derive(Serialize)]
struct ValidationResult {
    valid: bool,
    config_path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    warnings: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    summary: Option<ConfigSummary>,
}

#[derive(Serialize)]
struct ConfigSummary {
    version: String,
    processor: String,
    kind: String,
    max_batch_size: usize,
    min_period_ms: u64,
    retry_delay_ms: u64,
    enforce_quota: bool,
}

/// Execute the `validate` command
pub fn run_validate(args: &ValidateArgs) -> Result<()> {
    info!(config = %args.config.display(), "Validating configuration");

    let result = validate_config(args);

    if args.json {
        let json = serde_json::to_string_pretty(&result)
            .context("Failed to serialize validation result")?;
        println!("{}", json);
    } else {
        print_validation_result(&result);
    }

    if result.valid {
        Ok(())
    } else {
        anyhow::bail!("Configuration validation failed")
    }
}

fn validate_config(args: &ValidateArgs) -> ValidationResult {
    let config_path = args.config.display().to_string();

    if !args.config.exists() {
        return ValidationResult {
            valid: false,
            config_path,
            error: Some(format!("File not found: {}", args.config.display())),
            warnings: None,
            summary: None,
        };
    }

    match config_loader::ConfigLoader::load_from_path(&args.config) {
        Ok(blueprint) => {
            let warnings = collect_warnings(&blueprint);
            let processor = &blueprint.processor;

            ValidationResult {
                valid: true,
                config_path,
                error: None,
                warnings: if warnings.is_empty() {
                    None
                } else {
                    Some(warnings)
                },
                summary: Some(ConfigSummary {
                    version: format!("{:?}", blueprint.version),
                    processor: processor.name.clone(),
                    kind: format!("{:?}", processor.kind),
                    max_batch_size: processor.max_batch_size,
                    min_period_ms: processor.min_period_ms,
                    retry_delay_ms: blueprint.dispatcher.retry_delay_ms,
                    enforce_quota: processor.enforce_quota,
                }),
            }
        }
        Err(e) => ValidationResult {
            valid: false,
            config_path,
            error: Some(e.to_string()),
            warnings: None,
            summary: None,
        },
    }
}

/// Collect configuration warnings (non-fatal issues)
fn collect_warnings(blueprint: &DispatchBlueprint) -> Vec<String> {
    let mut warnings = Vec::new();
    let processor = &blueprint.processor;

    if processor.min_period_ms == 0 {
        warnings.push("processor.min_period_ms is 0 - batches are not paced".to_string());
    }

    if processor.enforce_quota && blueprint.dispatcher.retry_delay_ms < processor.min_period_ms {
        warnings.push(
            "dispatcher.retry_delay_ms is shorter than processor.min_period_ms - \
             blocked batches may be retried before the quota window reopens"
                .to_string(),
        );
    }

    if blueprint.dispatcher.max_empty_batches.is_none() {
        warnings.push(
            "dispatcher.max_empty_batches not set - a processor reporting a batch size of 0 \
             stalls the run until it is cancelled"
                .to_string(),
        );
    }

    warnings
}

fn print_validation_result(result: &ValidationResult) {
    if result.valid {
        println!("✓ Configuration is valid: {}", result.config_path);

        if let Some(ref summary) = result.summary {
            println!("\n  Version: {}", summary.version);
            println!("  Processor: {} ({})", summary.processor, summary.kind);
            println!("  Max batch size: {}", summary.max_batch_size);
            println!("  Min period: {}ms", summary.min_period_ms);
            println!("  Retry delay: {}ms", summary.retry_delay_ms);
            println!("  Enforce quota: {}", summary.enforce_quota);
        }

        if let Some(ref warnings) = result.warnings {
            println!("\n⚠ Warnings:");
            for warning in warnings {
                println!("  - {}", warning);
            }
        }
    } else {
        println!("✗ Configuration is invalid: {}", result.config_path);
        if let Some(ref error) = result.error {
            println!("\n  Error: {}", error);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn blueprint(toml: &str) -> DispatchBlueprint {
        config_loader::ConfigLoader::load_from_str(toml, config_loader::ConfigFormat::Toml)
            .unwrap()
    }

    #[test]
    fn test_warnings_for_unpaced_config() {
        let warnings = collect_warnings(&blueprint(
            r#"
            [processor]
            name = "out"
            kind = "log"
            max_batch_size = 10
            "#,
        ));
        assert_eq!(warnings.len(), 2);
        assert!(warnings[0].contains("min_period_ms is 0"));
    }

    #[test]
    fn test_no_warnings_for_complete_config() {
        let warnings = collect_warnings(&blueprint(
            r#"
            [dispatcher]
            retry_delay_ms = 500
            max_empty_batches = 5

            [processor]
            name = "out"
            kind = "log"
            max_batch_size = 10
            min_period_ms = 250
            enforce_quota = true
            "#,
        ));
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_validate_reports_invalid_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "[processor]\nname = \"\"\nkind = \"log\"\nmax_batch_size = 1").unwrap();

        let args = ValidateArgs {
            config: file.path().to_path_buf(),
            json: true,
        };
        let result = validate_config(&args);
        assert!(!result.valid);
        assert!(result.error.is_some());
    }
}
