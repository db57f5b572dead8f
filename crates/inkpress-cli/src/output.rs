//! Output renderers and formatting helpers for CLI commands.

use anyhow::anyhow;
use inkpress_api_models::{
    ApiKeyList, HealthCheck, PriceCalculatorResponse, PricingInfo, UsageStatistics, UserBalance,
    UserProfile,
};
use inkpress_ops::{DownloadLink, ProgressView};
use serde::Serialize;

use crate::cli::OutputFormat;
use crate::client::{CliError, CliResult};

pub(crate) fn render_json<T: Serialize>(value: &T) -> CliResult<()> {
    let text = serde_json::to_string_pretty(value)
        .map_err(|err| CliError::failure(anyhow!("failed to format JSON: {err}")))?;
    println!("{text}");
    Ok(())
}

pub(crate) fn render_links(links: &[DownloadLink], format: OutputFormat) -> CliResult<()> {
    match format {
        OutputFormat::Json => {
            let rows: Vec<_> = links
                .iter()
                .map(|link| {
                    serde_json::json!({
                        "filename": link.filename,
                        "downloadUrl": link.download_url,
                        "fileSize": link.file_size,
                        "pageRange": link.page_range,
                    })
                })
                .collect();
            render_json(&rows)?;
        }
        OutputFormat::Table => {
            for link in links {
                let range = link
                    .page_range
                    .as_deref()
                    .map(|range| format!(" (pages {range})"))
                    .unwrap_or_default();
                println!(
                    "{:<30} {:>10} {}{}",
                    link.filename,
                    format_bytes(link.file_size),
                    link.download_url,
                    range
                );
            }
        }
    }
    Ok(())
}

pub(crate) fn render_progress(view: &ProgressView) {
    let files = view
        .files_summary
        .as_deref()
        .map(|summary| format!(" [{summary}]"))
        .unwrap_or_default();
    let elapsed = view
        .elapsed_seconds
        .map(|seconds| format!(" {seconds}s"))
        .unwrap_or_default();
    println!("{:<12} {:>3}%{}{}", view.label, view.percent, files, elapsed);
}

pub(crate) fn render_profile(profile: &UserProfile, format: OutputFormat) -> CliResult<()> {
    match format {
        OutputFormat::Json => render_json(profile),
        OutputFormat::Table => {
            println!("id: {}", profile.id);
            println!("name: {}", profile.name);
            println!("email: {}", profile.email);
            println!("role: {}", profile.role);
            println!("balance: {:.2}", profile.balance);
            println!(
                "free operations: {} used, {} remaining",
                profile.free_operations_used, profile.free_operations_remaining
            );
            println!("member since: {}", profile.created_at);
            Ok(())
        }
    }
}

pub(crate) fn render_balance(balance: &UserBalance, format: OutputFormat) -> CliResult<()> {
    match format {
        OutputFormat::Json => render_json(balance),
        OutputFormat::Table => {
            println!("balance: {:.2}", balance.balance);
            println!(
                "free operations: {} used, {} remaining",
                balance.free_operations_used, balance.free_operations_remaining
            );
            println!("free tier resets: {}", balance.free_operations_reset);
            Ok(())
        }
    }
}

pub(crate) fn render_keys(list: &ApiKeyList, format: OutputFormat) -> CliResult<()> {
    match format {
        OutputFormat::Json => render_json(list),
        OutputFormat::Table => {
            println!("{:<36} {:<20} {:<14} ACTIVE", "ID", "NAME", "PREVIEW");
            for key in &list.keys {
                println!(
                    "{:<36} {:<20} {:<14} {}",
                    key.id, key.name, key.key_preview, key.is_active
                );
            }
            Ok(())
        }
    }
}

pub(crate) fn render_pricing(info: &PricingInfo, format: OutputFormat) -> CliResult<()> {
    match format {
        OutputFormat::Json => render_json(info),
        OutputFormat::Table => {
            println!("base cost per operation: {:.4}", info.operation_cost);
            println!("free operations per month: {}", info.free_operations_monthly);
            if !info.custom_prices.is_empty() {
                println!("overrides:");
                let mut overrides: Vec<_> = info.custom_prices.iter().collect();
                overrides.sort_by(|a, b| a.0.cmp(b.0));
                for (operation, cost) in overrides {
                    println!("  {operation}: {cost:.4}");
                }
            }
            println!("last updated: {}", info.last_updated);
            Ok(())
        }
    }
}

pub(crate) fn render_calculation(
    calc: &PriceCalculatorResponse,
    format: OutputFormat,
) -> CliResult<()> {
    match format {
        OutputFormat::Json => render_json(calc),
        OutputFormat::Table => {
            println!("{:<20} {:>6} {:>10} {:>10}", "OPERATION", "COUNT", "UNIT", "TOTAL");
            for line in &calc.breakdown {
                println!(
                    "{:<20} {:>6} {:>10.4} {:>10.4}",
                    line.operation, line.count, line.unit_cost, line.total_cost
                );
            }
            println!("total: {:.4} {}", calc.total_cost, calc.currency);
            Ok(())
        }
    }
}

pub(crate) fn render_usage(stats: &UsageStatistics, format: OutputFormat) -> CliResult<()> {
    match format {
        OutputFormat::Json => render_json(stats),
        OutputFormat::Table => {
            println!(
                "operations: {} total, {} succeeded, {} failed",
                stats.total_operations, stats.successful_operations, stats.failed_operations
            );
            println!("files processed: {}", stats.total_files_processed);
            println!("data processed: {}", format_bytes(stats.total_data_processed));
            println!("avg processing time: {:.2}s", stats.average_processing_time);
            if !stats.operation_breakdown.is_empty() {
                println!("by operation:");
                let mut rows: Vec<_> = stats.operation_breakdown.iter().collect();
                rows.sort_by(|a, b| a.0.cmp(b.0));
                for (operation, count) in rows {
                    println!("  {operation}: {count}");
                }
            }
            println!("period: {} to {}", stats.period.start, stats.period.end);
            Ok(())
        }
    }
}

pub(crate) fn render_health(health: &HealthCheck, format: OutputFormat) -> CliResult<()> {
    match format {
        OutputFormat::Json => render_json(health),
        OutputFormat::Table => {
            println!("status: {}", health.status);
            println!("config source: {}", health.config_source);
            Ok(())
        }
    }
}

pub(crate) fn format_bytes(bytes: u64) -> String {
    const UNITS: [&str; 5] = ["B", "KiB", "MiB", "GiB", "TiB"];
    #[allow(clippy::cast_precision_loss)]
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{bytes} B")
    } else {
        format!("{value:.1} {}", UNITS[unit])
    }
}
