//! Graham CLI binary.
//!
//! Screens a stock universe with Benjamin Graham's criteria and writes the
//! ranked summary, rejections and per-company reports.

mod cli;

use clap::Parser;
use cli::Cli;
use graham::output::export::{format_dollars, format_percent};
use graham::{ScreenOutcome, Screener, build_provider};
use indicatif::{ProgressBar, ProgressStyle};
use std::process;
use std::time::Duration;
use tracing::error;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = cli.screener_config()?;
    let provider = build_provider(&config, cli.api_key.as_deref())?;
    let screener = Screener::new(config, provider)?;

    println!("\n╔══════════════════════════════════════════════════════════════╗");
    println!("║{:^62}║", "GRAHAM VALUE SCREEN");
    println!("╚══════════════════════════════════════════════════════════════╝\n");
    println!("Universe: {}", screener.config().universe_label());
    println!("History: {} year(s)", screener.config().years);
    if screener.config().dry_run {
        println!("Mode: Dry run (offline sample data)");
    } else if !screener.config().cache.enabled {
        println!("Cache: Disabled");
    }
    println!();

    let pb = ProgressBar::new(0);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .expect("valid template")
            .progress_chars("█▓░"),
    );
    pb.enable_steady_tick(Duration::from_millis(100));
    pb.set_message("Screening stocks...");

    let outcome = match screener
        .run_with_progress(|done, total| {
            pb.set_length(total as u64);
            pb.set_position(done as u64);
        })
        .await
    {
        Ok(outcome) => {
            pb.finish_with_message(format!("Analyzed {} stocks", outcome.analyzed));
            outcome
        }
        Err(e) => {
            pb.finish_with_message("Failed!");
            error!(error = %e, "Screen aborted");
            return Err(e.into());
        }
    };

    print_outcome(&outcome, screener.config().top_count);
    println!(
        "\nResults written to {}",
        screener.layout().root().display()
    );

    Ok(())
}

/// `RUST_LOG` wins; otherwise `info`, or `debug` with `--verbose`.
fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn print_outcome(outcome: &ScreenOutcome, top_count: usize) {
    println!("\n{}", "=".repeat(80));
    println!("SCREENING SUMMARY");
    println!("{}", "=".repeat(80));
    println!("Stocks analyzed:        {}", outcome.analyzed);
    println!("Skipped (missing data): {}", outcome.skipped.len());
    println!("Failed Graham criteria: {}", outcome.rejected.len());
    println!("Passed Graham criteria: {}", outcome.qualified);

    if outcome.ranked.is_empty() {
        println!("\nNo stocks passed Graham's criteria.");
        return;
    }

    println!("\nTOP {} GRAHAM STOCKS", top_count.min(outcome.ranked.len()));
    println!("{}", "-".repeat(80));
    println!(
        "{:<5} {:<8} {:<28} {:>10} {:>10} {:>8} {:>6}",
        "Rank", "Ticker", "Company", "Price", "Value", "MoS", "Score"
    );
    println!("{}", "-".repeat(80));
    for result in &outcome.ranked {
        let name: String = result.company_name.chars().take(28).collect();
        println!(
            "{:<5} {:<8} {:<28} {:>10} {:>10} {:>8} {:>6.1}",
            result.rank,
            result.ticker,
            name,
            format_dollars(result.current_price),
            format_dollars(result.intrinsic_value),
            format_percent(result.margin_of_safety),
            result.graham_score
        );
    }
}
