//! Speedprobe - Main CLI Application
//!
//! Measures round-trip latency, download throughput and upload throughput
//! against the probe endpoints supplied by the catalog service.

use clap::Parser;
use speedprobe::{cli::Cli, config::Config, error::Result, output::ResultFormatter, SpeedTest};
use std::process;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(message) = cli.validate() {
        eprintln!("Error: {}", message);
        process::exit(1);
    }

    let use_color = !cli.no_color;
    if let Err(e) = run_application(cli).await {
        eprintln!("{}", e.format_for_console(use_color));
        eprintln!();
        eprintln!("{}", e.user_friendly_message());
        process::exit(e.exit_code());
    }
}

/// Main application logic
async fn run_application(cli: Cli) -> Result<()> {
    let config = Config::load(&cli)?;

    if config.debug {
        eprintln!("{} v{}", speedprobe::PKG_NAME, speedprobe::VERSION);
        eprintln!("Catalog service: {}", config.base_url);
        eprintln!("Rounds: {}", config.count);
        eprintln!("Latency attempts: {}", config.latency_attempts);
        eprintln!();
    }

    // Bootstrap: a broken catalog fails loudly before any measurement
    let engine = SpeedTest::connect(&config).await?;
    let result = engine.run(config.count).await?;

    let formatter = ResultFormatter::new(config.enable_color && !config.json_output);
    if config.json_output {
        println!("{}", formatter.format_json(&result)?);
    } else {
        println!("{}", formatter.format_human(&result));
    }

    Ok(())
}
