use std::time::Duration;

use anyhow::Result;
use clap::arg;
use clap::command;
use clap::Parser;
use marketplace_probe::diagnostics::Diagnostics;
use marketplace_probe::observability::metrics::get_metrics;
use marketplace_probe::resilience::deadline::run_with_deadline;
use marketplace_probe::utils::config_loader;
use marketplace_probe::utils::constants::DEFAULT_CONFIG_PATH;
use marketplace_probe::utils::logging;
use marketplace_probe::utils::logging::LogLevel;
use tracing::info;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[arg(short, long, env = "CONFIG", default_value = DEFAULT_CONFIG_PATH)]
    config: String,
    #[arg(long, env = "LOG_LEVEL", value_enum)]
    log_level: Option<LogLevel>,
    /// Probe only this group; repeatable. All groups when omitted.
    #[arg(short, long = "group")]
    groups: Vec<String>,
    /// Dump prometheus metrics to stderr after the run.
    #[arg(long)]
    print_metrics: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    // -------------------------------
    // 1. Load YAML config, init logging
    // -------------------------------

    let args = Args::parse();
    let service_config = config_loader::run(&args.config).await?;
    logging::run(&service_config, args.log_level.to_owned());

    // -------------------------------
    // 2. Wire transport, broker and prober
    // -------------------------------

    let diagnostics = Diagnostics::from_config(&service_config)?;

    // -------------------------------
    // 3. Authorise and probe within the optional deadline
    // -------------------------------

    info!(config = %args.config, "diagnostics starting");
    let only = (!args.groups.is_empty()).then_some(args.groups.as_slice());
    let deadline = service_config.settings.deadline_seconds.map(Duration::from_secs);
    let report = run_with_deadline(deadline, diagnostics.run(only)).await?;

    println!("{}", serde_json::to_string_pretty(&report)?);

    // -------------------------------
    // 4. Metrics
    // -------------------------------

    if args.print_metrics || service_config.settings.metrics.is_enabled {
        eprintln!("{}", get_metrics().await.render()?);
    }

    Ok(())
}
