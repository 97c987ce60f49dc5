// Mon Oct 19 2026 - Alex

use anyhow::Context;
use clap::Parser;
use colored::Colorize;
use relay_pipeline::{LoggingUtils, Pipeline, PipelineConfig, PipelineReport};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(name = "relay-pipeline")]
#[command(author = "Alex")]
#[command(version = "1.0.0")]
#[command(about = "Cancellable fan-out/fan-in pipeline with end-to-end accounting", long_about = None)]
struct Args {
    /// JSON config file; flags below override its values.
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[arg(short, long)]
    workers: Option<usize>,

    #[arg(short, long)]
    timeout_ms: Option<u64>,

    #[arg(short, long)]
    delay_ms: Option<u64>,

    #[arg(long)]
    input_capacity: Option<usize>,

    #[arg(long)]
    relay_capacity: Option<usize>,

    #[arg(long)]
    merged_capacity: Option<usize>,

    #[arg(short, long, default_value = "warn")]
    log_level: String,

    /// Raises the log level by one step per occurrence.
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[arg(long)]
    json: bool,

    #[arg(long)]
    no_color: bool,
}

impl Args {
    fn load_config(&self) -> anyhow::Result<PipelineConfig> {
        let mut config = match &self.config {
            Some(path) => {
                let text = std::fs::read_to_string(path)
                    .with_context(|| format!("Failed to read config {}", path.display()))?;
                PipelineConfig::from_json_str(&text)?
            }
            None => PipelineConfig::default(),
        };

        if let Some(workers) = self.workers {
            config = config.with_workers(workers);
        }
        if let Some(ms) = self.timeout_ms {
            config = config.with_timeout(Duration::from_millis(ms));
        }
        if let Some(ms) = self.delay_ms {
            config = config.with_relay_delay(Duration::from_millis(ms));
        }
        if let Some(capacity) = self.input_capacity {
            config = config.with_input_capacity(capacity);
        }
        if let Some(capacity) = self.relay_capacity {
            config = config.with_relay_capacity(capacity);
        }
        if let Some(capacity) = self.merged_capacity {
            config = config.with_merged_capacity(capacity);
        }

        Ok(config)
    }
}

fn main() {
    let args = Args::parse();

    if args.no_color {
        colored::control::set_override(false);
    }

    let base = LoggingUtils::level_from_str(&args.log_level);
    LoggingUtils::init_logger(LoggingUtils::level_from_verbosity(base, args.verbose));

    if let Err(e) = run(&args) {
        eprintln!("{}", failure_line(&e));
        std::process::exit(1);
    }
}

/// The only diagnostic printed for a failed run.
fn failure_line(e: &anyhow::Error) -> String {
    format!("{} {:#}", "[!]".red(), e)
}

fn run(args: &Args) -> anyhow::Result<()> {
    let config = args.load_config()?;
    let pipeline = Pipeline::new(config)?;
    let report = pipeline.run()?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }

    Ok(())
}

fn print_report(report: &PipelineReport) {
    println!(
        "{} Items: produced {} / drained {}",
        "[+]".green(),
        report.produced.count.to_string().cyan(),
        report.drained.count.to_string().cyan()
    );
    println!(
        "{} Sum: produced {} / drained {}",
        "[+]".green(),
        report.produced.sum.to_string().cyan(),
        report.drained.sum.to_string().cyan()
    );
    println!("{} Split by relay: {:?}", "[+]".green(), report.amounts);
    println!(
        "{} Finished in {:.2}ms",
        "[*]".blue(),
        report.elapsed.as_secs_f64() * 1000.0
    );
}
