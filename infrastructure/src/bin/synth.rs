//! Writes the deployment template to disk.

use clap::Parser;
use infrastructure::{synthesize, StackConfig, StackError};
use service_core::observability::init_tracing;
use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, info};

#[derive(Parser, Debug)]
#[command(name = "synth", about = "Synthesize the CloudFormation template for LocalStack")]
struct Cli {
    /// Output file (defaults to INFRA_OUTPUT_PATH or cdk.out/localstack.template.json).
    #[arg(short, long)]
    out: Option<PathBuf>,

    /// Availability zones to span.
    #[arg(long)]
    max_azs: Option<u32>,

    /// Number of MSK broker nodes; must be a multiple of the zone count.
    #[arg(long)]
    brokers: Option<u32>,

    /// Print the template instead of writing it.
    #[arg(long)]
    stdout: bool,
}

fn run(cli: Cli) -> Result<(), StackError> {
    let mut config = StackConfig::load()?;
    if let Some(out) = cli.out {
        config.output_path = out;
    }
    if let Some(max_azs) = cli.max_azs {
        config.max_azs = max_azs;
    }
    if let Some(brokers) = cli.brokers {
        config.kafka_broker_nodes = brokers;
    }

    let rendered = synthesize(&config)?.to_json_pretty()?;

    if cli.stdout {
        println!("{}", rendered);
        return Ok(());
    }

    if let Some(parent) = config.output_path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(&config.output_path, rendered)?;
    info!(path = %config.output_path.display(), "Template written");
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let log_level = std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string());
    init_tracing("infrastructure", &log_level, None);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "Synthesis failed");
            ExitCode::FAILURE
        }
    }
}
