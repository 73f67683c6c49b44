//! bladeup - Update the blade CLI to the latest release or snapshot build

use bladeup::cli::CliArgs;
use bladeup::orchestrator::{Orchestrator, OrchestratorResult};
use bladeup::output::{create_formatter, OutputConfig};
use clap::Parser;
use std::io::{self, Write};
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let args = CliArgs::parse();
    setup_logging(args.trace);

    let formatter = create_formatter(OutputConfig::from_cli(args.json, args.trace));

    match run(args).await {
        Ok(result) => {
            let mut stdout = io::stdout().lock();
            if formatter.format(&result, &mut stdout).and_then(|_| stdout.flush()).is_err() {
                return ExitCode::FAILURE;
            }
            if result.is_success() {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            }
        }
        Err(e) => {
            let written = if formatter.errors_to_stdout() {
                formatter.format_error(&e, &mut io::stdout().lock())
            } else {
                formatter.format_error(&e, &mut io::stderr().lock())
            };
            if written.is_err() {
                eprintln!("Error: {:#}", e);
            }
            ExitCode::FAILURE
        }
    }
}

/// Logs go to stderr; `RUST_LOG` overrides the level chosen by `--trace`
fn setup_logging(trace: bool) {
    let level = if trace { "warn,bladeup=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();
}

/// Main application logic
async fn run(args: CliArgs) -> anyhow::Result<OrchestratorResult> {
    let orchestrator = Orchestrator::new(args)?;
    let result = orchestrator.run().await?;
    Ok(result)
}
