// Rental marketplace command-line entry point

use clap::Parser;

use stayfeed::commands::{self, rentals::RentalsCli};
use stayfeed::tracing_setup::{init_tracing, TracingConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = RentalsCli::parse();
    init_tracing(&TracingConfig {
        verbose: cli.global.verbose,
    })?;

    let output = cli.global.output();
    let code = commands::exit_code(&output, commands::rentals::run(cli).await);
    if code != 0 {
        std::process::exit(code);
    }
    Ok(())
}
