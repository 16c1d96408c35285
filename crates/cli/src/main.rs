mod args;
mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::Level;
use tracing_subscriber::EnvFilter;

use args::{MevArgs, RunArgs, ValidateArgs};
use commands::{mev, run, validate};

/// Herdmev: a beef herd simulator for weighing selection indexes
///
/// This tool simulates a commercial cow-calf operation animal by animal
/// and prices its calf crop at a chosen sale endpoint, either once or
/// across bumped batches to estimate marginal economic values.
#[derive(Parser, Debug)]
#[command(name = "herdmev")]
#[command(author, version, about = "Simulates beef herds to weigh economic selection indexes", long_about = None)]
struct Cli {
    /// Number of threads to use for batch simulation
    ///
    /// If not specified, defaults to the number of logical CPUs.
    #[arg(short = 't', long, global = true)]
    threads: Option<usize>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run one simulation and price its calf crop.
    ///
    /// Simulates the burn-in and planning horizon for every herd in the
    /// master document, then reports discounted net returns per cow
    /// exposed at the index's sale endpoint.
    Run(RunArgs),

    /// Estimate marginal economic values for an index.
    ///
    /// Replays the same seeds with each index component bumped in turn
    /// and reports the change in net returns per unit of breeding value.
    Mev(MevArgs),

    /// Validate parameter files without simulating anything.
    ///
    /// Parses and builds both documents and cross-checks the index
    /// components against the genetic catalog.
    Validate(ValidateArgs),
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(Level::WARN.into()))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if let Some(threads) = cli.threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()?;
    }

    match cli.command {
        Commands::Run(args) => {
            run::run_simulation(&args)?;
        }
        Commands::Mev(args) => {
            mev::estimate_values(&args)?;
        }
        Commands::Validate(args) => {
            validate::validate_params(&args)?;
        }
    }

    Ok(())
}
