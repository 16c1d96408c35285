use std::io::{self, Write};

use anyhow::{Context, Result};

use herdmev_econ::{process_net_returns, IndexConfig};
use herdmev_sim::output;
use herdmev_sim::simulation::{engine, Bump, MasterConfig, RunPlan, SimulationContext};

use crate::args::{OutputMode, RunArgs};

pub fn run_simulation(args: &RunArgs) -> Result<()> {
    let verbose = args.output_mode == OutputMode::Verbose;
    if verbose {
        println!("🐄 Herdmev - Running Simulation");
        println!("============================================\n");
    }

    let master = MasterConfig::from_path(&args.master)
        .with_context(|| format!("loading herd parameters from {}", args.master.display()))?;
    if verbose {
        if let Some(comment) = &master.comment {
            println!("Herd: {comment}");
        }
    }

    let index = match &args.index {
        Some(path) => {
            let config = IndexConfig::from_path(path)
                .with_context(|| format!("loading index parameters from {}", path.display()))?;
            if verbose {
                if let Some(comment) = &config.comment {
                    println!("Index: {comment}");
                }
            }
            Some(config.build().context("building index tables")?)
        }
        None => None,
    };

    let bump: Option<Bump> = args
        .bump
        .as_deref()
        .map(str::parse)
        .transpose()
        .context("parsing bump")?;

    let setup = master.build().context("building herd tables")?;
    let plan = match &index {
        Some(tables) => tables.run_plan(args.seed, bump),
        None => RunPlan {
            seed: args.seed,
            bump,
            ..RunPlan::default()
        },
    };
    let in_index = index
        .as_ref()
        .map(|tables| tables.components.as_slice())
        .unwrap_or_default();

    let mut ctx = SimulationContext::new(setup, plan).context("preparing the run")?;
    if verbose {
        println!("Running {} years...\n", ctx.n_years);
    }
    engine::run(&mut ctx, in_index).context("simulating")?;

    match args.output_mode {
        OutputMode::Verbose | OutputMode::Table => {
            output::print_tables(&mut io::stdout().lock(), &ctx)
                .context("printing breeding tables")?;
        }
        OutputMode::Quiet => {}
    }

    if let Some(tables) = &index {
        let net = process_net_returns(&mut ctx, tables).context("pricing the calf crop")?;
        match args.output_mode {
            OutputMode::Quiet => {
                // The bare figure and nothing else, for callers that
                // capture stdout.
                print!("{net:.6}");
                io::stdout().flush()?;
            }
            OutputMode::Table => println!("{net:.6}"),
            OutputMode::Verbose => {
                println!("\n✓ Simulation complete");
                println!("  {} endpoint, seed {}", tables.endpoint, args.seed);
                println!("  Net returns per cow exposed: ${net:.2}");
            }
        }
    } else if verbose {
        println!("\n✓ Simulation complete (no index document, nothing priced)");
    }

    output::write_dumps(&ctx).context("writing output dumps")?;

    Ok(())
}
