use std::fs::File;
use std::io::{self, BufWriter};

use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};

use herdmev_econ::{estimate_mev, write_mev_csv, write_mev_file, write_report, MevPlan};
use herdmev_sim::simulation::MasterConfig;

use crate::args::MevArgs;

pub fn estimate_values(args: &MevArgs) -> Result<()> {
    if !args.csv {
        println!("🐄 Herdmev - Marginal Economic Values");
        println!("============================================\n");
    }

    let master = MasterConfig::from_path(&args.master)
        .with_context(|| format!("loading herd parameters from {}", args.master.display()))?;
    let config = herdmev_econ::IndexConfig::from_path(&args.index)
        .with_context(|| format!("loading index parameters from {}", args.index.display()))?;
    let tables = config.build().context("building index tables")?;

    if !args.csv {
        if let Some(comment) = &config.comment {
            println!("Index: {comment}");
        }
        println!(
            "Bumping {} components at the {} endpoint, {} samples each...",
            tables.components.len(),
            tables.endpoint,
            args.samples
        );
    }

    let plan = MevPlan {
        n_samples: args.samples,
        seed: args.seed,
    };
    let total = (tables.components.len() + 1) * plan.n_samples;

    let pb = if args.progress {
        let pb = ProgressBar::new(total as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template(
                    "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta}) {per_sec}",
                )
                .unwrap()
                .progress_chars("#>-"),
        );
        pb
    } else {
        ProgressBar::hidden()
    };

    let report = estimate_mev(&master, &tables, &plan, || pb.inc(1))
        .context("estimating marginal economic values")?;
    pb.finish_and_clear();

    if args.csv {
        write_mev_csv(io::stdout().lock(), &report)?;
    } else {
        println!("✓ Estimation complete\n");
        write_report(io::stdout().lock(), &report)?;
    }

    if let Some(path) = &args.output {
        let file =
            File::create(path).with_context(|| format!("creating {}", path.display()))?;
        write_mev_file(BufWriter::new(file), &report)
            .with_context(|| format!("writing {}", path.display()))?;
        if !args.csv {
            println!("\n💾 Index element file written to {}", path.display());
        }
    }

    Ok(())
}
