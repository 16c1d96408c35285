use anyhow::{Context, Result};

use herdmev_econ::IndexConfig;
use herdmev_sim::simulation::MasterConfig;

use crate::args::ValidateArgs;

pub fn validate_params(args: &ValidateArgs) -> Result<()> {
    println!("🔍 Validating {}", args.master.display());

    let master = MasterConfig::from_path(&args.master)
        .with_context(|| format!("loading herd parameters from {}", args.master.display()))?;
    let setup = master.build().context("building herd tables")?;
    println!(
        "✓ Herd parameters: {} traits, {} components, {} herd(s)",
        setup.catalog.n_traits(),
        setup.catalog.n_components(),
        setup.herd_specs.len()
    );

    if let Some(path) = &args.index {
        println!("🔍 Validating {}", path.display());
        let tables = IndexConfig::from_path(path)
            .with_context(|| format!("loading index parameters from {}", path.display()))?
            .build()
            .context("building index tables")?;

        for key in &tables.components {
            if setup
                .catalog
                .genetic_index(&key.trait_name, key.component)
                .is_none()
            {
                anyhow::bail!(
                    "index component {key} has no genetic parameters in the master file"
                );
            }
        }
        println!(
            "✓ Index parameters: {} endpoint, {} components, {} price rows",
            tables.endpoint,
            tables.components.len(),
            tables.prices.len()
        );
    }

    println!("\n✓ Validation complete: No issues found");

    Ok(())
}
