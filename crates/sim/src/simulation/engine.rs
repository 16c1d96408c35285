//! The year loop.
//!
//! A run builds the foundation, burns the herd age structure in, bumps
//! the bull battery when a component bump is planned, and then walks
//! the planning-horizon years whose calf crops the economics price.
//! Every herd goes through the same fixed order within a year: breed,
//! calve, cull opens, cull for age, then book cow grazing. Call order
//! alone drives the RNG stream, so one seed reproduces a run bit for
//! bit.

use std::fs::File;
use std::io::{BufWriter, Write as _};

use tracing::{debug, info};

use crate::base::ComponentKey;
use crate::errors::{ConfigError, SimError};
use crate::output;
use crate::simulation::config::OutputConfig;
use crate::simulation::context::SimulationContext;
use crate::simulation::{breeding, calving, culling, feed, foundation};

/// Run a whole simulation on a fresh context.
///
/// `in_index` names the components an index prices directly; a planned
/// bump shifts the bumped component by its full amount and drags every
/// component outside that list along by its genetic regression on the
/// bumped one. Pass an empty list when no index is loaded.
pub fn run(ctx: &mut SimulationContext, in_index: &[ComponentKey]) -> Result<(), SimError> {
    foundation::make_foundation(ctx)?;

    let mut age_sink = open_age_sink(&ctx.output)?;

    for year in 1..=ctx.burnin {
        step_year(ctx, year, &mut age_sink)?;
    }
    ctx.burnin_marker = ctx.registry.len();
    debug!(
        burnin = ctx.burnin,
        marker = ctx.burnin_marker,
        "burn-in complete"
    );

    apply_bump(ctx, in_index)?;

    // Non-terminal runs go two years past the horizon so the last
    // replacement heifers calve and wean inside the run.
    let last_year = if ctx.terminal {
        ctx.n_years
    } else {
        ctx.n_years + 2
    };
    for year in ctx.burnin + 1..=last_year {
        step_year(ctx, year, &mut age_sink)?;
    }

    if let Some(sink) = age_sink.as_mut() {
        sink.flush().map_err(ConfigError::Io)?;
    }
    ctx.log.flush();
    info!(
        years = last_year,
        animals = ctx.registry.len(),
        "simulation finished"
    );
    Ok(())
}

/// One simulated year over every herd, in the fixed operation order.
fn step_year(
    ctx: &mut SimulationContext,
    year: i32,
    age_sink: &mut Option<BufWriter<File>>,
) -> Result<(), SimError> {
    for herd_index in 0..ctx.herds.len() {
        breeding::breed(ctx, herd_index, year)?;
        calving::calve(ctx, herd_index, year)?;
        culling::cull_open(ctx, herd_index, year)?;
        // age counts go out between the two culls, before the old
        // cows leave
        if let Some(sink) = age_sink.as_mut() {
            output::dump_cow_ages(sink, ctx, herd_index, year - 1).map_err(ConfigError::Io)?;
        }
        culling::cull_old(ctx, herd_index, year)?;
        feed::cow_maintenance_aum(ctx, herd_index, year)?;
    }
    Ok(())
}

/// Shift every active bull's breeding values by the planned bump.
///
/// The bumped component moves by the full amount. Components outside
/// `in_index` follow by their genetic regression on the bumped one, so
/// correlated response reaches the records while the components the
/// index prices directly stay put for their own marginal runs.
pub fn apply_bump(ctx: &mut SimulationContext, in_index: &[ComponentKey]) -> Result<(), SimError> {
    let Some(bump) = ctx.bump.clone() else {
        return Ok(());
    };
    let idx = ctx
        .catalog
        .genetic_index(&bump.trait_name, bump.component)
        .ok_or_else(|| ConfigError::UnknownComponent {
            trait_name: bump.trait_name.clone(),
            component: bump.component.code().to_string(),
        })?;

    let genetic = ctx.sampler.genetic();
    let variance = genetic.variance(idx);
    let mut shift = vec![0.0; ctx.catalog.n_components()];
    shift[idx] = bump.amount;
    for (j, key) in ctx.catalog.components().iter().enumerate() {
        if j == idx || in_index.contains(key) {
            continue;
        }
        shift[j] = bump.amount * genetic.entry(idx, j) / variance;
    }

    let mut bumped = 0u32;
    for herd_index in 0..ctx.herds.len() {
        let name = ctx.herds[herd_index].name.clone();
        for id in ctx.registry.active_bulls(&name) {
            let bull = ctx.registry.get_mut(id)?;
            for (j, delta) in shift.iter().enumerate() {
                bull.breeding_value[j] += *delta;
            }
            bumped += 1;
        }
    }
    info!(bump = %bump, bulls = bumped, "bull battery bumped");
    Ok(())
}

fn open_age_sink(output: &OutputConfig) -> Result<Option<BufWriter<File>>, ConfigError> {
    match &output.cow_age_file {
        Some(path) => Ok(Some(BufWriter::new(File::create(path)?))),
        None => Ok(None),
    }
}
