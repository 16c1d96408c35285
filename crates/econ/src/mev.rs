//! Marginal economic value estimation.
//!
//! An MEV is the change in average net returns per exposure from one
//! unit of genetic merit in one index component. The estimator runs a
//! base batch of simulations, then one batch per component with that
//! component bumped on the post-burn-in bull battery, and differences
//! the batch means. Every batch replays the same seed list so the
//! paired runs share their stochastic history and the difference
//! isolates the bump.

use std::io::{self, Write};

use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256PlusPlus;
use rayon::prelude::*;
use tracing::{debug, info};

use herdmev_sim::base::{trait_names, ComponentKey};
use herdmev_sim::simulation::{engine, Bump, MasterConfig, OutputConfig, SimulationContext};

use crate::errors::IndexError;
use crate::netreturns::process_net_returns;
use crate::params::IndexTables;

/// Batch size and seeding for one estimation.
#[derive(Debug, Clone, Copy)]
pub struct MevPlan {
    /// Simulations per bump
    pub n_samples: usize,
    /// Seed for the shared seed list
    pub seed: u64,
}

impl Default for MevPlan {
    fn default() -> Self {
        Self {
            n_samples: 100,
            seed: 1234,
        }
    }
}

/// Sampled net-return statistics for one bumped component.
#[derive(Debug, Clone)]
pub struct MevComponent {
    pub key: ComponentKey,
    /// Mean net returns with the bump applied
    pub mean: f64,
    pub sd: f64,
    /// Difference from the base mean, per unit of the bump
    pub mev: f64,
    /// Standard error of the batch mean
    pub sd_mean: f64,
    /// Genetic standard deviation of the component
    pub genetic_sd: f64,
    /// Share of total index emphasis, in [0, 1]
    pub emphasis: f64,
}

/// The full estimation result.
#[derive(Debug, Clone)]
pub struct MevReport {
    pub base_mean: f64,
    pub base_sd: f64,
    pub components: Vec<MevComponent>,
    /// Standard error of the whole index
    pub index_error: f64,
    pub n_samples: usize,
}

/// Estimate the MEV of every index component. `tick` is called once
/// per finished simulation, from worker threads.
pub fn estimate_mev<F: Fn() + Sync>(
    master: &MasterConfig,
    index: &IndexTables,
    plan: &MevPlan,
    tick: F,
) -> Result<MevReport, IndexError> {
    let mut rng = Xoshiro256PlusPlus::seed_from_u64(plan.seed);
    let seeds: Vec<u64> = (0..plan.n_samples)
        .map(|_| rng.random_range(0..100_000))
        .collect();

    let base = sample_runs(master, index, None, &seeds, &tick)?;
    let (base_mean, base_var) = mean_variance(&base);
    debug!(base_mean, base_sd = base_var.sqrt(), "base batch done");

    let n = plan.n_samples as f64;
    let mut components = Vec::with_capacity(index.components.len());
    let mut index_error_var = 0.0;
    for key in &index.components {
        let bump = Bump {
            trait_name: key.trait_name.clone(),
            component: key.component,
            amount: bump_amount(&key.trait_name),
        };
        let nets = sample_runs(master, index, Some(bump), &seeds, &tick)?;
        let (mean, var) = mean_variance(&nets);
        debug!(component = %key, mean, mev = mean - base_mean, "bump batch done");

        index_error_var += var / n + base_var / n;
        components.push(MevComponent {
            key: key.clone(),
            mean,
            sd: var.sqrt(),
            mev: mean - base_mean,
            sd_mean: (var / n).sqrt(),
            genetic_sd: 0.0,
            emphasis: 0.0,
        });
    }

    let mut report = MevReport {
        base_mean,
        base_sd: base_var.sqrt(),
        components,
        index_error: index_error_var.sqrt(),
        n_samples: plan.n_samples,
    };
    fill_emphasis(master, &mut report)?;

    info!(
        base_mean,
        index_error = report.index_error,
        components = report.components.len(),
        n_samples = plan.n_samples,
        "marginal economic values estimated"
    );
    Ok(report)
}

/// Stayability and heifer pregnancy are probabilities, so their unit
/// bump is a percentage point.
fn bump_amount(trait_name: &str) -> f64 {
    if trait_name == trait_names::STAYABILITY || trait_name == trait_names::HEIFER_PREGNANCY {
        0.01
    } else {
        1.0
    }
}

/// Run one simulation per seed and collect the net returns in seed
/// order.
fn sample_runs<F: Fn() + Sync>(
    master: &MasterConfig,
    index: &IndexTables,
    bump: Option<Bump>,
    seeds: &[u64],
    tick: &F,
) -> Result<Vec<f64>, IndexError> {
    seeds
        .par_iter()
        .map(|&seed| {
            let net = run_once(master, index, seed, bump.clone())?;
            tick();
            Ok(net)
        })
        .collect()
}

fn run_once(
    master: &MasterConfig,
    index: &IndexTables,
    seed: u64,
    bump: Option<Bump>,
) -> Result<f64, IndexError> {
    let mut setup = master.build()?;
    // Batch workers share the process; the configured phenotype sinks
    // would clobber one another, so they stay closed here.
    setup.output = OutputConfig::default();
    let mut ctx = SimulationContext::new(setup, index.run_plan(seed, bump))?;
    engine::run(&mut ctx, &index.components)?;
    process_net_returns(&mut ctx, index)
}

/// Sample mean and variance with the n - 1 denominator.
fn mean_variance(values: &[f64]) -> (f64, f64) {
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    if values.len() < 2 {
        return (mean, 0.0);
    }
    let ss = values.iter().map(|v| (v - mean) * (v - mean)).sum::<f64>();
    (mean, ss / (n - 1.0))
}

/// Attach each component's genetic standard deviation and its share
/// of the index emphasis.
fn fill_emphasis(master: &MasterConfig, report: &mut MevReport) -> Result<(), IndexError> {
    let setup = master.build()?;
    for comp in &mut report.components {
        let Some(idx) = setup
            .catalog
            .genetic_index(&comp.key.trait_name, comp.key.component)
        else {
            continue;
        };
        let mut genetic_sd = setup.sampler.genetic().variance(idx).sqrt();
        // Stayability merit is carried as a proportion but published
        // per percentage point.
        if comp.key.trait_name == trait_names::STAYABILITY {
            genetic_sd *= 100.0;
        }
        comp.genetic_sd = genetic_sd;
    }

    let total: f64 = report
        .components
        .iter()
        .map(|comp| comp.mev.abs() * comp.genetic_sd)
        .sum();
    for comp in &mut report.components {
        comp.emphasis = comp.mev.abs() * comp.genetic_sd / total;
    }
    Ok(())
}

/// Print the summary table.
pub fn write_report(mut w: impl Write, report: &MevReport) -> io::Result<()> {
    writeln!(
        w,
        "\t ________________________________________________________________________"
    )?;
    writeln!(
        w,
        "\t| Trait  | Comp | Mean NRLML   | StdDev(NRLML) |     MEV    | SDMeanNRLML| "
    )?;
    writeln!(
        w,
        "\t|________|______|______________|_______________|____________|____________|"
    )?;
    writeln!(
        w,
        "\t| base   |  -   |  {:10.2}  |    {:10.2} |      -     |      -     |",
        report.base_mean, report.base_sd
    )?;
    for comp in &report.components {
        writeln!(
            w,
            "\t|{:>5}   |  {}   |  {:10.2}  |    {:10.2} | {:10.2} | {:10.2} |",
            comp.key.trait_name,
            comp.key.component.code(),
            comp.mean,
            comp.sd,
            comp.mev,
            comp.sd_mean
        )?;
    }
    writeln!(
        w,
        "\t|________________________________________________________________________|"
    )?;
    writeln!(w, "\tNote, these MEV are to be applied to EBV, not EPD")?;
    writeln!(w, "\t *Number of samples per bump: {}", report.n_samples)?;
    writeln!(w)?;
    writeln!(w, "\tStd Error of the Index: {:10.2}", report.index_error)?;
    writeln!(w)?;
    Ok(())
}

/// One `TRAIT,COMP,MEV` line per component, doubled for application
/// to EPDs.
pub fn write_mev_csv(mut w: impl Write, report: &MevReport) -> io::Result<()> {
    for comp in &report.components {
        writeln!(
            w,
            "{},{},{:.6}",
            comp.key.trait_name,
            comp.key.component.code(),
            comp.mev * 2.0
        )?;
    }
    Ok(())
}

/// The index-element document downstream tooling ingests. Calving
/// difficulty publishes as calving ease, so that component flips
/// sign, and every MEV is doubled for application to EPDs.
pub fn write_mev_file(mut w: impl Write, report: &MevReport) -> io::Result<()> {
    // No trait database is wired in, so the correlation column stays
    // zero.
    let correlation = 0.0_f64;
    writeln!(w, "{{")?;
    writeln!(w, "   indexElement:[")?;
    for comp in &report.components {
        let (trait_name, mev) = if comp.key.trait_name == trait_names::CALVING_DIFFICULTY {
            ("CE", -comp.mev)
        } else {
            (comp.key.trait_name.as_str(), comp.mev)
        };
        writeln!(w, "{{")?;
        writeln!(w, "      trait: {trait_name}")?;
        writeln!(w, "      component: {}", comp.key.component.code())?;
        writeln!(w, "      emphasis: {:.6}", comp.emphasis)?;
        writeln!(w, "      correlation: {correlation:.6}")?;
        writeln!(w, "      geneticStdDev: {:.6}", comp.genetic_sd)?;
        writeln!(w, "      mev: {:.6}", mev * 2.0)?;
        writeln!(w, "   }}")?;
    }
    writeln!(w, "   ]")?;
    writeln!(w, "}}")?;
    Ok(())
}
