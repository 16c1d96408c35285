use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use rand::{Rng as _, SeedableRng};
use rand_xoshiro::Xoshiro256PlusPlus;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::base::{Component, CompositionTable, TraitCatalog};
use crate::effects::EffectTables;
use crate::errors::ConfigError;
use crate::genetics::{Evaluator, GeneticSampler};
use crate::output::PhenoLog;
use crate::simulation::config::{OutputConfig, SimSetup};
use crate::simulation::herd::Herd;
use crate::simulation::registry::Registry;

/// Where the calf crop leaves the operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SaleEndpoint {
    /// Sold at weaning
    Weaning,
    /// Sold after the backgrounding period
    Background,
    /// Sold on live weight after the feedlot
    FatCattle,
    /// Sold on the rail on a carcass grid
    SlaughterCattle,
}

impl SaleEndpoint {
    pub const fn code(&self) -> &'static str {
        match self {
            SaleEndpoint::Weaning => "weaning",
            SaleEndpoint::Background => "background",
            SaleEndpoint::FatCattle => "fatcattle",
            SaleEndpoint::SlaughterCattle => "slaughtercattle",
        }
    }

    /// Whether calves are carried past weaning on the ranch.
    #[inline]
    pub fn feeds_past_weaning(&self) -> bool {
        !matches!(self, SaleEndpoint::Weaning)
    }

    /// Whether calves enter a feedlot phase.
    #[inline]
    pub fn has_feedlot(&self) -> bool {
        matches!(self, SaleEndpoint::FatCattle | SaleEndpoint::SlaughterCattle)
    }
}

impl fmt::Display for SaleEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for SaleEndpoint {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "weaning" => Ok(SaleEndpoint::Weaning),
            "background" => Ok(SaleEndpoint::Background),
            "fatcattle" => Ok(SaleEndpoint::FatCattle),
            "slaughtercattle" => Ok(SaleEndpoint::SlaughterCattle),
            other => Err(ConfigError::BadRow {
                table: "saleEndpoint",
                row: other.to_string(),
            }),
        }
    }
}

/// A genetic component bumped on the post-burn-in bull battery,
/// parsed from "TRAIT,D" or "TRAIT,D,amount".
#[derive(Debug, Clone, PartialEq)]
pub struct Bump {
    pub trait_name: String,
    pub component: Component,
    pub amount: f64,
}

impl FromStr for Bump {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bad = || ConfigError::BadRow {
            table: "bump",
            row: s.to_string(),
        };
        let fields: Vec<&str> = s.split(',').map(str::trim).collect();
        if fields.len() < 2 || fields.len() > 3 {
            return Err(bad());
        }
        let amount = match fields.get(2) {
            Some(v) => v.parse::<f64>().map_err(|_| bad())?,
            None => 1.0,
        };
        Ok(Bump {
            trait_name: fields[0].to_string(),
            component: fields[1].parse()?,
            amount,
        })
    }
}

impl fmt::Display for Bump {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{},{}", self.trait_name, self.component, self.amount)
    }
}

/// Run-level knobs that come from outside the master document: the
/// seed, the sale endpoint, and the optional component bump.
#[derive(Debug, Clone)]
pub struct RunPlan {
    pub seed: u64,
    pub endpoint: SaleEndpoint,
    /// Terminal indexes hold herd age structure fixed and shorten the
    /// horizon
    pub terminal: bool,
    /// Days fed past weaning; at least 1 for any endpoint past weaning
    pub background_days: f64,
    /// Feedlot days for the fat and slaughter endpoints
    pub days_on_feed: f64,
    pub bump: Option<Bump>,
}

impl Default for RunPlan {
    fn default() -> Self {
        Self {
            seed: 1234,
            endpoint: SaleEndpoint::Weaning,
            terminal: false,
            background_days: 0.0,
            days_on_feed: 0.0,
            bump: None,
        }
    }
}

/// Cull-cow sales accumulated per year across herds.
#[derive(Debug, Clone, Copy, Default)]
pub struct CullWeight {
    /// Total mature weight sold
    pub cum_weight: f64,
    /// Opens culled after their first exposure season
    pub n_open: u32,
    /// Cows culled for age
    pub n_old: u32,
}

/// All state of one simulation run.
///
/// Tables are immutable after construction; the registry, herds, RNG,
/// and yearly accumulators carry the run. Everything a year operation
/// needs hangs off the context so call order alone determines the RNG
/// stream.
pub struct SimulationContext {
    pub catalog: TraitCatalog,
    pub tables: EffectTables,
    pub sampler: GeneticSampler,
    pub residual_stay_sd: f64,
    pub residual_hp_sd: f64,
    pub cd_variance: f64,

    pub calf_aum: f64,
    pub cow_aum: f64,
    pub n_foundation_bulls: u32,
    /// Foundation bull merit in component order
    pub bull_merit: Vec<f64>,
    /// Foundation cow age-class proportions from 2 years
    pub age_distribution: Vec<f64>,
    pub cow_herd_composition: CompositionTable,
    pub bull_battery_composition: CompositionTable,
    pub use_mw_reference_age: bool,

    pub burnin: i32,
    pub planning_horizon: i32,
    /// burnin + planning horizon
    pub n_years: i32,
    pub endpoint: SaleEndpoint,
    pub terminal: bool,
    pub background_days: f64,
    pub days_on_feed: f64,
    pub bump: Option<Bump>,

    pub herds: Vec<Herd>,
    pub registry: Registry,
    pub rng: Xoshiro256PlusPlus,
    /// Registry length at the end of burn-in; animals past the marker
    /// belong to the priced calf crops
    pub burnin_marker: usize,

    /// Cows exposed per year; each herd's breed pass writes its own count
    pub cows_exposed: Vec<u32>,
    /// Cull-cow sale weight per year, summed over herds
    pub cull_weights: Vec<CullWeight>,

    pub log: PhenoLog,
    pub output: OutputConfig,
}

impl SimulationContext {
    /// Assemble a run from built tables and the run plan. Terminal
    /// indexes override the configured horizon: one burn-in year, then
    /// one year for the weaning endpoint or two for anything fed
    /// longer.
    pub fn new(setup: SimSetup, plan: RunPlan) -> Result<Self, ConfigError> {
        let (burnin, planning_horizon) = if plan.terminal {
            match plan.endpoint {
                SaleEndpoint::Weaning => (1, 1),
                _ => (1, 2),
            }
        } else {
            (setup.burnin, setup.planning_horizon)
        };
        let n_years = burnin + planning_horizon;
        // two trailing years flush the last heifer crops through
        let n_slots = (n_years + 3) as usize;

        let herds: Vec<Herd> = setup
            .herd_specs
            .iter()
            .map(|spec| {
                Herd::new(
                    Arc::from(spec.name.as_str()),
                    spec.target_cows,
                    spec.start_breeding,
                    spec.season_length,
                    spec.per_cycle_threshold,
                    spec.mean_3cycle_rate,
                    spec.death_loss_rate,
                    n_slots,
                )
            })
            .collect();

        let log = PhenoLog::from_config(&setup.output)?;

        info!(
            seed = plan.seed,
            endpoint = %plan.endpoint,
            terminal = plan.terminal,
            burnin,
            planning_horizon,
            herds = herds.len(),
            "simulation context ready"
        );

        Ok(Self {
            catalog: setup.catalog,
            tables: setup.tables,
            sampler: setup.sampler,
            residual_stay_sd: setup.residual_stay_sd,
            residual_hp_sd: setup.residual_hp_sd,
            cd_variance: setup.cd_variance,
            calf_aum: setup.calf_aum,
            cow_aum: setup.cow_aum,
            n_foundation_bulls: setup.n_foundation_bulls,
            bull_merit: setup.bull_merit,
            age_distribution: setup.age_distribution,
            cow_herd_composition: setup.cow_herd_composition,
            bull_battery_composition: setup.bull_battery_composition,
            use_mw_reference_age: setup.use_mw_reference_age,
            burnin,
            planning_horizon,
            n_years,
            endpoint: plan.endpoint,
            terminal: plan.terminal,
            background_days: plan.background_days,
            days_on_feed: plan.days_on_feed,
            bump: plan.bump,
            herds,
            registry: Registry::new(),
            rng: Xoshiro256PlusPlus::seed_from_u64(plan.seed),
            burnin_marker: 0,
            cows_exposed: vec![0; n_slots],
            cull_weights: vec![CullWeight::default(); n_slots],
            log,
            output: setup.output,
        })
    }

    /// A phenotype evaluator over the current registry state.
    pub fn evaluator(&self) -> Evaluator<'_> {
        Evaluator {
            catalog: &self.catalog,
            tables: &self.tables,
            registry: &self.registry,
            herds: &self.herds,
            residual_stay_sd: self.residual_stay_sd,
            residual_hp_sd: self.residual_hp_sd,
            mw_uses_own_reference_age: self.use_mw_reference_age,
            log: &self.log,
        }
    }

    /// The evaluator together with the RNG, borrowed disjointly so
    /// evaluations that draw fresh residuals can run in a loop.
    pub fn split(&mut self) -> (Evaluator<'_>, &mut Xoshiro256PlusPlus) {
        (
            Evaluator {
                catalog: &self.catalog,
                tables: &self.tables,
                registry: &self.registry,
                herds: &self.herds,
                residual_stay_sd: self.residual_stay_sd,
                residual_hp_sd: self.residual_hp_sd,
                mw_uses_own_reference_age: self.use_mw_reference_age,
                log: &self.log,
            },
            &mut self.rng,
        )
    }

    #[inline]
    pub fn n_year_slots(&self) -> usize {
        self.cows_exposed.len()
    }

    /// Draw a fresh sub-seed, e.g. for spawning an unseeded run.
    pub fn random_seed() -> u64 {
        rand::rng().random()
    }
}
