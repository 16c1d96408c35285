//! Master parameter schema and table building.
//!
//! The master document deserializes into [`MasterConfig`] and is then
//! built into validated, immutable tables. All validation is eager:
//! a run either starts with complete, coverage-checked tables or fails
//! at load with a [`ConfigError`].

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::base::{trait_names, Component, CompositionTable, TraitCatalog};
use crate::effects::{AgeEffectTable, BreedEffectTable, EffectTables, HeterosisTable, SexAodTable};
use crate::errors::ConfigError;
use crate::genetics::{per_cycle_rate, Covariance, GeneticSampler};

/// The master configuration document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MasterConfig {
    /// Free-text run description, echoed in verbose output
    #[serde(default)]
    pub comment: Option<String>,
    pub genetics: GeneticsConfig,
    /// One CSV row per herd:
    /// "name,nCows,startBreeding,seasonLen,seasonRate,deathLossRate"
    /// with an optional trailing mean 3-cycle rate field
    pub herds: Vec<String>,
    /// Years simulated before the planning horizon opens
    pub burnin: i32,
    /// Years the economic evaluation spans
    pub planning_horizon: i32,
    /// AUM consumed per month by a 500 lb calf
    pub calf_aum: f64,
    /// AUM consumed per month by a 1000 lb cow
    pub cow_aum: f64,
    pub foundation: FoundationConfig,
    pub effects: EffectRowsConfig,
    pub composition: CompositionConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// Trait list, component ordering, and the two covariance matrices.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneticsConfig {
    /// "NAME,MEAN" rows; order fixes the residual vector layout
    pub traits: Vec<String>,
    /// "TRAIT,D|M" rows; order fixes the breeding-value layout
    pub components: Vec<String>,
    /// Flat row-major genetic covariance, component order squared
    pub genetic_covariance: Vec<f64>,
    /// Flat row-major residual covariance, trait order squared
    pub residual_covariance: Vec<f64>,
}

/// Foundation population shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FoundationConfig {
    /// Bulls generated per herd
    pub n_bulls: u32,
    /// (merit, label) pairs in component order, added to foundation
    /// bull breeding values
    pub bull_merit: Vec<(f64, String)>,
    /// Proportion of the cow herd in each age class from 2 years;
    /// must sum to 1
    pub age_distribution: Vec<f64>,
}

/// Raw rows for the four effect tables.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EffectRowsConfig {
    /// Header "Trait,Effect,Type,Breed1,..." then
    /// "TRAIT,D|M,Cow|Calf,v..." rows
    pub breed_effects: Vec<String>,
    /// "Breed,Code" rows
    pub heterosis_codes: Vec<String>,
    /// Header "Trait,Component,AxB,..." then "TRAIT,D|M,v..." rows
    pub heterosis_values: Vec<String>,
    /// "breed,trait,sex,v0,v1,..." rows, one value per age-of-dam class
    pub sex_aod: Vec<String>,
    /// "TRAIT,slope,referenceAge" rows
    pub age_effects: Vec<String>,
    /// Deviate mature weight from its own reference age instead of
    /// stayability's
    #[serde(default)]
    pub use_mw_reference_age: bool,
}

/// Cumulative-proportion breed mixes for the three sampled populations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompositionConfig {
    /// (percent, "Breed,pct,...") pairs for foundation cows
    pub cow_herd: Vec<(f64, String)>,
    /// Same shape for the bull battery
    pub bull_battery: Vec<(f64, String)>,
    /// Same shape for the reference calf crop the breed effects are
    /// centered on
    pub current_calves: Vec<(f64, String)>,
}

/// Optional dump and debug file paths. Empty by default; every sink is
/// opt-in.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Yearly cow age distribution counts
    #[serde(default)]
    pub cow_age_file: Option<String>,
    /// Full registry dump at end of run
    #[serde(default)]
    pub records_dump: Option<String>,
    /// BV column printed in the registry dump, "TRAIT,D|M"
    #[serde(default)]
    pub records_dump_component: Option<String>,
    /// Per-animal breeding record dump
    #[serde(default)]
    pub breeding_records_dump: Option<String>,
    /// "path,TRAIT" pair capturing one trait's decomposition terms
    #[serde(default)]
    pub phenotype_file: Option<String>,
    #[serde(default)]
    pub stay_phenotype_file: Option<String>,
    #[serde(default)]
    pub hp_phenotype_file: Option<String>,
    #[serde(default)]
    pub cd_phenotype_file: Option<String>,
    /// Terminal-endpoint carcass log
    #[serde(default)]
    pub carcass_file: Option<String>,
}

/// One parsed herd row.
#[derive(Debug, Clone)]
pub struct HerdSpec {
    pub name: String,
    pub target_cows: u32,
    pub start_breeding: i32,
    pub season_length: i32,
    /// Whole-season conception rate from the row
    pub season_rate: f64,
    /// Per-cycle threshold derived from the season rate
    pub per_cycle_threshold: f64,
    pub death_loss_rate: f64,
    pub mean_3cycle_rate: f64,
}

fn parse_herd_row(row: &str) -> Result<HerdSpec, ConfigError> {
    let bad = || ConfigError::BadRow {
        table: "herds",
        row: row.to_string(),
    };
    let fields: Vec<&str> = row.split(',').map(str::trim).collect();
    if fields.len() < 6 {
        return Err(bad());
    }
    let target_cows = fields[1].parse::<u32>().map_err(|_| bad())?;
    let start_breeding = fields[2].parse::<i32>().map_err(|_| bad())?;
    let season_length = fields[3].parse::<i32>().map_err(|_| bad())?;
    let season_rate = fields[4].parse::<f64>().map_err(|_| bad())?;
    let death_loss_rate = fields[5].parse::<f64>().map_err(|_| bad())?;
    let mean_3cycle_rate = match fields.get(6) {
        Some(v) => v.parse::<f64>().map_err(|_| bad())?,
        None => 0.0,
    };

    Ok(HerdSpec {
        name: fields[0].to_string(),
        target_cows,
        start_breeding,
        season_length,
        season_rate,
        per_cycle_threshold: per_cycle_rate(season_length, season_rate),
        death_loss_rate,
        mean_3cycle_rate,
    })
}

/// Everything a simulation context is assembled from: the validated
/// tables plus the scalar knobs.
#[derive(Debug)]
pub struct SimSetup {
    pub catalog: TraitCatalog,
    pub tables: EffectTables,
    pub sampler: GeneticSampler,
    pub residual_stay_sd: f64,
    pub residual_hp_sd: f64,
    /// Total phenotypic calving-difficulty variance, for the difficult
    /// calving threshold
    pub cd_variance: f64,
    pub herd_specs: Vec<HerdSpec>,
    pub burnin: i32,
    pub planning_horizon: i32,
    pub calf_aum: f64,
    pub cow_aum: f64,
    pub n_foundation_bulls: u32,
    /// Foundation bull merit in component order
    pub bull_merit: Vec<f64>,
    pub age_distribution: Vec<f64>,
    pub cow_herd_composition: CompositionTable,
    pub bull_battery_composition: CompositionTable,
    pub current_calves_composition: CompositionTable,
    pub use_mw_reference_age: bool,
    pub output: OutputConfig,
}

impl MasterConfig {
    /// Load and deserialize a master document.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let file = File::open(path)?;
        let config: MasterConfig = serde_json::from_reader(BufReader::new(file))?;
        Ok(config)
    }

    /// Build the validated tables. Breed effects are zero-centered on
    /// the configured reference populations and heterosis coverage is
    /// checked over every breed those populations can produce.
    pub fn build(&self) -> Result<SimSetup, ConfigError> {
        let catalog = TraitCatalog::from_rows(&self.genetics.traits, &self.genetics.components)?;

        let genetic = Covariance::from_flat("genetic", &self.genetics.genetic_covariance)?;
        if genetic.dim() != catalog.n_components() {
            return Err(ConfigError::Invalid(format!(
                "genetic covariance is {}x{} but {} components are configured",
                genetic.dim(),
                genetic.dim(),
                catalog.n_components()
            )));
        }
        let residual = Covariance::from_flat("residual", &self.genetics.residual_covariance)?;
        if residual.dim() != catalog.n_traits() {
            return Err(ConfigError::Invalid(format!(
                "residual covariance is {}x{} but {} traits are configured",
                residual.dim(),
                residual.dim(),
                catalog.n_traits()
            )));
        }

        let residual_stay_sd = catalog
            .residual_index(trait_names::STAYABILITY)
            .map(|i| residual.variance(i).sqrt())
            .unwrap_or(0.0);
        let residual_hp_sd = catalog
            .residual_index(trait_names::HEIFER_PREGNANCY)
            .map(|i| residual.variance(i).sqrt())
            .unwrap_or(0.0);

        let cd_variance = {
            let trait_name = trait_names::CALVING_DIFFICULTY;
            let direct = catalog
                .genetic_index(trait_name, Component::Direct)
                .ok_or_else(|| ConfigError::UnknownComponent {
                    trait_name: trait_name.to_string(),
                    component: Component::Direct.code().to_string(),
                })?;
            let maternal = catalog
                .genetic_index(trait_name, Component::Maternal)
                .map(|i| genetic.variance(i))
                .unwrap_or(0.0);
            let res = catalog
                .residual_index(trait_name)
                .ok_or_else(|| ConfigError::UnknownTrait(trait_name.to_string()))?;
            genetic.variance(direct) + maternal + residual.variance(res)
        };

        let cow_herd_composition =
            CompositionTable::from_pairs("cow_herd", &self.composition.cow_herd)?;
        let bull_battery_composition =
            CompositionTable::from_pairs("bull_battery", &self.composition.bull_battery)?;
        let current_calves_composition =
            CompositionTable::from_pairs("current_calves", &self.composition.current_calves)?;

        let mut breed = BreedEffectTable::from_rows(&self.effects.breed_effects, &catalog)?;
        breed.zero_center(&current_calves_composition, &cow_herd_composition);

        let heterosis = HeterosisTable::from_rows(
            &self.effects.heterosis_codes,
            &self.effects.heterosis_values,
        )?;
        let mut breed_names = cow_herd_composition.breed_names();
        breed_names.extend(bull_battery_composition.breed_names());
        breed_names.extend(current_calves_composition.breed_names());
        breed_names.sort_unstable();
        breed_names.dedup();
        heterosis.validate_coverage(&breed_names)?;

        let sex_aod = SexAodTable::from_rows(&self.effects.sex_aod)?;
        let age = AgeEffectTable::from_rows(&self.effects.age_effects)?;

        let herd_specs = self
            .herds
            .iter()
            .map(|row| parse_herd_row(row))
            .collect::<Result<Vec<_>, _>>()?;
        if herd_specs.is_empty() {
            return Err(ConfigError::MissingKey("herds"));
        }
        for spec in &herd_specs {
            info!(
                herd = %spec.name,
                cows = spec.target_cows,
                season_rate = spec.season_rate,
                per_cycle = spec.per_cycle_threshold,
                "derived per-cycle conception threshold"
            );
        }

        let bull_merit: Vec<f64> = self.foundation.bull_merit.iter().map(|(v, _)| *v).collect();
        if bull_merit.len() != catalog.n_components() {
            return Err(ConfigError::Invalid(format!(
                "foundation bull merit has {} entries for {} components",
                bull_merit.len(),
                catalog.n_components()
            )));
        }

        Ok(SimSetup {
            catalog,
            tables: EffectTables {
                breed,
                heterosis,
                sex_aod,
                age,
            },
            sampler: GeneticSampler::new(genetic, residual),
            residual_stay_sd,
            residual_hp_sd,
            cd_variance,
            herd_specs,
            burnin: self.burnin,
            planning_horizon: self.planning_horizon,
            calf_aum: self.calf_aum,
            cow_aum: self.cow_aum,
            n_foundation_bulls: self.foundation.n_bulls,
            bull_merit,
            age_distribution: self.foundation.age_distribution.clone(),
            cow_herd_composition,
            bull_battery_composition,
            current_calves_composition,
            use_mw_reference_age: self.effects.use_mw_reference_age,
            output: self.output.clone(),
        })
    }
}

#[cfg(test)]
pub(crate) fn test_master_config() -> MasterConfig {
    fn rows(lines: &[&str]) -> Vec<String> {
        lines.iter().map(|s| s.to_string()).collect()
    }
    MasterConfig {
        comment: None,
        genetics: GeneticsConfig {
            traits: rows(&["BW,80", "WW,500", "STAY,0.92", "HP,0", "CD,105", "MW,1250"]),
            components: rows(&["BW,D", "WW,D", "WW,M", "STAY,D", "HP,D", "CD,D", "CD,M", "MW,D"]),
            genetic_covariance: vec![
                // BW,D  WW,D  WW,M STAY,D  HP,D  CD,D  CD,M  MW,D
                20.0, 20.0, 0.0, 0.0, 0.0, 8.0, 0.0, 20.0, //
                20.0, 500.0, 0.0, 0.0, 0.0, 0.0, 0.0, 300.0, //
                0.0, 0.0, 200.0, 0.0, 0.0, 0.0, 0.0, 0.0, //
                0.0, 0.0, 0.0, 0.01, 0.0, 0.0, 0.0, 0.0, //
                0.0, 0.0, 0.0, 0.0, 0.01, 0.0, 0.0, 0.0, //
                8.0, 0.0, 0.0, 0.0, 0.0, 16.0, 0.0, 0.0, //
                0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 9.0, 0.0, //
                20.0, 300.0, 0.0, 0.0, 0.0, 0.0, 0.0, 2500.0,
            ],
            residual_covariance: vec![
                40.0, 30.0, 0.0, 0.0, 10.0, 0.0, //
                30.0, 900.0, 0.0, 0.0, 0.0, 200.0, //
                0.0, 0.0, 0.04, 0.0, 0.0, 0.0, //
                0.0, 0.0, 0.0, 0.04, 0.0, 0.0, //
                10.0, 0.0, 0.0, 0.0, 36.0, 0.0, //
                0.0, 200.0, 0.0, 0.0, 0.0, 4900.0,
            ],
        },
        herds: rows(&["spring,100,59,63,0.92,0.03"]),
        burnin: 10,
        planning_horizon: 10,
        calf_aum: 0.5,
        cow_aum: 1.0,
        foundation: FoundationConfig {
            n_bulls: 4,
            bull_merit: vec![
                (0.0, "BW,D".to_string()),
                (0.0, "WW,D".to_string()),
                (0.0, "WW,M".to_string()),
                (0.0, "STAY,D".to_string()),
                (0.0, "HP,D".to_string()),
                (0.0, "CD,D".to_string()),
                (0.0, "CD,M".to_string()),
                (0.0, "MW,D".to_string()),
            ],
            age_distribution: vec![0.2, 0.18, 0.16, 0.14, 0.12, 0.2],
        },
        effects: EffectRowsConfig {
            breed_effects: rows(&[
                "Trait,Effect,Type,Angus,Hereford",
                "BW,D,Calf,0,2",
                "WW,D,Calf,0,5",
                "WW,M,Cow,0,-3",
                "STAY,D,Cow,0,0",
                "HP,D,Cow,0,0",
                "CD,D,Calf,0,1",
                "CD,M,Cow,0,0",
                "MW,D,Cow,0,40",
            ]),
            heterosis_codes: rows(&["Angus,B", "Hereford,B"]),
            heterosis_values: rows(&[
                "Trait,Component,BxB",
                "BW,D,1.0",
                "WW,D,15.0",
                "WW,M,6.0",
                "STAY,D,0.05",
                "HP,D,0.02",
                "CD,D,0.0",
                "MW,D,20.0",
            ]),
            sex_aod: rows(&[
                "Angus,WW,M,-38,-18,-11,0,-22",
                "Angus,WW,F,-38,-18,-11,0,-22",
                "Angus,WW,C,-38,-18,-11,0,-22",
                "Angus,HP,F,0.9,0.9,0.9,0.9,0.9",
                "Angus,HP,C,0.9,0.9,0.9,0.9,0.9",
                "Hereford,HP,F,0.9,0.9,0.9,0.9,0.9",
                "Hereford,HP,C,0.9,0.9,0.9,0.9,0.9",
            ]),
            age_effects: rows(&["WW,1.6,205", "STAY,0.0001,2190", "CD,0.0,730", "MW,0.35,1735"]),
            use_mw_reference_age: false,
        },
        composition: CompositionConfig {
            cow_herd: vec![(50.0, "Angus,100".to_string()), (50.0, "Angus,50,Hereford,50".to_string())],
            bull_battery: vec![(100.0, "Angus,100".to_string())],
            current_calves: vec![(100.0, "Angus,75,Hereford,25".to_string())],
        },
        output: OutputConfig::default(),
    }
}
