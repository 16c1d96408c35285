//! Quantitative genetics: covariance sampling, conception-rate
//! arithmetic, and the phenotype decomposition.

mod conception;
mod covariance;
mod phenotype;
mod sampler;

pub use conception::{cycles_in_season, per_cycle_rate, season_rate, stay_to_conception};
pub use covariance::Covariance;
pub use phenotype::Evaluator;
pub use sampler::GeneticSampler;
