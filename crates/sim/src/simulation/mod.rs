//! Herd life cycle simulation.
//!
//! The registry holds every animal ever created; herds carry the
//! yearly bookkeeping; the context ties registry, herds, tables, and
//! the RNG into one run. The year operations live in their own
//! modules and the engine walks them in a fixed order.

pub mod animal;
pub mod breeding;
pub mod calving;
pub mod config;
pub mod context;
pub mod culling;
pub mod engine;
pub mod feed;
pub mod foundation;
pub mod herd;
pub mod registry;

pub use animal::{Animal, AnimalId, AumEntry, BreedingRecord, FeedSource};
pub use config::{MasterConfig, OutputConfig, SimSetup};
pub use context::{Bump, CullWeight, RunPlan, SaleEndpoint, SimulationContext};
pub use engine::run;
pub use herd::{BreedingCounts, CalvingDifficultyDist, Herd};
pub use registry::Registry;
