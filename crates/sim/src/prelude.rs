//! Commonly used imports for convenience.
//!
//! # Example
//!
//! ```
//! use herdmev_sim::prelude::*;
//!
//! let plan = RunPlan::default();
//! assert_eq!(plan.endpoint, SaleEndpoint::Weaning);
//! ```

pub use crate::base::{trait_names, Component, ComponentKey, Sex, TraitCatalog};
pub use crate::errors::{ConfigError, SimError};
pub use crate::simulation::{
    Animal, Herd, MasterConfig, Registry, RunPlan, SaleEndpoint, SimulationContext,
};
