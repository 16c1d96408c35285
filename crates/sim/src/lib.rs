//! # Herd Simulation Crate
//!
//! Life cycle simulation for a beef cow herd: trait genetics sampled
//! from configured covariance structures, yearly breeding, calving,
//! culling, and feed accounting, and the append-only animal registry
//! that an economic index layer prices afterwards.

pub mod base;
pub mod effects;
pub mod errors;
pub mod genetics;
pub mod output;
pub mod prelude;
pub mod simulation;

pub use simulation::{MasterConfig, RunPlan, SimulationContext};
