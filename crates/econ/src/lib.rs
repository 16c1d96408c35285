//! # Herd Economics Crate
//!
//! Prices a finished herd simulation. The net-returns layer values
//! each calf crop at the configured sale endpoint, nets out feed and
//! cow costs, and discounts everything back per cow exposure. The MEV
//! layer re-runs the simulation with single components of genetic
//! merit bumped and differences the batches into marginal economic
//! values for an index.

pub mod endpoints;
pub mod errors;
pub mod ledger;
pub mod mev;
pub mod netreturns;
pub mod params;
pub mod prices;

#[cfg(test)]
pub(crate) mod testutil;

pub use errors::IndexError;
pub use mev::{
    estimate_mev, write_mev_csv, write_mev_file, write_report, MevComponent, MevPlan, MevReport,
};
pub use netreturns::process_net_returns;
pub use params::{IndexConfig, IndexTables};
pub use prices::{GridSchedule, PriceTable, QualityGrade};
