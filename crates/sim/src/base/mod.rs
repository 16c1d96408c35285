//! Base types for the herd calendar, animal classes, and genetics layout.
//!
//! This module provides the simulation date arithmetic, sex codes, the
//! configured trait/component orderings, and breed-composition tables
//! that the rest of the library is built on.

mod breeds;
mod calendar;
mod sex;
mod traits;

pub use breeds::{blend, BreedComposition, CompositionRow, CompositionTable};
pub use calendar::{
    age_in_years, year_of, Date, CYCLE_DAYS, DAYS_PER_MONTH, DAYS_PER_YEAR, GESTATION_DAYS,
    WEANING_AGE_DAYS,
};
pub use sex::Sex;
pub use traits::{names as trait_names, Component, ComponentKey, TraitCatalog};
