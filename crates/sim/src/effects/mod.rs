//! Immutable environmental-effect lookup tables.
//!
//! Breed-of-origin effects, breed-class heterosis, sex by age-of-dam
//! adjustments, and per-trait age slopes. All four are parsed and
//! validated once at load and read-only afterwards.

mod age;
mod breed_effects;
mod heterosis;
mod sex_aod;

pub use age::{AgeEffect, AgeEffectTable};
pub use breed_effects::{BreedEffectRow, BreedEffectTable, EffectScope};
pub use heterosis::HeterosisTable;
pub use sex_aod::{aod_class, aod_class_of, SexAodTable};

/// The full set of effect tables a phenotype evaluation reads.
#[derive(Debug)]
pub struct EffectTables {
    pub breed: BreedEffectTable,
    pub heterosis: HeterosisTable,
    pub sex_aod: SexAodTable,
    pub age: AgeEffectTable,
}
