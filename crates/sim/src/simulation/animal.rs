use std::sync::Arc;

use nalgebra::DVector;

use crate::base::{BreedComposition, Date, Sex};

/// Animal identification number, sequentially generated starting at 1.
/// 0 means unknown, e.g. foundation sires and dams.
pub type AnimalId = u32;

/// One year's breeding outcome for a cow. Exactly one is appended per
/// exposed cow per year, open or bred.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BreedingRecord {
    /// Simulation year of the exposure
    pub year_bred: i32,
    /// Day within the year the cow was bred (or a placeholder day when open)
    pub date_bred: Date,
    /// Whether the exposure ended in a pregnancy
    pub bred: bool,
    /// Sire of the pregnancy; 0 when open
    pub sire: AnimalId,
    /// Absolute simulation date of the resulting calving
    pub calving_date: Date,
}

/// Where a feed entry was accrued.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedSource {
    /// Calf growth, birth through background
    Growing,
    /// Annual cow maintenance
    Maintenance,
    /// Cull feed of a 2-year-old open or lost heifer
    FirstCalfCull,
    /// Cull feed of an open mature cow
    OpenCull,
    /// Cull feed of a cow past the herd age limit
    OldCull,
}

/// One month of feed consumption and the weight behind it.
#[derive(Debug, Clone, Copy)]
pub struct AumEntry {
    /// Simulation year the feed is incurred
    pub year: i32,
    /// Calendar month 1..=12
    pub month: i32,
    /// Animal-unit-months consumed
    pub aum: f64,
    /// Weight at the end of the month, lb
    pub weight: f64,
    pub source: FeedSource,
}

/// One simulated animal. Registry entries are never removed; culled
/// animals stay with `active` cleared.
#[derive(Debug, Clone)]
pub struct Animal {
    pub id: AnimalId,
    pub sire: AnimalId,
    pub dam: AnimalId,
    pub sex: Sex,
    pub birth_date: Date,
    pub year_born: i32,
    /// Simulation date of death; 0 while alive
    pub death_date: Date,
    /// Active member of the herd (cow or bull)
    pub active: bool,
    /// Herd the animal last belonged to
    pub herd: Arc<str>,
    /// Date a heifer entered the cow herd
    pub date_entered: Date,
    /// Date a cow left the herd
    pub date_culled: Date,

    /// Breeding values in the configured component order
    pub breeding_value: DVector<f64>,
    /// Residuals in the configured trait order
    pub residual: DVector<f64>,
    pub composition: BreedComposition,
    pub records: Vec<BreedingRecord>,

    /// Monthly feed, birth to weaning
    pub aum_to_weaning: Vec<AumEntry>,
    /// Monthly feed, weaning through backgrounding
    pub aum_background: Vec<AumEntry>,
    /// Monthly cow maintenance and cull-period feed
    pub aum_maintenance: Vec<AumEntry>,

    /// Total feedlot feed consumed, terminal endpoints only
    pub feedlot_intake: f64,
    /// Live weight at slaughter
    pub harvest_weight: f64,
    pub carcass_weight: f64,
    pub marbling_score: f64,
    pub backfat_thickness: f64,
    pub ribeye_area: f64,
}

impl Animal {
    /// A new animal with empty genetics and history; the registry
    /// assigns the final id on insert.
    pub fn new(sex: Sex, herd: Arc<str>, birth_date: Date, year_born: i32) -> Self {
        Self {
            id: 0,
            sire: 0,
            dam: 0,
            sex,
            birth_date,
            year_born,
            death_date: 0,
            active: false,
            herd,
            date_entered: 0,
            date_culled: 0,
            breeding_value: DVector::zeros(0),
            residual: DVector::zeros(0),
            composition: BreedComposition::new(),
            records: Vec::new(),
            aum_to_weaning: Vec::new(),
            aum_background: Vec::new(),
            aum_maintenance: Vec::new(),
            feedlot_intake: 0.0,
            harvest_weight: 0.0,
            carcass_weight: 0.0,
            marbling_score: 0.0,
            backfat_thickness: 0.0,
            ribeye_area: 0.0,
        }
    }

    /// The most recent breeding record.
    #[inline]
    pub fn last_record(&self) -> Option<&BreedingRecord> {
        self.records.last()
    }

    #[inline]
    pub fn is_alive(&self) -> bool {
        self.death_date == 0
    }

    /// Breeding value at a genetic index; a missing component is a zero
    /// effect.
    #[inline]
    pub fn genetic_effect(&self, index: Option<usize>) -> f64 {
        match index {
            Some(i) => self.breeding_value[i],
            None => 0.0,
        }
    }

    /// Stored residual at a trait index.
    #[inline]
    pub fn residual_effect(&self, index: usize) -> f64 {
        self.residual[index]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::DVector;

    #[test]
    fn test_new_animal_defaults() {
        let a = Animal::new(Sex::Heifer, Arc::from("main"), -300, 0);
        assert_eq!(a.id, 0);
        assert_eq!(a.dam, 0);
        assert!(a.is_alive());
        assert!(!a.active);
        assert!(a.last_record().is_none());
    }

    #[test]
    fn test_genetic_effect_missing_component_is_zero() {
        let mut a = Animal::new(Sex::Cow, Arc::from("main"), 0, 1);
        a.breeding_value = DVector::from_vec(vec![3.0, -1.0]);
        assert_eq!(a.genetic_effect(Some(0)), 3.0);
        assert_eq!(a.genetic_effect(Some(1)), -1.0);
        assert_eq!(a.genetic_effect(None), 0.0);
    }

    #[test]
    fn test_death_date_marks_dead() {
        let mut a = Animal::new(Sex::Cow, Arc::from("main"), 0, 1);
        a.death_date = 500;
        assert!(!a.is_alive());
    }
}
