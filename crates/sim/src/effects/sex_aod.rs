use std::collections::HashMap;

use crate::base::{BreedComposition, Sex};
use crate::errors::ConfigError;

/// BIF age-of-dam class for a dam age in days at the animal's birth:
/// 0 = 2-year-old, 1 = 3, 2 = 4, 3 = 5 through 9, 4 = 10 and older.
///
/// Ages outside the 2-year-old lower bound also land in class 4.
#[inline]
pub fn aod_class(dam_age_days: i32) -> u8 {
    match dam_age_days {
        639..=1003 => 0,
        1004..=1369 => 1,
        1370..=1734 => 2,
        1735..=3560 => 3,
        _ => 4,
    }
}

/// Age-of-dam class when the dam may be unknown; unknown dams are
/// treated as mature (class 3).
#[inline]
pub fn aod_class_of(dam_age_days: Option<i32>) -> u8 {
    match dam_age_days {
        Some(age) => aod_class(age),
        None => 3,
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct SexAodKey {
    breed: String,
    trait_name: String,
    sex: Sex,
    aod: u8,
}

/// Additive sex x age-of-dam adjustments per breed and trait.
///
/// The table is sparse: combinations with no configured row adjust by
/// zero. Rows carry one value per age class, class index following
/// column order.
#[derive(Debug, Default)]
pub struct SexAodTable {
    values: HashMap<SexAodKey, f64>,
}

impl SexAodTable {
    /// Parse "breed,trait,sex,v0,v1,..." rows; the k-th value column is
    /// age class k.
    pub fn from_rows(rows: &[String]) -> Result<Self, ConfigError> {
        let mut values = HashMap::new();
        for row in rows {
            let fields: Vec<&str> = row.split(',').map(str::trim).collect();
            if fields.len() < 4 {
                return Err(ConfigError::BadRow {
                    table: "breedTraitSexAod",
                    row: row.clone(),
                });
            }
            let breed = fields[0].to_string();
            let trait_name = fields[1].to_string();
            let sex: Sex = fields[2].parse()?;
            for (k, value) in fields[3..].iter().enumerate() {
                let v = value.parse::<f64>().map_err(|_| ConfigError::BadRow {
                    table: "breedTraitSexAod",
                    row: row.clone(),
                })?;
                values.insert(
                    SexAodKey {
                        breed: breed.clone(),
                        trait_name: trait_name.clone(),
                        sex,
                        aod: k as u8,
                    },
                    v,
                );
            }
        }
        Ok(Self { values })
    }

    /// The adjustment for one breed, zero when unconfigured.
    #[inline]
    pub fn value(&self, breed: &str, trait_name: &str, sex: Sex, aod: u8) -> f64 {
        self.values
            .get(&SexAodKey {
                breed: breed.to_string(),
                trait_name: trait_name.to_string(),
                sex,
                aod,
            })
            .copied()
            .unwrap_or(0.0)
    }

    /// Composition-weighted adjustment across an animal's breeds.
    pub fn effect(&self, composition: &BreedComposition, trait_name: &str, sex: Sex, aod: u8) -> f64 {
        composition
            .iter()
            .map(|(breed, p)| p * self.value(breed, trait_name, sex, aod))
            .sum()
    }
}
