use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Mutex;

use tracing::warn;

use crate::base::{BreedComposition, Component, ComponentKey};
use crate::errors::ConfigError;

/// F1 heterosis values between breed classes.
///
/// Breeds map to a class code; values are keyed by "AxB" cross codes. A
/// lookup tries the configured order first and falls back to the reversed
/// code, warning once per class pair when the fallback is taken. A pair
/// missing in both orders is a configuration hole, caught eagerly at load
/// by `validate_coverage`.
#[derive(Debug)]
pub struct HeterosisTable {
    codes: BTreeMap<String, String>,
    values: HashMap<ComponentKey, HashMap<String, f64>>,
    warned: Mutex<HashSet<(String, String)>>,
}

impl HeterosisTable {
    /// Parse "Breed,Code" rows and a value block whose first row is the
    /// header ("Trait,Component,AxA,AxB,...") naming the cross-code
    /// columns.
    pub fn from_rows(code_rows: &[String], value_rows: &[String]) -> Result<Self, ConfigError> {
        let mut codes = BTreeMap::new();
        for row in code_rows {
            let mut parts = row.splitn(2, ',');
            match (parts.next(), parts.next()) {
                (Some(breed), Some(code)) => {
                    codes.insert(breed.trim().to_string(), code.trim().to_string());
                }
                _ => {
                    return Err(ConfigError::BadRow {
                        table: "heterosisCodes",
                        row: row.clone(),
                    })
                }
            }
        }

        let header = value_rows
            .first()
            .ok_or(ConfigError::MissingKey("heterosisValues"))?;
        let cross_classes: Vec<String> = header
            .split(',')
            .skip(2)
            .map(|c| c.trim().to_string())
            .collect();

        let mut values = HashMap::with_capacity(value_rows.len().saturating_sub(1));
        for row in &value_rows[1..] {
            let fields: Vec<&str> = row.split(',').map(str::trim).collect();
            if fields.len() < 2 + cross_classes.len() {
                return Err(ConfigError::BadRow {
                    table: "heterosisValues",
                    row: row.clone(),
                });
            }
            let key = ComponentKey::new(fields[0], fields[1].parse::<Component>()?);
            let mut by_cross = HashMap::with_capacity(cross_classes.len());
            for (k, cross) in cross_classes.iter().enumerate() {
                let v = fields[2 + k]
                    .parse::<f64>()
                    .map_err(|_| ConfigError::BadRow {
                        table: "heterosisValues",
                        row: row.clone(),
                    })?;
                by_cross.insert(cross.clone(), v);
            }
            values.insert(key, by_cross);
        }

        Ok(Self {
            codes,
            values,
            warned: Mutex::new(HashSet::new()),
        })
    }

    /// Whether a value row exists for this (trait, component).
    #[inline]
    pub fn has_row(&self, trait_name: &str, component: Component) -> bool {
        self.values
            .contains_key(&ComponentKey::new(trait_name, component))
    }

    fn class_of(&self, breed: &str) -> Result<&str, ConfigError> {
        self.codes
            .get(breed)
            .map(String::as_str)
            .ok_or_else(|| ConfigError::Invalid(format!("no heterosis code for breed {breed}")))
    }

    /// The F1 value for a sire-breed x dam-breed cross of one trait
    /// component, trying the reversed class order as a fallback.
    pub fn cross_value(
        &self,
        trait_name: &str,
        component: Component,
        sire_breed: &str,
        dam_breed: &str,
    ) -> Result<f64, ConfigError> {
        let sire_class = self.class_of(sire_breed)?;
        let dam_class = self.class_of(dam_breed)?;
        let row = self
            .values
            .get(&ComponentKey::new(trait_name, component))
            .ok_or_else(|| ConfigError::UnknownComponent {
                trait_name: trait_name.to_string(),
                component: component.code().to_string(),
            })?;

        if let Some(v) = row.get(&format!("{sire_class}x{dam_class}")) {
            return Ok(*v);
        }
        if let Some(v) = row.get(&format!("{dam_class}x{sire_class}")) {
            let pair = (sire_class.to_string(), dam_class.to_string());
            let mut warned = self.warned.lock().unwrap_or_else(|e| e.into_inner());
            if warned.insert(pair) {
                warn!(
                    sire_class,
                    dam_class,
                    trait_name,
                    "heterosis value found only in reversed class order"
                );
            }
            return Ok(*v);
        }
        Err(ConfigError::MissingHeterosis {
            sire_class: sire_class.to_string(),
            dam_class: dam_class.to_string(),
        })
    }

    /// Composition-weighted heterosis over all differing breed pairs.
    pub fn pairwise(
        &self,
        trait_name: &str,
        component: Component,
        sire: &BreedComposition,
        dam: &BreedComposition,
    ) -> Result<f64, ConfigError> {
        let mut effect = 0.0;
        for (sire_breed, sp) in sire {
            for (dam_breed, dp) in dam {
                if sire_breed != dam_breed {
                    effect += sp * dp * self.cross_value(trait_name, component, sire_breed, dam_breed)?;
                }
            }
        }
        Ok(effect)
    }

    /// Check that every breed has a class code and that every value row
    /// covers every distinct-breed pair in at least one order.
    pub fn validate_coverage(&self, breeds: &[&str]) -> Result<(), ConfigError> {
        for breed in breeds {
            self.class_of(breed)?;
        }
        for key in self.values.keys() {
            for (i, sire_breed) in breeds.iter().enumerate() {
                for dam_breed in &breeds[i + 1..] {
                    self.cross_value(&key.trait_name, key.component, sire_breed, dam_breed)?;
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_table() -> HeterosisTable {
        HeterosisTable::from_rows(
            &["Angus,B".to_string(), "Hereford,B".to_string(), "Brahman,Z".to_string()],
            &[
                "Trait,Component,BxB,BxZ".to_string(),
                "WW,D,20.0,40.0".to_string(),
                "WW,M,8.0,16.0".to_string(),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_cross_value_direct_and_reversed() {
        let table = create_test_table();
        assert_eq!(
            table
                .cross_value("WW", Component::Direct, "Angus", "Hereford")
                .unwrap(),
            20.0
        );
        // ZxB is absent; the reversed BxZ row serves it
        assert_eq!(
            table
                .cross_value("WW", Component::Direct, "Brahman", "Angus")
                .unwrap(),
            40.0
        );
    }

    #[test]
    fn test_missing_pair_is_an_error() {
        let table = HeterosisTable::from_rows(
            &["Angus,B".to_string(), "Brahman,Z".to_string()],
            &["Trait,Component,BxB".to_string(), "WW,D,20.0".to_string()],
        )
        .unwrap();
        let err = table
            .cross_value("WW", Component::Direct, "Angus", "Brahman")
            .unwrap_err();
        assert!(matches!(err, ConfigError::MissingHeterosis { .. }));
        assert!(table.validate_coverage(&["Angus", "Brahman"]).is_err());
    }

    #[test]
    fn test_pairwise_skips_same_breed() {
        let table = create_test_table();
        let pure: BreedComposition = [("Angus".to_string(), 1.0)].into_iter().collect();
        assert_eq!(
            table
                .pairwise("WW", Component::Direct, &pure, &pure)
                .unwrap(),
            0.0
        );

        let cross: BreedComposition = [
            ("Angus".to_string(), 0.5),
            ("Hereford".to_string(), 0.5),
        ]
        .into_iter()
        .collect();
        // only the Angus x Hereford and Hereford x Angus pairs differ
        let effect = table
            .pairwise("WW", Component::Direct, &cross, &cross)
            .unwrap();
        assert!((effect - 2.0 * 0.25 * 20.0).abs() < 1e-12);
    }

    #[test]
    fn test_validate_coverage_accepts_complete_table() {
        let table = create_test_table();
        assert!(table
            .validate_coverage(&["Angus", "Hereford", "Brahman"])
            .is_ok());
    }

    #[test]
    fn test_has_row() {
        let table = create_test_table();
        assert!(table.has_row("WW", Component::Maternal));
        assert!(!table.has_row("BW", Component::Direct));
    }
}
