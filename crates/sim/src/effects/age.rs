use std::collections::HashMap;

use crate::errors::ConfigError;

/// Linear age adjustment for one trait: units per day of deviation,
/// plus the reference age some evaluators deviate from.
#[derive(Debug, Clone, Copy, Default)]
pub struct AgeEffect {
    pub slope: f64,
    pub reference_age: f64,
}

/// Per-trait age slopes, sparse: traits without a row get a zero slope.
#[derive(Debug, Default)]
pub struct AgeEffectTable {
    entries: HashMap<String, AgeEffect>,
}

impl AgeEffectTable {
    /// Parse "TRAIT,slope,referenceAge" rows.
    pub fn from_rows(rows: &[String]) -> Result<Self, ConfigError> {
        let mut entries = HashMap::with_capacity(rows.len());
        for row in rows {
            let fields: Vec<&str> = row.split(',').map(str::trim).collect();
            if fields.len() != 3 {
                return Err(ConfigError::BadRow {
                    table: "traitAgeEffects",
                    row: row.clone(),
                });
            }
            let slope = fields[1].parse::<f64>();
            let reference_age = fields[2].parse::<f64>();
            match (slope, reference_age) {
                (Ok(slope), Ok(reference_age)) => {
                    entries.insert(
                        fields[0].to_string(),
                        AgeEffect {
                            slope,
                            reference_age,
                        },
                    );
                }
                _ => {
                    return Err(ConfigError::BadRow {
                        table: "traitAgeEffects",
                        row: row.clone(),
                    })
                }
            }
        }
        Ok(Self { entries })
    }

    /// The entry for a trait, zero when unconfigured.
    #[inline]
    pub fn get(&self, trait_name: &str) -> AgeEffect {
        self.entries.get(trait_name).copied().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rows_parse() {
        let table = AgeEffectTable::from_rows(&[
            "STAY,0.0007,365.0".to_string(),
            "MW,0.4,1735.0".to_string(),
        ])
        .unwrap();
        assert_eq!(table.get("STAY").slope, 0.0007);
        assert_eq!(table.get("MW").reference_age, 1735.0);
    }

    #[test]
    fn test_missing_trait_is_zero() {
        let table = AgeEffectTable::from_rows(&[]).unwrap();
        let e = table.get("WW");
        assert_eq!(e.slope, 0.0);
        assert_eq!(e.reference_age, 0.0);
    }

    #[test]
    fn test_malformed_row_rejected() {
        assert!(AgeEffectTable::from_rows(&["STAY,0.0007".to_string()]).is_err());
    }
}
