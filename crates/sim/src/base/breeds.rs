use std::collections::BTreeMap;

use rand::Rng;

use crate::errors::ConfigError;

/// Breed makeup of an animal: breed name to proportion, summing to 1.
///
/// An ordered map keeps composition iteration deterministic, so sums over
/// breeds reproduce bit-for-bit under a fixed seed.
pub type BreedComposition = BTreeMap<String, f64>;

/// Average of two parent compositions.
pub fn blend(sire: &BreedComposition, dam: &BreedComposition) -> BreedComposition {
    let mut out = BreedComposition::new();
    for (breed, p) in sire {
        *out.entry(breed.clone()).or_insert(0.0) += 0.5 * p;
    }
    for (breed, p) in dam {
        *out.entry(breed.clone()).or_insert(0.0) += 0.5 * p;
    }
    out
}

/// One class of a composition table: the cumulative share of the pool that
/// falls in this class or an earlier one, and the breed makeup of the class.
#[derive(Debug, Clone)]
pub struct CompositionRow {
    pub cumulative: f64,
    pub proportions: BreedComposition,
}

/// A pool's breed-composition classes (cow herd, bull battery, or current
/// calves), sampled by inverse CDF over the cumulative shares.
#[derive(Debug, Clone)]
pub struct CompositionTable {
    rows: Vec<CompositionRow>,
}

impl CompositionTable {
    /// Build from (percent-of-pool, "Breed,pct,Breed,pct,...") pairs.
    ///
    /// Pool percentages must accumulate to 100 and each row's breed
    /// percentages to 100, both within 0.1.
    pub fn from_pairs(name: &'static str, pairs: &[(f64, String)]) -> Result<Self, ConfigError> {
        let mut rows = Vec::with_capacity(pairs.len());
        let mut cumulative = 0.0;
        for (percent, breeds) in pairs {
            cumulative += percent / 100.0;
            let mut proportions = BreedComposition::new();
            let fields: Vec<&str> = breeds.split(',').map(str::trim).collect();
            if fields.len() < 2 || fields.len() % 2 != 0 {
                return Err(ConfigError::BadRow {
                    table: name,
                    row: breeds.clone(),
                });
            }
            for pair in fields.chunks(2) {
                let p = pair[1].parse::<f64>().map_err(|_| ConfigError::BadRow {
                    table: name,
                    row: breeds.clone(),
                })?;
                proportions.insert(pair[0].to_string(), p / 100.0);
            }
            let total: f64 = proportions.values().sum();
            if (total - 1.0).abs() > 1e-3 {
                return Err(ConfigError::BadProportion { what: name, total });
            }
            rows.push(CompositionRow {
                cumulative,
                proportions,
            });
        }
        if (cumulative - 1.0).abs() > 1e-3 {
            return Err(ConfigError::BadProportion {
                what: name,
                total: cumulative,
            });
        }
        Ok(Self { rows })
    }

    /// Draw a composition: the first class whose cumulative share covers a
    /// uniform draw. Each animal gets its own copy.
    pub fn sample<R: Rng>(&self, rng: &mut R) -> BreedComposition {
        let u: f64 = rng.random();
        for row in &self.rows {
            if u <= row.cumulative {
                return row.proportions.clone();
            }
        }
        // cumulative totals 1 within tolerance; a draw past the last row
        // lands in the final class
        self.rows
            .last()
            .map(|row| row.proportions.clone())
            .unwrap_or_default()
    }

    #[inline]
    pub fn rows(&self) -> &[CompositionRow] {
        &self.rows
    }

    /// Every breed named anywhere in the table.
    pub fn breed_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self
            .rows
            .iter()
            .flat_map(|row| row.proportions.keys().map(String::as_str))
            .collect();
        names.sort_unstable();
        names.dedup();
        names
    }
}
