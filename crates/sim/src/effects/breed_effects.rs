use std::collections::{BTreeMap, HashMap};

use crate::base::{Component, ComponentKey, CompositionTable, TraitCatalog};
use crate::errors::ConfigError;

/// Whether a breed-effect row deviates calves or cows, which picks the
/// composition pool it is zero-centered against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EffectScope {
    Cow,
    Calf,
}

/// Per-breed additive effects for one (trait, component).
#[derive(Debug, Clone)]
pub struct BreedEffectRow {
    pub scope: EffectScope,
    pub effects: BTreeMap<String, f64>,
}

/// Breed-of-origin effects, keyed by (trait, component).
///
/// Rows come in as deviations from an arbitrary base breed and are
/// re-centered at load so the configured calf or cow pool averages zero.
/// A breed absent from a row contributes nothing, matching the sparse
/// treatment of the other composition-weighted tables.
#[derive(Debug, Clone, Default)]
pub struct BreedEffectTable {
    rows: HashMap<ComponentKey, BreedEffectRow>,
}

impl BreedEffectTable {
    /// Parse a header row ("Trait,Effect,Type,Breed1,...") followed by
    /// value rows ("TRAIT,D|M,Cow|Calf,v1,...").
    pub fn from_rows(rows: &[String], catalog: &TraitCatalog) -> Result<Self, ConfigError> {
        let header = rows.first().ok_or(ConfigError::MissingKey("breedEffects"))?;
        let breeds: Vec<String> = header
            .split(',')
            .skip(3)
            .map(|b| b.trim().to_string())
            .collect();

        let mut table = HashMap::with_capacity(rows.len().saturating_sub(1));
        for row in &rows[1..] {
            let fields: Vec<&str> = row.split(',').map(str::trim).collect();
            if fields.len() < 3 {
                return Err(ConfigError::BadRow {
                    table: "breedEffects",
                    row: row.clone(),
                });
            }
            let trait_name = fields[0];
            if !catalog.has_trait(trait_name) {
                return Err(ConfigError::UnknownTrait(trait_name.to_string()));
            }
            let component: Component = fields[1].parse()?;
            let scope = if fields[2] == "Calf" {
                EffectScope::Calf
            } else {
                EffectScope::Cow
            };

            let mut effects = BTreeMap::new();
            for (j, value) in fields[3..].iter().enumerate() {
                let v = value.parse::<f64>().map_err(|_| ConfigError::BadRow {
                    table: "breedEffects",
                    row: row.clone(),
                })?;
                let breed = breeds.get(j).ok_or_else(|| ConfigError::BadRow {
                    table: "breedEffects",
                    row: row.clone(),
                })?;
                effects.insert(breed.clone(), v);
            }

            table.insert(
                ComponentKey::new(trait_name, component),
                BreedEffectRow { scope, effects },
            );
        }
        Ok(Self { rows: table })
    }

    /// Re-center every row so the pool it applies to averages zero:
    /// calf rows against the current-calves composition, cow rows
    /// against the foundation cow herd. Class weights use each row's
    /// running cumulative share.
    pub fn zero_center(&mut self, calves: &CompositionTable, cow_herd: &CompositionTable) {
        for row in self.rows.values_mut() {
            let pool = match row.scope {
                EffectScope::Calf => calves,
                EffectScope::Cow => cow_herd,
            };
            let mut adj = 0.0;
            for class in pool.rows() {
                for (breed, bp) in &class.proportions {
                    adj += class.cumulative
                        * bp
                        * row.effects.get(breed).copied().unwrap_or(0.0);
                }
            }
            for effect in row.effects.values_mut() {
                *effect -= adj;
            }
        }
    }

    /// The effect row for a (trait, component), if configured.
    #[inline]
    pub fn row(&self, trait_name: &str, component: Component) -> Option<&BreedEffectRow> {
        self.rows
            .get(&ComponentKey::new(trait_name, component))
    }
}
