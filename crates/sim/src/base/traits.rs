use core::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::ConfigError;

/// Trait names with hardwired roles in the lifecycle. Any further traits
/// in the configuration ride along in the covariance structure without
/// special handling.
pub mod names {
    pub const BIRTH_WEIGHT: &str = "BW";
    pub const WEANING_WEIGHT: &str = "WW";
    pub const YEARLING_WEIGHT: &str = "YW";
    pub const MATURE_WEIGHT: &str = "MW";
    pub const STAYABILITY: &str = "STAY";
    pub const HEIFER_PREGNANCY: &str = "HP";
    pub const CALVING_DIFFICULTY: &str = "CD";
    pub const FEED_INTAKE: &str = "FI";
    pub const HOT_CARCASS_WEIGHT: &str = "HCW";
    pub const MARBLING: &str = "MS";
    pub const BACKFAT: &str = "FAT";
    pub const RIBEYE_AREA: &str = "REA";
}

/// Genetic component of a trait.
///
/// Direct effects are expressed by the animal itself; maternal effects are
/// expressed through the dam (milk, mothering ability) and enter a calf's
/// phenotype at half the dam's breeding value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Component {
    Direct,
    Maternal,
}

impl Component {
    /// The single-letter code used in parameter rows ("D" or "M").
    #[inline]
    pub const fn code(self) -> &'static str {
        match self {
            Self::Direct => "D",
            Self::Maternal => "M",
        }
    }
}

impl FromStr for Component {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "D" | "d" => Ok(Self::Direct),
            "M" | "m" => Ok(Self::Maternal),
            other => Err(ConfigError::BadRow {
                table: "component code",
                row: other.to_string(),
            }),
        }
    }
}

impl fmt::Display for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// A (trait, component) pair naming one entry of a breeding-value vector.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ComponentKey {
    pub trait_name: String,
    pub component: Component,
}

impl ComponentKey {
    pub fn new(trait_name: impl Into<String>, component: Component) -> Self {
        Self {
            trait_name: trait_name.into(),
            component,
        }
    }
}

impl fmt::Display for ComponentKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.trait_name, self.component)
    }
}

/// The configured trait list and genetic-component ordering.
///
/// Trait order fixes the layout of residual vectors and the residual
/// covariance matrix; component order fixes the layout of breeding-value
/// vectors and the genetic covariance matrix. Both orders come straight
/// from the parameter file and never change after load.
#[derive(Debug, Clone)]
pub struct TraitCatalog {
    traits: Vec<(String, f64)>,
    components: Vec<ComponentKey>,
}

impl TraitCatalog {
    /// Build from "NAME,MEAN" trait rows and "TRAIT,D|M" component rows.
    ///
    /// Every component row must name a trait from the trait rows.
    pub fn from_rows(trait_rows: &[String], component_rows: &[String]) -> Result<Self, ConfigError> {
        let mut traits = Vec::with_capacity(trait_rows.len());
        for row in trait_rows {
            let mut parts = row.splitn(2, ',');
            let name = parts.next().unwrap_or("").trim();
            let mean = parts
                .next()
                .and_then(|m| m.trim().parse::<f64>().ok())
                .ok_or_else(|| ConfigError::BadRow {
                    table: "traits",
                    row: row.clone(),
                })?;
            if name.is_empty() {
                return Err(ConfigError::BadRow {
                    table: "traits",
                    row: row.clone(),
                });
            }
            traits.push((name.to_string(), mean));
        }

        let mut components = Vec::with_capacity(component_rows.len());
        for row in component_rows {
            let mut parts = row.splitn(2, ',');
            let (name, code) = match (parts.next(), parts.next()) {
                (Some(n), Some(c)) => (n.trim(), c),
                _ => {
                    return Err(ConfigError::BadRow {
                        table: "components",
                        row: row.clone(),
                    })
                }
            };
            if !traits.iter().any(|(t, _)| t == name) {
                return Err(ConfigError::UnknownTrait(name.to_string()));
            }
            components.push(ComponentKey::new(name, code.parse()?));
        }

        Ok(Self { traits, components })
    }

    /// Number of traits; the length of residual vectors.
    #[inline]
    pub fn n_traits(&self) -> usize {
        self.traits.len()
    }

    /// Number of genetic components; the length of breeding-value vectors.
    #[inline]
    pub fn n_components(&self) -> usize {
        self.components.len()
    }

    /// The configured mean of a trait.
    #[inline]
    pub fn mean(&self, trait_name: &str) -> Option<f64> {
        self.traits
            .iter()
            .find(|(name, _)| name == trait_name)
            .map(|(_, mean)| *mean)
    }

    /// Position of a trait in the residual ordering.
    #[inline]
    pub fn residual_index(&self, trait_name: &str) -> Option<usize> {
        self.traits.iter().position(|(name, _)| name == trait_name)
    }

    /// Position of a (trait, component) pair in the genetic ordering.
    ///
    /// `None` is a legitimate answer for traits without a maternal
    /// component; callers treat the missing entry as a zero effect.
    #[inline]
    pub fn genetic_index(&self, trait_name: &str, component: Component) -> Option<usize> {
        self.components
            .iter()
            .position(|key| key.trait_name == trait_name && key.component == component)
    }

    /// The ordered component keys.
    #[inline]
    pub fn components(&self) -> &[ComponentKey] {
        &self.components
    }

    /// The ordered trait names.
    pub fn trait_names(&self) -> impl Iterator<Item = &str> {
        self.traits.iter().map(|(name, _)| name.as_str())
    }

    #[inline]
    pub fn has_trait(&self, trait_name: &str) -> bool {
        self.traits.iter().any(|(name, _)| name == trait_name)
    }
}
