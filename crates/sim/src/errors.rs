use std::error;
use std::fmt;

/// Errors raised while loading or validating simulation parameters.
///
/// Every variant is fatal: the tables a run depends on are built once,
/// up front, and a hole in them would otherwise surface as a silent
/// zero deep inside a phenotype.
#[derive(Debug)]
pub enum ConfigError {
    /// IO error reading a parameter file
    Io(std::io::Error),
    /// JSON deserialization error
    Json(serde_json::Error),
    /// A required key was absent from the parameter file
    MissingKey(&'static str),
    /// A CSV-style row did not have the expected field count or types
    BadRow { table: &'static str, row: String },
    /// A flat matrix was not square
    MatrixShape { name: &'static str, len: usize },
    /// A covariance matrix had no Cholesky factorization
    NotPositiveDefinite(&'static str),
    /// A trait name was not in the configured trait list
    UnknownTrait(String),
    /// A (trait, component) pair was not in the configured component ordering
    UnknownComponent { trait_name: String, component: String },
    /// No heterosis value for a breed-class pair in either order
    MissingHeterosis { sire_class: String, dam_class: String },
    /// A proportion vector did not sum to 1
    BadProportion { what: &'static str, total: f64 },
    /// Any other validation failure
    Invalid(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "IO error: {e}"),
            Self::Json(e) => write!(f, "JSON error: {e}"),
            Self::MissingKey(key) => write!(f, "Missing required parameter: {key}"),
            Self::BadRow { table, row } => {
                write!(f, "Malformed row in {table}: '{row}'")
            }
            Self::MatrixShape { name, len } => {
                write!(f, "Matrix {name} has {len} entries, which is not a square")
            }
            Self::NotPositiveDefinite(name) => {
                write!(f, "Matrix {name} is not positive definite")
            }
            Self::UnknownTrait(name) => write!(f, "Unknown trait: {name}"),
            Self::UnknownComponent {
                trait_name,
                component,
            } => {
                write!(f, "Unknown genetic component: {trait_name},{component}")
            }
            Self::MissingHeterosis {
                sire_class,
                dam_class,
            } => {
                write!(
                    f,
                    "No heterosis value for breed classes {sire_class}x{dam_class} in either order"
                )
            }
            Self::BadProportion { what, total } => {
                write!(f, "{what} proportions sum to {total}, expected 1.0")
            }
            Self::Invalid(msg) => write!(f, "Invalid parameter: {msg}"),
        }
    }
}

impl error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::Json(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for ConfigError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(e: serde_json::Error) -> Self {
        Self::Json(e)
    }
}

/// Errors that can occur while a simulation is running.
#[derive(Debug)]
pub enum SimError {
    /// An animal id did not resolve in the registry
    UnknownAnimal(u32),
    /// A herd had no active bulls when a sire was needed
    NoActiveBulls(String),
    /// An animal was expected to carry at least one breeding record
    NoBreedingRecord(u32),
    /// A phenotype required data that is unavailable for this animal
    PhenotypeUnavailable { animal: u32, trait_name: String },
    /// A configuration error surfaced after load
    Config(ConfigError),
}

impl fmt::Display for SimError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownAnimal(id) => write!(f, "No animal with id {id} in the registry"),
            Self::NoActiveBulls(herd) => {
                write!(f, "Herd '{herd}' has no active bulls to breed to")
            }
            Self::NoBreedingRecord(id) => {
                write!(f, "Animal {id} has no breeding records")
            }
            Self::PhenotypeUnavailable { animal, trait_name } => {
                write!(f, "Phenotype {trait_name} unavailable for animal {animal}")
            }
            Self::Config(e) => write!(f, "Configuration error: {e}"),
        }
    }
}

impl error::Error for SimError {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self {
            Self::Config(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ConfigError> for SimError {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}
