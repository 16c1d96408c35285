use std::error;
use std::fmt;

use herdmev_sim::errors::{ConfigError, SimError};

/// Errors raised while loading index parameters or pricing a run.
///
/// Like the simulation's config errors, every loading variant is
/// fatal: a missing cost table would otherwise turn into a zero-cost
/// enterprise and a quietly wrong index.
#[derive(Debug)]
pub enum IndexError {
    /// IO error reading the index parameter file
    Io(std::io::Error),
    /// JSON deserialization error
    Json(serde_json::Error),
    /// A required key was absent for the configured sale endpoint
    MissingKey(&'static str),
    /// A CSV-style row did not have the expected field count or types
    BadRow { table: &'static str, row: String },
    /// Any other validation failure
    Invalid(String),
    /// A simulation error surfaced while pricing animals
    Sim(SimError),
}

impl fmt::Display for IndexError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "IO error: {e}"),
            Self::Json(e) => write!(f, "JSON error: {e}"),
            Self::MissingKey(key) => write!(f, "Missing required index parameter: {key}"),
            Self::BadRow { table, row } => {
                write!(f, "Malformed row in {table}: '{row}'")
            }
            Self::Invalid(msg) => write!(f, "Invalid index parameter: {msg}"),
            Self::Sim(e) => write!(f, "Simulation error: {e}"),
        }
    }
}

impl error::Error for IndexError {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::Json(e) => Some(e),
            Self::Sim(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for IndexError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<serde_json::Error> for IndexError {
    fn from(e: serde_json::Error) -> Self {
        Self::Json(e)
    }
}

impl From<SimError> for IndexError {
    fn from(e: SimError) -> Self {
        Self::Sim(e)
    }
}

impl From<ConfigError> for IndexError {
    fn from(e: ConfigError) -> Self {
        Self::Sim(SimError::Config(e))
    }
}
