use core::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::ConfigError;

/// Sex and herd role of an animal.
///
/// The single-letter codes ("M", "F", "C", "S") are the wire form used in
/// parameter rows and dump files. A heifer is a young female that has not
/// yet been selected into the cow herd; replacement promotes her to `Cow`,
/// and market males are `Steer` from birth.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Sex {
    /// Breeding male
    Bull,
    /// Young female not yet selected
    Heifer,
    /// Breeding female
    Cow,
    /// Market male
    Steer,
}

impl Sex {
    /// The single-letter code used in parameter rows and dumps.
    #[inline]
    pub const fn code(self) -> &'static str {
        match self {
            Self::Bull => "M",
            Self::Heifer => "F",
            Self::Cow => "C",
            Self::Steer => "S",
        }
    }

    /// Parse a single-letter code.
    #[inline]
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "M" | "m" => Some(Self::Bull),
            "F" | "f" => Some(Self::Heifer),
            "C" | "c" => Some(Self::Cow),
            "S" | "s" => Some(Self::Steer),
            _ => None,
        }
    }

    /// True for heifers and cows.
    #[inline]
    pub const fn is_female(self) -> bool {
        matches!(self, Self::Heifer | Self::Cow)
    }
}

impl FromStr for Sex {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_code(s.trim()).ok_or_else(|| ConfigError::BadRow {
            table: "sex code",
            row: s.to_string(),
        })
    }
}

impl fmt::Display for Sex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}
