//! Sale price and carcass grid tables.
//!
//! Prices arrive as CSV-style rows in dollars per hundredweight and
//! are stored per pound. Bracket rows are keyed by trait, sex, and a
//! weight range; the endpoint evaluators either look a bracket up
//! exactly or scan for the bracket covering a weight.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use tracing::warn;

use herdmev_sim::base::Sex;

use crate::errors::IndexError;

/// One price bracket: dollars per pound for a trait and sex between
/// two weights.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceEntry {
    pub trait_name: String,
    pub sex: Sex,
    pub min_weight: f64,
    pub max_weight: f64,
    /// $/lb, converted from the configured $/cwt
    pub price: f64,
}

/// The full sale price schedule, scanned in row order.
#[derive(Debug, Clone, Default)]
pub struct PriceTable {
    entries: Vec<PriceEntry>,
}

impl PriceTable {
    /// Parse "TRAIT,SEX,min,max,price" rows, price in $/cwt.
    pub fn from_rows(rows: &[String]) -> Result<Self, IndexError> {
        let mut entries = Vec::with_capacity(rows.len());
        for row in rows {
            let bad = || IndexError::BadRow {
                table: "traitSexPricePerCwt",
                row: row.clone(),
            };
            let fields: Vec<&str> = row.split(',').map(str::trim).collect();
            if fields.len() != 5 {
                return Err(bad());
            }
            let sex = Sex::from_code(fields[1]).ok_or_else(bad)?;
            let min_weight = fields[2].parse::<f64>().map_err(|_| bad())?;
            let max_weight = fields[3].parse::<f64>().map_err(|_| bad())?;
            let per_cwt = fields[4].parse::<f64>().map_err(|_| bad())?;
            entries.push(PriceEntry {
                trait_name: fields[0].to_string(),
                sex,
                min_weight,
                max_weight,
                price: per_cwt / 100.0,
            });
        }
        Ok(Self { entries })
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether any row prices the given trait.
    pub fn covers(&self, trait_name: &str) -> bool {
        self.entries.iter().any(|e| e.trait_name == trait_name)
    }

    /// $/lb for an exact bracket. An animal priced into a bracket the
    /// schedule does not carry sells for nothing, loudly.
    pub fn bracket(&self, trait_name: &str, sex: Sex, min_weight: f64, max_weight: f64) -> f64 {
        match self.entries.iter().find(|e| {
            e.trait_name == trait_name
                && e.sex == sex
                && e.min_weight == min_weight
                && e.max_weight == max_weight
        }) {
            Some(e) => e.price,
            None => {
                warn!(
                    trait_name,
                    sex = %sex,
                    min_weight,
                    max_weight,
                    "no price bracket; selling at zero"
                );
                0.0
            }
        }
    }

    /// $/lb from the first bracket covering a weight, min inclusive,
    /// max exclusive.
    pub fn at_weight(&self, trait_name: &str, sex: Sex, weight: f64) -> f64 {
        match self
            .entries
            .iter()
            .find(|e| {
                e.trait_name == trait_name
                    && e.sex == sex
                    && weight >= e.min_weight
                    && weight < e.max_weight
            }) {
            Some(e) => e.price,
            None => {
                warn!(
                    trait_name,
                    sex = %sex,
                    weight,
                    "no price bracket covers this weight; selling at zero"
                );
                0.0
            }
        }
    }
}

/// USDA-style carcass quality grades, plus the branded-program row of
/// the grid schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QualityGrade {
    Prime,
    Choice,
    Select,
    Standard,
    /// Certified-program premium schedule, not an assigned grade
    Program,
}

impl QualityGrade {
    pub const fn name(&self) -> &'static str {
        match self {
            QualityGrade::Prime => "Prime",
            QualityGrade::Choice => "Choice",
            QualityGrade::Select => "Select",
            QualityGrade::Standard => "Standard",
            QualityGrade::Program => "Program",
        }
    }

    /// Grade assigned from a marbling score.
    pub fn from_marbling(score: f64) -> Self {
        if score >= 8.0 {
            QualityGrade::Prime
        } else if score >= 5.0 {
            QualityGrade::Choice
        } else if score >= 4.0 {
            QualityGrade::Select
        } else {
            QualityGrade::Standard
        }
    }
}

impl fmt::Display for QualityGrade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for QualityGrade {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "Prime" => Ok(QualityGrade::Prime),
            "Choice" => Ok(QualityGrade::Choice),
            "Select" => Ok(QualityGrade::Select),
            "Standard" => Ok(QualityGrade::Standard),
            "Program" => Ok(QualityGrade::Program),
            other => Err(format!("unknown quality grade: {other}")),
        }
    }
}

/// Premiums and discounts over the base carcass price, keyed by
/// quality grade and yield grade 1 through 5.
#[derive(Debug, Clone, Default)]
pub struct GridSchedule {
    premiums: HashMap<(QualityGrade, i32), f64>,
}

impl GridSchedule {
    /// Parse "GRADE,yg1,yg2,yg3,yg4,yg5" rows, values in $/cwt.
    pub fn from_rows(rows: &[String]) -> Result<Self, IndexError> {
        let mut premiums = HashMap::new();
        for row in rows {
            let bad = || IndexError::BadRow {
                table: "gridPremiums",
                row: row.clone(),
            };
            let fields: Vec<&str> = row.split(',').map(str::trim).collect();
            if fields.len() != 6 {
                return Err(bad());
            }
            let grade: QualityGrade = fields[0].parse().map_err(|_| bad())?;
            for yield_grade in 1..=5 {
                let per_cwt = fields[yield_grade as usize].parse::<f64>().map_err(|_| bad())?;
                premiums.insert((grade, yield_grade), per_cwt / 100.0);
            }
        }
        Ok(Self { premiums })
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.premiums.is_empty()
    }

    /// $/lb adjustment for a grade pair; zero when the schedule has no
    /// such cell. Out-of-range yield grades miss by construction.
    pub fn premium(&self, quality: QualityGrade, yield_grade: i32) -> f64 {
        self.premiums
            .get(&(quality, yield_grade))
            .copied()
            .unwrap_or(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_price_rows() -> Vec<String> {
        vec![
            "WW,S,0,400,190.00".to_string(),
            "WW,S,400,500,185.00".to_string(),
            "WW,S,500,600,175.00".to_string(),
            "WW,S,600,700,165.00".to_string(),
            "WW,S,700,800,155.00".to_string(),
            "WW,S,800,9999,150.00".to_string(),
            "WW,F,0,400,170.00".to_string(),
            "WW,F,400,500,165.00".to_string(),
            "WW,F,500,600,160.00".to_string(),
            "WW,F,600,700,155.00".to_string(),
            "WW,F,700,9999,150.00".to_string(),
            "MW,C,0,9999,70.00".to_string(),
        ]
    }

    #[test]
    fn test_rows_convert_cwt_to_per_pound() {
        let table = PriceTable::from_rows(&test_price_rows()).unwrap();
        assert_eq!(table.len(), 12);
        let p = table.bracket("WW", Sex::Steer, 400.0, 500.0);
        assert!((p - 1.85).abs() < 1e-12);
    }

    #[test]
    fn test_bracket_requires_exact_bounds() {
        let table = PriceTable::from_rows(&test_price_rows()).unwrap();
        assert_eq!(table.bracket("WW", Sex::Steer, 410.0, 500.0), 0.0);
        assert_eq!(table.bracket("WW", Sex::Heifer, 400.0, 500.0), 1.65);
        assert_eq!(table.bracket("MW", Sex::Cow, 0.0, 9999.0), 0.70);
    }

    #[test]
    fn test_missing_bracket_sells_at_zero() {
        let table = PriceTable::from_rows(&test_price_rows()).unwrap();
        assert_eq!(table.bracket("FC", Sex::Steer, 0.0, 9999.0), 0.0);
    }

    #[test]
    fn test_at_weight_scan_is_min_inclusive() {
        let table = PriceTable::from_rows(&test_price_rows()).unwrap();
        assert_eq!(table.at_weight("WW", Sex::Steer, 399.9), 1.90);
        assert_eq!(table.at_weight("WW", Sex::Steer, 400.0), 1.85);
        assert_eq!(table.at_weight("WW", Sex::Steer, 499.99), 1.85);
        assert_eq!(table.at_weight("WW", Sex::Steer, 850.0), 1.50);
        assert_eq!(table.at_weight("WW", Sex::Steer, 20000.0), 0.0);
    }

    #[test]
    fn test_covers_by_trait() {
        let table = PriceTable::from_rows(&test_price_rows()).unwrap();
        assert!(table.covers("WW"));
        assert!(table.covers("MW"));
        assert!(!table.covers("SC"));
    }

    #[test]
    fn test_bad_price_row_is_rejected() {
        let rows = vec!["WW,S,0,400".to_string()];
        assert!(matches!(
            PriceTable::from_rows(&rows),
            Err(IndexError::BadRow { table: "traitSexPricePerCwt", .. })
        ));
        let rows = vec!["WW,X,0,400,100.0".to_string()];
        assert!(PriceTable::from_rows(&rows).is_err());
    }

    fn test_grid_rows() -> Vec<String> {
        vec![
            "Prime,15.00,14.00,12.00,2.00,-8.00".to_string(),
            "Choice,4.00,3.00,0.00,-10.00,-15.00".to_string(),
            "Select,-8.00,-9.00,-11.00,-20.00,-25.00".to_string(),
            "Standard,-15.00,-16.00,-18.00,-28.00,-33.00".to_string(),
            "Program,4.00,4.00,3.00,0.00,0.00".to_string(),
        ]
    }

    #[test]
    fn test_grid_parses_five_yield_columns() {
        let grid = GridSchedule::from_rows(&test_grid_rows()).unwrap();
        assert!((grid.premium(QualityGrade::Prime, 1) - 0.15).abs() < 1e-12);
        assert!((grid.premium(QualityGrade::Choice, 4) + 0.10).abs() < 1e-12);
        assert!((grid.premium(QualityGrade::Program, 3) - 0.03).abs() < 1e-12);
    }

    #[test]
    fn test_grid_misses_are_zero() {
        let grid = GridSchedule::from_rows(&test_grid_rows()).unwrap();
        assert_eq!(grid.premium(QualityGrade::Prime, 0), 0.0);
        assert_eq!(grid.premium(QualityGrade::Prime, 6), 0.0);
    }

    #[test]
    fn test_marbling_to_grade_thresholds() {
        assert_eq!(QualityGrade::from_marbling(8.0), QualityGrade::Prime);
        assert_eq!(QualityGrade::from_marbling(7.9), QualityGrade::Choice);
        assert_eq!(QualityGrade::from_marbling(5.0), QualityGrade::Choice);
        assert_eq!(QualityGrade::from_marbling(4.5), QualityGrade::Select);
        assert_eq!(QualityGrade::from_marbling(3.9), QualityGrade::Standard);
    }
}
