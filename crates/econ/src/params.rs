//! Index parameter schema and table building.
//!
//! The index document names the sale endpoint, the components under
//! evaluation, and every price and cost schedule the evaluators need.
//! Like the master document it deserializes raw and is built into
//! validated tables up front; which keys are required depends on how
//! far past weaning the calf crop is carried.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use herdmev_sim::base::{trait_names, ComponentKey};
use herdmev_sim::simulation::{Bump, RunPlan, SaleEndpoint};

use crate::errors::IndexError;
use crate::prices::{GridSchedule, PriceTable};

/// Price-table trait labels for sales past weaning. Weaning and cull
/// sales price on the WW and MW traits directly.
pub mod price_traits {
    pub const BACKGROUND: &str = "BG";
    pub const FAT_CATTLE: &str = "FC";
    pub const SLAUGHTER: &str = "SC";
}

/// The economic index parameter document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexConfig {
    /// Free-text description, echoed in verbose output
    #[serde(default)]
    pub comment: Option<String>,
    pub sale_endpoint: SaleEndpoint,
    /// Terminal indexes sell every heifer and hold the herd age
    /// structure fixed
    #[serde(default)]
    pub index_terminal: bool,
    /// Annual discount rate applied from the first priced year
    pub discount_rate: f64,
    /// "TRAIT,D|M" rows naming the components the index spans
    pub index_components: Vec<String>,
    /// "TRAIT,SEX,minWt,maxWt,price" rows, price in $/cwt
    pub trait_sex_price_per_cwt: Vec<String>,
    /// Twelve monthly grazing costs in $/AUM, January first
    pub aum_cost: Vec<f64>,
    /// Monthly $/AUM during backgrounding; required past weaning
    #[serde(default)]
    pub background_aum_cost: Vec<f64>,
    /// Days fed between weaning and the next sale; required past
    /// weaning
    #[serde(default)]
    pub background_days: Option<f64>,
    /// Feedlot days; required for the fat and slaughter endpoints
    #[serde(default)]
    pub days_on_feed: Option<f64>,
    /// Feedlot feed $/lb of intake; required for the fat and slaughter
    /// endpoints
    #[serde(default)]
    pub feedlot_feed_cost: Option<f64>,
    /// "GRADE,yg1..yg5" rows in $/cwt; required for the slaughter
    /// endpoint
    #[serde(default)]
    pub grid_premiums: Vec<String>,
    /// Proportion of eligible carcasses accepted into the branded
    /// program
    #[serde(default)]
    pub proportion_in_program: f64,
}

impl IndexConfig {
    /// Read an index parameter document from a JSON file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, IndexError> {
        let file = File::open(path)?;
        let config: IndexConfig = serde_json::from_reader(BufReader::new(file))?;
        Ok(config)
    }

    /// Build and validate the pricing tables. Endpoints further along
    /// the chain pull in more required schedules.
    pub fn build(&self) -> Result<IndexTables, IndexError> {
        let endpoint = self.sale_endpoint;

        let mut components = Vec::with_capacity(self.index_components.len());
        for row in &self.index_components {
            let bad = || IndexError::BadRow {
                table: "indexComponents",
                row: row.clone(),
            };
            let fields: Vec<&str> = row.split(',').map(str::trim).collect();
            if fields.len() != 2 {
                return Err(bad());
            }
            let component = fields[1].parse().map_err(|_| bad())?;
            components.push(ComponentKey::new(fields[0], component));
        }

        let prices = PriceTable::from_rows(&self.trait_sex_price_per_cwt)?;
        let sale_trait = sale_trait_for(endpoint);
        if !prices.covers(sale_trait) {
            return Err(IndexError::Invalid(format!(
                "no {sale_trait} price rows for the {endpoint} endpoint"
            )));
        }

        if self.aum_cost.len() != 12 {
            return Err(IndexError::Invalid(format!(
                "aum_cost needs 12 monthly values, got {}",
                self.aum_cost.len()
            )));
        }

        let mut background_days = 0.0;
        let mut background_aum_cost = Vec::new();
        if endpoint.feeds_past_weaning() {
            background_days = self
                .background_days
                .ok_or(IndexError::MissingKey("background_days"))?;
            // Calf-feds still need one day on grass to post an
            // in-weight
            if background_days <= 0.0 {
                background_days = 1.0;
            }
            if self.background_aum_cost.is_empty() {
                return Err(IndexError::MissingKey("background_aum_cost"));
            }
            if self.background_aum_cost.len() != 12 {
                return Err(IndexError::Invalid(format!(
                    "background_aum_cost needs 12 monthly values, got {}",
                    self.background_aum_cost.len()
                )));
            }
            background_aum_cost = self.background_aum_cost.clone();
        }

        let mut days_on_feed = 0.0;
        let mut feedlot_feed_cost = 0.0;
        if endpoint.has_feedlot() {
            days_on_feed = self
                .days_on_feed
                .ok_or(IndexError::MissingKey("days_on_feed"))?;
            feedlot_feed_cost = self
                .feedlot_feed_cost
                .ok_or(IndexError::MissingKey("feedlot_feed_cost"))?;
        }

        let mut grid = GridSchedule::default();
        if endpoint == SaleEndpoint::SlaughterCattle {
            if self.grid_premiums.is_empty() {
                return Err(IndexError::MissingKey("grid_premiums"));
            }
            grid = GridSchedule::from_rows(&self.grid_premiums)?;
        }

        info!(
            endpoint = %endpoint,
            terminal = self.index_terminal,
            components = components.len(),
            price_rows = prices.len(),
            "index tables built"
        );

        Ok(IndexTables {
            endpoint,
            terminal: self.index_terminal,
            discount_rate: self.discount_rate,
            components,
            prices,
            grid,
            proportion_in_program: self.proportion_in_program,
            aum_cost: self.aum_cost.clone(),
            background_aum_cost,
            feedlot_feed_cost,
            background_days,
            days_on_feed,
        })
    }
}

const fn sale_trait_for(endpoint: SaleEndpoint) -> &'static str {
    match endpoint {
        SaleEndpoint::Weaning => trait_names::WEANING_WEIGHT,
        SaleEndpoint::Background => price_traits::BACKGROUND,
        SaleEndpoint::FatCattle => price_traits::FAT_CATTLE,
        SaleEndpoint::SlaughterCattle => price_traits::SLAUGHTER,
    }
}

/// Validated pricing tables and endpoint knobs for one index.
#[derive(Debug, Clone)]
pub struct IndexTables {
    pub endpoint: SaleEndpoint,
    pub terminal: bool,
    pub discount_rate: f64,
    /// Components the index spans, in document order
    pub components: Vec<ComponentKey>,
    pub prices: PriceTable,
    pub grid: GridSchedule,
    pub proportion_in_program: f64,
    /// $/AUM by calendar month for the cow-calf phase
    pub aum_cost: Vec<f64>,
    /// $/AUM by calendar month during backgrounding; empty for the
    /// weaning endpoint
    pub background_aum_cost: Vec<f64>,
    pub feedlot_feed_cost: f64,
    pub background_days: f64,
    pub days_on_feed: f64,
}

impl IndexTables {
    /// Price-table trait the calf crop sells on.
    pub fn sale_trait(&self) -> &'static str {
        sale_trait_for(self.endpoint)
    }

    /// The run plan a simulation needs to feed this index.
    pub fn run_plan(&self, seed: u64, bump: Option<Bump>) -> RunPlan {
        RunPlan {
            seed,
            endpoint: self.endpoint,
            terminal: self.terminal,
            background_days: self.background_days,
            days_on_feed: self.days_on_feed,
            bump,
        }
    }
}

#[cfg(test)]
pub(crate) fn test_index_config() -> IndexConfig {
    IndexConfig {
        comment: None,
        sale_endpoint: SaleEndpoint::Weaning,
        index_terminal: false,
        discount_rate: 0.05,
        index_components: vec![
            "BW,D".to_string(),
            "WW,D".to_string(),
            "WW,M".to_string(),
            "STAY,D".to_string(),
        ],
        trait_sex_price_per_cwt: vec![
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
        ],
        aum_cost: vec![20.0; 12],
        background_aum_cost: Vec::new(),
        background_days: None,
        days_on_feed: None,
        feedlot_feed_cost: None,
        grid_premiums: Vec::new(),
        proportion_in_program: 0.0,
    }
}
