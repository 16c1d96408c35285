//! Per-year revenue and cost ledgers.
//!
//! Every evaluator prices the calf crop into yearly buckets keyed by
//! the simulation year the animals sell, discounts each bucket back to
//! the first priced year, and averages the per-exposure nets across
//! the planning window. The bucket types and the cost accumulation
//! passes live here; the endpoint modules own the revenue rules.

use std::collections::BTreeMap;
use std::ops::RangeInclusive;

use herdmev_sim::base::{Date, Sex, DAYS_PER_YEAR, WEANING_AGE_DAYS};
use herdmev_sim::simulation::SimulationContext;

/// The span of years a net-returns evaluation prices and discounts.
#[derive(Debug, Clone, Copy)]
pub struct Window {
    /// First year whose returns count; also the discounting anchor
    pub start_year: i32,
    pub burnin: i32,
    pub n_years: i32,
    /// Annual discount rate
    pub rate: f64,
}

impl Window {
    /// Discount factor for a year, anchored on the start year.
    #[inline]
    pub fn factor(&self, year: i32) -> f64 {
        (1.0 + self.rate).powi(year - self.start_year)
    }

    /// Number of years the evaluation averages over.
    #[inline]
    pub fn horizon(&self) -> i32 {
        self.n_years - self.start_year + 1
    }

    /// Years whose nets enter the average.
    pub fn priced_years(&self) -> RangeInclusive<i32> {
        self.start_year..=self.n_years
    }

    /// Years the discounting pass touches.
    pub fn discounted_years(&self) -> RangeInclusive<i32> {
        self.burnin + 1..=self.n_years
    }
}

/// Sale revenue accumulated for one sale year, split by sex.
#[derive(Debug, Clone, Copy, Default)]
pub struct SaleYear {
    pub n_steers: u32,
    pub steer_revenue: f64,
    pub disc_steer_revenue: f64,
    pub steer_weight: f64,
    pub n_heifers: u32,
    pub heifer_revenue: f64,
    pub disc_heifer_revenue: f64,
    pub heifer_weight: f64,
    pub n_dead: u32,
}

impl SaleYear {
    #[inline]
    pub fn revenue(&self) -> f64 {
        self.steer_revenue + self.heifer_revenue
    }

    #[inline]
    pub fn discounted(&self) -> f64 {
        self.disc_steer_revenue + self.disc_heifer_revenue
    }
}

/// Feed costs accumulated for one sale year, split by sex.
#[derive(Debug, Clone, Copy, Default)]
pub struct CostYear {
    pub steer: f64,
    pub disc_steer: f64,
    pub heifer: f64,
    pub disc_heifer: f64,
}

impl CostYear {
    #[inline]
    pub fn total(&self) -> f64 {
        self.steer + self.heifer
    }

    #[inline]
    pub fn discounted(&self) -> f64 {
        self.disc_steer + self.disc_heifer
    }
}

#[inline]
pub fn sale_at(map: &BTreeMap<i32, SaleYear>, year: i32) -> SaleYear {
    map.get(&year).copied().unwrap_or_default()
}

#[inline]
pub fn cost_at(map: &BTreeMap<i32, CostYear>, year: i32) -> CostYear {
    map.get(&year).copied().unwrap_or_default()
}

/// Year a calf weans, 205 days from birth.
#[inline]
pub fn weaning_year(birth_date: Date) -> i32 {
    (birth_date + WEANING_AGE_DAYS) / DAYS_PER_YEAR
}

/// Year a backgrounded calf sells.
#[inline]
pub fn background_year(birth_date: Date, background_days: f64) -> i32 {
    (birth_date as f64 + WEANING_AGE_DAYS as f64 + background_days) as i32 / DAYS_PER_YEAR
}

/// Year a fed calf is harvested.
#[inline]
pub fn harvest_year(birth_date: Date, background_days: f64, days_on_feed: f64) -> i32 {
    (birth_date as f64 + WEANING_AGE_DAYS as f64 + background_days + days_on_feed) as i32
        / DAYS_PER_YEAR
}

/// Fill in the discounted revenue of every year in the window.
pub fn discount_sales(map: &mut BTreeMap<i32, SaleYear>, window: &Window) {
    for year in window.discounted_years() {
        let df = window.factor(year);
        let sale = map.entry(year).or_default();
        sale.disc_steer_revenue = sale.steer_revenue / df;
        sale.disc_heifer_revenue = sale.heifer_revenue / df;
    }
}

/// Fill in the discounted costs of every year in the window.
pub fn discount_costs(map: &mut BTreeMap<i32, CostYear>, window: &Window) {
    for year in window.discounted_years() {
        let df = window.factor(year);
        let cost = map.entry(year).or_default();
        cost.disc_steer = cost.steer / df;
        cost.disc_heifer = cost.heifer / df;
    }
}

/// Average a per-year discounted value over exposures across the
/// priced window.
pub fn per_exposure_average(
    window: &Window,
    exposures: &[u32],
    value: impl Fn(i32) -> f64,
) -> f64 {
    let mut total = 0.0;
    for year in window.priced_years() {
        total += value(year) / f64::from(exposures[year as usize]);
    }
    total / f64::from(window.horizon())
}

/// Grazing cost of raising each surviving calf, keyed by the year the
/// crop weans. Replacement heifers are already cows and drop out of
/// the calf ledger.
pub fn weaning_costs(ctx: &SimulationContext, aum_cost: &[f64]) -> BTreeMap<i32, CostYear> {
    let mut by_year: BTreeMap<i32, CostYear> = BTreeMap::new();
    for animal in ctx.registry.iter() {
        if animal.year_born < 1 || !animal.is_alive() {
            continue;
        }
        let year = weaning_year(animal.birth_date);
        match animal.sex {
            Sex::Steer => {
                let cost = by_year.entry(year).or_default();
                for entry in &animal.aum_to_weaning {
                    cost.steer += entry.aum * aum_cost[(entry.month - 1) as usize];
                }
            }
            Sex::Heifer => {
                let cost = by_year.entry(year).or_default();
                for entry in &animal.aum_to_weaning {
                    cost.heifer += entry.aum * aum_cost[(entry.month - 1) as usize];
                }
            }
            _ => {}
        }
    }
    by_year
}

/// Backgrounding feed cost keyed by the year the crop sells.
pub fn background_costs(
    ctx: &SimulationContext,
    aum_cost: &[f64],
    background_days: f64,
) -> BTreeMap<i32, CostYear> {
    let mut by_year: BTreeMap<i32, CostYear> = BTreeMap::new();
    for animal in ctx.registry.iter() {
        if animal.year_born < 1 || !animal.is_alive() {
            continue;
        }
        let year = background_year(animal.birth_date, background_days);
        match animal.sex {
            Sex::Steer => {
                let cost = by_year.entry(year).or_default();
                for entry in &animal.aum_background {
                    cost.steer += entry.aum * aum_cost[(entry.month - 1) as usize];
                }
            }
            Sex::Heifer => {
                let cost = by_year.entry(year).or_default();
                for entry in &animal.aum_background {
                    cost.heifer += entry.aum * aum_cost[(entry.month - 1) as usize];
                }
            }
            _ => {}
        }
    }
    by_year
}

/// Feedlot feed cost, keyed to the year after birth when the pen
/// closes out.
pub fn feedlot_costs(ctx: &SimulationContext, feed_cost: f64) -> BTreeMap<i32, CostYear> {
    let mut by_year: BTreeMap<i32, CostYear> = BTreeMap::new();
    for animal in ctx.registry.iter() {
        if animal.year_born < 1 || !animal.is_alive() {
            continue;
        }
        match animal.sex {
            Sex::Steer => {
                by_year.entry(animal.year_born + 1).or_default().steer +=
                    animal.feedlot_intake * feed_cost;
            }
            Sex::Heifer => {
                by_year.entry(animal.year_born + 1).or_default().heifer +=
                    animal.feedlot_intake * feed_cost;
            }
            _ => {}
        }
    }
    by_year
}
