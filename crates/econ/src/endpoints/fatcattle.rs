//! Net returns for finished cattle sold off the feedlot on a live
//! basis.
//!
//! Fed cattle sell at harvest weight for a single live price, so the
//! price table carries one open bracket per sex. The sale year stacks
//! the feedlot ration on top of the weaning and backgrounding bills.

use std::collections::BTreeMap;

use tracing::debug;

use herdmev_sim::base::Sex;
use herdmev_sim::simulation::{Animal, SimulationContext};

use crate::errors::IndexError;
use crate::ledger::{self, SaleYear, Window};
use crate::netreturns::{cow_costs, cull_sale};
use crate::params::{price_traits, IndexTables};
use crate::prices::PriceTable;

/// Average discounted net returns per exposure for the fat-cattle
/// endpoint.
pub fn evaluate(
    ctx: &SimulationContext,
    index: &IndexTables,
    window: &Window,
) -> Result<f64, IndexError> {
    let sale = sale_net(ctx, index, window);
    let cull = cull_sale(ctx, index, window);
    let cows = cow_costs(ctx, index, window);
    debug!(sale, cull, cows, "fat cattle endpoint");
    Ok(sale + cull - cows)
}

/// Finished-crop revenue net of every feeding phase, discounted and
/// averaged per exposure.
fn sale_net(ctx: &SimulationContext, index: &IndexTables, window: &Window) -> f64 {
    let mut weaning = ledger::weaning_costs(ctx, &index.aum_cost);
    ledger::discount_costs(&mut weaning, window);

    let mut background =
        ledger::background_costs(ctx, &index.background_aum_cost, index.background_days);
    ledger::discount_costs(&mut background, window);

    let mut sales = revenue_by_year(ctx, index);
    ledger::discount_sales(&mut sales, window);

    let mut feedlot = ledger::feedlot_costs(ctx, index.feedlot_feed_cost);
    ledger::discount_costs(&mut feedlot, window);

    ledger::per_exposure_average(window, &ctx.cows_exposed, |year| {
        ledger::sale_at(&sales, year).discounted()
            - ledger::cost_at(&feedlot, year).discounted()
            - ledger::cost_at(&background, year).discounted()
            - ledger::cost_at(&weaning, year).discounted()
    })
}

/// Price the finished crop into yearly buckets keyed by harvest year.
fn revenue_by_year(ctx: &SimulationContext, index: &IndexTables) -> BTreeMap<i32, SaleYear> {
    let mut by_year: BTreeMap<i32, SaleYear> = BTreeMap::new();
    for animal in ctx.registry.iter() {
        let year =
            ledger::harvest_year(animal.birth_date, index.background_days, index.days_on_feed);
        // First-crop losses predate the calving-difficulty draw, so
        // that crop prices as if it all survived.
        let alive = animal.is_alive() || animal.year_born == 1;
        if animal.year_born >= 1 && alive {
            match animal.sex {
                Sex::Steer => {
                    let sale = by_year.entry(year).or_default();
                    sale.n_steers += 1;
                    sale.steer_revenue += sale_revenue(&index.prices, animal);
                    sale.steer_weight += animal.harvest_weight;
                }
                Sex::Heifer => {
                    let sale = by_year.entry(year).or_default();
                    sale.n_heifers += 1;
                    sale.heifer_revenue += sale_revenue(&index.prices, animal);
                    sale.heifer_weight += animal.harvest_weight;
                }
                _ => {}
            }
        } else {
            by_year.entry(year).or_default().n_dead += 1;
        }
    }
    by_year
}

/// Sale value of one finished animal at the flat live price.
fn sale_revenue(prices: &PriceTable, animal: &Animal) -> f64 {
    animal.harvest_weight * prices.bracket(price_traits::FAT_CATTLE, animal.sex, 0.0, 9999.0)
}
