//! Net returns for calves sold after a backgrounding phase.
//!
//! The crop grazes past weaning and sells at the weight it reached on
//! the last backgrounding ration. Both the weaning-phase and the
//! backgrounding-phase feed bills ride along to the later sale year.

use std::collections::BTreeMap;

use tracing::{debug, warn};

use herdmev_sim::base::Sex;
use herdmev_sim::simulation::SimulationContext;

use crate::errors::IndexError;
use crate::ledger::{self, SaleYear, Window};
use crate::netreturns::{cow_costs, cull_sale};
use crate::params::{price_traits, IndexTables};

/// Average discounted net returns per exposure for the backgrounding
/// endpoint.
pub fn evaluate(
    ctx: &SimulationContext,
    index: &IndexTables,
    window: &Window,
) -> Result<f64, IndexError> {
    let sale = sale_net(ctx, index, window);
    let cull = cull_sale(ctx, index, window);
    let cows = cow_costs(ctx, index, window);
    debug!(sale, cull, cows, "backgrounding endpoint");
    Ok(sale + cull - cows)
}

/// Backgrounded-crop revenue net of both feeding phases, discounted
/// and averaged per exposure.
fn sale_net(ctx: &SimulationContext, index: &IndexTables, window: &Window) -> f64 {
    let mut weaning = ledger::weaning_costs(ctx, &index.aum_cost);
    ledger::discount_costs(&mut weaning, window);

    let mut sales = revenue_by_year(ctx, index);
    ledger::discount_sales(&mut sales, window);

    let mut costs = ledger::background_costs(ctx, &index.background_aum_cost, index.background_days);
    ledger::discount_costs(&mut costs, window);

    ledger::per_exposure_average(window, &ctx.cows_exposed, |year| {
        ledger::sale_at(&sales, year).discounted()
            - ledger::cost_at(&costs, year).discounted()
            - ledger::cost_at(&weaning, year).discounted()
    })
}

/// Price the backgrounded crop into yearly buckets keyed by the year
/// the phase ends.
fn revenue_by_year(ctx: &SimulationContext, index: &IndexTables) -> BTreeMap<i32, SaleYear> {
    let evaluator = ctx.evaluator();
    let mut by_year: BTreeMap<i32, SaleYear> = BTreeMap::new();
    for animal in ctx.registry.iter() {
        let year = ledger::background_year(animal.birth_date, index.background_days);
        if animal.year_born >= 1 && animal.is_alive() {
            let weight = match evaluator.backgrounding_weight(animal) {
                Some(weight) => weight,
                None => {
                    warn!(
                        calf = animal.id,
                        year_born = animal.year_born,
                        "no backgrounding weight at sale"
                    );
                    0.0
                }
            };
            let price = index
                .prices
                .at_weight(price_traits::BACKGROUND, animal.sex, weight);
            match animal.sex {
                Sex::Steer => {
                    let sale = by_year.entry(year).or_default();
                    sale.n_steers += 1;
                    sale.steer_revenue += weight * price;
                    sale.steer_weight += weight;
                }
                Sex::Heifer => {
                    let sale = by_year.entry(year).or_default();
                    sale.n_heifers += 1;
                    sale.heifer_revenue += weight * price;
                    sale.heifer_weight += weight;
                }
                _ => {}
            }
        } else {
            by_year.entry(year).or_default().n_dead += 1;
        }
    }
    by_year
}
