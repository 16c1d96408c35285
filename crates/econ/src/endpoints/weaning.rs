//! Net returns for calves sold at weaning.
//!
//! Steers and heifers sell the day they wean into 100 lb price
//! brackets. Raising costs are the grazing AUMs each calf logged
//! between birth and weaning, and the cow herd settles up separately
//! through the cull account and the maintenance account.

use std::collections::BTreeMap;

use tracing::{debug, warn};

use herdmev_sim::base::{trait_names, Sex};
use herdmev_sim::genetics::Evaluator;
use herdmev_sim::simulation::{Animal, SimulationContext};

use crate::errors::IndexError;
use crate::ledger::{self, SaleYear, Window};
use crate::netreturns::{cow_costs, cull_sale};
use crate::params::IndexTables;
use crate::prices::PriceTable;

/// Average discounted net returns per exposure for the weaning
/// endpoint.
pub fn evaluate(
    ctx: &SimulationContext,
    index: &IndexTables,
    window: &Window,
) -> Result<f64, IndexError> {
    let sale = sale_net(ctx, index, window)?;
    let cull = cull_sale(ctx, index, window);
    let cows = cow_costs(ctx, index, window);
    debug!(sale, cull, cows, "weaning endpoint");
    Ok(sale + cull - cows)
}

/// Calf-crop revenue net of raising costs, discounted and averaged
/// per exposure.
fn sale_net(
    ctx: &SimulationContext,
    index: &IndexTables,
    window: &Window,
) -> Result<f64, IndexError> {
    let mut sales = revenue_by_year(ctx, index)?;
    ledger::discount_sales(&mut sales, window);

    let mut costs = ledger::weaning_costs(ctx, &index.aum_cost);
    ledger::discount_costs(&mut costs, window);

    Ok(ledger::per_exposure_average(
        window,
        &ctx.cows_exposed,
        |year| {
            ledger::sale_at(&sales, year).discounted() - ledger::cost_at(&costs, year).discounted()
        },
    ))
}

/// Price the weaned crop into yearly buckets keyed by weaning year.
fn revenue_by_year(
    ctx: &SimulationContext,
    index: &IndexTables,
) -> Result<BTreeMap<i32, SaleYear>, IndexError> {
    let evaluator = ctx.evaluator();
    let mut by_year: BTreeMap<i32, SaleYear> = BTreeMap::new();
    for animal in ctx.registry.iter() {
        let year = ledger::weaning_year(animal.birth_date);
        if animal.year_born >= 1 && animal.is_alive() {
            match animal.sex {
                Sex::Steer => {
                    let sale = by_year.entry(year).or_default();
                    sale.n_steers += 1;
                    sale.steer_revenue += sale_revenue(&evaluator, &index.prices, animal)?;
                    sale.steer_weight += evaluator
                        .phenotype(animal, trait_names::WEANING_WEIGHT)?
                        .unwrap_or(0.0);
                }
                Sex::Heifer => {
                    let sale = by_year.entry(year).or_default();
                    sale.n_heifers += 1;
                    sale.heifer_revenue += sale_revenue(&evaluator, &index.prices, animal)?;
                    sale.heifer_weight += evaluator
                        .phenotype(animal, trait_names::WEANING_WEIGHT)?
                        .unwrap_or(0.0);
                }
                _ => {}
            }
        } else {
            by_year.entry(year).or_default().n_dead += 1;
        }
    }
    Ok(by_year)
}

/// Sale value of one weaned calf.
fn sale_revenue(
    evaluator: &Evaluator<'_>,
    prices: &PriceTable,
    animal: &Animal,
) -> Result<f64, IndexError> {
    let weight = match evaluator.weaning_weight(animal)? {
        Some(weight) => weight,
        None => {
            warn!(
                calf = animal.id,
                year_born = animal.year_born,
                "no weaning weight at sale"
            );
            0.0
        }
    };
    let (min, max) = sale_bracket(weight, animal.sex);
    Ok(weight * prices.bracket(trait_names::WEANING_WEIGHT, animal.sex, min, max))
}

/// The 100 lb price bracket a sale weight lands in, with the top
/// bracket open-ended and the bottom one floored at zero.
fn sale_bracket(weight: f64, sex: Sex) -> (f64, f64) {
    let mut min = ((weight / 100.0) as i32 * 100) as f64;
    let mut max = (((weight + 100.0) / 100.0) as i32 * 100) as f64;
    match sex {
        Sex::Steer => {
            if min == 800.0 {
                max = 9999.0;
            } else if max == 400.0 {
                min = 0.0;
            }
        }
        Sex::Heifer => {
            if min == 700.0 {
                max = 9999.0;
            } else if max == 400.0 {
                min = 0.0;
            }
        }
        _ => {}
    }
    (min, max)
}
