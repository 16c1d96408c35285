//! Net returns for cattle sold on a carcass grid.
//!
//! Carcasses take a base price by weight bracket, then a grid premium
//! or discount from the quality grade and USDA yield grade, plus an
//! optional branded-program premium for upper-two-thirds Choice
//! carcasses that grade lean enough. Program participation is a
//! per-head draw against the configured enrollment proportion. In a
//! terminal run the replacements are priced with the calf crop and no
//! cow herd is charged.

use std::collections::BTreeMap;

use rand::Rng;
use tracing::debug;

use herdmev_sim::base::Sex;
use herdmev_sim::output::PhenoLog;
use herdmev_sim::simulation::{Animal, SimulationContext};

use crate::errors::IndexError;
use crate::ledger::{self, SaleYear, Window};
use crate::netreturns::{cow_costs, cull_sale};
use crate::params::{price_traits, IndexTables};
use crate::prices::QualityGrade;

/// Average discounted net returns per exposure for the slaughter
/// endpoint.
pub fn evaluate(
    ctx: &mut SimulationContext,
    index: &IndexTables,
    window: &Window,
) -> Result<f64, IndexError> {
    let sale = sale_net(ctx, index, window);
    let cull = cull_sale(ctx, index, window);
    let cows = if index.terminal {
        0.0
    } else {
        cow_costs(ctx, index, window)
    };
    debug!(sale, cull, cows, "slaughter endpoint");
    Ok(sale + cull - cows)
}

/// Carcass revenue net of every feeding phase, discounted and
/// averaged per exposure.
fn sale_net(ctx: &mut SimulationContext, index: &IndexTables, window: &Window) -> f64 {
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

/// Price the carcasses into yearly buckets keyed by harvest year.
fn revenue_by_year(ctx: &mut SimulationContext, index: &IndexTables) -> BTreeMap<i32, SaleYear> {
    let SimulationContext {
        registry, rng, log, ..
    } = ctx;
    let mut by_year: BTreeMap<i32, SaleYear> = BTreeMap::new();
    for animal in registry.iter() {
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
                    sale.steer_revenue += sale_revenue(index, log, rng, animal);
                    sale.steer_weight += animal.harvest_weight;
                }
                Sex::Heifer => {
                    let sale = by_year.entry(year).or_default();
                    sale.n_heifers += 1;
                    sale.heifer_revenue += sale_revenue(index, log, rng, animal);
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

/// Grid value of one carcass, with the pricing detail logged when the
/// carcass sink is open.
fn sale_revenue(
    index: &IndexTables,
    log: &PhenoLog,
    rng: &mut impl Rng,
    animal: &Animal,
) -> f64 {
    let weight = animal.carcass_weight;
    let (min, max) = carcass_bracket(weight);
    let base = index
        .prices
        .bracket(price_traits::SLAUGHTER, animal.sex, min, max);

    let in_program = rng.random::<f64>() <= index.proportion_in_program;
    let quality = QualityGrade::from_marbling(animal.marbling_score);
    let score = yield_grade_score(
        animal.backfat_thickness,
        animal.carcass_weight,
        animal.ribeye_area,
    );

    // Program eligibility reads the raw yield grade; the grid itself
    // only has rows 1 through 5.
    let yield_grade = score as i32;
    let mut program = 0.0;
    if yield_grade <= 3 && in_program && animal.marbling_score >= 5.0 {
        program = index.grid.premium(QualityGrade::Program, yield_grade);
    }
    let yield_grade = yield_grade.clamp(1, 5);
    let grid = index.grid.premium(quality, yield_grade);

    log.carcass_line(|| {
        format!(
            "{} {} {} {} {} {} {} {} {} {} {}",
            animal.id,
            animal.year_born,
            animal.carcass_weight,
            quality,
            yield_grade,
            base,
            grid,
            program,
            animal.backfat_thickness,
            animal.ribeye_area,
            animal.marbling_score
        )
    });

    weight * (base + grid + program)
}

/// USDA yield grade score from the carcass measurements, with kidney,
/// pelvic and heart fat held at 2.5 percent.
fn yield_grade_score(backfat: f64, carcass_weight: f64, ribeye_area: f64) -> f64 {
    2.50 + 2.5 * backfat + 0.2 * 2.5 + 0.0038 * carcass_weight - 0.32 * ribeye_area
}

/// Carcass-weight price bracket: lights under 600, heavies from 900
/// up, the 600 to 900 window otherwise.
fn carcass_bracket(weight: f64) -> (f64, f64) {
    let min = ((weight / 100.0) as i32 * 100) as f64;
    let max = (((weight + 100.0) / 100.0) as i32 * 100) as f64;
    if min >= 900.0 {
        (900.0, 9999.0)
    } else if max < 600.0 {
        (0.0, 599.0)
    } else {
        (600.0, 900.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil;
    use herdmev_sim::simulation::{AumEntry, FeedSource, SaleEndpoint};
    use rand::SeedableRng;
    use rand_xoshiro::Xoshiro256PlusPlus;

    #[test]
    fn test_yield_grade_score() {
        let score = yield_grade_score(0.5, 800.0, 13.0);
        assert!((score - 3.13).abs() < 1e-12);
    }

    #[test]
    fn test_carcass_bracket() {
        assert_eq!(carcass_bracket(450.0), (0.0, 599.0));
        assert_eq!(carcass_bracket(499.9), (0.0, 599.0));
        // From 500 the rounded-up rail reaches 600 and the carcass
        // prices in the middle window.
        assert_eq!(carcass_bracket(500.0), (600.0, 900.0));
        assert_eq!(carcass_bracket(850.0), (600.0, 900.0));
        assert_eq!(carcass_bracket(899.9), (600.0, 900.0));
        assert_eq!(carcass_bracket(900.0), (900.0, 9999.0));
        assert_eq!(carcass_bracket(1250.0), (900.0, 9999.0));
    }

    fn carcass(marbling: f64, backfat: f64, weight: f64, ribeye: f64) -> Animal {
        let mut animal = testutil::calf(Sex::Steer, 12, 12 * 365 + 100);
        animal.carcass_weight = weight;
        animal.marbling_score = marbling;
        animal.backfat_thickness = backfat;
        animal.ribeye_area = ribeye;
        animal
    }

    #[test]
    fn test_choice_carcass_takes_program_premium() {
        let tables = testutil::slaughter_tables(1.0);
        let log = PhenoLog::disabled();
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(1);

        // Yield grade score 1.68, Choice, in program.
        let animal = carcass(6.0, 0.2, 700.0, 14.0);
        let revenue = sale_revenue(&tables, &log, &mut rng, &animal);
        assert!((revenue - 700.0 * (2.90 + 0.04 + 0.04)).abs() < 1e-9);
    }

    #[test]
    fn test_program_premium_reads_unclamped_grade() {
        let tables = testutil::slaughter_tables(1.0);
        let log = PhenoLog::disabled();
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(1);

        // Yield grade score 0.285 truncates to 0, below the grid rows,
        // so the program pays nothing even though the carcass then
        // prices at clamped grade 1.
        let animal = carcass(6.0, 0.05, 600.0, 16.0);
        let revenue = sale_revenue(&tables, &log, &mut rng, &animal);
        assert!((revenue - 600.0 * (2.90 + 0.04)).abs() < 1e-9);
    }

    #[test]
    fn test_fat_carcass_misses_program() {
        let tables = testutil::slaughter_tables(1.0);
        let log = PhenoLog::disabled();
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(1);

        // Yield grade score 5.4: Prime but far too fat for the program,
        // and heavy enough for the top weight bracket.
        let animal = carcass(9.0, 1.0, 900.0, 11.0);
        let revenue = sale_revenue(&tables, &log, &mut rng, &animal);
        assert!((revenue - 900.0 * (2.85 - 0.08)).abs() < 1e-9);
    }

    #[test]
    fn test_select_carcass_misses_program_on_marbling() {
        let tables = testutil::slaughter_tables(1.0);
        let log = PhenoLog::disabled();
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(1);

        let animal = carcass(4.5, 0.2, 700.0, 14.0);
        let revenue = sale_revenue(&tables, &log, &mut rng, &animal);
        assert!((revenue - 700.0 * (2.90 - 0.08)).abs() < 1e-9);
    }

    #[test]
    fn test_terminal_run_skips_cow_costs() {
        let plan = testutil::feedlot_plan(9, SaleEndpoint::SlaughterCattle);
        let mut ctx = testutil::fresh_context(plan);
        for year in 11..=20 {
            ctx.cows_exposed[year] = 100;
        }
        let mut cow = testutil::calf(Sex::Cow, 5, 5 * 365 + 100);
        cow.aum_maintenance.push(AumEntry {
            year: 12,
            month: 6,
            aum: 1.0,
            weight: 1200.0,
            source: FeedSource::Maintenance,
        });
        ctx.registry.add(cow);

        let window = Window {
            start_year: 11,
            burnin: 10,
            n_years: 20,
            rate: 0.0,
        };
        let mut tables = testutil::slaughter_tables(1.0);
        let net = evaluate(&mut ctx, &tables, &window).unwrap();
        assert!((net - (-20.0 / 100.0 / 10.0)).abs() < 1e-12);

        tables.terminal = true;
        let net = evaluate(&mut ctx, &tables, &window).unwrap();
        assert_eq!(net, 0.0);
    }

    #[test]
    fn test_bred_herd_evaluates_finite() {
        let mut ctx = testutil::bred_context(testutil::feedlot_plan(42, SaleEndpoint::SlaughterCattle));
        let tables = testutil::slaughter_tables(0.5);
        let window = Window {
            start_year: ctx.burnin + 1,
            burnin: ctx.burnin,
            n_years: ctx.n_years,
            rate: tables.discount_rate,
        };
        let sales = revenue_by_year(&mut ctx, &tables);
        let priced: u32 = sales.values().map(|sale| sale.n_steers + sale.n_heifers).sum();
        assert!(priced > 0);
        let net = evaluate(&mut ctx, &tables, &window).unwrap();
        assert!(net.is_finite());
    }
}
