//! End-of-year culling: open cows, first-calving losses, and cows past
//! the herd's age limit leave the herd, with their partial-year grazing
//! and cull sale weights booked as they go.

use crate::base::{DAYS_PER_MONTH, DAYS_PER_YEAR, WEANING_AGE_DAYS};
use crate::errors::SimError;
use crate::simulation::animal::{AnimalId, AumEntry, FeedSource};
use crate::simulation::context::SimulationContext;

/// Book the grazing a culled cow consumed between January and her cull
/// date, month by month.
fn cull_aum(
    ctx: &mut SimulationContext,
    cow_id: AnimalId,
    year: i32,
    source: FeedSource,
) -> Result<(), SimError> {
    let date_culled = ctx.registry.get(cow_id)?.date_culled;
    let n_months =
        (f64::from(date_culled - year * DAYS_PER_YEAR) / DAYS_PER_MONTH) as i32 + 1;

    for m in 1..=n_months {
        let (month, entry_year) = if m > 12 { (m - 12, year + 1) } else { (m, year) };
        let weight = {
            let evaluator = ctx.evaluator();
            let cow = evaluator.registry.get(cow_id)?;
            evaluator.mature_weight_at(cow, year * DAYS_PER_YEAR + month * 30)?
        };
        ctx.registry.get_mut(cow_id)?.aum_maintenance.push(AumEntry {
            year: entry_year,
            month,
            aum: weight / 1000.0 * ctx.cow_aum,
            weight: 0.0,
            source,
        });
    }
    Ok(())
}

/// Cull every cow left open by the season, scoring two-year-olds
/// separately and folding calving losses in. Open mature cows also add
/// their cull sale weight to the year's tally.
pub fn cull_open(ctx: &mut SimulationContext, herd_index: usize, year: i32) -> Result<(), SimError> {
    let name = ctx.herds[herd_index].name.clone();
    let cows = ctx.registry.active_cows(&name);
    let weaning_cull_date =
        ctx.herds[herd_index].avg_birth_date(year) as i32 + WEANING_AGE_DAYS;

    for &cow_id in &cows {
        let (is_first_parity, open, death_date) = {
            let cow = ctx.registry.get(cow_id)?;
            let record = cow
                .last_record()
                .ok_or(SimError::NoBreedingRecord(cow_id))?;
            (year - cow.year_born == 2, !record.bred, cow.death_date)
        };

        if is_first_parity {
            ctx.herds[herd_index].counts_mut(year).heifers_exposed += 1;
            if open || death_date > 0 {
                if death_date == 0 {
                    ctx.herds[herd_index].counts_mut(year).heifers_culled_open += 1;
                    let cow = ctx.registry.get_mut(cow_id)?;
                    cow.active = false;
                    cow.date_culled = weaning_cull_date;
                } else {
                    ctx.herds[herd_index].counts_mut(year).heifers_died_calving += 1;
                    let cow = ctx.registry.get_mut(cow_id)?;
                    cow.active = false;
                    cow.date_culled = death_date;
                }
                cull_aum(ctx, cow_id, year, FeedSource::FirstCalfCull)?;
            } else {
                ctx.herds[herd_index].counts_mut(year).heifers_bred += 1;
            }
        } else {
            ctx.herds[herd_index].counts_mut(year).cows_exposed += 1;
            if open {
                ctx.herds[herd_index].counts_mut(year).cows_culled_open += 1;
                let cow = ctx.registry.get_mut(cow_id)?;
                cow.active = false;
                cow.date_culled = weaning_cull_date;
                cull_aum(ctx, cow_id, year, FeedSource::OpenCull)?;

                let weight = {
                    let evaluator = ctx.evaluator();
                    let cow = evaluator.registry.get(cow_id)?;
                    evaluator.mature_weight_at(cow, weaning_cull_date)?
                };
                let tally = &mut ctx.cull_weights[year as usize];
                tally.cum_weight += weight;
                tally.n_open += 1;
            } else {
                ctx.herds[herd_index].counts_mut(year).cows_bred += 1;
            }
        }
    }
    Ok(())
}

/// Cull every cow at or past the herd's maximum age, weighing her at
/// the year boundary for the cull sale.
pub fn cull_old(ctx: &mut SimulationContext, herd_index: usize, year: i32) -> Result<(), SimError> {
    let name = ctx.herds[herd_index].name.clone();
    let cows = ctx.registry.active_cows(&name);
    let max_cow_age = ctx.herds[herd_index].max_cow_age;
    let weaning_cull_date =
        ctx.herds[herd_index].avg_birth_date(year) as i32 + WEANING_AGE_DAYS;

    for &cow_id in &cows {
        let birth_date = ctx.registry.get(cow_id)?.birth_date;
        let age_in_years =
            (f64::from(year * DAYS_PER_YEAR - birth_date) / f64::from(DAYS_PER_YEAR)).round()
                as i32;
        if age_in_years < max_cow_age {
            continue;
        }

        let cow = ctx.registry.get_mut(cow_id)?;
        cow.active = false;
        cow.date_culled = weaning_cull_date;
        cull_aum(ctx, cow_id, year, FeedSource::OldCull)?;

        ctx.herds[herd_index].counts_mut(year).cows_culled_old += 1;

        let weight = {
            let evaluator = ctx.evaluator();
            let cow = evaluator.registry.get(cow_id)?;
            evaluator.mature_weight_at(cow, year * DAYS_PER_YEAR)?
        };
        let tally = &mut ctx.cull_weights[year as usize];
        tally.cum_weight += weight;
        tally.n_old += 1;
    }
    Ok(())
}
