//! Seasonal breeding for the cow herds.
//!
//! Each year the herd is topped up with replacement heifers, then every
//! active cow is exposed over a breeding season split into 21-day estrus
//! cycles. Yearling heifers conceive on their heifer pregnancy phenotype,
//! mature cows on a per-cycle rate derived from stayability. A cow that
//! fails every cycle is left open with a random exposure date.

use rand::Rng;
use rand_distr::StandardNormal;
use tracing::{debug, warn};

use crate::base::{trait_names, Sex, CYCLE_DAYS, DAYS_PER_YEAR, GESTATION_DAYS, WEANING_AGE_DAYS};
use crate::errors::SimError;
use crate::genetics::{cycles_in_season, stay_to_conception};
use crate::simulation::animal::{Animal, AnimalId, BreedingRecord};
use crate::simulation::context::SimulationContext;
use crate::simulation::herd::{CalvingDifficultyDist, Herd};

/// Uniform draw in `[min, max)`, or `min` when the range is empty.
pub(crate) fn rand_range<R: Rng + ?Sized>(rng: &mut R, min: i32, max: i32) -> i32 {
    if max - min <= 0 {
        min
    } else {
        rng.random_range(min..max)
    }
}

/// Day offset added to foundation birth dates, normal with a five-day
/// standard deviation and truncated toward zero.
pub(crate) fn gestation_length_error<R: Rng + ?Sized>(rng: &mut R) -> i32 {
    let z: f64 = rng.sample(StandardNormal);
    (z * 5.0) as i32
}

/// Is this heifer due to calve for the first time at two years of age
/// this season? The age window is anchored on the herd's season start.
fn is_replacement_heifer(animal: &Animal, herd: &Herd, year: i32) -> bool {
    if animal.sex != Sex::Heifer || animal.herd != herd.name {
        return false;
    }
    let age = (year - 1) * DAYS_PER_YEAR + herd.start_breeding - animal.birth_date;
    (DAYS_PER_YEAR..=DAYS_PER_YEAR + herd.start_breeding + 1).contains(&age)
}

/// Promote two-year-old heifers into the cow herd until it is back at its
/// target size. Promoted heifers become active cows dated to enter after
/// their weaning plus one year.
pub fn replace(ctx: &mut SimulationContext, herd_index: usize, year: i32) -> Result<(), SimError> {
    let cows = ctx.registry.active_cows(&ctx.herds[herd_index].name);
    let needed = (ctx.herds[herd_index].target_cows as usize).saturating_sub(cows.len());
    if year == 1 || needed == 0 {
        return Ok(());
    }

    let entered =
        ctx.herds[herd_index].avg_birth_date(year - 1) as i32 + WEANING_AGE_DAYS + DAYS_PER_YEAR;

    // Scan from the most recently added active cow up to, but not
    // including, the newest record.
    let first = cows.last().copied().unwrap_or(1);
    let last = ctx.registry.len() as AnimalId;

    let mut promoted = 0usize;
    for id in first..last {
        let heifer = ctx.registry.get_mut(id)?;
        if !is_replacement_heifer(heifer, &ctx.herds[herd_index], year) {
            continue;
        }
        heifer.active = true;
        heifer.sex = Sex::Cow;
        heifer.date_entered = entered;
        promoted += 1;
        if promoted == needed {
            debug!(
                herd = %ctx.herds[herd_index].name,
                year,
                promoted,
                "promoted replacement heifers"
            );
            return Ok(());
        }
    }

    warn!(
        herd = %ctx.herds[herd_index].name,
        year,
        needed,
        available = promoted,
        "insufficient replacement heifers to hold the herd at target"
    );
    Ok(())
}

/// Run one herd's breeding season for the year, appending exactly one
/// breeding record to every exposed cow.
pub fn breed(ctx: &mut SimulationContext, herd_index: usize, year: i32) -> Result<(), SimError> {
    replace(ctx, herd_index, year)?;

    let herd = &ctx.herds[herd_index];
    let start_breeding = herd.start_breeding;
    let season_length = herd.season_length;
    let threshold = herd.per_cycle_threshold;
    let mean_3cycle = herd.mean_3cycle_rate;
    let name = herd.name.clone();

    let cows = ctx.registry.active_cows(&name);
    let bulls = ctx.registry.active_bulls(&name);
    if bulls.is_empty() {
        return Err(SimError::NoActiveBulls(name.to_string()));
    }

    ctx.cows_exposed[year as usize] = cows.len() as u32;

    let n_cycles = cycles_in_season(season_length);

    for &cow_id in &cows {
        let mut record = BreedingRecord {
            year_bred: year,
            date_bred: 0,
            bred: false,
            sire: 0,
            calving_date: 0,
        };

        let age_at_season_start =
            (year - 1) * DAYS_PER_YEAR + start_breeding - ctx.registry.get(cow_id)?.birth_date;
        let is_yearling = age_at_season_start < DAYS_PER_YEAR + DAYS_PER_YEAR / 2;

        for cycle in 1..=n_cycles {
            let cycle_len = (season_length - (cycle - 1) * CYCLE_DAYS).min(CYCLE_DAYS);
            let cycle_fraction = f64::from(cycle_len) / f64::from(CYCLE_DAYS);
            let bred_date =
                (cycle - 1) * CYCLE_DAYS + rand_range(&mut ctx.rng, 1, cycle_len) + start_breeding;
            let today = (year - 1) * DAYS_PER_YEAR + bred_date;

            let (evaluator, rng) = ctx.split();
            let cow = evaluator.registry.get(cow_id)?;
            let p = if is_yearling {
                evaluator.heifer_pregnancy(cow, today, rng)? + mean_3cycle * cycle_fraction
            } else {
                let stay = evaluator.stay_at_age(cow, today, rng)? + mean_3cycle;
                stay_to_conception(stay) * cycle_fraction
            };

            if p > threshold {
                record.date_bred = bred_date;
                record.bred = true;
                // Upper-exclusive draw; with two or more bulls the one
                // with the highest id is never picked.
                record.sire = bulls[rand_range(&mut ctx.rng, 0, bulls.len() as i32 - 1) as usize];
                record.calving_date = (year - 1) * DAYS_PER_YEAR + bred_date + GESTATION_DAYS;
                break;
            }
        }

        if !record.bred {
            record.date_bred = rand_range(&mut ctx.rng, 1, season_length);
        }

        ctx.registry.get_mut(cow_id)?.records.push(record);
    }

    // Reset the distribution that first-calf outcomes are scored against.
    ctx.herds[herd_index].cd_dist = CalvingDifficultyDist {
        mean: ctx
            .catalog
            .mean(trait_names::CALVING_DIFFICULTY)
            .unwrap_or(0.0),
        sd: ctx.cd_variance.sqrt(),
    };

    Ok(())
}
