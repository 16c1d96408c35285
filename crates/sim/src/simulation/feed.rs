//! Monthly feed requirements, booked in animal unit months.
//!
//! Calves accrue grazing from birth to weaning and, for sale endpoints
//! past weaning, through a backgrounding period that ends with the
//! feedlot in-weight. Cows accrue maintenance grazing for the months
//! they spend in the herd each year.

use crate::base::{trait_names, DAYS_PER_MONTH, DAYS_PER_YEAR, WEANING_AGE_DAYS};
use crate::errors::{ConfigError, SimError};
use crate::genetics::Evaluator;
use crate::simulation::animal::{Animal, AnimalId, AumEntry, FeedSource};
use crate::simulation::context::SimulationContext;

/// Phenotype with unpriced traits treated as zero. Traits the run's
/// parameter file never mentions simply contribute nothing.
fn phenotype_or_zero(
    evaluator: &Evaluator<'_>,
    animal: &Animal,
    trait_name: &str,
) -> Result<f64, SimError> {
    match evaluator.phenotype(animal, trait_name) {
        Ok(value) => Ok(value.unwrap_or(0.0)),
        Err(SimError::Config(ConfigError::UnknownTrait(_))) => Ok(0.0),
        Err(e) => Err(e),
    }
}

/// Weight on a linear birth-to-target ramp, taken at mid-day.
fn ramp_weight(base: f64, q: f64, adg: f64, days: f64) -> f64 {
    base + q * adg * ((days - 0.5) / 2.0) * (1.0 + (days - 0.5))
}

/// Book a calf's monthly grazing from birth to the herd's average
/// weaning date. The first month is the fraction left after birth.
pub fn aum_to_weaning(
    ctx: &mut SimulationContext,
    herd_index: usize,
    id: AnimalId,
) -> Result<(), SimError> {
    let (ww, bw, birth_date, year_born) = {
        let evaluator = ctx.evaluator();
        let calf = evaluator.registry.get(id)?;
        let ww = evaluator.weaning_weight(calf)?.ok_or_else(|| {
            SimError::PhenotypeUnavailable {
                animal: id,
                trait_name: trait_names::WEANING_WEIGHT.to_string(),
            }
        })?;
        let bw = phenotype_or_zero(&evaluator, calf, trait_names::BIRTH_WEIGHT)?;
        (ww, bw, calf.birth_date, calf.year_born)
    };

    let ave_weaning_date =
        ctx.herds[herd_index].avg_birth_date(year_born) + f64::from(WEANING_AGE_DAYS);
    let age_at_weaning = ave_weaning_date - f64::from(birth_date);

    let birth_day_of_year =
        f64::from(birth_date) - (f64::from(year_born) * f64::from(DAYS_PER_YEAR) - 1.0);
    let birth_month = (birth_day_of_year / DAYS_PER_MONTH) as i32 + 1;
    let frac_month = (f64::from(birth_month) * DAYS_PER_MONTH - birth_day_of_year) / DAYS_PER_MONTH;

    let adg = (ww - bw) / age_at_weaning;
    let q = 2.0 / age_at_weaning;

    let first_days = frac_month * DAYS_PER_MONTH;
    let mut cum_days = first_days;
    let first_weight = ramp_weight(bw, q, adg, first_days);

    let mut entries = vec![AumEntry {
        year: year_born,
        month: birth_month,
        aum: first_weight / 500.0 * ctx.calf_aum,
        weight: first_weight,
        source: FeedSource::Growing,
    }];

    let mut month = birth_month;
    let mut year = year_born;
    let mut m = cum_days;
    while m < age_at_weaning {
        let days = (age_at_weaning - cum_days).min(DAYS_PER_MONTH);
        cum_days += days;
        let weight = ramp_weight(bw, q, adg, cum_days);
        month += 1;
        if month > 12 {
            month -= 12;
            year = year_born + 1;
        }
        entries.push(AumEntry {
            year,
            month,
            aum: weight / 500.0 * ctx.calf_aum,
            weight,
            source: FeedSource::Growing,
        });
        m += DAYS_PER_MONTH;
    }

    ctx.registry.get_mut(id)?.aum_to_weaning = entries;
    Ok(())
}

/// Book a weaned calf's grazing through the backgrounding period and
/// record the weight it will enter the feedlot at. Even a calf-fed
/// endpoint books the weaning-day entry so an in-weight exists.
pub fn aum_through_backgrounding(
    ctx: &mut SimulationContext,
    herd_index: usize,
    id: AnimalId,
) -> Result<(), SimError> {
    let (ww, yw, birth_date, year_born) = {
        let evaluator = ctx.evaluator();
        let calf = evaluator.registry.get(id)?;
        let ww = evaluator.weaning_weight(calf)?.ok_or_else(|| {
            SimError::PhenotypeUnavailable {
                animal: id,
                trait_name: trait_names::WEANING_WEIGHT.to_string(),
            }
        })?;
        let yw = phenotype_or_zero(&evaluator, calf, trait_names::YEARLING_WEIGHT)?;
        (ww, yw, calf.birth_date, calf.year_born)
    };

    let ave_weaning_date =
        ctx.herds[herd_index].avg_birth_date(year_born) + f64::from(WEANING_AGE_DAYS);
    let year_frac = ave_weaning_date / f64::from(DAYS_PER_YEAR)
        - (ave_weaning_date / f64::from(DAYS_PER_YEAR)).trunc();
    let mut month_weaned = (year_frac * 12.0) as i32 + 1;
    if month_weaned > 12 {
        month_weaned -= 12;
    }

    let age_at_weaning = ave_weaning_date - f64::from(birth_date);
    let age_at_background_end = age_at_weaning + ctx.background_days;
    let age_at_yearling = age_at_weaning + 160.0;

    let adg = (yw - ww) / (age_at_yearling - age_at_weaning);
    // The ramp stays anchored on weaning age even while gain runs on
    // the yearling scale.
    let q = 2.0 / age_at_weaning;

    let birth_day_of_year =
        f64::from(birth_date) - (f64::from(year_born) * f64::from(DAYS_PER_YEAR) - 1.0);
    let birth_month = (birth_day_of_year / DAYS_PER_MONTH) as i32 + 1;
    let frac_month = (f64::from(birth_month) * DAYS_PER_MONTH - birth_day_of_year) / DAYS_PER_MONTH;

    let first_days = frac_month * DAYS_PER_MONTH;
    let mut cum_days = first_days;
    let first_weight = ramp_weight(ww, q, adg, first_days);
    let year_weaned = ((ave_weaning_date + ctx.background_days) / f64::from(DAYS_PER_YEAR)) as i32;

    let mut entries = vec![AumEntry {
        year: year_weaned,
        month: month_weaned,
        aum: first_weight / 500.0 * ctx.calf_aum,
        weight: first_weight,
        source: FeedSource::Growing,
    }];

    let mut month = birth_month;
    let mut year = year_born;
    let mut m = cum_days + age_at_weaning;
    while m < age_at_background_end {
        let days = (age_at_background_end - cum_days - age_at_weaning).min(DAYS_PER_MONTH);
        cum_days += days;
        let weight = ramp_weight(ww, q, adg, cum_days);
        month += 1;
        if month > 12 {
            month -= 12;
            year = year_born + 1;
        }
        entries.push(AumEntry {
            year,
            month,
            aum: weight / 500.0 * ctx.calf_aum,
            weight,
            source: FeedSource::Growing,
        });
        m += DAYS_PER_MONTH;
    }

    ctx.registry.get_mut(id)?.aum_background = entries;
    Ok(())
}

/// Total feedlot intake plus the carcass phenotypes taken at harvest.
/// The harvest weight walks the feedlot gain out from the in-weight to
/// the standard slaughter weight implied by the carcass.
pub fn feedlot_totals(ctx: &mut SimulationContext, id: AnimalId) -> Result<(), SimError> {
    let (intake, carcass, marbling, backfat, ribeye, in_weight) = {
        let evaluator = ctx.evaluator();
        let calf = evaluator.registry.get(id)?;
        let fi = phenotype_or_zero(&evaluator, calf, trait_names::FEED_INTAKE)?;
        let hcw = phenotype_or_zero(&evaluator, calf, trait_names::HOT_CARCASS_WEIGHT)?;
        let ms = phenotype_or_zero(&evaluator, calf, trait_names::MARBLING)?;
        let fat = phenotype_or_zero(&evaluator, calf, trait_names::BACKFAT)?;
        let rea = phenotype_or_zero(&evaluator, calf, trait_names::RIBEYE_AREA)?;
        let in_weight = calf.aum_background.last().map(|e| e.weight).unwrap_or(0.0);
        (fi, hcw, ms, fat, rea, in_weight)
    };

    let days_on_feed = ctx.days_on_feed;
    // 63% dressing percentage
    let std_slaughter_weight = carcass / 0.63;
    let feedlot_adg = (std_slaughter_weight - in_weight) / days_on_feed;

    let calf = ctx.registry.get_mut(id)?;
    calf.feedlot_intake = intake * days_on_feed;
    calf.carcass_weight = carcass;
    calf.harvest_weight = in_weight + feedlot_adg * days_on_feed;
    calf.marbling_score = marbling;
    calf.backfat_thickness = backfat;
    calf.ribeye_area = ribeye;
    Ok(())
}

/// Book maintenance grazing for every active cow from the month she
/// entered the herd, or January for carryover cows, through December.
pub fn cow_maintenance_aum(
    ctx: &mut SimulationContext,
    herd_index: usize,
    year: i32,
) -> Result<(), SimError> {
    let name = ctx.herds[herd_index].name.clone();
    let cows = ctx.registry.active_cows(&name);

    for &cow_id in &cows {
        let date_entered = ctx.registry.get(cow_id)?.date_entered;
        let mut start_month =
            (f64::from(year * DAYS_PER_YEAR - date_entered) / DAYS_PER_MONTH) as i32 + 1;
        if start_month > 12 {
            start_month = 1;
        }
        if start_month < 1 {
            // She was promoted this year and starts grazing as a cow
            // next year; everything after her in the list entered later.
            return Ok(());
        }

        for month in start_month..=12 {
            let (weight, aum) = {
                let evaluator = ctx.evaluator();
                let cow = evaluator.registry.get(cow_id)?;
                let w = evaluator.mature_weight_at(cow, year * DAYS_PER_YEAR + month * 30)?;
                (w, w / 1000.0 * ctx.cow_aum)
            };
            if weight > 0.0 {
                ctx.registry.get_mut(cow_id)?.aum_maintenance.push(AumEntry {
                    year,
                    month,
                    aum,
                    weight: 0.0,
                    source: FeedSource::Maintenance,
                });
            }
        }
    }
    Ok(())
}
