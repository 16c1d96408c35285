//! Calving: turn the year's conceptions into calves with lifetime
//! genetics, score first-calving losses, and book each calf's feed out
//! to the run's sale endpoint.

use rand::Rng;

use crate::base::{blend, Sex};
use crate::errors::SimError;
use crate::simulation::animal::{Animal, AnimalId};
use crate::simulation::context::SimulationContext;
use crate::simulation::feed;

/// Create a calf from the cow's current breeding record: parent-average
/// breeding values plus a Mendelian sampling draw, fresh residuals, and
/// an even blend of the parents' breed compositions.
fn gen_from_mating(
    ctx: &mut SimulationContext,
    herd_index: usize,
    cow_id: AnimalId,
    year: i32,
) -> Result<AnimalId, SimError> {
    let (record, dam_bv, dam_composition) = {
        let cow = ctx.registry.get(cow_id)?;
        let record = *cow
            .last_record()
            .ok_or(SimError::NoBreedingRecord(cow_id))?;
        (record, cow.breeding_value.clone(), cow.composition.clone())
    };
    let (sire_bv, sire_composition) = {
        let sire = ctx.registry.get(record.sire)?;
        (sire.breeding_value.clone(), sire.composition.clone())
    };

    let (breeding_value, residual) = ctx.sampler.mating(&sire_bv, &dam_bv, &mut ctx.rng);
    let sex = if ctx.rng.random_bool(0.5) {
        Sex::Heifer
    } else {
        Sex::Steer
    };

    let mut calf = Animal::new(
        sex,
        ctx.herds[herd_index].name.clone(),
        record.calving_date,
        year,
    );
    calf.sire = record.sire;
    calf.dam = cow_id;
    calf.breeding_value = breeding_value;
    calf.residual = residual;
    calf.composition = blend(&sire_composition, &dam_composition);

    ctx.herds[herd_index].record_birth(year, record.calving_date);
    Ok(ctx.registry.add(calf))
}

/// Score a first-parity calving against the herd's calving difficulty
/// distribution. A calving in the loss tail kills both cow and calf on
/// the calf's birth date. Cows past two and a half years are immune.
fn died_calving(
    ctx: &mut SimulationContext,
    herd_index: usize,
    cow_id: AnimalId,
    calf_id: AnimalId,
) -> Result<(), SimError> {
    let mut dies = false;
    let birth_date;
    {
        let evaluator = ctx.evaluator();
        let calf = evaluator.registry.get(calf_id)?;
        let cow = evaluator.registry.get(cow_id)?;
        birth_date = calf.birth_date;
        if birth_date - cow.birth_date > 912 {
            return Ok(());
        }

        let herd = &evaluator.herds[herd_index];
        for record in &cow.records {
            let difficulty = evaluator.calving_difficulty(calf, record)?;
            if herd.cd_dist.cdf(difficulty) >= 1.0 - herd.death_loss_rate {
                dies = true;
            }
        }
    }

    if dies {
        ctx.registry.get_mut(calf_id)?.death_date = birth_date;
        ctx.registry.get_mut(cow_id)?.death_date = birth_date;
    }
    Ok(())
}

/// Calve every bred cow in the herd, then book the new calves' feed out
/// to the sale endpoint. Calves lost at birth still carry their feed
/// trajectories; the sale accounting nets them out.
pub fn calve(ctx: &mut SimulationContext, herd_index: usize, year: i32) -> Result<(), SimError> {
    let name = ctx.herds[herd_index].name.clone();
    let cows = ctx.registry.active_cows(&name);
    let marker = ctx.registry.len();

    for &cow_id in &cows {
        let bred = ctx
            .registry
            .get(cow_id)?
            .last_record()
            .ok_or(SimError::NoBreedingRecord(cow_id))?
            .bred;
        if bred {
            let calf_id = gen_from_mating(ctx, herd_index, cow_id, year)?;
            died_calving(ctx, herd_index, cow_id, calf_id)?;
        }
    }

    for id in marker as AnimalId + 1..=ctx.registry.len() as AnimalId {
        feed::aum_to_weaning(ctx, herd_index, id)?;
        if ctx.endpoint.feeds_past_weaning() {
            feed::aum_through_backgrounding(ctx, herd_index, id)?;
            if ctx.endpoint.has_feedlot() {
                feed::feedlot_totals(ctx, id)?;
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulation::breeding::breed;
    use crate::simulation::config::test_master_config;
    use crate::simulation::context::RunPlan;
    use crate::simulation::foundation::make_foundation;
    use crate::simulation::herd::CalvingDifficultyDist;

    fn create_bred_context(threshold: f64) -> SimulationContext {
        let setup = test_master_config().build().unwrap();
        let mut ctx = SimulationContext::new(setup, RunPlan::default()).unwrap();
        make_foundation(&mut ctx).unwrap();
        ctx.herds[0].per_cycle_threshold = threshold;
        breed(&mut ctx, 0, 1).unwrap();
        ctx
    }

    #[test]
    fn test_every_bred_cow_drops_one_calf() {
        let mut ctx = create_bred_context(-10.0);
        let before = ctx.registry.len();
        calve(&mut ctx, 0, 1).unwrap();

        assert_eq!(ctx.registry.len(), before + 100);
        assert_eq!(ctx.herds[0].n_born(1), 100);

        let bulls = ctx.registry.active_bulls("spring");
        for id in before as AnimalId + 1..=ctx.registry.len() as AnimalId {
            let calf = ctx.registry.get(id).unwrap();
            assert_eq!(calf.year_born, 1);
            assert!(!calf.active);
            assert!(bulls.contains(&calf.sire));
            assert_ne!(calf.dam, 0);
            assert_eq!(calf.herd.as_ref(), "spring");
            assert!(matches!(calf.sex, Sex::Heifer | Sex::Steer));
            assert_eq!(calf.breeding_value.len(), 8);
            assert_eq!(calf.residual.len(), 6);

            let dam = ctx.registry.get(calf.dam).unwrap();
            assert_eq!(calf.birth_date, dam.records[0].calving_date);
        }
    }

    #[test]
    fn test_calves_blend_their_parents_composition() {
        let mut ctx = create_bred_context(-10.0);
        let before = ctx.registry.len();
        calve(&mut ctx, 0, 1).unwrap();

        let calf = ctx.registry.get(before as AnimalId + 1).unwrap();
        let sire = ctx.registry.get(calf.sire).unwrap();
        let dam = ctx.registry.get(calf.dam).unwrap();

        let total: f64 = calf.composition.values().sum();
        assert!((total - 1.0).abs() < 1e-9);
        for (breed, p) in &calf.composition {
            let s = sire.composition.get(breed).copied().unwrap_or(0.0);
            let d = dam.composition.get(breed).copied().unwrap_or(0.0);
            assert!((p - 0.5 * (s + d)).abs() < 1e-12);
        }
    }

    #[test]
    fn test_both_calf_sexes_appear() {
        let mut ctx = create_bred_context(-10.0);
        let before = ctx.registry.len();
        calve(&mut ctx, 0, 1).unwrap();

        let heifers = ctx
            .registry
            .iter()
            .skip(before)
            .filter(|a| a.sex == Sex::Heifer)
            .count();
        assert!(heifers > 20);
        assert!(heifers < 80);
    }

    #[test]
    fn test_open_cows_produce_no_calves() {
        let mut ctx = create_bred_context(2.0);
        let before = ctx.registry.len();
        calve(&mut ctx, 0, 1).unwrap();
        assert_eq!(ctx.registry.len(), before);
        assert_eq!(ctx.herds[0].n_born(1), 0);
    }

    #[test]
    fn test_hard_calvings_kill_cow_and_calf() {
        let mut ctx = create_bred_context(-10.0);
        // Every first-parity calving falls in the loss tail.
        ctx.herds[0].death_loss_rate = 1.0;
        let before = ctx.registry.len();
        calve(&mut ctx, 0, 1).unwrap();

        // The youngest foundation age class calves at under two and a
        // half years, so those losses hit while older dams are immune.
        let mut deaths = 0;
        for id in before as AnimalId + 1..=ctx.registry.len() as AnimalId {
            let calf = ctx.registry.get(id).unwrap();
            let dam = ctx.registry.get(calf.dam).unwrap();
            if calf.birth_date - dam.birth_date <= 912 {
                assert_eq!(calf.death_date, calf.birth_date);
                assert_eq!(dam.death_date, calf.birth_date);
                deaths += 1;
            } else {
                assert_eq!(calf.death_date, 0);
            }
        }
        assert!(deaths > 0);
    }

    #[test]
    fn test_first_parity_loss_rate_applies_to_young_dams() {
        let mut ctx = create_bred_context(-10.0);
        ctx.herds[0].death_loss_rate = 1.0;

        // Make one dam young enough to qualify as a first-parity cow.
        let cows = ctx.registry.active_cows("spring");
        let young = cows[0];
        {
            let record = ctx.registry.get(young).unwrap().records[0];
            let a = ctx.registry.get_mut(young).unwrap();
            a.birth_date = record.calving_date - 700;
        }
        calve(&mut ctx, 0, 1).unwrap();

        let dam = ctx.registry.get(young).unwrap();
        assert_ne!(dam.death_date, 0);
        let calf = ctx
            .registry
            .iter()
            .find(|a| a.dam == young)
            .unwrap();
        assert_eq!(calf.death_date, calf.birth_date);
        assert_eq!(dam.death_date, calf.birth_date);
    }

    #[test]
    fn test_zero_loss_rate_spares_even_young_dams() {
        let mut ctx = create_bred_context(-10.0);
        ctx.herds[0].death_loss_rate = 0.0;
        ctx.herds[0].cd_dist = CalvingDifficultyDist {
            mean: 105.0,
            sd: 61.0_f64.sqrt(),
        };

        let cows = ctx.registry.active_cows("spring");
        let young = cows[0];
        {
            let record = ctx.registry.get(young).unwrap().records[0];
            let a = ctx.registry.get_mut(young).unwrap();
            a.birth_date = record.calving_date - 700;
        }
        calve(&mut ctx, 0, 1).unwrap();

        // cdf never reaches 1.0 exactly, so nothing dies.
        let dam = ctx.registry.get(young).unwrap();
        assert_eq!(dam.death_date, 0);
    }

    #[test]
    fn test_calving_is_reproducible_for_a_seed() {
        let mut a = create_bred_context(-10.0);
        let mut b = create_bred_context(-10.0);
        calve(&mut a, 0, 1).unwrap();
        calve(&mut b, 0, 1).unwrap();

        assert_eq!(a.registry.len(), b.registry.len());
        for (x, y) in a.registry.iter().zip(b.registry.iter()) {
            assert_eq!(x.sex, y.sex);
            assert_eq!(x.birth_date, y.birth_date);
            assert_eq!(x.breeding_value, y.breeding_value);
            assert_eq!(x.residual, y.residual);
        }
    }
}
