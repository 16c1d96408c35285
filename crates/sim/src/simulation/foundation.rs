//! Foundation population builders.
//!
//! A run opens with a cow herd spread over the configured age classes,
//! one crop of yearling replacement heifers, and a bull battery per
//! herd. Creation order is fixed (cows, then heifers, then bulls) so a
//! seed reproduces the same registry.

use rand::Rng as _;
use tracing::info;

use crate::base::{Sex, DAYS_PER_YEAR, GESTATION_DAYS};
use crate::errors::{ConfigError, SimError};
use crate::simulation::animal::Animal;
use crate::simulation::breeding::gestation_length_error;
use crate::simulation::context::SimulationContext;

/// Build the full foundation population in creation order.
pub fn make_foundation(ctx: &mut SimulationContext) -> Result<(), SimError> {
    make_foundation_cows(ctx)?;
    make_foundation_heifers(ctx);
    make_foundation_bulls(ctx);
    Ok(())
}

/// Build the foundation cow herd for every herd.
///
/// Each age class holds `floor(target * proportion)` cows born that
/// many years before day 0, scattered over the breeding season with a
/// gestation-length error. The oldest class calved first at two years,
/// so the cull age limit becomes the class count plus one.
pub fn make_foundation_cows(ctx: &mut SimulationContext) -> Result<(), SimError> {
    let total: f64 = ctx.age_distribution.iter().sum();
    if !(0.999..=1.001).contains(&total) {
        return Err(ConfigError::BadProportion {
            what: "cow age distribution",
            total,
        }
        .into());
    }

    let age_classes = ctx.age_distribution.clone();
    let n_classes = age_classes.len() as i32;

    for h in 0..ctx.herds.len() {
        let name = ctx.herds[h].name.clone();
        let target = ctx.herds[h].target_cows as f64;
        let season_length = ctx.herds[h].season_length;

        for (i, &proportion) in age_classes.iter().enumerate() {
            let years_back = n_classes - i as i32;
            let n_cows = (target * proportion) as u32;
            for _ in 0..n_cows {
                let birth = -years_back * DAYS_PER_YEAR
                    + ctx.rng.random_range(0..season_length)
                    + gestation_length_error(&mut ctx.rng);
                let mut cow = Animal::new(Sex::Cow, name.clone(), birth, -years_back);
                cow.active = true;
                let (bv, residual) = ctx.sampler.foundation(&mut ctx.rng);
                cow.breeding_value = bv;
                cow.residual = residual;
                cow.composition = ctx.cow_herd_composition.sample(&mut ctx.rng);
                ctx.registry.add(cow);
            }
        }
        ctx.herds[h].max_cow_age = n_classes + 1;
        info!(
            herd = %name,
            cows = ctx.registry.active_cows(&name).len(),
            age_classes = n_classes,
            "foundation cows created"
        );
    }
    Ok(())
}

/// Build the foundation heifers, 20% of each herd's cow target.
///
/// They are born the season before day 0 and start inactive; the
/// year-2 replacement step promotes them into the cow herd.
pub fn make_foundation_heifers(ctx: &mut SimulationContext) {
    for h in 0..ctx.herds.len() {
        let name = ctx.herds[h].name.clone();
        let n_heifers = (0.2 * ctx.herds[h].target_cows as f64) as u32;
        let start_breeding = ctx.herds[h].start_breeding;
        let season_length = ctx.herds[h].season_length;

        for _ in 0..n_heifers {
            let birth = start_breeding + ctx.rng.random_range(0..season_length) + GESTATION_DAYS
                - DAYS_PER_YEAR;
            let mut heifer = Animal::new(Sex::Heifer, name.clone(), birth, 0);
            let (bv, residual) = ctx.sampler.foundation(&mut ctx.rng);
            heifer.breeding_value = bv;
            heifer.residual = residual;
            heifer.composition = ctx.cow_herd_composition.sample(&mut ctx.rng);
            ctx.registry.add(heifer);
        }
        info!(herd = %name, heifers = n_heifers, "foundation heifers created");
    }
}

/// Build each herd's bull battery, with the configured merit added on
/// top of the sampled breeding values.
pub fn make_foundation_bulls(ctx: &mut SimulationContext) {
    for h in 0..ctx.herds.len() {
        let name = ctx.herds[h].name.clone();
        for _ in 0..ctx.n_foundation_bulls {
            let mut bull = Animal::new(Sex::Bull, name.clone(), 0, 0);
            bull.active = true;
            let (bv, residual) = ctx.sampler.foundation(&mut ctx.rng);
            bull.breeding_value = bv;
            bull.residual = residual;
            bull.composition = ctx.bull_battery_composition.sample(&mut ctx.rng);
            for (j, &merit) in ctx.bull_merit.iter().enumerate() {
                bull.breeding_value[j] += merit;
            }
            ctx.registry.add(bull);
        }
        info!(
            herd = %name,
            bulls = ctx.n_foundation_bulls,
            "foundation bulls created"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulation::config::test_master_config;
    use crate::simulation::context::RunPlan;

    fn create_test_context() -> SimulationContext {
        let setup = test_master_config().build().unwrap();
        SimulationContext::new(setup, RunPlan::default()).unwrap()
    }

    #[test]
    fn test_cow_herd_fills_age_classes() {
        let mut ctx = create_test_context();
        make_foundation_cows(&mut ctx).unwrap();

        // classes 0.2/0.18/0.16/0.14/0.12/0.2 of 100 cows
        assert_eq!(ctx.registry.len(), 100);
        assert_eq!(ctx.registry.active_cows("spring").len(), 100);
        assert_eq!(ctx.herds[0].max_cow_age, 7);

        let years: Vec<i32> = ctx.registry.iter().map(|a| a.year_born).collect();
        assert_eq!(years.iter().min(), Some(&-6));
        assert_eq!(years.iter().max(), Some(&-1));

        for cow in ctx.registry.iter() {
            assert_eq!(cow.sex, Sex::Cow);
            assert!(cow.active);
            // born within the season of their class year, plus the
            // gestation-length error
            let offset = cow.birth_date - cow.year_born * DAYS_PER_YEAR;
            assert!((-40..63 + 40).contains(&offset), "offset = {offset}");
            assert_eq!(cow.breeding_value.len(), 8);
            assert_eq!(cow.residual.len(), 6);
            assert!(!cow.composition.is_empty());
        }
    }

    #[test]
    fn test_heifers_start_inactive_in_year_zero() {
        let mut ctx = create_test_context();
        make_foundation_cows(&mut ctx).unwrap();
        let marker = ctx.registry.len();
        make_foundation_heifers(&mut ctx);

        assert_eq!(ctx.registry.len(), marker + 20);
        for heifer in ctx.registry.iter().skip(marker) {
            assert_eq!(heifer.sex, Sex::Heifer);
            assert!(!heifer.active);
            assert_eq!(heifer.year_born, 0);
            let lo = 59 + GESTATION_DAYS - DAYS_PER_YEAR;
            assert!((lo..lo + 63).contains(&heifer.birth_date));
        }
        // heifers do not join the active cow list yet
        assert_eq!(ctx.registry.active_cows("spring").len(), marker);
    }

    #[test]
    fn test_bulls_carry_battery_merit() {
        let mut plain = create_test_context();

        let mut config = test_master_config();
        for pair in &mut config.foundation.bull_merit {
            pair.0 = 2.0;
        }
        let mut bumped =
            SimulationContext::new(config.build().unwrap(), RunPlan::default()).unwrap();

        make_foundation_bulls(&mut plain);
        make_foundation_bulls(&mut bumped);

        assert_eq!(plain.registry.len(), 4);
        assert_eq!(plain.registry.active_bulls("spring").len(), 4);
        for (a, b) in plain.registry.iter().zip(bumped.registry.iter()) {
            assert!(a.active && b.active);
            assert_eq!(a.birth_date, 0);
            assert_eq!(a.year_born, 0);
            // same seed, same draws; only the merit differs
            for j in 0..a.breeding_value.len() {
                assert!((b.breeding_value[j] - a.breeding_value[j] - 2.0).abs() < 1e-12);
            }
        }
    }

    #[test]
    fn test_bad_age_distribution_is_rejected() {
        let mut setup = test_master_config().build().unwrap();
        setup.age_distribution = vec![0.5, 0.4];
        let mut ctx = SimulationContext::new(setup, RunPlan::default()).unwrap();
        assert!(matches!(
            make_foundation_cows(&mut ctx).unwrap_err(),
            SimError::Config(ConfigError::BadProportion { .. })
        ));
    }

    #[test]
    fn test_creation_order_is_reproducible() {
        let build = || {
            let mut ctx = create_test_context();
            make_foundation(&mut ctx).unwrap();
            ctx
        };
        let a = build();
        let b = build();

        assert_eq!(a.registry.len(), 124);
        assert_eq!(a.registry.len(), b.registry.len());
        for (x, y) in a.registry.iter().zip(b.registry.iter()) {
            assert_eq!(x.birth_date, y.birth_date);
            assert_eq!(x.breeding_value, y.breeding_value);
            assert_eq!(x.composition, y.composition);
        }
    }
}
