use std::sync::Arc;

use crate::base::Date;

/// Per-year exposure and outcome counters for one herd.
#[derive(Debug, Clone, Copy, Default)]
pub struct BreedingCounts {
    pub cows_exposed: u32,
    pub cows_bred: u32,
    pub cows_culled_open: u32,
    pub cows_culled_old: u32,
    pub heifers_exposed: u32,
    pub heifers_bred: u32,
    pub heifers_culled_open: u32,
    pub heifers_died_calving: u32,
}

/// The herd's calving-difficulty score distribution, fixed once from the
/// configured trait mean and total variance.
#[derive(Debug, Clone, Copy)]
pub struct CalvingDifficultyDist {
    pub mean: f64,
    pub sd: f64,
}

impl Default for CalvingDifficultyDist {
    fn default() -> Self {
        Self { mean: 0.0, sd: 1.0 }
    }
}

impl CalvingDifficultyDist {
    /// P(score <= x) under the normal distribution.
    pub fn cdf(&self, x: f64) -> f64 {
        let z = (x - self.mean) / (self.sd * std::f64::consts::SQRT_2);
        0.5 * (1.0 + erf(z))
    }
}

/// Abramowitz & Stegun 7.1.26 rational approximation, |error| < 1.5e-7.
fn erf(x: f64) -> f64 {
    const P: f64 = 0.327_591_1;
    const A1: f64 = 0.254_829_592;
    const A2: f64 = -0.284_496_736;
    const A3: f64 = 1.421_413_741;
    const A4: f64 = -1.453_152_027;
    const A5: f64 = 1.061_405_429;

    let sign = if x < 0.0 { -1.0 } else { 1.0 };
    let x = x.abs();
    let t = 1.0 / (1.0 + P * x);
    let poly = t * (A1 + t * (A2 + t * (A3 + t * (A4 + t * A5))));
    sign * (1.0 - poly * (-x * x).exp())
}

/// One herd: its breeding-season configuration, derived conception
/// threshold, and per-year accounting.
///
/// Active cow and bull lists are registry views, never stored here.
#[derive(Debug, Clone)]
pub struct Herd {
    pub name: Arc<str>,
    /// Cow herd size the replacement step fills back to
    pub target_cows: u32,
    /// Day of year the breeding season opens
    pub start_breeding: Date,
    /// Breeding season length in days
    pub season_length: i32,
    /// Per-cycle conception threshold derived from the season rate
    pub per_cycle_threshold: f64,
    /// Baseline conception rate over a 3-cycle season, added to
    /// stayability and heifer-pregnancy scores
    pub mean_3cycle_rate: f64,
    /// Fraction of difficult first calvings lost; the hardest calvings
    /// up to this tail probability kill both cow and calf
    pub death_loss_rate: f64,
    /// Cows at or past this age in years are culled; set by the
    /// foundation builder from the age-distribution length
    pub max_cow_age: i32,
    pub cd_dist: CalvingDifficultyDist,

    sum_birth_dates: Vec<f64>,
    n_born: Vec<u32>,
    counts: Vec<BreedingCounts>,
}

impl Herd {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        name: Arc<str>,
        target_cows: u32,
        start_breeding: Date,
        season_length: i32,
        per_cycle_threshold: f64,
        mean_3cycle_rate: f64,
        death_loss_rate: f64,
        n_year_slots: usize,
    ) -> Self {
        Self {
            name,
            target_cows,
            start_breeding,
            season_length,
            per_cycle_threshold,
            mean_3cycle_rate,
            death_loss_rate,
            max_cow_age: 0,
            cd_dist: CalvingDifficultyDist::default(),
            sum_birth_dates: vec![0.0; n_year_slots],
            n_born: vec![0; n_year_slots],
            counts: vec![BreedingCounts::default(); n_year_slots],
        }
    }

    /// Record a birth into the year's running average.
    pub fn record_birth(&mut self, year: i32, birth_date: Date) {
        self.sum_birth_dates[year as usize] += birth_date as f64;
        self.n_born[year as usize] += 1;
    }

    /// Average birth date of the year's calf crop; 0 when none born.
    pub fn avg_birth_date(&self, year: i32) -> f64 {
        let n = self.n_born[year as usize];
        if n == 0 {
            return 0.0;
        }
        self.sum_birth_dates[year as usize] / n as f64
    }

    #[inline]
    pub fn n_born(&self, year: i32) -> u32 {
        self.n_born[year as usize]
    }

    #[inline]
    pub fn counts(&self, year: i32) -> &BreedingCounts {
        &self.counts[year as usize]
    }

    #[inline]
    pub fn counts_mut(&mut self, year: i32) -> &mut BreedingCounts {
        &mut self.counts[year as usize]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_herd() -> Herd {
        Herd::new(Arc::from("main"), 100, 60, 63, 0.6, 0.0, 0.03, 12)
    }

    #[test]
    fn test_avg_birth_date_guards_empty_years() {
        let mut herd = create_test_herd();
        assert_eq!(herd.avg_birth_date(3), 0.0);
        herd.record_birth(3, 400);
        herd.record_birth(3, 420);
        assert!((herd.avg_birth_date(3) - 410.0).abs() < 1e-12);
        assert_eq!(herd.n_born(3), 2);
    }

    #[test]
    fn test_counts_accumulate_per_year() {
        let mut herd = create_test_herd();
        herd.counts_mut(5).cows_exposed += 10;
        herd.counts_mut(5).cows_bred += 9;
        herd.counts_mut(6).cows_exposed += 11;
        assert_eq!(herd.counts(5).cows_exposed, 10);
        assert_eq!(herd.counts(5).cows_bred, 9);
        assert_eq!(herd.counts(6).cows_exposed, 11);
    }

    #[test]
    fn test_cd_cdf_standard_points() {
        let dist = CalvingDifficultyDist { mean: 0.0, sd: 1.0 };
        assert!((dist.cdf(0.0) - 0.5).abs() < 1e-7);
        assert!((dist.cdf(1.96) - 0.975).abs() < 1e-3);
        assert!((dist.cdf(-1.96) - 0.025).abs() < 1e-3);
        assert!(dist.cdf(6.0) > 0.999_999);
    }

    #[test]
    fn test_cd_cdf_shifts_with_mean_and_sd() {
        let dist = CalvingDifficultyDist { mean: 10.0, sd: 2.0 };
        assert!((dist.cdf(10.0) - 0.5).abs() < 1e-7);
        assert!((dist.cdf(12.0) - 0.8413).abs() < 1e-3);
    }
}
