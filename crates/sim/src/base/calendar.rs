/// A day offset in the simulation calendar.
///
/// Day 0 is the start of simulation year 1; years are a flat 365 days.
/// Foundation cows are born before day 0 and carry negative dates.
pub type Date = i32;

/// Days in a simulation year.
pub const DAYS_PER_YEAR: i32 = 365;

/// Average days in a simulation month, used for monthly feed accrual.
pub const DAYS_PER_MONTH: f64 = 30.42;

/// Gestation length in days. Foundation birth dates add a normally
/// distributed error on top; calving dates within a run do not.
pub const GESTATION_DAYS: i32 = 283;

/// Length of one estrus cycle in days.
pub const CYCLE_DAYS: i32 = 21;

/// Age in days at which calves are weaned, relative to the herd-average
/// birth date.
pub const WEANING_AGE_DAYS: i32 = 205;

/// The simulation year a date falls in, rounding half-years up.
///
/// Day 183 of year 1 already counts as year 1; the same convention is
/// used when converting an age in days to an age in years.
#[inline]
pub fn year_of(date: Date) -> i32 {
    (date as f64 / DAYS_PER_YEAR as f64 + 0.5) as i32
}

/// Age in whole years at `today` for an animal born on `birth`.
#[inline]
pub fn age_in_years(birth: Date, today: Date) -> i32 {
    year_of(today - birth)
}
