//! The end-of-run breeding summary table.

use std::io::{self, Write};

use crate::simulation::SimulationContext;

/// Print the cow and heifer breeding table for the report years, one
/// row per herd and year, with percentage conception rates and their
/// across-year averages underneath.
pub fn print_tables(w: &mut impl Write, ctx: &SimulationContext) -> io::Result<()> {
    let mut cow_rate = 0.0;
    let mut heifer_rate = 0.0;

    writeln!(
        w,
        "               ________Cows___________________________   | _____________Heifers___________________"
    )?;
    writeln!(
        w,
        "Year   Herd    Exposed    Bred    Open    Rate     Old   |  Exposed   Bred    Open    Rate    Died"
    )?;
    for year in ctx.burnin + 1..=ctx.n_years {
        for herd in &ctx.herds {
            let t = herd.counts(year);
            let cows = f64::from(t.cows_bred) / f64::from(t.cows_exposed) * 100.0;
            let heifers = f64::from(t.heifers_bred) / f64::from(t.heifers_exposed) * 100.0;
            writeln!(
                w,
                "{:4}   {:<7} {:7} {:7} {:7} {:7.1} {:7}   | {:7} {:7} {:7} {:7.1} {:7}",
                year,
                herd.name,
                t.cows_exposed,
                t.cows_bred,
                t.cows_culled_open,
                cows,
                t.cows_culled_old,
                t.heifers_exposed,
                t.heifers_bred,
                t.heifers_culled_open,
                heifers,
                t.heifers_died_calving
            )?;
            cow_rate += cows;
            heifer_rate += heifers;
        }
    }

    let report_years = f64::from(ctx.n_years - ctx.burnin);
    writeln!(
        w,
        "Average:                             {:10.2}                                  {:10.2}",
        cow_rate / report_years,
        heifer_rate / report_years
    )
}
