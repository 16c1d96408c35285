//! Flat-file record dumps.
//!
//! Whitespace layouts are kept stable; downstream plotting scripts
//! parse them positionally.

use std::fs::File;
use std::io::{self, BufWriter, Write};

use tracing::warn;

use crate::base::Component;
use crate::errors::{ConfigError, SimError};
use crate::simulation::SimulationContext;

/// One line of age counts for a herd's active cows.
///
/// A cow's age comes off her latest calving date, clamped at the cull
/// limit. Nothing younger than two years can be in the herd, so the
/// first two count columns stay unprinted.
pub fn dump_cow_ages(
    w: &mut impl Write,
    ctx: &SimulationContext,
    herd_index: usize,
    year: i32,
) -> io::Result<()> {
    let herd = &ctx.herds[herd_index];
    let max_age = herd.max_cow_age as usize;
    let mut counts = vec![0u32; max_age + 1];
    for id in ctx.registry.active_cows(&herd.name) {
        let Ok(cow) = ctx.registry.get(id) else {
            continue;
        };
        let Some(record) = cow.last_record() else {
            continue;
        };
        let age = (f64::from(record.calving_date - cow.birth_date) / 365.0).round() as usize;
        counts[age.min(max_age)] += 1;
    }

    write!(w, "{year:5} ")?;
    for count in &counts[2..] {
        write!(w, "{count:5}")?;
    }
    writeln!(w)
}

/// The whole registry, one line per animal: position, id, sex code,
/// birth date, the mature weight phenotype at the reference age, and
/// one breeding-value column picked by the output configuration.
pub fn dump_records(w: &mut impl Write, ctx: &SimulationContext) -> Result<(), SimError> {
    let column = bv_column(ctx);
    let evaluator = ctx.evaluator();
    for (i, animal) in ctx.registry.iter().enumerate() {
        // mature reference age, 57 months
        let weight = evaluator.mature_weight_at(animal, animal.birth_date + 1735)?;
        let value = column.map_or(0.0, |j| animal.breeding_value[j]);
        writeln!(
            w,
            "{:5} {:5} {} {:5} {:.6} {:.6} ",
            i,
            animal.id,
            animal.sex.code(),
            animal.birth_date,
            weight,
            value
        )
        .map_err(ConfigError::Io)?;
    }
    Ok(())
}

fn bv_column(ctx: &SimulationContext) -> Option<usize> {
    let spec = ctx.output.records_dump_component.as_deref()?;
    let mut parts = spec.splitn(2, ',');
    let trait_name = parts.next().unwrap_or("").trim();
    let component = parts.next().and_then(|c| c.trim().parse::<Component>().ok());
    let column = component.and_then(|c| ctx.catalog.genetic_index(trait_name, c));
    if column.is_none() {
        warn!(spec, "records dump component not in the genetic ordering");
    }
    column
}

/// Every breeding record of every animal. Bred lines carry the bull
/// and the calving date; open lines carry a zero placeholder.
pub fn dump_breeding_records(w: &mut impl Write, ctx: &SimulationContext) -> io::Result<()> {
    for animal in ctx.registry.iter() {
        for record in &animal.records {
            if record.bred {
                writeln!(
                    w,
                    "{} {} {} {} {} {}",
                    animal.id,
                    record.date_bred,
                    record.bred,
                    record.sire,
                    record.calving_date,
                    record.year_bred
                )?;
            } else {
                writeln!(
                    w,
                    "{} {} {} 0 {}",
                    animal.id, record.date_bred, record.bred, record.year_bred
                )?;
            }
        }
    }
    Ok(())
}

/// Write whichever registry dumps the output configuration names.
pub fn write_dumps(ctx: &SimulationContext) -> Result<(), SimError> {
    if let Some(path) = &ctx.output.records_dump {
        let mut sink = BufWriter::new(File::create(path).map_err(ConfigError::Io)?);
        dump_records(&mut sink, ctx)?;
        sink.flush().map_err(ConfigError::Io)?;
    }
    if let Some(path) = &ctx.output.breeding_records_dump {
        let mut sink = BufWriter::new(File::create(path).map_err(ConfigError::Io)?);
        dump_breeding_records(&mut sink, ctx).map_err(ConfigError::Io)?;
        sink.flush().map_err(ConfigError::Io)?;
    }
    Ok(())
}
