//! Report tables, record dumps, and optional phenotype debug sinks.

mod dumps;
mod pheno_log;
mod summary;

pub use dumps::{dump_breeding_records, dump_cow_ages, dump_records, write_dumps};
pub use pheno_log::PhenoLog;
pub use summary::print_tables;
