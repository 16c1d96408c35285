use clap::{Args, ValueEnum};
use std::path::PathBuf;

/// How much of a run lands on stdout.
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputMode {
    /// Banner, breeding tables, and a labeled net returns line
    #[default]
    Verbose,
    /// Breeding tables plus a bare net returns figure
    Table,
    /// Nothing but the net returns figure, for capture by a caller
    Quiet,
}

#[derive(Args, Debug)]
pub struct RunArgs {
    /// Master herd parameter file (JSON)
    #[arg(short = 'm', long)]
    pub master: PathBuf,

    /// Index parameter file (JSON)
    ///
    /// Omit it to simulate the herd without pricing anything.
    #[arg(short = 'i', long)]
    pub index: Option<PathBuf>,

    /// Random seed
    #[arg(long, default_value = "1234")]
    pub seed: u64,

    /// Bump one component's breeding values, "TRAIT,D|M[,amount]"
    ///
    /// The post-burn-in bull battery carries the extra merit, so the
    /// later calf crops inherit it.
    #[arg(short = 'b', long)]
    pub bump: Option<String>,

    /// What to print on stdout
    #[arg(long, value_enum, default_value_t = OutputMode::Verbose)]
    pub output_mode: OutputMode,
}

#[derive(Args, Debug)]
pub struct MevArgs {
    /// Master herd parameter file (JSON)
    #[arg(short = 'm', long)]
    pub master: PathBuf,

    /// Index parameter file (JSON)
    #[arg(short = 'i', long)]
    pub index: PathBuf,

    /// Simulations per bump
    #[arg(short = 'n', long, default_value = "100")]
    pub samples: usize,

    /// Seed for the shared per-sample seed list
    #[arg(long, default_value = "1234")]
    pub seed: u64,

    /// Write the index element file here
    #[arg(short = 'o', long)]
    pub output: Option<PathBuf>,

    /// Print bare "TRAIT,COMP,mev" rows instead of the report table
    #[arg(long)]
    pub csv: bool,

    /// Show progress bar
    #[arg(long, default_value = "true")]
    pub progress: bool,
}

#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Master herd parameter file (JSON)
    #[arg(short = 'm', long)]
    pub master: PathBuf,

    /// Index parameter file (JSON) to cross-check against the catalog
    #[arg(short = 'i', long)]
    pub index: Option<PathBuf>,
}
