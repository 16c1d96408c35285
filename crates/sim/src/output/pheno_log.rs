use std::cell::RefCell;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::errors::ConfigError;
use crate::simulation::OutputConfig;

/// Optional capture of phenotype decomposition terms.
///
/// Five independent sinks: the general phenotype file (gated on one
/// configured trait), dedicated stayability, heifer-pregnancy, and
/// calving-difficulty files, and the terminal carcass log. All are off
/// by default; a disabled log costs one branch per evaluation. Write
/// failures are swallowed, the files are diagnostics.
#[derive(Debug, Default)]
pub struct PhenoLog {
    debug_trait: Option<String>,
    general: Option<RefCell<BufWriter<File>>>,
    stay: Option<RefCell<BufWriter<File>>>,
    hp: Option<RefCell<BufWriter<File>>>,
    cd: Option<RefCell<BufWriter<File>>>,
    carcass: Option<RefCell<BufWriter<File>>>,
}

fn open_sink(path: Option<&str>) -> Result<Option<RefCell<BufWriter<File>>>, ConfigError> {
    match path {
        Some(p) => {
            let file = File::create(Path::new(p))?;
            Ok(Some(RefCell::new(BufWriter::new(file))))
        }
        None => Ok(None),
    }
}

impl PhenoLog {
    /// A log with every sink off.
    pub fn disabled() -> Self {
        Self::default()
    }

    /// Open the sinks named in the output configuration. The
    /// `phenotype_file` entry is a "path,TRAIT" pair; the general sink
    /// only receives lines for that trait.
    pub fn from_config(output: &OutputConfig) -> Result<Self, ConfigError> {
        let (general_path, debug_trait) = match &output.phenotype_file {
            Some(pair) => {
                let mut parts = pair.splitn(2, ',');
                match (parts.next(), parts.next()) {
                    (Some(path), Some(trait_name)) => (
                        Some(path.trim().to_string()),
                        Some(trait_name.trim().to_string()),
                    ),
                    _ => {
                        return Err(ConfigError::BadRow {
                            table: "phenotype_file",
                            row: pair.clone(),
                        })
                    }
                }
            }
            None => (None, None),
        };

        let carcass = open_sink(output.carcass_file.as_deref())?;
        if let Some(sink) = &carcass {
            let _ = writeln!(
                sink.borrow_mut(),
                "Id YearBorn CarcassWeight QualityGrade YieldGrade PricePerPound GridPrice ProgramPremium BackfatThickness RibeyeArea MarblingScore"
            );
        }

        Ok(Self {
            debug_trait,
            general: open_sink(general_path.as_deref())?,
            stay: open_sink(output.stay_phenotype_file.as_deref())?,
            hp: open_sink(output.hp_phenotype_file.as_deref())?,
            cd: open_sink(output.cd_phenotype_file.as_deref())?,
            carcass,
        })
    }

    pub fn phenotype_line(&self, trait_name: &str, line: impl FnOnce() -> String) {
        if self.debug_trait.as_deref() != Some(trait_name) {
            return;
        }
        if let Some(sink) = &self.general {
            let _ = writeln!(sink.borrow_mut(), "{}", line());
        }
    }

    pub fn stay_line(&self, line: impl FnOnce() -> String) {
        if let Some(sink) = &self.stay {
            let _ = writeln!(sink.borrow_mut(), "{}", line());
        }
    }

    pub fn hp_line(&self, line: impl FnOnce() -> String) {
        if let Some(sink) = &self.hp {
            let _ = writeln!(sink.borrow_mut(), "{}", line());
        }
    }

    /// Whether the calving-difficulty sink is open; its lines carry an
    /// extra phenotype the caller only computes when needed.
    #[inline]
    pub fn cd_enabled(&self) -> bool {
        self.cd.is_some()
    }

    pub fn cd_line(&self, line: impl FnOnce() -> String) {
        if let Some(sink) = &self.cd {
            let _ = writeln!(sink.borrow_mut(), "{}", line());
        }
    }

    pub fn carcass_line(&self, line: impl FnOnce() -> String) {
        if let Some(sink) = &self.carcass {
            let _ = writeln!(sink.borrow_mut(), "{}", line());
        }
    }

    /// Flush every open sink.
    pub fn flush(&self) {
        for sink in [&self.general, &self.stay, &self.hp, &self.cd, &self.carcass]
            .into_iter()
            .flatten()
        {
            let _ = sink.borrow_mut().flush();
        }
    }
}
