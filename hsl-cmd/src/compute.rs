//! Law computation commands.

use std::fmt;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::Context;
use hsl_core::geometry::GeoClipper;
use hsl_core::method::Method;
use hsl_core::settings::LawSettings;
use hsl_db::Database;
use hsl_engine::{compute_law, LawOutcome, LawReport};
use log::{info, warn};

use crate::export;

/// Compute and store the law of one structure.
pub fn compute_structure(
    db: &Database,
    settings: &LawSettings,
    method: Method,
    structure_id: i64,
) -> anyhow::Result<LawReport> {
    let mut last = 0.0;
    let mut progress = |percent: f64| {
        if percent >= last + 25.0 || percent >= 100.0 {
            info!("{} law of structure {}: {:.0}%", method, structure_id, percent);
            last = percent;
        }
    };
    let report = compute_law(db, &GeoClipper, settings, method, structure_id, &mut progress)
        .with_context(|| format!("{} law of structure {}", method, structure_id))?;
    Ok(report)
}

/// Write a report as a law table, or as JSON with its diagnostics.
///
/// `output` defaults to stdout. A deactivated structure writes its reason
/// instead of a table.
pub fn write_report(report: &LawReport, output: Option<&Path>, json: bool) -> anyhow::Result<()> {
    let mut out: Box<dyn Write> = match output {
        Some(path) => Box::new(BufWriter::new(
            File::create(path).with_context(|| format!("cannot create {}", path.display()))?,
        )),
        None => Box::new(io::stdout().lock()),
    };

    if json {
        serde_json::to_writer_pretty(&mut out, report)?;
        writeln!(out)?;
    } else {
        match &report.outcome {
            LawOutcome::Saved { table } => export::write_table(&mut out, table)?,
            LawOutcome::Deactivated { reason, .. } => writeln!(out, "{}", reason)?,
        }
    }
    out.flush()?;
    Ok(())
}

/// Output file of one structure in a batch run, e.g. `7_bradley_78.csv`.
pub fn table_path(dir: &Path, method: Method, structure_id: i64) -> PathBuf {
    let slug = method.as_str().to_ascii_lowercase().replace(' ', "_");
    dir.join(format!("{}_{}.csv", structure_id, slug))
}

/// Outcome counts of a batch run.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct BatchSummary {
    pub saved: usize,
    pub deactivated: usize,
    /// Structures whose computation failed, with the error.
    pub failed: Vec<(i64, String)>,
}

impl fmt::Display for BatchSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} saved, {} deactivated, {} failed",
            self.saved,
            self.deactivated,
            self.failed.len()
        )?;
        for (id, error) in &self.failed {
            write!(f, "\n  structure {}: {}", id, error)?;
        }
        Ok(())
    }
}

/// Compute every active structure, writing one table per saved law.
///
/// A failing structure is recorded and the batch goes on.
pub fn compute_all(
    db: &Database,
    settings: &LawSettings,
    method: Method,
    output_dir: &Path,
) -> anyhow::Result<BatchSummary> {
    std::fs::create_dir_all(output_dir)
        .with_context(|| format!("cannot create {}", output_dir.display()))?;

    let structures: Vec<_> = db
        .query_structures()?
        .into_iter()
        .filter(|s| s.active)
        .collect();
    info!("Computing {} laws for {} active structures", method, structures.len());

    let mut summary = BatchSummary::default();
    for structure in structures {
        match compute_structure(db, settings, method, structure.id) {
            Ok(report) if report.is_saved() => {
                let path = table_path(output_dir, method, structure.id);
                write_report(&report, Some(path.as_path()), false)?;
                summary.saved += 1;
            }
            Ok(_) => summary.deactivated += 1,
            Err(e) => {
                warn!("{} ({}): {:#}", structure.name, structure.id, e);
                summary.failed.push((structure.id, format!("{:#}", e)));
            }
        }
    }
    info!("Batch complete: {}", summary);
    Ok(summary)
}
