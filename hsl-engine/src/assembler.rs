//! Law assembly: drive a method over the level grid, stitch and complete
//! the raw samples, then hand the table to the sink.

use serde::Serialize;

use hsl_core::geometry::SectionGeometry;
use hsl_core::law::LawSample;
use hsl_core::method::Method;
use hsl_core::settings::LawSettings;
use hsl_core::store::{AbacusStore, ElementStore, LawSink, ParameterStore, Progress};
use hsl_core::Result;
use hsl_data::law::{complete_law, stitch_transitions};

use crate::borda::BordaSolver;
use crate::bradley::BradleySolver;
use crate::context::StructureContext;
use crate::diagnostics::{Diagnostic, Diagnostics};
use crate::orifice;

/// Share of the progress bar taken by the level sweep of each method.
const BRADLEY_SWEEP_SHARE: f64 = 75.0;
const ORIFICE_SWEEP_SHARE: f64 = 90.0;

/// What happened to the structure.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum LawOutcome {
    /// The table was handed to the sink.
    Saved { table: Vec<LawSample> },
    /// No sample survived; the structure was deactivated.
    Deactivated { name: String, reason: String },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LawReport {
    pub method: Method,
    pub structure_id: i64,
    #[serde(flatten)]
    pub outcome: LawOutcome,
    pub diagnostics: Vec<Diagnostic>,
}

impl LawReport {
    /// The saved table, empty when the structure was deactivated.
    pub fn table(&self) -> &[LawSample] {
        match &self.outcome {
            LawOutcome::Saved { table } => table,
            LawOutcome::Deactivated { .. } => &[],
        }
    }

    pub fn is_saved(&self) -> bool {
        matches!(self.outcome, LawOutcome::Saved { .. })
    }
}

/// Advisory attached to a structure whose law came out empty.
pub fn deactivation_message(name: &str) -> String {
    format!(
        "No values for the law because the coefficients leave application domain of the method. \
         The <<{}>> hydraulic structure is deactivated",
        name
    )
}

/// Raw samples of a method with the flow grid and transition levels they use.
struct RawLaw {
    samples: Vec<LawSample>,
    flows: Vec<f64>,
    transitions: Vec<f64>,
}

/// Compute the law of one structure with `method` and store it.
///
/// Inputs are read fresh from `store`. An empty result deactivates the
/// structure through the sink instead of saving an empty table.
pub fn compute_law<S>(
    store: &S,
    geometry: &dyn SectionGeometry,
    settings: &LawSettings,
    method: Method,
    structure_id: i64,
    progress: &mut dyn Progress,
) -> Result<LawReport>
where
    S: ParameterStore + AbacusStore + ElementStore + LawSink + ?Sized,
{
    log::info!(
        "[HSL Debug] assembler: computing {} law for structure {}",
        method,
        structure_id
    );
    let ctx = StructureContext::load(store, geometry, structure_id, settings)?;
    let mut diagnostics = Diagnostics::new();

    let raw = match method {
        Method::Bradley78 | Method::Bradley72 => {
            let solver = BradleySolver::new(method, &ctx, geometry, store)?;
            let samples = sweep_levels(&ctx, progress, |zav| {
                Ok(solver.level_law(zav, &mut diagnostics))
            })?;
            RawLaw {
                samples,
                flows: solver.flows().to_vec(),
                transitions: vec![ctx.transition_elevation()],
            }
        }
        Method::Borda => {
            let solver = BordaSolver::new(&ctx, geometry, store)?;
            let samples = sweep_levels(&ctx, progress, |zav| solver.level_law(zav))?;
            RawLaw {
                samples,
                flows: solver.flows().to_vec(),
                transitions: vec![ctx.general.deck_top],
            }
        }
        Method::Orifice => {
            let n = ctx.levels.len() as f64;
            let (samples, flows) = orifice::resampled_law(&ctx, |i| {
                progress.report(ORIFICE_SWEEP_SHARE * (i + 1) as f64 / n)
            });
            RawLaw {
                samples,
                flows,
                transitions: orifice::transition_elevations(&ctx),
            }
        }
    };

    let raw_count = raw.samples.len();
    let stitched = stitch_transitions(raw.samples, &raw.flows, &raw.transitions);
    let table = complete_law(stitched, &raw.flows);
    progress.report(90.0);

    log::info!(
        "[HSL Debug] assembler: {} raw samples, {} in the final table, {} rejected",
        raw_count,
        table.len(),
        diagnostics.len()
    );

    let outcome = if table.is_empty() {
        let name = store.structure_name(structure_id)?;
        let reason = deactivation_message(&name);
        log::warn!("{}", reason);
        store.deactivate_and_notify(structure_id, &reason)?;
        LawOutcome::Deactivated { name, reason }
    } else {
        store.save_law(method, structure_id, &table)?;
        LawOutcome::Saved { table }
    };
    progress.report(100.0);

    Ok(LawReport {
        method,
        structure_id,
        outcome,
        diagnostics: diagnostics.into_vec(),
    })
}

/// Run `level_law` on every downstream level, in order.
fn sweep_levels<F>(
    ctx: &StructureContext,
    progress: &mut dyn Progress,
    mut level_law: F,
) -> Result<Vec<LawSample>>
where
    F: FnMut(f64) -> Result<Vec<LawSample>>,
{
    let n = ctx.levels.len() as f64;
    let mut samples = Vec::new();
    for (i, &zav) in ctx.levels.iter().enumerate() {
        samples.extend(level_law(zav)?);
        progress.report(BRADLEY_SWEEP_SHARE * (i + 1) as f64 / n);
    }
    Ok(samples)
}
