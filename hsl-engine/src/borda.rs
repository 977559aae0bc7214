//! Borda method for abrupt contractions.
//!
//! The upstream level is first found by dichotomy on the weir law of the
//! openings. When the structure is drowned enough and the openings take a
//! large share of the section, the Borda head-loss formula is used instead.

use hsl_core::geometry::SectionGeometry;
use hsl_core::law::LawSample;
use hsl_core::params::BordaParams;
use hsl_core::store::ParameterStore;
use hsl_core::{LawError, Result};
use hsl_utils::grid;

use crate::context::StructureContext;
use crate::flow::{borda_flow, borda_level, dichotomy_level};
use crate::submerged::{submerged_branch, FreeSurface};

/// Submergence ratio above which the Borda formula applies.
const SUBMERGENCE_RATIO: f64 = 2.0 / 3.0;
/// Minimal share of the downstream section taken by the openings.
const CONTRACTION_RATIO: f64 = 0.25;

pub struct BordaSolver<'a> {
    ctx: &'a StructureContext,
    geometry: &'a dyn SectionGeometry,
    params: BordaParams,
    flows: Vec<f64>,
    crests: Vec<(f64, f64)>,
}

/// Free-surface sweep of one level and whether it ended on the weir law.
struct Sweep {
    free: FreeSurface,
    weir_only: bool,
}

impl<'a> BordaSolver<'a> {
    pub fn new<S>(ctx: &'a StructureContext, geometry: &'a dyn SectionGeometry, store: &S) -> Result<Self>
    where
        S: ParameterStore + ?Sized,
    {
        let params = BordaParams::from_map(&ctx.method_params(store, BordaParams::KEYS)?)?;
        let flows = grid::stepped(
            params.flows.min_flow,
            params.flows.max_flow,
            ctx.general.flow_step,
        )
        .map_err(|e| LawError::invalid_parameter("flow grid", e))?;
        Ok(Self {
            ctx,
            geometry,
            params,
            flows,
            crests: ctx.opening_crests(),
        })
    }

    pub fn flows(&self) -> &[f64] {
        &self.flows
    }

    fn opening_area(&self, zav: f64) -> f64 {
        self.ctx
            .openings
            .iter()
            .map(|o| self.geometry.wet_area(&o.shape, zav))
            .sum()
    }

    fn sweep(&self, zav: f64) -> Result<Sweep> {
        let ctx = self.ctx;
        let invert = ctx.lowest_invert();
        let deck_top = ctx.general.deck_top;
        let down_area = self.geometry.wet_area(&ctx.profile, zav);
        let opening_area = self.opening_area(zav);
        let weir = ctx.weir_law();

        let mut free = FreeSurface::default();
        let mut weir_only = false;
        for &q in &self.flows {
            let mut zam = dichotomy_level(
                q,
                zav,
                invert,
                ctx.top_level(),
                &self.crests,
                &weir,
                &ctx.settings,
            )?;
            if zav <= invert {
                weir_only = true;
            } else if (zav - invert) / (zam - invert) > SUBMERGENCE_RATIO
                && opening_area / down_area > CONTRACTION_RATIO
            {
                zam = borda_level(
                    down_area,
                    opening_area,
                    q,
                    zav,
                    self.params.borda_coef,
                    ctx.settings.gravity,
                );
                weir_only = false;
            } else {
                weir_only = true;
            }

            let sample = LawSample::new(q, zav, zam);
            if zam > deck_top {
                free.limit = Some(sample);
                break;
            }
            free.samples.push(sample);
        }
        Ok(Sweep { free, weir_only })
    }

    /// Law of one downstream level.
    pub fn level_law(&self, zav: f64) -> Result<Vec<LawSample>> {
        let Sweep { free, weir_only } = self.sweep(zav)?;
        let max_flow = self.params.flows.max_flow;
        if let Some(q) = free.max_flow() {
            if q >= max_flow || weir_only {
                return Ok(free.samples);
            }
        }

        let ctx = self.ctx;
        let deck_area = self.geometry.wet_area(&ctx.profile, ctx.general.deck_top);
        let opening_area = self.opening_area(zav);
        let coef = self.params.borda_coef;
        let gravity = ctx.settings.gravity;
        let branch = submerged_branch(
            &free,
            &ctx.levels,
            &self.flows,
            zav,
            ctx.general.deck_top,
            max_flow,
            ctx.settings.min_flow,
            |zam| {
                borda_flow(deck_area, opening_area, zam, zav, coef, gravity)
                    + ctx.deck_overflow(zam, zav)
            },
        );
        Ok(free.samples.into_iter().chain(branch).collect())
    }
}
