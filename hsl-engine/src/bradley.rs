//! Bradley method for bridges with piers.
//!
//! The head loss through the bridge is the sum of empirical coefficients
//! read from the Bradley abacus: abutment contraction `kb`, piers `dkp`,
//! eccentricity `dke` and skew `dks`. Each coefficient is only valid over a
//! range of the momentum-sharing ratio `m`; samples outside are dropped.

use hsl_core::element::{ElementKind, StructureElement};
use hsl_core::geometry::{SectionGeometry, VerticalCut};
use hsl_core::law::LawSample;
use hsl_core::method::Method;
use hsl_core::params::BradleyParams;
use hsl_core::store::{AbacusStore, ElementStore, ParameterStore};
use hsl_core::{LawError, Result};
use hsl_data::interpolation::{interp, lookup, Curve};
use hsl_utils::grid;

use crate::context::StructureContext;
use crate::diagnostics::{DiagnosticKind, Diagnostics};
use crate::submerged::{submerged_branch, FreeSurface};

const KB_TABLE: &str = "kb_abac";
const PIER_TABLE: &str = "DKp_abac";
const PIER_SCALE_TABLE: &str = "s_abac";
const ECCENTRICITY_TABLE: &str = "dKe_abac";
const SKEW_TABLE_A: &str = "dKs_casA_abac";
const SKEW_TABLE_B: &str = "dKs_casB_abac";
const SKEW_BEYOND_45: &str = "phi>45";

/// Blockage ratio above which the pier abacus of each form is extrapolated.
const PIER_BLOCKAGE_LIMITS: [f64; 8] = [0.057, 0.067, 0.095, 0.116, 0.14, 0.166, 0.18, 0.18];

pub fn pier_blockage_limit(form: i64) -> Option<f64> {
    usize::try_from(form - 1)
        .ok()
        .and_then(|i| PIER_BLOCKAGE_LIMITS.get(i))
        .copied()
}

/// Name of the `kb` curve matching the abutment configuration.
pub fn kb_curve_name(method: Method, params: &BradleyParams, total_opening: f64) -> &'static str {
    match method {
        Method::Bradley72 => match params.abutment_form {
            2 if params.wingwall_angle == 30.0 => "type2_30deg",
            2 => "type2_45to60deg",
            3 => match params.embankment_slope {
                0 => "type3_1:1",
                1 => "type3_1.5:1",
                _ => "type3_2:1",
            },
            _ => "type1",
        },
        _ => {
            if total_opening > 60.0 && params.abutment_form == 1 {
                "Others"
            } else {
                "type1<60m"
            }
        }
    }
}

/// Coefficients whose empirical range excludes `m`; empty when `m` is valid.
pub fn momentum_violations(m: f64) -> Vec<String> {
    if m.is_nan() {
        return vec!["m".to_string()];
    }
    let checks = [
        ("Kp", m < 0.45),
        ("Kb", m < 0.3),
        ("Ke", m < 0.2 || m > 1.0),
        ("Ks", m < 0.3 || m > 1.0),
    ];
    checks
        .iter()
        .filter(|(_, out)| *out)
        .map(|(name, _)| name.to_string())
        .collect()
}

/// Flow asymmetry between the two banks, 0 when balanced.
pub fn eccentricity(left: f64, right: f64) -> f64 {
    if left == right {
        0.0
    } else {
        1.0 - left.min(right) / left.max(right)
    }
}

/// Abacus curves resolved once per computation.
#[derive(Debug, Clone)]
struct BradleyCurves {
    kb: Curve,
    pier: Curve,
    pier_scale: Curve,
    /// (e, dke(m)) per eccentricity curve.
    eccentricity: Vec<(f64, Curve)>,
    /// (phi, dks(m)) per skew curve; empty when piers are not skewed.
    skew: Vec<(f64, Curve)>,
}

impl BradleyCurves {
    fn at_labels(curves: &[(f64, Curve)], m: f64, x: f64) -> f64 {
        let xs: Vec<f64> = curves.iter().map(|(v, _)| *v).collect();
        let ys: Vec<f64> = curves.iter().map(|(_, c)| c.at(m)).collect();
        interp(x, &xs, &ys).unwrap_or(0.0)
    }
}

pub struct BradleySolver<'a> {
    ctx: &'a StructureContext,
    geometry: &'a dyn SectionGeometry,
    params: BradleyParams,
    piers: Vec<StructureElement>,
    curves: BradleyCurves,
    flows: Vec<f64>,
    left_edge: f64,
    right_edge: f64,
    skew_correction: f64,
}

impl<'a> BradleySolver<'a> {
    pub fn new<S>(
        method: Method,
        ctx: &'a StructureContext,
        geometry: &'a dyn SectionGeometry,
        store: &S,
    ) -> Result<Self>
    where
        S: ParameterStore + AbacusStore + ElementStore + ?Sized,
    {
        if !method.is_bradley() {
            return Err(LawError::invalid_parameter("method", method));
        }
        let params = BradleyParams::from_map(&ctx.method_params(store, BradleyParams::KEYS)?)?;
        let piers = store.elements(ctx.structure_id, ElementKind::Pier)?;
        let abacus = store.abacus(method.abacus_groups())?;

        let kb_name = kb_curve_name(method, &params, ctx.opening_width);
        let pier_form = params.pier_form.to_string();
        let eccentricity_table = abacus.table(ECCENTRICITY_TABLE)?;
        let eccentricity = eccentricity_table
            .labelled("e")
            .into_iter()
            .map(|(name, e)| lookup(eccentricity_table, "M", &name).map(|c| (e, c)))
            .collect::<Result<Vec<_>>>()?;
        if eccentricity.is_empty() {
            return Err(LawError::MissingSeries {
                table: ECCENTRICITY_TABLE.to_string(),
                series: "e=".to_string(),
            });
        }

        let skew = if params.pier_skew == 0.0 {
            Vec::new()
        } else {
            let name = if params.abutment_skewed {
                SKEW_TABLE_B
            } else {
                SKEW_TABLE_A
            };
            let table = abacus.table(name)?;
            if params.opening_skew_deg > 45.0 {
                vec![(params.opening_skew_deg, lookup(table, "M", SKEW_BEYOND_45)?)]
            } else {
                let curves = table
                    .labelled("phi")
                    .into_iter()
                    .map(|(series, phi)| lookup(table, "M", &series).map(|c| (phi, c)))
                    .collect::<Result<Vec<_>>>()?;
                if curves.is_empty() {
                    return Err(LawError::MissingSeries {
                        table: name.to_string(),
                        series: "phi=".to_string(),
                    });
                }
                curves
            }
        };

        let curves = BradleyCurves {
            kb: lookup(abacus.table(KB_TABLE)?, "M", kb_name)?,
            pier: lookup(abacus.table(PIER_TABLE)?, "J", &pier_form)?,
            pier_scale: lookup(abacus.table(PIER_SCALE_TABLE)?, "M", &pier_form)?,
            eccentricity,
            skew,
        };

        let flows = grid::stepped(
            params.flows.min_flow,
            params.flows.max_flow,
            ctx.general.flow_step,
        )
        .map_err(|e| LawError::invalid_parameter("flow grid", e))?;

        if piers.len() != ctx.general.pier_count as usize {
            log::warn!(
                "[HSL Debug] bradley: {} spans expect {} piers, structure {} has {}",
                ctx.general.span_count,
                ctx.general.pier_count,
                ctx.structure_id,
                piers.len()
            );
        }

        let left_edge = ctx.general.first_bay_station;
        let right_edge =
            left_edge + ctx.opening_width + params.pier_width * piers.len() as f64;
        let skew_correction = params.skew_correction();

        log::debug!(
            "[HSL Debug] bradley: kb curve {}, {} piers, structure between {} and {}",
            kb_name,
            piers.len(),
            left_edge,
            right_edge
        );

        Ok(Self {
            ctx,
            geometry,
            params,
            piers,
            curves,
            flows,
            left_edge,
            right_edge,
            skew_correction,
        })
    }

    pub fn flows(&self) -> &[f64] {
        &self.flows
    }

    /// Upstream level for flow `q` at downstream level `zav`.
    ///
    /// `None` when the sample leaves the application domain of the method.
    pub fn sample(&self, zav: f64, q: f64, diagnostics: &mut Diagnostics) -> Option<LawSample> {
        let g = self.geometry;
        let gravity = self.ctx.settings.gravity;
        let still = LawSample::still_water(self.ctx.settings.min_flow, zav);

        let wet = g.clip_horizontal(&self.ctx.profile, zav);
        let wet_area = g.area(&wet);
        if wet_area <= 0.0 {
            return Some(still);
        }
        let velocity = q / wet_area;

        let mut pier_area = 0.0;
        let mut pier_projected = 0.0;
        for pier in &self.piers {
            let area = g.wet_area(&pier.shape, zav);
            if self.params.opening_skew != 0.0 {
                pier_projected += area * self.skew_correction;
            }
            pier_area += area;
        }
        if pier_projected == 0.0 {
            pier_projected = pier_area;
        }

        let structure_area = g.area(&g.clip_vertical(
            &wet,
            VerticalCut::Between(self.left_edge, self.right_edge),
        ));
        let q_structure = structure_area * velocity;
        let q_left = g.area(&g.clip_vertical(&wet, VerticalCut::Left(self.left_edge))) * velocity;
        let q_right =
            g.area(&g.clip_vertical(&wet, VerticalCut::Right(self.right_edge))) * velocity;
        let q_total = q_structure + q_left + q_right;
        if q_total == 0.0 {
            return Some(still);
        }

        let m = q_structure / q_total;
        let violations = momentum_violations(m);
        if !violations.is_empty() {
            diagnostics.record(
                q,
                zav,
                DiagnosticKind::MomentumOutOfDomain {
                    m,
                    coefficients: violations,
                },
            );
            return None;
        }

        let contracted = structure_area - pier_projected;
        if contracted <= 0.0 {
            diagnostics.record(
                q,
                zav,
                DiagnosticKind::NoContractedSection { area: contracted },
            );
            return None;
        }
        let va = q / contracted;

        let kb = self.curves.kb.at(m);
        let j = self.pier_blockage(pier_projected / structure_area, q, zav, diagnostics);
        let dkp = self.curves.pier.at(j) * self.curves.pier_scale.at(m);
        let dke = BradleyCurves::at_labels(
            &self.curves.eccentricity,
            m,
            eccentricity(q_left, q_right),
        );
        let dks = if self.curves.skew.is_empty() {
            0.0
        } else {
            BradleyCurves::at_labels(&self.curves.skew, m, self.params.opening_skew_deg).max(0.0)
        };

        let velocity_head = va * va / (2.0 * gravity);
        let term1 = (kb + dkp + dke + dks) * velocity_head;
        let upstream_area = g.wet_area(&self.ctx.profile, zav + term1).max(wet_area);
        let term2 = ((contracted / wet_area).powi(2) - (contracted / upstream_area).powi(2))
            * velocity_head;

        Some(LawSample::new(q, zav, zav + term1 + term2))
    }

    fn pier_blockage(&self, j: f64, q: f64, zav: f64, diagnostics: &mut Diagnostics) -> f64 {
        let form = self.params.pier_form;
        let Some(limit) = pier_blockage_limit(form) else {
            return j;
        };
        if j <= limit {
            return j;
        }
        diagnostics.record(q, zav, DiagnosticKind::PierBlockage { form, j, limit });
        if form == 8 {
            limit
        } else {
            j
        }
    }

    /// Free-surface sweep of one downstream level, cut at the transition.
    pub fn free_surface(&self, zav: f64, diagnostics: &mut Diagnostics) -> FreeSurface {
        let z_transition = self.ctx.transition_elevation();
        let mut free = FreeSurface::default();
        for &q in &self.flows {
            let Some(sample) = self.sample(zav, q, diagnostics) else {
                continue;
            };
            if sample.zam > z_transition {
                free.limit = Some(sample);
                break;
            }
            free.samples.push(sample);
        }
        free
    }

    /// Law of one downstream level: free surface, then flow under load.
    pub fn level_law(&self, zav: f64, diagnostics: &mut Diagnostics) -> Vec<LawSample> {
        let free = self.free_surface(zav, diagnostics);
        let max_flow = self.params.flows.max_flow;
        if free.max_flow().is_some_and(|q| q >= max_flow) {
            return free.samples;
        }

        let ctx = self.ctx;
        let branch = submerged_branch(
            &free,
            &ctx.levels,
            &self.flows,
            zav,
            ctx.transition_elevation(),
            max_flow,
            ctx.settings.min_flow,
            |zam| ctx.orifice_flow(zam, zav) + ctx.deck_overflow(zam, zav),
        );
        free.samples.into_iter().chain(branch).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::fixtures::bridge;
    use hsl_core::geometry::GeoClipper;
    use hsl_core::params::{keys, ParamMap, ParamValue};
    use hsl_core::settings::LawSettings;

    fn bradley_params() -> BradleyParams {
        let mut map = ParamMap::new(1);
        for (name, v) in [
            (keys::MIN_FLOW, 10.0),
            (keys::MAX_FLOW, 200.0),
            (keys::ABUTMENT_FORM, 1.0),
            (keys::ABUTMENT_SKEW, 0.0),
            (keys::PIER_WIDTH, 2.0),
            (keys::PIER_LENGTH, 8.0),
            (keys::PIER_FORM, 1.0),
        ] {
            map.insert(name, ParamValue::Number(v));
        }
        BradleyParams::from_map(&map).unwrap()
    }

    #[test]
    fn kb_curve_for_bradley_78() {
        let params = bradley_params();
        assert_eq!(kb_curve_name(Method::Bradley78, &params, 24.0), "type1<60m");
        assert_eq!(kb_curve_name(Method::Bradley78, &params, 80.0), "Others");
    }

    #[test]
    fn kb_curve_for_bradley_72() {
        let mut params = bradley_params();
        assert_eq!(kb_curve_name(Method::Bradley72, &params, 80.0), "type1");
        params.abutment_form = 2;
        params.wingwall_angle = 30.0;
        assert_eq!(kb_curve_name(Method::Bradley72, &params, 80.0), "type2_30deg");
        params.wingwall_angle = 45.0;
        assert_eq!(kb_curve_name(Method::Bradley72, &params, 80.0), "type2_45to60deg");
        params.abutment_form = 3;
        params.embankment_slope = 1;
        assert_eq!(kb_curve_name(Method::Bradley72, &params, 80.0), "type3_1.5:1");
        params.embankment_slope = 4;
        assert_eq!(kb_curve_name(Method::Bradley72, &params, 80.0), "type3_2:1");
        params.abutment_form = 9;
        assert_eq!(kb_curve_name(Method::Bradley72, &params, 80.0), "type1");
    }

    #[test]
    fn momentum_domain() {
        assert!(momentum_violations(0.5).is_empty());
        assert_eq!(momentum_violations(0.25), vec!["Kp", "Kb", "Ks"]);
        assert_eq!(momentum_violations(1.2), vec!["Ke", "Ks"]);
        assert_eq!(momentum_violations(f64::NAN), vec!["m"]);
    }

    #[test]
    fn blockage_limits() {
        assert_eq!(pier_blockage_limit(1), Some(0.057));
        assert_eq!(pier_blockage_limit(8), Some(0.18));
        assert_eq!(pier_blockage_limit(0), None);
        assert_eq!(pier_blockage_limit(9), None);
    }

    #[test]
    fn eccentricity_is_symmetric() {
        assert_eq!(eccentricity(5.0, 5.0), 0.0);
        assert!((eccentricity(2.0, 8.0) - 0.75).abs() < 1e-12);
        assert_eq!(eccentricity(8.0, 2.0), eccentricity(2.0, 8.0));
    }

    fn context(store: &crate::context::fixtures::MemoryStore) -> StructureContext {
        StructureContext::load(store, &GeoClipper, 1, &LawSettings::default()).unwrap()
    }

    #[test]
    fn degenerate_section_gives_still_water() {
        let store = bridge();
        let ctx = context(&store);
        let solver = BradleySolver::new(Method::Bradley78, &ctx, &GeoClipper, &store).unwrap();
        let mut d = Diagnostics::new();
        let sample = solver.sample(-1.0, 50.0, &mut d).unwrap();
        assert_eq!(sample, LawSample::new(1e-4, -1.0, -1.0));
        assert!(d.is_empty());
    }

    #[test]
    fn sample_raises_upstream_level() {
        let store = bridge();
        let ctx = context(&store);
        let solver = BradleySolver::new(Method::Bradley78, &ctx, &GeoClipper, &store).unwrap();
        let mut d = Diagnostics::new();
        // m = 52 / 64, j = 4 / 52 above the form 1 limit.
        let sample = solver.sample(2.0, 50.0, &mut d).unwrap();
        assert_eq!(sample.q, 50.0);
        assert!(sample.zam > 2.0);
        assert_eq!(d.len(), 1);
        assert!(matches!(
            d.iter().next().map(|x| &x.kind),
            Some(DiagnosticKind::PierBlockage { form: 1, .. })
        ));
    }

    #[test]
    fn off_centre_structure_is_rejected() {
        let mut store = bridge();
        store.set(keys::FIRST_BAY_STATION, 30.0);
        let ctx = context(&store);
        let solver = BradleySolver::new(Method::Bradley78, &ctx, &GeoClipper, &store).unwrap();
        let mut d = Diagnostics::new();
        assert_eq!(solver.sample(2.0, 50.0, &mut d), None);
        assert!(matches!(
            d.iter().next().map(|x| &x.kind),
            Some(DiagnosticKind::MomentumOutOfDomain { .. })
        ));
    }

    #[test]
    fn missing_kb_curve_is_configuration_error() {
        let mut store = bridge();
        store.set(keys::ABUTMENT_FORM, 3.0);
        let ctx = context(&store);
        let err = BradleySolver::new(Method::Bradley72, &ctx, &GeoClipper, &store)
            .err()
            .unwrap();
        assert!(err.is_configuration());
    }

    #[test]
    fn skewed_piers_add_head_loss() {
        let store = bridge();
        let ctx = context(&store);
        let straight = BradleySolver::new(Method::Bradley78, &ctx, &GeoClipper, &store).unwrap();

        let mut skewed_store = bridge();
        skewed_store.set(keys::PIER_SKEW, 1.0);
        skewed_store.set(keys::OPENING_SKEW, 30.0);
        let skewed_ctx = context(&skewed_store);
        let skewed =
            BradleySolver::new(Method::Bradley78, &skewed_ctx, &GeoClipper, &skewed_store)
                .unwrap();

        let mut d = Diagnostics::new();
        let a = straight.sample(2.0, 50.0, &mut d).unwrap();
        let b = skewed.sample(2.0, 50.0, &mut d).unwrap();
        assert!(b.zam > a.zam);
    }

    #[test]
    fn level_law_stays_above_downstream() {
        let store = bridge();
        let ctx = context(&store);
        let solver = BradleySolver::new(Method::Bradley78, &ctx, &GeoClipper, &store).unwrap();
        let mut d = Diagnostics::new();
        let law = solver.level_law(2.0, &mut d);
        assert!(!law.is_empty());
        for s in &law {
            assert_eq!(s.zav, 2.0);
            assert!(s.zam >= s.zav);
        }
    }
}
