//! Orifice method for culverts and submerged openings.
//!
//! Unlike the free-surface solvers, the sweep runs over upstream levels: for
//! each downstream level the flow of every upstream level above it is read
//! directly from the orifice and deck weir laws.

use hsl_core::law::LawSample;
use hsl_data::law::resample_on_flows;
use hsl_utils::grid;

use crate::context::StructureContext;

/// Raw law of one downstream level.
///
/// A still-water sample opens the curve when `zav` sits on the level grid.
/// Flows at or under the minimal flow are floored to it.
pub fn level_law(ctx: &StructureContext, zav: f64) -> Vec<LawSample> {
    let min_flow = ctx.settings.min_flow;
    let Some(start) = grid::first_above(&ctx.levels, zav) else {
        return Vec::new();
    };

    let mut samples = Vec::with_capacity(ctx.levels.len() - start + 1);
    if start > 0 && ctx.levels[start - 1] == zav {
        samples.push(LawSample::still_water(min_flow, zav));
    }
    for &zam in &ctx.levels[start..] {
        let q = ctx.orifice_flow(zam, zav) + ctx.deck_overflow(zam, zav);
        samples.push(LawSample::new(q.max(min_flow), zav, zam));
    }
    samples
}

/// Law of every downstream level on a common flow grid, and that grid.
pub fn resampled_law<P>(ctx: &StructureContext, mut on_level: P) -> (Vec<LawSample>, Vec<f64>)
where
    P: FnMut(usize),
{
    let mut samples = Vec::new();
    for (i, &zav) in ctx.levels.iter().enumerate() {
        samples.extend(level_law(ctx, zav));
        on_level(i);
    }
    let (law, flows) = resample_on_flows(&samples, ctx.general.flow_step);
    log::debug!(
        "[HSL Debug] orifice: {} raw samples resampled on {} flows",
        samples.len(),
        flows.len()
    );
    (law, flows)
}

/// Distinct opening tops, where each opening starts running full.
pub fn transition_elevations(ctx: &StructureContext) -> Vec<f64> {
    let mut tops: Vec<f64> = ctx.openings.iter().map(|o| o.z_max).collect();
    tops.sort_by(|a, b| a.total_cmp(b));
    tops.dedup();
    tops
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::fixtures::bridge;
    use hsl_core::geometry::GeoClipper;
    use hsl_core::params::keys;
    use hsl_core::settings::LawSettings;

    fn context() -> StructureContext {
        StructureContext::load(&bridge(), &GeoClipper, 1, &LawSettings::default()).unwrap()
    }

    #[test]
    fn level_starts_from_still_water() {
        let ctx = context();
        let law = level_law(&ctx, 2.0);
        assert_eq!(law[0], LawSample::new(1e-4, 2.0, 2.0));
        // Still water, then the twelve levels from 2.5 to 8.0.
        assert_eq!(law.len(), 13);
        assert!(law.windows(2).all(|w| w[0].q <= w[1].q));
    }

    #[test]
    fn level_rises_through_opening_top_without_band() {
        let mut store = bridge();
        store.set(keys::ORIFICE_BAND, 0.0);
        let ctx = StructureContext::load(&store, &GeoClipper, 1, &LawSettings::default()).unwrap();
        let law = level_law(&ctx, 2.0);
        let at_top = law.iter().find(|s| s.zam == 5.0).unwrap();
        assert!(at_top.q > 1.0);
        assert!(law.windows(2).all(|w| w[0].q <= w[1].q));
    }

    #[test]
    fn top_level_has_no_law() {
        let ctx = context();
        assert!(level_law(&ctx, 8.0).is_empty());
    }

    #[test]
    fn resampling_gives_common_grid() {
        let ctx = context();
        let mut visited = 0;
        let (law, flows) = resampled_law(&ctx, |_| visited += 1);
        assert_eq!(visited, ctx.levels.len());
        assert_eq!(flows[0], 1e-4);
        for zav in &ctx.levels[..ctx.levels.len() - 1] {
            let count = law.iter().filter(|s| s.zav == *zav).count();
            assert_eq!(count, flows.len());
        }
    }

    #[test]
    fn single_transition_for_equal_tops() {
        assert_eq!(transition_elevations(&context()), vec![5.0]);
    }
}
