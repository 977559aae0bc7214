//! Flow under load, shared by the Bradley and Borda solvers.
//!
//! Once the free-surface branch of a downstream level reaches the transition
//! elevation, the law continues on the upstream level grid with a closed-form
//! flow and is resampled back onto the flow grid.

use hsl_core::law::LawSample;
use hsl_data::interpolation::interp;
use hsl_data::law::resample_branch;
use hsl_utils::grid;

/// Free-surface samples of one downstream level.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FreeSurface {
    pub samples: Vec<LawSample>,
    /// First sample whose upstream level crossed the transition elevation.
    pub limit: Option<LawSample>,
}

impl FreeSurface {
    pub fn max_flow(&self) -> Option<f64> {
        self.samples.iter().map(|s| s.q).reduce(f64::max)
    }
}

/// Seed of the submerged branch and the upstream level it starts from.
///
/// The seed holds the last free-surface sample and, when the sweep was cut
/// at the transition, the sample interpolated exactly on it. Without any
/// free-surface sample the branch starts from still water.
pub fn branch_seed(
    free: &FreeSurface,
    zav: f64,
    z_transition: f64,
    min_flow: f64,
) -> (Vec<LawSample>, f64) {
    let Some(last) = free.samples.last().copied() else {
        return (vec![LawSample::still_water(min_flow, zav)], zav);
    };
    match free.limit {
        Some(limit) => {
            let q = interp(z_transition, &[last.zam, limit.zam], &[last.q, limit.q])
                .unwrap_or(last.q);
            (vec![last, LawSample::new(q, zav, z_transition)], z_transition)
        }
        None => (vec![last], last.zam),
    }
}

/// Extend `branch` over the upstream levels above `from_zam`.
///
/// Levels equal to `zav` and levels carrying no flow are skipped; the sweep
/// stops after the first flow above `max_flow`.
pub fn extend_branch<F>(
    mut branch: Vec<LawSample>,
    levels: &[f64],
    zav: f64,
    from_zam: f64,
    max_flow: f64,
    flow_at: F,
) -> Vec<LawSample>
where
    F: Fn(f64) -> f64,
{
    let Some(start) = grid::first_above(levels, from_zam) else {
        return branch;
    };
    for &zam in &levels[start..] {
        if zam == zav {
            continue;
        }
        let q = flow_at(zam);
        if q == 0.0 {
            continue;
        }
        branch.push(LawSample::new(q, zav, zam));
        if q > max_flow {
            break;
        }
    }
    branch
}

/// Submerged branch of one downstream level, on the flow grid.
#[allow(clippy::too_many_arguments)]
pub fn submerged_branch<F>(
    free: &FreeSurface,
    levels: &[f64],
    flows: &[f64],
    zav: f64,
    z_transition: f64,
    max_flow: f64,
    min_flow: f64,
    flow_at: F,
) -> Vec<LawSample>
where
    F: Fn(f64) -> f64,
{
    let (seed, from_zam) = branch_seed(free, zav, z_transition, min_flow);
    let branch = extend_branch(seed, levels, zav, from_zam, max_flow, flow_at);
    resample_branch(&branch, flows)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seed_from_still_water() {
        let (seed, from) = branch_seed(&FreeSurface::default(), 1.5, 5.0, 1e-4);
        assert_eq!(seed, vec![LawSample::new(1e-4, 1.5, 1.5)]);
        assert_eq!(from, 1.5);
    }

    #[test]
    fn seed_interpolates_on_transition() {
        let free = FreeSurface {
            samples: vec![LawSample::new(40.0, 1.0, 4.0)],
            limit: Some(LawSample::new(50.0, 1.0, 6.0)),
        };
        let (seed, from) = branch_seed(&free, 1.0, 5.0, 1e-4);
        assert_eq!(from, 5.0);
        assert_eq!(seed[1], LawSample::new(45.0, 1.0, 5.0));
    }

    #[test]
    fn seed_without_limit_starts_at_last_sample() {
        let free = FreeSurface {
            samples: vec![LawSample::new(10.0, 1.0, 2.0), LawSample::new(20.0, 1.0, 3.0)],
            limit: None,
        };
        let (seed, from) = branch_seed(&free, 1.0, 5.0, 1e-4);
        assert_eq!(seed.len(), 1);
        assert_eq!(from, 3.0);
    }

    #[test]
    fn extension_stops_after_max_flow() {
        let levels = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0];
        let branch = extend_branch(Vec::new(), &levels, 1.0, 1.0, 25.0, |zam| 10.0 * zam);
        let zams: Vec<f64> = branch.iter().map(|s| s.zam).collect();
        assert_eq!(zams, vec![2.0, 3.0]);
    }

    #[test]
    fn extension_skips_dry_levels() {
        let levels = [1.0, 2.0, 3.0];
        let branch = extend_branch(Vec::new(), &levels, 1.0, 1.0, 100.0, |zam| {
            if zam < 2.5 {
                0.0
            } else {
                5.0
            }
        });
        assert_eq!(branch, vec![LawSample::new(5.0, 1.0, 3.0)]);
    }

    #[test]
    fn branch_resampled_on_flow_grid() {
        let free = FreeSurface {
            samples: vec![LawSample::new(10.0, 1.0, 2.0)],
            limit: None,
        };
        let levels = [1.0, 2.0, 3.0, 4.0];
        let flows = [10.0, 20.0, 30.0];
        let branch =
            submerged_branch(&free, &levels, &flows, 1.0, 5.0, 30.0, 1e-4, |zam| 10.0 * zam);
        // Branch (10, 2), (30, 3), (40, 4) sampled at 20 and 30.
        assert_eq!(branch.len(), 2);
        assert_eq!(branch[0].q, 20.0);
        assert!((branch[0].zam - 2.5).abs() < 1e-12);
        assert!((branch[1].zam - 3.0).abs() < 1e-12);
    }
}
