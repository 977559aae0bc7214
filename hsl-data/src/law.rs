//! Post-processing of raw law samples.
//!
//! Solvers produce one curve per downstream level, each sampled at the flows
//! it happened to reach. The functions here stitch the free-surface and
//! pressurized regimes together, remove duplicate nodes and fill the missing
//! ones so that every downstream level carries the same flows.

use hsl_core::law::LawSample;

use crate::interpolation::interp;

/// Samples sorted by (q, zav, zam).
pub fn sort_law(mut samples: Vec<LawSample>) -> Vec<LawSample> {
    samples.sort_by(LawSample::lexical_cmp);
    samples
}

/// Sort and keep a single sample per (q, zav) node, the one with the lowest zam.
pub fn dedup_nodes(samples: Vec<LawSample>) -> Vec<LawSample> {
    let mut sorted = sort_law(samples);
    sorted.dedup_by(|b, a| a.same_node(b));
    sorted
}

/// Distinct values of `values`, ascending.
fn distinct(mut values: Vec<f64>) -> Vec<f64> {
    values.sort_by(|a, b| a.total_cmp(b));
    values.dedup();
    values
}

/// Samples carrying exactly the flow `q`, from a law sorted by [`sort_law`].
fn flow_group(sorted: &[LawSample], q: f64) -> &[LawSample] {
    let start = sorted.partition_point(|s| s.q < q);
    let end = start + sorted[start..].partition_point(|s| s.q == q);
    &sorted[start..end]
}

/// Three samples per flow that soften the kink at `z_transition`.
///
/// For each flow, the two consecutive samples (by downstream level) that
/// bracket the transition are located: the last one whose upstream level is
/// still below `z_transition`, and the next one. Three points are injected
/// between them at downstream levels placed symmetrically around the mean of
/// the two bracketing levels.
pub fn transition_samples(samples: &[LawSample], flows: &[f64], z_transition: f64) -> Vec<LawSample> {
    let sorted = sort_law(samples.to_vec());
    let mut added = Vec::new();

    for &q in flows {
        let group = flow_group(&sorted, q);
        let Some(k) = group.iter().rposition(|s| s.zam < z_transition) else {
            continue;
        };
        let (Some(low), Some(high)) = (group.get(k), group.get(k + 1)) else {
            continue;
        };

        let z_mid = (low.zav + high.zav) / 2.0;
        let zam_mid = (low.zam + high.zam) / 2.0;
        let gap_mid = zam_mid - z_mid;
        let gap_low = (low.zam - low.zav).min(gap_mid);
        let gap_high = (high.zam - high.zav).max(gap_mid);

        let z_low = (low.zav + 2.0 * z_mid) / 3.0;
        let z_high = (high.zav + 2.0 * z_mid) / 3.0;

        added.push(LawSample::new(q, z_low, z_low + gap_low));
        added.push(LawSample::new(q, z_mid, zam_mid));
        added.push(LawSample::new(q, z_high, z_high + gap_high));
    }

    added
}

/// Add the transition samples of every distinct transition elevation.
pub fn stitch_transitions(
    samples: Vec<LawSample>,
    flows: &[f64],
    transitions: &[f64],
) -> Vec<LawSample> {
    let mut added = Vec::new();
    for z in distinct(transitions.to_vec()) {
        added.extend(transition_samples(&samples, flows, z));
    }
    log::debug!("transition: {} samples added", added.len());
    samples.into_iter().chain(added).collect()
}

/// Give every downstream level the same flow break-points.
///
/// Only flows of `flows` are kept. For each of them, the missing downstream
/// levels are interpolated along that flow's own (zav, zam) curve, clamped
/// at its ends. A filled upstream level never sits below the downstream
/// level of a positive flow. The result is deduplicated on (q, zav).
pub fn complete_law(samples: Vec<LawSample>, flows: &[f64]) -> Vec<LawSample> {
    let sorted = sort_law(samples);
    let levels = distinct(sorted.iter().map(|s| s.zav).collect());
    let mut completed = Vec::with_capacity(levels.len() * flows.len());

    for q in distinct(flows.to_vec()) {
        let group = flow_group(&sorted, q);
        if group.is_empty() {
            continue;
        }
        let xs: Vec<f64> = group.iter().map(|s| s.zav).collect();
        let ys: Vec<f64> = group.iter().map(|s| s.zam).collect();
        completed.extend_from_slice(group);
        for &zav in &levels {
            if xs.contains(&zav) {
                continue;
            }
            if let Some(zam) = interp(zav, &xs, &ys) {
                let zam = if q > 0.0 { zam.max(zav) } else { zam };
                completed.push(LawSample::new(q, zav, zam));
            }
        }
    }

    dedup_nodes(completed)
}

/// Re-sample one downstream level's branch onto the flow grid.
///
/// `branch` starts at the last free-surface sample and continues through
/// the pressurized regime. Only grid flows strictly above the first sample
/// are produced; a branch of fewer than two samples produces nothing.
pub fn resample_branch(branch: &[LawSample], flows: &[f64]) -> Vec<LawSample> {
    let Some(first) = branch.first() else {
        return Vec::new();
    };
    if branch.len() < 2 {
        return Vec::new();
    }
    let Some(start) = flows.iter().position(|q| *q > first.q) else {
        return Vec::new();
    };

    let mut points: Vec<(f64, f64)> = branch.iter().map(|s| (s.q, s.zam)).collect();
    points.sort_by(|a, b| a.0.total_cmp(&b.0));
    let (xs, ys): (Vec<f64>, Vec<f64>) = points.into_iter().unzip();

    flows[start..]
        .iter()
        .filter_map(|&q| interp(q, &xs, &ys).map(|zam| LawSample::new(q, first.zav, zam)))
        .collect()
}

/// Re-sample every downstream level onto a common flow grid.
///
/// The grid runs from the smallest flow of the law (its first node kept
/// exact, the following ones aligned on `flow_step` from its integer part)
/// up to, but excluding, the largest flow. Levels with a single sample are
/// dropped. Returns the new samples and the grid.
pub fn resample_on_flows(samples: &[LawSample], flow_step: f64) -> (Vec<LawSample>, Vec<f64>) {
    let (Some(q_min), Some(q_max)) = (
        samples.iter().map(|s| s.q).reduce(f64::min),
        samples.iter().map(|s| s.q).reduce(f64::max),
    ) else {
        return (Vec::new(), Vec::new());
    };

    let origin = q_min.trunc();
    let mut grid = Vec::new();
    let mut i = 0u32;
    while flow_step > 0.0 {
        let q = origin + flow_step * f64::from(i);
        if q >= q_max {
            break;
        }
        grid.push(q);
        i += 1;
    }
    match grid.first_mut() {
        Some(first) => *first = q_min,
        None => grid.push(q_min),
    }

    let mut resampled = Vec::new();
    for zav in distinct(samples.iter().map(|s| s.zav).collect()) {
        let mut points: Vec<(f64, f64)> = samples
            .iter()
            .filter(|s| s.zav == zav)
            .map(|s| (s.q, s.zam))
            .collect();
        if points.len() < 2 {
            continue;
        }
        points.sort_by(|a, b| a.0.total_cmp(&b.0));
        let (xs, ys): (Vec<f64>, Vec<f64>) = points.into_iter().unzip();
        for &q in &grid {
            if let Some(zam) = interp(q, &xs, &ys) {
                resampled.push(LawSample::new(q, zav, zam));
            }
        }
    }

    (resampled, grid)
}
