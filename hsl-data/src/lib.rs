//! Interpolation and law post-processing.
//!
//! This crate turns digitized abacus curves into callable functions and
//! reshapes raw solver output into the rectangular tables the river model
//! expects.

pub mod law;

/// Piecewise-linear interpolation over abacus curves.
pub mod interpolation {
    use hsl_core::abacus::AbacusTable;
    use hsl_core::{LawError, Result};

    /// Linear interpolation of `x` over the points `(xs, ys)`.
    ///
    /// `xs` must be sorted ascending. Values outside `[xs[0], xs[n-1]]` are
    /// clamped to the end values: abacus curves are never extrapolated.
    /// Returns `None` for empty or mismatched inputs.
    pub fn interp(x: f64, xs: &[f64], ys: &[f64]) -> Option<f64> {
        if xs.is_empty() || xs.len() != ys.len() {
            return None;
        }
        let last = xs.len() - 1;
        if x <= xs[0] {
            return Some(ys[0]);
        }
        if x >= xs[last] {
            return Some(ys[last]);
        }
        // Number of abscissas <= x; the segment starts one before.
        let i = xs.partition_point(|v| *v <= x) - 1;
        let dx = xs[i + 1] - xs[i];
        if dx == 0.0 {
            return Some(ys[i]);
        }
        Some(ys[i] + (x - xs[i]) * (ys[i + 1] - ys[i]) / dx)
    }

    /// A curve sorted by abscissa, ready to be evaluated.
    #[derive(Debug, Clone, PartialEq)]
    pub struct Curve {
        pub xs: Vec<f64>,
        pub ys: Vec<f64>,
    }

    impl Curve {
        /// Build a curve from unordered points; ties keep their input order.
        pub fn from_points(points: Vec<(f64, f64)>) -> Option<Self> {
            let mut points: Vec<(f64, f64)> = points
                .into_iter()
                .filter(|(x, y)| x.is_finite() && y.is_finite())
                .collect();
            if points.is_empty() {
                return None;
            }
            points.sort_by(|a, b| a.0.total_cmp(&b.0));
            let (xs, ys) = points.into_iter().unzip();
            Some(Self { xs, ys })
        }

        pub fn at(&self, x: f64) -> f64 {
            // Construction guarantees a non-empty curve with matching lengths.
            interp(x, &self.xs, &self.ys).unwrap_or(f64::NAN)
        }

        pub fn len(&self) -> usize {
            self.xs.len()
        }

        pub fn is_empty(&self) -> bool {
            self.xs.is_empty()
        }
    }

    /// Pair the series `x_name` and `y_name` of `table` into a curve.
    ///
    /// Series of equal length are taken as co-indexed. Otherwise each value
    /// of `x_name` is paired with every value of `y_name` holding the same
    /// order key.
    pub fn lookup(table: &AbacusTable, x_name: &str, y_name: &str) -> Result<Curve> {
        let sx = table.series(x_name)?;
        let sy = table.series(y_name)?;

        let points: Vec<(f64, f64)> = if sx.len() == sy.len() {
            sx.values.iter().copied().zip(sy.values.iter().copied()).collect()
        } else {
            let order_x = sx.order.as_ref().ok_or_else(|| LawError::MissingSeries {
                table: table.name.clone(),
                series: format!("order_{}", x_name),
            })?;
            let order_y = sy.order.as_ref().ok_or_else(|| LawError::MissingSeries {
                table: table.name.clone(),
                series: format!("order_{}", y_name),
            })?;
            let mut points = Vec::new();
            for (i, kx) in order_x.iter().enumerate() {
                for (j, ky) in order_y.iter().enumerate() {
                    if kx == ky {
                        if let (Some(x), Some(y)) = (sx.values.get(i), sy.values.get(j)) {
                            points.push((*x, *y));
                        }
                    }
                }
            }
            points
        };

        Curve::from_points(points).ok_or_else(|| LawError::EmptyCurve {
            table: table.name.clone(),
            series: y_name.to_string(),
        })
    }

    #[cfg(test)]
    mod tests {
        use super::*;
        use hsl_core::abacus::Series;

        #[test]
        fn test_interp_hits_every_node() {
            let xs = [0.3, 0.5, 0.7, 0.9, 1.0];
            let ys = [3.1, 2.0, 1.05, 0.3, 0.0];
            for i in 0..xs.len() {
                assert_eq!(interp(xs[i], &xs, &ys), Some(ys[i]));
            }
        }

        #[test]
        fn test_interp_between_nodes() {
            let y = interp(0.6, &[0.5, 0.7], &[2.0, 1.0]).unwrap();
            assert!((y - 1.5).abs() < 1e-12);
        }

        #[test]
        fn test_interp_clamps() {
            let xs = [1.0, 2.0];
            let ys = [10.0, 20.0];
            assert_eq!(interp(-5.0, &xs, &ys), Some(10.0));
            assert_eq!(interp(7.0, &xs, &ys), Some(20.0));
        }

        #[test]
        fn test_interp_rejects_bad_input() {
            assert_eq!(interp(1.0, &[], &[]), None);
            assert_eq!(interp(1.0, &[1.0, 2.0], &[1.0]), None);
        }

        #[test]
        fn test_lookup_equal_lengths() {
            let mut table = AbacusTable::new("kb_abac");
            table.insert("M", Series::new(vec![1.0, 0.5]));
            table.insert("type1", Series::new(vec![0.0, 2.0]));
            let curve = lookup(&table, "M", "type1").unwrap();
            assert_eq!(curve.xs, vec![0.5, 1.0]);
            assert_eq!(curve.ys, vec![2.0, 0.0]);
            assert!((curve.at(0.75) - 1.0).abs() < 1e-12);
        }

        #[test]
        fn test_lookup_realigns_with_order_keys() {
            let mut table = AbacusTable::new("kb_abac");
            table.insert(
                "M",
                Series::with_order(vec![0.3, 0.5, 0.7, 0.9], vec![1.0, 2.0, 3.0, 4.0]),
            );
            table.insert("type1<60m", Series::with_order(vec![2.6, 0.4], vec![1.0, 4.0]));
            let curve = lookup(&table, "M", "type1<60m").unwrap();
            assert_eq!(curve.xs, vec![0.3, 0.9]);
            assert_eq!(curve.ys, vec![2.6, 0.4]);
        }

        #[test]
        fn test_lookup_without_order_keys_fails() {
            let mut table = AbacusTable::new("kb_abac");
            table.insert("M", Series::new(vec![0.3, 0.5, 0.7]));
            table.insert("Others", Series::new(vec![1.0]));
            assert!(matches!(
                lookup(&table, "M", "Others"),
                Err(LawError::MissingSeries { .. })
            ));
        }

        #[test]
        fn test_lookup_with_disjoint_keys_is_empty() {
            let mut table = AbacusTable::new("kb_abac");
            table.insert("M", Series::with_order(vec![0.3, 0.5], vec![1.0, 2.0]));
            table.insert("Others", Series::with_order(vec![1.0], vec![7.0]));
            assert!(matches!(
                lookup(&table, "M", "Others"),
                Err(LawError::EmptyCurve { .. })
            ));
        }
    }
}
