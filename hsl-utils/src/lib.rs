//! Shared utility functions for HSL crates.

/// Discretization helpers for level and flow grids.
pub mod grid {
    /// Build a stepped grid from `start` towards `stop`, always ending on `stop`.
    ///
    /// Values are `start + i * step` for every `i` keeping the value strictly
    /// below `stop`, followed by `stop` itself. When `start >= stop` the grid
    /// is just `[stop]`.
    pub fn stepped(start: f64, stop: f64, step: f64) -> anyhow::Result<Vec<f64>> {
        if !(step.is_finite() && step > 0.0) {
            anyhow::bail!("grid step must be a positive number, got {}", step);
        }
        if !start.is_finite() || !stop.is_finite() {
            anyhow::bail!("grid bounds must be finite, got [{}, {}]", start, stop);
        }

        let mut values = Vec::new();
        let mut i = 0u32;
        loop {
            let value = start + step * f64::from(i);
            if value >= stop {
                break;
            }
            values.push(value);
            i += 1;
        }
        values.push(stop);
        Ok(values)
    }

    /// Index of the first value strictly greater than `threshold`.
    pub fn first_above(values: &[f64], threshold: f64) -> Option<usize> {
        values.iter().position(|v| *v > threshold)
    }

}

/// Text parsing for values coming out of CSV files and the parameter store.
pub mod parse {
    /// Parse a number, accepting surrounding whitespace and a decimal comma.
    pub fn number(s: &str) -> anyhow::Result<f64> {
        let trimmed = s.trim();
        match trimmed.parse::<f64>() {
            Ok(v) => Ok(v),
            Err(_) => Ok(trimmed.replace(',', ".").parse::<f64>()?),
        }
    }

    /// Parse a boolean flag as written by spreadsheet exports.
    pub fn flag(s: &str) -> Option<bool> {
        match s.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "t" | "yes" | "y" => Some(true),
            "0" | "false" | "f" | "no" | "n" => Some(false),
            _ => None,
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn test_number() {
            assert_eq!(number(" 12.5 ").unwrap(), 12.5);
            assert_eq!(number("0,385").unwrap(), 0.385);
            assert!(number("abc").is_err());
        }

        #[test]
        fn test_flag() {
            assert_eq!(flag("TRUE"), Some(true));
            assert_eq!(flag("0"), Some(false));
            assert_eq!(flag("maybe"), None);
        }
    }
}
