//! Digitized empirical coefficient curves ("abacus" tables).
//!
//! An abacus table holds several named series. One series is usually the
//! independent variable (for example `M`, the momentum-sharing ratio) and the
//! others are curves read against it (for example one curve per pier form).
//! Curves digitized at different points carry an `order` key per value so
//! that they can be realigned with the independent series.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::{LawError, Result};

/// Values of one series, with the optional realignment key.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Series {
    pub values: Vec<f64>,
    pub order: Option<Vec<f64>>,
}

impl Series {
    pub fn new(values: Vec<f64>) -> Self {
        Self {
            values,
            order: None,
        }
    }

    pub fn with_order(values: Vec<f64>, order: Vec<f64>) -> Self {
        Self {
            values,
            order: Some(order),
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// A named abacus table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AbacusTable {
    pub name: String,
    pub series: BTreeMap<String, Series>,
}

impl AbacusTable {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            series: BTreeMap::new(),
        }
    }

    pub fn insert(&mut self, name: impl Into<String>, series: Series) {
        self.series.insert(name.into(), series);
    }

    pub fn series(&self, name: &str) -> Result<&Series> {
        self.series.get(name).ok_or_else(|| LawError::MissingSeries {
            table: self.name.clone(),
            series: name.to_string(),
        })
    }

    /// Series named `<prefix>=<number>`, sorted by their numeric label.
    ///
    /// Used for families of curves such as `e=0.2` or `phi=30`.
    pub fn labelled(&self, prefix: &str) -> Vec<(String, f64)> {
        let mut labelled: Vec<(String, f64)> = self
            .series
            .keys()
            .filter_map(|key| {
                let (head, tail) = key.split_once('=')?;
                if head.trim() != prefix {
                    return None;
                }
                let value = tail.trim().parse::<f64>().ok()?;
                Some((key.clone(), value))
            })
            .collect();
        labelled.sort_by(|a, b| a.1.total_cmp(&b.1));
        labelled
    }
}

/// Abacus tables loaded for one computation, keyed by table name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AbacusSet {
    tables: BTreeMap<String, AbacusTable>,
}

impl AbacusSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a table, replacing any table of the same name.
    pub fn insert(&mut self, table: AbacusTable) {
        self.tables.insert(table.name.clone(), table);
    }

    pub fn table(&self, name: &str) -> Result<&AbacusTable> {
        self.tables
            .get(name)
            .ok_or_else(|| LawError::MissingAbacus(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.tables.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn skew_table() -> AbacusTable {
        let mut table = AbacusTable::new("dKs_casA_abac");
        table.insert("M", Series::new(vec![0.3, 0.6, 1.0]));
        table.insert("phi=30", Series::new(vec![0.1, 0.2, 0.3]));
        table.insert("phi=5", Series::new(vec![0.0, 0.05, 0.1]));
        table.insert("phi=15", Series::new(vec![0.05, 0.1, 0.15]));
        table.insert("phi>45", Series::new(vec![0.3, 0.4, 0.5]));
        table
    }

    #[test]
    fn labelled_series_sorted_numerically() {
        let labels = skew_table().labelled("phi");
        let values: Vec<f64> = labels.iter().map(|l| l.1).collect();
        assert_eq!(values, vec![5.0, 15.0, 30.0]);
        assert_eq!(labels[0].0, "phi=5");
    }

    #[test]
    fn missing_series_is_reported() {
        let table = skew_table();
        let err = table.series("phi=90").unwrap_err();
        assert!(matches!(err, LawError::MissingSeries { .. }));
    }

    #[test]
    fn set_lookup() {
        let mut set = AbacusSet::new();
        set.insert(skew_table());
        assert!(set.contains("dKs_casA_abac"));
        assert!(set.table("kb_abac").is_err());
        assert_eq!(set.len(), 1);
    }
}
