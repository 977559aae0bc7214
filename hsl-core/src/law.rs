use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// One point of a structure law.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LawSample {
    /// Flow rate; the sign carries the flow direction.
    pub q: f64,
    /// Downstream level.
    pub zav: f64,
    /// Upstream level.
    pub zam: f64,
}

impl LawSample {
    pub fn new(q: f64, zav: f64, zam: f64) -> Self {
        Self { q, zav, zam }
    }

    /// Sentinel used when no flow can cross the section: upstream equals downstream.
    pub fn still_water(min_flow: f64, zav: f64) -> Self {
        Self {
            q: min_flow,
            zav,
            zam: zav,
        }
    }

    /// Lexicographic order on (q, zav, zam).
    pub fn lexical_cmp(&self, other: &Self) -> Ordering {
        self.q
            .total_cmp(&other.q)
            .then(self.zav.total_cmp(&other.zav))
            .then(self.zam.total_cmp(&other.zam))
    }

    /// Whether both samples sit on the same (q, zav) grid node.
    pub fn same_node(&self, other: &Self) -> bool {
        self.q == other.q && self.zav == other.zav
    }
}
