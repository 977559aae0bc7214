//! Samples rejected by the solvers.
//!
//! A rejection never aborts a computation: the sample is dropped and the
//! reason kept here. Each (kind, Q, Zav) is recorded once per call.

use serde::Serialize;
use std::collections::HashSet;
use std::fmt;

/// Why a free-surface sample was dropped or adjusted.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DiagnosticKind {
    /// Momentum ratio outside the empirical range of at least one coefficient.
    MomentumOutOfDomain { m: f64, coefficients: Vec<String> },
    /// Pier blockage ratio above the limit of the pier form.
    PierBlockage { form: i64, j: f64, limit: f64 },
    /// Piers cover the whole structure section.
    NoContractedSection { area: f64 },
}

impl DiagnosticKind {
    fn tag(&self) -> u8 {
        match self {
            DiagnosticKind::MomentumOutOfDomain { .. } => 0,
            DiagnosticKind::PierBlockage { .. } => 1,
            DiagnosticKind::NoContractedSection { .. } => 2,
        }
    }
}

impl fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiagnosticKind::MomentumOutOfDomain { m, coefficients } => write!(
                f,
                "m = {:.4} outside the application domain of {}",
                m,
                coefficients.join(", ")
            ),
            DiagnosticKind::PierBlockage { form, j, limit } => write!(
                f,
                "pier blockage j = {:.4} above {} for pier form {}",
                j, limit, form
            ),
            DiagnosticKind::NoContractedSection { area } => {
                write!(f, "contracted section area {:.4} is not positive", area)
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Diagnostic {
    pub q: f64,
    pub zav: f64,
    #[serde(flatten)]
    pub kind: DiagnosticKind,
}

/// Per-call diagnostic collector.
#[derive(Debug, Default)]
pub struct Diagnostics {
    seen: HashSet<(u8, u64, u64)>,
    items: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a diagnostic; returns false when the key was already recorded.
    pub fn record(&mut self, q: f64, zav: f64, kind: DiagnosticKind) -> bool {
        if !self.seen.insert((kind.tag(), q.to_bits(), zav.to_bits())) {
            return false;
        }
        log::debug!("[HSL Debug] rejected Q = {} Zav = {}: {}", q, zav, kind);
        self.items.push(Diagnostic { q, zav, kind });
        true
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.items.iter()
    }

    pub fn into_vec(self) -> Vec<Diagnostic> {
        self.items
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn blockage() -> DiagnosticKind {
        DiagnosticKind::PierBlockage {
            form: 1,
            j: 0.1,
            limit: 0.057,
        }
    }

    #[test]
    fn records_each_key_once() {
        let mut d = Diagnostics::new();
        assert!(d.record(10.0, 1.0, blockage()));
        assert!(!d.record(10.0, 1.0, blockage()));
        assert!(d.record(20.0, 1.0, blockage()));
        assert!(d.record(
            10.0,
            1.0,
            DiagnosticKind::NoContractedSection { area: 0.0 }
        ));
        assert_eq!(d.len(), 3);
    }

    #[test]
    fn serializes_flat() {
        let mut d = Diagnostics::new();
        d.record(10.0, 1.5, blockage());
        let json = serde_json::to_value(d.into_vec()).unwrap();
        assert_eq!(json[0]["kind"], "pier_blockage");
        assert_eq!(json[0]["zav"], 1.5);
        assert_eq!(json[0]["form"], 1);
    }

    #[test]
    fn momentum_message_lists_coefficients() {
        let kind = DiagnosticKind::MomentumOutOfDomain {
            m: 0.25,
            coefficients: vec!["Kp".into(), "Kb".into()],
        };
        assert_eq!(
            kind.to_string(),
            "m = 0.2500 outside the application domain of Kp, Kb"
        );
    }
}
