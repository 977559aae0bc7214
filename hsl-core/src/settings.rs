use serde::{Deserialize, Serialize};

/// Numerical constants of a law computation.
///
/// Every field has a default, so a settings file only needs to list what it
/// overrides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LawSettings {
    /// Gravitational acceleration (m/s²).
    pub gravity: f64,
    /// Smallest flow written to a law; a zero flow would stall the river model.
    pub min_flow: f64,
    /// Bracket width at which the upstream-level bisection stops.
    pub dichotomy_tolerance: f64,
    pub max_dichotomy_iterations: usize,
    /// Head difference under which the orifice law is linearized.
    pub balance_gap: f64,
    /// Contraction coefficient of a drowned opening.
    pub orifice_contraction: f64,
}

impl Default for LawSettings {
    fn default() -> Self {
        Self {
            gravity: 9.81,
            min_flow: 1e-4,
            dichotomy_tolerance: 1e-4,
            max_dichotomy_iterations: 200,
            balance_gap: 0.01,
            orifice_contraction: 0.65,
        }
    }
}
