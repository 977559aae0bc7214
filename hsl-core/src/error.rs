//! Error types for law computation.

use thiserror::Error;

/// Errors that abort a law computation.
///
/// Rejected samples (coefficients outside an empirical domain) and
/// degenerate flows are not errors; they are resolved inside the solvers
/// and reported as diagnostics.
#[derive(Error, Debug)]
pub enum LawError {
    /// A required parameter has no value and no default.
    #[error("Parameter '{name}' is missing for structure {structure_id}")]
    MissingParameter { name: String, structure_id: i64 },

    /// A parameter exists but cannot be used as requested.
    #[error("Parameter '{name}' has an invalid value: {value}")]
    InvalidParameter { name: String, value: String },

    /// The structure has no cross-section profile.
    #[error("No cross-section profile found for structure {0}")]
    MissingProfile(i64),

    /// The structure has no element of the kind the method needs.
    #[error("No {kind} element found for structure {structure_id}")]
    MissingElements { structure_id: i64, kind: String },

    /// An abacus table was not returned by the abacus store.
    #[error("Abacus table '{0}' not found")]
    MissingAbacus(String),

    /// An abacus table lacks a series.
    #[error("Series '{series}' not found in abacus table '{table}'")]
    MissingSeries { table: String, series: String },

    /// An abacus curve left no (x, y) pair after realignment.
    #[error("Abacus curve '{series}' of table '{table}' has no usable points")]
    EmptyCurve { table: String, series: String },

    /// Geometry that cannot describe a section or an element.
    #[error("Invalid geometry: {0}")]
    InvalidGeometry(String),

    /// Bisection failed to close its bracket.
    #[error("Dichotomy did not converge after {iterations} iterations (bracket [{low}, {high}])")]
    NonConvergence { iterations: usize, low: f64, high: f64 },

    /// Failure reported by a collaborator (store, sink).
    #[error(transparent)]
    Store(#[from] anyhow::Error),
}

impl LawError {
    /// Create a missing parameter error.
    pub fn missing_parameter(name: impl Into<String>, structure_id: i64) -> Self {
        Self::MissingParameter {
            name: name.into(),
            structure_id,
        }
    }

    /// Create an invalid parameter error.
    pub fn invalid_parameter(name: impl Into<String>, value: impl ToString) -> Self {
        Self::InvalidParameter {
            name: name.into(),
            value: value.to_string(),
        }
    }

    /// Whether the error comes from missing or unusable configuration.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Self::MissingParameter { .. }
                | Self::InvalidParameter { .. }
                | Self::MissingProfile(_)
                | Self::MissingElements { .. }
                | Self::MissingAbacus(_)
                | Self::MissingSeries { .. }
                | Self::EmptyCurve { .. }
                | Self::InvalidGeometry(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, LawError>;
