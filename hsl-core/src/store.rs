//! Collaborator contracts of the law engine.
//!
//! The engine never talks to a database or a UI directly. It reads inputs
//! through these traits and hands its result to a [`LawSink`]; `hsl-db`
//! provides the SQLite-backed implementation.

use geo::Polygon;

use crate::abacus::AbacusSet;
use crate::element::{ElementKind, StructureElement};
use crate::law::LawSample;
use crate::method::Method;
use crate::params::ParamMap;

/// Keyed lookup of structure configuration values.
pub trait ParameterStore {
    /// Values for the requested names that exist for the structure.
    ///
    /// Names without a stored value are simply absent from the map; the
    /// typed parameter structs decide whether that is an error.
    fn parameters(&self, names: &[&str], structure_id: i64) -> anyhow::Result<ParamMap>;
}

/// Keyed lookup of abacus tables.
pub trait AbacusStore {
    /// Tables of every requested group; a later group overrides an earlier
    /// one on table-name collisions.
    fn abacus(&self, groups: &[&str]) -> anyhow::Result<AbacusSet>;
}

/// Cross-section profile and structure elements.
pub trait ElementStore {
    fn profile(&self, structure_id: i64) -> anyhow::Result<Option<Polygon<f64>>>;

    /// Elements of one kind, ordered by index.
    fn elements(
        &self,
        structure_id: i64,
        kind: ElementKind,
    ) -> anyhow::Result<Vec<StructureElement>>;
}

/// Receiver of computed laws.
pub trait LawSink {
    fn save_law(&self, method: Method, structure_id: i64, table: &[LawSample])
        -> anyhow::Result<()>;

    /// Mark the structure inactive and record why.
    fn deactivate_and_notify(&self, structure_id: i64, reason: &str) -> anyhow::Result<()>;

    /// Configured display name of the structure.
    fn structure_name(&self, structure_id: i64) -> anyhow::Result<String>;
}

/// Progress reporting, in percent.
pub trait Progress {
    fn report(&mut self, percent: f64);
}

impl<F: FnMut(f64)> Progress for F {
    fn report(&mut self, percent: f64) {
        self(percent)
    }
}

/// Progress sink that drops every report.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoProgress;

impl Progress for NoProgress {
    fn report(&mut self, _percent: f64) {}
}
