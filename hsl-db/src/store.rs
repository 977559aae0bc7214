//! Store trait implementations used by the law engine.

use anyhow::Context;
use geo::Polygon;
use hsl_core::abacus::AbacusSet;
use hsl_core::element::{ElementKind, StructureElement};
use hsl_core::law::LawSample;
use hsl_core::method::Method;
use hsl_core::params::ParamMap;
use hsl_core::store::{AbacusStore, ElementStore, LawSink, ParameterStore};

use crate::Database;

impl ParameterStore for Database {
    fn parameters(&self, names: &[&str], structure_id: i64) -> anyhow::Result<ParamMap> {
        self.query_parameters(names, structure_id)
    }
}

impl AbacusStore for Database {
    fn abacus(&self, groups: &[&str]) -> anyhow::Result<AbacusSet> {
        self.query_abacus(groups)
    }
}

impl ElementStore for Database {
    fn profile(&self, structure_id: i64) -> anyhow::Result<Option<Polygon<f64>>> {
        self.query_profile(structure_id)
    }

    fn elements(
        &self,
        structure_id: i64,
        kind: ElementKind,
    ) -> anyhow::Result<Vec<StructureElement>> {
        self.query_elements(structure_id, kind)
    }
}

impl LawSink for Database {
    fn save_law(
        &self,
        method: Method,
        structure_id: i64,
        table: &[LawSample],
    ) -> anyhow::Result<()> {
        self.replace_law(method, structure_id, table)
    }

    fn deactivate_and_notify(&self, structure_id: i64, reason: &str) -> anyhow::Result<()> {
        self.deactivate(structure_id, reason)
    }

    fn structure_name(&self, structure_id: i64) -> anyhow::Result<String> {
        let info = self
            .query_structure(structure_id)?
            .with_context(|| format!("structure {} is not registered", structure_id))?;
        Ok(info.name)
    }
}
