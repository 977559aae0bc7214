//! Typed query methods over the structure database.
//!
//! Input queries rebuild the domain types of `hsl-core` (parameter maps,
//! abacus tables, polygons, elements); output queries read back saved laws
//! and advisories.

use std::collections::BTreeMap;

use geo::Polygon;
use hsl_core::abacus::{AbacusSet, AbacusTable, Series};
use hsl_core::element::{ElementKind, StructureElement};
use hsl_core::geometry::{polygon_from_profile, polygon_from_ring};
use hsl_core::law::LawSample;
use hsl_core::method::Method;
use hsl_core::params::{ParamMap, ParamValue};
use rusqlite::{params, OptionalExtension};

use crate::models::{Advisory, StructureInfo};
use crate::Database;

impl Database {
    // ───────────────────── Structures ─────────────────────

    /// All structures, ordered by id.
    pub fn query_structures(&self) -> anyhow::Result<Vec<StructureInfo>> {
        let conn = self.conn.borrow();
        let mut stmt = conn.prepare("SELECT id, name, active FROM structures ORDER BY id")?;
        let rows = stmt
            .query_map([], |row| {
                Ok(StructureInfo {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    active: row.get(2)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        log::info!(
            "[HSL Debug] query: query_structures returned {} records",
            rows.len()
        );
        Ok(rows)
    }

    /// One structure, `None` when the id is unknown.
    pub fn query_structure(&self, structure_id: i64) -> anyhow::Result<Option<StructureInfo>> {
        let conn = self.conn.borrow();
        let info = conn
            .query_row(
                "SELECT id, name, active FROM structures WHERE id = ?1",
                params![structure_id],
                |row| {
                    Ok(StructureInfo {
                        id: row.get(0)?,
                        name: row.get(1)?,
                        active: row.get(2)?,
                    })
                },
            )
            .optional()?;
        Ok(info)
    }

    // ───────────────────── Inputs ─────────────────────

    /// Stored values of the requested parameter names.
    pub fn query_parameters(&self, names: &[&str], structure_id: i64) -> anyhow::Result<ParamMap> {
        let conn = self.conn.borrow();
        let mut stmt =
            conn.prepare("SELECT value FROM parameters WHERE structure_id = ?1 AND name = ?2")?;
        let mut map = ParamMap::new(structure_id);
        for name in names {
            let value: Option<String> = stmt
                .query_row(params![structure_id, name], |row| row.get(0))
                .optional()?;
            if let Some(raw) = value {
                map.insert(*name, ParamValue::parse(&raw));
            }
        }
        log::debug!(
            "[HSL Debug] query: {} of {} parameters found for structure {}",
            map.len(),
            names.len(),
            structure_id
        );
        Ok(map)
    }

    /// Abacus tables of the requested groups.
    ///
    /// A table of a later group replaces a table of the same name loaded
    /// from an earlier group.
    pub fn query_abacus(&self, groups: &[&str]) -> anyhow::Result<AbacusSet> {
        let conn = self.conn.borrow();
        let mut stmt = conn.prepare(
            "SELECT abacus, series, value, ord FROM abacus_points
             WHERE group_name = ?1
             ORDER BY abacus, series, position",
        )?;

        let mut set = AbacusSet::new();
        for group in groups {
            let rows = stmt
                .query_map(params![group], |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, f64>(2)?,
                        row.get::<_, Option<f64>>(3)?,
                    ))
                })?
                .collect::<Result<Vec<_>, _>>()?;

            let mut tables: BTreeMap<String, BTreeMap<String, (Vec<f64>, Vec<Option<f64>>)>> =
                BTreeMap::new();
            for (abacus, series, value, ord) in rows {
                let entry = tables.entry(abacus).or_default().entry(series).or_default();
                entry.0.push(value);
                entry.1.push(ord);
            }

            for (name, series) in tables {
                let mut table = AbacusTable::new(name);
                for (series_name, (values, ords)) in series {
                    let series = match ords.into_iter().collect::<Option<Vec<f64>>>() {
                        Some(order) => Series::with_order(values, order),
                        None => Series::new(values),
                    };
                    table.insert(series_name, series);
                }
                set.insert(table);
            }
        }
        log::info!(
            "[HSL Debug] query: query_abacus returned {} tables for {:?}",
            set.len(),
            groups
        );
        Ok(set)
    }

    /// Cross-section polygon of a structure, `None` without profile points.
    pub fn query_profile(&self, structure_id: i64) -> anyhow::Result<Option<Polygon<f64>>> {
        let conn = self.conn.borrow();
        let mut stmt = conn.prepare(
            "SELECT station, elevation FROM profile_points
             WHERE structure_id = ?1
             ORDER BY position",
        )?;
        let points = stmt
            .query_map(params![structure_id], |row| Ok((row.get(0)?, row.get(1)?)))?
            .collect::<Result<Vec<(f64, f64)>, _>>()?;
        if points.is_empty() {
            return Ok(None);
        }
        Ok(Some(polygon_from_profile(&points)?))
    }

    /// Elements of one kind, ordered by index.
    pub fn query_elements(
        &self,
        structure_id: i64,
        kind: ElementKind,
    ) -> anyhow::Result<Vec<StructureElement>> {
        let conn = self.conn.borrow();
        let mut stmt = conn.prepare(
            "SELECT elem_index, station, elevation FROM element_points
             WHERE structure_id = ?1 AND kind = ?2
             ORDER BY elem_index, position",
        )?;
        let rows = stmt
            .query_map(params![structure_id, kind.code()], |row| {
                Ok((row.get::<_, i64>(0)?, row.get::<_, f64>(1)?, row.get::<_, f64>(2)?))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        let mut rings: BTreeMap<i64, Vec<(f64, f64)>> = BTreeMap::new();
        for (index, station, elevation) in rows {
            rings.entry(index).or_default().push((station, elevation));
        }
        let mut elements = Vec::with_capacity(rings.len());
        for (index, ring) in rings {
            elements.push(StructureElement::new(index, kind, polygon_from_ring(&ring)?)?);
        }
        Ok(elements)
    }

    // ───────────────────── Outputs ─────────────────────

    /// Saved law of a structure, in table order.
    pub fn query_law(&self, method: Method, structure_id: i64) -> anyhow::Result<Vec<LawSample>> {
        let conn = self.conn.borrow();
        let mut stmt = conn.prepare(
            "SELECT q, zav, zam FROM laws
             WHERE method = ?1 AND structure_id = ?2
             ORDER BY position",
        )?;
        let rows = stmt
            .query_map(params![method.as_str(), structure_id], |row| {
                Ok(LawSample::new(row.get(0)?, row.get(1)?, row.get(2)?))
            })?
            .collect::<Result<Vec<_>, _>>()?;
        log::info!("[HSL Debug] query: query_law returned {} records", rows.len());
        Ok(rows)
    }

    /// Advisories, optionally restricted to one structure.
    pub fn query_advisories(&self, structure_id: Option<i64>) -> anyhow::Result<Vec<Advisory>> {
        let conn = self.conn.borrow();
        let mut stmt = conn.prepare(
            "SELECT structure_id, message FROM advisories
             WHERE ?1 IS NULL OR structure_id = ?1
             ORDER BY id",
        )?;
        let rows = stmt
            .query_map(params![structure_id], |row| {
                Ok(Advisory {
                    structure_id: row.get(0)?,
                    message: row.get(1)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    /// Replace the saved law of a structure.
    pub fn replace_law(
        &self,
        method: Method,
        structure_id: i64,
        table: &[LawSample],
    ) -> anyhow::Result<()> {
        let mut conn = self.conn.borrow_mut();
        let tx = conn.transaction()?;
        tx.execute(
            "DELETE FROM laws WHERE method = ?1 AND structure_id = ?2",
            params![method.as_str(), structure_id],
        )?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO laws (method, structure_id, position, q, zav, zam)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            )?;
            for (position, s) in table.iter().enumerate() {
                stmt.execute(params![
                    method.as_str(),
                    structure_id,
                    position as i64,
                    s.q,
                    s.zav,
                    s.zam
                ])?;
            }
        }
        tx.commit()?;
        log::info!(
            "[HSL Debug] query: saved {} law of structure {} ({} samples)",
            method,
            structure_id,
            table.len()
        );
        Ok(())
    }

    /// Mark a structure inactive and attach an advisory to it.
    pub fn deactivate(&self, structure_id: i64, message: &str) -> anyhow::Result<()> {
        let mut conn = self.conn.borrow_mut();
        let tx = conn.transaction()?;
        tx.execute(
            "UPDATE structures SET active = 0 WHERE id = ?1",
            params![structure_id],
        )?;
        tx.execute(
            "INSERT INTO advisories (structure_id, message) VALUES (?1, ?2)",
            params![structure_id, message],
        )?;
        tx.commit()?;
        Ok(())
    }
}
