//! CSV data loading functions for populating the in-memory SQLite database.
//!
//! Each loader parses CSV data from a string slice and inserts rows into
//! the corresponding table. Every format has a header row.
//!
//! # CSV Formats
//!
//! - **Structures**: `ID,NAME,ACTIVE`
//! - **Parameters**: `structure_id,name,value`
//! - **Profiles**: `structure_id,station,elevation` (row order = vertex order)
//! - **Elements**: `structure_id,kind,index,station,elevation` (kind 0 = opening, 1 = pier)
//! - **Abacus**: `group,abacus,series,value[,order]`
//!
//! Decimal commas are accepted in every numeric field.

use crate::Database;
use anyhow::Context;
use hsl_utils::parse;
use rusqlite::params;

fn number(field: Option<&str>, column: &str) -> anyhow::Result<f64> {
    let raw = field.unwrap_or("");
    parse::number(raw).with_context(|| format!("column '{}': '{}' is not a number", column, raw))
}

/// Active unless the field explicitly says otherwise.
fn is_active(field: Option<&str>) -> bool {
    field.and_then(parse::flag).unwrap_or(true)
}

fn reader(csv_data: &str) -> csv::Reader<&[u8]> {
    csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(csv_data.as_bytes())
}

impl Database {
    /// Load structure metadata from CSV string.
    ///
    /// Expected format (with headers): `ID,NAME,ACTIVE`. A missing `ACTIVE`
    /// column means active.
    ///
    /// # Example CSV
    /// ```text
    /// ID,NAME,ACTIVE
    /// 1,Pont de la Gare,1
    /// ```
    pub fn load_structures(&self, csv_data: &str) -> anyhow::Result<()> {
        let conn = self.conn.borrow();
        let mut rdr = reader(csv_data);

        let mut count = 0u32;
        for result in rdr.records() {
            let r = result?;
            let id = number(r.get(0), "ID")? as i64;
            let name = r.get(1).unwrap_or("");
            let active = is_active(r.get(2));

            conn.execute(
                "INSERT OR REPLACE INTO structures (id, name, active) VALUES (?1, ?2, ?3)",
                params![id, name, active],
            )?;
            count += 1;
        }
        log::info!("[HSL Debug] loader: Loaded {} structures", count);
        Ok(())
    }

    /// Load raw parameter values from CSV string.
    ///
    /// Expected format (with headers): `structure_id,name,value`. Values are
    /// stored as text and typed when a method reads them.
    pub fn load_parameters(&self, csv_data: &str) -> anyhow::Result<()> {
        let conn = self.conn.borrow();
        let mut rdr = reader(csv_data);

        let mut count = 0u32;
        let mut skipped = 0u32;
        for result in rdr.records() {
            let r = result?;
            let structure_id = number(r.get(0), "structure_id")? as i64;
            let name = r.get(1).unwrap_or("");
            let value = r.get(2).unwrap_or("");
            if name.is_empty() || value.is_empty() {
                skipped += 1;
                continue;
            }

            conn.execute(
                "INSERT OR REPLACE INTO parameters (structure_id, name, value) VALUES (?1, ?2, ?3)",
                params![structure_id, name, value],
            )?;
            count += 1;
        }
        log::info!(
            "[HSL Debug] loader: Loaded {} parameters, skipped {} empty",
            count,
            skipped
        );
        Ok(())
    }

    /// Load cross-section profiles from CSV string.
    ///
    /// Expected format (with headers): `structure_id,station,elevation`.
    /// Points are appended to the structure's profile in row order.
    ///
    /// # Example CSV
    /// ```text
    /// structure_id,station,elevation
    /// 1,0,10
    /// 1,10,0
    /// 1,40,0
    /// 1,50,10
    /// ```
    pub fn load_profiles(&self, csv_data: &str) -> anyhow::Result<()> {
        let conn = self.conn.borrow();
        let mut rdr = reader(csv_data);

        let mut count = 0u32;
        for result in rdr.records() {
            let r = result?;
            let structure_id = number(r.get(0), "structure_id")? as i64;
            let station = number(r.get(1), "station")?;
            let elevation = number(r.get(2), "elevation")?;

            conn.execute(
                "INSERT INTO profile_points (structure_id, position, station, elevation)
                 VALUES (?1, (SELECT COUNT(*) FROM profile_points WHERE structure_id = ?1), ?2, ?3)",
                params![structure_id, station, elevation],
            )?;
            count += 1;
        }
        log::info!("[HSL Debug] loader: Loaded {} profile points", count);
        Ok(())
    }

    /// Load opening and pier polygons from CSV string.
    ///
    /// Expected format (with headers): `structure_id,kind,index,station,elevation`.
    /// Vertices of one element are appended in row order.
    pub fn load_elements(&self, csv_data: &str) -> anyhow::Result<()> {
        let conn = self.conn.borrow();
        let mut rdr = reader(csv_data);

        let mut count = 0u32;
        for result in rdr.records() {
            let r = result?;
            let structure_id = number(r.get(0), "structure_id")? as i64;
            let kind = number(r.get(1), "kind")? as i64;
            let index = number(r.get(2), "index")? as i64;
            let station = number(r.get(3), "station")?;
            let elevation = number(r.get(4), "elevation")?;

            conn.execute(
                "INSERT INTO element_points (structure_id, kind, elem_index, position, station, elevation)
                 VALUES (?1, ?2, ?3,
                         (SELECT COUNT(*) FROM element_points
                          WHERE structure_id = ?1 AND kind = ?2 AND elem_index = ?3),
                         ?4, ?5)",
                params![structure_id, kind, index, station, elevation],
            )?;
            count += 1;
        }
        log::info!("[HSL Debug] loader: Loaded {} element points", count);
        Ok(())
    }

    /// Load digitized abacus series from CSV string.
    ///
    /// Expected format (with headers): `group,abacus,series,value[,order]`.
    /// The optional order key pairs two series of different lengths.
    ///
    /// # Example CSV
    /// ```text
    /// group,abacus,series,value,order
    /// bradley78,kb_abac,M,0.3,1
    /// bradley78,kb_abac,type1<60m,2.6,1
    /// ```
    pub fn load_abacus(&self, csv_data: &str) -> anyhow::Result<()> {
        let conn = self.conn.borrow();
        let mut rdr = reader(csv_data);

        let mut count = 0u32;
        for result in rdr.records() {
            let r = result?;
            let group = r.get(0).unwrap_or("");
            let abacus = r.get(1).unwrap_or("");
            let series = r.get(2).unwrap_or("");
            let value = number(r.get(3), "value")?;
            let ord: Option<f64> = match r.get(4) {
                Some(raw) if !raw.is_empty() => Some(number(Some(raw), "order")?),
                _ => None,
            };

            conn.execute(
                "INSERT INTO abacus_points (group_name, abacus, series, position, value, ord)
                 VALUES (?1, ?2, ?3,
                         (SELECT COUNT(*) FROM abacus_points
                          WHERE group_name = ?1 AND abacus = ?2 AND series = ?3),
                         ?4, ?5)",
                params![group, abacus, series, value, ord],
            )?;
            count += 1;
        }
        log::info!("[HSL Debug] loader: Loaded {} abacus points", count);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::Database;

    #[test]
    fn load_structures_from_csv() {
        let db = Database::new().unwrap();
        let csv = "\
ID,NAME,ACTIVE
1,Pont de la Gare,1
2,Old culvert,0
";
        db.load_structures(csv).unwrap();

        let conn = db.conn.borrow();
        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM structures", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 2);

        let active: bool = conn
            .query_row("SELECT active FROM structures WHERE id = 2", [], |row| {
                row.get(0)
            })
            .unwrap();
        assert!(!active);
    }

    #[test]
    fn load_structures_defaults_to_active() {
        let db = Database::new().unwrap();
        db.load_structures("ID,NAME\n3,Weir\n").unwrap();
        let conn = db.conn.borrow();
        let active: bool = conn
            .query_row("SELECT active FROM structures WHERE id = 3", [], |row| {
                row.get(0)
            })
            .unwrap();
        assert!(active);
    }

    #[test]
    fn load_parameters_replaces_on_conflict() {
        let db = Database::new().unwrap();
        db.load_parameters("structure_id,name,value\n1,deck_top,6\n").unwrap();
        db.load_parameters("structure_id,name,value\n1,deck_top,6.5\n1,weir_kind,\n")
            .unwrap();

        let conn = db.conn.borrow();
        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM parameters", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 1, "Empty values are skipped");
        let value: String = conn
            .query_row(
                "SELECT value FROM parameters WHERE structure_id = 1 AND name = 'deck_top'",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(value, "6.5");
    }

    #[test]
    fn load_profiles_keeps_row_order() {
        let db = Database::new().unwrap();
        let csv = "\
structure_id,station,elevation
1,0,10
2,0,3
1,10,0
1,40,0
";
        db.load_profiles(csv).unwrap();

        let conn = db.conn.borrow();
        let position: i64 = conn
            .query_row(
                "SELECT position FROM profile_points WHERE structure_id = 1 AND station = 40",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(position, 2);
    }

    #[test]
    fn load_elements_accepts_decimal_comma() {
        let db = Database::new().unwrap();
        let csv = "\
structure_id,kind,index,station,elevation
1,0,1,\"12,5\",0
1,0,1,24,0
";
        db.load_elements(csv).unwrap();

        let conn = db.conn.borrow();
        let station: f64 = conn
            .query_row(
                "SELECT station FROM element_points WHERE position = 0",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert!((station - 12.5).abs() < 1e-12);
    }

    #[test]
    fn load_abacus_with_optional_order() {
        let db = Database::new().unwrap();
        let csv = "\
group,abacus,series,value,order
bradley,kb_abac,M,0.3,1
bradley,kb_abac,M,0.5,2
bradley,kb_abac,Others,1.5
";
        db.load_abacus(csv).unwrap();

        let conn = db.conn.borrow();
        let with_order: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM abacus_points WHERE ord IS NOT NULL",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(with_order, 2);
    }

    #[test]
    fn load_rejects_non_numeric_station() {
        let db = Database::new().unwrap();
        let csv = "structure_id,station,elevation\n1,left bank,3\n";
        assert!(db.load_profiles(csv).is_err());
    }
}
