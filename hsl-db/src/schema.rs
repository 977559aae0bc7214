//! SQL schema of the in-memory structure database.
//!
//! The schema is applied as a single batch when the database is created.

/// Returns the full SQL schema as a single batch string.
///
/// **Inputs:**
/// - `structures` - Structure id, display name and active flag
/// - `parameters` - Raw parameter values keyed by (structure_id, name)
/// - `profile_points` - Cross-section vertices in survey order
/// - `element_points` - Opening (kind 0) and pier (kind 1) polygon vertices
/// - `abacus_points` - Digitized abacus series, grouped by method family
///
/// **Outputs:**
/// - `laws` - Saved (q, zav, zam) tables, one per (method, structure)
/// - `advisories` - Messages raised when a structure is deactivated
pub fn create_schema() -> &'static str {
    r#"
    CREATE TABLE IF NOT EXISTS structures (
        id INTEGER PRIMARY KEY,
        name TEXT NOT NULL,
        active INTEGER NOT NULL DEFAULT 1
    );

    CREATE TABLE IF NOT EXISTS parameters (
        structure_id INTEGER NOT NULL,
        name TEXT NOT NULL,
        value TEXT NOT NULL,
        PRIMARY KEY (structure_id, name)
    );

    CREATE TABLE IF NOT EXISTS profile_points (
        structure_id INTEGER NOT NULL,
        position INTEGER NOT NULL,
        station REAL NOT NULL,
        elevation REAL NOT NULL,
        PRIMARY KEY (structure_id, position)
    );

    CREATE TABLE IF NOT EXISTS element_points (
        structure_id INTEGER NOT NULL,
        kind INTEGER NOT NULL,
        elem_index INTEGER NOT NULL,
        position INTEGER NOT NULL,
        station REAL NOT NULL,
        elevation REAL NOT NULL,
        PRIMARY KEY (structure_id, kind, elem_index, position)
    );
    CREATE INDEX IF NOT EXISTS idx_elem_structure ON element_points(structure_id, kind);

    CREATE TABLE IF NOT EXISTS abacus_points (
        group_name TEXT NOT NULL,
        abacus TEXT NOT NULL,
        series TEXT NOT NULL,
        position INTEGER NOT NULL,
        value REAL NOT NULL,
        ord REAL,
        PRIMARY KEY (group_name, abacus, series, position)
    );
    CREATE INDEX IF NOT EXISTS idx_abacus_group ON abacus_points(group_name);

    CREATE TABLE IF NOT EXISTS laws (
        method TEXT NOT NULL,
        structure_id INTEGER NOT NULL,
        position INTEGER NOT NULL,
        q REAL NOT NULL,
        zav REAL NOT NULL,
        zam REAL NOT NULL,
        PRIMARY KEY (method, structure_id, position)
    );

    CREATE TABLE IF NOT EXISTS advisories (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        structure_id INTEGER NOT NULL,
        message TEXT NOT NULL
    );
    "#
}

#[cfg(test)]
mod tests {
    use super::*;
    use rusqlite::Connection;

    #[test]
    fn schema_is_valid_sql() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(create_schema())
            .expect("Schema SQL should be valid");
    }

    #[test]
    fn schema_creates_all_tables() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(create_schema()).unwrap();

        let expected_tables = [
            "structures",
            "parameters",
            "profile_points",
            "element_points",
            "abacus_points",
            "laws",
            "advisories",
        ];

        for table in &expected_tables {
            let count: i64 = conn
                .query_row(
                    "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name=?1",
                    [table],
                    |row| row.get(0),
                )
                .unwrap();
            assert_eq!(count, 1, "Table '{}' should exist", table);
        }
    }

    #[test]
    fn schema_is_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(create_schema()).unwrap();
        conn.execute_batch(create_schema())
            .expect("Applying schema twice should succeed due to IF NOT EXISTS");
    }
}
