//! In-memory SQLite database layer for hydraulic structure laws.
//!
//! This crate loads structure inputs (parameters, cross-section profiles,
//! opening and pier polygons, abacus tables) from CSV into an in-memory
//! SQLite database, serves them to the law engine through the store traits
//! of `hsl-core`, and keeps the computed laws and deactivation advisories.
//!
//! # Architecture
//!
//! - `Rc<RefCell<Connection>>` wrapper for interior mutability; the engine
//!   runs single-threaded and the store traits take `&self`
//! - CSV data loaded by the `load_*` methods
//! - Typed query methods returning domain types or serializable models
//!
//! # Usage
//!
//! ```rust
//! use hsl_db::Database;
//!
//! let db = Database::new().unwrap();
//! db.load_structures("ID,NAME,ACTIVE\n1,Pont de la Gare,1\n").unwrap();
//! db.load_parameters("structure_id,name,value\n1,deck_top,6\n").unwrap();
//!
//! let structures = db.query_structures().unwrap();
//! assert_eq!(structures[0].name, "Pont de la Gare");
//! ```
//!
//! # Tables
//!
//! See [`schema::create_schema`] for the full SQL schema.

pub mod schema;
mod loader;
mod queries;
mod store;
pub mod models;

use rusqlite::Connection;
use std::cell::RefCell;
use std::rc::Rc;

/// In-memory SQLite database holding structure inputs and computed laws.
///
/// Cloning is cheap (via `Rc`); clones share one connection.
#[derive(Clone, Debug)]
pub struct Database {
    conn: Rc<RefCell<Connection>>,
}

impl Database {
    /// Create a new in-memory database with the full schema applied.
    ///
    /// The database is empty after creation; use the `load_*` methods
    /// to populate it with CSV data.
    pub fn new() -> anyhow::Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(schema::create_schema())?;
        Ok(Self {
            conn: Rc::new(RefCell::new(conn)),
        })
    }
}
