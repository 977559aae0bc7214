//! Core types and collaborator contracts for hydraulic structure laws.
//!
//! A law relates the flow `Q` through a structure (bridge, culvert, weir) to
//! the downstream level `Zav` and the upstream level `Zam`. This crate holds
//! the data model shared by the computation engine and the storage layer:
//! cross-section geometry, structure elements, typed parameters, abacus
//! tables, and the traits the engine uses to reach its collaborators.

pub mod abacus;
pub mod element;
pub mod error;
pub mod geometry;
pub mod law;
pub mod method;
pub mod params;
pub mod settings;
pub mod store;

pub use error::{LawError, Result};
