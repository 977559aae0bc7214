//! Law generation for hydraulic structures.
//!
//! [`compute_law`] loads a structure through the store traits of `hsl-core`,
//! runs the Bradley, Borda or orifice method over the downstream level grid
//! and hands the stitched, rectangular table to the sink.

pub mod assembler;
pub mod borda;
pub mod bradley;
pub mod context;
pub mod diagnostics;
pub mod flow;
pub mod orifice;
pub mod submerged;

pub use assembler::{compute_law, deactivation_message, LawOutcome, LawReport};
pub use diagnostics::{Diagnostic, DiagnosticKind};
