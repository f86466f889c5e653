//! Library interface for brewls.
//!
//! Exposes the inventory, graph, and rendering building blocks so the
//! binary, integration tests, and benches share one implementation.

pub mod caskroom;
pub mod cellar;
pub mod colors;
pub mod error;
pub mod features;
pub mod graph;
pub mod listing;

// Re-export the crate-wide error types
pub use error::{BrewlsError, Result};
