//! Shared utilities used by the analysis layers.
//!
//! - [`graph`] - Block identifiers, graph traits and dominator computation

pub mod graph;
