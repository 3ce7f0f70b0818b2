//! Generic directed graph infrastructure for loop analysis.
//!
//! This module provides the graph abstractions the loop analyses are written against.
//! Control flow graphs of [`SsaFunction`](crate::analysis::SsaFunction)s implement the
//! traits defined here, which lets dominator computation and natural-loop detection
//! stay independent of the IR representation.
//!
//! # Key Components
//!
//! - [`NodeId`] - Strongly-typed node (basic block) identifier
//! - [`GraphBase`], [`Successors`], [`Predecessors`], [`RootedGraph`] - Graph traits
//! - [`algorithms`] - Dominator tree computation
//!
//! # Usage Examples
//!
//! ```rust,ignore
//! use loopstat::utils::graph::{algorithms::compute_dominators_rooted, NodeId};
//!
//! let dominators = compute_dominators_rooted(&function);
//! assert!(dominators.dominates(NodeId::new(0), NodeId::new(3)));
//! ```

pub mod algorithms;
mod node;
mod traits;

pub use node::NodeId;
pub use traits::{GraphBase, Predecessors, RootedGraph, Successors};
