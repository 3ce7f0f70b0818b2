//! Graph algorithms used by loop analysis.
//!
//! - [`compute_dominators`] - Compute the dominator tree using Lengauer-Tarjan
//! - [`compute_dominators_rooted`] - Same, starting from a [`RootedGraph`](super::RootedGraph)'s entry
//! - [`DominatorTree`] - Result of dominator computation
//!
//! | Algorithm | Time Complexity | Use Case |
//! |-----------|-----------------|----------|
//! | Dominators | O(V α(V)) | Back-edge and natural loop detection |

mod dominators;

pub use dominators::{compute_dominators, compute_dominators_rooted, DominatorTree};
