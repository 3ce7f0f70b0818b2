//! Trait definitions for graph abstractions.
//!
//! The loop analyses are written against these traits rather than against a concrete
//! CFG type, so any host representation that can enumerate blocks and edges can be
//! analyzed.
//!
//! - [`GraphBase`] - Core properties: node count and node iteration
//! - [`Successors`] - Forward edge traversal (outgoing edges)
//! - [`Predecessors`] - Backward edge traversal (incoming edges)
//! - [`RootedGraph`] - Graphs with a designated entry node (for dominator computation)
//!
//! All adjacency queries return iterators rather than collections, avoiding
//! allocations for simple traversals.

use crate::utils::graph::NodeId;

/// Base trait providing core graph properties.
pub trait GraphBase {
    /// Returns the number of nodes in the graph.
    fn node_count(&self) -> usize;

    /// Returns an iterator over all node identifiers in the graph, by ascending index.
    fn node_ids(&self) -> impl Iterator<Item = NodeId>;
}

/// Trait for graphs that support forward edge traversal.
pub trait Successors: GraphBase {
    /// Returns an iterator over the successor nodes of the given node.
    ///
    /// For a directed edge `(u, v)`, node `v` is a successor of `u`. Nodes outside
    /// the graph have no successors.
    fn successors(&self, node: NodeId) -> impl Iterator<Item = NodeId>;
}

/// Trait for graphs that support backward edge traversal.
pub trait Predecessors: GraphBase {
    /// Returns an iterator over the predecessor nodes of the given node.
    ///
    /// For a directed edge `(u, v)`, node `u` is a predecessor of `v`. Nodes outside
    /// the graph have no predecessors.
    fn predecessors(&self, node: NodeId) -> impl Iterator<Item = NodeId>;
}

/// Trait for graphs with a designated entry node.
///
/// Control flow graphs have a single entry block from which every reachable
/// block can be reached; dominance is defined relative to this node.
pub trait RootedGraph: Successors + Predecessors {
    /// Returns the entry node of the graph.
    fn entry(&self) -> NodeId;
}

#[cfg(test)]
mod tests {
    use super::*;

    // A minimal test graph implementation for trait testing
    struct TestGraph {
        node_count: usize,
        edges: Vec<(NodeId, NodeId)>,
        entry: NodeId,
    }

    impl GraphBase for TestGraph {
        fn node_count(&self) -> usize {
            self.node_count
        }

        fn node_ids(&self) -> impl Iterator<Item = NodeId> {
            (0..self.node_count).map(NodeId::new)
        }
    }

    impl Successors for TestGraph {
        fn successors(&self, node: NodeId) -> impl Iterator<Item = NodeId> {
            self.edges
                .iter()
                .filter(move |(src, _)| *src == node)
                .map(|(_, dst)| *dst)
        }
    }

    impl Predecessors for TestGraph {
        fn predecessors(&self, node: NodeId) -> impl Iterator<Item = NodeId> {
            self.edges
                .iter()
                .filter(move |(_, dst)| *dst == node)
                .map(|(src, _)| *src)
        }
    }

    impl RootedGraph for TestGraph {
        fn entry(&self) -> NodeId {
            self.entry
        }
    }

    #[test]
    fn test_back_edge_visible_both_ways() {
        let graph = TestGraph {
            node_count: 3,
            edges: vec![
                (NodeId::new(0), NodeId::new(1)),
                (NodeId::new(1), NodeId::new(2)),
                (NodeId::new(2), NodeId::new(1)),
            ],
            entry: NodeId::new(0),
        };

        assert_eq!(graph.entry(), NodeId::new(0));
        let succs: Vec<_> = graph.successors(NodeId::new(2)).collect();
        assert_eq!(succs, vec![NodeId::new(1)]);

        let mut preds: Vec<_> = graph.predecessors(NodeId::new(1)).collect();
        preds.sort();
        assert_eq!(preds, vec![NodeId::new(0), NodeId::new(2)]);
    }
}
