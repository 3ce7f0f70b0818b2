//! Dominator tree computation using the Lengauer-Tarjan algorithm.
//!
//! A node `d` **dominates** a node `n` if every path from the entry node to `n`
//! must pass through `d`. The **immediate dominator** of `n` (idom(n)) is the
//! unique node that strictly dominates `n` but does not strictly dominate any
//! other dominator of `n`.
//!
//! Natural loop detection relies on this relation: an edge `n -> h` is a back
//! edge exactly when `h` dominates `n`.
//!
//! This implementation uses the Lengauer-Tarjan algorithm with path compression,
//! achieving O(V α(V)) time complexity. Nodes that are unreachable from the entry
//! have no dominators and dominate nothing.

use crate::utils::graph::{NodeId, Predecessors, RootedGraph, Successors};

/// Result of dominator tree computation.
///
/// # Examples
///
/// ```rust
/// use loopstat::analysis::{FunctionBuilder, SsaCfg};
/// use loopstat::utils::graph::{algorithms::compute_dominators_rooted, NodeId};
///
/// let mut b = FunctionBuilder::new("straight");
/// let entry = b.block();
/// let exit = b.block();
/// b.switch_to(entry);
/// b.jump(exit);
/// b.switch_to(exit);
/// b.ret(None);
/// let func = b.finish()?;
///
/// let dom_tree = compute_dominators_rooted(&SsaCfg::from_ssa(&func));
/// assert!(dom_tree.dominates(NodeId::new(0), NodeId::new(1)));
/// assert_eq!(dom_tree.immediate_dominator(NodeId::new(1)), Some(NodeId::new(0)));
/// # Ok::<(), loopstat::Error>(())
/// ```
#[derive(Debug, Clone)]
pub struct DominatorTree {
    /// The entry (root) node of the dominator tree
    entry: NodeId,
    /// Immediate dominator for each node, `None` for the entry and unreachable nodes
    idom: Vec<Option<NodeId>>,
    /// Whether each node is reachable from the entry
    reachable: Vec<bool>,
}

impl DominatorTree {
    /// Returns the entry (root) node of the dominator tree.
    #[inline]
    #[must_use]
    pub fn entry(&self) -> NodeId {
        self.entry
    }

    /// Returns the immediate dominator of a node.
    ///
    /// `None` for the entry node, unreachable nodes and nodes outside the graph.
    #[inline]
    #[must_use]
    pub fn immediate_dominator(&self, node: NodeId) -> Option<NodeId> {
        self.idom.get(node.index()).copied().flatten()
    }

    /// Returns `true` if `node` is reachable from the entry.
    #[inline]
    #[must_use]
    pub fn is_reachable(&self, node: NodeId) -> bool {
        self.reachable.get(node.index()).copied().unwrap_or(false)
    }

    /// Checks if node `a` dominates node `b`.
    ///
    /// A reachable node dominates itself. The entry node dominates all reachable nodes.
    ///
    /// # Complexity
    ///
    /// O(depth) where depth is the depth of `b` in the dominator tree.
    #[must_use]
    pub fn dominates(&self, a: NodeId, b: NodeId) -> bool {
        if !self.is_reachable(a) || !self.is_reachable(b) {
            return false;
        }

        let mut current = b;
        loop {
            if current == a {
                return true;
            }
            match self.immediate_dominator(current) {
                Some(idom) => current = idom,
                None => return false,
            }
        }
    }

    /// Checks if node `a` strictly dominates node `b`.
    #[inline]
    #[must_use]
    pub fn strictly_dominates(&self, a: NodeId, b: NodeId) -> bool {
        a != b && self.dominates(a, b)
    }

    /// Returns the depth of a node in the dominator tree.
    ///
    /// The entry node has depth 0; unreachable nodes report 0 as well.
    #[must_use]
    pub fn depth(&self, node: NodeId) -> usize {
        let mut depth = 0;
        let mut current = node;
        while let Some(idom) = self.immediate_dominator(current) {
            current = idom;
            depth += 1;
        }
        depth
    }

    /// Returns the number of nodes covered by the tree.
    #[inline]
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.idom.len()
    }
}

/// Computes the dominator tree for a graph using the Lengauer-Tarjan algorithm.
///
/// # Arguments
///
/// * `graph` - The graph to analyze
/// * `entry` - The node from which dominance is computed
///
/// # Complexity
///
/// - Time: O(V α(V)) where α is the inverse Ackermann function
/// - Space: O(V)
pub fn compute_dominators<G>(graph: &G, entry: NodeId) -> DominatorTree
where
    G: Predecessors + Successors,
{
    let node_count = graph.node_count();

    if node_count == 0 || entry.index() >= node_count {
        return DominatorTree {
            entry,
            idom: vec![None; node_count],
            reachable: vec![false; node_count],
        };
    }

    let mut lt = LengauerTarjan::new(node_count, entry);
    lt.compute(graph);

    let reachable: Vec<bool> = lt.dfnum.iter().map(|&n| n != 0).collect();
    let idom = (0..node_count)
        .map(|i| {
            let node = NodeId::new(i);
            if node == entry || !reachable[i] {
                None
            } else {
                Some(lt.idom[i])
            }
        })
        .collect();

    DominatorTree {
        entry,
        idom,
        reachable,
    }
}

/// Convenience function to compute dominators for a [`RootedGraph`].
///
/// This is equivalent to calling `compute_dominators(graph, graph.entry())`.
pub fn compute_dominators_rooted<G>(graph: &G) -> DominatorTree
where
    G: RootedGraph,
{
    compute_dominators(graph, graph.entry())
}

/// Internal state for the Lengauer-Tarjan algorithm.
struct LengauerTarjan {
    /// Entry node
    entry: NodeId,
    /// DFS number for each node (0 = not visited)
    dfnum: Vec<usize>,
    /// Node with each DFS number (inverse of dfnum)
    vertex: Vec<NodeId>,
    /// Parent in DFS tree
    parent: Vec<NodeId>,
    /// Semidominator (by DFS number, stored as node ID)
    semi: Vec<NodeId>,
    /// Immediate dominator (final result)
    idom: Vec<NodeId>,
    /// Ancestor in the forest for link-eval
    ancestor: Vec<Option<NodeId>>,
    /// Best node on path to ancestor (for path compression)
    best: Vec<NodeId>,
    /// Bucket for each node (nodes whose semidominator is this node)
    bucket: Vec<Vec<NodeId>>,
    /// Current DFS counter
    dfs_counter: usize,
}

impl LengauerTarjan {
    fn new(n: usize, entry: NodeId) -> Self {
        Self {
            entry,
            dfnum: vec![0; n],
            vertex: vec![entry; n],
            parent: vec![entry; n],
            semi: (0..n).map(NodeId::new).collect(),
            idom: vec![entry; n],
            ancestor: vec![None; n],
            best: (0..n).map(NodeId::new).collect(),
            bucket: vec![Vec::new(); n],
            dfs_counter: 0,
        }
    }

    fn compute<G>(&mut self, graph: &G)
    where
        G: Predecessors + Successors,
    {
        // Phase 1: DFS numbering
        self.dfs(graph, self.entry);

        // Process nodes in reverse DFS order (excluding entry)
        for i in (1..self.dfs_counter).rev() {
            let w = self.vertex[i];
            let parent_w = self.parent[w.index()];

            // Phase 2: Compute semidominators
            let preds: Vec<NodeId> = graph.predecessors(w).collect();
            for v in preds {
                if v.index() >= self.dfnum.len() || self.dfnum[v.index()] == 0 {
                    // v is unreachable from entry, skip
                    continue;
                }
                let u = self.eval(v);
                if self.dfnum[self.semi[u.index()].index()]
                    < self.dfnum[self.semi[w.index()].index()]
                {
                    self.semi[w.index()] = self.semi[u.index()];
                }
            }

            let semi_w = self.semi[w.index()];
            self.bucket[semi_w.index()].push(w);

            self.link(parent_w, w);

            // Phase 3: Implicitly compute immediate dominators
            let bucket = std::mem::take(&mut self.bucket[parent_w.index()]);
            for v in bucket {
                let u = self.eval(v);
                if self.semi[u.index()] == self.semi[v.index()] {
                    self.idom[v.index()] = parent_w;
                } else {
                    self.idom[v.index()] = u;
                }
            }
        }

        // Phase 4: Explicitly compute immediate dominators
        for i in 1..self.dfs_counter {
            let w = self.vertex[i];
            if self.idom[w.index()] != self.semi[w.index()] {
                self.idom[w.index()] = self.idom[self.idom[w.index()].index()];
            }
        }

        self.idom[self.entry.index()] = self.entry;
    }

    /// Iterative preorder DFS assigning DFS numbers and building the DFS tree.
    fn dfs<G: Successors>(&mut self, graph: &G, start: NodeId) {
        let mut stack = vec![(start, start)];

        while let Some((node, parent)) = stack.pop() {
            let idx = node.index();
            if idx >= self.dfnum.len() || self.dfnum[idx] != 0 {
                continue;
            }

            self.dfs_counter += 1;
            self.dfnum[idx] = self.dfs_counter;
            self.vertex[self.dfs_counter - 1] = node;
            self.parent[idx] = parent;

            let succs: Vec<NodeId> = graph.successors(node).collect();
            for succ in succs.into_iter().rev() {
                if succ.index() < self.dfnum.len() && self.dfnum[succ.index()] == 0 {
                    stack.push((succ, node));
                }
            }
        }
    }

    /// Link v as a child of w in the spanning forest.
    fn link(&mut self, w: NodeId, v: NodeId) {
        self.ancestor[v.index()] = Some(w);
    }

    /// Evaluate: find the node with minimum semidominator on the path to the root.
    fn eval(&mut self, v: NodeId) -> NodeId {
        if self.ancestor[v.index()].is_none() {
            return v;
        }

        self.compress(v);
        self.best[v.index()]
    }

    /// Path compression for the forest.
    fn compress(&mut self, v: NodeId) {
        let Some(ancestor_v) = self.ancestor[v.index()] else {
            return;
        };
        if self.ancestor[ancestor_v.index()].is_none() {
            return;
        }

        self.compress(ancestor_v);

        let best_ancestor = self.best[ancestor_v.index()];
        let best_v = self.best[v.index()];

        if self.dfnum[self.semi[best_ancestor.index()].index()]
            < self.dfnum[self.semi[best_v.index()].index()]
        {
            self.best[v.index()] = best_ancestor;
        }

        self.ancestor[v.index()] = self.ancestor[ancestor_v.index()];
    }
}

#[cfg(test)]
mod tests {
    use crate::utils::graph::{
        algorithms::dominators::compute_dominators, GraphBase, NodeId, Predecessors, Successors,
    };

    struct EdgeList {
        nodes: usize,
        edges: Vec<(usize, usize)>,
    }

    impl GraphBase for EdgeList {
        fn node_count(&self) -> usize {
            self.nodes
        }

        fn node_ids(&self) -> impl Iterator<Item = NodeId> {
            (0..self.nodes).map(NodeId::new)
        }
    }

    impl Successors for EdgeList {
        fn successors(&self, node: NodeId) -> impl Iterator<Item = NodeId> {
            self.edges
                .iter()
                .filter(move |(s, _)| *s == node.index())
                .map(|(_, d)| NodeId::new(*d))
        }
    }

    impl Predecessors for EdgeList {
        fn predecessors(&self, node: NodeId) -> impl Iterator<Item = NodeId> {
            self.edges
                .iter()
                .filter(move |(_, d)| *d == node.index())
                .map(|(s, _)| NodeId::new(*s))
        }
    }

    #[test]
    fn test_diamond() {
        // 0 -> 1, 0 -> 2, 1 -> 3, 2 -> 3
        let graph = EdgeList {
            nodes: 4,
            edges: vec![(0, 1), (0, 2), (1, 3), (2, 3)],
        };
        let dom = compute_dominators(&graph, NodeId::new(0));

        assert!(dom.dominates(NodeId::new(0), NodeId::new(3)));
        assert!(!dom.strictly_dominates(NodeId::new(1), NodeId::new(3)));
        assert_eq!(dom.immediate_dominator(NodeId::new(3)), Some(NodeId::new(0)));
        assert_eq!(dom.immediate_dominator(NodeId::new(0)), None);
    }

    #[test]
    fn test_nested_loops() {
        // 0 -> 1 -> 2 -> 2 (inner self loop), 2 -> 3 -> 1 (outer back edge), 3 -> 4
        let graph = EdgeList {
            nodes: 5,
            edges: vec![(0, 1), (1, 2), (2, 2), (2, 3), (3, 1), (3, 4)],
        };
        let dom = compute_dominators(&graph, NodeId::new(0));

        assert!(dom.dominates(NodeId::new(1), NodeId::new(3)));
        assert!(dom.dominates(NodeId::new(2), NodeId::new(2)));
        assert_eq!(dom.immediate_dominator(NodeId::new(4)), Some(NodeId::new(3)));
        assert_eq!(dom.depth(NodeId::new(4)), 4);
    }

    #[test]
    fn test_unreachable_node() {
        let graph = EdgeList {
            nodes: 3,
            edges: vec![(0, 1), (2, 1)],
        };
        let dom = compute_dominators(&graph, NodeId::new(0));

        assert!(!dom.is_reachable(NodeId::new(2)));
        assert!(!dom.dominates(NodeId::new(2), NodeId::new(1)));
        assert!(!dom.dominates(NodeId::new(0), NodeId::new(2)));
        assert_eq!(dom.immediate_dominator(NodeId::new(1)), Some(NodeId::new(0)));
    }

    #[test]
    fn test_empty_graph() {
        let graph = EdgeList {
            nodes: 0,
            edges: vec![],
        };
        let dom = compute_dominators(&graph, NodeId::new(0));
        assert_eq!(dom.node_count(), 0);
        assert!(!dom.dominates(NodeId::new(0), NodeId::new(0)));
    }
}
