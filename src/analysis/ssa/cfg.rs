//! Control flow graph view of SSA functions.
//!
//! [`SsaCfg`] is a lightweight CFG view derived from block terminators. It implements
//! the standard graph traits so the dominator computation and loop detection can run
//! directly over an [`SsaFunction`]:
//! - [`GraphBase`] - Node count and iteration
//! - [`Successors`] - Forward edge traversal (from terminators)
//! - [`Predecessors`] - Backward edge traversal (computed from successors)
//! - [`RootedGraph`] - Entry node (block 0)
//!
//! ```rust
//! use loopstat::analysis::{FunctionBuilder, SsaCfg};
//! use loopstat::utils::graph::{GraphBase, NodeId, RootedGraph};
//!
//! let mut b = FunctionBuilder::new("f");
//! let entry = b.block();
//! b.switch_to(entry);
//! b.ret(None);
//! let func = b.finish()?;
//!
//! let cfg = SsaCfg::from_ssa(&func);
//! assert_eq!(cfg.node_count(), 1);
//! assert_eq!(cfg.entry(), NodeId::new(0));
//! # Ok::<(), loopstat::Error>(())
//! ```

use crate::{
    analysis::ssa::SsaFunction,
    utils::graph::{GraphBase, NodeId, Predecessors, RootedGraph, Successors},
};

/// A lightweight control flow graph view of an SSA function.
///
/// Predecessor lists are computed once on construction; all queries afterwards are
/// O(1) or O(k) in the number of adjacent blocks. The view must not outlive the
/// function it was created from.
#[derive(Debug)]
pub struct SsaCfg<'a> {
    ssa: &'a SsaFunction,
    /// predecessors[block_id] = blocks that can jump to block_id.
    predecessors: Vec<Vec<usize>>,
}

impl<'a> SsaCfg<'a> {
    /// Creates a CFG view from an SSA function.
    #[must_use]
    pub fn from_ssa(ssa: &'a SsaFunction) -> Self {
        let block_count = ssa.block_count();
        let mut predecessors = vec![Vec::new(); block_count];

        for block in ssa.blocks() {
            for succ in block.successors() {
                if succ < block_count && !predecessors[succ].contains(&block.id()) {
                    predecessors[succ].push(block.id());
                }
            }
        }

        Self { ssa, predecessors }
    }

    /// Returns the underlying SSA function.
    #[must_use]
    pub const fn ssa(&self) -> &'a SsaFunction {
        self.ssa
    }

    /// Returns the number of blocks.
    #[must_use]
    pub fn block_count(&self) -> usize {
        self.ssa.block_count()
    }

    /// Returns `true` if the function has no blocks.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ssa.is_empty()
    }

    /// Returns the successors of a block.
    #[must_use]
    pub fn block_successors(&self, block_idx: usize) -> Vec<usize> {
        self.ssa
            .block(block_idx)
            .map(|block| block.successors())
            .unwrap_or_default()
    }

    /// Returns the predecessors of a block.
    #[must_use]
    pub fn block_predecessors(&self, block_idx: usize) -> &[usize] {
        self.predecessors
            .get(block_idx)
            .map_or(&[], Vec::as_slice)
    }
}

impl GraphBase for SsaCfg<'_> {
    fn node_count(&self) -> usize {
        self.ssa.block_count()
    }

    fn node_ids(&self) -> impl Iterator<Item = NodeId> {
        (0..self.ssa.block_count()).map(NodeId::new)
    }
}

impl Successors for SsaCfg<'_> {
    fn successors(&self, node: NodeId) -> impl Iterator<Item = NodeId> {
        self.block_successors(node.index())
            .into_iter()
            .map(NodeId::new)
    }
}

impl Predecessors for SsaCfg<'_> {
    fn predecessors(&self, node: NodeId) -> impl Iterator<Item = NodeId> {
        self.block_predecessors(node.index())
            .iter()
            .copied()
            .map(NodeId::new)
    }
}

impl RootedGraph for SsaCfg<'_> {
    fn entry(&self) -> NodeId {
        NodeId::new(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::ssa::{FunctionBuilder, SsaType};

    #[test]
    fn test_diamond_edges() -> crate::Result<()> {
        // B0 -> B1, B2 -> B3
        let mut b = FunctionBuilder::new("diamond");
        let c = b.argument("c", SsaType::bool());
        let blocks: Vec<usize> = (0..4).map(|_| b.block()).collect();
        b.switch_to(blocks[0]);
        b.branch(c, blocks[1], blocks[2]);
        b.switch_to(blocks[1]);
        b.jump(blocks[3]);
        b.switch_to(blocks[2]);
        b.jump(blocks[3]);
        b.switch_to(blocks[3]);
        b.ret(None);
        let func = b.finish()?;

        let cfg = SsaCfg::from_ssa(&func);
        assert_eq!(cfg.node_count(), 4);
        assert_eq!(cfg.block_successors(0), vec![1, 2]);
        assert_eq!(cfg.block_predecessors(3), &[1, 2]);
        assert!(cfg.block_predecessors(0).is_empty());
        assert_eq!(
            cfg.predecessors(NodeId::new(3)).collect::<Vec<_>>(),
            vec![NodeId::new(1), NodeId::new(2)]
        );
        assert!(cfg.block_successors(9).is_empty());
        Ok(())
    }
}
