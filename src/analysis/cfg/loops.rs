//! Natural loop detection and the loop forest.
//!
//! # Loop Structure
//!
//! A well-formed loop has the following structure:
//!
//! ```text
//!     [preheader]     <- Single entry predecessor (optional)
//!          |
//!          v
//!     [header] <------+  <- Single entry point, dominates all loop nodes
//!          |          |
//!          v          |
//!     [body ...]      |  <- Loop body nodes (including nested loops)
//!          |          |
//!          v          |
//!     [latch] --------+  <- Back edge source
//!          |
//!          v
//!     [exit ...]         <- Exit blocks (outside loop, have predecessor in loop)
//! ```
//!
//! # Loop Types
//!
//! Loops are classified into:
//! - **Pre-tested** (while): Condition checked at header before body
//! - **Post-tested** (do-while): Condition checked at latch after body
//! - **Infinite**: No exit condition
//! - **Complex**: Multiple back edges or irregular structure
//!
//! # Generic Loop Detection
//!
//! [`detect_loops`] analyzes any graph implementing `GraphBase`, `Successors` and
//! `Predecessors`, given its dominator tree:
//!
//! ```rust
//! use loopstat::analysis::{detect_loops, FunctionBuilder, SsaCfg, SsaType};
//! use loopstat::utils::graph::{algorithms::compute_dominators_rooted, NodeId};
//!
//! let mut b = FunctionBuilder::new("spin");
//! let c = b.argument("c", SsaType::bool());
//! let entry = b.block();
//! let header = b.block();
//! let exit = b.block();
//! b.switch_to(entry);
//! b.jump(header);
//! b.switch_to(header);
//! b.branch(c, header, exit);
//! b.switch_to(exit);
//! b.ret(None);
//! let func = b.finish()?;
//!
//! let cfg = SsaCfg::from_ssa(&func);
//! let dominators = compute_dominators_rooted(&cfg);
//! let forest = detect_loops(&cfg, &dominators);
//!
//! assert_eq!(forest.len(), 1);
//! let lp = forest.top_level().next().ok_or(loopstat::Error::Error("no loop".into()))?;
//! assert_eq!(lp.header, NodeId::new(header));
//! assert_eq!(lp.latch(), Some(NodeId::new(header)));
//! assert_eq!(lp.preheader, Some(NodeId::new(entry)));
//! assert_eq!(lp.exit_block(), Some(NodeId::new(exit)));
//! # Ok::<(), loopstat::Error>(())
//! ```

use std::collections::{BTreeSet, HashMap};

use serde::Serialize;

use crate::{
    analysis::ssa::{BinaryOp, PhiNode, SsaFunction, SsaOp, SsaVarId},
    utils::graph::{algorithms::DominatorTree, GraphBase, NodeId, Predecessors, Successors},
};

/// Classification of loop types based on structure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum LoopType {
    /// Pre-tested loop (while): exit condition at header.
    /// ```text
    /// while (cond) { body }
    /// ```
    PreTested,

    /// Post-tested loop (do-while): exit condition at latch.
    /// ```text
    /// do { body } while (cond)
    /// ```
    PostTested,

    /// Infinite loop: no exit edges from loop body.
    Infinite,

    /// Complex loop: multiple latches or irregular exits.
    Complex,
}

/// Exit edge information for a loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoopExit {
    /// The block inside the loop that branches out.
    pub exiting_block: NodeId,
    /// The block outside the loop that is the exit target.
    pub exit_block: NodeId,
}

/// Classification of induction variable update operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InductionUpdateKind {
    /// `i = i + stride` (increment)
    Add,
    /// `i = i - stride` (decrement)
    Sub,
    /// `i = i * stride` (scaling)
    Mul,
    /// Unknown or complex update pattern
    Unknown,
}

/// A header phi whose operands split into one entry value and in-loop updates.
///
/// # Structure
///
/// An induction variable has:
/// - A phi node at the loop header that merges the initial and updated values
/// - An initial value from outside the loop (preheader)
/// - An updated value computed inside the loop (typically in the latch)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InductionVar {
    /// The phi node result at the loop header.
    pub phi_result: SsaVarId,
    /// The initial value (from outside the loop).
    pub init_value: SsaVarId,
    /// The block providing the initial value.
    pub init_block: NodeId,
    /// The updated value (from inside the loop).
    pub update_value: SsaVarId,
    /// The block providing the updated value.
    pub update_block: NodeId,
    /// The type of update operation.
    pub update_kind: InductionUpdateKind,
    /// The value added, subtracted or multiplied per iteration.
    pub stride_value: Option<SsaVarId>,
    /// The stride as a constant, if known.
    pub stride: Option<i64>,
}

/// Structural information about one natural loop.
#[derive(Debug, Clone)]
pub struct LoopInfo {
    /// The header block (single entry point, dominates all loop nodes).
    pub header: NodeId,

    /// All blocks in the loop body, including the header and nested loops.
    pub body: BTreeSet<NodeId>,

    /// Back edge sources (blocks that jump to the header from within the loop).
    pub latches: Vec<NodeId>,

    /// Single non-loop predecessor of the header, if there is exactly one.
    pub preheader: Option<NodeId>,

    /// Exit edges from the loop.
    pub exits: Vec<LoopExit>,

    /// Loop nesting depth (0 = outermost).
    pub depth: usize,

    /// Classification of the loop type.
    pub loop_type: LoopType,

    /// Parent loop header, if this loop is nested.
    pub parent: Option<NodeId>,

    /// Immediate child loop headers, in header order.
    pub children: Vec<NodeId>,
}

impl LoopInfo {
    /// Creates a new `LoopInfo` with the given header.
    #[must_use]
    pub fn new(header: NodeId) -> Self {
        let mut body = BTreeSet::new();
        body.insert(header);
        Self {
            header,
            body,
            latches: Vec::new(),
            preheader: None,
            exits: Vec::new(),
            depth: 0,
            loop_type: LoopType::Complex,
            parent: None,
            children: Vec::new(),
        }
    }

    /// Returns true if this loop contains the given block.
    ///
    /// Blocks of nested loops are part of the body, so this also answers
    /// membership for instructions of immediate sub-loops.
    #[must_use]
    pub fn contains(&self, node: NodeId) -> bool {
        self.body.contains(&node)
    }

    /// Returns the number of blocks in the loop.
    #[must_use]
    pub fn size(&self) -> usize {
        self.body.len()
    }

    /// Returns the single latch if there is exactly one.
    #[must_use]
    pub fn latch(&self) -> Option<NodeId> {
        match self.latches.as_slice() {
            [only] => Some(*only),
            _ => None,
        }
    }

    /// Returns true if the loop has a preheader and a single latch.
    #[must_use]
    pub fn is_canonical(&self) -> bool {
        self.preheader.is_some() && self.latch().is_some()
    }

    /// Returns true if this is an innermost loop (no children).
    #[must_use]
    pub fn is_innermost(&self) -> bool {
        self.children.is_empty()
    }

    /// Returns all exit blocks (blocks outside loop reachable from inside).
    pub fn exit_blocks(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.exits.iter().map(|e| e.exit_block)
    }

    /// Returns the exit block if every exit edge leads to the same block.
    #[must_use]
    pub fn exit_block(&self) -> Option<NodeId> {
        let mut blocks = self.exit_blocks();
        let first = blocks.next()?;
        blocks.all(|block| block == first).then_some(first)
    }

    /// Returns true if the value is defined by a phi or instruction inside the loop.
    #[must_use]
    pub fn contains_value(&self, ssa: &SsaFunction, var: SsaVarId) -> bool {
        ssa.def_block(var)
            .is_some_and(|block| self.contains(NodeId::new(block)))
    }

    /// Returns true if the value cannot change while the loop runs.
    ///
    /// Constants, arguments, globals and anything defined outside the loop are invariant.
    #[must_use]
    pub fn is_loop_invariant(&self, ssa: &SsaFunction, var: SsaVarId) -> bool {
        !self.contains_value(ssa, var)
    }

    /// Returns the phi nodes at the loop header.
    #[must_use]
    pub fn header_phis<'a>(&self, ssa: &'a SsaFunction) -> &'a [PhiNode] {
        ssa.block(self.header.index())
            .map_or(&[], |block| block.phi_nodes())
    }

    /// Returns the comparison that decides the latch's conditional branch.
    #[must_use]
    pub fn latch_cmp(&self, ssa: &SsaFunction) -> Option<SsaVarId> {
        let latch = ssa.block(self.latch()?.index())?;
        match latch.terminator()? {
            SsaOp::Branch { condition, .. } => match ssa.definition(*condition)? {
                SsaOp::Cmp { .. } => Some(*condition),
                _ => None,
            },
            _ => None,
        }
    }

    /// Identifies induction variables in this loop.
    ///
    /// An induction variable is a header phi where exactly one operand comes from
    /// outside the loop (initial value) and at least one from inside (updated value).
    /// The update is classified by the instruction producing it.
    #[must_use]
    pub fn find_induction_vars(&self, ssa: &SsaFunction) -> Vec<InductionVar> {
        let mut induction_vars = Vec::new();

        for phi in self.header_phis(ssa) {
            let operands = phi.operands();
            if operands.len() < 2 {
                continue;
            }

            let (inside_ops, outside_ops): (Vec<&_>, Vec<&_>) = operands
                .iter()
                .partition(|op| self.body.contains(&NodeId::new(op.predecessor())));

            if let ([init_op], [update_op, ..]) = (outside_ops.as_slice(), inside_ops.as_slice()) {
                let (update_kind, stride_value) =
                    Self::analyze_update_instruction(ssa, update_op.value(), phi.result());

                induction_vars.push(InductionVar {
                    phi_result: phi.result(),
                    init_value: init_op.value(),
                    init_block: NodeId::new(init_op.predecessor()),
                    update_value: update_op.value(),
                    update_block: NodeId::new(update_op.predecessor()),
                    update_kind,
                    stride_value,
                    stride: stride_value
                        .and_then(|v| ssa.constant(v))
                        .and_then(|c| c.as_i64()),
                });
            }
        }

        induction_vars
    }

    /// Looks for `phi + x`, `x + phi`, `phi - x`, `phi * x` and `x * phi`.
    fn analyze_update_instruction(
        ssa: &SsaFunction,
        update_var: SsaVarId,
        phi_result: SsaVarId,
    ) -> (InductionUpdateKind, Option<SsaVarId>) {
        let Some(SsaOp::Binary {
            op, left, right, ..
        }) = ssa.definition(update_var)
        else {
            return (InductionUpdateKind::Unknown, None);
        };

        let other = if *left == phi_result {
            Some(*right)
        } else if *right == phi_result && op.is_commutative() {
            Some(*left)
        } else {
            None
        };

        match (op, other) {
            (BinaryOp::Add, Some(other)) => (InductionUpdateKind::Add, Some(other)),
            (BinaryOp::Sub, Some(other)) => (InductionUpdateKind::Sub, Some(other)),
            (BinaryOp::Mul, Some(other)) => (InductionUpdateKind::Mul, Some(other)),
            _ => (InductionUpdateKind::Unknown, None),
        }
    }
}

/// Loop forest containing all loops in a function.
#[derive(Debug, Clone)]
pub struct LoopForest {
    /// All loops, sorted by header.
    loops: Vec<LoopInfo>,
    /// Map from block to the innermost loop containing it.
    block_to_loop: Vec<Option<usize>>,
}

impl LoopForest {
    /// Creates an empty loop forest.
    #[must_use]
    pub fn new(block_count: usize) -> Self {
        Self {
            loops: Vec::new(),
            block_to_loop: vec![None; block_count],
        }
    }

    /// Adds a loop to the forest.
    pub fn add_loop(&mut self, loop_info: LoopInfo) {
        let loop_idx = self.loops.len();

        for &block in &loop_info.body {
            let block_idx = block.index();
            if block_idx < self.block_to_loop.len() {
                // Keep the more deeply nested loop
                if let Some(existing_idx) = self.block_to_loop[block_idx] {
                    if self.loops[existing_idx].depth < loop_info.depth {
                        self.block_to_loop[block_idx] = Some(loop_idx);
                    }
                } else {
                    self.block_to_loop[block_idx] = Some(loop_idx);
                }
            }
        }

        self.loops.push(loop_info);
    }

    /// Returns all loops in the forest.
    #[must_use]
    pub fn loops(&self) -> &[LoopInfo] {
        &self.loops
    }

    /// Returns the number of loops.
    #[must_use]
    pub fn len(&self) -> usize {
        self.loops.len()
    }

    /// Returns true if there are no loops.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.loops.is_empty()
    }

    /// Iterates over the outermost loops in header order.
    pub fn top_level(&self) -> impl Iterator<Item = &LoopInfo> {
        self.loops.iter().filter(|l| l.parent.is_none())
    }

    /// Returns the immediate sub-loops of `loop_info`, in header order.
    #[must_use]
    pub fn children(&self, loop_info: &LoopInfo) -> Vec<&LoopInfo> {
        loop_info
            .children
            .iter()
            .filter_map(|&header| self.loop_for_header(header))
            .collect()
    }

    /// Returns the innermost loop containing the given block.
    #[must_use]
    pub fn innermost_loop(&self, block: NodeId) -> Option<&LoopInfo> {
        self.block_to_loop
            .get(block.index())
            .copied()
            .flatten()
            .and_then(|idx| self.loops.get(idx))
    }

    /// Returns the loop with the given header.
    #[must_use]
    pub fn loop_for_header(&self, header: NodeId) -> Option<&LoopInfo> {
        self.loops.iter().find(|l| l.header == header)
    }

    /// Returns the loop depth for a block (0 if not in any loop).
    #[must_use]
    pub fn loop_depth(&self, block: NodeId) -> usize {
        self.innermost_loop(block).map_or(0, |l| l.depth + 1)
    }

    /// Iterates over all loops in the forest.
    pub fn iter(&self) -> impl Iterator<Item = &LoopInfo> {
        self.loops.iter()
    }
}

/// Detects all natural loops in a graph using dominance-based back edge detection.
///
/// # Algorithm
///
/// 1. Finds back edges using dominance (n → h where h dominates n)
/// 2. For each back edge, computes the natural loop body; back edges sharing a
///    header form a single loop
/// 3. Computes preheaders, exits, and loop types
/// 4. Establishes nesting relationships
///
/// # Arguments
///
/// * `graph` - Any graph implementing `GraphBase + Successors + Predecessors`
/// * `dominators` - Pre-computed dominator tree for the graph
#[must_use]
pub fn detect_loops<G>(graph: &G, dominators: &DominatorTree) -> LoopForest
where
    G: GraphBase + Successors + Predecessors,
{
    let block_count = graph.node_count();
    let mut forest = LoopForest::new(block_count);

    let mut loops_by_header: HashMap<NodeId, LoopInfo> = HashMap::new();

    for node in graph.node_ids() {
        for succ in graph.successors(node) {
            if dominators.dominates(succ, node) {
                let header = succ;

                let loop_info = loops_by_header
                    .entry(header)
                    .or_insert_with(|| LoopInfo::new(header));

                if !loop_info.latches.contains(&node) {
                    loop_info.latches.push(node);
                }
                expand_loop_body(graph, loop_info, node);
            }
        }
    }

    for loop_info in loops_by_header.values_mut() {
        compute_preheader(graph, loop_info);
        compute_exits(graph, loop_info);
        loop_info.loop_type = classify_loop(loop_info);
    }

    // Sort by header first so children lists come out in header order
    let mut loops: Vec<LoopInfo> = loops_by_header.into_values().collect();
    loops.sort_by_key(|l| l.header.index());
    compute_nesting(&mut loops);

    for loop_info in loops {
        forest.add_loop(loop_info);
    }

    forest
}

/// Expands the loop body to include all nodes that can reach the latch.
fn expand_loop_body<G>(graph: &G, loop_info: &mut LoopInfo, latch: NodeId)
where
    G: Predecessors,
{
    if loop_info.body.contains(&latch) {
        return;
    }

    let mut worklist = vec![latch];

    while let Some(node) = worklist.pop() {
        if loop_info.body.insert(node) {
            for pred in graph.predecessors(node) {
                if pred != loop_info.header && !loop_info.body.contains(&pred) {
                    worklist.push(pred);
                }
            }
        }
    }
}

/// Identifies the preheader: the single predecessor of the header outside the loop.
fn compute_preheader<G>(graph: &G, loop_info: &mut LoopInfo)
where
    G: Predecessors,
{
    let non_loop_preds: Vec<NodeId> = graph
        .predecessors(loop_info.header)
        .filter(|pred| !loop_info.body.contains(pred))
        .collect();

    loop_info.preheader = match non_loop_preds.as_slice() {
        [only] => Some(*only),
        _ => None,
    };
}

/// Computes exit edges for a loop.
fn compute_exits<G>(graph: &G, loop_info: &mut LoopInfo)
where
    G: Successors,
{
    loop_info.exits.clear();

    for &body_block in &loop_info.body {
        for succ in graph.successors(body_block) {
            if !loop_info.body.contains(&succ) {
                loop_info.exits.push(LoopExit {
                    exiting_block: body_block,
                    exit_block: succ,
                });
            }
        }
    }
}

/// Classifies the loop type based on structure.
fn classify_loop(loop_info: &LoopInfo) -> LoopType {
    if loop_info.exits.is_empty() {
        return LoopType::Infinite;
    }

    if loop_info.latches.len() > 1 {
        return LoopType::Complex;
    }

    if let Some(latch) = loop_info.latch() {
        let latch_exits = loop_info
            .exits
            .iter()
            .filter(|e| e.exiting_block == latch)
            .count();

        if latch_exits == loop_info.exits.len() && latch != loop_info.header {
            return LoopType::PostTested;
        }
    }

    let header_exits = loop_info
        .exits
        .iter()
        .filter(|e| e.exiting_block == loop_info.header)
        .count();

    if header_exits == loop_info.exits.len() {
        return LoopType::PreTested;
    }

    LoopType::Complex
}

/// Computes loop nesting relationships and depths.
fn compute_nesting(loops: &mut [LoopInfo]) {
    let n = loops.len();

    let header_to_idx: HashMap<NodeId, usize> = loops
        .iter()
        .enumerate()
        .map(|(i, l)| (l.header, i))
        .collect();

    // Parent is the smallest other loop containing this loop's header
    for i in 0..n {
        let header = loops[i].header;
        let parent = (0..n)
            .filter(|&j| j != i && loops[j].body.contains(&header))
            .min_by_key(|&j| loops[j].size())
            .map(|j| loops[j].header);
        loops[i].parent = parent;
    }

    for i in 0..n {
        if let Some(parent_header) = loops[i].parent {
            if let Some(&parent_idx) = header_to_idx.get(&parent_header) {
                let child = loops[i].header;
                loops[parent_idx].children.push(child);
            }
        }
    }

    for i in 0..n {
        let mut depth = 0;
        let mut current = loops[i].parent;
        while let Some(parent_header) = current {
            depth += 1;
            match header_to_idx.get(&parent_header) {
                Some(&parent_idx) if depth <= n => current = loops[parent_idx].parent,
                _ => break,
            }
        }
        loops[i].depth = depth;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        analysis::ssa::SsaCfg,
        test::{fixture_empty_loop, fixture_matmul},
        utils::graph::algorithms::compute_dominators_rooted,
    };

    fn forest_of(func: &SsaFunction) -> LoopForest {
        let cfg = SsaCfg::from_ssa(func);
        let dominators = compute_dominators_rooted(&cfg);
        detect_loops(&cfg, &dominators)
    }

    #[test]
    fn test_loop_info_creation() {
        let header = NodeId::new(0);
        let loop_info = LoopInfo::new(header);

        assert_eq!(loop_info.header, header);
        assert!(loop_info.contains(header));
        assert_eq!(loop_info.size(), 1);
        assert!(loop_info.latch().is_none());
        assert!(!loop_info.is_canonical());
        assert!(loop_info.exit_block().is_none());
    }

    #[test]
    fn test_loop_forest_depths() {
        let mut forest = LoopForest::new(10);

        let mut outer_loop = LoopInfo::new(NodeId::new(1));
        outer_loop.body.insert(NodeId::new(2));
        outer_loop.body.insert(NodeId::new(3));

        let mut inner_loop = LoopInfo::new(NodeId::new(2));
        inner_loop.body.insert(NodeId::new(3));
        inner_loop.depth = 1;

        forest.add_loop(outer_loop);
        forest.add_loop(inner_loop);

        assert_eq!(forest.len(), 2);
        assert_eq!(forest.loop_depth(NodeId::new(3)), 2);
        assert_eq!(forest.loop_depth(NodeId::new(1)), 1);
        assert_eq!(forest.loop_depth(NodeId::new(0)), 0);
    }

    #[test]
    fn test_single_loop_structure() -> crate::Result<()> {
        let kernel = fixture_empty_loop()?;
        let forest = forest_of(&kernel.func);

        assert_eq!(forest.len(), 1);
        let lp = &forest.loops()[0];
        assert_eq!(lp.header, NodeId::new(kernel.header));
        assert_eq!(lp.latch(), Some(NodeId::new(kernel.latch)));
        assert_eq!(lp.preheader, Some(NodeId::new(kernel.entry)));
        assert_eq!(lp.exit_block(), Some(NodeId::new(kernel.exit)));
        assert_eq!(lp.loop_type, LoopType::PreTested);
        assert!(lp.is_canonical());
        assert!(lp.latch_cmp(&kernel.func).is_none());
        Ok(())
    }

    #[test]
    fn test_triple_nest() -> crate::Result<()> {
        let kernel = fixture_matmul()?;
        let forest = forest_of(&kernel.func);

        assert_eq!(forest.len(), 3);
        let top: Vec<_> = forest.top_level().collect();
        assert_eq!(top.len(), 1);

        let outer = top[0];
        let middle = forest.children(outer);
        assert_eq!(middle.len(), 1);
        assert_eq!(middle[0].depth, 1);
        let inner = forest.children(middle[0]);
        assert_eq!(inner.len(), 1);
        assert_eq!(inner[0].depth, 2);
        assert!(inner[0].is_innermost());

        assert!(outer.contains(inner[0].header));
        assert!(outer.latch_cmp(&kernel.func).is_some());
        Ok(())
    }

    #[test]
    fn test_induction_vars() -> crate::Result<()> {
        let kernel = fixture_matmul()?;
        let forest = forest_of(&kernel.func);

        for lp in forest.iter() {
            let ivs = lp.find_induction_vars(&kernel.func);
            assert_eq!(ivs.len(), 1);
            assert_eq!(ivs[0].update_kind, InductionUpdateKind::Add);
            assert_eq!(ivs[0].stride, Some(1));
            assert!(lp.contains_value(&kernel.func, ivs[0].phi_result));
            assert!(lp.is_loop_invariant(&kernel.func, ivs[0].stride_value.unwrap()));
        }
        Ok(())
    }
}
