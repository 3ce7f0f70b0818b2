//! SSA basic blocks containing phi nodes and instructions.
//!
//! # Block Structure
//!
//! ```text
//! Block B1:
//!   // Phi nodes (executed "simultaneously" at block entry)
//!   v3 = phi(v1 from B0, v7 from B2)
//!
//!   // Instructions (executed sequentially, terminator last)
//!   v4 = icmp slt v3, v2
//!   br v4, B2, B3
//! ```

use std::fmt;

use crate::analysis::ssa::{PhiNode, SsaOp, SsaVarId};

/// An SSA basic block with phi nodes and instructions.
#[derive(Debug, Clone)]
pub struct SsaBlock {
    id: usize,
    phi_nodes: Vec<PhiNode>,
    instructions: Vec<SsaOp>,
}

impl SsaBlock {
    /// Creates a new empty block.
    #[must_use]
    pub fn new(id: usize) -> Self {
        Self {
            id,
            phi_nodes: Vec::new(),
            instructions: Vec::new(),
        }
    }

    /// Returns the block index.
    #[must_use]
    pub const fn id(&self) -> usize {
        self.id
    }

    /// Returns the phi nodes.
    #[must_use]
    pub fn phi_nodes(&self) -> &[PhiNode] {
        &self.phi_nodes
    }

    /// Returns the instructions, terminator last.
    #[must_use]
    pub fn instructions(&self) -> &[SsaOp] {
        &self.instructions
    }

    /// Returns the number of instructions (phi nodes excluded).
    #[must_use]
    pub fn instruction_count(&self) -> usize {
        self.instructions.len()
    }

    /// Returns `true` if the block holds nothing but its terminator.
    #[must_use]
    pub fn is_trivial(&self) -> bool {
        self.phi_nodes.is_empty() && self.instructions.len() == 1 && self.terminator().is_some()
    }

    pub(crate) fn add_phi(&mut self, phi: PhiNode) -> usize {
        self.phi_nodes.push(phi);
        self.phi_nodes.len() - 1
    }

    pub(crate) fn phi_mut(&mut self, index: usize) -> Option<&mut PhiNode> {
        self.phi_nodes.get_mut(index)
    }

    pub(crate) fn add_instruction(&mut self, op: SsaOp) -> usize {
        self.instructions.push(op);
        self.instructions.len() - 1
    }

    /// Returns the phi node at `index`.
    #[must_use]
    pub fn phi(&self, index: usize) -> Option<&PhiNode> {
        self.phi_nodes.get(index)
    }

    /// Returns the instruction at `index`.
    #[must_use]
    pub fn instruction(&self, index: usize) -> Option<&SsaOp> {
        self.instructions.get(index)
    }

    /// Returns the terminator, if the block ends in one.
    #[must_use]
    pub fn terminator(&self) -> Option<&SsaOp> {
        self.instructions.last().filter(|op| op.is_terminator())
    }

    /// Returns the successor blocks named by the terminator.
    #[must_use]
    pub fn successors(&self) -> Vec<usize> {
        self.terminator().map(SsaOp::successors).unwrap_or_default()
    }

    /// Returns the single successor, if the terminator has exactly one.
    #[must_use]
    pub fn unique_successor(&self) -> Option<usize> {
        match self.successors().as_slice() {
            [only] => Some(*only),
            _ => None,
        }
    }

    /// Returns `true` if no instruction touches memory or has side effects.
    #[must_use]
    pub fn is_effect_free(&self) -> bool {
        self.instructions.iter().all(|op| !op.has_effects())
    }

    /// Finds the phi node defining `var`.
    #[must_use]
    pub fn find_phi_defining(&self, var: SsaVarId) -> Option<&PhiNode> {
        self.phi_nodes.iter().find(|phi| phi.result() == var)
    }
}

impl fmt::Display for SsaBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "B{}:", self.id)?;
        for phi in &self.phi_nodes {
            writeln!(f, "  {phi}")?;
        }
        for instr in &self.instructions {
            writeln!(f, "  {instr}")?;
        }
        Ok(())
    }
}
