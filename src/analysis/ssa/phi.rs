//! Phi node representation for SSA form.
//!
//! A phi node `v3 = phi(v1 from B1, v2 from B2)` selects `v1` if control arrived
//! from block B1 and `v2` if it arrived from B2. Phi nodes are evaluated at block
//! entry, before any real instruction executes.
//!
//! At a loop header, the phi operands split into the value arriving from outside the
//! loop (the entry value, usually through the preheader) and the value arriving along
//! the back edge from the latch. Induction variables are recognised from exactly this
//! shape.

use std::fmt;

use crate::analysis::ssa::SsaVarId;

/// An operand of a phi node: a value coming from a specific predecessor block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhiOperand {
    value: SsaVarId,
    predecessor: usize,
}

impl PhiOperand {
    /// Creates a new phi operand.
    ///
    /// # Arguments
    ///
    /// * `value` - The SSA value providing the value
    /// * `predecessor` - The block index from which this value comes
    #[must_use]
    pub const fn new(value: SsaVarId, predecessor: usize) -> Self {
        Self { value, predecessor }
    }

    /// Returns the SSA value.
    #[must_use]
    pub const fn value(&self) -> SsaVarId {
        self.value
    }

    /// Returns the predecessor block index.
    #[must_use]
    pub const fn predecessor(&self) -> usize {
        self.predecessor
    }
}

impl fmt::Display for PhiOperand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} from B{}", self.value, self.predecessor)
    }
}

/// A phi node that merges values at a control flow join point.
///
/// # Examples
///
/// ```rust
/// use loopstat::analysis::{PhiNode, PhiOperand, SsaVarId};
///
/// let mut phi = PhiNode::new(SsaVarId::new(3));
/// phi.add_operand(PhiOperand::new(SsaVarId::new(1), 0));
/// phi.add_operand(PhiOperand::new(SsaVarId::new(2), 2));
///
/// assert_eq!(phi.operand_count(), 2);
/// assert_eq!(phi.operand_from(2), Some(SsaVarId::new(2)));
/// assert_eq!(phi.to_string(), "v3 = phi(v1 from B0, v2 from B2)");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhiNode {
    result: SsaVarId,
    operands: Vec<PhiOperand>,
}

impl PhiNode {
    /// Creates a new phi node with no operands.
    #[must_use]
    pub const fn new(result: SsaVarId) -> Self {
        Self {
            result,
            operands: Vec::new(),
        }
    }

    /// Returns the value defined by this phi node.
    #[must_use]
    pub const fn result(&self) -> SsaVarId {
        self.result
    }

    /// Returns the operands.
    #[must_use]
    pub fn operands(&self) -> &[PhiOperand] {
        &self.operands
    }

    /// Returns the number of operands.
    #[must_use]
    pub fn operand_count(&self) -> usize {
        self.operands.len()
    }

    /// Adds an operand.
    pub fn add_operand(&mut self, operand: PhiOperand) {
        self.operands.push(operand);
    }

    /// Returns the value arriving from `predecessor`, if any.
    #[must_use]
    pub fn operand_from(&self, predecessor: usize) -> Option<SsaVarId> {
        self.operands
            .iter()
            .find(|op| op.predecessor == predecessor)
            .map(PhiOperand::value)
    }

    /// Iterates over the incoming values.
    pub fn used_variables(&self) -> impl Iterator<Item = SsaVarId> + '_ {
        self.operands.iter().map(PhiOperand::value)
    }
}

impl fmt::Display for PhiNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} = phi(", self.result)?;
        for (i, op) in self.operands.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{op}")?;
        }
        write!(f, ")")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operand_lookup() {
        let mut phi = PhiNode::new(SsaVarId::new(10));
        phi.add_operand(PhiOperand::new(SsaVarId::new(1), 0));
        phi.add_operand(PhiOperand::new(SsaVarId::new(5), 3));

        assert_eq!(phi.result(), SsaVarId::new(10));
        assert_eq!(phi.operand_from(0), Some(SsaVarId::new(1)));
        assert_eq!(phi.operand_from(3), Some(SsaVarId::new(5)));
        assert_eq!(phi.operand_from(7), None);
        assert_eq!(
            phi.used_variables().collect::<Vec<_>>(),
            vec![SsaVarId::new(1), SsaVarId::new(5)]
        );
    }

    #[test]
    fn test_empty_phi_display() {
        let phi = PhiNode::new(SsaVarId::new(0));
        assert_eq!(phi.to_string(), "v0 = phi()");
    }
}
