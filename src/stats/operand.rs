//! Leaf classification of arithmetic expression trees.

use std::collections::HashSet;

use log::warn;
use serde::Serialize;

use crate::analysis::{SsaFunction, SsaVarId, ValueKind};

/// Leaf counts of one arithmetic expression tree.
///
/// The tree is every value reachable from a binary operator through further binary
/// operators. Its leaves are counted as induction variables (cyclic values), constants,
/// or parametric values (everything else).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct OperandStats {
    /// Leaves that are cyclic values.
    pub induction: usize,
    /// Leaves that are compile-time constants.
    pub constant: usize,
    /// Leaves that are neither.
    pub parametric: usize,
}

impl OperandStats {
    /// Classifies the leaves below `expr`.
    ///
    /// Returns all-zero counts when `expr` is not a binary operator.
    #[must_use]
    pub fn classify(func: &SsaFunction, expr: SsaVarId) -> Self {
        let mut stats = Self::default();
        if matches!(func.value_kind(expr), ValueKind::Binary { .. }) {
            let mut path = HashSet::new();
            path.insert(expr);
            stats.visit(func, expr, &mut path);
        }
        stats
    }

    /// Returns `true` if more than one induction variable occurs in the tree.
    #[must_use]
    pub fn is_skewed(&self) -> bool {
        self.induction > 1
    }

    /// Returns the number of leaves seen.
    #[must_use]
    pub fn leaves(&self) -> usize {
        self.induction + self.constant + self.parametric
    }

    // `path` holds the operators on the current descent, so shared subtrees are
    // counted once per occurrence while a cyclic operand graph is cut.
    fn visit(&mut self, func: &SsaFunction, node: SsaVarId, path: &mut HashSet<SsaVarId>) {
        let ValueKind::Binary { left, right, .. } = func.value_kind(node) else {
            return;
        };

        for operand in [left, right] {
            match func.value_kind(operand) {
                ValueKind::Binary { .. } => {
                    if path.insert(operand) {
                        self.visit(func, operand, path);
                        path.remove(&operand);
                    } else {
                        warn!(
                            "{}: operand {} of {} closes a cycle, skipping",
                            func.name(),
                            func.value_label(operand),
                            func.value_label(node)
                        );
                    }
                }
                ValueKind::Constant(_) => self.constant += 1,
                ValueKind::Cyclic(_) => self.induction += 1,
                ValueKind::Cast { .. } | ValueKind::Other => self.parametric += 1,
            }
        }
    }
}
