//! Array index pattern classification.
//!
//! An element address is classified by its last index:
//!
//! | Index shape                        | Credited as                          |
//! |------------------------------------|--------------------------------------|
//! | `i` or `sext i`                    | linear                               |
//! | `sext (i + 1)`                     | constant shift                       |
//! | `sext (i + m)`                     | parametric shift                     |
//! | `sext (i + j)`                     | skewed                               |
//! | anything else                      | nothing                              |
//!
//! Shift categories are not exclusive: `sext (i + j + 1)` is both skewed and a constant
//! shift. Each credit is weighted by the number of uses of the address.

use std::fmt;

use log::debug;
use serde::Serialize;

use crate::{
    analysis::{SsaFunction, SsaVarId, ValueKind},
    stats::OperandStats,
};

/// Shape of one index expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum IndexShape {
    /// The index is a cyclic value, possibly behind a cast.
    Linear,
    /// The index is a cast of an arithmetic expression with these leaves.
    Shifted(OperandStats),
    /// Neither of the above.
    Opaque,
}

impl IndexShape {
    /// Determines the shape of `index`.
    #[must_use]
    pub fn of(func: &SsaFunction, index: SsaVarId) -> Self {
        match func.value_kind(index) {
            ValueKind::Cyclic(_) => Self::Linear,
            ValueKind::Cast { operand, .. } => match func.value_kind(operand) {
                ValueKind::Cyclic(_) => Self::Linear,
                ValueKind::Binary { .. } => Self::Shifted(OperandStats::classify(func, operand)),
                _ => Self::Opaque,
            },
            _ => Self::Opaque,
        }
    }
}

impl fmt::Display for IndexShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Linear => write!(f, "linear"),
            Self::Shifted(stats) => write!(
                f,
                "shifted (iv: {}, const: {}, param: {})",
                stats.induction, stats.constant, stats.parametric
            ),
            Self::Opaque => write!(f, "unclassified"),
        }
    }
}

/// Index expression tallies of one loop nest.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct IndexPatternCounts {
    /// Accesses indexed directly by an induction variable.
    pub linear: usize,
    /// Accesses whose index has a constant leaf.
    pub constant_shift: usize,
    /// Accesses whose index has a parametric leaf.
    pub parametric_shift: usize,
    /// Accesses whose index combines more than one induction variable.
    pub skewed: usize,
}

impl IndexPatternCounts {
    /// Credits the categories `shape` falls into, `uses` times each.
    pub fn credit(&mut self, shape: &IndexShape, uses: usize) {
        match shape {
            IndexShape::Linear => self.linear += uses,
            IndexShape::Shifted(stats) => {
                if stats.is_skewed() {
                    self.skewed += uses;
                }
                if stats.constant > 0 {
                    self.constant_shift += uses;
                }
                if stats.parametric > 0 {
                    self.parametric_shift += uses;
                }
            }
            IndexShape::Opaque => {}
        }
    }

    /// Classifies `index` and credits it `uses` times.
    pub fn record(&mut self, func: &SsaFunction, index: SsaVarId, uses: usize) -> IndexShape {
        let shape = IndexShape::of(func, index);
        debug!(
            "{}: index {} is {shape}, weight {uses}",
            func.name(),
            func.value_label(index)
        );
        self.credit(&shape, uses);
        shape
    }

    /// Returns `true` if nothing was credited.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

impl fmt::Display for IndexPatternCounts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Linear Expressions: {}", self.linear)?;
        writeln!(f, "Constant Shift Expressions: {}", self.constant_shift)?;
        writeln!(f, "Parametric Shift Expressions: {}", self.parametric_shift)?;
        writeln!(f, "Skewed Shift Expressions: {}", self.skewed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        analysis::SsaOp,
        test::{fixture_stencil, fixture_two_level, NestVariant},
    };

    /// Returns the last index of every element address in the function, in block order.
    fn last_indices(func: &SsaFunction) -> Vec<SsaVarId> {
        func.blocks()
            .iter()
            .flat_map(|block| block.instructions())
            .filter_map(|op| match op {
                SsaOp::ElementAddr { indices, .. } => indices.last().copied(),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_stencil_shapes() -> crate::Result<()> {
        let kernel = fixture_stencil()?;
        let indices = last_indices(&kernel.func);
        assert_eq!(indices.len(), 3);

        let mut counts = IndexPatternCounts::default();
        let shapes: Vec<_> = indices
            .iter()
            .map(|&index| counts.record(&kernel.func, index, 1))
            .collect();

        assert_eq!(shapes[0], IndexShape::Linear);
        assert!(matches!(shapes[1], IndexShape::Shifted(s) if s.constant == 1));
        assert!(matches!(shapes[2], IndexShape::Shifted(s) if s.parametric == 1));
        assert_eq!(
            counts,
            IndexPatternCounts {
                linear: 1,
                constant_shift: 1,
                parametric_shift: 1,
                skewed: 0
            }
        );
        Ok(())
    }

    #[test]
    fn test_linear_credits_only_linear() -> crate::Result<()> {
        let kernel = fixture_two_level(NestVariant::Rectangular)?;
        let mut counts = IndexPatternCounts::default();
        counts.record(&kernel.func, kernel.value("j"), 2);
        assert_eq!(
            counts,
            IndexPatternCounts {
                linear: 2,
                ..Default::default()
            }
        );
        Ok(())
    }

    #[test]
    fn test_skewed() -> crate::Result<()> {
        let kernel = fixture_two_level(NestVariant::Skewed)?;
        let index = last_indices(&kernel.func)
            .pop()
            .ok_or(crate::Error::Error("no element address".into()))?;

        let mut counts = IndexPatternCounts::default();
        counts.record(&kernel.func, index, 1);
        assert_eq!(counts.skewed, 1);
        assert_eq!(counts.constant_shift, 0);
        assert_eq!(counts.linear, 0);
        Ok(())
    }

    #[test]
    fn test_bare_operator_is_opaque() -> crate::Result<()> {
        let kernel = fixture_stencil()?;
        let shape = IndexShape::of(&kernel.func, kernel.value("inc"));
        assert_eq!(shape, IndexShape::Opaque);

        let mut counts = IndexPatternCounts::default();
        counts.credit(&shape, 3);
        assert!(counts.is_empty());
        Ok(())
    }
}
