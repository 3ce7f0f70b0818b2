//! Symbolic scalar-evolution expressions.
//!
//! [`ScevExpr`] describes how a value evolves while loops run. Leaves are integer
//! constants and opaque values; add-recurrences tie a start and a per-iteration step
//! to the loop header they belong to.

use std::{collections::BTreeSet, fmt};

use crate::{analysis::ssa::SsaVarId, utils::graph::NodeId};

/// A symbolic expression over constants, opaque values and loop recurrences.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScevExpr {
    /// A known integer constant.
    Constant(i64),

    /// A value the provider cannot see through.
    Unknown(SsaVarId),

    /// `{start, +, step}` evaluated at each iteration of the loop headed by `header`.
    AddRec {
        /// Value on loop entry.
        start: Box<ScevExpr>,
        /// Amount added per iteration.
        step: Box<ScevExpr>,
        /// Header of the loop driving the recurrence.
        header: NodeId,
    },

    /// Sum of the operands.
    Add(Vec<ScevExpr>),

    /// Product of the operands.
    Mul(Vec<ScevExpr>),
}

impl ScevExpr {
    /// Creates a constant expression.
    #[must_use]
    pub const fn constant(value: i64) -> Self {
        Self::Constant(value)
    }

    /// Creates an opaque value expression.
    #[must_use]
    pub const fn unknown(value: SsaVarId) -> Self {
        Self::Unknown(value)
    }

    /// Creates an add-recurrence for the loop headed by `header`.
    ///
    /// # Arguments
    ///
    /// * `start` - The value on loop entry.
    /// * `step` - The value added on every iteration.
    /// * `header` - The header block of the loop.
    #[must_use]
    pub fn add_rec(start: Self, step: Self, header: NodeId) -> Self {
        Self::AddRec {
            start: Box::new(start),
            step: Box::new(step),
            header,
        }
    }

    /// Creates `left + right`, folding constants and flattening nested sums.
    #[must_use]
    pub fn add(left: Self, right: Self) -> Self {
        let mut terms = Vec::new();
        let mut folded = 0i64;
        let mut saw_constant = false;

        for term in [left, right] {
            match term {
                Self::Add(inner) => {
                    for t in inner {
                        if let Self::Constant(c) = t {
                            folded = folded.wrapping_add(c);
                            saw_constant = true;
                        } else {
                            terms.push(t);
                        }
                    }
                }
                Self::Constant(c) => {
                    folded = folded.wrapping_add(c);
                    saw_constant = true;
                }
                other => terms.push(other),
            }
        }

        if saw_constant && (folded != 0 || terms.is_empty()) {
            terms.push(Self::Constant(folded));
        }

        match terms.len() {
            0 => Self::Constant(0),
            1 => terms.remove(0),
            _ => Self::Add(terms),
        }
    }

    /// Creates `left * right`, folding constants.
    #[must_use]
    pub fn mul(left: Self, right: Self) -> Self {
        match (left, right) {
            (Self::Constant(a), Self::Constant(b)) => Self::Constant(a.wrapping_mul(b)),
            (Self::Constant(0), _) | (_, Self::Constant(0)) => Self::Constant(0),
            (Self::Constant(1), other) | (other, Self::Constant(1)) => other,
            (Self::Mul(mut factors), other) | (other, Self::Mul(mut factors)) => {
                factors.push(other);
                Self::Mul(factors)
            }
            (left, right) => Self::Mul(vec![left, right]),
        }
    }

    /// Creates `-expr`.
    #[must_use]
    pub fn negate(expr: Self) -> Self {
        Self::mul(Self::Constant(-1), expr)
    }

    /// Returns the value if this is a constant.
    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Constant(c) => Some(*c),
            _ => None,
        }
    }

    /// Returns `true` if this is a constant.
    #[must_use]
    pub fn is_constant(&self) -> bool {
        matches!(self, Self::Constant(_))
    }

    /// Returns `true` if this is an add-recurrence.
    #[must_use]
    pub fn is_add_rec(&self) -> bool {
        matches!(self, Self::AddRec { .. })
    }

    /// Collects the opaque values referenced anywhere in the expression.
    #[must_use]
    pub fn unknowns(&self) -> BTreeSet<SsaVarId> {
        let mut out = BTreeSet::new();
        self.collect_unknowns(&mut out);
        out
    }

    fn collect_unknowns(&self, out: &mut BTreeSet<SsaVarId>) {
        match self {
            Self::Constant(_) => {}
            Self::Unknown(v) => {
                out.insert(*v);
            }
            Self::AddRec { start, step, .. } => {
                start.collect_unknowns(out);
                step.collect_unknowns(out);
            }
            Self::Add(parts) | Self::Mul(parts) => {
                for part in parts {
                    part.collect_unknowns(out);
                }
            }
        }
    }

    /// Collects the headers of every loop that drives a recurrence in the expression.
    #[must_use]
    pub fn recurrence_headers(&self) -> BTreeSet<NodeId> {
        let mut out = BTreeSet::new();
        self.collect_headers(&mut out);
        out
    }

    fn collect_headers(&self, out: &mut BTreeSet<NodeId>) {
        match self {
            Self::Constant(_) | Self::Unknown(_) => {}
            Self::AddRec {
                start,
                step,
                header,
            } => {
                out.insert(*header);
                start.collect_headers(out);
                step.collect_headers(out);
            }
            Self::Add(parts) | Self::Mul(parts) => {
                for part in parts {
                    part.collect_headers(out);
                }
            }
        }
    }
}

impl fmt::Display for ScevExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Constant(c) => write!(f, "{c}"),
            Self::Unknown(v) => write!(f, "%{v}"),
            Self::AddRec {
                start,
                step,
                header,
            } => write!(f, "{{{start},+,{step}}}<{header}>"),
            Self::Add(parts) | Self::Mul(parts) => {
                let sep = if matches!(self, Self::Add(_)) {
                    " + "
                } else {
                    " * "
                };
                write!(f, "(")?;
                for (i, part) in parts.iter().enumerate() {
                    if i > 0 {
                        write!(f, "{sep}")?;
                    }
                    write!(f, "{part}")?;
                }
                write!(f, ")")
            }
        }
    }
}

impl From<i64> for ScevExpr {
    fn from(value: i64) -> Self {
        Self::Constant(value)
    }
}
