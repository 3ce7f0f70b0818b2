//! SSA operations.
//!
//! `SsaOp` is a small, load/store-style instruction set with explicit operands: just
//! enough to express array kernels (element addresses, loads, stores), loop control
//! (comparisons, branches) and the arithmetic that feeds index expressions.
//!
//! # Field Documentation
//!
//! The struct fields in this module follow a consistent naming convention:
//! - `dest`: The destination SSA value for the operation result
//! - `left`, `right`: Binary operands (left and right hand side)
//! - `operand`: Unary operand
//! - `base`, `indices`: Element-address base pointer and index list
//! - `addr`: Address for memory operations
//! - `target`, `true_target`, `false_target`: Branch targets (block indices)

#![allow(missing_docs)]

use std::fmt;

use bitflags::bitflags;
use strum::{Display, IntoStaticStr};

use super::SsaVarId;

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    /// Observable effects of executing an operation.
    pub struct OpEffects: u8 {
        /// Reads memory
        const READS_MEMORY = 0x01;
        /// Writes memory
        const WRITES_MEMORY = 0x02;
        /// Any other observable effect (calls)
        const SIDE_EFFECTS = 0x04;
    }
}

/// Binary arithmetic and bitwise operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, IntoStaticStr)]
#[strum(serialize_all = "lowercase")]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    SDiv,
    UDiv,
    SRem,
    URem,
    Shl,
    LShr,
    AShr,
    And,
    Or,
    Xor,
    FAdd,
    FSub,
    FMul,
    FDiv,
}

impl BinaryOp {
    /// Returns `true` for operators where `a op b == b op a`.
    #[must_use]
    pub const fn is_commutative(self) -> bool {
        matches!(
            self,
            Self::Add | Self::Mul | Self::And | Self::Or | Self::Xor | Self::FAdd | Self::FMul
        )
    }

    /// Returns the lower-case mnemonic (`add`, `sdiv`, `fmul`).
    #[must_use]
    pub fn mnemonic(self) -> &'static str {
        self.into()
    }
}

/// Value conversions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, IntoStaticStr)]
#[strum(serialize_all = "lowercase")]
pub enum CastKind {
    Trunc,
    ZExt,
    SExt,
    FpToSi,
    SiToFp,
    BitCast,
}

/// Integer comparison predicates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, IntoStaticStr)]
#[strum(serialize_all = "lowercase")]
pub enum CmpPredicate {
    Eq,
    Ne,
    Slt,
    Sle,
    Sgt,
    Sge,
    Ult,
    Ule,
    Ugt,
    Uge,
}

/// A single SSA operation.
///
/// # Conventions
///
/// - Operations that produce a result carry their destination in `dest`
/// - The last operation of every block is a terminator (`Jump`, `Branch`, `Return`)
#[derive(Debug, Clone, PartialEq)]
pub enum SsaOp {
    /// `dest = op left, right`
    Binary {
        dest: SsaVarId,
        op: BinaryOp,
        left: SsaVarId,
        right: SsaVarId,
    },

    /// `dest = kind operand`
    Cast {
        dest: SsaVarId,
        kind: CastKind,
        operand: SsaVarId,
    },

    /// `dest = icmp predicate left, right`
    Cmp {
        dest: SsaVarId,
        predicate: CmpPredicate,
        left: SsaVarId,
        right: SsaVarId,
    },

    /// Element address: `dest = &base[indices[0]][indices[1]]...`
    ///
    /// The first index steps over the base pointer itself, the remaining indices
    /// step into nested array levels.
    ElementAddr {
        dest: SsaVarId,
        base: SsaVarId,
        indices: Vec<SsaVarId>,
    },

    /// `dest = *addr`
    Load { dest: SsaVarId, addr: SsaVarId },

    /// `*addr = value`
    Store { value: SsaVarId, addr: SsaVarId },

    /// `dest = callee(args)`
    Call {
        dest: Option<SsaVarId>,
        callee: String,
        args: Vec<SsaVarId>,
    },

    /// Unconditional jump.
    Jump { target: usize },

    /// Conditional branch on an `i1` value.
    Branch {
        condition: SsaVarId,
        true_target: usize,
        false_target: usize,
    },

    /// Function return.
    Return { value: Option<SsaVarId> },
}

impl SsaOp {
    /// Returns the destination value if this operation produces one.
    #[must_use]
    pub fn dest(&self) -> Option<SsaVarId> {
        match self {
            Self::Binary { dest, .. }
            | Self::Cast { dest, .. }
            | Self::Cmp { dest, .. }
            | Self::ElementAddr { dest, .. }
            | Self::Load { dest, .. } => Some(*dest),
            Self::Call { dest, .. } => *dest,
            Self::Store { .. } | Self::Jump { .. } | Self::Branch { .. } | Self::Return { .. } => {
                None
            }
        }
    }

    /// Returns all values used by this operation, in operand order.
    #[must_use]
    pub fn uses(&self) -> Vec<SsaVarId> {
        match self {
            Self::Binary { left, right, .. } | Self::Cmp { left, right, .. } => {
                vec![*left, *right]
            }
            Self::Cast { operand, .. } => vec![*operand],
            Self::ElementAddr { base, indices, .. } => {
                let mut uses = Vec::with_capacity(indices.len() + 1);
                uses.push(*base);
                uses.extend_from_slice(indices);
                uses
            }
            Self::Load { addr, .. } => vec![*addr],
            Self::Store { value, addr } => vec![*value, *addr],
            Self::Call { args, .. } => args.clone(),
            Self::Branch { condition, .. } => vec![*condition],
            Self::Return { value } => value.iter().copied().collect(),
            Self::Jump { .. } => vec![],
        }
    }

    /// Returns the successor blocks of a terminator (empty for other operations).
    #[must_use]
    pub fn successors(&self) -> Vec<usize> {
        match self {
            Self::Jump { target } => vec![*target],
            Self::Branch {
                true_target,
                false_target,
                ..
            } => {
                if true_target == false_target {
                    vec![*true_target]
                } else {
                    vec![*true_target, *false_target]
                }
            }
            _ => vec![],
        }
    }

    /// Returns `true` if this operation is a terminator (ends a basic block).
    #[must_use]
    pub const fn is_terminator(&self) -> bool {
        matches!(
            self,
            Self::Jump { .. } | Self::Branch { .. } | Self::Return { .. }
        )
    }

    /// Returns the observable effects of this operation.
    #[must_use]
    pub const fn effects(&self) -> OpEffects {
        match self {
            Self::Load { .. } => OpEffects::READS_MEMORY,
            Self::Store { .. } => OpEffects::WRITES_MEMORY,
            Self::Call { .. } => OpEffects::READS_MEMORY
                .union(OpEffects::WRITES_MEMORY)
                .union(OpEffects::SIDE_EFFECTS),
            _ => OpEffects::empty(),
        }
    }

    /// Returns `true` if this operation touches memory or has other side effects.
    #[must_use]
    pub const fn has_effects(&self) -> bool {
        !self.effects().is_empty()
    }

    /// Returns the operation's mnemonic (`add`, `sext`, `icmp`, `getelementptr`).
    #[must_use]
    pub fn mnemonic(&self) -> &'static str {
        match self {
            Self::Binary { op, .. } => op.mnemonic(),
            Self::Cast { kind, .. } => kind.into(),
            Self::Cmp { .. } => "icmp",
            Self::ElementAddr { .. } => "getelementptr",
            Self::Load { .. } => "load",
            Self::Store { .. } => "store",
            Self::Call { .. } => "call",
            Self::Jump { .. } | Self::Branch { .. } => "br",
            Self::Return { .. } => "ret",
        }
    }
}

impl SsaOp {
    /// Formats the operation, rendering each operand through `name`.
    pub(crate) fn fmt_with(
        &self,
        f: &mut fmt::Formatter<'_>,
        name: &dyn Fn(SsaVarId) -> String,
    ) -> fmt::Result {
        match self {
            Self::Binary {
                dest,
                op,
                left,
                right,
            } => write!(f, "{} = {op} {}, {}", name(*dest), name(*left), name(*right)),
            Self::Cast {
                dest,
                kind,
                operand,
            } => write!(f, "{} = {kind} {}", name(*dest), name(*operand)),
            Self::Cmp {
                dest,
                predicate,
                left,
                right,
            } => write!(
                f,
                "{} = icmp {predicate} {}, {}",
                name(*dest),
                name(*left),
                name(*right)
            ),
            Self::ElementAddr {
                dest,
                base,
                indices,
            } => {
                write!(f, "{} = getelementptr {}", name(*dest), name(*base))?;
                for index in indices {
                    write!(f, ", {}", name(*index))?;
                }
                Ok(())
            }
            Self::Load { dest, addr } => write!(f, "{} = load {}", name(*dest), name(*addr)),
            Self::Store { value, addr } => write!(f, "store {}, {}", name(*value), name(*addr)),
            Self::Call { dest, callee, args } => {
                if let Some(dest) = dest {
                    write!(f, "{} = ", name(*dest))?;
                }
                write!(f, "call {callee}(")?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", name(*arg))?;
                }
                write!(f, ")")
            }
            Self::Jump { target } => write!(f, "br B{target}"),
            Self::Branch {
                condition,
                true_target,
                false_target,
            } => write!(f, "br {}, B{true_target}, B{false_target}", name(*condition)),
            Self::Return { value: Some(value) } => write!(f, "ret {}", name(*value)),
            Self::Return { value: None } => write!(f, "ret void"),
        }
    }
}

impl fmt::Display for SsaOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.fmt_with(f, &|var| var.to_string())
    }
}
