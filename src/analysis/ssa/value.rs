//! Constant values and the closed value-kind view.
//!
//! [`ConstValue`] is the payload of constant entries in the value table. [`ValueKind`]
//! is the tagged view the loop analyses dispatch on: instead of probing a value with a
//! sequence of "is this a constant / a phi / a binary operator" tests, callers match once
//! on the variant returned by [`SsaFunction::value_kind`](crate::analysis::SsaFunction::value_kind).

use std::fmt;

use crate::analysis::ssa::{BinaryOp, CastKind, PhiNode, SsaType, SsaVarId};

/// Constant values that can appear in SSA form.
#[derive(Debug, Clone, PartialEq)]
pub enum ConstValue {
    /// 32-bit signed integer.
    I32(i32),
    /// 64-bit signed integer.
    I64(i64),
    /// 32-bit floating point.
    F32(f32),
    /// 64-bit floating point.
    F64(f64),
    /// Boolean true (`i1 1`).
    True,
    /// Boolean false (`i1 0`).
    False,
    /// Null pointer.
    Null,
}

impl ConstValue {
    /// Returns `true` if this is an integer constant.
    #[must_use]
    pub const fn is_integer(&self) -> bool {
        matches!(self, Self::I32(_) | Self::I64(_))
    }

    /// Returns `true` if this is a floating-point constant.
    #[must_use]
    pub const fn is_float(&self) -> bool {
        matches!(self, Self::F32(_) | Self::F64(_))
    }

    /// Returns the constant as an i64 if applicable.
    #[must_use]
    pub const fn as_i64(&self) -> Option<i64> {
        match self {
            Self::I64(v) => Some(*v),
            Self::I32(v) => Some(*v as i64),
            Self::True => Some(1),
            Self::False => Some(0),
            _ => None,
        }
    }

    /// Returns the type of the constant.
    #[must_use]
    pub fn ssa_type(&self) -> SsaType {
        match self {
            Self::I32(_) => SsaType::i32(),
            Self::I64(_) => SsaType::i64(),
            Self::F32(_) => SsaType::Float,
            Self::F64(_) => SsaType::Double,
            Self::True | Self::False => SsaType::bool(),
            Self::Null => SsaType::pointer(SsaType::Int(8)),
        }
    }
}

impl fmt::Display for ConstValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::I32(v) => write!(f, "i32 {v}"),
            Self::I64(v) => write!(f, "i64 {v}"),
            Self::F32(v) => write!(f, "float {v:?}"),
            Self::F64(v) => write!(f, "double {v:?}"),
            Self::True => write!(f, "i1 true"),
            Self::False => write!(f, "i1 false"),
            Self::Null => write!(f, "null"),
        }
    }
}

/// Closed classification of an SSA value.
///
/// # Examples
///
/// ```rust
/// use loopstat::analysis::{BinaryOp, FunctionBuilder, SsaType, ValueKind};
///
/// let mut b = FunctionBuilder::new("f");
/// let n = b.argument("n", SsaType::i32());
/// let one = b.const_i32(1);
/// let entry = b.block();
/// b.switch_to(entry);
/// let sum = b.binary("sum", BinaryOp::Add, n, one);
/// b.ret(Some(sum));
/// let func = b.finish()?;
///
/// assert!(matches!(func.value_kind(one), ValueKind::Constant(_)));
/// assert!(matches!(func.value_kind(sum), ValueKind::Binary { op: BinaryOp::Add, .. }));
/// assert!(matches!(func.value_kind(n), ValueKind::Other));
/// # Ok::<(), loopstat::Error>(())
/// ```
#[derive(Debug, Clone, Copy)]
pub enum ValueKind<'a> {
    /// A compile-time constant.
    Constant(&'a ConstValue),
    /// A cyclic value defined by a phi node.
    Cyclic(&'a PhiNode),
    /// The result of a binary arithmetic operator.
    Binary {
        /// The operator.
        op: BinaryOp,
        /// Left operand.
        left: SsaVarId,
        /// Right operand.
        right: SsaVarId,
    },
    /// The result of a cast or extension.
    Cast {
        /// The conversion performed.
        kind: CastKind,
        /// The converted value.
        operand: SsaVarId,
    },
    /// Anything else: arguments, globals, loads, calls, comparisons.
    Other,
}

impl ValueKind<'_> {
    /// Returns `true` for constants.
    #[must_use]
    pub const fn is_constant(&self) -> bool {
        matches!(self, Self::Constant(_))
    }

    /// Returns `true` for phi results.
    #[must_use]
    pub const fn is_cyclic(&self) -> bool {
        matches!(self, Self::Cyclic(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_const_accessors() {
        assert_eq!(ConstValue::I32(-3).as_i64(), Some(-3));
        assert_eq!(ConstValue::I64(9).as_i64(), Some(9));
        assert_eq!(ConstValue::True.as_i64(), Some(1));
        assert_eq!(ConstValue::F64(1.5).as_i64(), None);
        assert!(ConstValue::I64(0).is_integer());
        assert!(ConstValue::F32(0.0).is_float());
    }

    #[test]
    fn test_const_display() {
        assert_eq!(ConstValue::I32(100).to_string(), "i32 100");
        assert_eq!(ConstValue::F64(0.0).to_string(), "double 0.0");
        assert_eq!(ConstValue::False.to_string(), "i1 false");
    }
}
