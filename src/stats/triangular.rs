//! Triangular loop nest detection.
//!
//! A nest is triangular when the inner loop's iteration space depends on the outer
//! loop's progress: the inner counter starts from, or is compared against, a value
//! the outer loop changes. The detector is conservative. Shapes it cannot analyze are
//! reported as triangular rather than rectangular.

use std::collections::HashSet;

use log::debug;
use serde::Serialize;
use strum::Display;

use crate::analysis::{
    LoopInfo, ScalarEvolution, SsaFunction, SsaOp, SsaVarId, ValueKind, VariableOrigin,
};

/// Verdict on the iteration space of an outer/inner loop pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize)]
pub enum NestShape {
    /// The inner bounds depend on the outer loop.
    Triangular,
    /// The inner bounds are invariant in the outer loop.
    Rectangular,
    /// The inner loop has no induction variable or no single latch.
    Unknown,
}

/// Returns the induction variable of `inner`.
///
/// Asks the scalar-evolution provider first and falls back to the first phi at the
/// inner header.
pub fn nest_induction_variable<S>(func: &SsaFunction, se: &S, inner: &LoopInfo) -> Option<SsaVarId>
where
    S: ScalarEvolution + ?Sized,
{
    se.induction_variable(inner).or_else(|| {
        let fallback = inner.header_phis(func).first().map(|phi| phi.result());
        if let Some(phi) = fallback {
            debug!(
                "{}: using first header phi {} of loop at {}",
                func.name(),
                func.value_label(phi),
                inner.header
            );
        }
        fallback
    })
}

/// Decides whether `inner`, nested in `outer` and counted by `iv`, is triangular.
pub fn classify_nest<S>(
    func: &SsaFunction,
    se: &S,
    outer: &LoopInfo,
    inner: &LoopInfo,
    iv: SsaVarId,
) -> NestShape
where
    S: ScalarEvolution + ?Sized,
{
    let Some(phi) = func.phi_node(iv) else {
        return NestShape::Unknown;
    };

    let preheader = inner.preheader.map(|node| node.index());
    for operand in phi.operands() {
        let value = operand.value();
        if func.is_constant(value) {
            continue;
        }
        if Some(operand.predecessor()) == preheader && !outer.is_loop_invariant(func, value) {
            debug!(
                "{}: inner start {} varies in the outer loop",
                func.name(),
                func.value_label(value)
            );
            return NestShape::Triangular;
        }
    }

    let Some(latch) = inner.latch().and_then(|node| func.block(node.index())) else {
        return NestShape::Unknown;
    };

    let condition = match latch.terminator() {
        Some(SsaOp::Branch { condition, .. }) => *condition,
        Some(SsaOp::Jump { .. }) => return NestShape::Triangular,
        _ => return NestShape::Unknown,
    };

    let Some(SsaOp::Cmp { left, right, .. }) = func.definition(condition) else {
        return NestShape::Triangular;
    };
    let (left, right) = (*left, *right);

    // Literals and globals never count as the counter side
    let reaches_iv = |value: SsaVarId| {
        !func.is_constant(value)
            && !is_global(func, value)
            && is_path_to_iv(func, value, iv, &mut HashSet::new())
    };
    let limit = if reaches_iv(left) {
        right
    } else if reaches_iv(right) {
        left
    } else {
        return NestShape::Triangular;
    };

    let limit_expr = se.scev(limit);
    if se.is_loop_invariant(&limit_expr, outer) {
        NestShape::Rectangular
    } else {
        debug!(
            "{}: inner limit {limit_expr} varies in the outer loop",
            func.name()
        );
        NestShape::Triangular
    }
}

/// Returns `true` if `value` is computed from `iv`, constants and globals only, through
/// casts and binary operators whose operands both qualify.
fn is_path_to_iv(
    func: &SsaFunction,
    value: SsaVarId,
    iv: SsaVarId,
    path: &mut HashSet<SsaVarId>,
) -> bool {
    if value == iv {
        return true;
    }
    if !path.insert(value) {
        return false;
    }

    let reaches = match func.value_kind(value) {
        ValueKind::Constant(_) => true,
        ValueKind::Cast { operand, .. } => is_path_to_iv(func, operand, iv, path),
        ValueKind::Binary { left, right, .. } => {
            is_path_to_iv(func, left, iv, path) && is_path_to_iv(func, right, iv, path)
        }
        ValueKind::Cyclic(_) => false,
        ValueKind::Other => is_global(func, value),
    };

    path.remove(&value);
    reaches
}

fn is_global(func: &SsaFunction, value: SsaVarId) -> bool {
    func.variable(value)
        .is_some_and(|var| matches!(var.origin(), VariableOrigin::Global))
}
