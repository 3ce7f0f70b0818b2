//! Scalar evolution for loops with affine counters.

use std::collections::HashSet;

use crate::{
    analysis::{
        cfg::{InductionUpdateKind, InductionVar, LoopForest, LoopInfo},
        scev::{Direction, LoopBounds, ScalarEvolution, ScevExpr},
        ssa::{BinaryOp, SsaFunction, SsaOp, SsaVarId, ValueKind},
    },
    utils::graph::NodeId,
};

/// Scalar-evolution provider for counters updated by a loop-invariant add or subtract.
///
/// A header phi is a recurrence when it has exactly two operands, one entering from
/// outside the loop and one from the single latch, and the latch operand is
/// `phi + step` or `phi - step` with `step` invariant in the loop. A recurrence is the
/// loop's induction variable when the latch comparison reads either the phi or its
/// update.
#[derive(Debug, Clone, Copy)]
pub struct AffineEvolution<'f> {
    func: &'f SsaFunction,
    forest: &'f LoopForest,
}

/// An induction variable whose latch comparison has been located.
struct Counter {
    iv: InductionVar,
    final_value: SsaVarId,
}

impl<'f> AffineEvolution<'f> {
    /// Creates a provider over `func` and its loop forest.
    #[must_use]
    pub fn new(func: &'f SsaFunction, forest: &'f LoopForest) -> Self {
        Self { func, forest }
    }

    /// Returns the function this provider reads.
    #[must_use]
    pub fn function(&self) -> &'f SsaFunction {
        self.func
    }

    /// Returns the add/sub recurrence defined by `phi` at the header of `lp`.
    fn recurrence(&self, lp: &LoopInfo, phi: SsaVarId) -> Option<InductionVar> {
        let latch = lp.latch()?;
        if self.func.phi_node(phi)?.operand_count() != 2 {
            return None;
        }

        lp.find_induction_vars(self.func)
            .into_iter()
            .find(|iv| iv.phi_result == phi)
            .filter(|iv| {
                iv.update_block == latch
                    && matches!(
                        iv.update_kind,
                        InductionUpdateKind::Add | InductionUpdateKind::Sub
                    )
                    && iv
                        .stride_value
                        .is_some_and(|step| lp.is_loop_invariant(self.func, step))
            })
    }

    /// Finds the recurrence the latch comparison tests, and the value it is tested against.
    fn counter(&self, lp: &LoopInfo) -> Option<Counter> {
        let cmp = lp.latch_cmp(self.func)?;
        let Some(SsaOp::Cmp { left, right, .. }) = self.func.definition(cmp) else {
            return None;
        };
        let (left, right) = (*left, *right);

        lp.header_phis(self.func).iter().find_map(|phi| {
            let iv = self.recurrence(lp, phi.result())?;
            let tested = |v: SsaVarId| v == iv.phi_result || v == iv.update_value;
            let final_value = if tested(left) {
                right
            } else if tested(right) {
                left
            } else {
                return None;
            };
            Some(Counter { iv, final_value })
        })
    }

    fn direction(iv: &InductionVar) -> Direction {
        let Some(stride) = iv.stride else {
            return Direction::Unknown;
        };
        let signed = match iv.update_kind {
            InductionUpdateKind::Add => stride,
            InductionUpdateKind::Sub => stride.saturating_neg(),
            InductionUpdateKind::Mul | InductionUpdateKind::Unknown => 0,
        };
        match signed {
            s if s > 0 => Direction::Increasing,
            s if s < 0 => Direction::Decreasing,
            _ => Direction::Unknown,
        }
    }

    fn translate(&self, value: SsaVarId, visiting: &mut HashSet<SsaVarId>) -> ScevExpr {
        if !visiting.insert(value) {
            return ScevExpr::unknown(value);
        }

        let expr = match self.func.value_kind(value) {
            ValueKind::Constant(c) => c.as_i64().map_or(ScevExpr::unknown(value), ScevExpr::constant),
            ValueKind::Cyclic(phi) => self.translate_phi(phi.result(), visiting),
            ValueKind::Binary { op, left, right } => {
                let l = self.translate(left, visiting);
                let r = self.translate(right, visiting);
                match op {
                    BinaryOp::Add => ScevExpr::add(l, r),
                    BinaryOp::Sub => ScevExpr::add(l, ScevExpr::negate(r)),
                    BinaryOp::Mul => ScevExpr::mul(l, r),
                    _ => ScevExpr::unknown(value),
                }
            }
            ValueKind::Cast { operand, .. } => self.translate(operand, visiting),
            ValueKind::Other => ScevExpr::unknown(value),
        };

        visiting.remove(&value);
        expr
    }

    fn translate_phi(&self, phi: SsaVarId, visiting: &mut HashSet<SsaVarId>) -> ScevExpr {
        let recurrence = self
            .func
            .def_block(phi)
            .and_then(|block| self.forest.loop_for_header(NodeId::new(block)))
            .and_then(|lp| self.recurrence(lp, phi).map(|iv| (lp.header, iv)));

        let Some((header, iv)) = recurrence else {
            return ScevExpr::unknown(phi);
        };
        let Some(stride_value) = iv.stride_value else {
            return ScevExpr::unknown(phi);
        };

        let start = self.translate(iv.init_value, visiting);
        let step = self.translate(stride_value, visiting);
        let step = match iv.update_kind {
            InductionUpdateKind::Sub => ScevExpr::negate(step),
            _ => step,
        };
        ScevExpr::add_rec(start, step, header)
    }
}

impl ScalarEvolution for AffineEvolution<'_> {
    fn induction_variable(&self, lp: &LoopInfo) -> Option<SsaVarId> {
        self.counter(lp).map(|counter| counter.iv.phi_result)
    }

    fn bounds(&self, lp: &LoopInfo) -> Option<LoopBounds> {
        let preheader = lp.preheader?;
        let counter = self.counter(lp)?;
        let phi = self.func.phi_node(counter.iv.phi_result)?;
        let initial = phi.operand_from(preheader.index())?;

        Some(LoopBounds {
            initial,
            step_value: counter.iv.stride_value,
            step_inst: Some(counter.iv.update_value),
            final_value: counter.final_value,
            direction: Self::direction(&counter.iv),
        })
    }

    fn scev(&self, value: SsaVarId) -> ScevExpr {
        self.translate(value, &mut HashSet::new())
    }

    fn is_loop_invariant(&self, expr: &ScevExpr, lp: &LoopInfo) -> bool {
        match expr {
            ScevExpr::Constant(_) => true,
            ScevExpr::Unknown(v) => lp.is_loop_invariant(self.func, *v),
            ScevExpr::AddRec {
                start,
                step,
                header,
            } => {
                !lp.contains(*header)
                    && self.is_loop_invariant(start, lp)
                    && self.is_loop_invariant(step, lp)
            }
            ScevExpr::Add(parts) | ScevExpr::Mul(parts) => {
                parts.iter().all(|part| self.is_loop_invariant(part, lp))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        analysis::{cfg::detect_loops, ssa::SsaCfg},
        test::{
            fixture_decreasing, fixture_empty_loop, fixture_matmul, fixture_operand_cycle,
            fixture_two_level, NestVariant,
        },
        utils::graph::algorithms::compute_dominators_rooted,
    };

    fn forest_of(func: &SsaFunction) -> LoopForest {
        let cfg = SsaCfg::from_ssa(func);
        detect_loops(&cfg, &compute_dominators_rooted(&cfg))
    }

    #[test]
    fn test_matmul_bounds() -> crate::Result<()> {
        let kernel = fixture_matmul()?;
        let forest = forest_of(&kernel.func);
        let se = AffineEvolution::new(&kernel.func, &forest);

        for lp in forest.iter() {
            let bounds = se.bounds(lp).ok_or(crate::Error::Error("bounds".into()))?;
            assert_eq!(bounds.direction, Direction::Increasing);
            assert_eq!(bounds.initial, kernel.value("zero"));
            assert_eq!(bounds.final_value, kernel.value("n"));
            assert_eq!(bounds.step_value, Some(kernel.value("one")));
            assert!(se.induction_variable(lp).is_some());
        }
        Ok(())
    }

    #[test]
    fn test_decreasing_direction() -> crate::Result<()> {
        let kernel = fixture_decreasing()?;
        let forest = forest_of(&kernel.func);
        let se = AffineEvolution::new(&kernel.func, &forest);

        let bounds = se
            .bounds(&forest.loops()[0])
            .ok_or(crate::Error::Error("bounds".into()))?;
        assert_eq!(bounds.direction, Direction::Decreasing);
        assert_eq!(bounds.initial, kernel.value("n"));
        Ok(())
    }

    #[test]
    fn test_unrotated_loop_has_no_bounds() -> crate::Result<()> {
        let kernel = fixture_empty_loop()?;
        let forest = forest_of(&kernel.func);
        let se = AffineEvolution::new(&kernel.func, &forest);

        let lp = &forest.loops()[0];
        assert!(se.bounds(lp).is_none());
        assert!(se.induction_variable(lp).is_none());
        Ok(())
    }

    #[test]
    fn test_recurrence_invariance() -> crate::Result<()> {
        let kernel = fixture_two_level(NestVariant::TriangularBound)?;
        let forest = forest_of(&kernel.func);
        let se = AffineEvolution::new(&kernel.func, &forest);

        let outer = forest
            .loop_for_header(NodeId::new(kernel.block("outer_header")))
            .ok_or(crate::Error::Error("outer".into()))?;
        let inner = forest
            .loop_for_header(NodeId::new(kernel.block("inner_header")))
            .ok_or(crate::Error::Error("inner".into()))?;

        let i = se.scev(kernel.value("i"));
        assert!(i.is_add_rec());
        assert!(!se.is_loop_invariant(&i, outer));
        assert!(se.is_loop_invariant(&i, inner));

        let j = se.scev(kernel.value("j"));
        assert!(!se.is_loop_invariant(&j, inner));
        assert!(!se.is_loop_invariant(&j, outer));

        let n = se.scev(kernel.value("n"));
        assert!(se.is_loop_invariant(&n, outer));
        Ok(())
    }

    #[test]
    fn test_operand_cycle_is_unknown() -> crate::Result<()> {
        let kernel = fixture_operand_cycle()?;
        let forest = forest_of(&kernel.func);
        assert!(forest.loops().is_empty());
        let se = AffineEvolution::new(&kernel.func, &forest);

        let c = kernel.value("c");
        let expr = se.scev(c);
        assert!(expr.unknowns().contains(&c));
        assert!(expr.unknowns().contains(&kernel.value("x")));
        Ok(())
    }
}
