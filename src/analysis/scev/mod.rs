//! Scalar evolution: loop bounds, induction variables and invariance.
//!
//! The loop statistics ask three questions of a scalar-evolution provider: which
//! value counts a loop's iterations, what its bounds are, and whether a value can
//! change while a given loop runs. [`ScalarEvolution`] captures those questions so
//! the statistics can run against any provider; [`AffineEvolution`] answers them for
//! loops whose counters step by a loop-invariant amount.
//!
//! # Usage
//!
//! ```rust
//! use loopstat::analysis::{
//!     detect_loops, AffineEvolution, BinaryOp, CmpPredicate, Direction, FunctionBuilder,
//!     ScalarEvolution, SsaCfg, SsaType,
//! };
//! use loopstat::utils::graph::algorithms::compute_dominators_rooted;
//!
//! let mut b = FunctionBuilder::new("count");
//! let n = b.argument("n", SsaType::i32());
//! let zero = b.const_i32(0);
//! let one = b.const_i32(1);
//! let entry = b.block();
//! let body = b.block();
//! let exit = b.block();
//! b.switch_to(entry);
//! b.jump(body);
//! b.switch_to(body);
//! let i = b.phi("i", SsaType::i32());
//! let inc = b.binary("inc", BinaryOp::Add, i, one);
//! let cond = b.cmp("cond", CmpPredicate::Slt, inc, n);
//! b.branch(cond, body, exit);
//! b.add_phi_operand(i, zero, entry);
//! b.add_phi_operand(i, inc, body);
//! b.switch_to(exit);
//! b.ret(None);
//! let func = b.finish()?;
//!
//! let cfg = SsaCfg::from_ssa(&func);
//! let forest = detect_loops(&cfg, &compute_dominators_rooted(&cfg));
//! let se = AffineEvolution::new(&func, &forest);
//! let lp = &forest.loops()[0];
//!
//! assert_eq!(se.induction_variable(lp), Some(i));
//! let bounds = se.bounds(lp).ok_or(loopstat::Error::Error("no bounds".into()))?;
//! assert_eq!(bounds.initial, zero);
//! assert_eq!(bounds.final_value, n);
//! assert_eq!(bounds.direction, Direction::Increasing);
//! # Ok::<(), loopstat::Error>(())
//! ```

mod affine;
mod expr;

use serde::Serialize;
use strum::Display;

pub use affine::AffineEvolution;
pub use expr::ScevExpr;

use crate::analysis::{cfg::LoopInfo, ssa::SsaVarId};

/// Monotonic direction of a loop's induction variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize)]
pub enum Direction {
    /// The counter grows every iteration.
    Increasing,
    /// The counter shrinks every iteration.
    Decreasing,
    /// The step sign is not known.
    Unknown,
}

/// Bounds of a loop whose induction variable steps towards a final value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoopBounds {
    /// Value of the induction variable on loop entry.
    pub initial: SsaVarId,
    /// Amount the counter changes by per iteration.
    pub step_value: Option<SsaVarId>,
    /// Value produced by the instruction that updates the counter.
    pub step_inst: Option<SsaVarId>,
    /// Value the counter is compared against in the latch.
    pub final_value: SsaVarId,
    /// Direction of the counter.
    pub direction: Direction,
}

/// Scalar-evolution facts about the loops of one function.
///
/// Every query may come back empty: unanswerable questions are a normal outcome,
/// not an error.
pub trait ScalarEvolution {
    /// Returns the value that counts the iterations of `lp`, if there is one.
    fn induction_variable(&self, lp: &LoopInfo) -> Option<SsaVarId>;

    /// Returns the bounds of `lp`, if they can be derived.
    fn bounds(&self, lp: &LoopInfo) -> Option<LoopBounds>;

    /// Returns the symbolic form of `value`.
    fn scev(&self, value: SsaVarId) -> ScevExpr;

    /// Returns `true` if `expr` cannot change while `lp` runs.
    fn is_loop_invariant(&self, expr: &ScevExpr, lp: &LoopInfo) -> bool;
}
