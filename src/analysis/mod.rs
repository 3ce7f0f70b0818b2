//! Program analysis infrastructure for SSA functions.
//!
//! This module provides the program representation and the structural analyses the
//! loop statistics in [`crate::stats`] are computed from. It builds upon the generic
//! graph infrastructure in [`crate::utils::graph`].
//!
//! # Architecture
//!
//! - [`ssa`] - SSA functions, blocks, instructions and the [`FunctionBuilder`]
//! - [`cfg`] - Natural loop detection and the [`LoopForest`]
//! - [`scev`] - Scalar evolution: induction variables, bounds and loop invariance
//!
//! # Usage
//!
//! ```rust
//! use loopstat::analysis::{detect_loops, AffineEvolution, FunctionBuilder, SsaCfg};
//! use loopstat::utils::graph::algorithms::compute_dominators_rooted;
//!
//! let mut b = FunctionBuilder::new("empty");
//! let entry = b.block();
//! b.switch_to(entry);
//! b.ret(None);
//! let func = b.finish()?;
//!
//! let cfg = SsaCfg::from_ssa(&func);
//! let forest = detect_loops(&cfg, &compute_dominators_rooted(&cfg));
//! let se = AffineEvolution::new(&func, &forest);
//! assert_eq!(se.function().name(), "empty");
//! # Ok::<(), loopstat::Error>(())
//! ```

pub mod cfg;
pub mod scev;
pub mod ssa;

pub use cfg::{
    detect_loops, InductionUpdateKind, InductionVar, LoopExit, LoopForest, LoopInfo, LoopType,
};
pub use scev::{AffineEvolution, Direction, LoopBounds, ScalarEvolution, ScevExpr};
pub use ssa::{
    BinaryOp, CastKind, CmpPredicate, ConstValue, DefSite, FunctionBuilder, OpEffects, PhiNode,
    PhiOperand, SsaBlock, SsaCfg, SsaFunction, SsaOp, SsaType, SsaVarId, SsaVariable, UseSite,
    ValueKind, VariableOrigin,
};
