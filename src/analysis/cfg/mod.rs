//! Loop structure over control flow graphs.
//!
//! Loops are found on any graph that implements the generic traits from
//! [`crate::utils::graph`], most commonly the [`SsaCfg`](crate::analysis::SsaCfg) view of
//! an [`SsaFunction`](crate::analysis::SsaFunction). Detection needs the graph's
//! dominator tree:
//!
//! ```rust
//! use loopstat::analysis::{detect_loops, FunctionBuilder, SsaCfg};
//! use loopstat::utils::graph::algorithms::compute_dominators_rooted;
//!
//! let mut b = FunctionBuilder::new("straight");
//! let entry = b.block();
//! b.switch_to(entry);
//! b.ret(None);
//! let func = b.finish()?;
//!
//! let cfg = SsaCfg::from_ssa(&func);
//! let forest = detect_loops(&cfg, &compute_dominators_rooted(&cfg));
//! assert!(forest.is_empty());
//! # Ok::<(), loopstat::Error>(())
//! ```

mod loops;

pub use loops::{
    detect_loops, InductionUpdateKind, InductionVar, LoopExit, LoopForest, LoopInfo, LoopType,
};
