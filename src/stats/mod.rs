//! Loop nest statistics.
//!
//! This module characterizes every loop nest of an [`SsaFunction`]: how its arrays are
//! indexed, which operators it executes, what its bounds and direction are, and whether
//! its nested loops are triangular or tightly nested.
//!
//! # Architecture
//!
//! Each statistic is a free function over one function and one [`LoopInfo`](crate::analysis::LoopInfo):
//!
//! - [`collect_array_refs`] - array references, index patterns and scalar operands
//! - [`tally_operators`] - binary operator frequencies and conditionals
//! - [`extract_bounds`] - initial, step and final value plus direction
//! - [`classify_nest`] - triangular or rectangular nested loops
//! - [`tightly_nested`] - perfect nesting of an outer/inner pair
//!
//! [`LoopWalker`] drives them over the loop forest and accumulates [`AggregateStats`];
//! [`FunctionReport`] holds the result and prints it.
//!
//! # Usage
//!
//! ```rust
//! use loopstat::analysis::{BinaryOp, CmpPredicate, FunctionBuilder, SsaType};
//! use loopstat::stats::{analyze_function, ReportOptions};
//!
//! let mut b = FunctionBuilder::new("count");
//! let n = b.argument("n", SsaType::i32());
//! let zero = b.const_i32(0);
//! let one = b.const_i32(1);
//! let (entry, body, exit) = (b.block(), b.block(), b.block());
//!
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
//!
//! let report = analyze_function(&b.finish()?, ReportOptions::default());
//! assert_eq!(report.summary.total_loops, 1);
//! assert!(report.to_string().contains("Loop Direction: Increasing"));
//! # Ok::<(), loopstat::Error>(())
//! ```

mod bounds;
mod config;
mod index;
mod nesting;
mod operand;
mod refs;
mod report;
mod tally;
mod triangular;
mod walker;

pub use bounds::{extract_bounds, BoundsReport};
pub use config::{ReportOptions, ReportSection};
pub use index::{IndexPatternCounts, IndexShape};
pub use nesting::tightly_nested;
pub use operand::OperandStats;
pub use refs::{collect_array_refs, ArrayRefRecord, ArrayRefSummary, ArrayRefs, IndexTrace, ScalarRef};
pub use report::FunctionReport;
pub use tally::{tally_operators, OperatorTally};
pub use triangular::{classify_nest, nest_induction_variable, NestShape};
pub use walker::{AggregateStats, LoopReport, LoopWalker, NestReport};

use log::info;
use rayon::prelude::*;

use crate::{
    analysis::{detect_loops, AffineEvolution, LoopForest, ScalarEvolution, SsaCfg, SsaFunction},
    utils::graph::algorithms::compute_dominators_rooted,
};

/// Analyzes every loop nest of `func` with the built-in affine scalar evolution.
#[must_use]
pub fn analyze_function(func: &SsaFunction, options: ReportOptions) -> FunctionReport {
    let cfg = SsaCfg::from_ssa(func);
    let forest = detect_loops(&cfg, &compute_dominators_rooted(&cfg));
    let se = AffineEvolution::new(func, &forest);
    analyze_with(func, &forest, &se, options)
}

/// Analyzes every loop nest of `func` over a precomputed loop forest and a caller-supplied
/// scalar-evolution provider.
#[must_use]
pub fn analyze_with<S>(
    func: &SsaFunction,
    forest: &LoopForest,
    se: &S,
    options: ReportOptions,
) -> FunctionReport
where
    S: ScalarEvolution + ?Sized,
{
    let (loops, summary) = LoopWalker::new(func, forest, se).run();
    FunctionReport {
        function: func.name().to_string(),
        loops,
        summary,
        options,
    }
}

/// Analyzes a set of functions in parallel.
///
/// Functions are independent, so each one is analyzed on its own rayon task. Reports are
/// returned in the order of `funcs`.
#[must_use]
pub fn analyze_module(funcs: &[SsaFunction], options: ReportOptions) -> Vec<FunctionReport> {
    let reports: Vec<FunctionReport> = funcs
        .par_iter()
        .map(|func| analyze_function(func, options))
        .collect();

    info!(
        "analyzed {} functions, {} loops",
        reports.len(),
        reports.iter().map(|r| r.summary.total_loops).sum::<usize>()
    );
    reports
}
