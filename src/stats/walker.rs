//! Loop forest traversal and aggregate statistics.
//!
//! The walker visits each outermost loop in header order. An outermost loop gets the
//! reference collector, the operator tally and the bounds extractor; each of its
//! immediate sub-loops gets an induction variable, the triangular and tight-nesting
//! checks, and the bounds extractor. Deeper loops are only seen through their
//! ancestors' instructions.
//!
//! # Aggregates
//!
//! | Counter            | Incremented by                                         |
//! |--------------------|--------------------------------------------------------|
//! | `total_loops`      | 1 per outermost loop plus 1 per immediate sub-loop     |
//! | `disjoint_loops`   | 1 per outermost loop                                   |
//! | `nested_loops`     | 1 per immediate sub-loop                               |
//! | `triangular_loops` | 1 per immediate sub-loop found triangular              |
//! | `depth_total`      | 1 per outermost loop plus 1 per immediate sub-loop     |
//!
//! `average_depth` is `depth_total / disjoint_loops`, absent when there are no loops.

use log::{debug, warn};
use serde::Serialize;

use crate::{
    analysis::{LoopForest, LoopInfo, ScalarEvolution, SsaFunction},
    stats::{
        classify_nest, collect_array_refs, extract_bounds, nest_induction_variable,
        tally_operators, tightly_nested, ArrayRefs, BoundsReport, NestShape, OperatorTally,
    },
};

/// Function-wide loop totals.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct AggregateStats {
    /// Outermost loops plus their immediate sub-loops.
    pub total_loops: usize,
    /// Outermost loops.
    pub disjoint_loops: usize,
    /// Immediate sub-loops of outermost loops.
    pub nested_loops: usize,
    /// Nested loops found triangular.
    pub triangular_loops: usize,
    /// Nested loops not found triangular.
    pub rectangular_loops: usize,
    /// Nested loops whose shape could not be decided, included in `rectangular_loops`.
    pub unknown_loops: usize,
    /// Accumulated depth.
    pub depth_total: usize,
    /// `depth_total / disjoint_loops`, `None` without loops.
    pub average_depth: Option<f64>,
}

impl AggregateStats {
    /// Accounts for an outermost loop with `children` immediate sub-loops.
    pub fn record_loop(&mut self, children: usize) {
        self.disjoint_loops += 1;
        self.total_loops += 1 + children;
        self.depth_total += 1 + children;
    }

    /// Accounts for one immediate sub-loop.
    pub fn record_nest(&mut self, shape: NestShape) {
        self.nested_loops += 1;
        match shape {
            NestShape::Triangular => self.triangular_loops += 1,
            NestShape::Unknown => self.unknown_loops += 1,
            NestShape::Rectangular => {}
        }
    }

    /// Computes the derived totals once every loop has been recorded.
    #[allow(clippy::cast_precision_loss)]
    pub fn finish(&mut self) {
        self.rectangular_loops = self.nested_loops.saturating_sub(self.triangular_loops);
        self.average_depth = (self.disjoint_loops > 0)
            .then(|| self.depth_total as f64 / self.disjoint_loops as f64);
    }

    /// Returns `true` if the function has any loop.
    #[must_use]
    pub fn has_loops(&self) -> bool {
        self.disjoint_loops > 0
    }
}

/// Analysis of one immediate sub-loop.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NestReport {
    /// 1-based position among the parent's sub-loops.
    pub ordinal: usize,
    /// Header block.
    pub header: usize,
    /// The induction variable used, rendered.
    pub induction_variable: Option<String>,
    /// Triangular verdict.
    pub shape: NestShape,
    /// Whether the sub-loop is tightly nested in its parent.
    pub tightly_nested: bool,
    /// Bounds of the sub-loop.
    pub bounds: BoundsReport,
}

/// Analysis of one outermost loop.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LoopReport {
    /// 1-based position among the outermost loops.
    pub ordinal: usize,
    /// Header block.
    pub header: usize,
    /// One plus the number of immediate sub-loops.
    pub depth: usize,
    /// Array references, `None` when the loop could not be scanned.
    pub refs: Option<ArrayRefs>,
    /// Operator frequencies.
    pub operators: OperatorTally,
    /// Bounds of the loop.
    pub bounds: BoundsReport,
    /// Immediate sub-loops.
    pub nests: Vec<NestReport>,
}

/// Walks the loop forest of one function.
pub struct LoopWalker<'a, S: ?Sized> {
    func: &'a SsaFunction,
    forest: &'a LoopForest,
    se: &'a S,
}

impl<'a, S> LoopWalker<'a, S>
where
    S: ScalarEvolution + ?Sized,
{
    /// Creates a walker over `func`, its loop forest and a scalar-evolution provider.
    pub fn new(func: &'a SsaFunction, forest: &'a LoopForest, se: &'a S) -> Self {
        Self { func, forest, se }
    }

    /// Visits every outermost loop and returns the per-loop reports and the totals.
    #[must_use]
    pub fn run(&self) -> (Vec<LoopReport>, AggregateStats) {
        let mut stats = AggregateStats::default();
        let loops: Vec<LoopReport> = self
            .forest
            .top_level()
            .enumerate()
            .map(|(idx, lp)| self.visit_loop(idx + 1, lp, &mut stats))
            .collect();
        stats.finish();

        debug!(
            "{}: {} loops, {} disjoint, {} nested",
            self.func.name(),
            stats.total_loops,
            stats.disjoint_loops,
            stats.nested_loops
        );
        (loops, stats)
    }

    fn visit_loop(&self, ordinal: usize, lp: &LoopInfo, stats: &mut AggregateStats) -> LoopReport {
        let children = self.forest.children(lp);
        stats.record_loop(children.len());
        debug!(
            "{}: analyzing loop {ordinal} at {} with {} sub-loops",
            self.func.name(),
            lp.header,
            children.len()
        );

        let refs = match collect_array_refs(self.func, lp) {
            Ok(refs) => Some(refs),
            Err(error) => {
                warn!(
                    "{}: array references of loop {ordinal} unavailable: {error}",
                    self.func.name()
                );
                None
            }
        };

        let nests = children
            .iter()
            .enumerate()
            .map(|(idx, inner)| {
                let nest = self.visit_nest(idx + 1, lp, inner);
                stats.record_nest(nest.shape);
                nest
            })
            .collect();

        LoopReport {
            ordinal,
            header: lp.header.index(),
            depth: children.len() + 1,
            refs,
            operators: tally_operators(self.func, lp),
            bounds: extract_bounds(self.func, self.se, lp),
            nests,
        }
    }

    fn visit_nest(&self, ordinal: usize, outer: &LoopInfo, inner: &LoopInfo) -> NestReport {
        let iv = nest_induction_variable(self.func, self.se, inner);
        let shape = match iv {
            Some(iv) => classify_nest(self.func, self.se, outer, inner, iv),
            None => {
                warn!(
                    "{}: loop at {} has no induction variable",
                    self.func.name(),
                    inner.header
                );
                NestShape::Unknown
            }
        };

        NestReport {
            ordinal,
            header: inner.header.index(),
            induction_variable: iv.map(|v| self.func.value_label(v)),
            shape,
            tightly_nested: tightly_nested(self.func, outer, inner),
            bounds: extract_bounds(self.func, self.se, inner),
        }
    }
}
