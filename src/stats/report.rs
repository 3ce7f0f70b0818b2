//! Per-function reports.
//!
//! A [`FunctionReport`] prints as the textual trace of the loop statistics pass:
//!
//! ```text
//! Function matmul
//! -----------------
//! Analyzing loop 1
//! Loop Depth: 2
//! Loop Direction: Increasing
//! Initial value is: i32 0
//! Step value is: i32 1
//! Step Instr is: i.inc = add i, i32 1
//! Final value is: n
//! =============================
//! Analyzing loop nest 1
//! Tightly nested
//! Loop Direction: Increasing
//! ...
//! ==============================================
//! ==============================================
//! Total Loops: 2
//! Disjoint Loops Found: 1
//! Nested Loops: 1
//! Rectangular Loops: 1
//! Average Loop Depth: 2
//! ==============================================
//! ==============================================
//! ```
//!
//! Optional sections are controlled by [`ReportOptions`]. The same data serializes to
//! JSON through [`FunctionReport::to_json`].

use std::fmt;

use serde::Serialize;

use crate::{
    stats::{AggregateStats, LoopReport, NestReport, NestShape, ReportOptions},
    Error, Result,
};

const LOOP_SEPARATOR: &str = "=============================";
const SUMMARY_SEPARATOR: &str = "==============================================";

/// Loop statistics of one function.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FunctionReport {
    /// Function name.
    pub function: String,
    /// One report per outermost loop, in header order.
    pub loops: Vec<LoopReport>,
    /// Function-wide totals.
    pub summary: AggregateStats,
    /// Sections printed by `Display`.
    pub options: ReportOptions,
}

impl FunctionReport {
    /// Renders the report as pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Error`] if serialization fails.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| Error::Error(e.to_string()))
    }

    /// Returns the report of the `ordinal`-th outermost loop (1-based).
    #[must_use]
    pub fn loop_report(&self, ordinal: usize) -> Option<&LoopReport> {
        self.loops.iter().find(|lp| lp.ordinal == ordinal)
    }

    fn fmt_loop(&self, f: &mut fmt::Formatter<'_>, lp: &LoopReport) -> fmt::Result {
        let options = &self.options;
        writeln!(f, "Analyzing loop {}", lp.ordinal)?;
        writeln!(f, "Loop Depth: {}", lp.depth)?;

        match &lp.refs {
            Some(refs) => {
                if options.show_scalar_detail {
                    for scalar in &refs.scalars {
                        writeln!(f, "{scalar}")?;
                    }
                }
                if options.show_index_detail {
                    for trace in &refs.traces {
                        writeln!(f, "{trace}")?;
                    }
                    write!(
                        f,
                        "\nLoop Nest Array Access Pattern Summary\n=================\n{}\n",
                        refs.patterns
                    )?;
                }
            }
            None => {
                if options.show_array_refs || options.show_index_detail || options.show_scalar_detail
                {
                    writeln!(f, "Array references unavailable")?;
                }
            }
        }

        if options.show_operator_freq {
            write!(f, "{}", lp.operators)?;
        }

        if options.show_array_refs {
            if let Some(refs) = &lp.refs {
                write!(f, "{}", refs.summary)?;
            }
        }

        write!(f, "{}", lp.bounds)?;
        writeln!(f, "{LOOP_SEPARATOR}")?;

        for nest in &lp.nests {
            Self::fmt_nest(f, nest)?;
        }
        Ok(())
    }

    fn fmt_nest(f: &mut fmt::Formatter<'_>, nest: &NestReport) -> fmt::Result {
        writeln!(f, "Analyzing loop nest {}", nest.ordinal)?;
        match nest.shape {
            NestShape::Triangular => writeln!(f, "Triangular Loop")?,
            NestShape::Rectangular => {}
            NestShape::Unknown => writeln!(f, "Nest shape unknown")?,
        }
        if nest.tightly_nested {
            writeln!(f, "Tightly nested")?;
        } else {
            writeln!(f, "Not tightly nested")?;
        }
        write!(f, "{}", nest.bounds)?;
        writeln!(f, "{LOOP_SEPARATOR}")
    }

    fn fmt_summary(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let summary = &self.summary;
        writeln!(f, "{SUMMARY_SEPARATOR}")?;
        writeln!(f, "{SUMMARY_SEPARATOR}")?;
        writeln!(f, "Total Loops: {}", summary.total_loops)?;
        writeln!(f, "Disjoint Loops Found: {}", summary.disjoint_loops)?;
        writeln!(f, "Nested Loops: {}", summary.nested_loops)?;
        if self.options.show_triangular_summary {
            writeln!(f, "Triangular Loops: {}", summary.triangular_loops)?;
        }
        if summary.unknown_loops > 0 {
            writeln!(
                f,
                "Rectangular Loops: {} ({} of unknown shape)",
                summary.rectangular_loops, summary.unknown_loops
            )?;
        } else {
            writeln!(f, "Rectangular Loops: {}", summary.rectangular_loops)?;
        }
        match summary.average_depth {
            Some(depth) => writeln!(f, "Average Loop Depth: {depth}")?,
            None => writeln!(f, "Average Loop Depth: no loops")?,
        }
        writeln!(f, "{SUMMARY_SEPARATOR}")?;
        writeln!(f, "{SUMMARY_SEPARATOR}")
    }
}

impl fmt::Display for FunctionReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Function {}", self.function)?;
        writeln!(f, "-----------------")?;
        for lp in &self.loops {
            self.fmt_loop(f, lp)?;
        }
        self.fmt_summary(f)
    }
}
