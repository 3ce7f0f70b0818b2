//! Loop bounds and direction, as reported.

use std::fmt;

use log::debug;
use serde::Serialize;

use crate::analysis::{Direction, LoopInfo, ScalarEvolution, SsaFunction};

/// The bounds of one loop, rendered for reporting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum BoundsReport {
    /// The scalar-evolution provider could not derive bounds.
    Unknown,
    /// Bounds derived by the provider.
    Known {
        /// Direction of the induction variable.
        direction: Direction,
        /// Value on loop entry.
        initial: String,
        /// Amount added per iteration.
        step_value: Option<String>,
        /// Instruction updating the induction variable.
        step_inst: Option<String>,
        /// Value the induction variable is compared against.
        final_value: String,
    },
}

impl BoundsReport {
    /// Returns `true` if bounds are known.
    #[must_use]
    pub fn is_known(&self) -> bool {
        matches!(self, Self::Known { .. })
    }

    /// Returns the direction, if bounds are known.
    #[must_use]
    pub fn direction(&self) -> Option<Direction> {
        match self {
            Self::Known { direction, .. } => Some(*direction),
            Self::Unknown => None,
        }
    }
}

impl fmt::Display for BoundsReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unknown => writeln!(f, "Could not get the bounds"),
            Self::Known {
                direction,
                initial,
                step_value,
                step_inst,
                final_value,
            } => {
                writeln!(f, "Loop Direction: {direction}")?;
                writeln!(f, "Initial value is: {initial}")?;
                if let Some(step) = step_value {
                    writeln!(f, "Step value is: {step}")?;
                    if let Some(inst) = step_inst {
                        writeln!(f, "Step Instr is: {inst}")?;
                    }
                }
                writeln!(f, "Final value is: {final_value}")
            }
        }
    }
}

/// Asks `se` for the bounds of `lp` and renders them against `func`.
pub fn extract_bounds<S>(func: &SsaFunction, se: &S, lp: &LoopInfo) -> BoundsReport
where
    S: ScalarEvolution + ?Sized,
{
    let Some(bounds) = se.bounds(lp) else {
        debug!("{}: no bounds for loop at {}", func.name(), lp.header);
        return BoundsReport::Unknown;
    };

    BoundsReport::Known {
        direction: bounds.direction,
        initial: func.describe_value(bounds.initial),
        step_value: bounds.step_value.map(|v| func.describe_value(v)),
        step_inst: bounds.step_inst.map(|v| func.describe_value(v)),
        final_value: func.describe_value(bounds.final_value),
    }
}
