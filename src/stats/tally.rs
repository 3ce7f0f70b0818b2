//! Operator and conditional frequencies of a loop nest.

use std::{collections::BTreeMap, fmt};

use serde::Serialize;

use crate::analysis::{LoopInfo, SsaFunction, SsaOp};

/// Binary operator counts and the number of program-level conditionals.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct OperatorTally {
    /// Occurrences per operator mnemonic.
    pub operators: BTreeMap<&'static str, usize>,
    /// Conditional branches on a comparison, other than the loop's own latch test.
    pub conditionals: usize,
}

impl OperatorTally {
    /// Returns the count of `mnemonic`, zero if it never occurs.
    #[must_use]
    pub fn count(&self, mnemonic: &str) -> usize {
        self.operators.get(mnemonic).copied().unwrap_or(0)
    }

    /// Returns the number of binary operators seen.
    #[must_use]
    pub fn total(&self) -> usize {
        self.operators.values().sum()
    }
}

impl fmt::Display for OperatorTally {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Operation: Frequency in Loop nest")?;
        for (op, count) in &self.operators {
            writeln!(f, "{op} : {count}")?;
        }
        writeln!(f, "Conditionals: {}", self.conditionals)
    }
}

/// Counts the binary operators and conditionals of `lp`, nested loops included.
///
/// Only `lp`'s own latch comparison is excluded from the conditionals; the latch tests
/// of nested loops are counted.
#[must_use]
pub fn tally_operators(func: &SsaFunction, lp: &LoopInfo) -> OperatorTally {
    let mut tally = OperatorTally::default();
    let latch_cmp = lp.latch_cmp(func);

    for node in &lp.body {
        let Some(block) = func.block(node.index()) else {
            continue;
        };

        for op in block.instructions() {
            match op {
                SsaOp::Binary { op, .. } => {
                    *tally.operators.entry(op.mnemonic()).or_insert(0) += 1;
                }
                SsaOp::Branch { condition, .. } => {
                    let is_cmp = matches!(func.definition(*condition), Some(SsaOp::Cmp { .. }));
                    if is_cmp && latch_cmp != Some(*condition) {
                        tally.conditionals += 1;
                    }
                }
                _ => {}
            }
        }
    }

    tally
}
