//! Array reference collection.
//!
//! Walks every instruction of a loop, nested loops included, and records the element
//! addresses computed from array-typed bases. Each use of such an address is one
//! reference to the array; the last index of the address is handed to the index
//! classifier, weighted by the same number of uses.

use std::{collections::BTreeMap, fmt};

use log::{debug, trace};
use serde::Serialize;

use crate::{
    analysis::{LoopInfo, SsaFunction, SsaOp, SsaVarId},
    stats::{IndexPatternCounts, IndexShape},
    utils::graph::NodeId,
    Result,
};

/// References to one array inside a loop nest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArrayRefRecord {
    /// Number of uses of element addresses computed from this array.
    pub count: usize,
    /// The array type, as first seen (`[64 x [64 x double]]`).
    pub element_type: String,
    /// Number of array levels in the type.
    pub dimensions: usize,
    /// Innermost element type (`double`).
    pub base_type: String,
}

/// Per-array reference table of one loop nest.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ArrayRefSummary {
    /// Records keyed by array name.
    pub arrays: BTreeMap<String, ArrayRefRecord>,
    /// References whose consumer lies inside the loop nest.
    pub total: usize,
}

impl ArrayRefSummary {
    /// Returns the record of `name`, if the array is referenced.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&ArrayRefRecord> {
        self.arrays.get(name)
    }

    /// Returns `true` if no array is referenced.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.arrays.is_empty()
    }
}

impl fmt::Display for ArrayRefSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Number of Array References: {}", self.total)?;
        writeln!(f, "Name : Number of Refs : Size and Type")?;
        for (name, record) in &self.arrays {
            writeln!(f, "{name} : {} : {}", record.count, record.element_type)?;
        }
        Ok(())
    }
}

/// A scalar operand read inside the loop nest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScalarRef {
    /// Operand position in its instruction.
    pub position: usize,
    /// Value name, empty for unnamed values and constants.
    pub name: String,
    /// Value type.
    pub value_type: String,
}

impl fmt::Display for ScalarRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Scalar {}{} : {}", self.position, self.name, self.value_type)
    }
}

/// The index expression of one array access.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IndexTrace {
    /// Array name.
    pub array: String,
    /// The index rendered with its defining instruction.
    pub index: String,
    /// How the index was classified.
    pub shape: IndexShape,
}

impl fmt::Display for IndexTrace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "array: {} , index: {}", self.array, self.index)
    }
}

/// Everything the reference collector learns about one loop nest.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ArrayRefs {
    /// Per-array reference table.
    pub summary: ArrayRefSummary,
    /// Index pattern tallies.
    pub patterns: IndexPatternCounts,
    /// Scalar operands of the non-address instructions.
    pub scalars: Vec<ScalarRef>,
    /// One entry per array access.
    pub traces: Vec<IndexTrace>,
}

/// Collects the array references of `lp`.
///
/// # Errors
///
/// Returns [`crate::Error::Malformed`] if an element address in the loop has no indices.
pub fn collect_array_refs(func: &SsaFunction, lp: &LoopInfo) -> Result<ArrayRefs> {
    let mut refs = ArrayRefs::default();

    for &node in &lp.body {
        let Some(block) = func.block(node.index()) else {
            continue;
        };

        for phi in block.phi_nodes() {
            for (position, operand) in phi.operands().iter().enumerate() {
                record_scalar(func, &mut refs.scalars, position, operand.value());
            }
        }

        for op in block.instructions() {
            match op {
                SsaOp::ElementAddr {
                    dest,
                    base,
                    indices,
                } => {
                    let Some(index) = indices.last().copied() else {
                        return Err(malformed_error!(
                            "element address {} in B{} of {} has no indices",
                            func.value_label(*dest),
                            node.index(),
                            func.name()
                        ));
                    };
                    record_access(func, lp, &mut refs, *dest, *base, index);
                }
                _ => {
                    for (position, value) in op.uses().into_iter().enumerate() {
                        record_scalar(func, &mut refs.scalars, position, value);
                    }
                }
            }
        }
    }

    debug!(
        "{}: loop at {} has {} array references over {} arrays",
        func.name(),
        lp.header,
        refs.summary.total,
        refs.summary.arrays.len()
    );
    Ok(refs)
}

fn record_access(
    func: &SsaFunction,
    lp: &LoopInfo,
    refs: &mut ArrayRefs,
    dest: SsaVarId,
    base: SsaVarId,
    index: SsaVarId,
) {
    let Some(array) = func
        .value_type(base)
        .and_then(|ty| ty.pointee())
        .filter(|pointee| pointee.is_array())
    else {
        return;
    };

    let name = func.value_label(base);
    let record = refs
        .summary
        .arrays
        .entry(name.clone())
        .or_insert_with(|| ArrayRefRecord {
            count: 0,
            element_type: array.to_string(),
            dimensions: array.array_dimensions(),
            base_type: array.array_base_type().to_string(),
        });

    let users = func.users(dest);
    record.count += users.len();
    refs.summary.total += users
        .iter()
        .filter(|site| lp.contains(NodeId::new(site.block)))
        .count();

    let shape = refs.patterns.record(func, index, users.len());
    refs.traces.push(IndexTrace {
        array: name,
        index: func.describe_value(index),
        shape,
    });
}

fn record_scalar(func: &SsaFunction, scalars: &mut Vec<ScalarRef>, position: usize, value: SsaVarId) {
    let Some(var) = func.variable(value) else {
        return;
    };
    if !var.var_type().is_scalar() {
        return;
    }

    let scalar = ScalarRef {
        position,
        name: var.name().unwrap_or_default().to_string(),
        value_type: var.var_type().to_string(),
    };
    trace!("{}: {scalar}", func.name());
    scalars.push(scalar);
}
