//! SSA function representation.
//!
//! An `SsaFunction` is the top-level container the loop analyses read: its blocks,
//! its value table and a def-use index built once at construction.
//!
//! # Structure
//!
//! ```text
//! SsaFunction
//! ├── name: String
//! ├── blocks: Vec<SsaBlock>          // block 0 is the entry
//! ├── variables: Vec<SsaVariable>    // arguments, globals, constants, results
//! └── users: Vec<Vec<UseSite>>       // def-use index, one list per value
//! ```
//!
//! Functions are immutable once built. Use
//! [`FunctionBuilder`](crate::analysis::FunctionBuilder) to construct them.

use std::fmt;

use crate::analysis::ssa::{
    ConstValue, PhiNode, SsaBlock, SsaOp, SsaType, SsaVarId, SsaVariable, UseSite, ValueKind,
    VariableOrigin,
};

/// A function in SSA form.
#[derive(Debug, Clone)]
pub struct SsaFunction {
    name: String,
    blocks: Vec<SsaBlock>,
    variables: Vec<SsaVariable>,
    users: Vec<Vec<UseSite>>,
}

impl SsaFunction {
    /// Assembles a function and builds its def-use index.
    ///
    /// Operands are assumed to be in range; the builder validates before calling this.
    pub(crate) fn new(name: String, blocks: Vec<SsaBlock>, variables: Vec<SsaVariable>) -> Self {
        let mut users = vec![Vec::new(); variables.len()];

        for block in &blocks {
            for (phi_idx, phi) in block.phi_nodes().iter().enumerate() {
                for value in phi.used_variables() {
                    if let Some(list) = users.get_mut(value.index()) {
                        list.push(UseSite::phi_operand(block.id(), phi_idx));
                    }
                }
            }
            for (instr_idx, op) in block.instructions().iter().enumerate() {
                for value in op.uses() {
                    if let Some(list) = users.get_mut(value.index()) {
                        list.push(UseSite::instruction(block.id(), instr_idx));
                    }
                }
            }
        }

        Self {
            name,
            blocks,
            variables,
            users,
        }
    }

    /// Returns the function name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns all blocks.
    #[must_use]
    pub fn blocks(&self) -> &[SsaBlock] {
        &self.blocks
    }

    /// Returns the block at `index`.
    #[must_use]
    pub fn block(&self, index: usize) -> Option<&SsaBlock> {
        self.blocks.get(index)
    }

    /// Returns the number of blocks.
    #[must_use]
    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }

    /// Returns `true` if the function has no blocks.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Returns the value table.
    #[must_use]
    pub fn variables(&self) -> &[SsaVariable] {
        &self.variables
    }

    /// Returns the metadata of a value.
    #[must_use]
    pub fn variable(&self, id: SsaVarId) -> Option<&SsaVariable> {
        self.variables.get(id.index())
    }

    /// Iterates over the function arguments.
    pub fn arguments(&self) -> impl Iterator<Item = &SsaVariable> {
        self.variables
            .iter()
            .filter(|var| var.origin().is_argument())
    }

    /// Returns the type of a value.
    #[must_use]
    pub fn value_type(&self, id: SsaVarId) -> Option<&SsaType> {
        self.variable(id).map(SsaVariable::var_type)
    }

    /// Returns the constant payload if `id` is a constant.
    #[must_use]
    pub fn constant(&self, id: SsaVarId) -> Option<&ConstValue> {
        self.variable(id).and_then(SsaVariable::const_value)
    }

    /// Returns `true` if `id` is a compile-time constant.
    #[must_use]
    pub fn is_constant(&self, id: SsaVarId) -> bool {
        self.constant(id).is_some()
    }

    /// Returns a human-readable label for a value (`A`, `i32 1`, `v7`).
    #[must_use]
    pub fn value_label(&self, id: SsaVarId) -> String {
        match self.variable(id) {
            Some(var) => match (var.const_value(), var.name()) {
                (Some(value), _) => value.to_string(),
                (None, Some(name)) => name.to_string(),
                (None, None) => id.to_string(),
            },
            None => id.to_string(),
        }
    }

    /// Renders an operation with value labels instead of raw ids.
    ///
    /// ```text
    /// inc = add i, i32 1
    /// ```
    #[must_use]
    pub fn display_op<'a>(&'a self, op: &'a SsaOp) -> impl fmt::Display + 'a {
        OpDisplay { func: self, op }
    }

    /// Renders a value: its defining instruction if it has one, its label otherwise.
    #[must_use]
    pub fn describe_value(&self, id: SsaVarId) -> String {
        match self.definition(id) {
            Some(op) => self.display_op(op).to_string(),
            None => self.value_label(id),
        }
    }

    /// Returns the block that defines `id`, or `None` for arguments, globals and constants.
    #[must_use]
    pub fn def_block(&self, id: SsaVarId) -> Option<usize> {
        self.variable(id)
            .and_then(SsaVariable::def_site)
            .map(|site| site.block)
    }

    /// Returns the instruction defining `id`, if it is an instruction result.
    #[must_use]
    pub fn definition(&self, id: SsaVarId) -> Option<&SsaOp> {
        let site = self.variable(id)?.def_site()?;
        self.block(site.block)?.instruction(site.instruction?)
    }

    /// Returns the phi node defining `id`, if it is a phi result.
    #[must_use]
    pub fn phi_node(&self, id: SsaVarId) -> Option<&PhiNode> {
        let site = self.variable(id)?.def_site()?;
        if !site.is_phi() {
            return None;
        }
        self.block(site.block)?.find_phi_defining(id)
    }

    /// Returns every place `id` is read.
    #[must_use]
    pub fn users(&self, id: SsaVarId) -> &[UseSite] {
        self.users.get(id.index()).map_or(&[], Vec::as_slice)
    }

    /// Returns the instruction at a use site, or `None` for phi operand uses.
    #[must_use]
    pub fn use_op(&self, site: UseSite) -> Option<&SsaOp> {
        if site.is_phi_operand {
            return None;
        }
        self.block(site.block)?.instruction(site.instruction)
    }

    /// Classifies a value into the closed [`ValueKind`] view.
    #[must_use]
    pub fn value_kind(&self, id: SsaVarId) -> ValueKind<'_> {
        let Some(var) = self.variable(id) else {
            return ValueKind::Other;
        };

        match var.origin() {
            VariableOrigin::Constant => var
                .const_value()
                .map_or(ValueKind::Other, ValueKind::Constant),
            VariableOrigin::Phi => self.phi_node(id).map_or(ValueKind::Other, ValueKind::Cyclic),
            VariableOrigin::Instruction => match self.definition(id) {
                Some(SsaOp::Binary {
                    op, left, right, ..
                }) => ValueKind::Binary {
                    op: *op,
                    left: *left,
                    right: *right,
                },
                Some(SsaOp::Cast { kind, operand, .. }) => ValueKind::Cast {
                    kind: *kind,
                    operand: *operand,
                },
                _ => ValueKind::Other,
            },
            VariableOrigin::Argument(_) | VariableOrigin::Global => ValueKind::Other,
        }
    }
}

struct OpDisplay<'a> {
    func: &'a SsaFunction,
    op: &'a SsaOp,
}

impl fmt::Display for OpDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.op.fmt_with(f, &|var| self.func.value_label(var))
    }
}

impl fmt::Display for SsaFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "function {}", self.name)?;
        for block in &self.blocks {
            write!(f, "{block}")?;
        }
        Ok(())
    }
}
