//! Programmatic construction of SSA functions.
//!
//! [`FunctionBuilder`] appends phi nodes and instructions to an explicitly selected
//! insertion block, allocating result values as it goes. Nothing is checked until
//! [`FunctionBuilder::finish`], which validates the whole function at once:
//!
//! - every block ends in exactly one terminator, placed last
//! - every operand names an existing value
//! - every branch target and phi predecessor names an existing block
//! - every phi operand arrives from a real predecessor of its block
//!
//! Element-address computations are typed the way LLVM types a `getelementptr`: the
//! first index steps over the base pointer, every further index steps one level into
//! the pointed-to array.
//!
//! # Examples
//!
//! A counted loop `for (i = 0; i < n; i++) A[i] = 0;`:
//!
//! ```rust
//! use loopstat::analysis::{BinaryOp, CastKind, CmpPredicate, FunctionBuilder, SsaType};
//!
//! let mut b = FunctionBuilder::new("zero");
//! let n = b.argument("n", SsaType::i32());
//! let a = b.global("A", SsaType::array(100, SsaType::i32()));
//! let zero = b.const_i32(0);
//! let one = b.const_i32(1);
//! let zero64 = b.const_i64(0);
//!
//! let entry = b.block();
//! let header = b.block();
//! let body = b.block();
//! let exit = b.block();
//!
//! b.switch_to(entry);
//! b.jump(header);
//!
//! b.switch_to(header);
//! let i = b.phi("i", SsaType::i32());
//! let cond = b.cmp("cmp", CmpPredicate::Slt, i, n);
//! b.branch(cond, body, exit);
//!
//! b.switch_to(body);
//! let idx = b.cast("idxprom", CastKind::SExt, i, SsaType::i64());
//! let addr = b.element_addr("arrayidx", a, &[zero64, idx]);
//! b.store(zero, addr);
//! let next = b.binary("inc", BinaryOp::Add, i, one);
//! b.jump(header);
//!
//! b.switch_to(exit);
//! b.ret(None);
//!
//! b.add_phi_operand(i, zero, entry);
//! b.add_phi_operand(i, next, body);
//!
//! let func = b.finish()?;
//! assert_eq!(func.block_count(), 4);
//! assert_eq!(func.value_type(addr).map(ToString::to_string), Some("i32*".to_string()));
//! # Ok::<(), loopstat::Error>(())
//! ```

use crate::{
    analysis::ssa::{
        BinaryOp, CastKind, CmpPredicate, ConstValue, DefSite, PhiNode, PhiOperand, SsaBlock,
        SsaFunction, SsaOp, SsaType, SsaVarId, SsaVariable, VariableOrigin,
    },
    Error, Result,
};

/// Incremental builder for [`SsaFunction`].
#[derive(Debug)]
pub struct FunctionBuilder {
    name: String,
    blocks: Vec<SsaBlock>,
    variables: Vec<SsaVariable>,
    current: Option<usize>,
    arg_count: u16,
    pending_error: Option<Error>,
}

impl FunctionBuilder {
    /// Creates a builder for a function called `name`.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            blocks: Vec::new(),
            variables: Vec::new(),
            current: None,
            arg_count: 0,
            pending_error: None,
        }
    }

    fn alloc(
        &mut self,
        name: &str,
        origin: VariableOrigin,
        def_site: Option<DefSite>,
        var_type: SsaType,
    ) -> SsaVarId {
        let id = SsaVarId::new(self.variables.len());
        let name = (!name.is_empty()).then(|| name.to_string());
        self.variables
            .push(SsaVariable::new(id, name, origin, def_site, var_type));
        id
    }

    fn fail(&mut self, error: Error) {
        if self.pending_error.is_none() {
            self.pending_error = Some(error);
        }
    }

    fn type_of(&self, id: SsaVarId) -> SsaType {
        self.variables
            .get(id.index())
            .map_or(SsaType::i32(), |var| var.var_type().clone())
    }

    /// Appends `op`, built from the result id it is about to receive.
    fn emit(
        &mut self,
        name: &str,
        var_type: SsaType,
        make: impl FnOnce(SsaVarId) -> SsaOp,
    ) -> SsaVarId {
        let Some(block) = self.current else {
            self.fail(malformed_error!("instruction emitted with no insertion block"));
            return self.alloc(name, VariableOrigin::Instruction, None, var_type);
        };
        let index = self.blocks[block].instruction_count();
        let id = self.alloc(
            name,
            VariableOrigin::Instruction,
            Some(DefSite::instruction(block, index)),
            var_type,
        );
        self.blocks[block].add_instruction(make(id));
        id
    }

    fn emit_void(&mut self, op: SsaOp) {
        match self.current {
            Some(block) => {
                self.blocks[block].add_instruction(op);
            }
            None => self.fail(malformed_error!("instruction emitted with no insertion block")),
        }
    }

    /// Declares the next function argument.
    pub fn argument(&mut self, name: &str, var_type: SsaType) -> SsaVarId {
        let position = self.arg_count;
        self.arg_count = self.arg_count.saturating_add(1);
        self.alloc(name, VariableOrigin::Argument(position), None, var_type)
    }

    /// Declares a module-level global holding a value of `value_type`.
    ///
    /// As in LLVM, the global itself is a pointer to its value.
    pub fn global(&mut self, name: &str, value_type: SsaType) -> SsaVarId {
        self.alloc(
            name,
            VariableOrigin::Global,
            None,
            SsaType::pointer(value_type),
        )
    }

    /// Adds a constant to the value table.
    pub fn constant(&mut self, value: ConstValue) -> SsaVarId {
        let id = SsaVarId::new(self.variables.len());
        self.variables.push(SsaVariable::constant(id, value));
        id
    }

    /// Adds an `i32` constant.
    pub fn const_i32(&mut self, value: i32) -> SsaVarId {
        self.constant(ConstValue::I32(value))
    }

    /// Adds an `i64` constant.
    pub fn const_i64(&mut self, value: i64) -> SsaVarId {
        self.constant(ConstValue::I64(value))
    }

    /// Creates a new empty block and returns its index. The first block is the entry.
    pub fn block(&mut self) -> usize {
        let id = self.blocks.len();
        self.blocks.push(SsaBlock::new(id));
        id
    }

    /// Selects the block that subsequent instructions are appended to.
    pub fn switch_to(&mut self, block: usize) {
        if block < self.blocks.len() {
            self.current = Some(block);
        } else {
            self.current = None;
            self.fail(Error::UnknownBlock(block));
        }
    }

    /// Returns the current insertion block.
    #[must_use]
    pub const fn current_block(&self) -> Option<usize> {
        self.current
    }

    /// Adds a phi node without operands to the current block.
    pub fn phi(&mut self, name: &str, var_type: SsaType) -> SsaVarId {
        let Some(block) = self.current else {
            self.fail(malformed_error!("phi emitted with no insertion block"));
            return self.alloc(name, VariableOrigin::Phi, None, var_type);
        };
        let id = self.alloc(
            name,
            VariableOrigin::Phi,
            Some(DefSite::phi(block)),
            var_type,
        );
        self.blocks[block].add_phi(PhiNode::new(id));
        id
    }

    /// Adds the incoming `value` from `predecessor` to phi node `phi`.
    pub fn add_phi_operand(&mut self, phi: SsaVarId, value: SsaVarId, predecessor: usize) {
        let site = self
            .variables
            .get(phi.index())
            .and_then(SsaVariable::def_site)
            .filter(DefSite::is_phi);
        let Some(site) = site else {
            self.fail(malformed_error!("{} is not a phi node", phi));
            return;
        };

        let node = self.blocks[site.block]
            .phi_nodes()
            .iter()
            .position(|node| node.result() == phi);
        match node.and_then(|idx| self.blocks[site.block].phi_mut(idx)) {
            Some(node) => node.add_operand(PhiOperand::new(value, predecessor)),
            None => self.fail(malformed_error!("{} is not a phi node", phi)),
        }
    }

    /// Emits `dest = op left, right`. The result takes the type of `left`.
    pub fn binary(&mut self, name: &str, op: BinaryOp, left: SsaVarId, right: SsaVarId) -> SsaVarId {
        let var_type = self.type_of(left);
        self.emit(name, var_type, |dest| SsaOp::Binary {
            dest,
            op,
            left,
            right,
        })
    }

    /// Emits a conversion of `operand` to `to`.
    pub fn cast(&mut self, name: &str, kind: CastKind, operand: SsaVarId, to: SsaType) -> SsaVarId {
        self.emit(name, to, |dest| SsaOp::Cast {
            dest,
            kind,
            operand,
        })
    }

    /// Emits an integer comparison producing an `i1`.
    pub fn cmp(
        &mut self,
        name: &str,
        predicate: CmpPredicate,
        left: SsaVarId,
        right: SsaVarId,
    ) -> SsaVarId {
        self.emit(name, SsaType::bool(), |dest| SsaOp::Cmp {
            dest,
            predicate,
            left,
            right,
        })
    }

    /// Emits an element-address computation `&base[indices...]`.
    pub fn element_addr(&mut self, name: &str, base: SsaVarId, indices: &[SsaVarId]) -> SsaVarId {
        let base_type = self.type_of(base);
        let mut element = base_type.pointee().cloned().unwrap_or(base_type.clone());
        for _ in indices.iter().skip(1) {
            match element.element() {
                Some(inner) => element = inner.clone(),
                None => break,
            }
        }
        let indices = indices.to_vec();
        self.emit(name, SsaType::pointer(element), |dest| SsaOp::ElementAddr {
            dest,
            base,
            indices,
        })
    }

    /// Emits `dest = *addr`.
    pub fn load(&mut self, name: &str, addr: SsaVarId) -> SsaVarId {
        let var_type = self
            .type_of(addr)
            .pointee()
            .cloned()
            .unwrap_or(SsaType::i32());
        self.emit(name, var_type, |dest| SsaOp::Load { dest, addr })
    }

    /// Emits `*addr = value`.
    pub fn store(&mut self, value: SsaVarId, addr: SsaVarId) {
        self.emit_void(SsaOp::Store { value, addr });
    }

    /// Emits a call without a result.
    pub fn call(&mut self, callee: &str, args: &[SsaVarId]) {
        self.emit_void(SsaOp::Call {
            dest: None,
            callee: callee.to_string(),
            args: args.to_vec(),
        });
    }

    /// Terminates the current block with an unconditional jump.
    pub fn jump(&mut self, target: usize) {
        self.emit_void(SsaOp::Jump { target });
    }

    /// Terminates the current block with a conditional branch.
    pub fn branch(&mut self, condition: SsaVarId, true_target: usize, false_target: usize) {
        self.emit_void(SsaOp::Branch {
            condition,
            true_target,
            false_target,
        });
    }

    /// Terminates the current block with a return.
    pub fn ret(&mut self, value: Option<SsaVarId>) {
        self.emit_void(SsaOp::Return { value });
    }

    /// Validates the function and returns it.
    ///
    /// # Errors
    ///
    /// - [`Error::MissingTerminator`] if a block does not end in a terminator
    /// - [`Error::UnknownValue`] if an operand names a value that does not exist
    /// - [`Error::UnknownBlock`] if a branch target or phi predecessor does not exist
    /// - [`Error::Malformed`] for misplaced terminators, phi operands arriving from a
    ///   block that is not a predecessor, or misuse of the builder
    pub fn finish(self) -> Result<SsaFunction> {
        if let Some(error) = self.pending_error {
            return Err(error);
        }

        let block_count = self.blocks.len();
        let value_count = self.variables.len();
        let check_value = |id: SsaVarId| {
            if id.index() < value_count {
                Ok(())
            } else {
                Err(Error::UnknownValue(id))
            }
        };

        let mut predecessors = vec![Vec::new(); block_count];
        for block in &self.blocks {
            let instructions = block.instructions();
            match instructions.last() {
                Some(last) if last.is_terminator() => {}
                _ => return Err(Error::MissingTerminator(block.id())),
            }
            if instructions[..instructions.len() - 1]
                .iter()
                .any(SsaOp::is_terminator)
            {
                return Err(malformed_error!(
                    "block B{} has a terminator before its last instruction",
                    block.id()
                ));
            }

            for op in instructions {
                op.uses().into_iter().try_for_each(check_value)?;
                for succ in op.successors() {
                    if succ >= block_count {
                        return Err(Error::UnknownBlock(succ));
                    }
                    if !predecessors[succ].contains(&block.id()) {
                        predecessors[succ].push(block.id());
                    }
                }
            }
        }

        for block in &self.blocks {
            for phi in block.phi_nodes() {
                for operand in phi.operands() {
                    check_value(operand.value())?;
                    if operand.predecessor() >= block_count {
                        return Err(Error::UnknownBlock(operand.predecessor()));
                    }
                    if !predecessors[block.id()].contains(&operand.predecessor()) {
                        return Err(malformed_error!(
                            "phi {} in B{} has an operand from B{}, which is not a predecessor",
                            phi.result(),
                            block.id(),
                            operand.predecessor()
                        ));
                    }
                }
            }
        }

        Ok(SsaFunction::new(self.name, self.blocks, self.variables))
    }
}
