//! Fixture kernels shared by the unit tests.
//!
//! Each fixture builds a small function shaped the way an optimizing front end lowers
//! array loops: loops are rotated (the latch tests the updated counter and branches back
//! to the header) unless the fixture says otherwise, and array element addresses index
//! through a leading zero. Blocks and values a test wants to look at are recorded by name
//! on the returned [`Kernel`].

use std::collections::HashMap;

use crate::{
    analysis::{BinaryOp, CastKind, CmpPredicate, FunctionBuilder, SsaFunction, SsaType, SsaVarId},
    Error, Result,
};

/// A fixture function plus the blocks and values tests refer to.
pub struct Kernel {
    pub func: SsaFunction,
    /// Entry block.
    pub entry: usize,
    /// Header of the first (outermost) loop.
    pub header: usize,
    /// Latch of the first (outermost) loop.
    pub latch: usize,
    /// Block the first loop exits to.
    pub exit: usize,
    blocks: HashMap<&'static str, usize>,
    values: HashMap<&'static str, SsaVarId>,
}

impl Kernel {
    fn new(func: SsaFunction, entry: usize, header: usize, latch: usize, exit: usize) -> Self {
        Kernel {
            func,
            entry,
            header,
            latch,
            exit,
            blocks: HashMap::new(),
            values: HashMap::new(),
        }
    }

    fn with_blocks(mut self, blocks: &[(&'static str, usize)]) -> Self {
        self.blocks.extend(blocks.iter().copied());
        self
    }

    fn with_values(mut self, values: &[(&'static str, SsaVarId)]) -> Self {
        self.values.extend(values.iter().copied());
        self
    }

    /// Returns a named block; panics if the fixture did not record it.
    pub fn block(&self, name: &str) -> usize {
        match self.blocks.get(name) {
            Some(block) => *block,
            None => panic!("fixture has no block named {name}"),
        }
    }

    /// Returns a named value; panics if the fixture did not record it.
    pub fn value(&self, name: &str) -> SsaVarId {
        match self.values.get(name) {
            Some(value) => *value,
            None => panic!("fixture has no value named {name}"),
        }
    }
}

fn array_1d() -> SsaType {
    SsaType::array(100, SsaType::i32())
}

fn array_2d(element: SsaType) -> SsaType {
    SsaType::array(64, SsaType::array(64, element))
}

/// Straight-line code: `return a + 1`.
pub fn fixture_no_loops() -> Result<Kernel> {
    let mut b = FunctionBuilder::new("no_loops");
    let a = b.argument("a", SsaType::i32());
    let one = b.const_i32(1);
    let entry = b.block();
    b.switch_to(entry);
    let x = b.binary("x", BinaryOp::Add, a, one);
    b.ret(Some(x));

    Ok(Kernel::new(b.finish()?, entry, entry, entry, entry).with_values(&[("a", a), ("x", x)]))
}

/// `for (i = 0; i < n; i++) {}` left unrotated: the header tests, the latch jumps back.
pub fn fixture_empty_loop() -> Result<Kernel> {
    let mut b = FunctionBuilder::new("empty_loop");
    let n = b.argument("n", SsaType::i32());
    let zero = b.const_i32(0);
    let one = b.const_i32(1);
    let entry = b.block();
    let header = b.block();
    let latch = b.block();
    let exit = b.block();

    b.switch_to(entry);
    b.jump(header);

    b.switch_to(header);
    let i = b.phi("i", SsaType::i32());
    let cond = b.cmp("cond", CmpPredicate::Slt, i, n);
    b.branch(cond, latch, exit);

    b.switch_to(latch);
    let inc = b.binary("inc", BinaryOp::Add, i, one);
    b.jump(header);

    b.add_phi_operand(i, zero, entry);
    b.add_phi_operand(i, inc, latch);

    b.switch_to(exit);
    b.ret(None);

    Ok(Kernel::new(b.finish()?, entry, header, latch, exit).with_values(&[
        ("n", n),
        ("i", i),
        ("inc", inc),
        ("cond", cond),
    ]))
}

/// One rotated loop: `B[i + m] = A[i] + A[i + 1]`.
pub fn fixture_stencil() -> Result<Kernel> {
    let mut b = FunctionBuilder::new("stencil");
    let n = b.argument("n", SsaType::i32());
    let m = b.argument("m", SsaType::i32());
    let arr_a = b.global("A", array_1d());
    let arr_b = b.global("B", array_1d());
    let zero = b.const_i32(0);
    let one = b.const_i32(1);
    let entry = b.block();
    let body = b.block();
    let exit = b.block();

    b.switch_to(entry);
    b.jump(body);

    b.switch_to(body);
    let i = b.phi("i", SsaType::i32());
    let ia = b.cast("idx.a", CastKind::SExt, i, SsaType::i64());
    let pa = b.element_addr("pa", arr_a, &[zero, ia]);
    let a = b.load("a", pa);
    let ip1 = b.binary("ip1", BinaryOp::Add, i, one);
    let ib = b.cast("idx.b", CastKind::SExt, ip1, SsaType::i64());
    let pb = b.element_addr("pb", arr_a, &[zero, ib]);
    let a_next = b.load("a.next", pb);
    let sum = b.binary("sum", BinaryOp::Add, a, a_next);
    let im = b.binary("im", BinaryOp::Add, i, m);
    let ic = b.cast("idx.c", CastKind::SExt, im, SsaType::i64());
    let pc = b.element_addr("pc", arr_b, &[zero, ic]);
    b.store(sum, pc);
    let inc = b.binary("inc", BinaryOp::Add, i, one);
    let cond = b.cmp("cond", CmpPredicate::Slt, inc, n);
    b.branch(cond, body, exit);

    b.add_phi_operand(i, zero, entry);
    b.add_phi_operand(i, inc, body);

    b.switch_to(exit);
    b.ret(None);

    Ok(Kernel::new(b.finish()?, entry, body, body, exit).with_values(&[
        ("n", n),
        ("m", m),
        ("A", arr_a),
        ("B", arr_b),
        ("zero", zero),
        ("one", one),
        ("i", i),
        ("inc", inc),
        ("cond", cond),
        ("sum", sum),
    ]))
}

/// A rotated loop with an `if` in its body: `if (A[i] > 0) A[i] = 0`.
pub fn fixture_conditional() -> Result<Kernel> {
    let mut b = FunctionBuilder::new("conditional");
    let n = b.argument("n", SsaType::i32());
    let arr_a = b.global("A", array_1d());
    let zero = b.const_i32(0);
    let one = b.const_i32(1);
    let entry = b.block();
    let header = b.block();
    let then = b.block();
    let latch = b.block();
    let exit = b.block();

    b.switch_to(entry);
    b.jump(header);

    b.switch_to(header);
    let i = b.phi("i", SsaType::i32());
    let pa = b.element_addr("pa", arr_a, &[zero, i]);
    let a = b.load("a", pa);
    let positive = b.cmp("positive", CmpPredicate::Sgt, a, zero);
    b.branch(positive, then, latch);

    b.switch_to(then);
    b.store(zero, pa);
    b.jump(latch);

    b.switch_to(latch);
    let inc = b.binary("inc", BinaryOp::Add, i, one);
    let cond = b.cmp("cond", CmpPredicate::Slt, inc, n);
    b.branch(cond, header, exit);

    b.add_phi_operand(i, zero, entry);
    b.add_phi_operand(i, inc, latch);

    b.switch_to(exit);
    b.ret(None);

    Ok(Kernel::new(b.finish()?, entry, header, latch, exit)
        .with_blocks(&[("then", then)])
        .with_values(&[("i", i), ("positive", positive), ("cond", cond)]))
}

/// `C[i][j] += A[i][k] * B[k][j]` over a rotated triple nest.
///
/// ```text
/// B0 entry        -> B1
/// B1 i header     -> B2              (preheader of the j loop)
/// B2 j header     -> B3              (preheader of the k loop)
/// B3 k body/latch -> B3 | B4
/// B4 j latch      -> B2 | B5
/// B5 i latch      -> B1 | B6
/// B6 exit
/// ```
pub fn fixture_matmul() -> Result<Kernel> {
    let mut b = FunctionBuilder::new("matmul");
    let n = b.argument("n", SsaType::i32());
    let arr_a = b.global("A", array_2d(SsaType::Double));
    let arr_b = b.global("B", array_2d(SsaType::Double));
    let arr_c = b.global("C", array_2d(SsaType::Double));
    let zero = b.const_i32(0);
    let one = b.const_i32(1);
    let entry = b.block();
    let i_header = b.block();
    let j_header = b.block();
    let k_body = b.block();
    let j_latch = b.block();
    let i_latch = b.block();
    let exit = b.block();

    b.switch_to(entry);
    b.jump(i_header);

    b.switch_to(i_header);
    let i = b.phi("i", SsaType::i32());
    b.jump(j_header);

    b.switch_to(j_header);
    let j = b.phi("j", SsaType::i32());
    let pc = b.element_addr("pc", arr_c, &[zero, i, j]);
    b.jump(k_body);

    b.switch_to(k_body);
    let k = b.phi("k", SsaType::i32());
    let pa = b.element_addr("pa", arr_a, &[zero, i, k]);
    let a = b.load("a", pa);
    let pb = b.element_addr("pb", arr_b, &[zero, k, j]);
    let bv = b.load("b", pb);
    let prod = b.binary("prod", BinaryOp::FMul, a, bv);
    let c = b.load("c", pc);
    let acc = b.binary("acc", BinaryOp::FAdd, c, prod);
    b.store(acc, pc);
    let k_inc = b.binary("k.inc", BinaryOp::Add, k, one);
    let kc = b.cmp("kc", CmpPredicate::Slt, k_inc, n);
    b.branch(kc, k_body, j_latch);

    b.switch_to(j_latch);
    let j_inc = b.binary("j.inc", BinaryOp::Add, j, one);
    let jc = b.cmp("jc", CmpPredicate::Slt, j_inc, n);
    b.branch(jc, j_header, i_latch);

    b.switch_to(i_latch);
    let i_inc = b.binary("i.inc", BinaryOp::Add, i, one);
    let ic = b.cmp("ic", CmpPredicate::Slt, i_inc, n);
    b.branch(ic, i_header, exit);

    b.add_phi_operand(i, zero, entry);
    b.add_phi_operand(i, i_inc, i_latch);
    b.add_phi_operand(j, zero, i_header);
    b.add_phi_operand(j, j_inc, j_latch);
    b.add_phi_operand(k, zero, j_header);
    b.add_phi_operand(k, k_inc, k_body);

    b.switch_to(exit);
    b.ret(None);

    Ok(Kernel::new(b.finish()?, entry, i_header, i_latch, exit)
        .with_blocks(&[
            ("i_header", i_header),
            ("j_header", j_header),
            ("k_body", k_body),
            ("j_latch", j_latch),
            ("i_latch", i_latch),
        ])
        .with_values(&[
            ("n", n),
            ("zero", zero),
            ("one", one),
            ("i", i),
            ("j", j),
            ("k", k),
            ("i.inc", i_inc),
            ("j.inc", j_inc),
            ("k.inc", k_inc),
            ("ic", ic),
            ("jc", jc),
            ("kc", kc),
        ]))
}

/// Shape of the inner loop built by [`fixture_two_level`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NestVariant {
    /// `for j in 0..n { A[i][j] = 1 }`
    Rectangular,
    /// `for j in i..n { A[i][j] = 1 }`
    TriangularStart,
    /// `for j in 0..i { A[i][j] = 1 }`
    TriangularBound,
    /// Rectangular, but the inner preheader reads memory.
    PreheaderLoad,
    /// `for j in 0..n { A[i][i + j] = 1 }`
    Skewed,
    /// Rectangular, with the latch testing `bound > j + 1` against a global.
    GlobalBound,
}

/// A two-level nest with a dedicated inner preheader and inner exit block.
///
/// ```text
/// B0 entry           -> B1
/// B1 outer header    -> B2
/// B2 inner preheader -> B3
/// B3 inner body      -> B3 | B4
/// B4 inner exit      -> B5
/// B5 outer latch     -> B1 | B6
/// B6 exit
/// ```
pub fn fixture_two_level(variant: NestVariant) -> Result<Kernel> {
    let mut b = FunctionBuilder::new("two_level");
    let n = b.argument("n", SsaType::i32());
    let arr_a = b.global("A", array_2d(SsaType::i32()));
    let scale = b.global("scale", SsaType::i32());
    let bound = (variant == NestVariant::GlobalBound).then(|| b.global("bound", SsaType::i32()));
    let zero = b.const_i32(0);
    let one = b.const_i32(1);
    let entry = b.block();
    let outer_header = b.block();
    let inner_preheader = b.block();
    let inner_header = b.block();
    let inner_exit = b.block();
    let outer_latch = b.block();
    let exit = b.block();

    b.switch_to(entry);
    b.jump(outer_header);

    b.switch_to(outer_header);
    let i = b.phi("i", SsaType::i32());
    b.jump(inner_preheader);

    b.switch_to(inner_preheader);
    if variant == NestVariant::PreheaderLoad {
        b.load("s", scale);
    }
    b.jump(inner_header);

    b.switch_to(inner_header);
    let j = b.phi("j", SsaType::i32());
    let index = if variant == NestVariant::Skewed {
        let ij = b.binary("ij", BinaryOp::Add, i, j);
        b.cast("idx", CastKind::SExt, ij, SsaType::i64())
    } else {
        j
    };
    let pa = b.element_addr("pa", arr_a, &[zero, i, index]);
    b.store(one, pa);
    let j_inc = b.binary("j.inc", BinaryOp::Add, j, one);
    let jc = match (variant, bound) {
        (NestVariant::TriangularBound, _) => b.cmp("jc", CmpPredicate::Slt, j_inc, i),
        (_, Some(bound)) => b.cmp("jc", CmpPredicate::Sgt, bound, j_inc),
        _ => b.cmp("jc", CmpPredicate::Slt, j_inc, n),
    };
    b.branch(jc, inner_header, inner_exit);

    b.switch_to(inner_exit);
    b.jump(outer_latch);

    b.switch_to(outer_latch);
    let i_inc = b.binary("i.inc", BinaryOp::Add, i, one);
    let ic = b.cmp("ic", CmpPredicate::Slt, i_inc, n);
    b.branch(ic, outer_header, exit);

    let start = if variant == NestVariant::TriangularStart {
        i
    } else {
        zero
    };
    b.add_phi_operand(i, zero, entry);
    b.add_phi_operand(i, i_inc, outer_latch);
    b.add_phi_operand(j, start, inner_preheader);
    b.add_phi_operand(j, j_inc, inner_header);

    b.switch_to(exit);
    b.ret(None);

    Ok(Kernel::new(b.finish()?, entry, outer_header, outer_latch, exit)
        .with_blocks(&[
            ("outer_header", outer_header),
            ("inner_preheader", inner_preheader),
            ("inner_header", inner_header),
            ("inner_exit", inner_exit),
            ("outer_latch", outer_latch),
        ])
        .with_values(&[
            ("n", n),
            ("zero", zero),
            ("one", one),
            ("i", i),
            ("j", j),
            ("j.inc", j_inc),
            ("jc", jc),
        ]))
}

/// Inner loop latch shapes built by [`fixture_inner_latch`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InnerLatch {
    /// Header tests `j < n`, the body jumps back unconditionally.
    Unrotated,
    /// Latch branches on the `flag` argument.
    FlagCondition,
    /// Latch compares `i < n`, which involves no inner counter.
    UnrelatedCompare,
    /// Two blocks branch back to the inner header.
    TwoLatches,
}

/// `for i in 0..n { for j in 0..n { } }` with the inner latch shaped by `kind`.
///
/// ```text
/// B0 entry           -> B1
/// B1 outer header    -> B2
/// B2 inner preheader -> B3
/// B3 inner header    -> inner blocks
/// B4 inner exit      -> B5
/// B5 outer latch     -> B1 | B6
/// B6 exit
/// ```
pub fn fixture_inner_latch(kind: InnerLatch) -> Result<Kernel> {
    let mut b = FunctionBuilder::new("inner_latch");
    let n = b.argument("n", SsaType::i32());
    let flag = b.argument("flag", SsaType::bool());
    let zero = b.const_i32(0);
    let one = b.const_i32(1);
    let entry = b.block();
    let outer_header = b.block();
    let inner_preheader = b.block();
    let inner_header = b.block();
    let inner_exit = b.block();
    let outer_latch = b.block();
    let exit = b.block();

    b.switch_to(entry);
    b.jump(outer_header);

    b.switch_to(outer_header);
    let i = b.phi("i", SsaType::i32());
    b.jump(inner_preheader);

    b.switch_to(inner_preheader);
    b.jump(inner_header);

    b.switch_to(inner_header);
    let j = b.phi("j", SsaType::i32());
    let (j_inc, back_edges) = match kind {
        InnerLatch::Unrotated => {
            let body = b.block();
            let jc = b.cmp("jc", CmpPredicate::Slt, j, n);
            b.branch(jc, body, inner_exit);
            b.switch_to(body);
            let j_inc = b.binary("j.inc", BinaryOp::Add, j, one);
            b.jump(inner_header);
            (j_inc, vec![body])
        }
        InnerLatch::FlagCondition => {
            let j_inc = b.binary("j.inc", BinaryOp::Add, j, one);
            b.branch(flag, inner_header, inner_exit);
            (j_inc, vec![inner_header])
        }
        InnerLatch::UnrelatedCompare => {
            let j_inc = b.binary("j.inc", BinaryOp::Add, j, one);
            let jc = b.cmp("jc", CmpPredicate::Slt, i, n);
            b.branch(jc, inner_header, inner_exit);
            (j_inc, vec![inner_header])
        }
        InnerLatch::TwoLatches => {
            let left = b.block();
            let right = b.block();
            let j_inc = b.binary("j.inc", BinaryOp::Add, j, one);
            b.branch(flag, left, right);
            b.switch_to(left);
            b.jump(inner_header);
            b.switch_to(right);
            let jc = b.cmp("jc", CmpPredicate::Slt, j_inc, n);
            b.branch(jc, inner_header, inner_exit);
            (j_inc, vec![left, right])
        }
    };

    b.switch_to(inner_exit);
    b.jump(outer_latch);

    b.switch_to(outer_latch);
    let i_inc = b.binary("i.inc", BinaryOp::Add, i, one);
    let ic = b.cmp("ic", CmpPredicate::Slt, i_inc, n);
    b.branch(ic, outer_header, exit);

    b.add_phi_operand(i, zero, entry);
    b.add_phi_operand(i, i_inc, outer_latch);
    b.add_phi_operand(j, zero, inner_preheader);
    for from in back_edges {
        b.add_phi_operand(j, j_inc, from);
    }

    b.switch_to(exit);
    b.ret(None);

    Ok(Kernel::new(b.finish()?, entry, outer_header, outer_latch, exit)
        .with_blocks(&[
            ("outer_header", outer_header),
            ("inner_preheader", inner_preheader),
            ("inner_header", inner_header),
        ])
        .with_values(&[("i", i), ("j", j), ("j.inc", j_inc)]))
}

/// A function whose operand graph loops back on itself: `a = c + x; c = a + 1`.
///
/// `a` refers to `c` ahead of its definition, which well-formed SSA outside a phi never
/// does. Straight-line, no loops.
pub fn fixture_operand_cycle() -> Result<Kernel> {
    let mut b = FunctionBuilder::new("operand_cycle");
    let x = b.argument("x", SsaType::i32());
    let one = b.const_i32(1);
    let entry = b.block();

    b.switch_to(entry);
    let ahead = SsaVarId::new(one.index() + 2);
    let a = b.binary("a", BinaryOp::Add, ahead, x);
    let c = b.binary("c", BinaryOp::Add, a, one);
    if c != ahead {
        return Err(Error::Error(format!("expected {ahead:?} for c, allocated {c:?}")));
    }
    b.ret(Some(c));

    Ok(Kernel::new(b.finish()?, entry, entry, entry, entry)
        .with_values(&[("x", x), ("a", a), ("c", c)]))
}

/// A rotated loop counting down: `for (i = n; i > 0; i--)`.
pub fn fixture_decreasing() -> Result<Kernel> {
    let mut b = FunctionBuilder::new("decreasing");
    let n = b.argument("n", SsaType::i32());
    let zero = b.const_i32(0);
    let one = b.const_i32(1);
    let entry = b.block();
    let body = b.block();
    let exit = b.block();

    b.switch_to(entry);
    b.jump(body);

    b.switch_to(body);
    let i = b.phi("i", SsaType::i32());
    let dec = b.binary("dec", BinaryOp::Sub, i, one);
    let cond = b.cmp("cond", CmpPredicate::Sgt, dec, zero);
    b.branch(cond, body, exit);

    b.add_phi_operand(i, n, entry);
    b.add_phi_operand(i, dec, body);

    b.switch_to(exit);
    b.ret(None);

    Ok(Kernel::new(b.finish()?, entry, body, body, exit).with_values(&[
        ("n", n),
        ("zero", zero),
        ("i", i),
        ("dec", dec),
    ]))
}

/// One outer loop holding two sequential inner loops; the second runs `0..i`.
///
/// ```text
/// B0 entry        -> B1
/// B1 outer header -> B2
/// B2 first inner  -> B2 | B3
/// B3 second inner -> B3 | B4
/// B4 outer latch  -> B1 | B5
/// B5 exit
/// ```
pub fn fixture_two_children() -> Result<Kernel> {
    let mut b = FunctionBuilder::new("two_children");
    let n = b.argument("n", SsaType::i32());
    let zero = b.const_i32(0);
    let one = b.const_i32(1);
    let entry = b.block();
    let outer_header = b.block();
    let first = b.block();
    let second = b.block();
    let outer_latch = b.block();
    let exit = b.block();

    b.switch_to(entry);
    b.jump(outer_header);

    b.switch_to(outer_header);
    let i = b.phi("i", SsaType::i32());
    b.jump(first);

    b.switch_to(first);
    let j = b.phi("j", SsaType::i32());
    let j_inc = b.binary("j.inc", BinaryOp::Add, j, one);
    let jc = b.cmp("jc", CmpPredicate::Slt, j_inc, n);
    b.branch(jc, first, second);

    b.switch_to(second);
    let k = b.phi("k", SsaType::i32());
    let k_inc = b.binary("k.inc", BinaryOp::Add, k, one);
    let kc = b.cmp("kc", CmpPredicate::Slt, k_inc, i);
    b.branch(kc, second, outer_latch);

    b.switch_to(outer_latch);
    let i_inc = b.binary("i.inc", BinaryOp::Add, i, one);
    let ic = b.cmp("ic", CmpPredicate::Slt, i_inc, n);
    b.branch(ic, outer_header, exit);

    b.add_phi_operand(i, zero, entry);
    b.add_phi_operand(i, i_inc, outer_latch);
    b.add_phi_operand(j, zero, outer_header);
    b.add_phi_operand(j, j_inc, first);
    b.add_phi_operand(k, zero, first);
    b.add_phi_operand(k, k_inc, second);

    b.switch_to(exit);
    b.ret(None);

    Ok(Kernel::new(b.finish()?, entry, outer_header, outer_latch, exit)
        .with_blocks(&[
            ("outer_header", outer_header),
            ("first", first),
            ("second", second),
            ("outer_latch", outer_latch),
        ])
        .with_values(&[("i", i), ("j", j), ("k", k)]))
}

/// Two rotated loops one after the other.
pub fn fixture_disjoint() -> Result<Kernel> {
    let mut b = FunctionBuilder::new("disjoint");
    let n = b.argument("n", SsaType::i32());
    let zero = b.const_i32(0);
    let one = b.const_i32(1);
    let entry = b.block();
    let first = b.block();
    let second = b.block();
    let exit = b.block();

    b.switch_to(entry);
    b.jump(first);

    b.switch_to(first);
    let i = b.phi("i", SsaType::i32());
    let i_inc = b.binary("i.inc", BinaryOp::Add, i, one);
    let ic = b.cmp("ic", CmpPredicate::Slt, i_inc, n);
    b.branch(ic, first, second);

    b.switch_to(second);
    let j = b.phi("j", SsaType::i32());
    let j_inc = b.binary("j.inc", BinaryOp::Add, j, one);
    let jc = b.cmp("jc", CmpPredicate::Slt, j_inc, n);
    b.branch(jc, second, exit);

    b.add_phi_operand(i, zero, entry);
    b.add_phi_operand(i, i_inc, first);
    b.add_phi_operand(j, zero, first);
    b.add_phi_operand(j, j_inc, second);

    b.switch_to(exit);
    b.ret(None);

    Ok(Kernel::new(b.finish()?, entry, first, first, second)
        .with_blocks(&[("first", first), ("second", second)])
        .with_values(&[("i", i), ("j", j)]))
}

/// A rotated loop holding an element address with no indices.
pub fn fixture_malformed_gep() -> Result<Kernel> {
    let mut b = FunctionBuilder::new("malformed_gep");
    let n = b.argument("n", SsaType::i32());
    let arr_a = b.global("A", array_1d());
    let zero = b.const_i32(0);
    let one = b.const_i32(1);
    let entry = b.block();
    let body = b.block();
    let exit = b.block();

    b.switch_to(entry);
    b.jump(body);

    b.switch_to(body);
    let i = b.phi("i", SsaType::i32());
    let whole = b.element_addr("whole", arr_a, &[]);
    b.load("w", whole);
    let inc = b.binary("inc", BinaryOp::Add, i, one);
    let cond = b.cmp("cond", CmpPredicate::Slt, inc, n);
    b.branch(cond, body, exit);

    b.add_phi_operand(i, zero, entry);
    b.add_phi_operand(i, inc, body);

    b.switch_to(exit);
    b.ret(None);

    Ok(Kernel::new(b.finish()?, entry, body, body, exit).with_values(&[("i", i)]))
}
