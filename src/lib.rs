// Copyright 2025 Johann Kempter
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//
// SPDX-License-Identifier: Apache-2.0

#![doc(html_no_source)]
#![deny(missing_docs)]
#![allow(dead_code)]
#![deny(unsafe_code)]

//! # loopstat
//!
//! Static characterization of loop nests in SSA functions.
//!
//! `loopstat` walks the natural loops of a function and reports, per outermost loop and
//! per immediately nested loop:
//!
//! - **Array references** - which arrays are accessed, how often, and their shapes
//! - **Index patterns** - linear, constant-shifted, parametric-shifted and skewed indices
//! - **Operators** - binary operator frequencies and data-dependent conditionals
//! - **Bounds** - initial, step and final value of the induction variable plus direction
//! - **Nest shape** - triangular versus rectangular nests, and tight nesting
//!
//! Totals across the function (disjoint, nested, triangular and rectangular loops plus the
//! average nest depth) close every report.
//!
//! ## Quick Start
//!
//! ```rust
//! use loopstat::prelude::*;
//!
//! let mut b = FunctionBuilder::new("fill");
//! let n = b.argument("n", SsaType::i32());
//! let arr = b.global("A", SsaType::array(100, SsaType::i32()));
//! let zero = b.const_i32(0);
//! let one = b.const_i32(1);
//! let (entry, body, exit) = (b.block(), b.block(), b.block());
//!
//! b.switch_to(entry);
//! b.jump(body);
//! b.switch_to(body);
//! let i = b.phi("i", SsaType::i32());
//! let idx = b.cast("idx", CastKind::SExt, i, SsaType::i64());
//! let slot = b.element_addr("slot", arr, &[zero, idx]);
//! b.store(zero, slot);
//! let inc = b.binary("inc", BinaryOp::Add, i, one);
//! let cond = b.cmp("cond", CmpPredicate::Slt, inc, n);
//! b.branch(cond, body, exit);
//! b.add_phi_operand(i, zero, entry);
//! b.add_phi_operand(i, inc, body);
//! b.switch_to(exit);
//! b.ret(None);
//!
//! let report = analyze_function(&b.finish()?, "arr-ref".parse()?);
//! assert_eq!(report.summary.disjoint_loops, 1);
//! assert!(report.to_string().contains("A : 1 : [100 x i32]"));
//! # Ok::<(), loopstat::Error>(())
//! ```
//!
//! ## Architecture
//!
//! - [`analysis`] - SSA representation, loop detection and scalar evolution
//! - [`stats`] - The per-loop statistics, the loop walker and reports
//! - [`utils`] - Graph primitives and dominator trees
//! - [`prelude`] - Convenient re-exports of commonly used types
//! - [`Error`] and [`Result`] - Error handling
//!
//! ## Scalar Evolution
//!
//! Bounds and nest shapes are derived through the [`analysis::ScalarEvolution`] trait.
//! [`analysis::AffineEvolution`] is the built-in provider; a different provider can be
//! passed to [`stats::analyze_with`].
//!
//! ## Logging
//!
//! The crate logs through the [`log`] facade. Degraded results (a loop whose references
//! could not be collected, a nested loop without an induction variable) are reported at
//! `warn`, per-loop progress at `debug` and per-operand detail at `trace`.

#[macro_use]
pub(crate) mod error;

/// Shared functionality which is used in unit- and integration-tests
#[cfg(test)]
pub(crate) mod test;

pub mod analysis;
pub mod prelude;
pub mod stats;
pub mod utils;

/// `loopstat` Result type
///
/// A type alias for [`std::result::Result<T, Error>`] where the error type is always [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// `loopstat` Error type
///
/// See the variant documentation for the failure cases.
pub use error::Error;
