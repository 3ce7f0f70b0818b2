//! Static Single Assignment (SSA) form for loop analysis.
//!
//! This module is the IR the loop characterization reads. Every value is assigned
//! exactly once, cyclic values at loop headers are explicit phi nodes, and each value
//! knows its type, its definition site and its users.
//!
//! # Architecture
//!
//! - `variable` - SSA value identifiers, origins and def/use sites
//! - `phi` - Phi node representation for control flow merges
//! - `block` - SSA basic blocks containing phi nodes and instructions
//! - `function` - Complete SSA function with its def-use index
//! - `builder` - Validated programmatic construction
//! - `cfg` - Graph-trait view over block terminators
//! - `types` - LLVM-style type system
//! - `value` - Constants and the closed value-kind view
//! - `ops` - SSA operations and their effects
//!
//! # Usage
//!
//! ```rust
//! use loopstat::analysis::{FunctionBuilder, SsaType};
//!
//! let mut b = FunctionBuilder::new("id");
//! let x = b.argument("x", SsaType::i32());
//! let entry = b.block();
//! b.switch_to(entry);
//! b.ret(Some(x));
//! let func = b.finish()?;
//!
//! for block in func.blocks() {
//!     for phi in block.phi_nodes() {
//!         println!("Phi: {phi}");
//!     }
//! }
//! # Ok::<(), loopstat::Error>(())
//! ```

mod block;
mod builder;
mod cfg;
mod function;
mod ops;
mod phi;
mod types;
mod value;
mod variable;

pub use block::SsaBlock;
pub use builder::FunctionBuilder;
pub use cfg::SsaCfg;
pub use function::SsaFunction;
pub use ops::{BinaryOp, CastKind, CmpPredicate, OpEffects, SsaOp};
pub use phi::{PhiNode, PhiOperand};
pub use types::SsaType;
pub use value::{ConstValue, ValueKind};
pub use variable::{DefSite, SsaVarId, SsaVariable, UseSite, VariableOrigin};
