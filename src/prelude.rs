//! # loopstat Prelude
//!
//! This module provides a convenient prelude for the most commonly used types and traits
//! from the loopstat library. Import this module to get quick access to the essential
//! types for building SSA functions and analyzing their loop nests.

// ================================================================================================
// Core Types and Error Handling
// ================================================================================================

/// The main error type for all loopstat operations
pub use crate::Error;

/// The result type used throughout loopstat
pub use crate::Result;

// ================================================================================================
// Main Entry Points
// ================================================================================================

/// Whole-function and whole-module analysis
pub use crate::stats::{analyze_function, analyze_module, analyze_with};

/// Report types and section selection
pub use crate::stats::{AggregateStats, FunctionReport, ReportOptions, ReportSection};

// ================================================================================================
// SSA Construction
// ================================================================================================

/// Function construction and instruction vocabulary
pub use crate::analysis::{
    BinaryOp, CastKind, CmpPredicate, FunctionBuilder, SsaFunction, SsaType, SsaVarId,
};

// ================================================================================================
// Loop Structure and Scalar Evolution
// ================================================================================================

/// Loop detection
pub use crate::analysis::{detect_loops, LoopForest, LoopInfo, SsaCfg};

/// Scalar evolution providers
pub use crate::analysis::{AffineEvolution, Direction, ScalarEvolution};
