use thiserror::Error;

use crate::analysis::SsaVarId;

macro_rules! malformed_error {
    // Single string version
    ($msg:expr) => {
        crate::Error::Malformed {
            message: $msg.to_string(),
            file: file!(),
            line: line!(),
        }
    };

    // Format string with arguments version
    ($fmt:expr, $($arg:tt)*) => {
        crate::Error::Malformed {
            message: format!($fmt, $($arg)*),
            file: file!(),
            line: line!(),
        }
    };
}

pub(crate) use malformed_error;

/// The generic Error type, which provides coverage for all errors this library can potentially
/// return.
///
/// Loop characterization is best-effort: the analysis itself degrades a single loop's result
/// instead of failing a whole function. Errors therefore surface in two places only:
///
/// ## Construction Errors
/// - [`Error::Malformed`] - IR that violates a structural precondition
/// - [`Error::UnknownValue`] - An operand refers to a value that does not exist
/// - [`Error::UnknownBlock`] - A branch or phi refers to a block that does not exist
/// - [`Error::MissingTerminator`] - A block does not end in a terminator
///
/// ## Configuration Errors
/// - [`Error::InvalidOption`] - A report section name could not be parsed
///
/// # Examples
///
/// ```rust
/// use loopstat::{analysis::FunctionBuilder, Error};
///
/// let mut builder = FunctionBuilder::new("empty");
/// builder.block();
///
/// match builder.finish() {
///     Err(Error::MissingTerminator(block)) => assert_eq!(block, 0),
///     other => panic!("unexpected: {other:?}"),
/// }
/// ```
#[derive(Error, Debug)]
pub enum Error {
    /// The IR is damaged and could not be analyzed.
    ///
    /// The error includes the source location where the malformation was detected
    /// for debugging purposes.
    ///
    /// # Fields
    ///
    /// * `message` - Detailed description of what was malformed
    /// * `file` - Source file where the error was detected
    /// * `line` - Source line where the error was detected
    #[error("Malformed - {file}:{line}: {message}")]
    Malformed {
        /// The message to be printed for the Malformed error
        message: String,
        /// The source file in which this error occured
        file: &'static str,
        /// The source line in which this error occured
        line: u32,
    },

    /// An operand refers to a value that is not part of the function.
    #[error("Reference to unknown value - {0}")]
    UnknownValue(SsaVarId),

    /// A branch target or phi predecessor refers to a block that is not part of the function.
    #[error("Reference to unknown block - B{0}")]
    UnknownBlock(usize),

    /// A block does not end with a terminator instruction.
    #[error("Block B{0} has no terminator")]
    MissingTerminator(usize),

    /// A report option could not be parsed.
    #[error("Unknown report section - {0}")]
    InvalidOption(String),

    /// Generic error for miscellaneous failures.
    #[error("{0}")]
    Error(String),
}
