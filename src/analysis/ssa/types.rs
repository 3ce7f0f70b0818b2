//! SSA type system.
//!
//! Types describe the shape of SSA values closely enough for loop characterization:
//! integer widths for index arithmetic, pointer and array nesting for element-address
//! computations, and the non-scalar kinds (labels, functions, metadata) that the
//! scalar-operand diagnostics must skip.
//!
//! Types render in the familiar LLVM textual form so report strings such as
//! `[100 x [100 x i32]]` read the same as the compiler's own dumps.

use std::fmt;

/// The type of an SSA value.
///
/// # Examples
///
/// ```rust
/// use loopstat::analysis::SsaType;
///
/// let matrix = SsaType::array(64, SsaType::array(32, SsaType::Double));
/// assert_eq!(matrix.to_string(), "[64 x [32 x double]]");
/// assert_eq!(matrix.array_dimensions(), 2);
/// assert_eq!(matrix.array_base_type(), &SsaType::Double);
///
/// let ptr = SsaType::pointer(matrix);
/// assert_eq!(ptr.to_string(), "[64 x [32 x double]]*");
/// assert!(!ptr.is_scalar());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SsaType {
    /// No value (stores, branches, calls without a result).
    Void,
    /// Integer of the given bit width (`i1` for comparison results).
    Int(u16),
    /// 32-bit IEEE float.
    Float,
    /// 64-bit IEEE float.
    Double,
    /// Pointer to a value of the inner type.
    Pointer(Box<SsaType>),
    /// Fixed-length array of the inner type.
    Array(u64, Box<SsaType>),
    /// Basic block label.
    Label,
    /// Function type.
    Function,
    /// Metadata operand.
    Metadata,
}

impl SsaType {
    /// The `i1` boolean type produced by comparisons.
    #[must_use]
    pub const fn bool() -> Self {
        Self::Int(1)
    }

    /// The `i32` type.
    #[must_use]
    pub const fn i32() -> Self {
        Self::Int(32)
    }

    /// The `i64` type.
    #[must_use]
    pub const fn i64() -> Self {
        Self::Int(64)
    }

    /// Creates a pointer to `pointee`.
    #[must_use]
    pub fn pointer(pointee: SsaType) -> Self {
        Self::Pointer(Box::new(pointee))
    }

    /// Creates an array of `len` elements of type `element`.
    #[must_use]
    pub fn array(len: u64, element: SsaType) -> Self {
        Self::Array(len, Box::new(element))
    }

    /// Returns `true` for integer types.
    #[must_use]
    pub const fn is_integer(&self) -> bool {
        matches!(self, Self::Int(_))
    }

    /// Returns `true` for pointer types.
    #[must_use]
    pub const fn is_pointer(&self) -> bool {
        matches!(self, Self::Pointer(_))
    }

    /// Returns `true` for array types.
    #[must_use]
    pub const fn is_array(&self) -> bool {
        matches!(self, Self::Array(..))
    }

    /// Returns `true` if values of this type count as scalar operands.
    ///
    /// Labels, arrays, pointers, functions and metadata are not scalars.
    #[must_use]
    pub const fn is_scalar(&self) -> bool {
        !matches!(
            self,
            Self::Label | Self::Array(..) | Self::Pointer(_) | Self::Function | Self::Metadata
        )
    }

    /// Returns the pointed-to type for pointers.
    #[must_use]
    pub fn pointee(&self) -> Option<&SsaType> {
        match self {
            Self::Pointer(inner) => Some(inner),
            _ => None,
        }
    }

    /// Returns the element type for arrays.
    #[must_use]
    pub fn element(&self) -> Option<&SsaType> {
        match self {
            Self::Array(_, inner) => Some(inner),
            _ => None,
        }
    }

    /// Returns the number of nested array levels (0 for non-arrays).
    #[must_use]
    pub fn array_dimensions(&self) -> usize {
        let mut dims = 0;
        let mut current = self;
        while let Self::Array(_, inner) = current {
            dims += 1;
            current = inner;
        }
        dims
    }

    /// Returns the innermost non-array type.
    #[must_use]
    pub fn array_base_type(&self) -> &SsaType {
        let mut current = self;
        while let Self::Array(_, inner) = current {
            current = inner;
        }
        current
    }
}

impl fmt::Display for SsaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Void => write!(f, "void"),
            Self::Int(bits) => write!(f, "i{bits}"),
            Self::Float => write!(f, "float"),
            Self::Double => write!(f, "double"),
            Self::Pointer(inner) => write!(f, "{inner}*"),
            Self::Array(len, inner) => write!(f, "[{len} x {inner}]"),
            Self::Label => write!(f, "label"),
            Self::Function => write!(f, "fn"),
            Self::Metadata => write!(f, "metadata"),
        }
    }
}
