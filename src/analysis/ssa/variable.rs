//! SSA value identifiers and metadata.
//!
//! Every value an instruction can read has an entry in the function's value table:
//! arguments, named globals, constants, phi results and instruction results. A value is
//! identified by a plain index ([`SsaVarId`]); everything else about it lives in
//! [`SsaVariable`].
//!
//! # Value Origins
//!
//! | Origin | Defined by | Def site |
//! |--------|------------|----------|
//! | [`VariableOrigin::Argument`] | the caller | none |
//! | [`VariableOrigin::Global`] | the enclosing module | none |
//! | [`VariableOrigin::Constant`] | the value table itself | none |
//! | [`VariableOrigin::Phi`] | a phi node at block entry | `DefSite::phi` |
//! | [`VariableOrigin::Instruction`] | an instruction result | `DefSite::instruction` |

use std::fmt;

use crate::analysis::ssa::{ConstValue, SsaType};

/// Unique identifier for an SSA value.
///
/// The identifier is unique within a single [`SsaFunction`](crate::analysis::SsaFunction)
/// but not across functions.
///
/// # Examples
///
/// ```rust
/// use loopstat::analysis::SsaVarId;
///
/// let id = SsaVarId::new(42);
/// assert_eq!(id.index(), 42);
/// assert_eq!(id.to_string(), "v42");
/// ```
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize)]
#[serde(transparent)]
pub struct SsaVarId(usize);

impl SsaVarId {
    /// Creates a new SSA value identifier.
    ///
    /// # Arguments
    ///
    /// * `index` - The index into the value table
    #[must_use]
    pub const fn new(index: usize) -> Self {
        Self(index)
    }

    /// Returns the underlying index.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }
}

impl fmt::Debug for SsaVarId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}", self.0)
    }
}

impl fmt::Display for SsaVarId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}", self.0)
    }
}

/// Where an SSA value comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VariableOrigin {
    /// Function argument at the given position.
    Argument(u16),
    /// Module-level global (typically an array).
    Global,
    /// Compile-time constant.
    Constant,
    /// Result of a phi node.
    Phi,
    /// Result of a regular instruction.
    Instruction,
}

impl VariableOrigin {
    /// Returns `true` if this is an argument origin.
    #[must_use]
    pub const fn is_argument(&self) -> bool {
        matches!(self, Self::Argument(_))
    }

    /// Returns `true` if this is a constant.
    #[must_use]
    pub const fn is_constant(&self) -> bool {
        matches!(self, Self::Constant)
    }

    /// Returns `true` if this is a phi node result.
    #[must_use]
    pub const fn is_phi(&self) -> bool {
        matches!(self, Self::Phi)
    }

    /// Returns `true` for values that exist before any block executes.
    #[must_use]
    pub const fn is_external(&self) -> bool {
        matches!(self, Self::Argument(_) | Self::Global | Self::Constant)
    }
}

impl fmt::Display for VariableOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Argument(idx) => write!(f, "arg{idx}"),
            Self::Global => write!(f, "global"),
            Self::Constant => write!(f, "const"),
            Self::Phi => write!(f, "phi"),
            Self::Instruction => write!(f, "inst"),
        }
    }
}

/// Definition site of an SSA value.
///
/// For phi results `instruction` is `None`: phi nodes are defined at the top of the
/// block, before any real instruction executes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DefSite {
    /// The block where this value is defined.
    pub block: usize,
    /// The instruction index within the block, or `None` for phi nodes.
    pub instruction: Option<usize>,
}

impl DefSite {
    /// Creates a definition site for a regular instruction.
    #[must_use]
    pub const fn instruction(block: usize, instr_idx: usize) -> Self {
        Self {
            block,
            instruction: Some(instr_idx),
        }
    }

    /// Creates a definition site for a phi node (at block entry).
    #[must_use]
    pub const fn phi(block: usize) -> Self {
        Self {
            block,
            instruction: None,
        }
    }

    /// Returns `true` if this is a phi node definition.
    #[must_use]
    pub const fn is_phi(&self) -> bool {
        self.instruction.is_none()
    }
}

/// Use site of an SSA value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UseSite {
    /// The block where this value is used.
    pub block: usize,
    /// The instruction index within the block.
    ///
    /// For phi node operands, this is the phi node's index in the block's phi list.
    pub instruction: usize,
    /// Whether this use is a phi node operand.
    pub is_phi_operand: bool,
}

impl UseSite {
    /// Creates a use site for a regular instruction.
    #[must_use]
    pub const fn instruction(block: usize, instr_idx: usize) -> Self {
        Self {
            block,
            instruction: instr_idx,
            is_phi_operand: false,
        }
    }

    /// Creates a use site for a phi node operand.
    #[must_use]
    pub const fn phi_operand(block: usize, phi_idx: usize) -> Self {
        Self {
            block,
            instruction: phi_idx,
            is_phi_operand: true,
        }
    }
}

/// Metadata for a single SSA value.
#[derive(Debug, Clone)]
pub struct SsaVariable {
    id: SsaVarId,
    name: Option<String>,
    origin: VariableOrigin,
    def_site: Option<DefSite>,
    var_type: SsaType,
    constant: Option<ConstValue>,
}

impl SsaVariable {
    /// Creates a new value entry.
    ///
    /// # Arguments
    ///
    /// * `id` - Identifier of the value
    /// * `name` - Optional display name (`i`, `A`, `add`)
    /// * `origin` - Where the value comes from
    /// * `def_site` - Defining position for phi and instruction results
    /// * `var_type` - The value's type
    #[must_use]
    pub fn new(
        id: SsaVarId,
        name: Option<String>,
        origin: VariableOrigin,
        def_site: Option<DefSite>,
        var_type: SsaType,
    ) -> Self {
        Self {
            id,
            name,
            origin,
            def_site,
            var_type,
            constant: None,
        }
    }

    /// Creates a constant value entry.
    #[must_use]
    pub fn constant(id: SsaVarId, value: ConstValue) -> Self {
        Self {
            id,
            name: None,
            origin: VariableOrigin::Constant,
            def_site: None,
            var_type: value.ssa_type(),
            constant: Some(value),
        }
    }

    /// Returns the value's identifier.
    #[must_use]
    pub const fn id(&self) -> SsaVarId {
        self.id
    }

    /// Returns the display name, if the value has one.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Returns where the value comes from.
    #[must_use]
    pub const fn origin(&self) -> VariableOrigin {
        self.origin
    }

    /// Returns the definition site for phi and instruction results.
    #[must_use]
    pub const fn def_site(&self) -> Option<DefSite> {
        self.def_site
    }

    /// Returns the value's type.
    #[must_use]
    pub const fn var_type(&self) -> &SsaType {
        &self.var_type
    }

    /// Returns the constant payload for constants.
    #[must_use]
    pub const fn const_value(&self) -> Option<&ConstValue> {
        self.constant.as_ref()
    }
}

impl fmt::Display for SsaVariable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.constant, &self.name) {
            (Some(value), _) => write!(f, "{value}"),
            (None, Some(name)) => write!(f, "%{name}"),
            (None, None) => write!(f, "%{}", self.id),
        }
    }
}
