//! Report section selection.
//!
//! Every statistic is always computed; [`ReportOptions`] only decides which optional
//! sections the textual report prints. Sections are named the way the command-line
//! flags of the pass were:
//!
//! | Section    | Flag         | Prints                                        |
//! |------------|--------------|-----------------------------------------------|
//! | array refs | `arr-ref`    | reference count and per-array table           |
//! | index      | `arr-idx`    | per-access index traces and pattern summary   |
//! | operators  | `bin-ops`    | operator frequencies and conditionals         |
//! | scalars    | `scalars`    | scalar operands of non-address instructions   |
//! | triangular | `tri`        | triangular loop total in the summary          |
//!
//! ```rust
//! use loopstat::stats::ReportOptions;
//!
//! let options: ReportOptions = "arr-ref, tri".parse()?;
//! assert!(options.show_array_refs);
//! assert!(options.show_triangular_summary);
//! assert!(!options.show_scalar_detail);
//! # Ok::<(), loopstat::Error>(())
//! ```

use std::str::FromStr;

use serde::Serialize;
use strum::{EnumIter, EnumString, IntoEnumIterator, IntoStaticStr};

use crate::{Error, Result};

/// One optional report section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumString, EnumIter, IntoStaticStr)]
pub enum ReportSection {
    /// Array reference counts and the per-array table.
    #[strum(serialize = "arr-ref")]
    ArrayRefs,
    /// Index expression traces and the pattern summary.
    #[strum(serialize = "arr-idx")]
    IndexDetail,
    /// Operator frequencies.
    #[strum(serialize = "bin-ops")]
    OperatorFreq,
    /// Scalar operand listing.
    #[strum(serialize = "scalars")]
    ScalarDetail,
    /// Triangular loop total in the summary.
    #[strum(serialize = "tri")]
    TriangularSummary,
}

impl ReportSection {
    /// Returns the flag name of the section.
    #[must_use]
    pub fn flag(self) -> &'static str {
        self.into()
    }
}

/// Which optional sections the report prints.
///
/// The default prints none of them.
#[allow(clippy::struct_excessive_bools)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ReportOptions {
    /// Print array reference counts.
    pub show_array_refs: bool,
    /// Print index expression detail.
    pub show_index_detail: bool,
    /// Print operator frequencies.
    pub show_operator_freq: bool,
    /// Print scalar operands.
    pub show_scalar_detail: bool,
    /// Print the triangular loop total.
    pub show_triangular_summary: bool,
}

impl ReportOptions {
    /// Options printing every section.
    #[must_use]
    pub fn all() -> Self {
        ReportSection::iter().fold(Self::default(), Self::with)
    }

    /// Returns a copy with `section` enabled.
    #[must_use]
    pub fn with(mut self, section: ReportSection) -> Self {
        self.set(section, true);
        self
    }

    /// Enables or disables one section.
    pub fn set(&mut self, section: ReportSection, enabled: bool) {
        let flag = match section {
            ReportSection::ArrayRefs => &mut self.show_array_refs,
            ReportSection::IndexDetail => &mut self.show_index_detail,
            ReportSection::OperatorFreq => &mut self.show_operator_freq,
            ReportSection::ScalarDetail => &mut self.show_scalar_detail,
            ReportSection::TriangularSummary => &mut self.show_triangular_summary,
        };
        *flag = enabled;
    }

    /// Returns `true` if `section` is enabled.
    #[must_use]
    pub fn shows(&self, section: ReportSection) -> bool {
        match section {
            ReportSection::ArrayRefs => self.show_array_refs,
            ReportSection::IndexDetail => self.show_index_detail,
            ReportSection::OperatorFreq => self.show_operator_freq,
            ReportSection::ScalarDetail => self.show_scalar_detail,
            ReportSection::TriangularSummary => self.show_triangular_summary,
        }
    }

    /// Parses a comma-separated list of section flags.
    ///
    /// Surrounding whitespace and empty entries are ignored, so `""` yields the default.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidOption`] for an unknown section name.
    pub fn parse(list: &str) -> Result<Self> {
        list.split(',')
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .try_fold(Self::default(), |options, name| {
                let section = ReportSection::from_str(name)
                    .map_err(|_| Error::InvalidOption(name.to_string()))?;
                Ok(options.with(section))
            })
    }
}

impl FromStr for ReportOptions {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}
