//! The closed set of identifier formats.

use crate::{IdentifierError, IdentifierResult};
use std::{fmt, str::FromStr};

/// Supported identifier formats.
///
/// Parsing is strict: only the names listed on [`FromStr`] are accepted and anything else is
/// rejected with [`IdentifierError::InvalidKind`] rather than falling back to a default.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum IdentifierKind {
    /// `xxxxxxxx-xxxx-4xxx-yxxx-xxxxxxxxxxxx`, lowercase.
    #[default]
    #[cfg_attr(feature = "serde", serde(alias = "uuid-v4"))]
    Standard,
    /// `{XXXXXXXX-XXXX-4XXX-YXXX-XXXXXXXXXXXX}`, the Microsoft GUID rendering.
    #[cfg_attr(feature = "serde", serde(alias = "microsoft-guid"))]
    BracedUppercase,
}

impl IdentifierKind {
    /// Every supported kind, in display order.
    pub const ALL: [IdentifierKind; 2] = [IdentifierKind::Standard, IdentifierKind::BracedUppercase];

    /// Canonical selector name for this kind.
    pub fn as_str(self) -> &'static str {
        match self {
            IdentifierKind::Standard => "standard",
            IdentifierKind::BracedUppercase => "braced-uppercase",
        }
    }

    /// Length in bytes of an identifier of this kind.
    pub fn text_len(self) -> usize {
        match self {
            IdentifierKind::Standard => 36,
            IdentifierKind::BracedUppercase => 38,
        }
    }

    pub(crate) fn is_uppercase(self) -> bool {
        matches!(self, IdentifierKind::BracedUppercase)
    }

    pub(crate) fn is_braced(self) -> bool {
        matches!(self, IdentifierKind::BracedUppercase)
    }
}

impl fmt::Display for IdentifierKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for IdentifierKind {
    type Err = IdentifierError;

    /// Parses a format selector.
    ///
    /// Accepts `standard` and `braced-uppercase`, plus the selector values `uuid-v4` and
    /// `microsoft-guid`. Surrounding whitespace is ignored; matching is case-sensitive.
    ///
    /// # Errors
    ///
    /// Returns [`IdentifierError::InvalidKind`] for any other value.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "standard" | "uuid-v4" => Ok(IdentifierKind::Standard),
            "braced-uppercase" | "microsoft-guid" => Ok(IdentifierKind::BracedUppercase),
            other => Err(IdentifierError::InvalidKind(other.to_string())),
        }
    }
}

/// Parses an optional selector, treating `None` and blank values as "not set".
pub(crate) fn kind_from_value(value: Option<String>) -> IdentifierResult<Option<IdentifierKind>> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .map(|v| v.parse::<IdentifierKind>())
        .transpose()
}
