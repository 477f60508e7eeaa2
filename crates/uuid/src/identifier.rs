//! The identifier value type and its strict validation.

use crate::{IdentifierError, IdentifierKind, IdentifierResult};
use std::{fmt, str::FromStr};
use uuid::Uuid;

/// Byte offsets of the group separators within the 36-character body.
pub(crate) const HYPHEN_POSITIONS: [usize; 4] = [8, 13, 18, 23];

/// Byte offset of the version nibble within the body.
pub(crate) const VERSION_POSITION: usize = 14;

/// Byte offset of the variant nibble within the body.
pub(crate) const VARIANT_POSITION: usize = 19;

/// Length of the hyphenated body shared by both kinds.
pub(crate) const BODY_LEN: usize = 36;

/// A generated (or validated) identifier.
///
/// Once constructed, the text is guaranteed to match the layout of its [`IdentifierKind`]:
/// hyphens at body offsets 8, 13, 18 and 23, a literal `4` at offset 14, a variant digit from
/// `8`, `9`, `a`, `b` (uppercase for the braced form) at offset 19, and hex digits elsewhere.
///
/// # Construction
/// - [`IdentifierGenerator::generate`](crate::IdentifierGenerator::generate) fills a fresh one.
/// - [`Identifier::parse`] validates externally supplied text.
///
/// The value is immutable and has no identity beyond its text.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Identifier {
    kind: IdentifierKind,
    text: String,
}

impl Identifier {
    /// Wraps text the generator has already laid out correctly.
    pub(crate) fn from_generated(kind: IdentifierKind, text: String) -> Self {
        debug_assert!(Self::is_valid(kind, &text), "generator produced '{text}'");
        Self { kind, text }
    }

    /// Validates and parses identifier text of either kind.
    ///
    /// The kind is taken from the shape: a leading `{` means [`IdentifierKind::BracedUppercase`],
    /// anything else is checked as [`IdentifierKind::Standard`]. No normalisation happens, so an
    /// uppercase unbraced value or a lowercase braced value is rejected.
    ///
    /// # Arguments
    ///
    /// * `input` - Identifier text of either kind, without surrounding whitespace.
    ///
    /// # Returns
    ///
    /// Returns the validated [`Identifier`] with its detected kind.
    ///
    /// # Errors
    ///
    /// Returns [`IdentifierError::InvalidInput`] if `input` is not a well-formed identifier.
    pub fn parse(input: &str) -> IdentifierResult<Self> {
        let kind = Self::shape_of(input);
        if Self::is_valid(kind, input) {
            return Ok(Self {
                kind,
                text: input.to_string(),
            });
        }
        Err(IdentifierError::InvalidInput(format!(
            "{} identifier must look like {}, got: '{}'",
            kind,
            Self::expected_shape(kind),
            input
        )))
    }

    /// Returns the kind of `input` if it is a well-formed identifier.
    pub fn detect_kind(input: &str) -> Option<IdentifierKind> {
        let kind = Self::shape_of(input);
        Self::is_valid(kind, input).then_some(kind)
    }

    /// Returns true if `input` is a well-formed identifier of `kind`.
    ///
    /// This is a purely syntactic check and allocates nothing. It validates:
    /// - the `{` `}` wrapper for the braced kind and its absence otherwise
    /// - a 36-byte body with hyphens at offsets 8, 13, 18 and 23
    /// - the version digit `4` at offset 14
    /// - a variant digit from `8`, `9`, `a`, `b` (or uppercase) at offset 19
    /// - hex digits of the kind's case everywhere else
    ///
    /// # Arguments
    ///
    /// * `kind` - Format to check against.
    /// * `input` - Candidate identifier text.
    ///
    /// # Returns
    ///
    /// Returns `true` if `input` matches `kind`, otherwise `false`.
    pub fn is_valid(kind: IdentifierKind, input: &str) -> bool {
        let body = if kind.is_braced() {
            match input.strip_prefix('{').and_then(|b| b.strip_suffix('}')) {
                Some(body) => body,
                None => return false,
            }
        } else {
            input
        };

        let upper = kind.is_uppercase();
        body.len() == BODY_LEN
            && body.bytes().enumerate().all(|(i, b)| match i {
                i if HYPHEN_POSITIONS.contains(&i) => b == b'-',
                VERSION_POSITION => b == b'4',
                VARIANT_POSITION => is_variant_digit(b, upper),
                _ => is_hex_digit(b, upper),
            })
    }

    /// The format of this identifier.
    pub fn kind(&self) -> IdentifierKind {
        self.kind
    }

    /// The identifier text.
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Consumes the identifier, returning its text.
    pub fn into_string(self) -> String {
        self.text
    }

    /// Returns the 128-bit value this identifier encodes.
    ///
    /// Both kinds of the same value map to the same [`Uuid`]. The result always reports
    /// version 4 and the RFC 4122 variant.
    ///
    /// # Returns
    ///
    /// Returns the [`Uuid`] whose hyphenated lowercase form equals this identifier's body.
    pub fn to_uuid(&self) -> Uuid {
        let value = self
            .body()
            .bytes()
            .filter(|b| *b != b'-')
            .fold(0u128, |acc, b| (acc << 4) | u128::from(hex_value(b)));
        Uuid::from_u128(value)
    }

    fn body(&self) -> &str {
        if self.kind.is_braced() {
            &self.text[1..self.text.len() - 1]
        } else {
            &self.text
        }
    }

    fn shape_of(input: &str) -> IdentifierKind {
        if input.starts_with('{') {
            IdentifierKind::BracedUppercase
        } else {
            IdentifierKind::Standard
        }
    }

    fn expected_shape(kind: IdentifierKind) -> &'static str {
        match kind {
            IdentifierKind::Standard => {
                "'xxxxxxxx-xxxx-4xxx-yxxx-xxxxxxxxxxxx' (lowercase hex, y in 8, 9, a, b)"
            }
            IdentifierKind::BracedUppercase => {
                "'{XXXXXXXX-XXXX-4XXX-YXXX-XXXXXXXXXXXX}' (uppercase hex, Y in 8, 9, A, B)"
            }
        }
    }
}

fn is_hex_digit(b: u8, upper: bool) -> bool {
    if upper {
        matches!(b, b'0'..=b'9' | b'A'..=b'F')
    } else {
        matches!(b, b'0'..=b'9' | b'a'..=b'f')
    }
}

fn is_variant_digit(b: u8, upper: bool) -> bool {
    if upper {
        matches!(b, b'8' | b'9' | b'A' | b'B')
    } else {
        matches!(b, b'8' | b'9' | b'a' | b'b')
    }
}

fn hex_value(b: u8) -> u8 {
    match b {
        b'0'..=b'9' => b - b'0',
        b'a'..=b'f' => b - b'a' + 10,
        b'A'..=b'F' => b - b'A' + 10,
        // unreachable for validated text
        _ => 0,
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

impl FromStr for Identifier {
    type Err = IdentifierError;

    /// Equivalent to [`Identifier::parse`].
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Identifier::parse(s)
    }
}

impl AsRef<str> for Identifier {
    fn as_ref(&self) -> &str {
        &self.text
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for Identifier {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.text)
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for Identifier {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        Identifier::parse(&text).map_err(serde::de::Error::custom)
    }
}
