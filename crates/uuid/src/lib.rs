//! Random UUID-v4-style and Microsoft-GUID-style identifier generation.
//!
//! guidgen produces identifiers in two textual forms:
//!
//! | kind               | length | case  | example shape                            |
//! |--------------------|--------|-------|------------------------------------------|
//! | `standard`         | 36     | lower | `xxxxxxxx-xxxx-4xxx-yxxx-xxxxxxxxxxxx`   |
//! | `braced-uppercase` | 38     | upper | `{XXXXXXXX-XXXX-4XXX-YXXX-XXXXXXXXXXXX}` |
//!
//! where `x` is any hex digit and `y` is one of `8`, `9`, `a`, `b` (uppercase for the braced form).
//! The fixed `4` marks version 4 and `y` carries the RFC 4122 variant bits (`10`).
//!
//! This module provides:
//! - [`IdentifierGenerator`], which fills the template from a [`RandomSource`].
//! - [`Identifier`], an immutable value that is guaranteed well-formed once constructed, either
//!   by generation or by strict validation with [`Identifier::parse`].
//! - [`IdentifierKind`], the closed set of supported formats.
//! - [`GeneratorConfig`], startup configuration resolved by the caller.
//!
//! ## Randomness
//! The default source is the thread-local PRNG from `rand`. No cryptographic strength and no
//! uniqueness beyond the birthday bound is promised. Callers that need OS entropy can use
//! [`IdentifierGenerator::os`], which is also the only backend that realistically reports
//! [`IdentifierError::RandomnessUnavailable`].
//!
//! ## State
//! Generation is stateless. Nothing is persisted and previously issued identifiers are not
//! remembered; keeping a "current" identifier is the caller's concern.

mod config;
mod generator;
mod identifier;
mod kind;

// Re-export public types
pub use config::{GeneratorConfig, RandomnessMode};
pub use generator::{generate, IdentifierGenerator, RandomSource, RngSource};
pub use identifier::Identifier;
pub use kind::IdentifierKind;

/// Error type for identifier operations.
#[derive(Debug, thiserror::Error)]
pub enum IdentifierError {
    /// The randomness source could not be read
    #[error("Randomness unavailable: {0}")]
    RandomnessUnavailable(String),
    /// Unknown identifier format selector
    #[error("Invalid identifier kind: '{0}' (expected 'standard' or 'braced-uppercase')")]
    InvalidKind(String),
    /// Invalid input provided
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Result type for identifier operations.
pub type IdentifierResult<T> = Result<T, IdentifierError>;
