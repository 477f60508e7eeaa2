//! Generator configuration.
//!
//! Configuration is resolved once at process startup and handed to the library. Nothing in this
//! crate reads environment variables; callers pass in the raw values they looked up.

use crate::generator::{IdentifierGenerator, RandomSource, RngSource};
use crate::kind::kind_from_value;
use crate::{IdentifierError, IdentifierKind, IdentifierResult};
use rand::rngs::OsRng;
use std::{fmt, str::FromStr};

/// Which randomness backend a configured generator uses.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RandomnessMode {
    /// Thread-local PRNG (`rand::thread_rng`).
    #[default]
    Thread,
    /// Operating system entropy (`rand::rngs::OsRng`).
    Os,
}

impl RandomnessMode {
    pub fn as_str(self) -> &'static str {
        match self {
            RandomnessMode::Thread => "thread",
            RandomnessMode::Os => "os",
        }
    }
}

impl fmt::Display for RandomnessMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RandomnessMode {
    type Err = IdentifierError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "thread" => Ok(RandomnessMode::Thread),
            "os" => Ok(RandomnessMode::Os),
            other => Err(IdentifierError::InvalidInput(format!(
                "randomness must be 'thread' or 'os', got: '{}'",
                other
            ))),
        }
    }
}

/// Generator settings resolved at startup.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct GeneratorConfig {
    default_kind: IdentifierKind,
    randomness: RandomnessMode,
}

impl GeneratorConfig {
    pub fn new(default_kind: IdentifierKind, randomness: RandomnessMode) -> Self {
        Self {
            default_kind,
            randomness,
        }
    }

    /// Builds a config from optional raw values (typically environment variables).
    ///
    /// `None` or blank values fall back to the defaults (`standard`, `thread`). Anything else
    /// must parse exactly.
    ///
    /// # Errors
    ///
    /// Returns [`IdentifierError::InvalidKind`] for an unknown kind and
    /// [`IdentifierError::InvalidInput`] for an unknown randomness mode.
    pub fn from_env_values(
        default_kind: Option<String>,
        randomness: Option<String>,
    ) -> IdentifierResult<Self> {
        let default_kind = kind_from_value(default_kind)?.unwrap_or_default();
        let randomness = randomness
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .map(|v| v.parse::<RandomnessMode>())
            .transpose()?
            .unwrap_or_default();

        Ok(Self {
            default_kind,
            randomness,
        })
    }

    pub fn default_kind(&self) -> IdentifierKind {
        self.default_kind
    }

    pub fn randomness(&self) -> RandomnessMode {
        self.randomness
    }

    /// Builds a generator backed by the configured randomness source.
    pub fn generator(&self) -> IdentifierGenerator<Box<dyn RandomSource>> {
        let source: Box<dyn RandomSource> = match self.randomness {
            RandomnessMode::Thread => Box::new(RngSource::new(rand::thread_rng())),
            RandomnessMode::Os => Box::new(RngSource::new(OsRng)),
        };
        IdentifierGenerator::new(source)
    }
}
