//! Short human-readable codes
//!
//! Every catalog entity and playlist carries, next to its UUID, a short
//! zero-padded sequential code (`00042`, `00001337`). Codes are scoped per
//! entity kind, start at 1, have a fixed width per kind and are never reused.

use crate::error::{MixtapeError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Entity kinds that carry a short code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CodeKind {
    Track,
    Playlist,
    Album,
    Artist,
    Genre,
}

impl CodeKind {
    pub const ALL: [CodeKind; 5] = [
        CodeKind::Track,
        CodeKind::Playlist,
        CodeKind::Album,
        CodeKind::Artist,
        CodeKind::Genre,
    ];

    /// Number of digits in a code of this kind
    pub fn width(self) -> usize {
        match self {
            CodeKind::Track => 8,
            CodeKind::Album | CodeKind::Artist => 6,
            CodeKind::Playlist | CodeKind::Genre => 5,
        }
    }

    /// Largest value representable at this kind's width
    pub fn max_value(self) -> u64 {
        10u64.pow(self.width() as u32) - 1
    }

    /// Key of this kind's counter row
    pub fn as_str(self) -> &'static str {
        match self {
            CodeKind::Track => "track",
            CodeKind::Playlist => "playlist",
            CodeKind::Album => "album",
            CodeKind::Artist => "artist",
            CodeKind::Genre => "genre",
        }
    }

    /// Render a counter value as a code of this kind.
    ///
    /// Counter values start at 1; zero and values past [`Self::max_value`]
    /// are rejected rather than wrapped.
    pub fn format(self, value: u64) -> Result<Code> {
        if value == 0 {
            return Err(MixtapeError::invalid_input("code counters start at 1"));
        }
        if value > self.max_value() {
            return Err(MixtapeError::CodeSpaceExhausted(self));
        }
        Ok(Code(format!("{:0width$}", value, width = self.width())))
    }
}

impl fmt::Display for CodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A short, fixed-width, zero-padded code
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Code(String);

impl Code {
    /// Validate a code read back from storage or supplied by a caller
    pub fn parse(kind: CodeKind, raw: impl Into<String>) -> Result<Self> {
        let raw = raw.into();
        if raw.len() != kind.width() || !raw.bytes().all(|b| b.is_ascii_digit()) {
            return Err(MixtapeError::invalid_input(format!(
                "'{raw}' is not a {}-digit {kind} code",
                kind.width()
            )));
        }
        Ok(Self(raw))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Numeric value of the code
    pub fn value(&self) -> u64 {
        // Digits-only is checked on construction
        self.0.parse().unwrap_or_default()
    }
}

impl fmt::Display for Code {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
