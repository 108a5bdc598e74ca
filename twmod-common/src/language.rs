//! Supported upstream stream languages
//!
//! The upstream filter accepts a fixed set of language codes. Anything outside
//! the set is ignored (no language filter) rather than rejected.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Language filter accepted by the upstream stream
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Ar,
    Nl,
    En,
    Fa,
    Fr,
    De,
    Id,
    It,
    Ja,
    Pt,
    Es,
}

impl Language {
    /// Every supported language, in declaration order
    pub const ALL: [Language; 11] = [
        Language::Ar,
        Language::Nl,
        Language::En,
        Language::Fa,
        Language::Fr,
        Language::De,
        Language::Id,
        Language::It,
        Language::Ja,
        Language::Pt,
        Language::Es,
    ];

    /// Two-letter code sent upstream
    pub fn code(&self) -> &'static str {
        match self {
            Language::Ar => "ar",
            Language::Nl => "nl",
            Language::En => "en",
            Language::Fa => "fa",
            Language::Fr => "fr",
            Language::De => "de",
            Language::Id => "id",
            Language::It => "it",
            Language::Ja => "ja",
            Language::Pt => "pt",
            Language::Es => "es",
        }
    }

    /// Resolve an optional caller-supplied code
    ///
    /// Unknown or blank codes fall back to `None` (no filter).
    pub fn resolve(code: Option<&str>) -> Option<Language> {
        code.and_then(|c| c.parse().ok())
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

impl FromStr for Language {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let code = s.trim().to_ascii_lowercase();
        Language::ALL
            .iter()
            .copied()
            .find(|lang| lang.code() == code)
            .ok_or_else(|| crate::Error::InvalidInput(format!("Unsupported language: {}", s)))
    }
}
