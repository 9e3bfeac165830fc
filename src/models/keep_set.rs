use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{ProcessingError, Result};
use crate::utils::constants::{BLANK_FLAG_TOKEN, CONSERVATIVE_KEEP_MFLAGS, STANDARD_KEEP_MFLAGS};

/// Measurement flag codes a row may carry and still be admitted.
///
/// The blank code (`""`) is a regular member: a set without it rejects rows
/// that carry no measurement flag at all.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct KeepSet(Vec<String>);

impl KeepSet {
    pub fn from_codes<I, S>(codes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut set: Vec<String> = Vec::new();
        for code in codes {
            let code = code.as_ref().trim().to_string();
            if !set.contains(&code) {
                set.push(code);
            }
        }
        Self(set)
    }

    /// Blank, G, B, N, S, T, A, E
    pub fn standard() -> Self {
        Self::from_codes(STANDARD_KEEP_MFLAGS)
    }

    /// Blank, G, B, N, S, T
    pub fn conservative() -> Self {
        Self::from_codes(CONSERVATIVE_KEEP_MFLAGS)
    }

    pub fn preset(name: &str) -> Result<Self> {
        match name.trim().to_lowercase().as_str() {
            "standard" => Ok(Self::standard()),
            "conservative" => Ok(Self::conservative()),
            other => Err(ProcessingError::Config(format!(
                "Unknown MFLAG policy '{}' (expected 'standard' or 'conservative')",
                other
            ))),
        }
    }

    /// Parse a comma separated list such as `blank,G,B,S,T`.
    ///
    /// An empty token or the word `blank` stands for the blank code.
    pub fn parse(list: &str) -> Self {
        Self::from_tokens(list.split(','))
    }

    fn from_tokens<I, S>(tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self::from_codes(tokens.into_iter().map(|token| {
            let token = token.as_ref().trim();
            if token.eq_ignore_ascii_case(BLANK_FLAG_TOKEN) {
                String::new()
            } else {
                token.to_string()
            }
        }))
    }

    pub fn contains(&self, code: &str) -> bool {
        self.0.iter().any(|c| c == code)
    }

    pub fn codes(&self) -> &[String] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Deserialized lists accept the same `blank` token as `parse`
impl From<Vec<String>> for KeepSet {
    fn from(codes: Vec<String>) -> Self {
        Self::from_tokens(codes)
    }
}

impl From<KeepSet> for Vec<String> {
    fn from(keep_set: KeepSet) -> Self {
        keep_set.0
    }
}

impl Default for KeepSet {
    fn default() -> Self {
        Self::standard()
    }
}

impl fmt::Display for KeepSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let codes: Vec<&str> = self
            .0
            .iter()
            .map(|c| if c.is_empty() { BLANK_FLAG_TOKEN } else { c.as_str() })
            .collect();
        write!(f, "{}", codes.join(","))
    }
}
