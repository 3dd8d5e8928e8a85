//! Field-level helpers shared by drafts and patches.

use serde::{Deserialize, Deserializer};

use gemcart_core::{DomainError, DomainResult};

/// A monetary amount as submitted by the admin UI: a JSON number or a
/// numeric string (form inputs arrive as text).
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Amount {
    Number(f64),
    Text(String),
}

impl Amount {
    /// Parse to a finite `f64`.
    pub fn value(&self, field: &str) -> DomainResult<f64> {
        let v = match self {
            Amount::Number(n) => *n,
            Amount::Text(s) => s
                .trim()
                .parse::<f64>()
                .map_err(|_| DomainError::validation(format!("{field} must be a number")))?,
        };
        if !v.is_finite() {
            return Err(DomainError::validation(format!("{field} must be a number")));
        }
        Ok(v)
    }

    /// `true` for `0`, `""` and other values the UI sends for "not set".
    pub fn is_blank(&self) -> bool {
        match self {
            Amount::Number(n) => *n == 0.0,
            Amount::Text(s) => s.trim().is_empty(),
        }
    }
}

/// `Some(v)` when `v` is present and not blank.
pub fn filled(v: Option<String>) -> Option<String> {
    v.filter(|s| !s.trim().is_empty())
}

/// Required-on-update string: absent is fine, present-but-blank is not.
pub fn non_blank(field: &str, v: String) -> DomainResult<String> {
    if v.trim().is_empty() {
        return Err(DomainError::validation(format!("{field} cannot be empty")));
    }
    Ok(v)
}

/// Distinguish "key absent" (`None`) from "key present, maybe null"
/// (`Some(None)` / `Some(Some(v))`) in patches.
///
/// Use together with `#[serde(default)]`.
pub fn present<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}
