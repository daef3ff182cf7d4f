//! Store label type for identifying key-value store backends.
//!
//! `StoreLabel` is a newtype wrapper around `SmolStr` used in tracing fields
//! and metric labels.

use smol_str::SmolStr;
use std::fmt;

/// A label identifying a key-value store backend.
///
/// # Example
/// ```
/// use reprise_core::StoreLabel;
///
/// let label = StoreLabel::new("redis");
/// assert_eq!(label.as_str(), "redis");
/// assert_eq!(label.to_string(), "redis");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct StoreLabel(SmolStr);

impl StoreLabel {
    /// Creates a new store label.
    #[inline]
    pub fn new(s: impl Into<SmolStr>) -> Self {
        Self(s.into())
    }

    /// Creates a store label from a static string (no allocation).
    #[inline]
    pub const fn new_static(s: &'static str) -> Self {
        Self(SmolStr::new_static(s))
    }

    /// Returns the label as a string slice.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StoreLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<&str> for StoreLabel {
    #[inline]
    fn from(s: &str) -> Self {
        Self(SmolStr::new(s))
    }
}

impl From<String> for StoreLabel {
    #[inline]
    fn from(s: String) -> Self {
        Self(SmolStr::from(s))
    }
}
