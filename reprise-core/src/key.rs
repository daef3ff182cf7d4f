//! Opaque keys for stored items and the generators that produce them.

use std::fmt;

use smol_str::SmolStr;
use uuid::Uuid;

/// Opaque identifier of a value written by the cache.
///
/// A `Key` is generated fresh for every write and is never derived from the
/// value's content. Two writes of the same data produce two different keys.
///
/// # Example
/// ```
/// use reprise_core::{IdentityGenerator, RandomIdentity};
///
/// let generator = RandomIdentity;
/// let first = generator.new_key();
/// let second = generator.new_key();
/// assert_ne!(first, second);
/// assert_eq!(first.as_str().len(), 36);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Key(SmolStr);

impl Key {
    /// Wraps an existing identifier, e.g. one read back from a history list.
    #[inline]
    pub fn new(s: impl Into<SmolStr>) -> Self {
        Self(s.into())
    }

    /// Returns the key as a string slice.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl AsRef<str> for Key {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Key {
    #[inline]
    fn from(s: &str) -> Self {
        Self(SmolStr::new(s))
    }
}

impl From<String> for Key {
    #[inline]
    fn from(s: String) -> Self {
        Self(SmolStr::from(s))
    }
}

/// Source of fresh [`Key`]s.
///
/// Implementations must never hand out the same key twice within the
/// lifetime of a store.
pub trait IdentityGenerator: Send + Sync {
    /// Produces a new key.
    fn new_key(&self) -> Key;
}

/// Random 128-bit identifiers in canonical hyphenated UUID form.
///
/// Collisions are treated as negligible and are not checked for.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomIdentity;

impl IdentityGenerator for RandomIdentity {
    fn new_key(&self) -> Key {
        Key::new(Uuid::new_v4().hyphenated().to_string())
    }
}

impl<G: IdentityGenerator + ?Sized> IdentityGenerator for Box<G> {
    fn new_key(&self) -> Key {
        (**self).new_key()
    }
}

impl<G: IdentityGenerator + ?Sized> IdentityGenerator for std::sync::Arc<G> {
    fn new_key(&self) -> Key {
        (**self).new_key()
    }
}
