//! Names of tracked operations and the store keys derived from them.

use std::fmt;

use smol_str::{SmolStr, format_smolstr};

const INPUTS_SUFFIX: &str = ":inputs";
const OUTPUTS_SUFFIX: &str = ":outputs";

/// Name of an instrumented operation.
///
/// The call counter lives under the name itself, the histories under
/// `<name>:inputs` and `<name>:outputs`.
///
/// # Example
/// ```
/// use reprise_core::OperationName;
///
/// let op = OperationName::new_static("store").within("session-1");
/// assert_eq!(op.counter_key(), "session-1:store");
/// assert_eq!(op.inputs_key(), "session-1:store:inputs");
/// assert_eq!(op.outputs_key(), "session-1:store:outputs");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct OperationName(SmolStr);

impl OperationName {
    /// Creates a new operation name.
    #[inline]
    pub fn new(s: impl Into<SmolStr>) -> Self {
        Self(s.into())
    }

    /// Creates an operation name from a static string (no allocation).
    #[inline]
    pub const fn new_static(s: &'static str) -> Self {
        Self(SmolStr::new_static(s))
    }

    /// Returns the name as a string slice.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Prefixes the name with `namespace:`.
    pub fn within(&self, namespace: &str) -> Self {
        Self(format_smolstr!("{namespace}:{}", self.0))
    }

    /// Key of the call counter.
    #[inline]
    pub fn counter_key(&self) -> &str {
        &self.0
    }

    /// Key of the list holding rendered arguments, one entry per call.
    pub fn inputs_key(&self) -> String {
        format!("{}{INPUTS_SUFFIX}", self.0)
    }

    /// Key of the list holding rendered results, one entry per call.
    pub fn outputs_key(&self) -> String {
        format!("{}{OUTPUTS_SUFFIX}", self.0)
    }
}

impl fmt::Display for OperationName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<&str> for OperationName {
    #[inline]
    fn from(s: &str) -> Self {
        Self(SmolStr::new(s))
    }
}

impl From<String> for OperationName {
    #[inline]
    fn from(s: String) -> Self {
        Self(SmolStr::from(s))
    }
}
