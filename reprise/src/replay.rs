//! Rendering of recorded call histories.

use std::fmt;

use reprise_backend::KeyValueStore;
use reprise_core::IdentityGenerator;

use crate::cache::InstrumentedCache;
use crate::error::CacheError;

/// One recorded invocation: rendered arguments and rendered result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplayEntry {
    /// Argument tuple as recorded, e.g. `("a",)`.
    pub input: String,
    /// Result as recorded, e.g. the generated key.
    pub output: String,
}

/// Call count and invocation trace of one operation.
///
/// The [`Display`](fmt::Display) implementation renders the classic report:
///
/// ```text
/// store was called 2 times:
/// store(*("a",)) -> 0b6f5c1e-...
/// store(*("b",)) -> 9d2a41c7-...
/// ```
///
/// or `store was not called.` when the counter is zero.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Replay {
    /// Operation name as requested.
    pub operation: String,
    /// Value of the call counter.
    pub calls: u64,
    /// Recorded invocations, oldest first.
    pub entries: Vec<ReplayEntry>,
}

impl Replay {
    /// Returns `true` if the operation was called at least once.
    pub fn was_called(&self) -> bool {
        self.calls > 0
    }
}

impl fmt::Display for Replay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.was_called() {
            return write!(f, "{} was not called.", self.operation);
        }
        write!(f, "{} was called {} times:", self.operation, self.calls)?;
        for entry in &self.entries {
            write!(f, "\n{}(*{}) -> {}", self.operation, entry.input, entry.output)?;
        }
        Ok(())
    }
}

/// Reads the counter and history of `operation` from `cache`.
///
/// When the counter is zero or missing the result has no entries, whatever
/// the history lists hold. Inputs and outputs are paired up to the shorter
/// of the two lists.
pub async fn replay<S, G>(
    cache: &InstrumentedCache<S, G>,
    operation: &str,
) -> Result<Replay, CacheError>
where
    S: KeyValueStore + ?Sized,
    G: IdentityGenerator,
{
    let calls = cache.call_count(operation).await?;
    let entries = if calls == 0 {
        Vec::new()
    } else {
        let history = cache.history(operation).await?;
        history
            .inputs
            .into_iter()
            .zip(history.outputs)
            .map(|(input, output)| ReplayEntry { input, output })
            .collect()
    };

    Ok(Replay {
        operation: operation.to_owned(),
        calls,
        entries,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_not_called() {
        let replay = Replay {
            operation: "store".into(),
            calls: 0,
            entries: Vec::new(),
        };
        assert!(!replay.was_called());
        assert_eq!(replay.to_string(), "store was not called.");
    }

    #[test]
    fn renders_each_call() {
        let replay = Replay {
            operation: "store".into(),
            calls: 2,
            entries: vec![
                ReplayEntry {
                    input: r#"("a",)"#.into(),
                    output: "k1".into(),
                },
                ReplayEntry {
                    input: "(3,)".into(),
                    output: "k2".into(),
                },
            ],
        };
        assert!(replay.was_called());
        assert_eq!(
            replay.to_string(),
            "store was called 2 times:\nstore(*(\"a\",)) -> k1\nstore(*(3,)) -> k2"
        );
    }
}
