use std::time::Duration;

use bytes::Bytes;

/// A single write command inside a [`Batch`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// `SET key value`
    Set {
        /// Target key.
        key: String,
        /// Value to write.
        value: Bytes,
    },
    /// `SETEX key ttl value`
    SetWithExpiry {
        /// Target key.
        key: String,
        /// Value to write.
        value: Bytes,
        /// Time until the entry is treated as absent.
        ttl: Duration,
    },
    /// `INCR key`
    Increment {
        /// Counter key.
        key: String,
    },
    /// `RPUSH key value`
    AppendToList {
        /// List key.
        key: String,
        /// Element appended at the tail.
        value: Bytes,
    },
}

impl Command {
    /// Key the command writes to.
    pub fn key(&self) -> &str {
        match self {
            Command::Set { key, .. }
            | Command::SetWithExpiry { key, .. }
            | Command::Increment { key }
            | Command::AppendToList { key, .. } => key,
        }
    }
}

/// Ordered group of write commands applied by
/// [`KeyValueStore::execute`](crate::KeyValueStore::execute) as one unit.
///
/// Either every command takes effect, in order, or none does.
///
/// ```
/// use reprise_backend::Batch;
///
/// let batch = Batch::new()
///     .append_to_list("store:inputs", "(\"a\",)")
///     .set("3b1f", "a")
///     .append_to_list("store:outputs", "3b1f")
///     .increment("store");
/// assert_eq!(batch.len(), 4);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Batch {
    commands: Vec<Command>,
}

impl Batch {
    /// Creates an empty batch.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a `SET`.
    pub fn set(mut self, key: impl Into<String>, value: impl Into<Bytes>) -> Self {
        self.commands.push(Command::Set {
            key: key.into(),
            value: value.into(),
        });
        self
    }

    /// Appends a `SETEX`.
    pub fn set_with_expiry(
        mut self,
        key: impl Into<String>,
        value: impl Into<Bytes>,
        ttl: Duration,
    ) -> Self {
        self.commands.push(Command::SetWithExpiry {
            key: key.into(),
            value: value.into(),
            ttl,
        });
        self
    }

    /// Appends an `INCR`.
    pub fn increment(mut self, key: impl Into<String>) -> Self {
        self.commands.push(Command::Increment { key: key.into() });
        self
    }

    /// Appends an `RPUSH`.
    pub fn append_to_list(mut self, key: impl Into<String>, value: impl Into<Bytes>) -> Self {
        self.commands.push(Command::AppendToList {
            key: key.into(),
            value: value.into(),
        });
        self
    }

    /// Number of commands in the batch.
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    /// Returns `true` if the batch holds no commands.
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Commands in execution order.
    pub fn commands(&self) -> &[Command] {
        &self.commands
    }
}

impl IntoIterator for Batch {
    type Item = Command;
    type IntoIter = std::vec::IntoIter<Command>;

    fn into_iter(self) -> Self::IntoIter {
        self.commands.into_iter()
    }
}
