//! Synchronous keyspace behind [`MemoryStore`](crate::MemoryStore).
//!
//! Every method takes the current instant explicitly so expiry can be driven
//! by tokio's clock in the store and by hand in tests.

use std::collections::HashMap;
use std::time::Duration;

use bytes::Bytes;
use reprise_backend::Command;
use tokio::time::Instant;

use crate::error::Error;

#[derive(Debug, Clone)]
enum Value {
    String(Bytes),
    List(Vec<Bytes>),
}

#[derive(Debug, Clone)]
struct Entry {
    value: Value,
    expires_at: Option<Instant>,
}

impl Entry {
    fn persistent(value: Value) -> Self {
        Self {
            value,
            expires_at: None,
        }
    }

    fn is_expired(&self, now: Instant) -> bool {
        self.expires_at.is_some_and(|deadline| deadline <= now)
    }
}

#[derive(Debug, Default)]
pub(crate) struct Keyspace {
    entries: HashMap<String, Entry>,
}

impl Keyspace {
    fn live(&mut self, key: &str, now: Instant) -> Option<&mut Entry> {
        if self.entries.get(key).is_some_and(|entry| entry.is_expired(now)) {
            self.entries.remove(key);
        }
        self.entries.get_mut(key)
    }

    pub(crate) fn get(&mut self, key: &str, now: Instant) -> Result<Option<Bytes>, Error> {
        match self.live(key, now).map(|entry| &entry.value) {
            None => Ok(None),
            Some(Value::String(data)) => Ok(Some(data.clone())),
            Some(Value::List(_)) => Err(Error::WrongType),
        }
    }

    pub(crate) fn set(&mut self, key: &str, value: Bytes) {
        self.entries
            .insert(key.to_owned(), Entry::persistent(Value::String(value)));
    }

    pub(crate) fn set_with_expiry(
        &mut self,
        key: &str,
        value: Bytes,
        ttl: Duration,
        now: Instant,
    ) -> Result<(), Error> {
        if ttl.is_zero() {
            return Err(Error::InvalidExpireTime);
        }
        self.entries.insert(
            key.to_owned(),
            Entry {
                value: Value::String(value),
                expires_at: Some(now + ttl),
            },
        );
        Ok(())
    }

    pub(crate) fn increment(&mut self, key: &str, now: Instant) -> Result<i64, Error> {
        let Some(entry) = self.live(key, now) else {
            self.set(key, Bytes::from_static(b"1"));
            return Ok(1);
        };
        let Value::String(data) = &entry.value else {
            return Err(Error::WrongType);
        };
        let current: i64 = std::str::from_utf8(data)
            .ok()
            .and_then(|text| text.parse().ok())
            .ok_or(Error::NotAnInteger)?;
        let next = current.checked_add(1).ok_or(Error::Overflow)?;
        // INCR keeps the remaining time-to-live
        entry.value = Value::String(Bytes::from(next.to_string()));
        Ok(next)
    }

    pub(crate) fn append_to_list(
        &mut self,
        key: &str,
        value: Bytes,
        now: Instant,
    ) -> Result<u64, Error> {
        match self.live(key, now) {
            None => {
                self.entries
                    .insert(key.to_owned(), Entry::persistent(Value::List(vec![value])));
                Ok(1)
            }
            Some(Entry {
                value: Value::List(list),
                ..
            }) => {
                list.push(value);
                Ok(list.len() as u64)
            }
            Some(_) => Err(Error::WrongType),
        }
    }

    pub(crate) fn list_range(
        &mut self,
        key: &str,
        start: isize,
        stop: isize,
        now: Instant,
    ) -> Result<Vec<Bytes>, Error> {
        let list = match self.live(key, now).map(|entry| &entry.value) {
            None => return Ok(Vec::new()),
            Some(Value::String(_)) => return Err(Error::WrongType),
            Some(Value::List(list)) => list,
        };

        let len = list.len() as isize;
        let start = if start < 0 { (len + start).max(0) } else { start };
        let stop = if stop < 0 { len + stop } else { stop.min(len - 1) };
        if start > stop || start >= len {
            return Ok(Vec::new());
        }
        Ok(list[start as usize..=stop as usize].to_vec())
    }

    pub(crate) fn flush(&mut self) {
        self.entries.clear();
    }

    /// Applies all commands or, on the first failure, restores every key the
    /// batch touches to its previous state.
    pub(crate) fn apply_batch(
        &mut self,
        commands: Vec<Command>,
        now: Instant,
    ) -> Result<(), Error> {
        let mut saved: Vec<(String, Option<Entry>)> = Vec::with_capacity(commands.len());
        for command in &commands {
            let key = command.key();
            if !saved.iter().any(|(saved_key, _)| saved_key == key) {
                saved.push((key.to_owned(), self.entries.get(key).cloned()));
            }
        }

        for command in commands {
            if let Err(error) = self.apply(command, now) {
                for (key, entry) in saved {
                    match entry {
                        Some(entry) => self.entries.insert(key, entry),
                        None => self.entries.remove(&key),
                    };
                }
                return Err(error);
            }
        }
        Ok(())
    }

    fn apply(&mut self, command: Command, now: Instant) -> Result<(), Error> {
        match command {
            Command::Set { key, value } => {
                self.set(&key, value);
                Ok(())
            }
            Command::SetWithExpiry { key, value, ttl } => {
                self.set_with_expiry(&key, value, ttl, now)
            }
            Command::Increment { key } => self.increment(&key, now).map(drop),
            Command::AppendToList { key, value } => {
                self.append_to_list(&key, value, now).map(drop)
            }
        }
    }

    pub(crate) fn ttl(&mut self, key: &str, now: Instant) -> Option<Duration> {
        self.live(key, now)?
            .expires_at
            .map(|deadline| deadline.saturating_duration_since(now))
    }

    pub(crate) fn len(&self, now: Instant) -> usize {
        self.entries
            .values()
            .filter(|entry| !entry.is_expired(now))
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn list(keyspace: &mut Keyspace, key: &str, now: Instant, items: &[&str]) {
        for item in items {
            keyspace
                .append_to_list(key, Bytes::copy_from_slice(item.as_bytes()), now)
                .unwrap();
        }
    }

    #[test]
    fn list_range_follows_redis_index_rules() {
        let now = Instant::now();
        let mut keyspace = Keyspace::default();
        list(&mut keyspace, "l", now, &["a", "b", "c", "d"]);

        let range = |ks: &mut Keyspace, start, stop| -> Vec<Bytes> {
            ks.list_range("l", start, stop, now).unwrap()
        };

        assert_eq!(range(&mut keyspace, 0, -1).len(), 4);
        assert_eq!(range(&mut keyspace, 1, 2), vec!["b", "c"]);
        assert_eq!(range(&mut keyspace, -2, -1), vec!["c", "d"]);
        assert_eq!(range(&mut keyspace, -100, 0), vec!["a"]);
        assert_eq!(range(&mut keyspace, 2, 100), vec!["c", "d"]);
        assert!(range(&mut keyspace, 3, 1).is_empty());
        assert!(range(&mut keyspace, 10, 20).is_empty());
        assert!(keyspace.list_range("missing", 0, -1, now).unwrap().is_empty());
    }

    #[test]
    fn wrong_type_is_rejected() {
        let now = Instant::now();
        let mut keyspace = Keyspace::default();
        keyspace.set("s", Bytes::from_static(b"text"));
        list(&mut keyspace, "l", now, &["x"]);

        assert_eq!(
            keyspace.append_to_list("s", Bytes::new(), now),
            Err(Error::WrongType)
        );
        assert_eq!(keyspace.get("l", now), Err(Error::WrongType));
        assert_eq!(keyspace.increment("l", now), Err(Error::WrongType));
        assert_eq!(keyspace.list_range("s", 0, -1, now), Err(Error::WrongType));
    }

    #[test]
    fn increment_parses_existing_text() {
        let now = Instant::now();
        let mut keyspace = Keyspace::default();
        assert_eq!(keyspace.increment("n", now), Ok(1));
        keyspace.set("n", Bytes::from_static(b"41"));
        assert_eq!(keyspace.increment("n", now), Ok(42));
        keyspace.set("n", Bytes::from_static(b"forty"));
        assert_eq!(keyspace.increment("n", now), Err(Error::NotAnInteger));
        keyspace.set("n", Bytes::from(i64::MAX.to_string()));
        assert_eq!(keyspace.increment("n", now), Err(Error::Overflow));
    }

    #[test]
    fn expired_entries_read_as_absent() {
        let start = Instant::now();
        let mut keyspace = Keyspace::default();
        keyspace
            .set_with_expiry("k", Bytes::from_static(b"v"), Duration::from_secs(10), start)
            .unwrap();

        let later = start + Duration::from_secs(9);
        assert_eq!(keyspace.ttl("k", later), Some(Duration::from_secs(1)));
        assert_eq!(keyspace.get("k", later), Ok(Some(Bytes::from_static(b"v"))));

        let expired = start + Duration::from_secs(10);
        assert_eq!(keyspace.get("k", expired), Ok(None));
        assert_eq!(keyspace.len(expired), 0);
    }

    #[test]
    fn set_clears_previous_expiry() {
        let now = Instant::now();
        let mut keyspace = Keyspace::default();
        keyspace
            .set_with_expiry("k", Bytes::from_static(b"v"), Duration::from_secs(1), now)
            .unwrap();
        keyspace.set("k", Bytes::from_static(b"w"));
        assert_eq!(keyspace.ttl("k", now), None);
        assert_eq!(
            keyspace.get("k", now + Duration::from_secs(5)),
            Ok(Some(Bytes::from_static(b"w")))
        );
    }

    #[test]
    fn failed_batch_restores_touched_keys() {
        let now = Instant::now();
        let mut keyspace = Keyspace::default();
        keyspace.set("counter", Bytes::from_static(b"7"));
        keyspace.set("text", Bytes::from_static(b"plain"));

        let commands = vec![
            Command::AppendToList {
                key: "history".into(),
                value: Bytes::from_static(b"call"),
            },
            Command::Increment {
                key: "counter".into(),
            },
            Command::AppendToList {
                key: "text".into(),
                value: Bytes::from_static(b"boom"),
            },
        ];

        assert_eq!(keyspace.apply_batch(commands, now), Err(Error::WrongType));
        assert!(keyspace.list_range("history", 0, -1, now).unwrap().is_empty());
        assert_eq!(keyspace.get("counter", now), Ok(Some(Bytes::from_static(b"7"))));
        assert_eq!(keyspace.get("text", now), Ok(Some(Bytes::from_static(b"plain"))));
        assert_eq!(keyspace.len(now), 2);
    }
}
