//! Change detection for repeatedly polled values

use std::collections::HashMap;
use std::hash::Hash;

/// Remembers the last value observed per key and only hands back values that
/// differ from it.
///
/// With `silent_first_call` the first observation of a key only primes the
/// cache.
#[derive(Debug, Clone)]
pub struct PollCache<K, V> {
    cached: HashMap<K, Observation<V>>,
    silent_first_call: bool,
}

#[derive(Debug, Clone)]
struct Observation<V> {
    value: V,
    changes: u64,
}

impl<K, V> PollCache<K, V>
where
    K: Eq + Hash,
    V: PartialEq + Clone,
{
    pub fn new(silent_first_call: bool) -> Self {
        Self {
            cached: HashMap::new(),
            silent_first_call,
        }
    }

    /// Record `value` for `key`. Returns it if it is new.
    pub fn poll(&mut self, key: K, value: V) -> Option<V> {
        match self.cached.get_mut(&key) {
            Some(seen) if seen.value == value => None,
            Some(seen) => {
                seen.value = value.clone();
                seen.changes += 1;
                Some(value)
            }
            None => {
                self.cached.insert(
                    key,
                    Observation {
                        value: value.clone(),
                        changes: 0,
                    },
                );
                (!self.silent_first_call).then_some(value)
            }
        }
    }

    /// Like [`poll`](Self::poll), producing the value with `f`. Errors leave
    /// the cache untouched.
    pub fn poll_with<F, E>(&mut self, key: K, f: F) -> Result<Option<V>, E>
    where
        F: FnOnce() -> Result<V, E>,
    {
        let value = f()?;
        Ok(self.poll(key, value))
    }

    /// How many times the value for `key` has changed since it was first seen.
    pub fn changes(&self, key: &K) -> Option<u64> {
        self.cached.get(key).map(|o| o.changes)
    }

    pub fn last(&self, key: &K) -> Option<&V> {
        self.cached.get(key).map(|o| &o.value)
    }

    pub fn forget(&mut self, key: &K) {
        self.cached.remove(key);
    }

    pub fn len(&self) -> usize {
        self.cached.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cached.is_empty()
    }
}

impl<K, V> Default for PollCache<K, V>
where
    K: Eq + Hash,
    V: PartialEq + Clone,
{
    fn default() -> Self {
        Self::new(false)
    }
}
