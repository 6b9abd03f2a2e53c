/// Reference-counted registry of shared objects.
///
/// Equal keys map to one entry. Each `acquire` bumps the entry's count and
/// each `release` drops it; the entry is removed (and its value handed back
/// for destruction) when the count reaches zero.

use std::hash::Hash;
use rustc_hash::FxHashMap;
use slotmap::{Key, SlotMap};

struct RegistryEntry<K, V> {
    key: K,
    ref_count: u32,
    value: V,
}

/// Outcome of `SharedRegistry::release`
#[derive(Debug, PartialEq)]
pub enum Released<V> {
    /// Other holders remain (remaining count)
    Shared(u32),
    /// Last holder gone, entry removed
    Destroyed(V),
    /// Handle does not (or no longer) refer to an entry
    Stale,
}

pub struct SharedRegistry<H: Key, K, V> {
    entries: SlotMap<H, RegistryEntry<K, V>>,
    index: FxHashMap<K, H>,
}

impl<H: Key, K: Eq + Hash + Clone, V> SharedRegistry<H, K, V> {
    pub fn new() -> Self {
        Self {
            entries: SlotMap::with_key(),
            index: FxHashMap::default(),
        }
    }

    /// Acquire the entry for `key`, creating it with `V::default()` on first use
    pub fn acquire(&mut self, key: K) -> H
    where
        V: Default,
    {
        let handle = match self.index.get(&key) {
            Some(&handle) => handle,
            None => {
                let handle = self.entries.insert(RegistryEntry {
                    key: key.clone(),
                    ref_count: 0,
                    value: V::default(),
                });
                self.index.insert(key, handle);
                handle
            }
        };
        self.entries[handle].ref_count += 1;
        handle
    }

    pub fn release(&mut self, handle: H) -> Released<V> {
        let Some(entry) = self.entries.get_mut(handle) else {
            return Released::Stale;
        };

        entry.ref_count -= 1;
        if entry.ref_count > 0 {
            return Released::Shared(entry.ref_count);
        }

        match self.entries.remove(handle) {
            Some(entry) => {
                self.index.remove(&entry.key);
                Released::Destroyed(entry.value)
            }
            None => Released::Stale,
        }
    }

    pub fn get(&self, handle: H) -> Option<&V> {
        self.entries.get(handle).map(|e| &e.value)
    }

    pub fn get_mut(&mut self, handle: H) -> Option<&mut V> {
        self.entries.get_mut(handle).map(|e| &mut e.value)
    }

    pub fn key(&self, handle: H) -> Option<&K> {
        self.entries.get(handle).map(|e| &e.key)
    }

    /// Current holder count (0 for stale handles)
    pub fn ref_count(&self, handle: H) -> u32 {
        self.entries.get(handle).map_or(0, |e| e.ref_count)
    }

    pub fn contains(&self, handle: H) -> bool {
        self.entries.contains_key(handle)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Remove every entry regardless of its count, yielding the values
    pub fn drain(&mut self) -> impl Iterator<Item = V> + '_ {
        self.index.clear();
        self.entries.drain().map(|(_, entry)| entry.value)
    }
}

impl<H: Key, K: Eq + Hash + Clone, V> Default for SharedRegistry<H, K, V> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "registry_tests.rs"]
mod tests;
