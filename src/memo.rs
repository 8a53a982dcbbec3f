//! MemoTable: hash table for memoization
//!
//! Uses open addressing with linear probing.
//! Hash is computed ONCE per visit (see `Identity`) and reused throughout.
//! Entries are never removed individually, only cleared wholesale between calls.

use crate::heap::ObjId;
use crate::identity::{hash_handle, Identity};
use crate::memo_trait::Memo;

const INITIAL_SIZE: usize = 8;
const LOAD_FACTOR_NUM: usize = 7;
const LOAD_FACTOR_DEN: usize = 10;

/// Maximum size to retain between calls (131072 slots)
const RETAIN_MAX_SLOTS: usize = 1 << 17;
/// Shrink to this size (8192 slots)
const RETAIN_SHRINK_TO: usize = 1 << 13;

#[derive(Debug, Clone, Copy)]
struct MemoEntry {
    key: ObjId,
    value: ObjId,
}

/// Standard memo: every insertion is remembered until `clear`
#[derive(Debug, Clone, Default)]
pub struct MemoTable {
    slots: Vec<Option<MemoEntry>>,
    used: usize,
}

impl MemoTable {
    #[inline(always)]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create with room for at least `capacity` entries before growing
    pub fn with_capacity(capacity: usize) -> Self {
        let mut table = Self::new();
        if capacity > 0 {
            let wanted = (capacity * LOAD_FACTOR_DEN / LOAD_FACTOR_NUM + 1).next_power_of_two();
            table.resize(wanted.max(INITIAL_SIZE));
        }
        table
    }

    #[inline(always)]
    fn size(&self) -> usize {
        self.slots.len()
    }

    /// Resize table to new size (must be power of 2)
    fn resize(&mut self, new_size: usize) {
        debug_assert!(new_size.is_power_of_two());
        let old = std::mem::replace(&mut self.slots, vec![None; new_size]);
        let mask = new_size - 1;
        for entry in old.into_iter().flatten() {
            let mut idx = (hash_handle(entry.key) as usize) & mask;
            while self.slots[idx].is_some() {
                idx = (idx + 1) & mask;
            }
            self.slots[idx] = Some(entry);
        }
    }

    /// Lookup with precomputed hash (hot path)
    #[inline(always)]
    pub fn lookup(&self, key: &Identity) -> Option<ObjId> {
        if self.slots.is_empty() {
            return None;
        }

        let mask = self.size() - 1;
        let mut idx = (key.prehash() as usize) & mask;

        loop {
            match &self.slots[idx] {
                None => return None,
                Some(entry) if entry.key == key.id() => return Some(entry.value),
                Some(_) => idx = (idx + 1) & mask,
            }
        }
    }

    /// Insert with precomputed hash, overwriting an existing entry for the same key
    #[inline]
    pub fn insert(&mut self, key: Identity, value: ObjId) {
        // Resize if needed (70% load factor)
        if (self.used + 1) * LOAD_FACTOR_DEN > self.size() * LOAD_FACTOR_NUM {
            let new_size = if self.slots.is_empty() {
                INITIAL_SIZE
            } else {
                self.size() * 2
            };
            self.resize(new_size);
        }

        let mask = self.size() - 1;
        let mut idx = (key.prehash() as usize) & mask;

        loop {
            let slot = &mut self.slots[idx];
            match slot {
                None => {
                    *slot = Some(MemoEntry {
                        key: key.id(),
                        value,
                    });
                    self.used += 1;
                    return;
                }
                Some(entry) if entry.key == key.id() => {
                    entry.value = value;
                    return;
                }
                Some(_) => idx = (idx + 1) & mask,
            }
        }
    }

    /// Clear all entries (but keep capacity for reuse)
    pub fn clear(&mut self) {
        if self.used == 0 {
            return;
        }
        self.slots.iter_mut().for_each(|slot| *slot = None);
        self.used = 0;
    }

    /// Shrink if table grew too large
    pub fn shrink_if_large(&mut self) {
        if self.size() > RETAIN_MAX_SLOTS {
            let floor = (self.used * LOAD_FACTOR_DEN / LOAD_FACTOR_NUM + 1).next_power_of_two();
            self.resize(RETAIN_SHRINK_TO.max(floor));
        }
    }

    /// Iterate `(original, copy)` entries in slot order
    pub fn iter(&self) -> impl Iterator<Item = (ObjId, ObjId)> + '_ {
        self.slots
            .iter()
            .flatten()
            .map(|entry| (entry.key, entry.value))
    }

    /// Get current usage stats: (capacity, live entries)
    pub fn stats(&self) -> (usize, usize) {
        (self.size(), self.used)
    }
}

impl Memo for MemoTable {
    #[inline(always)]
    fn get(&mut self, key: &Identity) -> Option<ObjId> {
        self.lookup(key)
    }

    #[inline(always)]
    fn set(&mut self, key: Identity, value: ObjId) {
        self.insert(key, value);
    }

    fn clear(&mut self) {
        MemoTable::clear(self);
    }

    fn len(&self) -> usize {
        self.used
    }

    fn name(&self) -> &'static str {
        "standard"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::heap::Heap;

    fn ids(n: usize) -> Vec<ObjId> {
        let mut heap = Heap::new();
        (0..n).map(|_| heap.list(vec![])).collect()
    }

    #[test]
    fn test_memo_basic() {
        let ids = ids(3);
        let mut table = MemoTable::new();

        assert!(table.lookup(&Identity::of(ids[0])).is_none());

        table.insert(Identity::of(ids[0]), ids[1]);
        assert_eq!(table.lookup(&Identity::of(ids[0])), Some(ids[1]));
        assert_eq!(table.lookup(&Identity::of(ids[1])), None);

        // Later inserts for the same key overwrite
        table.insert(Identity::of(ids[0]), ids[2]);
        assert_eq!(table.lookup(&Identity::of(ids[0])), Some(ids[2]));
        assert_eq!(Memo::len(&table), 1);
    }

    #[test]
    fn test_memo_grows_and_keeps_entries() {
        let ids = ids(1000);
        let mut table = MemoTable::new();
        for pair in ids.chunks(2) {
            table.insert(Identity::of(pair[0]), pair[1]);
        }
        let (size, used) = table.stats();
        assert_eq!(used, 500);
        assert!(size.is_power_of_two());
        assert!(used * 10 <= size * 7);
        for pair in ids.chunks(2) {
            assert_eq!(table.lookup(&Identity::of(pair[0])), Some(pair[1]));
        }
        assert_eq!(table.iter().count(), 500);
    }

    #[test]
    fn test_memo_clear_keeps_capacity() {
        let ids = ids(20);
        let mut table = MemoTable::with_capacity(10);
        let (initial, _) = table.stats();
        for id in &ids[..10] {
            table.insert(Identity::of(*id), *id);
        }
        assert_eq!(table.stats().0, initial);
        table.clear();
        assert_eq!(table.stats(), (initial, 0));
        assert!(table.lookup(&Identity::of(ids[3])).is_none());
    }

    #[test]
    fn test_shrink_if_large() {
        let ids = ids(4);
        let mut table = MemoTable::with_capacity(RETAIN_MAX_SLOTS);
        table.insert(Identity::of(ids[0]), ids[1]);
        assert!(table.stats().0 > RETAIN_MAX_SLOTS);
        table.shrink_if_large();
        assert_eq!(table.stats(), (RETAIN_SHRINK_TO, 1));
        assert_eq!(table.lookup(&Identity::of(ids[0])), Some(ids[1]));
    }
}
