//! Identity keys for the memo
//! - Derived from the object's handle, never from its contents
//! - Hash is computed ONCE per visit and carried with the key

use crate::heap::ObjId;

/// Memo key: the source object's handle plus its precomputed hash
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Identity {
    id: ObjId,
    hash: u64,
}

impl Identity {
    #[inline(always)]
    pub fn of(id: ObjId) -> Self {
        Self {
            id,
            hash: hash_handle(id),
        }
    }

    #[inline(always)]
    pub fn id(&self) -> ObjId {
        self.id
    }

    #[inline(always)]
    pub fn prehash(&self) -> u64 {
        self.hash
    }
}

impl From<ObjId> for Identity {
    fn from(id: ObjId) -> Self {
        Identity::of(id)
    }
}

/// Compute hash from handle (SplitMix64 finalizer)
#[inline(always)]
pub fn hash_handle(id: ObjId) -> u64 {
    let mut h = id.index() as u64;
    h ^= h >> 33;
    h = h.wrapping_mul(0xff51afd7ed558ccd);
    h ^= h >> 33;
    h = h.wrapping_mul(0xc4ceb9fe1a85ec53);
    h ^= h >> 33;
    h
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::heap::{Heap, Value};

    #[test]
    fn test_hash_handle() {
        let mut heap = Heap::new();
        let a = heap.list(vec![]);
        let b = heap.list(vec![]);
        let h1 = hash_handle(a);
        let h2 = hash_handle(b);
        assert_ne!(h1, h2);
        // Hash should be deterministic
        assert_eq!(h1, hash_handle(a));
    }

    #[test]
    fn test_value_equal_objects_get_distinct_keys() {
        let mut heap = Heap::new();
        let a = heap.record("T", vec![("x", Value::int(1))]);
        let b = heap.record("T", vec![("x", Value::int(1))]);
        assert_eq!(heap.get(a), heap.get(b));
        assert_ne!(Identity::of(a), Identity::of(b));
        assert_eq!(Identity::of(a), Identity::from(a));
    }
}
