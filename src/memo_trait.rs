//! Memo trait for polymorphism over memo implementations

use crate::heap::ObjId;
use crate::identity::Identity;

/// Trait for memo operations - implemented by MemoTable, ForgetfulMemo and caller-owned maps
///
/// The traversal is generic over this trait, so a memo that breaks its contract
/// can be dropped in anywhere a correct one is expected.
///
/// Contract of a standard memo: once `set(k, v)` happened, every later `get(k)`
/// in the same traversal returns `v`, and nothing is evicted mid-traversal.
pub trait Memo {
    /// Look up the copy already produced for a source object
    fn get(&mut self, key: &Identity) -> Option<ObjId>;

    /// Record that `value` is the copy of the object behind `key`
    fn set(&mut self, key: Identity, value: ObjId);

    /// Drop every entry (pooled reuse between calls)
    fn clear(&mut self);

    /// Number of stored entries
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Short label used in logs
    fn name(&self) -> &'static str;
}

impl<M: Memo + ?Sized> Memo for Box<M> {
    #[inline(always)]
    fn get(&mut self, key: &Identity) -> Option<ObjId> {
        (**self).get(key)
    }

    #[inline(always)]
    fn set(&mut self, key: Identity, value: ObjId) {
        (**self).set(key, value)
    }

    fn clear(&mut self) {
        (**self).clear()
    }

    fn len(&self) -> usize {
        (**self).len()
    }

    fn name(&self) -> &'static str {
        (**self).name()
    }
}

impl<M: Memo + ?Sized> Memo for &mut M {
    #[inline(always)]
    fn get(&mut self, key: &Identity) -> Option<ObjId> {
        (**self).get(key)
    }

    #[inline(always)]
    fn set(&mut self, key: Identity, value: ObjId) {
        (**self).set(key, value)
    }

    fn clear(&mut self) {
        (**self).clear()
    }

    fn len(&self) -> usize {
        (**self).len()
    }

    fn name(&self) -> &'static str {
        (**self).name()
    }
}
