//! Forgetful memo: a drop-in memo that discards every insertion
//!
//! Use it when every occurrence of a repeated object should become its own
//! copy. On shared sub-structure the copies stop aliasing; on a true cycle
//! the traversal never reaches a base case and ends in
//! `CopyError::RecursionLimitExceeded`.

use tracing::trace;

use crate::heap::ObjId;
use crate::identity::Identity;
use crate::memo::MemoTable;
use crate::memo_trait::Memo;

#[derive(Debug, Clone, Default)]
pub struct ForgetfulMemo {
    // Never written to, so every lookup misses
    table: MemoTable,
    discarded: usize,
}

impl ForgetfulMemo {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of insertions silently dropped so far
    pub fn discarded(&self) -> usize {
        self.discarded
    }
}

impl Memo for ForgetfulMemo {
    #[inline(always)]
    fn get(&mut self, key: &Identity) -> Option<ObjId> {
        self.table.lookup(key)
    }

    #[inline(always)]
    fn set(&mut self, key: Identity, value: ObjId) {
        trace!(original = ?key.id(), copy = ?value, "forgetful memo discarded insert");
        self.discarded += 1;
    }

    fn clear(&mut self) {
        self.discarded = 0;
    }

    fn len(&self) -> usize {
        self.table.stats().1
    }

    fn name(&self) -> &'static str {
        "forgetful"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::heap::Heap;

    #[test]
    fn test_lookup_after_insert_misses() {
        let mut heap = Heap::new();
        let a = heap.list(vec![]);
        let copy = heap.list(vec![]);
        let mut memo = ForgetfulMemo::new();

        memo.set(Identity::of(a), copy);
        assert_eq!(memo.get(&Identity::of(a)), None);
        assert!(memo.is_empty());
        assert_eq!(memo.discarded(), 1);

        memo.set(Identity::of(a), copy);
        assert_eq!(memo.get(&Identity::of(a)), None);
        assert_eq!(memo.discarded(), 2);

        memo.clear();
        assert_eq!(memo.discarded(), 0);
    }

    #[test]
    fn test_usable_as_trait_object() {
        let mut heap = Heap::new();
        let a = heap.list(vec![]);
        let mut memo: Box<dyn Memo> = Box::new(ForgetfulMemo::new());
        memo.set(Identity::of(a), a);
        assert_eq!(memo.get(&Identity::of(a)), None);
        assert_eq!(memo.name(), "forgetful");
    }
}
