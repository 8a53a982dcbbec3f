//! Thread-local memo reuse
//!
//! Pattern:
//! 1. A `MemoTable` is parked in TLS between calls
//! 2. A call takes it out (or creates a fresh one if it is already taken, e.g. re-entrancy)
//! 3. After the call the table is cleared, shrunk if it ballooned, and parked again
//!
//! The table is always empty when handed out, so every call starts from a fresh memo.

use std::cell::RefCell;

use crate::memo::MemoTable;

thread_local! {
    static THREAD_MEMO: RefCell<Option<MemoTable>> = const { RefCell::new(None) };
}

/// Get or create thread-local memo
pub fn take_thread_memo() -> MemoTable {
    THREAD_MEMO
        .with(|slot| slot.borrow_mut().take())
        .unwrap_or_default()
}

/// Return memo to thread-local storage after cleanup
pub fn return_thread_memo(mut memo: MemoTable) {
    memo.clear();
    memo.shrink_if_large();
    THREAD_MEMO.with(|slot| {
        *slot.borrow_mut() = Some(memo);
    });
}

/// Run `f` with the pooled memo, returning it to the pool afterwards
pub fn with_thread_memo<R>(f: impl FnOnce(&mut MemoTable) -> R) -> R {
    let mut memo = take_thread_memo();
    let result = f(&mut memo);
    return_thread_memo(memo);
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::heap::Heap;
    use crate::identity::Identity;

    #[test]
    fn test_pooled_memo_is_cleared_between_uses() {
        let mut heap = Heap::new();
        let a = heap.list(vec![]);

        with_thread_memo(|memo| {
            memo.insert(Identity::of(a), a);
            assert_eq!(memo.lookup(&Identity::of(a)), Some(a));
        });
        with_thread_memo(|memo| {
            assert_eq!(memo.lookup(&Identity::of(a)), None);
            assert_eq!(memo.stats().1, 0);
        });
    }

    #[test]
    fn test_nested_use_gets_independent_table() {
        let mut heap = Heap::new();
        let a = heap.list(vec![]);

        with_thread_memo(|outer| {
            outer.insert(Identity::of(a), a);
            with_thread_memo(|inner| {
                assert_eq!(inner.lookup(&Identity::of(a)), None);
            });
            assert_eq!(outer.lookup(&Identity::of(a)), Some(a));
        });
    }
}
