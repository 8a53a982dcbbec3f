//! Core deepcopy implementation
//!
//! Flow for every visited value:
//! 1. Atoms and heap leaves are returned as-is, no memo traffic
//! 2. The memo is consulted with the identity key (hash computed once)
//! 3. On a miss the depth guard is checked and the object is dispatched by kind
//! 4. Mutable containers register their empty copy before their children are visited
//!    (see `reconstructor`)
//!
//! Traversal runs on an explicit stack of frames, one per composite under
//! construction, so nesting depth is bounded by the recursion limit rather than by
//! the thread's native stack.

use tracing::{debug, trace, warn};

use crate::config::CopyConfig;
use crate::error::{CopyError, Result};
use crate::heap::{Heap, ObjId, Object, Value};
use crate::identity::Identity;
use crate::memo_trait::Memo;
use crate::reconstructor::{self, Frame};
use crate::state::with_thread_memo;
use crate::types::CopyResult;

/// Outcome of visiting one value
enum Step {
    /// Resolved without descending
    Done(CopyResult),
    /// A composite whose children must be copied next
    Enter(Frame),
}

/// Traversal state for one deep copy invocation
pub(crate) struct Copier<'a, M: Memo + ?Sized> {
    pub(crate) heap: &'a mut Heap,
    pub(crate) memo: &'a mut M,
    limit: usize,
    allocated: usize,
    memo_hits: usize,
    max_depth: usize,
}

impl<'a, M: Memo + ?Sized> Copier<'a, M> {
    fn new(heap: &'a mut Heap, memo: &'a mut M, config: CopyConfig) -> Self {
        Self {
            heap,
            memo,
            limit: config.recursion_limit,
            allocated: 0,
            memo_hits: 0,
            max_depth: 0,
        }
    }

    /// Copy `root`, driving the frame stack until the root's copy is complete
    fn run(&mut self, root: &Value) -> Result<CopyResult> {
        let mut stack = match self.visit(root, 1)? {
            Step::Done(result) => return Ok(result),
            Step::Enter(frame) => vec![frame],
        };

        // The stack is never empty inside the loop: the root frame returns instead
        loop {
            let top = stack.len() - 1;
            match stack[top].next_child() {
                Some(child) => {
                    let depth = stack[top].depth() + 1;
                    match self.visit(&child, depth)? {
                        Step::Enter(frame) => stack.push(frame),
                        Step::Done(result) => stack[top].accept(self.heap, result.into_value()),
                    }
                }
                None => {
                    let result = reconstructor::finish(self, stack.swap_remove(top));
                    match stack.last_mut() {
                        Some(parent) => parent.accept(self.heap, result.into_value()),
                        None => return Ok(result),
                    }
                }
            }
        }
    }

    /// Visit one value found at nesting `depth` (the root sits at depth 1)
    fn visit(&mut self, value: &Value, depth: usize) -> Result<Step> {
        let id = match value {
            Value::Atom(_) => return Ok(Step::Done(CopyResult::Immutable(value.clone()))),
            Value::Ref(id) => *id,
        };

        if self.heap.get(id).kind().is_leaf() {
            return Ok(Step::Done(CopyResult::Immutable(value.clone())));
        }

        // Compute hash ONCE
        let key = Identity::of(id);

        if let Some(cached) = self.memo.get(&key) {
            trace!(original = ?id, copy = ?cached, "memo hit");
            self.memo_hits += 1;
            return Ok(Step::Done(CopyResult::FromMemo(Value::Ref(cached))));
        }

        if depth > self.limit {
            warn!(
                limit = self.limit,
                memo = self.memo.name(),
                "recursion limit exceeded during deep copy"
            );
            return Err(CopyError::RecursionLimitExceeded { limit: self.limit });
        }
        self.max_depth = self.max_depth.max(depth);

        Ok(self.dispatch(id, key, depth))
    }

    /// Dispatch to the reconstructor for the object's shape
    fn dispatch(&mut self, id: ObjId, key: Identity, depth: usize) -> Step {
        let source = self.heap.get(id);
        let shell = source.empty_like();
        let frame = match source {
            Object::List(items) => {
                let items = items.clone();
                reconstructor::open_list(self, key, shell, items, depth)
            }
            Object::Mapping(entries) => {
                let entries = entries.clone();
                reconstructor::open_mapping(self, key, shell, entries, depth)
            }
            Object::Record { fields, .. } => {
                let fields = fields.clone();
                reconstructor::open_record(self, key, shell, fields, depth)
            }
            Object::Tuple(items) => reconstructor::open_tuple(key, items.clone(), depth),
            Object::Leaf(_) => return Step::Done(CopyResult::Immutable(Value::Ref(id))),
        };
        Step::Enter(frame)
    }

    /// Allocate a copy in the heap
    pub(crate) fn alloc(&mut self, object: Object) -> ObjId {
        self.allocated += 1;
        self.heap.alloc(object)
    }
}

/// Deep copy `root` with a fresh standard memo and the default configuration.
///
/// The memo is a pooled thread-local table that is cleared after the call.
/// A tuple whose children all copy to themselves (atoms, leaves, or such tuples)
/// is returned as the same handle rather than a new one.
pub fn deep_copy(heap: &mut Heap, root: &Value) -> Result<Value> {
    with_thread_memo(|memo| deep_copy_with(heap, root, memo, CopyConfig::default()))
}

/// Deep copy `root` using a caller-supplied memo.
///
/// Entries already present in `memo` are honoured, so a memo shared across calls
/// makes later calls reuse copies produced by earlier ones. On error, copies
/// allocated before the failure stay in the heap but are unreachable from any
/// returned value. Tuples with nothing to copy are shared, as in [`deep_copy`].
pub fn deep_copy_with<M: Memo + ?Sized>(
    heap: &mut Heap,
    root: &Value,
    memo: &mut M,
    config: CopyConfig,
) -> Result<Value> {
    let mut copier = Copier::new(heap, memo, config);
    let result = copier.run(root)?;
    debug!(
        memo = copier.memo.name(),
        memo_entries = copier.memo.len(),
        allocated = copier.allocated,
        memo_hits = copier.memo_hits,
        max_depth = copier.max_depth,
        from_memo = result.is_from_memo(),
        immutable = result.is_immutable(),
        "deep copy finished"
    );
    Ok(result.into_value())
}
