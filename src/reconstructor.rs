//! Specialized reconstructors per object kind
//! - list, mapping, record: register the empty copy BEFORE any child is visited
//! - tuple: immutable, so children are copied first and the original is reused when nothing changed
//!
//! Each composite under construction is a [`Frame`] on the engine's work stack. The engine
//! feeds child copies back through [`Frame::accept`] and calls [`finish`] once the last
//! child is in.

use std::sync::Arc;

use crate::deepcopy::Copier;
use crate::heap::{Heap, ObjId, Object, Value};
use crate::identity::Identity;
use crate::memo_trait::Memo;
use crate::types::CopyResult;

/// A composite whose children are still being copied
pub(crate) struct Frame {
    /// Source children in traversal order (mapping keys before values)
    sources: Vec<Value>,
    next: usize,
    depth: usize,
    target: Target,
}

enum Target {
    List(ObjId),
    Mapping {
        copy: ObjId,
        pending_key: Option<Value>,
    },
    Record {
        copy: ObjId,
        names: Vec<Arc<str>>,
    },
    Tuple {
        key: Identity,
        copies: Vec<Value>,
        all_identical: bool,
    },
}

impl Frame {
    #[inline(always)]
    pub(crate) fn depth(&self) -> usize {
        self.depth
    }

    /// Next source child to copy, or `None` once every child has been handed out
    pub(crate) fn next_child(&mut self) -> Option<Value> {
        let child = self.sources.get(self.next).cloned()?;
        self.next += 1;
        Some(child)
    }

    /// Store the copy of the child most recently returned by `next_child`
    pub(crate) fn accept(&mut self, heap: &mut Heap, copied: Value) {
        match &mut self.target {
            Target::List(copy) => {
                heap.push_child(*copy, copied);
            }
            Target::Mapping { copy, pending_key } => match pending_key.take() {
                None => *pending_key = Some(copied),
                Some(key) => {
                    heap.push_entry(*copy, key, copied);
                }
            },
            Target::Record { copy, names } => {
                let name = Arc::clone(&names[self.next - 1]);
                heap.push_field(*copy, name, copied);
            }
            Target::Tuple {
                copies,
                all_identical,
                ..
            } => {
                // Track if all elements are identical
                if !heap.is_same(&copied, &self.sources[self.next - 1]) {
                    *all_identical = false;
                }
                copies.push(copied);
            }
        }
    }
}

/// Open list: allocate and save to memo before any child is visited
pub(crate) fn open_list<M: Memo + ?Sized>(
    cx: &mut Copier<'_, M>,
    key: Identity,
    shell: Object,
    items: Vec<Value>,
    depth: usize,
) -> Frame {
    let new_list = cx.alloc(shell);
    cx.memo.set(key, new_list);
    Frame {
        sources: items,
        next: 0,
        depth,
        target: Target::List(new_list),
    }
}

/// Open mapping, keys and values alike
pub(crate) fn open_mapping<M: Memo + ?Sized>(
    cx: &mut Copier<'_, M>,
    key: Identity,
    shell: Object,
    entries: Vec<(Value, Value)>,
    depth: usize,
) -> Frame {
    let new_mapping = cx.alloc(shell);
    cx.memo.set(key, new_mapping);
    Frame {
        sources: entries.into_iter().flat_map(|(k, v)| [k, v]).collect(),
        next: 0,
        depth,
        target: Target::Mapping {
            copy: new_mapping,
            pending_key: None,
        },
    }
}

/// Open record; the class name and field names are shared
pub(crate) fn open_record<M: Memo + ?Sized>(
    cx: &mut Copier<'_, M>,
    key: Identity,
    shell: Object,
    fields: Vec<(Arc<str>, Value)>,
    depth: usize,
) -> Frame {
    let new_record = cx.alloc(shell);
    cx.memo.set(key, new_record);
    let (names, sources) = fields.into_iter().unzip();
    Frame {
        sources,
        next: 0,
        depth,
        target: Target::Record {
            copy: new_record,
            names,
        },
    }
}

/// Open tuple; nothing is allocated until the children are known
pub(crate) fn open_tuple(key: Identity, items: Vec<Value>, depth: usize) -> Frame {
    Frame {
        target: Target::Tuple {
            key,
            copies: Vec::with_capacity(items.len()),
            all_identical: true,
        },
        sources: items,
        next: 0,
        depth,
    }
}

/// Close a frame whose children are all copied
pub(crate) fn finish<M: Memo + ?Sized>(cx: &mut Copier<'_, M>, frame: Frame) -> CopyResult {
    match frame.target {
        Target::List(copy)
        | Target::Mapping { copy, .. }
        | Target::Record { copy, .. } => CopyResult::Copied(Value::Ref(copy)),
        Target::Tuple {
            key,
            copies,
            all_identical,
        } => {
            // If all elements identical, return original tuple
            if all_identical {
                return CopyResult::Immutable(Value::Ref(key.id()));
            }

            // Check if tuple was copied recursively (self-referential through a child)
            if let Some(cached) = cx.memo.get(&key) {
                return CopyResult::FromMemo(Value::Ref(cached));
            }

            let new_tuple = cx.alloc(Object::Tuple(copies));
            cx.memo.set(key, new_tuple);
            CopyResult::Copied(Value::Ref(new_tuple))
        }
    }
}
