//! Extra utilities: shallow copy and replicate

use crate::config::CopyConfig;
use crate::deepcopy::deep_copy_with;
use crate::error::Result;
use crate::heap::{Heap, Object, Value};
use crate::state::with_thread_memo;

/// Shallow copy: a new top-level container sharing the source's children.
///
/// Atoms, heap leaves and tuples are immutable and come back unchanged.
pub fn shallow_copy(heap: &mut Heap, root: &Value) -> Value {
    let id = match root {
        Value::Atom(_) => return root.clone(),
        Value::Ref(id) => *id,
    };
    let copy = match heap.get(id) {
        Object::Leaf(_) | Object::Tuple(_) => return root.clone(),
        object => object.clone(),
    };
    Value::Ref(heap.alloc(copy))
}

/// `n` deep copies of `root`, each made with its own fresh memo, so no two
/// results share any composite
pub fn replicate(heap: &mut Heap, root: &Value, n: usize, config: CopyConfig) -> Result<Vec<Value>> {
    let mut results = Vec::with_capacity(n);
    for _ in 0..n {
        let copied = with_thread_memo(|memo| deep_copy_with(heap, root, memo, config))?;
        results.push(copied);
    }
    Ok(results)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_shallow_copy_shares_children() {
        let mut heap = Heap::new();
        let inner = heap.list(vec![Value::int(1)]);
        let outer = heap.list(vec![inner.into(), Value::int(2)]);
        let copy = shallow_copy(&mut heap, &outer.into());
        let copy_id = copy.as_obj().unwrap();
        assert_ne!(copy_id, outer);
        assert_eq!(heap.child(copy_id, 0), Some(&Value::Ref(inner)));
    }

    #[test]
    fn test_shallow_copy_immutables_unchanged() {
        let mut heap = Heap::new();
        let t = heap.tuple(vec![Value::int(1)]);
        assert_eq!(shallow_copy(&mut heap, &t.into()), Value::Ref(t));
        assert_eq!(shallow_copy(&mut heap, &Value::int(5)), Value::int(5));
    }

    #[test]
    fn test_replicate_results_are_independent() {
        let mut heap = Heap::new();
        let shared = heap.record("T", vec![]);
        let root = heap.list(vec![shared.into(), shared.into()]);

        let copies = replicate(&mut heap, &root.into(), 3, CopyConfig::default()).unwrap();
        assert_eq!(copies.len(), 3);

        let mut seen = HashSet::new();
        for copy in &copies {
            assert!(heap.deep_eq(copy, &root.into()));
            for id in heap.reachable(copy) {
                assert!(seen.insert(id), "{id:?} shared between replicas");
            }
            // aliasing inside one replica is still preserved
            let id = copy.as_obj().unwrap();
            assert_eq!(heap.child(id, 0), heap.child(id, 1));
        }
    }
}
