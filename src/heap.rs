//! Object graph storage
//! - Every composite lives in a `Heap` slot and is addressed by `ObjId`
//! - Slots are never reused, so an `ObjId` stays a unique identity for the heap's lifetime
//! - Immediate atoms travel inline in `Value` and have no identity

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use crate::types::ObjectKind;

/// Handle to an object stored in a [`Heap`].
///
/// Handles are only meaningful for the heap that issued them.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjId(u32);

impl ObjId {
    /// Handle for slot `index`; panics if the index does not fit in 32 bits
    #[inline]
    fn for_slot(index: usize) -> Self {
        match u32::try_from(index) {
            Ok(raw) => ObjId(raw),
            Err(_) => panic!("heap handle space exhausted at slot {index}"),
        }
    }

    #[inline(always)]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Debug for ObjId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl fmt::Display for ObjId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:06x}", self.0)
    }
}

/// Immutable leaf payload
#[derive(Debug, Clone, PartialEq)]
pub enum Atom {
    None,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(Arc<str>),
}

impl fmt::Display for Atom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Atom::None => f.write_str("None"),
            Atom::Bool(b) => write!(f, "{b}"),
            Atom::Int(i) => write!(f, "{i}"),
            Atom::Float(x) => write!(f, "{x:?}"),
            Atom::Str(s) => write!(f, "{s:?}"),
        }
    }
}

/// A slot in a container: either an inline atom or a reference into the heap
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Atom(Atom),
    Ref(ObjId),
}

impl Value {
    pub fn int(i: i64) -> Self {
        Value::Atom(Atom::Int(i))
    }

    pub fn str(s: &str) -> Self {
        Value::Atom(Atom::Str(Arc::from(s)))
    }

    #[inline(always)]
    pub fn as_obj(&self) -> Option<ObjId> {
        match self {
            Value::Ref(id) => Some(*id),
            Value::Atom(_) => None,
        }
    }
}

impl From<ObjId> for Value {
    fn from(id: ObjId) -> Self {
        Value::Ref(id)
    }
}

impl From<Atom> for Value {
    fn from(atom: Atom) -> Self {
        Value::Atom(atom)
    }
}

/// Heap-resident object
#[derive(Debug, Clone, PartialEq)]
pub enum Object {
    List(Vec<Value>),
    Tuple(Vec<Value>),
    Mapping(Vec<(Value, Value)>),
    Record {
        class: Arc<str>,
        fields: Vec<(Arc<str>, Value)>,
    },
    Leaf(Atom),
}

impl Object {
    /// Classify ONCE, then dispatch on the result
    #[inline]
    pub fn kind(&self) -> ObjectKind {
        match self {
            Object::List(_) => ObjectKind::List,
            Object::Tuple(_) => ObjectKind::Tuple,
            Object::Mapping(_) => ObjectKind::Mapping,
            Object::Record { .. } => ObjectKind::Record,
            Object::Leaf(_) => ObjectKind::Leaf,
        }
    }

    /// Empty object of the same shape, ready to be filled
    pub fn empty_like(&self) -> Object {
        match self {
            Object::List(items) => Object::List(Vec::with_capacity(items.len())),
            Object::Tuple(items) => Object::Tuple(Vec::with_capacity(items.len())),
            Object::Mapping(entries) => Object::Mapping(Vec::with_capacity(entries.len())),
            Object::Record { class, fields } => Object::Record {
                class: Arc::clone(class),
                fields: Vec::with_capacity(fields.len()),
            },
            Object::Leaf(atom) => Object::Leaf(atom.clone()),
        }
    }

    /// Outgoing references, in traversal order (mapping keys before values)
    pub fn children(&self) -> Vec<&Value> {
        match self {
            Object::List(items) | Object::Tuple(items) => items.iter().collect(),
            Object::Mapping(entries) => entries.iter().flat_map(|(k, v)| [k, v]).collect(),
            Object::Record { fields, .. } => fields.iter().map(|(_, v)| v).collect(),
            Object::Leaf(_) => Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Object::List(items) | Object::Tuple(items) => items.len(),
            Object::Mapping(entries) => entries.len(),
            Object::Record { fields, .. } => fields.len(),
            Object::Leaf(_) => 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Arena that owns every object of one graph (source and copies alike)
#[derive(Debug, Default, Clone)]
pub struct Heap {
    slots: Vec<Object>,
}

impl Heap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of objects ever allocated
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Store `object` in a fresh slot.
    ///
    /// # Panics
    ///
    /// Panics once every 32-bit handle has been issued; wrapping would alias handles.
    pub fn alloc(&mut self, object: Object) -> ObjId {
        let id = ObjId::for_slot(self.slots.len());
        self.slots.push(object);
        id
    }

    pub fn list(&mut self, items: Vec<Value>) -> ObjId {
        self.alloc(Object::List(items))
    }

    pub fn tuple(&mut self, items: Vec<Value>) -> ObjId {
        self.alloc(Object::Tuple(items))
    }

    pub fn mapping(&mut self, entries: Vec<(Value, Value)>) -> ObjId {
        self.alloc(Object::Mapping(entries))
    }

    pub fn record(&mut self, class: &str, fields: Vec<(&str, Value)>) -> ObjId {
        self.alloc(Object::Record {
            class: Arc::from(class),
            fields: fields
                .into_iter()
                .map(|(name, value)| (Arc::from(name), value))
                .collect(),
        })
    }

    pub fn leaf(&mut self, atom: Atom) -> ObjId {
        self.alloc(Object::Leaf(atom))
    }

    /// Panics if `id` was issued by a different heap
    #[inline(always)]
    pub fn get(&self, id: ObjId) -> &Object {
        &self.slots[id.index()]
    }

    #[inline(always)]
    pub fn get_mut(&mut self, id: ObjId) -> &mut Object {
        &mut self.slots[id.index()]
    }

    /// Append to a list or tuple; returns false for other shapes
    pub fn push_child(&mut self, id: ObjId, value: Value) -> bool {
        match self.get_mut(id) {
            Object::List(items) | Object::Tuple(items) => {
                items.push(value);
                true
            }
            _ => false,
        }
    }

    /// Append an entry to a mapping; returns false for other shapes
    pub fn push_entry(&mut self, id: ObjId, key: Value, value: Value) -> bool {
        match self.get_mut(id) {
            Object::Mapping(entries) => {
                entries.push((key, value));
                true
            }
            _ => false,
        }
    }

    /// Append a named field to a record; returns false for other shapes
    pub fn push_field(&mut self, id: ObjId, name: Arc<str>, value: Value) -> bool {
        match self.get_mut(id) {
            Object::Record { fields, .. } => {
                fields.push((name, value));
                true
            }
            _ => false,
        }
    }

    /// Overwrite the `index`-th child (for mappings, the value of the `index`-th entry)
    pub fn set_child(&mut self, id: ObjId, index: usize, value: Value) -> bool {
        let slot = match self.get_mut(id) {
            Object::List(items) | Object::Tuple(items) => items.get_mut(index),
            Object::Mapping(entries) => entries.get_mut(index).map(|(_, v)| v),
            Object::Record { fields, .. } => fields.get_mut(index).map(|(_, v)| v),
            Object::Leaf(_) => None,
        };
        match slot {
            Some(slot) => {
                *slot = value;
                true
            }
            None => false,
        }
    }

    /// `a is b`: atoms compare by value, references by handle
    pub fn is_same(&self, a: &Value, b: &Value) -> bool {
        match (a, b) {
            (Value::Ref(x), Value::Ref(y)) => x == y,
            (Value::Atom(x), Value::Atom(y)) => x == y,
            _ => false,
        }
    }

    /// Child `index` of a list, tuple or record, or the value of the `index`-th mapping entry
    pub fn child(&self, id: ObjId, index: usize) -> Option<&Value> {
        match self.get(id) {
            Object::List(items) | Object::Tuple(items) => items.get(index),
            Object::Mapping(entries) => entries.get(index).map(|(_, v)| v),
            Object::Record { fields, .. } => fields.get(index).map(|(_, v)| v),
            Object::Leaf(_) => None,
        }
    }

    /// Structural equality that tolerates cycles.
    ///
    /// Two graphs are equal when they unfold to the same (possibly infinite) tree.
    /// A pair of handles already under comparison is assumed equal, which is the
    /// coinductive reading needed for `[1, 2, <self>]` to equal its copy.
    pub fn deep_eq(&self, a: &Value, b: &Value) -> bool {
        let mut assumed = HashSet::new();
        let mut pending = vec![(a, b)];
        while let Some((a, b)) = pending.pop() {
            let (x, y) = match (a, b) {
                (Value::Atom(x), Value::Atom(y)) => {
                    if x != y {
                        return false;
                    }
                    continue;
                }
                (Value::Ref(x), Value::Ref(y)) => (*x, *y),
                (Value::Atom(atom), Value::Ref(id)) | (Value::Ref(id), Value::Atom(atom)) => {
                    if !matches!(self.get(*id), Object::Leaf(leaf) if leaf == atom) {
                        return false;
                    }
                    continue;
                }
            };
            if x == y || !assumed.insert((x, y)) {
                continue;
            }

            match (self.get(x), self.get(y)) {
                (Object::Leaf(p), Object::Leaf(q)) if p == q => {}
                (Object::List(p), Object::List(q)) | (Object::Tuple(p), Object::Tuple(q))
                    if p.len() == q.len() =>
                {
                    pending.extend(p.iter().zip(q));
                }
                (Object::Mapping(p), Object::Mapping(q)) if p.len() == q.len() => {
                    for ((ku, vu), (kv, vv)) in p.iter().zip(q) {
                        pending.push((ku, kv));
                        pending.push((vu, vv));
                    }
                }
                (
                    Object::Record { class: c1, fields: f1 },
                    Object::Record { class: c2, fields: f2 },
                ) if c1 == c2 && f1.len() == f2.len() => {
                    for ((n1, v1), (n2, v2)) in f1.iter().zip(f2) {
                        if n1 != n2 {
                            return false;
                        }
                        pending.push((v1, v2));
                    }
                }
                _ => return false,
            }
        }
        true
    }

    /// Every object reachable from `root`, including `root` itself
    pub fn reachable(&self, root: &Value) -> Vec<ObjId> {
        let mut seen = HashSet::new();
        let mut order = Vec::new();
        let mut stack: Vec<ObjId> = root.as_obj().into_iter().collect();
        while let Some(id) = stack.pop() {
            if !seen.insert(id) {
                continue;
            }
            order.push(id);
            for child in self.get(id).children().into_iter().rev() {
                if let Some(next) = child.as_obj() {
                    stack.push(next);
                }
            }
        }
        order
    }

    /// Render a value, printing `[...]` for back-references
    pub fn render(&self, value: &Value) -> String {
        let mut out = String::new();
        let mut path = Vec::new();
        self.render_into(value, &mut path, &mut out);
        out
    }

    fn render_into(&self, value: &Value, path: &mut Vec<ObjId>, out: &mut String) {
        let id = match value {
            Value::Atom(atom) => {
                out.push_str(&atom.to_string());
                return;
            }
            Value::Ref(id) => *id,
        };
        if path.contains(&id) {
            out.push_str(match self.get(id) {
                Object::Mapping(_) => "{...}",
                Object::Tuple(_) => "(...)",
                _ => "[...]",
            });
            return;
        }
        path.push(id);
        match self.get(id) {
            Object::Leaf(atom) => out.push_str(&atom.to_string()),
            Object::List(items) => self.render_seq(items, "[", "]", path, out),
            Object::Tuple(items) => self.render_seq(items, "(", ")", path, out),
            Object::Mapping(entries) => {
                out.push('{');
                for (i, (k, v)) in entries.iter().enumerate() {
                    if i > 0 {
                        out.push_str(", ");
                    }
                    self.render_into(k, path, out);
                    out.push_str(": ");
                    self.render_into(v, path, out);
                }
                out.push('}');
            }
            Object::Record { class, .. } => {
                out.push_str(&format!("<{class} object at {id}>"));
            }
        }
        path.pop();
    }

    fn render_seq(
        &self,
        items: &[Value],
        open: &str,
        close: &str,
        path: &mut Vec<ObjId>,
        out: &mut String,
    ) {
        out.push_str(open);
        for (i, item) in items.iter().enumerate() {
            if i > 0 {
                out.push_str(", ");
            }
            self.render_into(item, path, out);
        }
        out.push_str(close);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alloc_yields_distinct_handles_for_equal_objects() {
        let mut heap = Heap::new();
        let a = heap.list(vec![Value::int(1)]);
        let b = heap.list(vec![Value::int(1)]);
        assert_ne!(a, b);
        assert_eq!(heap.get(a), heap.get(b));
        assert!(heap.deep_eq(&a.into(), &b.into()));
        assert!(!heap.is_same(&a.into(), &b.into()));
    }

    #[test]
    fn test_set_child_closes_cycle() {
        let mut heap = Heap::new();
        let x = heap.list(vec![Value::int(1), Value::int(2)]);
        assert!(heap.push_child(x, x.into()));
        assert_eq!(heap.child(x, 2), Some(&Value::Ref(x)));
        assert!(heap.set_child(x, 0, Value::int(7)));
        assert!(!heap.set_child(x, 9, Value::int(7)));
        assert_eq!(heap.render(&x.into()), "[7, 2, [...]]");
    }

    #[test]
    fn test_deep_eq_on_cycles() {
        let mut heap = Heap::new();
        let x = heap.list(vec![Value::int(1)]);
        heap.push_child(x, x.into());
        let y = heap.list(vec![Value::int(1)]);
        heap.push_child(y, y.into());
        let z = heap.list(vec![Value::int(2)]);
        heap.push_child(z, z.into());
        assert!(heap.deep_eq(&x.into(), &y.into()));
        assert!(!heap.deep_eq(&x.into(), &z.into()));
    }

    #[test]
    fn test_reachable_visits_shared_node_once() {
        let mut heap = Heap::new();
        let a = heap.record("T", vec![]);
        let root = heap.list(vec![a.into(), a.into(), Value::int(3)]);
        assert_eq!(heap.reachable(&root.into()), vec![root, a]);
    }

    #[test]
    fn test_mapping_children_order() {
        let mut heap = Heap::new();
        let m = heap.mapping(vec![(Value::str("k"), Value::int(1))]);
        let kids = heap.get(m).children();
        assert_eq!(kids, vec![&Value::str("k"), &Value::int(1)]);
        assert_eq!(heap.render(&m.into()), "{\"k\": 1}");
    }

    #[test]
    fn test_last_32_bit_slot_is_addressable() {
        let id = ObjId::for_slot(u32::MAX as usize);
        assert_eq!(id.index(), u32::MAX as usize);
    }

    #[test]
    #[should_panic(expected = "heap handle space exhausted")]
    fn test_handle_past_32_bits_panics_instead_of_wrapping() {
        ObjId::for_slot(u32::MAX as usize + 1);
    }

    #[test]
    fn test_deep_eq_distinguishes_shapes_and_deep_chains() {
        let mut heap = Heap::new();
        let l = heap.list(vec![Value::int(1)]);
        let t = heap.tuple(vec![Value::int(1)]);
        assert!(!heap.deep_eq(&l.into(), &t.into()));

        let mut a = heap.list(vec![]);
        let mut b = heap.list(vec![]);
        for _ in 0..50_000 {
            a = heap.list(vec![a.into()]);
            b = heap.list(vec![b.into()]);
        }
        assert!(heap.deep_eq(&a.into(), &b.into()));
        heap.push_child(b, Value::int(0));
        assert!(!heap.deep_eq(&a.into(), &b.into()));
    }
}
