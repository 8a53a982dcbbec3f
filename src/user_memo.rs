//! Caller-owned memo backed by a plain `HashMap`
//!
//! This is the conservative path: the caller keeps the map after the call and
//! may inspect it or pass it to a later copy to keep reusing earlier copies.

use std::collections::HashMap;
use std::hash::BuildHasher;

use crate::heap::ObjId;
use crate::identity::Identity;
use crate::memo_trait::Memo;

impl<S: BuildHasher> Memo for HashMap<ObjId, ObjId, S> {
    fn get(&mut self, key: &Identity) -> Option<ObjId> {
        HashMap::get(self, &key.id()).copied()
    }

    fn set(&mut self, key: Identity, value: ObjId) {
        self.insert(key.id(), value);
    }

    fn clear(&mut self) {
        HashMap::clear(self);
    }

    fn len(&self) -> usize {
        HashMap::len(self)
    }

    fn name(&self) -> &'static str {
        "dict"
    }
}
