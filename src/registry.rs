//! Named memo strategies, collected at link time
//!
//! Each strategy registers a constructor with `inventory::submit!`, so a driver
//! (the demo binary, a benchmark) can pick a memo by name without knowing the
//! concrete types.

use std::collections::HashMap;

use crate::forgetful::ForgetfulMemo;
use crate::heap::ObjId;
use crate::memo::MemoTable;
use crate::memo_trait::Memo;

/// A registered memo constructor
pub struct MemoStrategy {
    pub name: &'static str,
    pub description: &'static str,
    pub build: fn() -> Box<dyn Memo>,
}

inventory::collect!(MemoStrategy);

fn build_standard() -> Box<dyn Memo> {
    Box::new(MemoTable::new())
}

fn build_forgetful() -> Box<dyn Memo> {
    Box::new(ForgetfulMemo::new())
}

fn build_dict() -> Box<dyn Memo> {
    Box::new(HashMap::<ObjId, ObjId>::new())
}

inventory::submit! {
    MemoStrategy {
        name: "standard",
        description: "open-addressing table; preserves aliasing and terminates on cycles",
        build: build_standard,
    }
}

inventory::submit! {
    MemoStrategy {
        name: "forgetful",
        description: "discards every insertion; copies each occurrence separately",
        build: build_forgetful,
    }
}

inventory::submit! {
    MemoStrategy {
        name: "dict",
        description: "caller-style HashMap memo",
        build: build_dict,
    }
}

/// All registered strategies, sorted by name
pub fn strategies() -> Vec<&'static MemoStrategy> {
    let mut all: Vec<_> = inventory::iter::<MemoStrategy>.into_iter().collect();
    all.sort_by_key(|s| s.name);
    all
}

/// Build a fresh memo for the strategy called `name`
pub fn build(name: &str) -> Option<Box<dyn Memo>> {
    inventory::iter::<MemoStrategy>
        .into_iter()
        .find(|s| s.name == name)
        .map(|s| (s.build)())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_strategies_registered() {
        let names: Vec<_> = strategies().iter().map(|s| s.name).collect();
        assert_eq!(names, vec!["dict", "forgetful", "standard"]);
    }

    #[test]
    fn test_build_by_name() {
        assert_eq!(build("standard").map(|m| m.name()), Some("standard"));
        assert_eq!(build("forgetful").map(|m| m.name()), Some("forgetful"));
        assert_eq!(build("dict").map(|m| m.name()), Some("dict"));
        assert!(build("lru").is_none());
    }
}
