//! Dispatch tags and copy outcomes

use crate::heap::Value;

/// Shape classification for dispatch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectKind {
    List,
    Tuple,
    Mapping,
    Record,
    Leaf,
}

impl ObjectKind {
    /// Leaves are shared verbatim and never touch the memo
    #[inline(always)]
    pub fn is_leaf(self) -> bool {
        matches!(self, ObjectKind::Leaf)
    }
}

/// Result of one copy step, tracking where the value came from
#[derive(Debug, Clone, PartialEq)]
pub enum CopyResult {
    /// Immutable value, reused directly
    Immutable(Value),
    /// Freshly allocated copy
    Copied(Value),
    /// Found in memo
    FromMemo(Value),
}

impl CopyResult {
    #[inline(always)]
    pub fn into_value(self) -> Value {
        match self {
            CopyResult::Immutable(v) | CopyResult::Copied(v) | CopyResult::FromMemo(v) => v,
        }
    }

    #[inline(always)]
    pub fn is_immutable(&self) -> bool {
        matches!(self, CopyResult::Immutable(_))
    }

    #[inline(always)]
    pub fn is_from_memo(&self) -> bool {
        matches!(self, CopyResult::FromMemo(_))
    }
}
