//! memocopy - deep copy over arena object graphs with a pluggable memo
//!
//! The memo maps the identity of every source object already visited to its copy.
//! With a standard memo the copy preserves aliasing and terminates on cycles; swap
//! in [`ForgetfulMemo`] and shared objects are copied once per occurrence while
//! cyclic inputs run into [`CopyError::RecursionLimitExceeded`].

pub mod config;
mod deepcopy;
pub mod error;
mod extra;
pub mod forgetful;
pub mod heap;
pub mod identity;
pub mod memo;
pub mod memo_trait;
mod reconstructor;
pub mod registry;
mod state;
pub mod types;
mod user_memo;

pub use config::CopyConfig;
pub use deepcopy::{deep_copy, deep_copy_with};
pub use error::{ConfigError, CopyError, Result};
pub use extra::{replicate, shallow_copy};
pub use forgetful::ForgetfulMemo;
pub use heap::{Atom, Heap, ObjId, Object, Value};
pub use identity::Identity;
pub use memo::MemoTable;
pub use memo_trait::Memo;
