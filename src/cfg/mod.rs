//! Control-flow graphs: blocks, the owning graph, views, and declarations.
//!
//! # Architecture
//!
//! - [`BasicBlock`] - owned statement sequences with adjacency bookkeeping
//!   and the typed builder surface
//! - [`Cfg`] - the owning label→block map with traversal and simplification
//! - [`CfgRef`] - copyable handle for adapters needing value semantics
//! - [`CfgRev`] / [`BlockRev`] - read-only backward views
//! - [`FunctionDecl`] - declarations and ABI signature hashing
//!
//! # Ownership
//!
//! A `Cfg` exclusively owns its blocks and a block exclusively owns its
//! statements. Blocks name their neighbours by label only, so the label→block
//! map is the single owner and the graph can be dropped, cloned, or mutated
//! without cycle fix-up. `CfgRef` and `CfgRev` are borrowing views whose
//! lifetimes the borrow checker pins to the underlying CFG.

use std::fmt;
use std::hash::Hash;

mod block;
mod fdecl;
mod graph;
mod reference;
mod reversed;

pub use block::BasicBlock;
pub use fdecl::{callsite_signature_hash, FunctionDecl};
pub use graph::Cfg;
pub use reference::CfgRef;
pub use reversed::{BlockRev, CfgRev};

/// Requirements on caller-supplied basic-block labels.
///
/// Labels are opaque to this crate: any cheap-to-clone, hashable, orderable,
/// printable type works (`&'static str`, integers, interned symbols). The
/// blanket impl makes this a pure bound alias; there is nothing to
/// implement.
pub trait BlockLabel: Clone + Eq + Hash + Ord + fmt::Display + fmt::Debug {}

impl<T: Clone + Eq + Hash + Ord + fmt::Display + fmt::Debug> BlockLabel for T {}
