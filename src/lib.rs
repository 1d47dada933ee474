#![deny(missing_docs)]

//! # tapir
//!
//! Typed three-address IR and control-flow graphs for abstract interpretation.
//!
//! `tapir` is the representation layer of a static analysis framework: a
//! front end (typically an LLVM-bitcode lowering pass) builds strongly typed
//! control-flow graphs out of a fixed statement algebra, and downstream
//! consumers (fixpoint iterators, abstract domains, interprocedural engines)
//! iterate over them through the visitor and traversal contracts defined here.
//!
//! All statements are strongly typed, but only variables carry types; the
//! types of constants are inferred from the variables they appear next to.
//! Types form a **flat** lattice consisting of booleans, integers, reals,
//! pointers, references, and uni-dimensional arrays of each.
//!
//! # Architecture
//!
//! - [`crate::ir`] - The statement algebra: types, variables, linear
//!   expressions and constraints, statements with live-variable bookkeeping,
//!   and the visitor contract
//! - [`crate::cfg`] - Basic blocks, the CFG itself, simplification, the
//!   copyable [`cfg::CfgRef`] handle, and the reversed view for backward
//!   analyses
//! - [`crate::analysis`] - Passes over finished CFGs; currently the type
//!   checker
//! - [`crate::prelude`] - Convenient re-exports of commonly used types
//! - [`crate::Error`] and [`crate::Result`] - Error handling
//!
//! # Usage
//!
//! ```rust
//! use tapir::prelude::*;
//!
//! let mut vars = VariableFactory::new();
//! let x = Variable::int(vars.lookup("x"), 32);
//! let y = Variable::int(vars.lookup("y"), 32);
//!
//! let mut cfg: Cfg<&str> = Cfg::new("entry", TrackedPrecision::Num);
//! cfg.set_exit("entry");
//! let entry = cfg.insert("entry");
//! entry.add(y.clone(), x, 1);
//! entry.ret(y);
//!
//! cfg.simplify()?;
//! println!("{cfg}");
//! # Ok::<(), tapir::Error>(())
//! ```
//!
//! # Design Notes
//!
//! - A [`cfg::Cfg`] exclusively owns its blocks; a block exclusively owns its
//!   statements. Blocks reference each other only by label, so there are no
//!   reference cycles to manage.
//! - `Cfg` is intentionally not `Copy`; [`cfg::CfgRef`] wraps a borrow into a
//!   copyable, assignable handle for use in graph adapters and containers,
//!   and [`cfg::CfgRev`] layers a backward view on top of it.
//! - The core is single-threaded and purely library-style: no background
//!   work, no I/O. Disjoint CFGs may be analyzed in parallel as long as they
//!   do not share a [`ir::VariableFactory`].

pub(crate) mod error;

pub mod analysis;
pub mod cfg;
pub mod ir;
pub mod prelude;

pub use error::{Error, Result};
