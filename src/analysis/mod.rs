//! Passes over finished CFGs.
//!
//! The representation layer stays deliberately small: the only pass that
//! belongs here is the [`TypeChecker`], which every front end should run
//! before handing a CFG to analyzers. Fixpoint iteration, abstract domains,
//! and interprocedural analysis are downstream consumers, not residents.

mod typecheck;

pub use typecheck::TypeChecker;
