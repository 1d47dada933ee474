//! The typed statement algebra and its supporting vocabulary.
//!
//! Everything a front end needs to express program semantics lives here:
//!
//! - [`Type`] / [`TrackedPrecision`] - the flat type lattice and the
//!   front end's declared analysis fidelity
//! - [`VariableFactory`] / [`Variable`] - variable interning and typed
//!   variables
//! - [`LinearExpression`] / [`LinearConstraint`] / [`PointerConstraint`] -
//!   the algebraic payloads statements carry
//! - [`Statement`] / [`StatementVisitor`] - the ~30-kind statement sum with
//!   live sets and the visitor contract
//!
//! Statements are assembled into [`crate::cfg::BasicBlock`]s through the
//! typed builder surface rather than constructed directly; the constructors
//! here are the underlying layer those builders call into.

mod expr;
mod statement;
mod types;
mod variable;

pub use expr::{
    ConstraintKind, LinearConstraint, LinearExpression, Number, PointerConstraint,
};
pub use statement::{
    Assert, Assign, Assume, ArrayAssign, ArrayAssume, ArrayInit, ArrayLoad, ArrayStore, BinOp,
    BoolAssert, BoolAssignCst, BoolAssignVar, BoolAssume, BoolBinOp, BoolSelect, Callsite,
    DebugInfo, Havoc, IntCast, Live, PtrAssert, PtrAssign, PtrAssume, PtrFunction, PtrLoad,
    PtrNull, PtrObject, PtrStore, Return, Select, Statement, StatementKind, StatementVisitor,
    StmtCode, Unreachable,
};
pub use types::{
    BinaryOperation, Bitwidth, BoolBinaryOperation, CastOperation, TrackedPrecision, Type,
};
pub use variable::{VarName, Variable, VariableFactory};
