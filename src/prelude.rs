//! # tapir Prelude
//!
//! Convenient re-exports of the types most front ends and analyzers touch on
//! every line: the variable factory, typed variables, expression builders,
//! the CFG family, and the type checker.
//!
//! ```rust
//! use tapir::prelude::*;
//!
//! let mut vars = VariableFactory::new();
//! let x = Variable::int(vars.lookup("x"), 32);
//! let mut cfg: Cfg<&str> = Cfg::with_exit("b0", "b0", TrackedPrecision::Num);
//! cfg.insert("b0").ret(x);
//! # Ok::<(), tapir::Error>(())
//! ```

pub use crate::analysis::TypeChecker;
pub use crate::cfg::{
    BasicBlock, BlockLabel, BlockRev, Cfg, CfgRef, CfgRev, FunctionDecl,
};
pub use crate::ir::{
    BinaryOperation, Bitwidth, BoolBinaryOperation, CastOperation, ConstraintKind, DebugInfo,
    LinearConstraint, LinearExpression, Live, Number, PointerConstraint, Statement, StatementKind,
    StatementVisitor, StmtCode, TrackedPrecision, Type, VarName, Variable, VariableFactory,
};
pub use crate::{Error, Result};
