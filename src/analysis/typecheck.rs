//! The type checker: one visitor pass over every statement of a CFG.
//!
//! The lattice is flat, so checking is purely local: a statement is
//! well-typed when its operand variables agree with each other (and with the
//! defined variable) on type tag and, for integers and booleans, bit-width.
//! Calls, returns, pointer and array statements are accepted unchecked here;
//! their validation belongs to the interprocedural and memory layers.
//!
//! The pass is read-only and therefore idempotent: running it twice on a
//! well-typed CFG changes nothing and reports nothing.

use log::debug;

use crate::{
    cfg::{BlockLabel, CfgRef},
    ir::{
        Assert, Assign, Assume, BinOp, BoolAssert, BoolAssignCst, BoolAssignVar, BoolAssume,
        BoolBinOp, BoolSelect, CastOperation, IntCast, Select, Statement, StatementVisitor, Type,
        Variable,
    },
    Error, Result,
};

/// Checks every statement of a CFG against the flat type lattice rules.
///
/// # Examples
///
/// ```rust
/// use tapir::analysis::TypeChecker;
/// use tapir::cfg::CfgRef;
/// use tapir::prelude::*;
///
/// let mut vars = VariableFactory::new();
/// let x = Variable::int(vars.lookup("x"), 32);
/// let mut cfg: Cfg<&str> = Cfg::with_exit("b0", "b0", TrackedPrecision::Num);
/// cfg.insert("b0").ret(x);
///
/// TypeChecker::new(CfgRef::new(&cfg)).run()?;
/// # Ok::<(), tapir::Error>(())
/// ```
pub struct TypeChecker<'c, L> {
    cfg: CfgRef<'c, L>,
}

impl<'c, L: BlockLabel> TypeChecker<'c, L> {
    /// Creates a checker over a CFG handle.
    #[must_use]
    pub const fn new(cfg: CfgRef<'c, L>) -> Self {
        Self { cfg }
    }

    /// Runs the pass, stopping at the first violation.
    ///
    /// # Errors
    ///
    /// [`Error::TypeCheck`] naming the broken rule and the offending
    /// statement. The structural preamble also requires the CFG to have an
    /// exit block and, when it has a single block, entry and exit to
    /// coincide.
    pub fn run(&self) -> Result<()> {
        debug!("type checking CFG ...");

        if self.cfg.size() == 0 {
            return Err(Error::TypeCheck(
                "CFG must have at least one basic block".to_string(),
            ));
        }
        if !self.cfg.has_exit() {
            return Err(Error::TypeCheck("CFG must have exit block".to_string()));
        }
        if self.cfg.size() == 1 && self.cfg.exit()? != self.cfg.entry() {
            return Err(Error::TypeCheck(
                "CFG entry and exit must be the same".to_string(),
            ));
        }

        for block in self.cfg.blocks() {
            for stmt in block.statements() {
                let mut vis = CheckVisitor { stmt, error: None };
                stmt.accept(&mut vis);
                if let Some(e) = vis.error {
                    return Err(e);
                }
            }
        }

        debug!("CFG is well-typed");
        Ok(())
    }
}

/// Per-statement rule checks. Records the first violation and lets the
/// remaining checks short-circuit through the `bool` returns.
struct CheckVisitor<'a> {
    stmt: &'a Statement,
    error: Option<Error>,
}

impl CheckVisitor<'_> {
    fn fail(&mut self, msg: &str) -> bool {
        if self.error.is_none() {
            self.error = Some(Error::TypeCheck(format!("{msg} in {}", self.stmt)));
        }
        false
    }

    fn check_num(&mut self, v: &Variable, msg: &str) -> bool {
        if v.ty().is_numeric() {
            true
        } else {
            self.fail(msg)
        }
    }

    fn check_int(&mut self, v: &Variable, msg: &str) -> bool {
        if v.ty() == Type::Int && v.bitwidth() > 1 {
            true
        } else {
            self.fail(msg)
        }
    }

    fn check_int_or_bool(&mut self, v: &Variable, msg: &str) -> bool {
        if v.ty() == Type::Int || v.ty() == Type::Bool {
            true
        } else {
            self.fail(msg)
        }
    }

    fn check_bool(&mut self, v: &Variable, msg: &str) -> bool {
        if v.ty() == Type::Bool && v.bitwidth() == 1 {
            true
        } else {
            self.fail(msg)
        }
    }

    fn check_bitwidth_if_int(&mut self, v: &Variable, msg: &str) -> bool {
        if v.ty() == Type::Int && v.bitwidth() <= 1 {
            self.fail(msg)
        } else {
            true
        }
    }

    fn check_bitwidth_if_bool(&mut self, v: &Variable, msg: &str) -> bool {
        if v.ty() == Type::Bool && v.bitwidth() != 1 {
            self.fail(msg)
        } else {
            true
        }
    }

    fn check_same_type(&mut self, v1: &Variable, v2: &Variable, msg: &str) -> bool {
        if v1.ty() == v2.ty() {
            true
        } else {
            self.fail(msg)
        }
    }

    fn check_same_bitwidth(&mut self, v1: &Variable, v2: &Variable, msg: &str) -> bool {
        // Assumes v1 and v2 already share a type.
        if (v1.ty() == Type::Int || v1.ty() == Type::Bool) && v1.bitwidth() != v2.bitwidth() {
            self.fail(msg)
        } else {
            true
        }
    }

    fn check_numeric_lhs(&mut self, lhs: &Variable) -> bool {
        self.check_num(lhs, "lhs must be integer or real")
            && self.check_bitwidth_if_int(lhs, "lhs must have bitwidth > 1")
    }

    /// Variables of a constraint must agree among themselves on numeric type
    /// and bit-width.
    fn check_consistent_numerics<'v>(
        &mut self,
        mut vars: impl Iterator<Item = &'v Variable>,
        what: &str,
    ) -> Option<&'v Variable> {
        let first = vars.next()?;
        if !self.check_num(first, &format!("{what} variables must be integer or real")) {
            return None;
        }
        for v in vars {
            if !self.check_num(v, &format!("{what} variables must be integer or real"))
                || !self.check_same_type(first, v, &format!("inconsistent types in {what} variables"))
                || !self.check_same_bitwidth(
                    first,
                    v,
                    &format!("inconsistent bitwidths in {what} variables"),
                )
            {
                return None;
            }
        }
        Some(first)
    }
}

impl StatementVisitor for CheckVisitor<'_> {
    fn visit_bin_op(&mut self, s: &BinOp) {
        if !self.check_numeric_lhs(&s.lhs) {
            return;
        }
        if let Some(v1) = s.left.as_variable() {
            if !self.check_same_type(&s.lhs, v1, "first operand cannot have different type from lhs")
                || !self.check_same_bitwidth(
                    &s.lhs,
                    v1,
                    "first operand cannot have different bitwidth from lhs",
                )
            {
                return;
            }
        }
        if let Some(v2) = s.right.as_variable() {
            let _ = self.check_same_type(
                &s.lhs,
                v2,
                "second operand cannot have different type from lhs",
            ) && self.check_same_bitwidth(
                &s.lhs,
                v2,
                "second operand cannot have different bitwidth from lhs",
            );
        }
    }

    fn visit_assign(&mut self, s: &Assign) {
        if !self.check_numeric_lhs(&s.lhs) {
            return;
        }
        for v in s.rhs.variables() {
            if !self.check_same_type(&s.lhs, v, "variable cannot have different type from lhs")
                || !self.check_same_bitwidth(
                    &s.lhs,
                    v,
                    "variable cannot have different bitwidth from lhs",
                )
            {
                return;
            }
        }
    }

    fn visit_assume(&mut self, s: &Assume) {
        let _ = self.check_consistent_numerics(s.constraint.variables(), "assume");
    }

    fn visit_assert(&mut self, s: &Assert) {
        let _ = self.check_consistent_numerics(s.constraint.variables(), "assert");
    }

    fn visit_select(&mut self, s: &Select) {
        if !self.check_numeric_lhs(&s.lhs) {
            return;
        }
        for v in s.left.variables().chain(s.right.variables()) {
            if !self.check_same_type(&s.lhs, v, "inconsistent types in select variables")
                || !self.check_same_bitwidth(&s.lhs, v, "inconsistent bitwidths in select variables")
            {
                return;
            }
        }
        // The condition may differ from the lhs in bitwidth but not in type,
        // and its variables must agree among themselves.
        if let Some(first) = self.check_consistent_numerics(s.cond.variables(), "select condition")
        {
            let _ = self.check_same_type(
                &s.lhs,
                first,
                "inconsistent types in select condition variables",
            );
        }
    }

    fn visit_int_cast(&mut self, s: &IntCast) {
        match s.op {
            CastOperation::Trunc => {
                let ok = self.check_int(&s.src, "source operand must be integer")
                    && self.check_int_or_bool(&s.dst, "destination must be integer or bool")
                    && self.check_bitwidth_if_bool(
                        &s.dst,
                        "type and bitwidth of destination operand do not match",
                    )
                    && self.check_bitwidth_if_int(
                        &s.dst,
                        "type and bitwidth of destination operand do not match",
                    );
                if ok && s.src.bitwidth() <= s.dst.bitwidth() {
                    self.fail("bitwidth of source operand must be greater than destination");
                }
            }
            CastOperation::SExt | CastOperation::ZExt => {
                let ok = self.check_int(&s.dst, "destination operand must be integer")
                    && self.check_int_or_bool(&s.src, "source must be integer or bool")
                    && self.check_bitwidth_if_bool(
                        &s.src,
                        "type and bitwidth of source operand do not match",
                    )
                    && self.check_bitwidth_if_int(
                        &s.src,
                        "type and bitwidth of source operand do not match",
                    );
                if ok && s.dst.bitwidth() <= s.src.bitwidth() {
                    self.fail("bitwidth of destination must be greater than source");
                }
            }
        }
    }

    fn visit_bool_bin_op(&mut self, s: &BoolBinOp) {
        let _ = self.check_bool(&s.lhs, "lhs must be boolean")
            && self.check_bool(&s.left, "first operand must be boolean")
            && self.check_bool(&s.right, "second operand must be boolean");
    }

    fn visit_bool_assign_cst(&mut self, s: &BoolAssignCst) {
        if !self.check_bool(&s.lhs, "lhs must be boolean") {
            return;
        }
        let _ = self.check_consistent_numerics(s.rhs.variables(), "rhs");
    }

    fn visit_bool_assign_var(&mut self, s: &BoolAssignVar) {
        let _ = self.check_bool(&s.lhs, "lhs must be boolean")
            && self.check_bool(&s.rhs, "rhs must be boolean");
    }

    fn visit_bool_assume(&mut self, s: &BoolAssume) {
        self.check_bool(&s.var, "condition must be boolean");
    }

    fn visit_bool_assert(&mut self, s: &BoolAssert) {
        self.check_bool(&s.var, "condition must be boolean");
    }

    fn visit_bool_select(&mut self, s: &BoolSelect) {
        let _ = self.check_bool(&s.lhs, "lhs must be boolean")
            && self.check_bool(&s.cond, "condition must be boolean")
            && self.check_bool(&s.left, "first operand must be boolean")
            && self.check_bool(&s.right, "second operand must be boolean");
    }

    // Calls, returns, pointer and array statements are validated by their
    // own layers.
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        cfg::Cfg,
        ir::{LinearConstraint, LinearExpression, TrackedPrecision, VariableFactory},
    };

    fn check(cfg: &Cfg<&str>) -> Result<()> {
        TypeChecker::new(CfgRef::new(cfg)).run()
    }

    #[test]
    fn test_well_typed_cfg_passes_twice() {
        let mut vars = VariableFactory::new();
        let x = Variable::int(vars.lookup("x"), 32);
        let y = Variable::int(vars.lookup("y"), 32);
        let b = Variable::boolean(vars.lookup("b"));

        let mut cfg: Cfg<&str> = Cfg::with_exit("b0", "b0", TrackedPrecision::Num);
        let blk = cfg.insert("b0");
        blk.add(y.clone(), x.clone(), 1);
        blk.assume(LinearConstraint::ge(x.clone(), 0));
        blk.bool_assign_cst(b.clone(), LinearConstraint::le(x.clone(), 10));
        blk.bool_assume(b);
        blk.ret(y);

        check(&cfg).unwrap();
        check(&cfg).unwrap();
    }

    #[test]
    fn test_missing_exit_is_rejected() {
        let cfg: Cfg<&str> = Cfg::new("b0", TrackedPrecision::Num);
        let err = check(&cfg).unwrap_err();
        assert!(err.to_string().contains("exit"));
    }

    #[test]
    fn test_single_block_entry_exit_must_coincide() {
        let cfg: Cfg<&str> = Cfg::with_exit("b0", "b1", TrackedPrecision::Num);
        assert!(check(&cfg).is_err());
    }

    #[test]
    fn test_bitwidth_mismatch_names_bitwidth_and_statement() {
        let mut vars = VariableFactory::new();
        let lhs = Variable::int(vars.lookup("lhs"), 32);
        let wide = Variable::int(vars.lookup("wide"), 64);

        let mut cfg: Cfg<&str> = Cfg::with_exit("b0", "b0", TrackedPrecision::Num);
        cfg.insert("b0").add(lhs, wide.clone(), wide);

        let err = check(&cfg).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("bitwidth"), "message must name bitwidth: {msg}");
        assert!(msg.contains("lhs = wide+wide"), "message must show the statement: {msg}");
    }

    #[test]
    fn test_assign_type_mismatch() {
        let mut vars = VariableFactory::new();
        let i = Variable::int(vars.lookup("i"), 32);
        let r = Variable::real(vars.lookup("r"));

        let mut cfg: Cfg<&str> = Cfg::with_exit("b0", "b0", TrackedPrecision::Num);
        cfg.insert("b0").assign(i, LinearExpression::var(r));
        assert!(check(&cfg).is_err());
    }

    #[test]
    fn test_assume_inconsistent_bitwidths() {
        let mut vars = VariableFactory::new();
        let a = Variable::int(vars.lookup("a"), 32);
        let b = Variable::int(vars.lookup("b"), 8);

        let mut cfg: Cfg<&str> = Cfg::with_exit("b0", "b0", TrackedPrecision::Num);
        cfg.insert("b0")
            .assume(LinearConstraint::le(a, LinearExpression::var(b)));
        let err = check(&cfg).unwrap_err();
        assert!(err.to_string().contains("bitwidth"));
    }

    #[test]
    fn test_trunc_direction_enforced() {
        let mut vars = VariableFactory::new();
        let narrow = Variable::int(vars.lookup("n"), 8);
        let wide = Variable::int(vars.lookup("w"), 32);

        // Widening "trunc" is ill-typed.
        let mut cfg: Cfg<&str> = Cfg::with_exit("b0", "b0", TrackedPrecision::Num);
        cfg.insert("b0").truncate(narrow.clone(), wide.clone());
        let err = check(&cfg).unwrap_err();
        assert!(err.to_string().contains("greater than destination"));

        // The narrowing direction is fine.
        let mut cfg: Cfg<&str> = Cfg::with_exit("b0", "b0", TrackedPrecision::Num);
        cfg.insert("b0").truncate(wide.clone(), narrow.clone());
        check(&cfg).unwrap();

        // sext must widen.
        let mut cfg: Cfg<&str> = Cfg::with_exit("b0", "b0", TrackedPrecision::Num);
        cfg.insert("b0").sext(wide, narrow);
        assert!(check(&cfg).is_err());
    }

    #[test]
    fn test_trunc_to_bool_requires_width_one() {
        let mut vars = VariableFactory::new();
        let wide = Variable::int(vars.lookup("w"), 32);
        let flag = Variable::boolean(vars.lookup("flag"));

        let mut cfg: Cfg<&str> = Cfg::with_exit("b0", "b0", TrackedPrecision::Num);
        cfg.insert("b0").truncate(wide, flag);
        check(&cfg).unwrap();
    }

    #[test]
    fn test_bool_ops_require_bool_operands() {
        let mut vars = VariableFactory::new();
        let b = Variable::boolean(vars.lookup("b"));
        let i = Variable::int(vars.lookup("i"), 32);

        let mut cfg: Cfg<&str> = Cfg::with_exit("b0", "b0", TrackedPrecision::Num);
        cfg.insert("b0").bool_and(b.clone(), b, i);
        let err = check(&cfg).unwrap_err();
        assert!(err.to_string().contains("boolean"));
    }

    #[test]
    fn test_select_condition_may_differ_in_bitwidth() {
        let mut vars = VariableFactory::new();
        let lhs = Variable::int(vars.lookup("lhs"), 32);
        let a = Variable::int(vars.lookup("a"), 32);
        let c = Variable::int(vars.lookup("c"), 8);

        let mut cfg: Cfg<&str> = Cfg::with_exit("b0", "b0", TrackedPrecision::Num);
        cfg.insert("b0").select(
            lhs,
            LinearConstraint::ge(c, 0),
            LinearExpression::var(a),
            LinearExpression::constant(0),
        );
        check(&cfg).unwrap();
    }

    #[test]
    fn test_pointer_and_call_statements_are_not_checked_here() {
        let mut vars = VariableFactory::new();
        let p = Variable::int(vars.lookup("p"), 32); // wrong type on purpose
        let q = Variable::int(vars.lookup("q"), 32);

        let mut cfg: Cfg<&str> = Cfg::with_exit("b0", "b0", TrackedPrecision::Ptr);
        let blk = cfg.insert("b0");
        blk.ptr_store(p.clone(), q.clone());
        blk.callsite("f", vec![p], vec![q]);
        check(&cfg).unwrap();
    }
}
