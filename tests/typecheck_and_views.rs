//! Type-checker scenarios and backward-view consumption through the public
//! API.

use tapir::prelude::*;

fn int(vars: &mut VariableFactory, key: &str) -> Variable {
    Variable::int(vars.lookup(key), 32)
}

#[test]
fn test_bitwidth_violation_is_reported_with_statement() {
    let mut vars = VariableFactory::new();
    let lhs = Variable::int(vars.lookup("lhs"), 32);
    let wide = Variable::int(vars.lookup("wide"), 64);

    let mut cfg: Cfg<&str> = Cfg::with_exit("b0", "b0", TrackedPrecision::Num);
    cfg.insert("b0").add(lhs, wide.clone(), wide);

    let err = TypeChecker::new(CfgRef::new(&cfg)).run().unwrap_err();
    let msg = err.to_string();
    assert!(msg.contains("(type checking)"));
    assert!(msg.contains("bitwidth"), "must name the bitwidth rule: {msg}");
    assert!(msg.contains("wide"), "must render the statement: {msg}");
}

#[test]
fn test_type_checker_is_idempotent_on_correct_cfg() -> Result<()> {
    let mut vars = VariableFactory::new();
    let x = int(&mut vars, "x");
    let y = int(&mut vars, "y");
    let flag = Variable::boolean(vars.lookup("flag"));

    let mut cfg: Cfg<&str> = Cfg::with_exit("entry", "exit", TrackedPrecision::Num);
    let entry = cfg.insert("entry");
    entry.assume(LinearConstraint::ge(x.clone(), 0));
    entry.add(y.clone(), x.clone(), 1);
    entry.bool_assign_cst(flag.clone(), LinearConstraint::le(y.clone(), 100));
    let exit = cfg.insert("exit");
    exit.bool_assert(flag, DebugInfo::default());
    exit.ret(y);
    cfg.add_edge(&"entry", &"exit")?;

    let checker = TypeChecker::new(CfgRef::new(&cfg));
    checker.run()?;
    checker.run()?;
    Ok(())
}

#[test]
fn test_cast_chain_checks() -> Result<()> {
    let mut vars = VariableFactory::new();
    let w8 = Variable::int(vars.lookup("w8"), 8);
    let w32 = Variable::int(vars.lookup("w32"), 32);
    let flag = Variable::boolean(vars.lookup("flag"));

    let mut cfg: Cfg<&str> = Cfg::with_exit("b0", "b0", TrackedPrecision::Num);
    let b0 = cfg.insert("b0");
    b0.zext(w8.clone(), w32.clone());
    b0.truncate(w32.clone(), w8.clone());
    b0.truncate(w8, flag.clone());
    b0.zext(flag, w32);

    TypeChecker::new(CfgRef::new(&cfg)).run()?;
    Ok(())
}

/// Collects the statements seen while walking the reversed view the way a
/// backward analyzer does: start at the view's entry, visit each block's
/// statements in (reversed) order, follow the view's `next_nodes`.
fn backward_trace(cfg: &Cfg<&str>) -> Result<Vec<String>> {
    struct Tracer {
        seen: Vec<String>,
    }
    impl StatementVisitor for Tracer {
        fn visit_assign(&mut self, s: &tapir::ir::Assign) {
            self.seen.push(format!("{} = {}", s.lhs, s.rhs));
        }
        fn visit_bin_op(&mut self, s: &tapir::ir::BinOp) {
            self.seen.push(format!("{} = {}{}{}", s.lhs, s.left, s.op, s.right));
        }
        fn visit_return(&mut self, s: &tapir::ir::Return) {
            self.seen.push(format!("return {}", s.vars[0]));
        }
    }

    let rev = CfgRev::new(CfgRef::new(cfg));
    let mut tracer = Tracer { seen: Vec::new() };
    let mut stack = vec![*rev.entry()?];
    let mut visited = std::collections::HashSet::new();
    while let Some(l) = stack.pop() {
        if !visited.insert(l) {
            continue;
        }
        rev.get_node(&l)?.accept(&mut tracer);
        for n in rev.next_nodes(&l)? {
            if !visited.contains(n) {
                stack.push(*n);
            }
        }
    }
    Ok(tracer.seen)
}

#[test]
fn test_backward_walk_sees_statements_reversed() -> Result<()> {
    let mut vars = VariableFactory::new();
    let x = int(&mut vars, "x");
    let y = int(&mut vars, "y");

    let mut cfg: Cfg<&str> = Cfg::with_exit("entry", "exit", TrackedPrecision::Num);
    let entry = cfg.insert("entry");
    entry.assign(x.clone(), 1);
    entry.add(y.clone(), x.clone(), 2);
    cfg.insert("exit").ret(y);
    cfg.add_edge(&"entry", &"exit")?;

    let seen = backward_trace(&cfg)?;
    assert_eq!(seen, vec!["return y", "y = x+2", "x = 1"]);
    Ok(())
}

#[test]
fn test_double_reverse_entry_identity() -> Result<()> {
    let mut vars = VariableFactory::new();
    let x = int(&mut vars, "x");
    let mut cfg: Cfg<&str> = Cfg::with_exit("entry", "exit", TrackedPrecision::Num);
    cfg.insert("exit").ret(x);
    cfg.add_edge(&"entry", &"exit")?;

    let rev = CfgRev::new(CfgRef::new(&cfg));
    // The view's exit is the underlying entry, so reversing the reversal
    // lands back on the original entry.
    assert_eq!(rev.exit(), cfg.entry());
    assert_eq!(rev.entry()?, cfg.exit()?);
    Ok(())
}

#[test]
fn test_view_errors() {
    let cfg: Cfg<&str> = Cfg::new("entry", TrackedPrecision::Num);
    let rev = CfgRev::new(CfgRef::new(&cfg));
    assert!(matches!(rev.entry(), Err(Error::NoExitBlock)));
    assert!(rev.get_node(&"nope").is_err());
}
