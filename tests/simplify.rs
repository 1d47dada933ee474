//! Simplification scenarios: block merging, unreachable and useless block
//! removal, and the soundness barriers that keep guard blocks alive.

use tapir::prelude::*;

fn int(vars: &mut VariableFactory, key: &str) -> Variable {
    Variable::int(vars.lookup(key), 32)
}

/// Checks the adjacency mirror invariant over the whole graph:
/// `l ∈ succ(b)` iff `b ∈ pred(l)`.
fn assert_mirrored(cfg: &Cfg<&str>) {
    for b in cfg.blocks() {
        for s in b.successors() {
            let succ = cfg.get_node(s).expect("dangling successor label");
            assert!(
                succ.predecessors().contains(b.label()),
                "{} -> {} has no mirror predecessor entry",
                b.label(),
                s
            );
        }
        for p in b.predecessors() {
            let pred = cfg.get_node(p).expect("dangling predecessor label");
            assert!(
                pred.successors().contains(b.label()),
                "{} <- {} has no mirror successor entry",
                b.label(),
                p
            );
        }
    }
}

/// Builds the linear chain `entry -> mid -> exit` where `mid` holds
/// `t = a + 1` and `exit` returns `t`.
fn linear_chain(vars: &mut VariableFactory) -> Cfg<&'static str> {
    let a = int(vars, "a");
    let t = int(vars, "t");

    let mut cfg: Cfg<&str> = Cfg::with_exit("entry", "exit", TrackedPrecision::Num);
    cfg.insert("mid").add(t.clone(), a, 1);
    cfg.insert("exit").ret(t);
    cfg.add_edge(&"entry", &"mid").unwrap();
    cfg.add_edge(&"mid", &"exit").unwrap();
    cfg
}

#[test]
fn test_merge_blocks_collapses_linear_chain() -> Result<()> {
    let mut vars = VariableFactory::new();
    let mut cfg = linear_chain(&mut vars);

    cfg.simplify()?;

    assert_eq!(cfg.size(), 2, "entry+mid merged, exit remains");
    assert!(cfg.get_node(&"mid").is_err());

    let entry = cfg.get_node(&"entry")?;
    let rendered: Vec<String> = entry.statements().iter().map(ToString::to_string).collect();
    assert_eq!(rendered, vec!["t = a+1"], "mid's statement moved into entry");
    assert_eq!(cfg.next_nodes(&"entry")?, &["exit"]);
    assert_mirrored(&cfg);
    Ok(())
}

#[test]
fn test_unreachable_block_is_removed() -> Result<()> {
    let mut vars = VariableFactory::new();
    let mut cfg = linear_chain(&mut vars);
    cfg.insert("dead").havoc(int(&mut vars, "junk"));

    cfg.simplify()?;

    assert!(cfg.get_node(&"dead").is_err());
    assert!(cfg.get_node(&"entry").is_ok());
    assert_mirrored(&cfg);
    Ok(())
}

#[test]
fn test_useless_block_is_removed() -> Result<()> {
    let mut vars = VariableFactory::new();
    let mut cfg = linear_chain(&mut vars);
    cfg.insert("orphan");
    cfg.add_edge(&"entry", &"orphan")?;

    cfg.simplify()?;

    assert!(
        cfg.get_node(&"orphan").is_err(),
        "block with no path to exit must go"
    );
    assert!(cfg.get_node(&"entry").is_ok());
    assert!(cfg.get_node(&"exit").is_ok());
    assert_mirrored(&cfg);
    Ok(())
}

#[test]
fn test_assume_guard_is_never_merged() -> Result<()> {
    let mut vars = VariableFactory::new();
    let x = int(&mut vars, "x");

    let mut cfg: Cfg<&str> = Cfg::with_exit("entry", "exit", TrackedPrecision::Num);
    cfg.insert("guard").assume(LinearConstraint::ge(x.clone(), 0));
    cfg.insert("exit").ret(x);
    cfg.add_edge(&"entry", &"guard")?;
    cfg.add_edge(&"guard", &"exit")?;

    cfg.simplify()?;

    assert_eq!(cfg.size(), 3, "all three blocks survive");
    let out = cfg.to_string();
    assert!(out.contains("entry:\n"));
    assert!(out.contains("guard:\n"));
    assert!(out.contains("exit:\n"));
    assert!(out.contains("  assume(x >= 0);\n"));
    assert_mirrored(&cfg);
    Ok(())
}

#[test]
fn test_bool_assume_and_array_load_are_barriers() -> Result<()> {
    let mut vars = VariableFactory::new();
    let flag = Variable::boolean(vars.lookup("flag"));
    let arr = Variable::array_of(vars.lookup("arr"), Type::Int).unwrap();
    let x = int(&mut vars, "x");

    let mut cfg: Cfg<&str> = Cfg::with_exit("entry", "exit", TrackedPrecision::Arr);
    cfg.insert("guard").bool_assume(flag);
    cfg.insert("load").array_load(x.clone(), arr, 0, 4)?;
    cfg.insert("exit").ret(x);
    cfg.add_edge(&"entry", &"guard")?;
    cfg.add_edge(&"guard", &"load")?;
    cfg.add_edge(&"load", &"exit")?;

    cfg.simplify()?;

    assert!(cfg.get_node(&"guard").is_ok());
    assert!(cfg.get_node(&"load").is_ok());
    assert_mirrored(&cfg);
    Ok(())
}

#[test]
fn test_simplify_preserves_non_barrier_statements() -> Result<()> {
    // Property: simplification keeps every reachable non-barrier statement.
    let mut vars = VariableFactory::new();
    let a = int(&mut vars, "a");
    let b = int(&mut vars, "b");
    let c = int(&mut vars, "c");

    let mut cfg: Cfg<&str> = Cfg::with_exit("entry", "exit", TrackedPrecision::Num);
    cfg.insert("entry").assign(a.clone(), 1);
    cfg.insert("s1").add(b.clone(), a.clone(), 1);
    cfg.insert("s2").add(c.clone(), b.clone(), 1);
    cfg.insert("exit").ret(c.clone());
    cfg.add_edge(&"entry", &"s1")?;
    cfg.add_edge(&"s1", &"s2")?;
    cfg.add_edge(&"s2", &"exit")?;

    let statements_before: usize = cfg.blocks().map(BasicBlock::len).sum();
    cfg.simplify()?;
    let statements_after: usize = cfg.blocks().map(BasicBlock::len).sum();

    assert_eq!(statements_before, statements_after);
    assert_eq!(cfg.size(), 2, "s1 and s2 fold into entry");

    let entry = cfg.get_node(&"entry")?;
    let rendered: Vec<String> = entry.statements().iter().map(ToString::to_string).collect();
    assert_eq!(rendered, vec!["a = 1", "b = a+1", "c = b+1"]);
    Ok(())
}

#[test]
fn test_every_survivor_is_reachable_and_coreachable() -> Result<()> {
    // Property: after simplify, every block except the entry has at least
    // one predecessor and reaches the exit.
    let mut vars = VariableFactory::new();
    let x = int(&mut vars, "x");

    let mut cfg: Cfg<&str> = Cfg::with_exit("entry", "exit", TrackedPrecision::Num);
    cfg.insert("guard").assume(LinearConstraint::ge(x.clone(), 0));
    cfg.insert("exit").ret(x.clone());
    cfg.insert("island").havoc(x.clone());
    cfg.insert("trap").havoc(x);
    cfg.add_edge(&"entry", &"guard")?;
    cfg.add_edge(&"guard", &"exit")?;
    cfg.add_edge(&"entry", &"trap")?; // no way out of trap

    cfg.simplify()?;

    for blk in cfg.blocks() {
        if blk.label() != cfg.entry() {
            assert!(
                !blk.predecessors().is_empty(),
                "{} has no predecessor",
                blk.label()
            );
        }
    }
    assert!(cfg.get_node(&"island").is_err());
    assert!(cfg.get_node(&"trap").is_err());

    // Backward reachability from the exit covers every survivor.
    let rev = CfgRev::new(CfgRef::new(&cfg));
    let mut seen = std::collections::HashSet::new();
    let mut stack = vec![*rev.entry()?];
    while let Some(l) = stack.pop() {
        if seen.insert(l) {
            for n in rev.next_nodes(&l)? {
                stack.push(*n);
            }
        }
    }
    assert_eq!(seen.len(), cfg.size());
    Ok(())
}
