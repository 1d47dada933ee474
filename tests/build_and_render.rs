//! End-to-end construction and rendering tests.
//!
//! These drive the public API the way a front end does: intern variables,
//! build blocks through the typed builders, wire edges, then check the
//! observable text forms and variable collection.

use tapir::prelude::*;

/// A 32-bit integer variable.
fn int(vars: &mut VariableFactory, key: &str) -> Variable {
    Variable::int(vars.lookup(key), 32)
}

#[test]
fn test_single_block_function() -> Result<()> {
    let mut vars = VariableFactory::new();
    let x = int(&mut vars, "x");
    let y = int(&mut vars, "y");
    let z = int(&mut vars, "z");

    let mut cfg: Cfg<&str> = Cfg::with_exit("b0", "b0", TrackedPrecision::Num);
    let b0 = cfg.insert("b0");
    b0.add(y.clone(), x.clone(), 1);
    b0.add(z.clone(), y.clone(), 2);
    b0.ret(z.clone());

    let mut got = cfg.get_vars();
    got.sort_by_key(|v| v.name().index());
    assert_eq!(got, vec![x, y, z]);

    let before = cfg.to_string();
    cfg.simplify()?;
    assert_eq!(cfg.to_string(), before, "simplify must be a no-op here");

    assert!(before.contains("y = x+1;"));
    assert!(before.contains("z = y+2;"));
    assert!(before.contains("return z;"));
    Ok(())
}

#[test]
fn test_rendering_is_dfs_from_entry_with_goto_trailers() -> Result<()> {
    let mut vars = VariableFactory::new();
    let x = int(&mut vars, "x");

    let mut cfg: Cfg<&str> = Cfg::with_exit("entry", "exit", TrackedPrecision::Num);
    cfg.insert("then").assign(x.clone(), 1);
    cfg.insert("else").assign(x.clone(), 2);
    cfg.insert("exit").ret(x.clone());
    cfg.add_edge(&"entry", &"then")?;
    cfg.add_edge(&"entry", &"else")?;
    cfg.add_edge(&"then", &"exit")?;
    cfg.add_edge(&"else", &"exit")?;

    let out = cfg.to_string();
    assert!(out.starts_with("entry:\n"), "entry renders first: {out}");
    assert!(out.contains("  goto then,else;\n"));
    // DFS emits a block before its unvisited successors.
    let entry_pos = out.find("entry:").unwrap();
    let then_pos = out.find("then:").unwrap();
    let exit_pos = out.find("exit:").unwrap();
    assert!(entry_pos < then_pos && then_pos < exit_pos);
    Ok(())
}

#[test]
fn test_function_declaration_rendering() -> Result<()> {
    let mut vars = VariableFactory::new();
    let a = int(&mut vars, "a");
    let b = int(&mut vars, "b");
    let r = int(&mut vars, "r");

    let mut cfg: Cfg<&str> = Cfg::with_exit("b0", "b0", TrackedPrecision::Num);
    cfg.set_fdecl(FunctionDecl::new("sum", vec![a.clone(), b.clone()], vec![r.clone()])?);
    let blk = cfg.insert("b0");
    blk.add(r.clone(), a, b);
    blk.ret(r);

    let out = cfg.to_string();
    assert!(
        out.starts_with("r:int declare sum(a:int,b:int)\n"),
        "declaration renders first: {out}"
    );
    Ok(())
}

#[test]
fn test_signature_hash_equality_and_missing_decl() -> Result<()> {
    let mut vars = VariableFactory::new();
    let a = int(&mut vars, "a");
    let r = int(&mut vars, "r");

    let mut cfg1: Cfg<&str> = Cfg::with_exit("b0", "b0", TrackedPrecision::Num);
    cfg1.set_fdecl(FunctionDecl::new("f", vec![a.clone()], vec![r.clone()])?);

    let mut vars2 = VariableFactory::new();
    let p = Variable::int(vars2.lookup("p"), 16);
    let q = Variable::int(vars2.lookup("q"), 16);
    let mut cfg2: Cfg<&str> = Cfg::with_exit("other", "other", TrackedPrecision::Num);
    cfg2.set_fdecl(FunctionDecl::new("f", vec![p], vec![q])?);

    // Same name and parameter types hash identically, regardless of
    // variable names, bit-widths, or graph shape.
    assert_eq!(cfg1.signature_hash()?, cfg2.signature_hash()?);

    let bare: Cfg<&str> = Cfg::new("b0", TrackedPrecision::Num);
    assert!(matches!(
        bare.signature_hash(),
        Err(Error::MissingFunctionDecl)
    ));
    Ok(())
}

#[test]
fn test_precision_shrinks_cfgs_without_branching() -> Result<()> {
    // The same emission code produces progressively smaller blocks as the
    // tracked precision coarsens.
    fn emit(cfg: &mut Cfg<&'static str>, vars: &mut VariableFactory) -> Result<()> {
        let x = Variable::int(vars.lookup("x"), 32);
        let p = Variable::pointer(vars.lookup("p"));
        let q = Variable::pointer(vars.lookup("q"));
        let arr = Variable::array_of(vars.lookup("arr"), Type::Int).unwrap();

        let b = cfg.insert("b0");
        b.assign(x.clone(), 1);
        b.ptr_store(p, q);
        b.array_store(arr, x, 0, 4, false)?;
        Ok(())
    }

    let mut sizes = Vec::new();
    for prec in [
        TrackedPrecision::Num,
        TrackedPrecision::Ptr,
        TrackedPrecision::Arr,
    ] {
        let mut vars = VariableFactory::new();
        let mut cfg: Cfg<&str> = Cfg::with_exit("b0", "b0", prec);
        emit(&mut cfg, &mut vars)?;
        sizes.push(cfg.get_node(&"b0")?.len());
    }
    assert_eq!(sizes, vec![1, 2, 3]);
    Ok(())
}

#[test]
fn test_variable_factory_density() {
    let mut vars = VariableFactory::new();
    let names: Vec<_> = ["a", "b", "c", "a", "d"]
        .iter()
        .map(|k| vars.lookup(k))
        .collect();

    assert_eq!(names[0].index(), 1);
    assert_eq!(names[1].index(), 2);
    assert_eq!(names[2].index(), 3);
    assert_eq!(names[3], names[0]);
    assert_eq!(names[4].index(), 4);
}

#[test]
fn test_clone_preserves_structure() -> Result<()> {
    let mut vars = VariableFactory::new();
    let x = int(&mut vars, "x");

    let mut cfg: Cfg<&str> = Cfg::with_exit("entry", "exit", TrackedPrecision::Num);
    cfg.set_fdecl(FunctionDecl::new("f", vec![], vec![])?);
    cfg.insert("entry").assign(x.clone(), 1);
    cfg.insert("exit").ret(x);
    cfg.add_edge(&"entry", &"exit")?;

    let copy = cfg.clone();
    assert_eq!(copy.size(), cfg.size());
    assert_eq!(copy.entry(), cfg.entry());
    assert_eq!(copy.exit()?, cfg.exit()?);
    assert_eq!(copy.fdecl(), cfg.fdecl());
    assert_eq!(copy.to_string(), cfg.to_string());

    // Labels and ordered statements match block by block.
    for b in cfg.blocks() {
        let other = copy.get_node(b.label())?;
        assert_eq!(b.statements(), other.statements());
        assert_eq!(b.successors(), other.successors());
        assert_eq!(b.predecessors(), other.predecessors());
    }
    Ok(())
}
