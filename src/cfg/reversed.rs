//! Read-only reversed views for backward analyses.
//!
//! A backward analyzer wants the same iteration contract as a forward one:
//! start at the entry, follow `next_nodes`, visit each block's statements in
//! order. [`CfgRev`] provides exactly that over a reversed presentation
//! where the entry is the underlying exit, edge directions are swapped, and
//! each block's statements come out back-to-front. Statement payloads are
//! *not* rewritten; only the iteration order flips.

use std::fmt;

use rustc_hash::FxHashMap;

use crate::{
    cfg::{BasicBlock, BlockLabel, CfgRef, FunctionDecl},
    ir::{Statement, StatementVisitor, Variable},
    Result,
};

/// A read-only view of one block with statement order reversed and
/// predecessor/successor roles swapped.
#[derive(Debug)]
pub struct BlockRev<'c, L> {
    block: &'c BasicBlock<L>,
}

// Manual impls: the facade is a plain reference and stays `Copy` even when
// the label type itself is not.
impl<L> Clone for BlockRev<'_, L> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<L> Copy for BlockRev<'_, L> {}

impl<'c, L: BlockLabel> BlockRev<'c, L> {
    /// Wraps a block borrow.
    #[must_use]
    pub const fn new(block: &'c BasicBlock<L>) -> Self {
        Self { block }
    }

    /// The block's label.
    #[must_use]
    pub const fn label(&self) -> &'c L {
        self.block.label()
    }

    /// The label rendered for display.
    #[must_use]
    pub fn name(&self) -> String {
        self.block.name()
    }

    /// The statements, last first.
    pub fn statements(&self) -> impl Iterator<Item = &'c Statement> {
        self.block.statements().iter().rev()
    }

    /// Number of statements.
    #[must_use]
    pub fn len(&self) -> usize {
        self.block.len()
    }

    /// Returns `true` if the underlying block holds no statements.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.block.is_empty()
    }

    /// Successors of the view: the underlying block's predecessors.
    #[must_use]
    pub fn successors(&self) -> &'c [L] {
        self.block.predecessors()
    }

    /// Predecessors of the view: the underlying block's successors.
    #[must_use]
    pub fn predecessors(&self) -> &'c [L] {
        self.block.successors()
    }

    /// The underlying block's aggregate live set (orientation-independent).
    #[must_use]
    pub fn live(&self) -> &'c [Variable] {
        self.block.live()
    }

    /// Visits the statements in reverse order.
    pub fn accept<V: StatementVisitor + ?Sized>(&self, v: &mut V) {
        for s in self.statements() {
            s.accept(v);
        }
    }
}

impl<L: BlockLabel> fmt::Display for BlockRev<'_, L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}:", self.label())?;
        for s in self.statements() {
            writeln!(f, "  {s};")?;
        }
        f.write_str("--> [")?;
        for l in self.successors() {
            write!(f, "{l};")?;
        }
        f.write_str("]\n")
    }
}

/// A reversed view over a whole CFG.
///
/// The view caches one [`BlockRev`] facade per block at construction so that
/// [`CfgRev::get_node`] hands out stable references; queries never rebuild
/// facades. The view is copy-cheap to clone and is consumed by backward
/// analyzers exactly like a forward CFG.
#[derive(Debug, Clone)]
pub struct CfgRev<'c, L> {
    cfg: CfgRef<'c, L>,
    rev_blocks: FxHashMap<L, BlockRev<'c, L>>,
}

impl<'c, L: BlockLabel> CfgRev<'c, L> {
    /// Builds the reversed view, creating the per-block facades once.
    ///
    /// # Panics
    ///
    /// Panics when `cfg` is an empty handle.
    #[must_use]
    pub fn new(cfg: CfgRef<'c, L>) -> Self {
        let rev_blocks = cfg
            .blocks()
            .map(|b| (b.label().clone(), BlockRev::new(b)))
            .collect();
        Self { cfg, rev_blocks }
    }

    /// The view's entry: the underlying exit.
    ///
    /// # Errors
    ///
    /// [`crate::Error::NoExitBlock`] when the underlying CFG has no exit.
    pub fn entry(&self) -> Result<&'c L> {
        self.cfg.exit()
    }

    /// The view's exit: the underlying entry.
    #[must_use]
    pub fn exit(&self) -> &'c L {
        self.cfg.entry()
    }

    /// A reversed view always has an exit (the underlying entry).
    #[must_use]
    pub const fn has_exit(&self) -> bool {
        true
    }

    /// Successors in the view: the underlying predecessors.
    ///
    /// # Errors
    ///
    /// [`crate::Error::BlockNotFound`] if `label` is not in the CFG.
    pub fn next_nodes(&self, label: &L) -> Result<&'c [L]> {
        self.cfg.prev_nodes(label)
    }

    /// Predecessors in the view: the underlying successors.
    ///
    /// # Errors
    ///
    /// [`crate::Error::BlockNotFound`] if `label` is not in the CFG.
    pub fn prev_nodes(&self, label: &L) -> Result<&'c [L]> {
        self.cfg.next_nodes(label)
    }

    /// The cached facade for `label`.
    ///
    /// # Errors
    ///
    /// [`crate::Error::BlockNotFound`] if `label` is not in the CFG.
    pub fn get_node(&self, label: &L) -> Result<&BlockRev<'c, L>> {
        self.rev_blocks
            .get(label)
            .ok_or_else(|| crate::Error::BlockNotFound(label.to_string()))
    }

    /// Iterates over the facades in the map's (unordered) iteration order.
    pub fn blocks(&self) -> impl Iterator<Item = &BlockRev<'c, L>> {
        self.rev_blocks.values()
    }

    /// Number of blocks.
    #[must_use]
    pub fn size(&self) -> usize {
        self.rev_blocks.len()
    }

    /// The underlying function declaration, if any.
    #[must_use]
    pub fn fdecl(&self) -> Option<&'c FunctionDecl> {
        self.cfg.fdecl()
    }
}

impl<L: BlockLabel> fmt::Display for CfgRev<'_, L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(decl) = self.fdecl() {
            writeln!(f, "{decl}")?;
        }
        for b in self.rev_blocks.values() {
            write!(f, "{b}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        cfg::Cfg,
        ir::{TrackedPrecision, Variable, VariableFactory},
    };

    fn diamond() -> Cfg<&'static str> {
        let mut vars = VariableFactory::new();
        let x = Variable::int(vars.lookup("x"), 32);
        let mut cfg: Cfg<&str> = Cfg::with_exit("entry", "exit", TrackedPrecision::Num);
        cfg.insert("then");
        cfg.insert("else");
        cfg.insert("exit").ret(x.clone());
        cfg.insert("entry").assign(x, 1);
        cfg.add_edge(&"entry", &"then").unwrap();
        cfg.add_edge(&"entry", &"else").unwrap();
        cfg.add_edge(&"then", &"exit").unwrap();
        cfg.add_edge(&"else", &"exit").unwrap();
        cfg
    }

    #[test]
    fn test_entry_exit_swap() {
        let cfg = diamond();
        let rev = CfgRev::new(CfgRef::new(&cfg));
        assert_eq!(rev.entry().unwrap(), &"exit");
        assert_eq!(rev.exit(), &"entry");
        assert!(rev.has_exit());
    }

    #[test]
    fn test_entry_requires_underlying_exit() {
        let cfg: Cfg<&str> = Cfg::new("entry", TrackedPrecision::Num);
        let rev = CfgRev::new(CfgRef::new(&cfg));
        assert!(rev.entry().is_err());
    }

    #[test]
    fn test_adjacency_is_swapped() {
        let cfg = diamond();
        let rev = CfgRev::new(CfgRef::new(&cfg));
        assert_eq!(rev.next_nodes(&"exit").unwrap(), &["then", "else"]);
        assert_eq!(rev.prev_nodes(&"entry").unwrap(), &["then", "else"]);

        let b = rev.get_node(&"exit").unwrap();
        assert_eq!(b.predecessors(), &[] as &[&str]);
        assert_eq!(b.successors(), &["then", "else"]);
    }

    #[test]
    fn test_statements_iterate_in_reverse_without_rewriting() {
        let mut vars = VariableFactory::new();
        let x = Variable::int(vars.lookup("x"), 32);
        let y = Variable::int(vars.lookup("y"), 32);
        let mut cfg: Cfg<&str> = Cfg::new("b", TrackedPrecision::Num);
        let b = cfg.insert("b");
        b.assign(x.clone(), 1);
        b.add(y, x, 2);

        let rev = CfgRev::new(CfgRef::new(&cfg));
        let rendered: Vec<String> = rev
            .get_node(&"b")
            .unwrap()
            .statements()
            .map(ToString::to_string)
            .collect();
        assert_eq!(rendered, vec!["y = x+2", "x = 1"]);
    }

    #[test]
    fn test_double_reverse_entry_identity() {
        // cfg_rev is a view, so double reversal is expressed through the
        // swapped accessors: the view's exit is the underlying entry.
        let cfg = diamond();
        let rev = CfgRev::new(CfgRef::new(&cfg));
        assert_eq!(rev.exit(), cfg.entry());
        assert_eq!(rev.entry().unwrap(), cfg.exit().unwrap());
    }

    #[test]
    fn test_facades_are_cached() {
        let cfg = diamond();
        let rev = CfgRev::new(CfgRef::new(&cfg));
        let a = rev.get_node(&"then").unwrap() as *const _;
        let b = rev.get_node(&"then").unwrap() as *const _;
        assert_eq!(a, b, "get_node must return the cached facade");
    }

    #[test]
    fn test_view_is_cloneable() {
        let cfg = diamond();
        let rev = CfgRev::new(CfgRef::new(&cfg));
        let copy = rev.clone();
        assert_eq!(copy.size(), rev.size());
        assert_eq!(copy.entry().unwrap(), rev.entry().unwrap());
    }
}
