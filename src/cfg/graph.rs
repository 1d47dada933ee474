//! The control-flow graph: a label→block map with entry/exit markers,
//! traversal, and soundness-preserving simplification.
//!
//! A `Cfg` exclusively owns its blocks. It is deliberately not `Copy` and
//! has no cheap bitwise duplication; [`Cfg::clone`] is a deep copy, and
//! [`crate::cfg::CfgRef`] is the lightweight handle for contexts that need
//! value semantics.

use std::fmt;

use log::debug;
use rustc_hash::{FxHashMap, FxHashSet};

use crate::{
    cfg::{BasicBlock, BlockLabel, CfgRef, CfgRev, FunctionDecl},
    ir::{ArrayLoad, Assume, BoolAssume, StatementVisitor, TrackedPrecision, Variable},
    Error, Result,
};

/// A control-flow graph over caller-supplied block labels.
///
/// The graph is built by a front end: create it with an entry label, obtain
/// blocks with [`Cfg::insert`], emit statements through the block builders,
/// and wire control flow with [`Cfg::add_edge`]. Afterwards it is typically
/// [simplified](Cfg::simplify), [type-checked](crate::analysis::TypeChecker)
/// and then handed read-only to analyzers.
///
/// # Examples
///
/// ```rust
/// use tapir::prelude::*;
///
/// let mut vars = VariableFactory::new();
/// let x = Variable::int(vars.lookup("x"), 32);
///
/// let mut cfg: Cfg<&str> = Cfg::with_exit("entry", "exit", TrackedPrecision::Num);
/// cfg.insert("entry").assign(x.clone(), 1);
/// cfg.insert("exit").ret(x);
/// cfg.add_edge(&"entry", &"exit")?;
/// # Ok::<(), tapir::Error>(())
/// ```
#[derive(Debug, Clone)]
pub struct Cfg<L> {
    entry: L,
    exit: Option<L>,
    blocks: FxHashMap<L, BasicBlock<L>>,
    precision: TrackedPrecision,
    fdecl: Option<FunctionDecl>,
}

impl<L: BlockLabel> Cfg<L> {
    /// Creates a CFG with an entry block and no exit.
    #[must_use]
    pub fn new(entry: L, precision: TrackedPrecision) -> Self {
        let mut blocks = FxHashMap::default();
        blocks.insert(entry.clone(), BasicBlock::new(entry.clone(), precision));
        Self {
            entry,
            exit: None,
            blocks,
            precision,
            fdecl: None,
        }
    }

    /// Creates a CFG with an entry block and a designated exit label.
    ///
    /// Only the entry block is materialized; the exit block appears when the
    /// front end first [`insert`](Cfg::insert)s it.
    #[must_use]
    pub fn with_exit(entry: L, exit: L, precision: TrackedPrecision) -> Self {
        let mut cfg = Self::new(entry, precision);
        cfg.exit = Some(exit);
        cfg
    }

    /// Marks the exit block after construction.
    pub fn set_exit(&mut self, exit: L) {
        self.exit = Some(exit);
    }

    /// Attaches the function declaration after construction.
    pub fn set_fdecl(&mut self, decl: FunctionDecl) {
        self.fdecl = Some(decl);
    }

    /// The entry label.
    #[must_use]
    pub const fn entry(&self) -> &L {
        &self.entry
    }

    /// Returns `true` if an exit label was declared.
    #[must_use]
    pub const fn has_exit(&self) -> bool {
        self.exit.is_some()
    }

    /// The exit label.
    ///
    /// # Errors
    ///
    /// [`Error::NoExitBlock`] when no exit was declared.
    pub fn exit(&self) -> Result<&L> {
        self.exit.as_ref().ok_or(Error::NoExitBlock)
    }

    /// The tracked precision stamped on every block this CFG creates.
    #[must_use]
    pub const fn precision(&self) -> TrackedPrecision {
        self.precision
    }

    /// The attached function declaration, if any.
    #[must_use]
    pub const fn fdecl(&self) -> Option<&FunctionDecl> {
        self.fdecl.as_ref()
    }

    /// Returns the block for `label`, creating it (at this CFG's tracked
    /// precision) if absent.
    pub fn insert(&mut self, label: L) -> &mut BasicBlock<L> {
        let precision = self.precision;
        self.blocks
            .entry(label.clone())
            .or_insert_with(|| BasicBlock::new(label, precision))
    }

    /// Removes a block, disconnecting it from all neighbours.
    ///
    /// Self-loop edges vanish together with the block itself.
    ///
    /// # Errors
    ///
    /// [`Error::BlockNotFound`] if `label` is not in the CFG.
    pub fn remove(&mut self, label: &L) -> Result<()> {
        let block = self.get_node(label)?;
        let preds: Vec<L> = block
            .predecessors()
            .iter()
            .filter(|l| *l != label)
            .cloned()
            .collect();
        let succs: Vec<L> = block
            .successors()
            .iter()
            .filter(|l| *l != label)
            .cloned()
            .collect();
        for p in preds {
            self.get_node_mut(&p)?.remove_successor(label);
        }
        for s in succs {
            self.get_node_mut(&s)?.remove_predecessor(label);
        }
        self.blocks.remove(label);
        Ok(())
    }

    /// The block for `label`.
    ///
    /// # Errors
    ///
    /// [`Error::BlockNotFound`] if `label` is not in the CFG.
    pub fn get_node(&self, label: &L) -> Result<&BasicBlock<L>> {
        self.blocks
            .get(label)
            .ok_or_else(|| Error::BlockNotFound(label.to_string()))
    }

    /// Mutable access to the block for `label`.
    ///
    /// # Errors
    ///
    /// [`Error::BlockNotFound`] if `label` is not in the CFG.
    pub fn get_node_mut(&mut self, label: &L) -> Result<&mut BasicBlock<L>> {
        self.blocks
            .get_mut(label)
            .ok_or_else(|| Error::BlockNotFound(label.to_string()))
    }

    /// Adds the edge `src → dst`, mirror-maintaining both adjacency lists.
    /// Idempotent.
    ///
    /// # Errors
    ///
    /// [`Error::BlockNotFound`] if either endpoint is missing.
    pub fn add_edge(&mut self, src: &L, dst: &L) -> Result<()> {
        if !self.blocks.contains_key(dst) {
            return Err(Error::BlockNotFound(dst.to_string()));
        }
        self.get_node_mut(src)?.add_successor(dst.clone());
        self.get_node_mut(dst)?.add_predecessor(src.clone());
        Ok(())
    }

    /// Removes the edge `src → dst` from both adjacency lists. Idempotent.
    ///
    /// # Errors
    ///
    /// [`Error::BlockNotFound`] if either endpoint is missing.
    pub fn remove_edge(&mut self, src: &L, dst: &L) -> Result<()> {
        if !self.blocks.contains_key(dst) {
            return Err(Error::BlockNotFound(dst.to_string()));
        }
        self.get_node_mut(src)?.remove_successor(dst);
        self.get_node_mut(dst)?.remove_predecessor(src);
        Ok(())
    }

    /// Successor labels of `label`.
    ///
    /// # Errors
    ///
    /// [`Error::BlockNotFound`] if `label` is not in the CFG.
    pub fn next_nodes(&self, label: &L) -> Result<&[L]> {
        self.get_node(label).map(BasicBlock::successors)
    }

    /// Predecessor labels of `label`.
    ///
    /// # Errors
    ///
    /// [`Error::BlockNotFound`] if `label` is not in the CFG.
    pub fn prev_nodes(&self, label: &L) -> Result<&[L]> {
        self.get_node(label).map(BasicBlock::predecessors)
    }

    /// Iterates over the blocks in the map's (unordered) iteration order.
    pub fn blocks(&self) -> impl Iterator<Item = &BasicBlock<L>> {
        self.blocks.values()
    }

    /// Iterates over the block labels in the map's (unordered) iteration
    /// order.
    pub fn labels(&self) -> impl Iterator<Item = &L> {
        self.blocks.keys()
    }

    /// Number of blocks.
    #[must_use]
    pub fn size(&self) -> usize {
        self.blocks.len()
    }

    /// Every variable used or defined anywhere in the CFG, each exactly
    /// once.
    ///
    /// Linear in the size of the CFG so that the result stays valid after
    /// block removals.
    #[must_use]
    pub fn get_vars(&self) -> Vec<Variable> {
        let mut out: Vec<Variable> = Vec::new();
        for b in self.blocks.values() {
            for v in b.live() {
                if !out.contains(v) {
                    out.push(v.clone());
                }
            }
        }
        out
    }

    /// Structural hash of the attached function declaration's signature.
    ///
    /// # Errors
    ///
    /// [`Error::MissingFunctionDecl`] when no declaration is attached.
    pub fn signature_hash(&self) -> Result<u64> {
        self.fdecl
            .as_ref()
            .map(FunctionDecl::signature_hash)
            .ok_or(Error::MissingFunctionDecl)
    }

    /// Block labels in depth-first order from the entry.
    ///
    /// This is the deterministic traversal used for rendering: a block is
    /// emitted before its successors, successors in adjacency order.
    #[must_use]
    pub fn dfs_labels(&self) -> Vec<&L> {
        let mut order = Vec::new();
        let mut visited: FxHashSet<&L> = FxHashSet::default();
        let mut stack = vec![&self.entry];
        while let Some(l) = stack.pop() {
            if !visited.insert(l) {
                continue;
            }
            let Some(block) = self.blocks.get(l) else {
                continue;
            };
            order.push(l);
            for next in block.successors().iter().rev() {
                if !visited.contains(next) {
                    stack.push(next);
                }
            }
        }
        order
    }

    /// Runs the simplification pipeline: merge linear chains, drop blocks
    /// unreachable from the entry, drop blocks that cannot reach the exit,
    /// then merge twice more, since the removals can expose new merge
    /// opportunities.
    ///
    /// Simplification preserves analysis soundness: blocks holding `assume`,
    /// boolean `assume`, or `array_load` statements are never merged away,
    /// so guard edges and join-point precision survive.
    ///
    /// # Errors
    ///
    /// Propagates lookup errors, which indicate a corrupted adjacency
    /// invariant rather than a caller mistake.
    pub fn simplify(&mut self) -> Result<()> {
        self.merge_blocks()?;
        self.remove_unreachable_blocks()?;
        self.remove_useless_blocks()?;
        // After removing useless blocks there can be opportunities to merge
        // more blocks.
        self.merge_blocks()?;
        self.merge_blocks()
    }

    fn block_resists_merging(block: &BasicBlock<L>) -> bool {
        #[derive(Default)]
        struct MergeBarrier {
            found: bool,
        }
        impl StatementVisitor for MergeBarrier {
            fn visit_assume(&mut self, _: &Assume) {
                self.found = true;
            }
            fn visit_bool_assume(&mut self, _: &BoolAssume) {
                self.found = true;
            }
            fn visit_array_load(&mut self, _: &ArrayLoad) {
                self.found = true;
            }
        }
        let mut vis = MergeBarrier::default();
        block.accept(&mut vis);
        vis.found
    }

    // Merges a block into its predecessor when it has exactly one
    // predecessor and one successor and holds no merge-barrier statement.
    fn merge_blocks(&mut self) -> Result<()> {
        let mut visited: FxHashSet<L> = FxHashSet::default();
        let mut stack = vec![self.entry.clone()];
        while let Some(cur) = stack.pop() {
            if !visited.insert(cur.clone()) {
                continue;
            }
            let block = self.get_node(&cur)?;
            let linear = block.predecessors().len() == 1 && block.successors().len() == 1;
            if linear {
                let parent = block.predecessors()[0].clone();
                let child = block.successors()[0].clone();
                if parent != cur && child != cur && !Self::block_resists_merging(block) {
                    let merged = block.clone();
                    self.get_node_mut(&parent)?.merge_back(&merged);
                    self.remove(&cur)?;
                    self.add_edge(&parent, &child)?;
                    debug!("merged block {cur} into {parent}");
                    stack.push(child);
                    continue;
                }
            }
            for next in self.next_nodes(&cur)? {
                if !visited.contains(next) {
                    stack.push(next.clone());
                }
            }
        }
        Ok(())
    }

    fn mark_alive_blocks(&self, from: &L) -> Result<FxHashSet<L>> {
        let mut alive: FxHashSet<L> = FxHashSet::default();
        let mut stack = vec![from.clone()];
        while let Some(l) = stack.pop() {
            if !alive.insert(l.clone()) {
                continue;
            }
            for next in self.next_nodes(&l)? {
                if !alive.contains(next) {
                    stack.push(next.clone());
                }
            }
        }
        Ok(alive)
    }

    // Removes blocks not forward-reachable from the entry.
    fn remove_unreachable_blocks(&mut self) -> Result<()> {
        let alive = self.mark_alive_blocks(&self.entry)?;
        let dead: Vec<L> = self
            .blocks
            .keys()
            .filter(|l| !alive.contains(*l))
            .cloned()
            .collect();
        for l in dead {
            debug!("removing unreachable block {l}");
            self.remove(&l)?;
        }
        Ok(())
    }

    // Removes blocks that cannot reach the exit, discovered by a forward
    // traversal of the reversed view from its entry (the underlying exit).
    fn remove_useless_blocks(&mut self) -> Result<()> {
        if !self.has_exit() {
            return Ok(());
        }
        let useful: FxHashSet<L> = {
            let rev = CfgRev::new(CfgRef::new(self));
            let mut useful: FxHashSet<L> = FxHashSet::default();
            let mut stack = vec![rev.entry()?.clone()];
            while let Some(l) = stack.pop() {
                if !useful.insert(l.clone()) {
                    continue;
                }
                for next in rev.next_nodes(&l)? {
                    if !useful.contains(next) {
                        stack.push(next.clone());
                    }
                }
            }
            useful
        };
        let useless: Vec<L> = self
            .blocks
            .keys()
            .filter(|l| !useful.contains(*l))
            .cloned()
            .collect();
        for l in useless {
            debug!("removing useless block {l}");
            self.remove(&l)?;
        }
        Ok(())
    }
}

impl<L: BlockLabel> fmt::Display for Cfg<L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(decl) = &self.fdecl {
            writeln!(f, "{decl}")?;
        }
        for label in self.dfs_labels() {
            if let Some(block) = self.blocks.get(label) {
                write!(f, "{block}")?;
            }
        }
        Ok(())
    }
}
