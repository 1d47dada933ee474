//! A lightweight, copyable handle over a non-copyable [`Cfg`].
//!
//! Graph adapters and containers often require value semantics that the
//! owning [`Cfg`] deliberately does not provide. `CfgRef` wraps a borrow
//! into a `Copy` object with the same read surface.

use std::fmt;

use crate::{
    cfg::{BasicBlock, BlockLabel, Cfg, FunctionDecl},
    ir::Variable,
    Result,
};

/// Copyable, assignable handle over a [`Cfg`].
///
/// A default-constructed handle is *empty*; accessing any operation on an
/// empty handle is a programming error and panics. The handle borrows the
/// CFG immutably, so the underlying graph cannot change while handles are
/// alive, which is exactly the read-only lifecycle analyzers expect.
#[derive(Debug)]
pub struct CfgRef<'c, L> {
    inner: Option<&'c Cfg<L>>,
}

// Manual impls: the handle is a plain reference and stays `Copy` even when
// the label type itself is not.
impl<L> Clone for CfgRef<'_, L> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<L> Copy for CfgRef<'_, L> {}

impl<L> Default for CfgRef<'_, L> {
    fn default() -> Self {
        Self { inner: None }
    }
}

impl<'c, L: BlockLabel> CfgRef<'c, L> {
    /// Wraps a CFG borrow.
    #[must_use]
    pub const fn new(cfg: &'c Cfg<L>) -> Self {
        Self { inner: Some(cfg) }
    }

    /// An empty handle. Needed by adapters that default-construct nodes
    /// before binding them.
    #[must_use]
    pub const fn empty() -> Self {
        Self { inner: None }
    }

    /// Returns `true` if no CFG is bound.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.inner.is_none()
    }

    /// The underlying CFG.
    ///
    /// # Panics
    ///
    /// Panics when the handle is empty.
    #[must_use]
    pub fn get(&self) -> &'c Cfg<L> {
        self.inner.expect("access through an empty cfg_ref")
    }

    /// The entry label.
    #[must_use]
    pub fn entry(&self) -> &'c L {
        self.get().entry()
    }

    /// Returns `true` if the underlying CFG declares an exit.
    #[must_use]
    pub fn has_exit(&self) -> bool {
        self.get().has_exit()
    }

    /// The exit label.
    ///
    /// # Errors
    ///
    /// [`crate::Error::NoExitBlock`] when the underlying CFG has no exit.
    pub fn exit(&self) -> Result<&'c L> {
        self.get().exit()
    }

    /// Successor labels of `label`.
    ///
    /// # Errors
    ///
    /// [`crate::Error::BlockNotFound`] if `label` is not in the CFG.
    pub fn next_nodes(&self, label: &L) -> Result<&'c [L]> {
        self.get().next_nodes(label)
    }

    /// Predecessor labels of `label`.
    ///
    /// # Errors
    ///
    /// [`crate::Error::BlockNotFound`] if `label` is not in the CFG.
    pub fn prev_nodes(&self, label: &L) -> Result<&'c [L]> {
        self.get().prev_nodes(label)
    }

    /// The block for `label`.
    ///
    /// # Errors
    ///
    /// [`crate::Error::BlockNotFound`] if `label` is not in the CFG.
    pub fn get_node(&self, label: &L) -> Result<&'c BasicBlock<L>> {
        self.get().get_node(label)
    }

    /// Iterates over the blocks.
    pub fn blocks(&self) -> impl Iterator<Item = &'c BasicBlock<L>> {
        self.get().blocks()
    }

    /// Iterates over the block labels.
    pub fn labels(&self) -> impl Iterator<Item = &'c L> {
        self.get().labels()
    }

    /// Number of blocks.
    #[must_use]
    pub fn size(&self) -> usize {
        self.get().size()
    }

    /// The attached function declaration, if any.
    #[must_use]
    pub fn fdecl(&self) -> Option<&'c FunctionDecl> {
        self.get().fdecl()
    }

    /// Every variable used or defined anywhere in the CFG.
    #[must_use]
    pub fn get_vars(&self) -> Vec<Variable> {
        self.get().get_vars()
    }

    /// Structural hash of the function declaration's signature; equality
    /// and hashing of handles delegate to this.
    ///
    /// # Errors
    ///
    /// [`crate::Error::MissingFunctionDecl`] when no declaration is
    /// attached.
    pub fn signature_hash(&self) -> Result<u64> {
        self.get().signature_hash()
    }

    /// Returns `true` when both handles carry declarations with the same
    /// ABI signature.
    ///
    /// # Errors
    ///
    /// [`crate::Error::MissingFunctionDecl`] when either side lacks a
    /// declaration.
    pub fn same_signature(&self, other: &Self) -> Result<bool> {
        Ok(self.signature_hash()? == other.signature_hash()?)
    }
}

impl<L: BlockLabel> fmt::Display for CfgRef<'_, L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self.get(), f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::TrackedPrecision;

    #[test]
    fn test_ref_mirrors_cfg_surface() {
        let mut cfg: Cfg<&str> = Cfg::with_exit("entry", "exit", TrackedPrecision::Num);
        cfg.insert("exit");
        cfg.add_edge(&"entry", &"exit").unwrap();

        let r = CfgRef::new(&cfg);
        let r2 = r; // Copy
        assert_eq!(r.entry(), &"entry");
        assert_eq!(r2.exit().unwrap(), &"exit");
        assert_eq!(r.size(), 2);
        assert_eq!(r.next_nodes(&"entry").unwrap(), &["exit"]);
        assert_eq!(r.to_string(), cfg.to_string());
    }

    #[test]
    #[should_panic(expected = "empty cfg_ref")]
    fn test_empty_ref_access_panics() {
        let r: CfgRef<'_, &str> = CfgRef::empty();
        let _ = r.entry();
    }
}
