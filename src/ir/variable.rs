//! Variable names and the interning factory that produces them.
//!
//! Analyses compare variables constantly, so names are interned once and
//! equated by a dense integer index afterwards. The factory owns the
//! key→name bindings; names keep a cheap shared copy of their key purely for
//! display.

use std::fmt;
use std::sync::Arc;

use rustc_hash::FxHashMap;

use crate::ir::{Bitwidth, Type};

/// An interned variable name, equated and ordered by its factory index.
///
/// Two names compare equal if and only if they were produced by the same
/// factory from the same key. The original key text is retained only for
/// rendering; it never participates in equality, ordering, or hashing.
#[derive(Debug, Clone)]
pub struct VarName {
    text: Arc<str>,
    index: u64,
}

impl VarName {
    /// Returns the dense index assigned by the factory.
    #[must_use]
    pub const fn index(&self) -> u64 {
        self.index
    }

    /// Returns the key text this name was interned from.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }
}

impl PartialEq for VarName {
    fn eq(&self, other: &Self) -> bool {
        self.index == other.index
    }
}

impl Eq for VarName {}

impl PartialOrd for VarName {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for VarName {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.index.cmp(&other.index)
    }
}

impl std::hash::Hash for VarName {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.index.hash(state);
    }
}

impl fmt::Display for VarName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// Interning factory for [`VarName`]s.
///
/// The factory guarantees that looking up the same key twice yields names
/// with the same index, that distinct keys get distinct indices, and that
/// indices are assigned monotonically from a configurable start (1 by
/// default). Indices are only unique within one factory; factories do not
/// share index space, so variables from different factories must never be
/// mixed in one CFG.
///
/// # Examples
///
/// ```rust
/// use tapir::ir::VariableFactory;
///
/// let mut vars = VariableFactory::new();
/// let x = vars.lookup("x");
/// let y = vars.lookup("y");
/// assert_ne!(x, y);
/// assert_eq!(x, vars.lookup("x"));
/// assert_eq!(x.index(), 1);
/// ```
#[derive(Debug, Default)]
pub struct VariableFactory {
    next_id: u64,
    map: FxHashMap<Arc<str>, VarName>,
}

impl VariableFactory {
    /// Creates a factory whose first index is 1.
    #[must_use]
    pub fn new() -> Self {
        Self::with_start(1)
    }

    /// Creates a factory whose first index is `start_id`.
    ///
    /// Useful when a front end reserves a low index range for shadow
    /// variables of its own.
    #[must_use]
    pub fn with_start(start_id: u64) -> Self {
        Self {
            next_id: start_id,
            map: FxHashMap::default(),
        }
    }

    /// Interns `key`, returning the existing name if the key was seen before
    /// and a freshly indexed one otherwise.
    pub fn lookup(&mut self, key: &str) -> VarName {
        if let Some(name) = self.map.get(key) {
            return name.clone();
        }
        let text: Arc<str> = Arc::from(key);
        let name = VarName {
            text: Arc::clone(&text),
            index: self.next_id,
        };
        self.next_id += 1;
        self.map.insert(text, name.clone());
        name
    }

    /// Number of distinct keys interned so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Returns `true` if no key has been interned yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

/// A typed variable: an interned name paired with a ground type and, for
/// integers and booleans, a bit-width.
///
/// Variables have value semantics and structural equality. The bit-width of a
/// boolean is always 1 and the bit-width of an integer must be greater
/// than 1; both facts are established by the constructors and re-validated by
/// the type checker, which is where deliberately ill-formed variables (built
/// via [`Variable::new`]) are caught.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Variable {
    name: VarName,
    ty: Type,
    bits: Bitwidth,
}

impl Variable {
    /// Creates a variable with an explicit type tag and bit-width.
    ///
    /// The bit-width is only meaningful for `int` and `bool`; pass 0 for the
    /// other types. No validation happens here.
    #[must_use]
    pub const fn new(name: VarName, ty: Type, bits: Bitwidth) -> Self {
        Self { name, ty, bits }
    }

    /// Creates a boolean variable (bit-width 1).
    #[must_use]
    pub const fn boolean(name: VarName) -> Self {
        Self::new(name, Type::Bool, 1)
    }

    /// Creates an integer variable of the given bit-width.
    #[must_use]
    pub const fn int(name: VarName, bits: Bitwidth) -> Self {
        Self::new(name, Type::Int, bits)
    }

    /// Creates a real variable.
    #[must_use]
    pub const fn real(name: VarName) -> Self {
        Self::new(name, Type::Real, 0)
    }

    /// Creates a pointer variable.
    #[must_use]
    pub const fn pointer(name: VarName) -> Self {
        Self::new(name, Type::Ptr, 0)
    }

    /// Creates a reference variable.
    #[must_use]
    pub const fn reference(name: VarName) -> Self {
        Self::new(name, Type::Ref, 0)
    }

    /// Creates an array variable with the given element type.
    ///
    /// Returns `None` if `element` is itself an array type (arrays are
    /// uni-dimensional).
    #[must_use]
    pub fn array_of(name: VarName, element: Type) -> Option<Self> {
        let ty = match element {
            Type::Bool => Type::ArrBool,
            Type::Int => Type::ArrInt,
            Type::Real => Type::ArrReal,
            Type::Ptr => Type::ArrPtr,
            _ => return None,
        };
        Some(Self::new(name, ty, 0))
    }

    /// Returns the interned name.
    #[must_use]
    pub const fn name(&self) -> &VarName {
        &self.name
    }

    /// Returns the type tag.
    #[must_use]
    pub const fn ty(&self) -> Type {
        self.ty
    }

    /// Returns the bit-width (meaningful for `int` and `bool` only).
    #[must_use]
    pub const fn bitwidth(&self) -> Bitwidth {
        self.bits
    }
}

impl fmt::Display for Variable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.name, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_is_idempotent() {
        let mut vars = VariableFactory::new();
        let a = vars.lookup("a");
        let b = vars.lookup("a");
        assert_eq!(a, b);
        assert_eq!(a.index(), b.index());
        assert_eq!(vars.len(), 1);
    }

    #[test]
    fn test_indices_are_dense_from_start() {
        let mut vars = VariableFactory::with_start(10);
        assert_eq!(vars.lookup("a").index(), 10);
        assert_eq!(vars.lookup("b").index(), 11);
        assert_eq!(vars.lookup("c").index(), 12);
        // Re-lookups do not advance the counter.
        assert_eq!(vars.lookup("b").index(), 11);
        assert_eq!(vars.lookup("d").index(), 13);
    }

    #[test]
    fn test_distinct_keys_distinct_indices() {
        let mut vars = VariableFactory::new();
        let a = vars.lookup("a");
        let b = vars.lookup("b");
        assert_ne!(a, b);
        assert_ne!(a.index(), b.index());
    }

    #[test]
    fn test_equality_by_index_not_text() {
        // Two factories assign index 1 to different keys; the names compare
        // equal because equality is by index. Mixing factories is the
        // caller's bug, which is exactly why factories must not be shared.
        let mut f1 = VariableFactory::new();
        let mut f2 = VariableFactory::new();
        assert_eq!(f1.lookup("x"), f2.lookup("y"));
    }

    #[test]
    fn test_variable_constructors() {
        let mut vars = VariableFactory::new();
        let b = Variable::boolean(vars.lookup("b"));
        assert_eq!(b.ty(), Type::Bool);
        assert_eq!(b.bitwidth(), 1);

        let i = Variable::int(vars.lookup("i"), 32);
        assert_eq!(i.ty(), Type::Int);
        assert_eq!(i.bitwidth(), 32);

        let a = Variable::array_of(vars.lookup("a"), Type::Int).unwrap();
        assert_eq!(a.ty(), Type::ArrInt);
        assert!(Variable::array_of(vars.lookup("bad"), Type::ArrInt).is_none());
    }

    #[test]
    fn test_display_uses_key_text() {
        let mut vars = VariableFactory::new();
        let x = Variable::int(vars.lookup("x"), 8);
        assert_eq!(x.to_string(), "x");
    }
}
