//! The flat type lattice and the operator vocabularies of the statement algebra.
//!
//! Types form a flat lattice: there is no subtyping between the ground types,
//! and arrays are opaque, uni-dimensional, and identified solely by their
//! element type. Only variables are typed; constants pick up their type from
//! the variables they appear together with.

use strum::Display;

/// Bit-width of an integer or boolean variable.
///
/// Booleans always have bit-width 1; integers must have bit-width > 1. Reals,
/// pointers, references, and arrays carry no bit-width.
pub type Bitwidth = u32;

/// Ground types of the flat lattice.
///
/// The four `Arr*` variants are the uni-dimensional array types, identified by
/// element type. They are useful for modelling C-like arrays and heap
/// abstractions.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Type {
    /// Boolean, bit-width 1.
    #[strum(serialize = "bool")]
    Bool,
    /// Machine integer, bit-width > 1.
    #[strum(serialize = "int")]
    Int,
    /// Mathematical real.
    #[strum(serialize = "real")]
    Real,
    /// C-like pointer.
    #[strum(serialize = "ptr")]
    Ptr,
    /// Opaque reference.
    #[strum(serialize = "ref")]
    Ref,
    /// Array of booleans.
    #[strum(serialize = "arr_bool")]
    ArrBool,
    /// Array of integers.
    #[strum(serialize = "arr_int")]
    ArrInt,
    /// Array of reals.
    #[strum(serialize = "arr_real")]
    ArrReal,
    /// Array of pointers.
    #[strum(serialize = "arr_ptr")]
    ArrPtr,
}

impl Type {
    /// Returns `true` for the four array types.
    #[must_use]
    pub const fn is_array(self) -> bool {
        matches!(self, Self::ArrBool | Self::ArrInt | Self::ArrReal | Self::ArrPtr)
    }

    /// Returns `true` for the numeric types (`int` and `real`).
    #[must_use]
    pub const fn is_numeric(self) -> bool {
        matches!(self, Self::Int | Self::Real)
    }

    /// Returns the element type of an array type, or `None` for scalars.
    #[must_use]
    pub const fn element(self) -> Option<Self> {
        match self {
            Self::ArrBool => Some(Self::Bool),
            Self::ArrInt => Some(Self::Int),
            Self::ArrReal => Some(Self::Real),
            Self::ArrPtr => Some(Self::Ptr),
            _ => None,
        }
    }
}

/// The analysis fidelity a front end declares when building a CFG.
///
/// The level is assigned to every block created through the CFG and gates the
/// pointer and array builder methods: a builder below the block's floor is a
/// silent no-op, so the same front-end code produces progressively smaller
/// CFGs at coarser precision without conditional branches at every call site.
///
/// The ordering `Num < Ptr < Arr` is load-bearing: pointer builders require
/// at least [`TrackedPrecision::Ptr`], array builders at least
/// [`TrackedPrecision::Arr`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TrackedPrecision {
    /// Numeric and boolean statements only.
    Num = 0,
    /// Numeric plus pointer statements.
    Ptr = 1,
    /// Numeric, pointer, and array statements.
    Arr = 2,
}

/// Binary operations over integers or reals.
///
/// Division and remainder come in signed and unsigned flavours; the bitwise
/// operations are only meaningful over integers but the distinction is left to
/// the type checker.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOperation {
    /// Addition.
    #[strum(serialize = "+")]
    Add,
    /// Subtraction.
    #[strum(serialize = "-")]
    Sub,
    /// Multiplication.
    #[strum(serialize = "*")]
    Mul,
    /// Signed division.
    #[strum(serialize = "/")]
    SDiv,
    /// Unsigned division.
    #[strum(serialize = "/u")]
    UDiv,
    /// Signed remainder.
    #[strum(serialize = "%")]
    SRem,
    /// Unsigned remainder.
    #[strum(serialize = "%u")]
    URem,
    /// Bitwise and.
    #[strum(serialize = "&")]
    And,
    /// Bitwise or.
    #[strum(serialize = "|")]
    Or,
    /// Bitwise xor.
    #[strum(serialize = "^")]
    Xor,
}

/// Binary operations over booleans.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BoolBinaryOperation {
    /// Conjunction.
    #[strum(serialize = "&")]
    And,
    /// Disjunction.
    #[strum(serialize = "|")]
    Or,
    /// Exclusive or.
    #[strum(serialize = "^")]
    Xor,
}

/// Integer cast operations.
///
/// Truncation narrows, sign- and zero-extension widen; the bit-width
/// constraints are enforced by the type checker.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CastOperation {
    /// Truncate to a narrower width.
    #[strum(serialize = "trunc")]
    Trunc,
    /// Sign-extend to a wider width.
    #[strum(serialize = "sext")]
    SExt,
    /// Zero-extend to a wider width.
    #[strum(serialize = "zext")]
    ZExt,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_precision_ordering() {
        assert!(TrackedPrecision::Num < TrackedPrecision::Ptr);
        assert!(TrackedPrecision::Ptr < TrackedPrecision::Arr);
    }

    #[test]
    fn test_array_elements() {
        assert_eq!(Type::ArrInt.element(), Some(Type::Int));
        assert_eq!(Type::ArrPtr.element(), Some(Type::Ptr));
        assert_eq!(Type::Int.element(), None);
        assert!(Type::ArrBool.is_array());
        assert!(!Type::Bool.is_array());
    }

    #[test]
    fn test_operator_rendering() {
        assert_eq!(BinaryOperation::Add.to_string(), "+");
        assert_eq!(BinaryOperation::UDiv.to_string(), "/u");
        assert_eq!(CastOperation::Trunc.to_string(), "trunc");
        assert_eq!(BoolBinaryOperation::Xor.to_string(), "^");
    }
}
