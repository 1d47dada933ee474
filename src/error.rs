use thiserror::Error;

/// The generic Error type, which provides coverage for all errors this library can
/// potentially return.
///
/// Every failure in this crate is a front-end or analyzer bug rather than a
/// recoverable condition, so the taxonomy below maps one-to-one onto the ways a
/// caller can hand the IR layer ill-formed input. There are no retry or recovery
/// paths: callers are expected to propagate these errors up to a diagnostic sink
/// and abort the analysis of the offending function.
///
/// # Error Categories
///
/// ## Construction Errors
/// - [`Error::Malformed`] - Ill-formed statement payload or declaration
///
/// ## Lookup Errors
/// - [`Error::BlockNotFound`] - Basic block label not present in the CFG
/// - [`Error::NoExitBlock`] - Exit queried on a CFG that has none
/// - [`Error::ArgOutOfBounds`] - Indexed access past a parameter list
/// - [`Error::MissingFunctionDecl`] - Signature hash requested without a declaration
///
/// ## Type-Check Errors
/// - [`Error::TypeCheck`] - A statement violates the flat type lattice rules
#[derive(Error, Debug)]
pub enum Error {
    /// A statement or declaration was constructed from an ill-formed payload.
    ///
    /// Raised for structural violations caught at construction time, such as an
    /// `array_store` whose array operand does not have an array type, an array
    /// bound that is neither a constant nor a single variable, or a function
    /// declaration whose input and output parameter sets overlap.
    #[error("malformed - {0}")]
    Malformed(String),

    /// A basic block label was not found in the CFG.
    ///
    /// The label is rendered with the caller-supplied `Display` implementation.
    #[error("basic block {0} not found in the CFG")]
    BlockNotFound(String),

    /// The CFG has no exit block.
    ///
    /// Raised by `Cfg::exit` when no exit was declared, and by the reversed
    /// view, whose entry is the underlying exit.
    #[error("cfg does not have an exit block")]
    NoExitBlock,

    /// Out-of-bounds access to a callsite or function-declaration parameter.
    #[error("out-of-bound access to {kind} parameter {index}")]
    ArgOutOfBounds {
        /// Which parameter list was indexed ("callsite", "input", "output").
        kind: &'static str,
        /// The offending index.
        index: usize,
    },

    /// A CFG without a function declaration cannot be hashed or compared by
    /// signature.
    #[error("cannot hash a cfg because function declaration is missing")]
    MissingFunctionDecl,

    /// A statement violates the type lattice rules.
    ///
    /// The message embeds the rule wording and the rendered statement, e.g.
    /// `(type checking) operand cannot have different bitwidth from lhs in
    /// y = x+z`.
    #[error("(type checking) {0}")]
    TypeCheck(String),
}

/// `Result` alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;
