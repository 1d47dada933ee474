//! The statement algebra: every IR operation, with live-variable bookkeeping.
//!
//! Statements form a closed tagged sum (one variant per kind, stable integer
//! tags in [`StmtCode`]). Each statement computes its live set (disjoint
//! `uses` and `defs` sequences in insertion order) once at construction, so
//! dataflow passes never recompute it. Structural well-formedness (array
//! typing, number-or-variable operand restrictions) is checked by the
//! fallible constructors; deeper type agreement is the type checker's job.
//!
//! Consumers dispatch either by exhaustive `match` on [`StatementKind`] or
//! through the [`StatementVisitor`] contract, which mirrors the kind set:
//! one hook per kind, each defaulting to a no-op.

use std::fmt;

use crate::{
    ir::{
        BinaryOperation, BoolBinaryOperation, CastOperation, LinearConstraint, LinearExpression,
        PointerConstraint, Variable,
    },
    Error, Result,
};

/// Source location attributed by the front end.
///
/// Absent debug info uses the `-1` line/column sentinel, matching what
/// bitcode front ends emit for compiler-introduced statements.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DebugInfo {
    file: String,
    line: i32,
    col: i32,
}

impl DebugInfo {
    /// Creates debug info for a concrete source position.
    #[must_use]
    pub const fn new(file: String, line: i32, col: i32) -> Self {
        Self { file, line, col }
    }

    /// The source file.
    #[must_use]
    pub fn file(&self) -> &str {
        &self.file
    }

    /// The source line, `-1` when absent.
    #[must_use]
    pub const fn line(&self) -> i32 {
        self.line
    }

    /// The source column, `-1` when absent.
    #[must_use]
    pub const fn col(&self) -> i32 {
        self.col
    }

    /// Returns `true` if a real source position is attached.
    #[must_use]
    pub fn has_debug(&self) -> bool {
        !self.file.is_empty() && self.line >= 0 && self.col >= 0
    }
}

impl Default for DebugInfo {
    fn default() -> Self {
        Self {
            file: String::new(),
            line: -1,
            col: -1,
        }
    }
}

impl fmt::Display for DebugInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "File  : {}", self.file)?;
        writeln!(f, "Line  : {}", self.line)?;
        writeln!(f, "Column: {}", self.col)
    }
}

/// The live set of a statement: variables it uses and variables it defines.
///
/// Both sequences preserve first-insertion order and suppress duplicates.
/// The two sequences are disjoint by construction of each statement kind.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Live {
    uses: Vec<Variable>,
    defs: Vec<Variable>,
}

impl Live {
    fn add(set: &mut Vec<Variable>, v: Variable) {
        if !set.contains(&v) {
            set.push(v);
        }
    }

    /// Records a used variable.
    pub fn add_use(&mut self, v: Variable) {
        Self::add(&mut self.uses, v);
    }

    /// Records a defined variable.
    pub fn add_def(&mut self, v: Variable) {
        Self::add(&mut self.defs, v);
    }

    /// Used variables in first-insertion order.
    #[must_use]
    pub fn uses(&self) -> &[Variable] {
        &self.uses
    }

    /// Defined variables in first-insertion order.
    #[must_use]
    pub fn defs(&self) -> &[Variable] {
        &self.defs
    }
}

impl fmt::Display for Live {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Use={")?;
        for (i, v) in self.uses.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{v}")?;
        }
        f.write_str("} Def={")?;
        for (i, v) in self.defs.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{v}")?;
        }
        f.write_str("}")
    }
}

/// Stable integer tags for the statement kinds.
///
/// Front ends and visitors may switch on these values; they are part of the
/// external contract and will not be renumbered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
#[allow(missing_docs)]
pub enum StmtCode {
    Undef = 0,
    // numerical
    BinOp = 20,
    Assign = 21,
    Assume = 22,
    Unreach = 23,
    Select = 24,
    Assert = 25,
    // arrays
    ArrInit = 30,
    ArrAssume = 31,
    ArrStore = 32,
    ArrLoad = 33,
    ArrAssign = 34,
    // pointers
    PtrLoad = 40,
    PtrStore = 41,
    PtrAssign = 42,
    PtrObject = 43,
    PtrFunction = 44,
    PtrNull = 45,
    PtrAssume = 46,
    PtrAssert = 47,
    // function calls
    Callsite = 50,
    Return = 51,
    // integers/arrays/pointers/booleans
    Havoc = 60,
    // booleans
    BoolBinOp = 70,
    BoolAssignCst = 71,
    BoolAssignVar = 72,
    BoolAssume = 73,
    BoolSelect = 74,
    BoolAssert = 75,
    // casts
    IntCast = 80,
}

/// `lhs = left op right` over integers or reals.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BinOp {
    /// Defined variable.
    pub lhs: Variable,
    /// The arithmetic or bitwise operation.
    pub op: BinaryOperation,
    /// First operand.
    pub left: LinearExpression,
    /// Second operand.
    pub right: LinearExpression,
}

/// `lhs = rhs` for a linear expression `rhs`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assign {
    /// Defined variable.
    pub lhs: Variable,
    /// Assigned expression.
    pub rhs: LinearExpression,
}

/// Refine the abstract state with a linear constraint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assume {
    /// The assumed constraint.
    pub constraint: LinearConstraint,
}

/// Check a linear constraint, reporting a violation to the analyzer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assert {
    /// The asserted constraint.
    pub constraint: LinearConstraint,
}

/// `lhs = ite(cond, left, right)`.
///
/// A select is not strictly needed (it can be simulated by splitting
/// blocks), but LLVM-like front ends generate many of them, so supporting
/// it natively avoids a blow-up in CFG size.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Select {
    /// Defined variable.
    pub lhs: Variable,
    /// Branch condition.
    pub cond: LinearConstraint,
    /// Value when the condition holds.
    pub left: LinearExpression,
    /// Value otherwise.
    pub right: LinearExpression,
}

/// Control never reaches this point.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Unreachable;

/// Forget everything about `lhs`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Havoc {
    /// The havocked variable.
    pub lhs: Variable,
}

/// `dst = op src` integer cast.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntCast {
    /// Truncation or extension.
    pub op: CastOperation,
    /// Source variable.
    pub src: Variable,
    /// Destination variable.
    pub dst: Variable,
}

/// Initialize all array elements in a range to a value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArrayInit {
    /// The array variable.
    pub array: Variable,
    /// Element size in bytes.
    pub elem_size: u64,
    /// Lower bound index (constant or single variable).
    pub lb: LinearExpression,
    /// Upper bound index (constant or single variable).
    pub ub: LinearExpression,
    /// The initial value (constant or single variable).
    pub value: LinearExpression,
}

/// Assume all array elements in a range equal a value:
/// `forall i in [lb,ub] % elem_size. array[i] = value`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArrayAssume {
    /// The array variable.
    pub array: Variable,
    /// Element size in bytes.
    pub elem_size: u64,
    /// Lower bound index (constant or single variable).
    pub lb: LinearExpression,
    /// Upper bound index (constant or single variable).
    pub ub: LinearExpression,
    /// The assumed value (constant or single variable).
    pub value: LinearExpression,
}

/// `array[index] = value`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArrayStore {
    /// The array variable.
    pub array: Variable,
    /// Store index.
    pub index: LinearExpression,
    /// Stored value (constant or single variable).
    pub value: LinearExpression,
    /// Element size in bytes.
    pub elem_size: u64,
    /// Whether the store writes a singleton cell; `false` when unknown.
    pub is_singleton: bool,
}

/// `lhs = array[index]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArrayLoad {
    /// Defined variable.
    pub lhs: Variable,
    /// The array variable.
    pub array: Variable,
    /// Load index.
    pub index: LinearExpression,
    /// Element size in bytes.
    pub elem_size: u64,
}

/// Whole-array assignment `lhs = rhs`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArrayAssign {
    /// Destination array.
    pub lhs: Variable,
    /// Source array.
    pub rhs: Variable,
}

/// `lhs = *(rhs)`.
///
/// Note that `lhs` appears in the *uses* of this statement, not the defs:
/// the loaded value refines both sides, and dataflow consumers depend on
/// that exact classification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PtrLoad {
    /// Result pointer.
    pub lhs: Variable,
    /// Dereferenced pointer.
    pub rhs: Variable,
}

/// `*(lhs) = rhs`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PtrStore {
    /// Pointer stored through.
    pub lhs: Variable,
    /// Stored pointer.
    pub rhs: Variable,
}

/// `lhs = &(rhs) + offset`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PtrAssign {
    /// Defined pointer.
    pub lhs: Variable,
    /// Base pointer.
    pub rhs: Variable,
    /// Byte offset.
    pub offset: LinearExpression,
}

/// `lhs = &(address)` for a fresh memory object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PtrObject {
    /// Defined pointer.
    pub lhs: Variable,
    /// Identifier of the pointed-to object.
    pub address: u64,
}

/// `lhs = &(func)` for a function pointer. Function names are unique.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PtrFunction {
    /// Defined pointer.
    pub lhs: Variable,
    /// The function name.
    pub func: String,
}

/// `lhs = NULL`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PtrNull {
    /// Defined pointer.
    pub lhs: Variable,
}

/// Refine the abstract state with a pointer constraint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PtrAssume {
    /// The assumed constraint.
    pub constraint: PointerConstraint,
}

/// Check a pointer constraint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PtrAssert {
    /// The asserted constraint.
    pub constraint: PointerConstraint,
}

/// `(lhs...) = call func(args...)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Callsite {
    func: String,
    lhs: Vec<Variable>,
    args: Vec<Variable>,
}

impl Callsite {
    /// The callee name.
    #[must_use]
    pub fn func_name(&self) -> &str {
        &self.func
    }

    /// The result variables (possibly empty).
    #[must_use]
    pub fn lhs(&self) -> &[Variable] {
        &self.lhs
    }

    /// The argument variables.
    #[must_use]
    pub fn args(&self) -> &[Variable] {
        &self.args
    }

    /// Number of arguments.
    #[must_use]
    pub fn num_args(&self) -> usize {
        self.args.len()
    }

    /// The `idx`-th argument.
    ///
    /// # Errors
    ///
    /// [`Error::ArgOutOfBounds`] when `idx` is past the argument list.
    pub fn arg(&self, idx: usize) -> Result<&Variable> {
        self.args.get(idx).ok_or(Error::ArgOutOfBounds {
            kind: "callsite",
            index: idx,
        })
    }
}

/// `return v1, ..., vn` (possibly empty).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Return {
    /// Returned variables.
    pub vars: Vec<Variable>,
}

/// `lhs = left op right` over booleans.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoolBinOp {
    /// Defined boolean.
    pub lhs: Variable,
    /// The boolean operation.
    pub op: BoolBinaryOperation,
    /// First operand.
    pub left: Variable,
    /// Second operand.
    pub right: Variable,
}

/// `lhs = (constraint)` reifying a linear constraint into a boolean.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoolAssignCst {
    /// Defined boolean.
    pub lhs: Variable,
    /// The reified constraint.
    pub rhs: LinearConstraint,
}

/// `lhs = rhs` or `lhs = not(rhs)` between booleans.
///
/// Assigning one boolean to another could be simulated with a binary op
/// (`b1 := b2 or false`) but is common enough to deserve its own kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoolAssignVar {
    /// Defined boolean.
    pub lhs: Variable,
    /// Source boolean.
    pub rhs: Variable,
    /// When `true`, the assignment negates `rhs`.
    pub negated: bool,
}

/// `assume(var)` or `assume(not(var))` for a boolean variable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoolAssume {
    /// The assumed boolean.
    pub var: Variable,
    /// When `true`, the negation is assumed.
    pub negated: bool,
}

/// `assert(var)` for a boolean variable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoolAssert {
    /// The asserted boolean.
    pub var: Variable,
}

/// `lhs = ite(cond, left, right)` over booleans.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoolSelect {
    /// Defined boolean.
    pub lhs: Variable,
    /// Branch condition.
    pub cond: Variable,
    /// Value when the condition holds.
    pub left: Variable,
    /// Value otherwise.
    pub right: Variable,
}

/// The closed sum of statement payloads.
///
/// The kind set is fixed by the [`StmtCode`] enumeration; downstream crates
/// dispatch by exhaustive matching or through [`StatementVisitor`].
#[derive(Debug, Clone, PartialEq, Eq)]
#[allow(missing_docs)]
pub enum StatementKind {
    BinOp(BinOp),
    Assign(Assign),
    Assume(Assume),
    Assert(Assert),
    Select(Select),
    Unreachable(Unreachable),
    Havoc(Havoc),
    IntCast(IntCast),
    ArrayInit(ArrayInit),
    ArrayAssume(ArrayAssume),
    ArrayStore(ArrayStore),
    ArrayLoad(ArrayLoad),
    ArrayAssign(ArrayAssign),
    PtrLoad(PtrLoad),
    PtrStore(PtrStore),
    PtrAssign(PtrAssign),
    PtrObject(PtrObject),
    PtrFunction(PtrFunction),
    PtrNull(PtrNull),
    PtrAssume(PtrAssume),
    PtrAssert(PtrAssert),
    Callsite(Callsite),
    Return(Return),
    BoolBinOp(BoolBinOp),
    BoolAssignCst(BoolAssignCst),
    BoolAssignVar(BoolAssignVar),
    BoolAssume(BoolAssume),
    BoolAssert(BoolAssert),
    BoolSelect(BoolSelect),
}

/// A statement: a kind-specific payload plus the live set and optional
/// debug info every statement carries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Statement {
    kind: StatementKind,
    live: Live,
    debug_info: DebugInfo,
}

impl Statement {
    fn with_live(kind: StatementKind, live: Live, debug_info: DebugInfo) -> Self {
        Self {
            kind,
            live,
            debug_info,
        }
    }

    /// `lhs = left op right`.
    pub fn bin_op(
        lhs: Variable,
        op: BinaryOperation,
        left: LinearExpression,
        right: LinearExpression,
        debug_info: DebugInfo,
    ) -> Self {
        let mut live = Live::default();
        live.add_def(lhs.clone());
        for v in left.variables().chain(right.variables()) {
            live.add_use(v.clone());
        }
        Self::with_live(
            StatementKind::BinOp(BinOp {
                lhs,
                op,
                left,
                right,
            }),
            live,
            debug_info,
        )
    }

    /// `lhs = rhs`.
    pub fn assign(lhs: Variable, rhs: LinearExpression) -> Self {
        let mut live = Live::default();
        live.add_def(lhs.clone());
        for v in rhs.variables() {
            live.add_use(v.clone());
        }
        Self::with_live(
            StatementKind::Assign(Assign { lhs, rhs }),
            live,
            DebugInfo::default(),
        )
    }

    /// `assume(constraint)`.
    pub fn assume(constraint: LinearConstraint) -> Self {
        let mut live = Live::default();
        for v in constraint.variables() {
            live.add_use(v.clone());
        }
        Self::with_live(
            StatementKind::Assume(Assume { constraint }),
            live,
            DebugInfo::default(),
        )
    }

    /// `assert(constraint)`.
    pub fn assertion(constraint: LinearConstraint, debug_info: DebugInfo) -> Self {
        let mut live = Live::default();
        for v in constraint.variables() {
            live.add_use(v.clone());
        }
        Self::with_live(StatementKind::Assert(Assert { constraint }), live, debug_info)
    }

    /// `lhs = ite(cond, left, right)`.
    pub fn select(
        lhs: Variable,
        cond: LinearConstraint,
        left: LinearExpression,
        right: LinearExpression,
    ) -> Self {
        let mut live = Live::default();
        live.add_def(lhs.clone());
        for v in cond
            .variables()
            .chain(left.variables())
            .chain(right.variables())
        {
            live.add_use(v.clone());
        }
        Self::with_live(
            StatementKind::Select(Select {
                lhs,
                cond,
                left,
                right,
            }),
            live,
            DebugInfo::default(),
        )
    }

    /// `unreachable`.
    #[must_use]
    pub fn unreachable() -> Self {
        Self::with_live(
            StatementKind::Unreachable(Unreachable),
            Live::default(),
            DebugInfo::default(),
        )
    }

    /// `lhs =*`.
    pub fn havoc(lhs: Variable) -> Self {
        let mut live = Live::default();
        live.add_def(lhs.clone());
        Self::with_live(StatementKind::Havoc(Havoc { lhs }), live, DebugInfo::default())
    }

    /// `dst = op src`.
    pub fn int_cast(
        op: CastOperation,
        src: Variable,
        dst: Variable,
        debug_info: DebugInfo,
    ) -> Self {
        let mut live = Live::default();
        live.add_use(src.clone());
        live.add_def(dst.clone());
        Self::with_live(
            StatementKind::IntCast(IntCast { op, src, dst }),
            live,
            debug_info,
        )
    }

    fn array_range_live(
        array: &Variable,
        lb: &LinearExpression,
        ub: &LinearExpression,
        value: &LinearExpression,
    ) -> Live {
        let mut live = Live::default();
        live.add_use(array.clone());
        for v in lb.variables().chain(ub.variables()).chain(value.variables()) {
            live.add_use(v.clone());
        }
        live
    }

    fn check_array_typed(array: &Variable, what: &str) -> Result<()> {
        if array.ty().is_array() {
            Ok(())
        } else {
            Err(Error::Malformed(format!("{what} must have array type")))
        }
    }

    fn check_number_or_variable(e: &LinearExpression, what: &str) -> Result<()> {
        if e.is_number_or_variable() {
            Ok(())
        } else {
            Err(Error::Malformed(format!(
                "{what} can only be number or variable"
            )))
        }
    }

    /// `array_init(array, [lb,ub] % elem_size, value)`.
    ///
    /// # Errors
    ///
    /// [`Error::Malformed`] if `array` is not array-typed or any of `lb`,
    /// `ub`, `value` is neither a constant nor a single variable.
    pub fn array_init(
        array: Variable,
        elem_size: u64,
        lb: LinearExpression,
        ub: LinearExpression,
        value: LinearExpression,
    ) -> Result<Self> {
        Self::check_array_typed(&array, "array_init")?;
        Self::check_number_or_variable(&lb, "array_init lower bound")?;
        Self::check_number_or_variable(&ub, "array_init upper bound")?;
        Self::check_number_or_variable(&value, "array_init value")?;
        let live = Self::array_range_live(&array, &lb, &ub, &value);
        Ok(Self::with_live(
            StatementKind::ArrayInit(ArrayInit {
                array,
                elem_size,
                lb,
                ub,
                value,
            }),
            live,
            DebugInfo::default(),
        ))
    }

    /// `assume(forall l in [lb,ub] % elem_size :: array[l] = value)`.
    ///
    /// # Errors
    ///
    /// [`Error::Malformed`] if `array` is not array-typed or any of `lb`,
    /// `ub`, `value` is neither a constant nor a single variable.
    pub fn array_assume(
        array: Variable,
        elem_size: u64,
        lb: LinearExpression,
        ub: LinearExpression,
        value: LinearExpression,
    ) -> Result<Self> {
        Self::check_array_typed(&array, "array_assume")?;
        Self::check_number_or_variable(&lb, "array_assume lower bound")?;
        Self::check_number_or_variable(&ub, "array_assume upper bound")?;
        Self::check_number_or_variable(&value, "array_assume value")?;
        let live = Self::array_range_live(&array, &lb, &ub, &value);
        Ok(Self::with_live(
            StatementKind::ArrayAssume(ArrayAssume {
                array,
                elem_size,
                lb,
                ub,
                value,
            }),
            live,
            DebugInfo::default(),
        ))
    }

    /// `array_store(array, index, value)`.
    ///
    /// # Errors
    ///
    /// [`Error::Malformed`] if `array` is not array-typed or `value` is
    /// neither a constant nor a single variable.
    pub fn array_store(
        array: Variable,
        index: LinearExpression,
        value: LinearExpression,
        elem_size: u64,
        is_singleton: bool,
    ) -> Result<Self> {
        Self::check_array_typed(&array, "array_store")?;
        Self::check_number_or_variable(&value, "array_store value")?;
        let mut live = Live::default();
        live.add_use(array.clone());
        for v in index.variables().chain(value.variables()) {
            live.add_use(v.clone());
        }
        Ok(Self::with_live(
            StatementKind::ArrayStore(ArrayStore {
                array,
                index,
                value,
                elem_size,
                is_singleton,
            }),
            live,
            DebugInfo::default(),
        ))
    }

    /// `lhs = array_load(array, index)`.
    ///
    /// # Errors
    ///
    /// [`Error::Malformed`] if `array` is not array-typed.
    pub fn array_load(
        lhs: Variable,
        array: Variable,
        index: LinearExpression,
        elem_size: u64,
    ) -> Result<Self> {
        Self::check_array_typed(&array, "array_load")?;
        let mut live = Live::default();
        live.add_def(lhs.clone());
        live.add_use(array.clone());
        for v in index.variables() {
            live.add_use(v.clone());
        }
        Ok(Self::with_live(
            StatementKind::ArrayLoad(ArrayLoad {
                lhs,
                array,
                index,
                elem_size,
            }),
            live,
            DebugInfo::default(),
        ))
    }

    /// Whole-array `lhs = rhs`.
    ///
    /// # Errors
    ///
    /// [`Error::Malformed`] if either side is not array-typed or the element
    /// types differ.
    pub fn array_assign(lhs: Variable, rhs: Variable) -> Result<Self> {
        if !lhs.ty().is_array() || lhs.ty() != rhs.ty() {
            return Err(Error::Malformed(
                "array_assign must have matching array types".to_string(),
            ));
        }
        let mut live = Live::default();
        live.add_def(lhs.clone());
        live.add_use(rhs.clone());
        Ok(Self::with_live(
            StatementKind::ArrayAssign(ArrayAssign { lhs, rhs }),
            live,
            DebugInfo::default(),
        ))
    }

    /// `lhs = *(rhs)`.
    ///
    /// Both operands land in the *uses* set; see [`PtrLoad`].
    pub fn ptr_load(lhs: Variable, rhs: Variable, debug_info: DebugInfo) -> Self {
        let mut live = Live::default();
        live.add_use(lhs.clone());
        live.add_use(rhs.clone());
        Self::with_live(StatementKind::PtrLoad(PtrLoad { lhs, rhs }), live, debug_info)
    }

    /// `*(lhs) = rhs`.
    pub fn ptr_store(lhs: Variable, rhs: Variable, debug_info: DebugInfo) -> Self {
        let mut live = Live::default();
        live.add_use(lhs.clone());
        live.add_use(rhs.clone());
        Self::with_live(StatementKind::PtrStore(PtrStore { lhs, rhs }), live, debug_info)
    }

    /// `lhs = &(rhs) + offset`.
    pub fn ptr_assign(lhs: Variable, rhs: Variable, offset: LinearExpression) -> Self {
        let mut live = Live::default();
        live.add_def(lhs.clone());
        live.add_use(rhs.clone());
        Self::with_live(
            StatementKind::PtrAssign(PtrAssign { lhs, rhs, offset }),
            live,
            DebugInfo::default(),
        )
    }

    /// `lhs = &(address)`.
    pub fn ptr_object(lhs: Variable, address: u64) -> Self {
        let mut live = Live::default();
        live.add_def(lhs.clone());
        Self::with_live(
            StatementKind::PtrObject(PtrObject { lhs, address }),
            live,
            DebugInfo::default(),
        )
    }

    /// `lhs = &(func)`.
    pub fn ptr_function(lhs: Variable, func: String) -> Self {
        let mut live = Live::default();
        live.add_def(lhs.clone());
        Self::with_live(
            StatementKind::PtrFunction(PtrFunction { lhs, func }),
            live,
            DebugInfo::default(),
        )
    }

    /// `lhs = NULL`.
    pub fn ptr_null(lhs: Variable) -> Self {
        let mut live = Live::default();
        live.add_def(lhs.clone());
        Self::with_live(
            StatementKind::PtrNull(PtrNull { lhs }),
            live,
            DebugInfo::default(),
        )
    }

    fn ptr_constraint_live(constraint: &PointerConstraint) -> Live {
        let mut live = Live::default();
        if !constraint.is_tautology() && !constraint.is_contradiction() {
            for v in constraint.variables() {
                live.add_use(v.clone());
            }
        }
        live
    }

    /// `assume_ptr(constraint)`.
    pub fn ptr_assume(constraint: PointerConstraint) -> Self {
        let live = Self::ptr_constraint_live(&constraint);
        Self::with_live(
            StatementKind::PtrAssume(PtrAssume { constraint }),
            live,
            DebugInfo::default(),
        )
    }

    /// `assert_ptr(constraint)`.
    pub fn ptr_assertion(constraint: PointerConstraint, debug_info: DebugInfo) -> Self {
        let live = Self::ptr_constraint_live(&constraint);
        Self::with_live(
            StatementKind::PtrAssert(PtrAssert { constraint }),
            live,
            debug_info,
        )
    }

    /// `(lhs...) = call func(args...)`.
    pub fn callsite(func: String, lhs: Vec<Variable>, args: Vec<Variable>) -> Self {
        let mut live = Live::default();
        for a in &args {
            live.add_use(a.clone());
        }
        for l in &lhs {
            live.add_def(l.clone());
        }
        Self::with_live(
            StatementKind::Callsite(Callsite { func, lhs, args }),
            live,
            DebugInfo::default(),
        )
    }

    /// `return vars...`.
    pub fn ret(vars: Vec<Variable>) -> Self {
        let mut live = Live::default();
        for v in &vars {
            live.add_use(v.clone());
        }
        Self::with_live(
            StatementKind::Return(Return { vars }),
            live,
            DebugInfo::default(),
        )
    }

    /// `lhs = left op right` over booleans.
    pub fn bool_bin_op(
        lhs: Variable,
        op: BoolBinaryOperation,
        left: Variable,
        right: Variable,
        debug_info: DebugInfo,
    ) -> Self {
        let mut live = Live::default();
        live.add_def(lhs.clone());
        live.add_use(left.clone());
        live.add_use(right.clone());
        Self::with_live(
            StatementKind::BoolBinOp(BoolBinOp {
                lhs,
                op,
                left,
                right,
            }),
            live,
            debug_info,
        )
    }

    /// `lhs = (rhs)` reifying a linear constraint.
    pub fn bool_assign_cst(lhs: Variable, rhs: LinearConstraint) -> Self {
        let mut live = Live::default();
        live.add_def(lhs.clone());
        for v in rhs.variables() {
            live.add_use(v.clone());
        }
        Self::with_live(
            StatementKind::BoolAssignCst(BoolAssignCst { lhs, rhs }),
            live,
            DebugInfo::default(),
        )
    }

    /// `lhs = rhs` or `lhs = not(rhs)`.
    pub fn bool_assign_var(lhs: Variable, rhs: Variable, negated: bool) -> Self {
        let mut live = Live::default();
        live.add_def(lhs.clone());
        live.add_use(rhs.clone());
        Self::with_live(
            StatementKind::BoolAssignVar(BoolAssignVar { lhs, rhs, negated }),
            live,
            DebugInfo::default(),
        )
    }

    /// `assume(var)` or `assume(not(var))`.
    pub fn bool_assume(var: Variable, negated: bool) -> Self {
        let mut live = Live::default();
        live.add_use(var.clone());
        Self::with_live(
            StatementKind::BoolAssume(BoolAssume { var, negated }),
            live,
            DebugInfo::default(),
        )
    }

    /// `assert(var)`.
    pub fn bool_assert(var: Variable, debug_info: DebugInfo) -> Self {
        let mut live = Live::default();
        live.add_use(var.clone());
        Self::with_live(StatementKind::BoolAssert(BoolAssert { var }), live, debug_info)
    }

    /// `lhs = ite(cond, left, right)` over booleans.
    pub fn bool_select(lhs: Variable, cond: Variable, left: Variable, right: Variable) -> Self {
        let mut live = Live::default();
        live.add_def(lhs.clone());
        live.add_use(cond.clone());
        live.add_use(left.clone());
        live.add_use(right.clone());
        Self::with_live(
            StatementKind::BoolSelect(BoolSelect {
                lhs,
                cond,
                left,
                right,
            }),
            live,
            DebugInfo::default(),
        )
    }

    /// The kind-specific payload.
    #[must_use]
    pub const fn kind(&self) -> &StatementKind {
        &self.kind
    }

    /// The stable integer tag of this statement's kind.
    #[must_use]
    pub const fn code(&self) -> StmtCode {
        match &self.kind {
            StatementKind::BinOp(_) => StmtCode::BinOp,
            StatementKind::Assign(_) => StmtCode::Assign,
            StatementKind::Assume(_) => StmtCode::Assume,
            StatementKind::Assert(_) => StmtCode::Assert,
            StatementKind::Select(_) => StmtCode::Select,
            StatementKind::Unreachable(_) => StmtCode::Unreach,
            StatementKind::Havoc(_) => StmtCode::Havoc,
            StatementKind::IntCast(_) => StmtCode::IntCast,
            StatementKind::ArrayInit(_) => StmtCode::ArrInit,
            StatementKind::ArrayAssume(_) => StmtCode::ArrAssume,
            StatementKind::ArrayStore(_) => StmtCode::ArrStore,
            StatementKind::ArrayLoad(_) => StmtCode::ArrLoad,
            StatementKind::ArrayAssign(_) => StmtCode::ArrAssign,
            StatementKind::PtrLoad(_) => StmtCode::PtrLoad,
            StatementKind::PtrStore(_) => StmtCode::PtrStore,
            StatementKind::PtrAssign(_) => StmtCode::PtrAssign,
            StatementKind::PtrObject(_) => StmtCode::PtrObject,
            StatementKind::PtrFunction(_) => StmtCode::PtrFunction,
            StatementKind::PtrNull(_) => StmtCode::PtrNull,
            StatementKind::PtrAssume(_) => StmtCode::PtrAssume,
            StatementKind::PtrAssert(_) => StmtCode::PtrAssert,
            StatementKind::Callsite(_) => StmtCode::Callsite,
            StatementKind::Return(_) => StmtCode::Return,
            StatementKind::BoolBinOp(_) => StmtCode::BoolBinOp,
            StatementKind::BoolAssignCst(_) => StmtCode::BoolAssignCst,
            StatementKind::BoolAssignVar(_) => StmtCode::BoolAssignVar,
            StatementKind::BoolAssume(_) => StmtCode::BoolAssume,
            StatementKind::BoolAssert(_) => StmtCode::BoolAssert,
            StatementKind::BoolSelect(_) => StmtCode::BoolSelect,
        }
    }

    /// The live set computed at construction.
    #[must_use]
    pub const fn live(&self) -> &Live {
        &self.live
    }

    /// The attributed source location, if any.
    #[must_use]
    pub const fn debug_info(&self) -> &DebugInfo {
        &self.debug_info
    }

    /// Returns `true` for numeric binary operations.
    #[must_use]
    pub const fn is_bin_op(&self) -> bool {
        matches!(self.kind, StatementKind::BinOp(_))
    }

    /// Returns `true` for numeric assignments.
    #[must_use]
    pub const fn is_assign(&self) -> bool {
        matches!(self.kind, StatementKind::Assign(_))
    }

    /// Returns `true` for numeric `assume` statements.
    #[must_use]
    pub const fn is_assume(&self) -> bool {
        matches!(self.kind, StatementKind::Assume(_))
    }

    /// Returns `true` for numeric selects.
    #[must_use]
    pub const fn is_select(&self) -> bool {
        matches!(self.kind, StatementKind::Select(_))
    }

    /// Returns `true` for havocs.
    #[must_use]
    pub const fn is_havoc(&self) -> bool {
        matches!(self.kind, StatementKind::Havoc(_))
    }

    /// Returns `true` for `unreachable`.
    #[must_use]
    pub const fn is_unreachable(&self) -> bool {
        matches!(self.kind, StatementKind::Unreachable(_))
    }

    /// Returns `true` for pointer loads.
    #[must_use]
    pub const fn is_ptr_load(&self) -> bool {
        matches!(self.kind, StatementKind::PtrLoad(_))
    }

    /// Returns `true` for pointer stores.
    #[must_use]
    pub const fn is_ptr_store(&self) -> bool {
        matches!(self.kind, StatementKind::PtrStore(_))
    }

    /// Returns `true` for array stores.
    #[must_use]
    pub const fn is_array_store(&self) -> bool {
        matches!(self.kind, StatementKind::ArrayStore(_))
    }

    /// Returns `true` for whole-array assignments.
    #[must_use]
    pub const fn is_array_assign(&self) -> bool {
        matches!(self.kind, StatementKind::ArrayAssign(_))
    }

    /// Returns `true` for boolean `assume` statements.
    #[must_use]
    pub const fn is_bool_assume(&self) -> bool {
        matches!(self.kind, StatementKind::BoolAssume(_))
    }

    /// Returns `true` for array loads.
    #[must_use]
    pub const fn is_array_load(&self) -> bool {
        matches!(self.kind, StatementKind::ArrayLoad(_))
    }

    /// Returns `true` for numeric or pointer or boolean asserts.
    #[must_use]
    pub const fn is_assert(&self) -> bool {
        matches!(
            self.kind,
            StatementKind::Assert(_) | StatementKind::PtrAssert(_) | StatementKind::BoolAssert(_)
        )
    }

    /// Returns `true` for returns.
    #[must_use]
    pub const fn is_return(&self) -> bool {
        matches!(self.kind, StatementKind::Return(_))
    }

    /// Returns `true` for callsites.
    #[must_use]
    pub const fn is_callsite(&self) -> bool {
        matches!(self.kind, StatementKind::Callsite(_))
    }

    /// Returns `true` for integer casts.
    #[must_use]
    pub const fn is_int_cast(&self) -> bool {
        matches!(self.kind, StatementKind::IntCast(_))
    }

    /// Dispatches to the visitor hook matching this statement's kind.
    pub fn accept<V: StatementVisitor + ?Sized>(&self, v: &mut V) {
        match &self.kind {
            StatementKind::BinOp(s) => v.visit_bin_op(s),
            StatementKind::Assign(s) => v.visit_assign(s),
            StatementKind::Assume(s) => v.visit_assume(s),
            StatementKind::Assert(s) => v.visit_assert(s),
            StatementKind::Select(s) => v.visit_select(s),
            StatementKind::Unreachable(s) => v.visit_unreachable(s),
            StatementKind::Havoc(s) => v.visit_havoc(s),
            StatementKind::IntCast(s) => v.visit_int_cast(s),
            StatementKind::ArrayInit(s) => v.visit_array_init(s),
            StatementKind::ArrayAssume(s) => v.visit_array_assume(s),
            StatementKind::ArrayStore(s) => v.visit_array_store(s),
            StatementKind::ArrayLoad(s) => v.visit_array_load(s),
            StatementKind::ArrayAssign(s) => v.visit_array_assign(s),
            StatementKind::PtrLoad(s) => v.visit_ptr_load(s),
            StatementKind::PtrStore(s) => v.visit_ptr_store(s),
            StatementKind::PtrAssign(s) => v.visit_ptr_assign(s),
            StatementKind::PtrObject(s) => v.visit_ptr_object(s),
            StatementKind::PtrFunction(s) => v.visit_ptr_function(s),
            StatementKind::PtrNull(s) => v.visit_ptr_null(s),
            StatementKind::PtrAssume(s) => v.visit_ptr_assume(s),
            StatementKind::PtrAssert(s) => v.visit_ptr_assert(s),
            StatementKind::Callsite(s) => v.visit_callsite(s),
            StatementKind::Return(s) => v.visit_return(s),
            StatementKind::BoolBinOp(s) => v.visit_bool_bin_op(s),
            StatementKind::BoolAssignCst(s) => v.visit_bool_assign_cst(s),
            StatementKind::BoolAssignVar(s) => v.visit_bool_assign_var(s),
            StatementKind::BoolAssume(s) => v.visit_bool_assume(s),
            StatementKind::BoolAssert(s) => v.visit_bool_assert(s),
            StatementKind::BoolSelect(s) => v.visit_bool_select(s),
        }
    }
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            StatementKind::BinOp(s) => write!(f, "{} = {}{}{}", s.lhs, s.left, s.op, s.right),
            StatementKind::Assign(s) => write!(f, "{} = {}", s.lhs, s.rhs),
            StatementKind::Assume(s) => write!(f, "assume({})", s.constraint),
            StatementKind::Assert(s) => write!(f, "assert({})", s.constraint),
            StatementKind::Select(s) => {
                write!(f, "{} = ite({}, {}, {})", s.lhs, s.cond, s.left, s.right)
            }
            StatementKind::Unreachable(_) => f.write_str("unreachable"),
            StatementKind::Havoc(s) => write!(f, "{} =*", s.lhs),
            StatementKind::IntCast(s) => write!(
                f,
                "{} = {} {}:{} to {}:{}",
                s.dst,
                s.op,
                s.src,
                s.src.bitwidth(),
                s.dst,
                s.dst.bitwidth()
            ),
            StatementKind::ArrayInit(s) => write!(
                f,
                "array_init({}, [{},{}] % {}, {})",
                s.array, s.lb, s.ub, s.elem_size, s.value
            ),
            StatementKind::ArrayAssume(s) => write!(
                f,
                "assume(forall l in [{},{}] % {} :: {}[l] = {})",
                s.lb, s.ub, s.elem_size, s.array, s.value
            ),
            StatementKind::ArrayStore(s) => {
                write!(f, "array_store({}, {}, {})", s.array, s.index, s.value)
            }
            StatementKind::ArrayLoad(s) => {
                write!(f, "{} = array_load({}, {})", s.lhs, s.array, s.index)
            }
            StatementKind::ArrayAssign(s) => write!(f, "{} = {}", s.lhs, s.rhs),
            StatementKind::PtrLoad(s) => write!(f, "{} = *({})", s.lhs, s.rhs),
            StatementKind::PtrStore(s) => write!(f, "*({}) = {}", s.lhs, s.rhs),
            StatementKind::PtrAssign(s) => {
                write!(f, "{} = &({}) + {}", s.lhs, s.rhs, s.offset)
            }
            StatementKind::PtrObject(s) => write!(f, "{} = &({})", s.lhs, s.address),
            StatementKind::PtrFunction(s) => write!(f, "{} = &({})", s.lhs, s.func),
            StatementKind::PtrNull(s) => write!(f, "{} = NULL", s.lhs),
            StatementKind::PtrAssume(s) => write!(f, "assume_ptr({})", s.constraint),
            StatementKind::PtrAssert(s) => write!(f, "assert_ptr({})", s.constraint),
            StatementKind::Callsite(s) => {
                match s.lhs.as_slice() {
                    [] => {}
                    [single] => write!(f, "{single} = ")?,
                    many => {
                        f.write_str("(")?;
                        for (i, v) in many.iter().enumerate() {
                            if i > 0 {
                                f.write_str(",")?;
                            }
                            write!(f, "{v}")?;
                        }
                        f.write_str(") = ")?;
                    }
                }
                write!(f, "call {}(", s.func)?;
                for (i, a) in s.args.iter().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    write!(f, "{a}:{}", a.ty())?;
                }
                f.write_str(")")
            }
            StatementKind::Return(s) => match s.vars.as_slice() {
                [] => f.write_str("return"),
                [single] => write!(f, "return {single}"),
                many => {
                    f.write_str("return (")?;
                    for (i, v) in many.iter().enumerate() {
                        if i > 0 {
                            f.write_str(",")?;
                        }
                        write!(f, "{v}")?;
                    }
                    f.write_str(")")
                }
            },
            StatementKind::BoolBinOp(s) => {
                write!(f, "{} = {}{}{}", s.lhs, s.left, s.op, s.right)
            }
            StatementKind::BoolAssignCst(s) => {
                if s.rhs.is_tautology() {
                    write!(f, "{} = true", s.lhs)
                } else if s.rhs.is_contradiction() {
                    write!(f, "{} = false", s.lhs)
                } else {
                    write!(f, "{} = ({})", s.lhs, s.rhs)
                }
            }
            StatementKind::BoolAssignVar(s) => {
                if s.negated {
                    write!(f, "{} = not({})", s.lhs, s.rhs)
                } else {
                    write!(f, "{} = {}", s.lhs, s.rhs)
                }
            }
            StatementKind::BoolAssume(s) => {
                if s.negated {
                    write!(f, "assume(not({}))", s.var)
                } else {
                    write!(f, "assume({})", s.var)
                }
            }
            StatementKind::BoolAssert(s) => write!(f, "assert({})", s.var),
            StatementKind::BoolSelect(s) => {
                write!(f, "{} = ite({}, {}, {})", s.lhs, s.cond, s.left, s.right)
            }
        }
    }
}

/// One hook per statement kind, each defaulting to a no-op.
///
/// Dispatch happens through [`Statement::accept`]; a block visits its
/// statements in order, a reversed block view in reverse order. Visitors may
/// carry state and are passed by mutable reference.
#[allow(unused_variables, missing_docs)]
pub trait StatementVisitor {
    fn visit_bin_op(&mut self, s: &BinOp) {}
    fn visit_assign(&mut self, s: &Assign) {}
    fn visit_assume(&mut self, s: &Assume) {}
    fn visit_assert(&mut self, s: &Assert) {}
    fn visit_select(&mut self, s: &Select) {}
    fn visit_unreachable(&mut self, s: &Unreachable) {}
    fn visit_havoc(&mut self, s: &Havoc) {}
    fn visit_int_cast(&mut self, s: &IntCast) {}

    fn visit_array_init(&mut self, s: &ArrayInit) {}
    fn visit_array_assume(&mut self, s: &ArrayAssume) {}
    fn visit_array_store(&mut self, s: &ArrayStore) {}
    fn visit_array_load(&mut self, s: &ArrayLoad) {}
    fn visit_array_assign(&mut self, s: &ArrayAssign) {}

    fn visit_ptr_load(&mut self, s: &PtrLoad) {}
    fn visit_ptr_store(&mut self, s: &PtrStore) {}
    fn visit_ptr_assign(&mut self, s: &PtrAssign) {}
    fn visit_ptr_object(&mut self, s: &PtrObject) {}
    fn visit_ptr_function(&mut self, s: &PtrFunction) {}
    fn visit_ptr_null(&mut self, s: &PtrNull) {}
    fn visit_ptr_assume(&mut self, s: &PtrAssume) {}
    fn visit_ptr_assert(&mut self, s: &PtrAssert) {}

    fn visit_callsite(&mut self, s: &Callsite) {}
    fn visit_return(&mut self, s: &Return) {}

    fn visit_bool_bin_op(&mut self, s: &BoolBinOp) {}
    fn visit_bool_assign_cst(&mut self, s: &BoolAssignCst) {}
    fn visit_bool_assign_var(&mut self, s: &BoolAssignVar) {}
    fn visit_bool_assume(&mut self, s: &BoolAssume) {}
    fn visit_bool_assert(&mut self, s: &BoolAssert) {}
    fn visit_bool_select(&mut self, s: &BoolSelect) {}
}
