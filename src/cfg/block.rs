//! Basic blocks: ordered statement sequences with adjacency bookkeeping.
//!
//! A block owns its statements outright and refers to neighbouring blocks
//! only by label; the CFG's label→block map is the single owner of blocks,
//! so no cycle fix-up is ever needed. The typed builder surface below is the
//! way front ends emit statements. The pointer and array builders consult
//! the block's tracked precision and quietly skip emission below their
//! floor, which lets one front end produce progressively smaller CFGs at
//! coarser precision without a conditional at every call site.

use std::fmt;

use log::debug;

use crate::{
    cfg::BlockLabel,
    ir::{
        BinaryOperation, BoolBinaryOperation, CastOperation, DebugInfo, LinearConstraint,
        LinearExpression, PointerConstraint, Statement, StatementVisitor, TrackedPrecision,
        Variable,
    },
    Result,
};

/// A basic block: a labelled straight-line sequence of statements plus the
/// labels of its predecessors and successors.
///
/// Blocks are created through [`crate::cfg::Cfg::insert`], which stamps them
/// with the CFG's tracked precision. They are deliberately not `Copy`; use
/// [`BasicBlock::clone`] for a deep copy (statements, adjacency, aggregate
/// live set).
#[derive(Debug, Clone)]
pub struct BasicBlock<L> {
    label: L,
    stmts: Vec<Statement>,
    prev: Vec<L>,
    next: Vec<L>,
    precision: TrackedPrecision,
    // One-shot: send the next insertion to the front, then reset.
    insert_point_at_front: bool,
    live: Vec<Variable>,
}

impl<L: BlockLabel> BasicBlock<L> {
    pub(crate) fn new(label: L, precision: TrackedPrecision) -> Self {
        Self {
            label,
            stmts: Vec::new(),
            prev: Vec::new(),
            next: Vec::new(),
            precision,
            insert_point_at_front: false,
            live: Vec::new(),
        }
    }

    /// The block's label.
    #[must_use]
    pub const fn label(&self) -> &L {
        &self.label
    }

    /// The label rendered for display.
    #[must_use]
    pub fn name(&self) -> String {
        self.label.to_string()
    }

    /// The tracked precision stamped on this block at creation.
    #[must_use]
    pub const fn precision(&self) -> TrackedPrecision {
        self.precision
    }

    /// Sends the *next* statement insertion to the front of the block.
    ///
    /// The flag resets after one insertion. Front ends use this to prepend a
    /// prelude statement after the rest of a block has been emitted.
    pub fn set_insert_point_front(&mut self) {
        self.insert_point_at_front = true;
    }

    /// Appends a statement (or prepends it, when the one-shot front flag is
    /// set), folding its live set into the block's aggregate live set.
    pub fn add_statement(&mut self, stmt: Statement) {
        for v in stmt.live().uses().iter().chain(stmt.live().defs()) {
            if !self.live.contains(v) {
                self.live.push(v.clone());
            }
        }
        if self.insert_point_at_front {
            self.stmts.insert(0, stmt);
            self.insert_point_at_front = false;
        } else {
            self.stmts.push(stmt);
        }
    }

    /// The statements in execution order.
    #[must_use]
    pub fn statements(&self) -> &[Statement] {
        &self.stmts
    }

    /// Number of statements.
    #[must_use]
    pub fn len(&self) -> usize {
        self.stmts.len()
    }

    /// Returns `true` if the block holds no statements.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.stmts.is_empty()
    }

    /// Labels of successor blocks, in first-insertion order, duplicate-free.
    #[must_use]
    pub fn successors(&self) -> &[L] {
        &self.next
    }

    /// Labels of predecessor blocks, in first-insertion order, duplicate-free.
    #[must_use]
    pub fn predecessors(&self) -> &[L] {
        &self.prev
    }

    /// Every variable used or defined by this block, each exactly once, in
    /// first-appearance order. Maintained incrementally on insertion and
    /// merge.
    #[must_use]
    pub fn live(&self) -> &[Variable] {
        &self.live
    }

    /// Visits the statements in execution order.
    pub fn accept<V: StatementVisitor + ?Sized>(&self, v: &mut V) {
        for s in &self.stmts {
            s.accept(v);
        }
    }

    fn insert_adjacent(set: &mut Vec<L>, label: L) {
        if !set.contains(&label) {
            set.push(label);
        }
    }

    pub(crate) fn add_successor(&mut self, label: L) {
        Self::insert_adjacent(&mut self.next, label);
    }

    pub(crate) fn add_predecessor(&mut self, label: L) {
        Self::insert_adjacent(&mut self.prev, label);
    }

    pub(crate) fn remove_successor(&mut self, label: &L) {
        self.next.retain(|l| l != label);
    }

    pub(crate) fn remove_predecessor(&mut self, label: &L) {
        self.prev.retain(|l| l != label);
    }

    /// Splices `other`'s statements in front of this block's, unioning the
    /// aggregate live sets. Adjacency is untouched.
    pub fn merge_front(&mut self, other: &Self) {
        self.stmts.splice(0..0, other.stmts.iter().cloned());
        for v in &other.live {
            if !self.live.contains(v) {
                self.live.push(v.clone());
            }
        }
    }

    /// Splices `other`'s statements after this block's, unioning the
    /// aggregate live sets. Adjacency is untouched.
    pub fn merge_back(&mut self, other: &Self) {
        self.stmts.extend(other.stmts.iter().cloned());
        for v in &other.live {
            if !self.live.contains(v) {
                self.live.push(v.clone());
            }
        }
    }

    fn below(&self, floor: TrackedPrecision, what: &str) -> bool {
        if self.precision < floor {
            debug!(
                "block {}: {} dropped, tracked precision {:?} below {:?}",
                self.label, what, self.precision, floor
            );
            true
        } else {
            false
        }
    }

    // --- numerical builders ---

    /// `lhs = op1 + op2`
    pub fn add(&mut self, lhs: Variable, op1: Variable, op2: impl Into<LinearExpression>) {
        self.binary(lhs, BinaryOperation::Add, op1, op2);
    }

    /// `lhs = op1 - op2`
    pub fn sub(&mut self, lhs: Variable, op1: Variable, op2: impl Into<LinearExpression>) {
        self.binary(lhs, BinaryOperation::Sub, op1, op2);
    }

    /// `lhs = op1 * op2`
    pub fn mul(&mut self, lhs: Variable, op1: Variable, op2: impl Into<LinearExpression>) {
        self.binary(lhs, BinaryOperation::Mul, op1, op2);
    }

    /// `lhs = op1 / op2` (signed)
    pub fn div(&mut self, lhs: Variable, op1: Variable, op2: impl Into<LinearExpression>) {
        self.binary(lhs, BinaryOperation::SDiv, op1, op2);
    }

    /// `lhs = op1 / op2` (unsigned)
    pub fn udiv(&mut self, lhs: Variable, op1: Variable, op2: impl Into<LinearExpression>) {
        self.binary(lhs, BinaryOperation::UDiv, op1, op2);
    }

    /// `lhs = op1 % op2` (signed)
    pub fn rem(&mut self, lhs: Variable, op1: Variable, op2: impl Into<LinearExpression>) {
        self.binary(lhs, BinaryOperation::SRem, op1, op2);
    }

    /// `lhs = op1 % op2` (unsigned)
    pub fn urem(&mut self, lhs: Variable, op1: Variable, op2: impl Into<LinearExpression>) {
        self.binary(lhs, BinaryOperation::URem, op1, op2);
    }

    /// `lhs = op1 & op2`
    pub fn bitwise_and(&mut self, lhs: Variable, op1: Variable, op2: impl Into<LinearExpression>) {
        self.binary(lhs, BinaryOperation::And, op1, op2);
    }

    /// `lhs = op1 | op2`
    pub fn bitwise_or(&mut self, lhs: Variable, op1: Variable, op2: impl Into<LinearExpression>) {
        self.binary(lhs, BinaryOperation::Or, op1, op2);
    }

    /// `lhs = op1 ^ op2`
    pub fn bitwise_xor(&mut self, lhs: Variable, op1: Variable, op2: impl Into<LinearExpression>) {
        self.binary(lhs, BinaryOperation::Xor, op1, op2);
    }

    fn binary(
        &mut self,
        lhs: Variable,
        op: BinaryOperation,
        op1: Variable,
        op2: impl Into<LinearExpression>,
    ) {
        self.add_statement(Statement::bin_op(
            lhs,
            op,
            LinearExpression::var(op1),
            op2.into(),
            DebugInfo::default(),
        ));
    }

    /// `lhs = rhs`
    pub fn assign(&mut self, lhs: Variable, rhs: impl Into<LinearExpression>) {
        self.add_statement(Statement::assign(lhs, rhs.into()));
    }

    /// `assume(cst)`
    pub fn assume(&mut self, cst: LinearConstraint) {
        self.add_statement(Statement::assume(cst));
    }

    /// `assert(cst)`
    pub fn assertion(&mut self, cst: LinearConstraint, di: DebugInfo) {
        self.add_statement(Statement::assertion(cst, di));
    }

    /// `lhs =*`
    pub fn havoc(&mut self, lhs: Variable) {
        self.add_statement(Statement::havoc(lhs));
    }

    /// `unreachable`
    pub fn unreachable(&mut self) {
        self.add_statement(Statement::unreachable());
    }

    /// `lhs = ite(cond, e1, e2)`
    pub fn select(
        &mut self,
        lhs: Variable,
        cond: LinearConstraint,
        e1: impl Into<LinearExpression>,
        e2: impl Into<LinearExpression>,
    ) {
        self.add_statement(Statement::select(lhs, cond, e1.into(), e2.into()));
    }

    /// `lhs = ite(v >= 1, e1, e2)`, a select on a condition variable.
    pub fn select_var(
        &mut self,
        lhs: Variable,
        v: Variable,
        e1: impl Into<LinearExpression>,
        e2: impl Into<LinearExpression>,
    ) {
        let cond = LinearConstraint::ge(v, 1);
        self.select(lhs, cond, e1, e2);
    }

    /// `dst = trunc src`
    pub fn truncate(&mut self, src: Variable, dst: Variable) {
        self.add_statement(Statement::int_cast(
            CastOperation::Trunc,
            src,
            dst,
            DebugInfo::default(),
        ));
    }

    /// `dst = sext src`
    pub fn sext(&mut self, src: Variable, dst: Variable) {
        self.add_statement(Statement::int_cast(
            CastOperation::SExt,
            src,
            dst,
            DebugInfo::default(),
        ));
    }

    /// `dst = zext src`
    pub fn zext(&mut self, src: Variable, dst: Variable) {
        self.add_statement(Statement::int_cast(
            CastOperation::ZExt,
            src,
            dst,
            DebugInfo::default(),
        ));
    }

    // --- function builders ---

    /// `(lhs...) = call func(args...)`
    pub fn callsite(&mut self, func: &str, lhs: Vec<Variable>, args: Vec<Variable>) {
        self.add_statement(Statement::callsite(func.to_string(), lhs, args));
    }

    /// `return var`
    pub fn ret(&mut self, var: Variable) {
        self.add_statement(Statement::ret(vec![var]));
    }

    /// `return (vars...)`
    pub fn ret_many(&mut self, vars: Vec<Variable>) {
        self.add_statement(Statement::ret(vars));
    }

    // --- array builders (tracked precision floor: Arr) ---

    /// `array_init(a, [lb,ub] % elem_size, v)`; no-op below array precision.
    pub fn array_init(
        &mut self,
        a: Variable,
        elem_size: u64,
        lb: impl Into<LinearExpression>,
        ub: impl Into<LinearExpression>,
        v: impl Into<LinearExpression>,
    ) -> Result<()> {
        if self.below(TrackedPrecision::Arr, "array_init") {
            return Ok(());
        }
        let stmt = Statement::array_init(a, elem_size, lb.into(), ub.into(), v.into())?;
        self.add_statement(stmt);
        Ok(())
    }

    /// `assume(forall l in [lb,ub] % elem_size :: a[l] = v)`; no-op below
    /// array precision.
    pub fn array_assume(
        &mut self,
        a: Variable,
        elem_size: u64,
        lb: impl Into<LinearExpression>,
        ub: impl Into<LinearExpression>,
        v: impl Into<LinearExpression>,
    ) -> Result<()> {
        if self.below(TrackedPrecision::Arr, "array_assume") {
            return Ok(());
        }
        let stmt = Statement::array_assume(a, elem_size, lb.into(), ub.into(), v.into())?;
        self.add_statement(stmt);
        Ok(())
    }

    /// `array_store(arr, idx, v)`; no-op below array precision.
    pub fn array_store(
        &mut self,
        arr: Variable,
        idx: impl Into<LinearExpression>,
        v: impl Into<LinearExpression>,
        elem_size: u64,
        is_singleton: bool,
    ) -> Result<()> {
        if self.below(TrackedPrecision::Arr, "array_store") {
            return Ok(());
        }
        let stmt = Statement::array_store(arr, idx.into(), v.into(), elem_size, is_singleton)?;
        self.add_statement(stmt);
        Ok(())
    }

    /// `lhs = array_load(arr, idx)`; no-op below array precision.
    pub fn array_load(
        &mut self,
        lhs: Variable,
        arr: Variable,
        idx: impl Into<LinearExpression>,
        elem_size: u64,
    ) -> Result<()> {
        if self.below(TrackedPrecision::Arr, "array_load") {
            return Ok(());
        }
        let stmt = Statement::array_load(lhs, arr, idx.into(), elem_size)?;
        self.add_statement(stmt);
        Ok(())
    }

    /// Whole-array `lhs = rhs`; no-op below array precision.
    pub fn array_assign(&mut self, lhs: Variable, rhs: Variable) -> Result<()> {
        if self.below(TrackedPrecision::Arr, "array_assign") {
            return Ok(());
        }
        let stmt = Statement::array_assign(lhs, rhs)?;
        self.add_statement(stmt);
        Ok(())
    }

    // --- pointer builders (tracked precision floor: Ptr) ---

    /// `*(lhs) = rhs`; no-op below pointer precision.
    pub fn ptr_store(&mut self, lhs: Variable, rhs: Variable) {
        if !self.below(TrackedPrecision::Ptr, "ptr_store") {
            self.add_statement(Statement::ptr_store(lhs, rhs, DebugInfo::default()));
        }
    }

    /// `lhs = *(rhs)`; no-op below pointer precision.
    pub fn ptr_load(&mut self, lhs: Variable, rhs: Variable) {
        if !self.below(TrackedPrecision::Ptr, "ptr_load") {
            self.add_statement(Statement::ptr_load(lhs, rhs, DebugInfo::default()));
        }
    }

    /// `lhs = &(rhs) + offset`; no-op below pointer precision.
    pub fn ptr_assign(&mut self, lhs: Variable, rhs: Variable, offset: impl Into<LinearExpression>) {
        if !self.below(TrackedPrecision::Ptr, "ptr_assign") {
            self.add_statement(Statement::ptr_assign(lhs, rhs, offset.into()));
        }
    }

    /// `lhs = &(address)` for a fresh object; no-op below pointer precision.
    pub fn ptr_new_object(&mut self, lhs: Variable, address: u64) {
        if !self.below(TrackedPrecision::Ptr, "ptr_new_object") {
            self.add_statement(Statement::ptr_object(lhs, address));
        }
    }

    /// `lhs = &(func)`; no-op below pointer precision.
    pub fn ptr_new_func(&mut self, lhs: Variable, func: &str) {
        if !self.below(TrackedPrecision::Ptr, "ptr_new_func") {
            self.add_statement(Statement::ptr_function(lhs, func.to_string()));
        }
    }

    /// `lhs = NULL`; no-op below pointer precision.
    pub fn ptr_null(&mut self, lhs: Variable) {
        if !self.below(TrackedPrecision::Ptr, "ptr_null") {
            self.add_statement(Statement::ptr_null(lhs));
        }
    }

    /// `assume_ptr(cst)`; no-op below pointer precision.
    pub fn ptr_assume(&mut self, cst: PointerConstraint) {
        if !self.below(TrackedPrecision::Ptr, "ptr_assume") {
            self.add_statement(Statement::ptr_assume(cst));
        }
    }

    /// `assert_ptr(cst)`; no-op below pointer precision.
    pub fn ptr_assertion(&mut self, cst: PointerConstraint, di: DebugInfo) {
        if !self.below(TrackedPrecision::Ptr, "ptr_assertion") {
            self.add_statement(Statement::ptr_assertion(cst, di));
        }
    }

    // --- boolean builders ---

    /// `lhs = (rhs)` reifying a linear constraint into a boolean.
    pub fn bool_assign_cst(&mut self, lhs: Variable, rhs: LinearConstraint) {
        self.add_statement(Statement::bool_assign_cst(lhs, rhs));
    }

    /// `lhs = rhs` between booleans.
    pub fn bool_assign(&mut self, lhs: Variable, rhs: Variable) {
        self.add_statement(Statement::bool_assign_var(lhs, rhs, false));
    }

    /// `lhs = not(rhs)` between booleans.
    pub fn bool_assign_not(&mut self, lhs: Variable, rhs: Variable) {
        self.add_statement(Statement::bool_assign_var(lhs, rhs, true));
    }

    /// `assume(c)` for a boolean variable.
    pub fn bool_assume(&mut self, c: Variable) {
        self.add_statement(Statement::bool_assume(c, false));
    }

    /// `assume(not(c))` for a boolean variable.
    pub fn bool_not_assume(&mut self, c: Variable) {
        self.add_statement(Statement::bool_assume(c, true));
    }

    /// `assert(c)` for a boolean variable.
    pub fn bool_assert(&mut self, c: Variable, di: DebugInfo) {
        self.add_statement(Statement::bool_assert(c, di));
    }

    /// `lhs = ite(cond, b1, b2)` over booleans.
    pub fn bool_select(&mut self, lhs: Variable, cond: Variable, b1: Variable, b2: Variable) {
        self.add_statement(Statement::bool_select(lhs, cond, b1, b2));
    }

    /// `lhs = op1 & op2` over booleans.
    pub fn bool_and(&mut self, lhs: Variable, op1: Variable, op2: Variable) {
        self.add_statement(Statement::bool_bin_op(
            lhs,
            BoolBinaryOperation::And,
            op1,
            op2,
            DebugInfo::default(),
        ));
    }

    /// `lhs = op1 | op2` over booleans.
    pub fn bool_or(&mut self, lhs: Variable, op1: Variable, op2: Variable) {
        self.add_statement(Statement::bool_bin_op(
            lhs,
            BoolBinaryOperation::Or,
            op1,
            op2,
            DebugInfo::default(),
        ));
    }

    /// `lhs = op1 ^ op2` over booleans.
    pub fn bool_xor(&mut self, lhs: Variable, op1: Variable, op2: Variable) {
        self.add_statement(Statement::bool_bin_op(
            lhs,
            BoolBinaryOperation::Xor,
            op1,
            op2,
            DebugInfo::default(),
        ));
    }
}

impl<L: BlockLabel> fmt::Display for BasicBlock<L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}:", self.label)?;
        for s in &self.stmts {
            writeln!(f, "  {s};")?;
        }
        if !self.next.is_empty() {
            f.write_str("  goto ")?;
            for (i, l) in self.next.iter().enumerate() {
                if i > 0 {
                    f.write_str(",")?;
                }
                write!(f, "{l}")?;
            }
            f.write_str(";")?;
        }
        writeln!(f)
    }
}
