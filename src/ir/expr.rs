//! Linear expressions and constraints over typed variables.
//!
//! Statements never embed arbitrary arithmetic: numeric payloads are affine
//! forms `c1*v1 + ... + cn*vn + k`, and guards are such a form related to
//! zero. The representation keeps one term per variable (coefficients
//! combine on construction) so that [`LinearExpression::variables`] yields
//! each variable once.

use std::fmt;
use std::ops::{Add, Mul, Neg, Sub};

use strum::Display;

use crate::ir::Variable;

/// Constant coefficient type of linear forms.
pub type Number = i64;

/// An affine expression `c1*v1 + ... + cn*vn + k`.
///
/// Terms are kept in first-insertion order with at most one term per
/// variable; terms whose coefficient cancels to zero are dropped.
///
/// # Examples
///
/// ```rust
/// use tapir::ir::{LinearExpression, Variable, VariableFactory};
///
/// let mut vars = VariableFactory::new();
/// let x = Variable::int(vars.lookup("x"), 32);
/// let e = LinearExpression::from(x) * 2 + 1;
/// assert_eq!(e.to_string(), "2*x+1");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinearExpression {
    terms: Vec<(Number, Variable)>,
    constant: Number,
}

impl LinearExpression {
    /// The zero expression.
    #[must_use]
    pub const fn zero() -> Self {
        Self {
            terms: Vec::new(),
            constant: 0,
        }
    }

    /// An expression consisting of the single constant `k`.
    #[must_use]
    pub const fn constant(k: Number) -> Self {
        Self {
            terms: Vec::new(),
            constant: k,
        }
    }

    /// An expression consisting of the single term `1*v`.
    #[must_use]
    pub fn var(v: Variable) -> Self {
        Self {
            terms: vec![(1, v)],
            constant: 0,
        }
    }

    /// Adds `coeff*v` into the expression, combining with an existing term
    /// for the same variable.
    pub fn add_term(&mut self, coeff: Number, v: Variable) {
        if let Some(t) = self.terms.iter_mut().find(|(_, tv)| *tv == v) {
            t.0 += coeff;
        } else if coeff != 0 {
            self.terms.push((coeff, v));
            return;
        }
        self.terms.retain(|(c, _)| *c != 0);
    }

    /// The constant part `k`.
    #[must_use]
    pub const fn constant_part(&self) -> Number {
        self.constant
    }

    /// Iterates over the `(coefficient, variable)` terms in insertion order.
    pub fn terms(&self) -> impl Iterator<Item = (Number, &Variable)> {
        self.terms.iter().map(|(c, v)| (*c, v))
    }

    /// Iterates over the variables of the expression, each exactly once.
    pub fn variables(&self) -> impl Iterator<Item = &Variable> {
        self.terms.iter().map(|(_, v)| v)
    }

    /// Returns `true` if the expression has no variable terms.
    #[must_use]
    pub fn is_constant(&self) -> bool {
        self.terms.is_empty()
    }

    /// Returns the variable if the expression is exactly `1*v + 0`.
    #[must_use]
    pub fn as_variable(&self) -> Option<&Variable> {
        match (self.terms.as_slice(), self.constant) {
            ([(1, v)], 0) => Some(v),
            _ => None,
        }
    }

    /// Returns `true` if the expression is a constant or a single variable.
    ///
    /// Array statement operands are restricted to this shape.
    #[must_use]
    pub fn is_number_or_variable(&self) -> bool {
        self.is_constant() || self.as_variable().is_some()
    }
}

impl From<Variable> for LinearExpression {
    fn from(v: Variable) -> Self {
        Self::var(v)
    }
}

impl From<Number> for LinearExpression {
    fn from(k: Number) -> Self {
        Self::constant(k)
    }
}

impl Add for LinearExpression {
    type Output = Self;

    fn add(mut self, rhs: Self) -> Self {
        for (c, v) in rhs.terms {
            self.add_term(c, v);
        }
        self.constant += rhs.constant;
        self
    }
}

impl Add<Number> for LinearExpression {
    type Output = Self;

    fn add(mut self, rhs: Number) -> Self {
        self.constant += rhs;
        self
    }
}

impl Add<Variable> for LinearExpression {
    type Output = Self;

    fn add(mut self, rhs: Variable) -> Self {
        self.add_term(1, rhs);
        self
    }
}

impl Sub for LinearExpression {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        self + (-rhs)
    }
}

impl Sub<Number> for LinearExpression {
    type Output = Self;

    fn sub(mut self, rhs: Number) -> Self {
        self.constant -= rhs;
        self
    }
}

impl Sub<Variable> for LinearExpression {
    type Output = Self;

    fn sub(mut self, rhs: Variable) -> Self {
        self.add_term(-1, rhs);
        self
    }
}

impl Neg for LinearExpression {
    type Output = Self;

    fn neg(mut self) -> Self {
        for t in &mut self.terms {
            t.0 = -t.0;
        }
        self.constant = -self.constant;
        self
    }
}

impl Mul<Number> for LinearExpression {
    type Output = Self;

    fn mul(mut self, rhs: Number) -> Self {
        if rhs == 0 {
            return Self::constant(0);
        }
        for t in &mut self.terms {
            t.0 *= rhs;
        }
        self.constant *= rhs;
        self
    }
}

impl fmt::Display for LinearExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (c, v) in &self.terms {
            let mag = c.unsigned_abs();
            if *c < 0 {
                f.write_str("-")?;
            } else if !first {
                f.write_str("+")?;
            }
            if mag != 1 {
                write!(f, "{mag}*")?;
            }
            write!(f, "{v}")?;
            first = false;
        }
        if first {
            write!(f, "{}", self.constant)?;
        } else if self.constant != 0 {
            if self.constant < 0 {
                write!(f, "-{}", self.constant.unsigned_abs())?;
            } else {
                write!(f, "+{}", self.constant)?;
            }
        }
        Ok(())
    }
}

/// Relation of a [`LinearConstraint`]'s expression to zero.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConstraintKind {
    /// `expr = 0`
    #[strum(serialize = "=")]
    Eq,
    /// `expr != 0`
    #[strum(serialize = "!=")]
    Ne,
    /// `expr <= 0`
    #[strum(serialize = "<=")]
    Le,
    /// `expr < 0`
    #[strum(serialize = "<")]
    Lt,
    /// `expr >= 0`
    #[strum(serialize = ">=")]
    Ge,
    /// `expr > 0`
    #[strum(serialize = ">")]
    Gt,
}

/// A linear constraint `expr RELATION 0`.
///
/// Rendering moves the constant to the right-hand side, so the constraint
/// built by [`LinearConstraint::ge`]`(x, 0)` prints as `x >= 0`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinearConstraint {
    expr: LinearExpression,
    kind: ConstraintKind,
}

impl LinearConstraint {
    /// Builds `expr kind 0` directly.
    #[must_use]
    pub const fn new(expr: LinearExpression, kind: ConstraintKind) -> Self {
        Self { expr, kind }
    }

    /// The always-true constraint `0 = 0`.
    #[must_use]
    pub const fn tautology() -> Self {
        Self::new(LinearExpression::zero(), ConstraintKind::Eq)
    }

    /// The always-false constraint `1 = 0`.
    #[must_use]
    pub const fn contradiction() -> Self {
        Self::new(LinearExpression::constant(1), ConstraintKind::Eq)
    }

    /// `lhs = rhs`
    pub fn eq(lhs: impl Into<LinearExpression>, rhs: impl Into<LinearExpression>) -> Self {
        Self::new(lhs.into() - rhs.into(), ConstraintKind::Eq)
    }

    /// `lhs != rhs`
    pub fn ne(lhs: impl Into<LinearExpression>, rhs: impl Into<LinearExpression>) -> Self {
        Self::new(lhs.into() - rhs.into(), ConstraintKind::Ne)
    }

    /// `lhs <= rhs`
    pub fn le(lhs: impl Into<LinearExpression>, rhs: impl Into<LinearExpression>) -> Self {
        Self::new(lhs.into() - rhs.into(), ConstraintKind::Le)
    }

    /// `lhs < rhs`
    pub fn lt(lhs: impl Into<LinearExpression>, rhs: impl Into<LinearExpression>) -> Self {
        Self::new(lhs.into() - rhs.into(), ConstraintKind::Lt)
    }

    /// `lhs >= rhs`
    pub fn ge(lhs: impl Into<LinearExpression>, rhs: impl Into<LinearExpression>) -> Self {
        Self::new(lhs.into() - rhs.into(), ConstraintKind::Ge)
    }

    /// `lhs > rhs`
    pub fn gt(lhs: impl Into<LinearExpression>, rhs: impl Into<LinearExpression>) -> Self {
        Self::new(lhs.into() - rhs.into(), ConstraintKind::Gt)
    }

    /// The underlying expression (related to zero).
    #[must_use]
    pub const fn expression(&self) -> &LinearExpression {
        &self.expr
    }

    /// The relation kind.
    #[must_use]
    pub const fn kind(&self) -> ConstraintKind {
        self.kind
    }

    /// Iterates over the variables of the constraint, each exactly once.
    pub fn variables(&self) -> impl Iterator<Item = &Variable> {
        self.expr.variables()
    }

    /// Returns `true` if the constraint holds for every valuation.
    #[must_use]
    pub fn is_tautology(&self) -> bool {
        self.expr.is_constant() && Self::eval(self.expr.constant_part(), self.kind)
    }

    /// Returns `true` if the constraint holds for no valuation.
    #[must_use]
    pub fn is_contradiction(&self) -> bool {
        self.expr.is_constant() && !Self::eval(self.expr.constant_part(), self.kind)
    }

    fn eval(k: Number, kind: ConstraintKind) -> bool {
        match kind {
            ConstraintKind::Eq => k == 0,
            ConstraintKind::Ne => k != 0,
            ConstraintKind::Le => k <= 0,
            ConstraintKind::Lt => k < 0,
            ConstraintKind::Ge => k >= 0,
            ConstraintKind::Gt => k > 0,
        }
    }
}

impl fmt::Display for LinearConstraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.expr.is_constant() {
            return write!(f, "{} {} 0", self.expr.constant_part(), self.kind);
        }
        let lhs = LinearExpression {
            terms: self.expr.terms.clone(),
            constant: 0,
        };
        write!(f, "{lhs} {} {}", self.kind, -self.expr.constant_part())
    }
}

/// A constraint between pointer variables, or between a pointer variable and
/// null.
///
/// Tautologies and contradictions carry no operands; the live sets of
/// `ptr_assume`/`ptr_assert` statements skip them accordingly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PointerConstraint {
    /// Always true.
    Tautology,
    /// Always false.
    Contradiction,
    /// `p = NULL`
    EqNull(Variable),
    /// `p != NULL`
    NeNull(Variable),
    /// `p = q`
    Eq(Variable, Variable),
    /// `p != q`
    Ne(Variable, Variable),
}

impl PointerConstraint {
    /// Returns `true` for [`PointerConstraint::Tautology`].
    #[must_use]
    pub const fn is_tautology(&self) -> bool {
        matches!(self, Self::Tautology)
    }

    /// Returns `true` for [`PointerConstraint::Contradiction`].
    #[must_use]
    pub const fn is_contradiction(&self) -> bool {
        matches!(self, Self::Contradiction)
    }

    /// Returns `true` for the single-operand (null comparison) forms.
    #[must_use]
    pub const fn is_unary(&self) -> bool {
        matches!(self, Self::EqNull(_) | Self::NeNull(_))
    }

    /// Iterates over the pointer operands (none for tautology/contradiction).
    pub fn variables(&self) -> impl Iterator<Item = &Variable> {
        let (a, b) = match self {
            Self::Tautology | Self::Contradiction => (None, None),
            Self::EqNull(p) | Self::NeNull(p) => (Some(p), None),
            Self::Eq(p, q) | Self::Ne(p, q) => (Some(p), Some(q)),
        };
        a.into_iter().chain(b)
    }
}

impl fmt::Display for PointerConstraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Tautology => f.write_str("true"),
            Self::Contradiction => f.write_str("false"),
            Self::EqNull(p) => write!(f, "{p} = NULL"),
            Self::NeNull(p) => write!(f, "{p} != NULL"),
            Self::Eq(p, q) => write!(f, "{p} = {q}"),
            Self::Ne(p, q) => write!(f, "{p} != {q}"),
        }
    }
}
