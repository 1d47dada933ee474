//! Function declarations and ABI signature hashing.
//!
//! A declaration is optional on a CFG; when present it names the function
//! and lists its input and output variables. Interprocedural analysis
//! produces input-output relations, which is only meaningful when the two
//! parameter sets are disjoint; the constructor enforces that.

use std::fmt;
use std::hash::{Hash, Hasher};

use rustc_hash::{FxHashSet, FxHasher};

use crate::{
    ir::{Callsite, Type, Variable},
    Error, Result,
};

/// A function declaration: name plus disjoint input and output variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionDecl {
    name: String,
    inputs: Vec<Variable>,
    outputs: Vec<Variable>,
}

impl FunctionDecl {
    /// Creates a declaration.
    ///
    /// # Errors
    ///
    /// [`Error::Malformed`] if the input and output sets overlap.
    pub fn new(name: &str, inputs: Vec<Variable>, outputs: Vec<Variable>) -> Result<Self> {
        let mut seen: FxHashSet<&Variable> = FxHashSet::default();
        for v in inputs.iter().chain(&outputs) {
            if !seen.insert(v) {
                return Err(Error::Malformed(
                    "function inputs and outputs must be disjoint".to_string(),
                ));
            }
        }
        Ok(Self {
            name: name.to_string(),
            inputs,
            outputs,
        })
    }

    /// The function name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The input variables.
    #[must_use]
    pub fn inputs(&self) -> &[Variable] {
        &self.inputs
    }

    /// The output variables.
    #[must_use]
    pub fn outputs(&self) -> &[Variable] {
        &self.outputs
    }

    /// Number of inputs.
    #[must_use]
    pub fn num_inputs(&self) -> usize {
        self.inputs.len()
    }

    /// Number of outputs.
    #[must_use]
    pub fn num_outputs(&self) -> usize {
        self.outputs.len()
    }

    /// The `idx`-th input variable.
    ///
    /// # Errors
    ///
    /// [`Error::ArgOutOfBounds`] when `idx` is past the input list.
    pub fn input(&self, idx: usize) -> Result<&Variable> {
        self.inputs.get(idx).ok_or(Error::ArgOutOfBounds {
            kind: "input",
            index: idx,
        })
    }

    /// The `idx`-th input type.
    ///
    /// # Errors
    ///
    /// [`Error::ArgOutOfBounds`] when `idx` is past the input list.
    pub fn input_type(&self, idx: usize) -> Result<Type> {
        self.input(idx).map(Variable::ty)
    }

    /// The `idx`-th output variable.
    ///
    /// # Errors
    ///
    /// [`Error::ArgOutOfBounds`] when `idx` is past the output list.
    pub fn output(&self, idx: usize) -> Result<&Variable> {
        self.outputs.get(idx).ok_or(Error::ArgOutOfBounds {
            kind: "output",
            index: idx,
        })
    }

    /// The `idx`-th output type.
    ///
    /// # Errors
    ///
    /// [`Error::ArgOutOfBounds`] when `idx` is past the output list.
    pub fn output_type(&self, idx: usize) -> Result<Type> {
        self.output(idx).map(Variable::ty)
    }

    /// Structural hash of the ABI signature: name, input types, output
    /// types. Two CFGs whose declarations agree on these hash identically.
    #[must_use]
    pub fn signature_hash(&self) -> u64 {
        let mut h = FxHasher::default();
        self.name.hash(&mut h);
        for v in &self.inputs {
            v.ty().hash(&mut h);
        }
        for v in &self.outputs {
            v.ty().hash(&mut h);
        }
        h.finish()
    }
}

impl fmt::Display for FunctionDecl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.outputs.as_slice() {
            [] => f.write_str("void")?,
            [single] => write!(f, "{single}:{}", single.ty())?,
            many => {
                f.write_str("(")?;
                for (i, v) in many.iter().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    write!(f, "{v}:{}", v.ty())?;
                }
                f.write_str(")")?;
            }
        }
        write!(f, " declare {}(", self.name)?;
        for (i, v) in self.inputs.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{v}:{}", v.ty())?;
        }
        f.write_str(")")
    }
}

/// Structural hash of a callsite's ABI: callee name, argument types, result
/// types. Matches [`FunctionDecl::signature_hash`] for an ABI-compatible
/// declaration, which is how interprocedural consumers pair calls with
/// callees.
#[must_use]
pub fn callsite_signature_hash(cs: &Callsite) -> u64 {
    let mut h = FxHasher::default();
    cs.func_name().hash(&mut h);
    for v in cs.args() {
        v.ty().hash(&mut h);
    }
    for v in cs.lhs() {
        v.ty().hash(&mut h);
    }
    h.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::{Statement, StatementKind, VariableFactory};

    #[test]
    fn test_disjointness_enforced() {
        let mut vars = VariableFactory::new();
        let x = Variable::int(vars.lookup("x"), 32);
        let y = Variable::int(vars.lookup("y"), 32);

        assert!(FunctionDecl::new("f", vec![x.clone()], vec![y.clone()]).is_ok());
        assert!(FunctionDecl::new("f", vec![x.clone()], vec![x]).is_err());
        assert!(FunctionDecl::new("f", vec![y.clone(), y.clone()], vec![]).is_err());
    }

    #[test]
    fn test_rendering() {
        let mut vars = VariableFactory::new();
        let x = Variable::int(vars.lookup("x"), 32);
        let y = Variable::int(vars.lookup("y"), 32);
        let r = Variable::int(vars.lookup("r"), 32);

        let d = FunctionDecl::new("sum", vec![x.clone(), y.clone()], vec![r.clone()]).unwrap();
        assert_eq!(d.to_string(), "r:int declare sum(x:int,y:int)");

        let d = FunctionDecl::new("sink", vec![x], vec![]).unwrap();
        assert_eq!(d.to_string(), "void declare sink(x:int)");

        let d = FunctionDecl::new("pair", vec![], vec![y, r]).unwrap();
        assert_eq!(d.to_string(), "(y:int,r:int) declare pair()");
    }

    #[test]
    fn test_signature_hash_is_structural() {
        let mut f1 = VariableFactory::new();
        let mut f2 = VariableFactory::new();

        let a = FunctionDecl::new(
            "f",
            vec![Variable::int(f1.lookup("a"), 32)],
            vec![Variable::int(f1.lookup("r"), 32)],
        )
        .unwrap();
        // Different variable names, same name + types.
        let b = FunctionDecl::new(
            "f",
            vec![Variable::int(f2.lookup("x"), 64)],
            vec![Variable::int(f2.lookup("out"), 64)],
        )
        .unwrap();
        assert_eq!(a.signature_hash(), b.signature_hash());

        let c = FunctionDecl::new("g", vec![], vec![]).unwrap();
        assert_ne!(a.signature_hash(), c.signature_hash());
    }

    #[test]
    fn test_callsite_hash_matches_decl() {
        let mut vars = VariableFactory::new();
        let x = Variable::int(vars.lookup("x"), 32);
        let r = Variable::int(vars.lookup("r"), 32);

        let decl = FunctionDecl::new("f", vec![x.clone()], vec![r.clone()]).unwrap();
        let call = Statement::callsite("f".to_string(), vec![r], vec![x]);
        let StatementKind::Callsite(cs) = call.kind() else {
            unreachable!();
        };
        assert_eq!(callsite_signature_hash(cs), decl.signature_hash());
    }

    #[test]
    fn test_indexed_access() {
        let mut vars = VariableFactory::new();
        let x = Variable::int(vars.lookup("x"), 32);
        let d = FunctionDecl::new("f", vec![x], vec![]).unwrap();
        assert!(d.input(0).is_ok());
        assert!(d.input(1).is_err());
        assert!(d.output(0).is_err());
        assert_eq!(d.input_type(0).unwrap(), Type::Int);
    }
}
