//! Traced function calls and call paths

use super::constraint_set::ConstraintSet;
use super::expr::{Expr, ExprRewriter};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// One call argument
///
/// Plain values carry `expr`. Buffer-typed parameters carry the pointee
/// snapshot before and after the call; an argument with `after` set is an
/// output of the call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Arg {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expr: Option<Expr>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub before: Option<Expr>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub after: Option<Expr>,
}

impl Arg {
    pub fn value(expr: Expr) -> Self {
        Self {
            expr: Some(expr),
            ..Default::default()
        }
    }

    pub fn buffer(expr: Expr, before: Expr, after: Option<Expr>) -> Self {
        Self {
            expr: Some(expr),
            before: Some(before),
            after,
        }
    }

    pub fn is_output(&self) -> bool {
        self.after.is_some()
    }

    fn exprs_mut(&mut self) -> impl Iterator<Item = &mut Expr> {
        self.expr
            .iter_mut()
            .chain(self.before.iter_mut())
            .chain(self.after.iter_mut())
    }
}

/// One function invocation from a trace
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Call {
    pub function_name: String,
    #[serde(default)]
    pub args: BTreeMap<String, Arg>,
    /// Implicit outputs not bound to a parameter
    #[serde(default)]
    pub extra_vars: BTreeMap<String, Arg>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ret: Option<Expr>,
}

impl Call {
    pub fn new(function_name: impl Into<String>) -> Self {
        Self {
            function_name: function_name.into(),
            args: BTreeMap::new(),
            extra_vars: BTreeMap::new(),
            ret: None,
        }
    }

    pub fn with_arg(mut self, name: impl Into<String>, arg: Arg) -> Self {
        self.args.insert(name.into(), arg);
        self
    }

    pub fn with_extra_var(mut self, name: impl Into<String>, arg: Arg) -> Self {
        self.extra_vars.insert(name.into(), arg);
        self
    }

    pub fn with_ret(mut self, ret: Expr) -> Self {
        self.ret = Some(ret);
        self
    }

    /// Expressions this call produces: return value, output snapshots and
    /// extra vars
    pub fn output_exprs(&self) -> Vec<&Expr> {
        let mut out: Vec<&Expr> = self.ret.iter().collect();
        out.extend(self.args.values().filter_map(|arg| arg.after.as_ref()));
        for var in self.extra_vars.values() {
            out.extend(var.expr.iter().chain(var.after.iter()));
        }
        out
    }

    pub fn rewrite(&mut self, rewriter: &mut dyn ExprRewriter) {
        for arg in self.args.values_mut().chain(self.extra_vars.values_mut()) {
            for expr in arg.exprs_mut() {
                expr.rewrite(rewriter);
            }
        }
        if let Some(ret) = &mut self.ret {
            ret.rewrite(rewriter);
        }
    }
}

impl fmt::Display for Call {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.function_name)?;
        for (i, (name, arg)) in self.args.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}:", name)?;
            match (&arg.expr, &arg.before, &arg.after) {
                (_, Some(before), Some(after)) => write!(f, "[{} -> {}]", before, after)?,
                (_, Some(before), None) => write!(f, "[{}]", before)?,
                (Some(expr), None, _) => write!(f, "{}", expr)?,
                (None, None, _) => write!(f, "_")?,
            }
        }
        write!(f, ")")?;
        if let Some(ret) = &self.ret {
            write!(f, " -> {}", ret)?;
        }
        Ok(())
    }
}

/// One recorded symbolic-execution trace
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallPath {
    pub name: String,
    pub calls: Vec<Call>,
    #[serde(default)]
    pub constraints: ConstraintSet,
}

impl CallPath {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            calls: Vec::new(),
            constraints: ConstraintSet::new(),
        }
    }

    pub fn with_call(mut self, call: Call) -> Self {
        self.calls.push(call);
        self
    }

    pub fn with_constraint(mut self, constraint: Expr) -> Self {
        self.constraints.push(constraint);
        self
    }
}
