//! Symbolic bit-vector expressions
//!
//! Solver-agnostic term representation used for call arguments, return
//! values, path constraints and branch conditions. Width 1 is boolean.
//!
//! Expressions are compared structurally only for de-duplication; semantic
//! equality and entailment always go through the solver port.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use thiserror::Error;

/// Widest supported bit-vector
pub const MAX_WIDTH: u32 = 64;

/// Concrete values bound to symbol labels
pub type Assignment = BTreeMap<String, u64>;

/// Expression evaluation error
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExprError {
    /// Symbol without a value in the assignment
    #[error("Unbound symbol '{0}'")]
    UnboundSymbol(String),

    /// Width outside 1..=64
    #[error("Unsupported width {0}")]
    UnsupportedWidth(u32),
}

/// Bit mask covering `width` low bits
#[inline]
pub fn mask(width: u32) -> u64 {
    if width >= MAX_WIDTH {
        u64::MAX
    } else {
        (1u64 << width) - 1
    }
}

/// Whether a solver label belongs to a symbol base name
///
/// Solvers uniquify repeated symbols with a suffix (`len`, `len_1`, `len__2`).
pub fn symbol_base_matches(label: &str, base: &str) -> bool {
    match label.strip_prefix(base) {
        Some("") => true,
        Some(rest) => rest.starts_with('_'),
        None => false,
    }
}

/// Symbolic bit-vector term
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Expr {
    /// Constant of the given width
    Const { value: u64, width: u32 },
    /// Solver-generated symbol, identified by its label
    Symbol { name: String, width: u32 },

    // Bitwise (logical on width 1)
    Not(Box<Expr>),
    And(Box<Expr>, Box<Expr>),
    Or(Box<Expr>, Box<Expr>),

    // Comparison (unsigned)
    Eq(Box<Expr>, Box<Expr>),
    Ult(Box<Expr>, Box<Expr>),
    Ule(Box<Expr>, Box<Expr>),

    // Arithmetic (wrapping)
    Add(Box<Expr>, Box<Expr>),
    Sub(Box<Expr>, Box<Expr>),

    // Bit slicing
    Extract {
        expr: Box<Expr>,
        offset: u32,
        width: u32,
    },
    /// Most significant part first
    Concat(Box<Expr>, Box<Expr>),

    /// If-then-else
    Ite(Box<Expr>, Box<Expr>, Box<Expr>),
}

impl Expr {
    pub fn constant(value: u64, width: u32) -> Self {
        Expr::Const {
            value: value & mask(width),
            width,
        }
    }

    pub fn bool(value: bool) -> Self {
        Self::constant(value as u64, 1)
    }

    pub fn symbol(name: impl Into<String>, width: u32) -> Self {
        Expr::Symbol {
            name: name.into(),
            width,
        }
    }

    pub fn not(self) -> Self {
        Expr::Not(Box::new(self))
    }

    pub fn and(self, other: Expr) -> Self {
        Expr::And(Box::new(self), Box::new(other))
    }

    pub fn or(self, other: Expr) -> Self {
        Expr::Or(Box::new(self), Box::new(other))
    }

    pub fn equals(self, other: Expr) -> Self {
        Expr::Eq(Box::new(self), Box::new(other))
    }

    pub fn not_equals(self, other: Expr) -> Self {
        self.equals(other).not()
    }

    pub fn ult(self, other: Expr) -> Self {
        Expr::Ult(Box::new(self), Box::new(other))
    }

    pub fn ule(self, other: Expr) -> Self {
        Expr::Ule(Box::new(self), Box::new(other))
    }

    pub fn ugt(self, other: Expr) -> Self {
        other.ult(self)
    }

    pub fn uge(self, other: Expr) -> Self {
        other.ule(self)
    }

    pub fn add(self, other: Expr) -> Self {
        Expr::Add(Box::new(self), Box::new(other))
    }

    pub fn sub(self, other: Expr) -> Self {
        Expr::Sub(Box::new(self), Box::new(other))
    }

    pub fn extract(self, offset: u32, width: u32) -> Self {
        Expr::Extract {
            expr: Box::new(self),
            offset,
            width,
        }
    }

    pub fn concat(self, low: Expr) -> Self {
        Expr::Concat(Box::new(self), Box::new(low))
    }

    pub fn ite(condition: Expr, then: Expr, otherwise: Expr) -> Self {
        Expr::Ite(Box::new(condition), Box::new(then), Box::new(otherwise))
    }

    /// Bit width of the value this expression produces
    pub fn width(&self) -> u32 {
        match self {
            Expr::Const { width, .. } | Expr::Symbol { width, .. } | Expr::Extract { width, .. } => {
                *width
            }
            Expr::Not(e) => e.width(),
            Expr::And(a, _) | Expr::Or(a, _) | Expr::Add(a, _) | Expr::Sub(a, _) => a.width(),
            Expr::Eq(..) | Expr::Ult(..) | Expr::Ule(..) => 1,
            Expr::Concat(high, low) => high.width() + low.width(),
            Expr::Ite(_, then, _) => then.width(),
        }
    }

    pub fn is_bool(&self) -> bool {
        self.width() == 1
    }

    /// Value of a literal constant
    pub fn as_constant(&self) -> Option<u64> {
        match self {
            Expr::Const { value, .. } => Some(*value),
            _ => None,
        }
    }

    /// Direct sub-expressions
    pub fn operands(&self) -> Vec<&Expr> {
        match self {
            Expr::Const { .. } | Expr::Symbol { .. } => Vec::new(),
            Expr::Not(e) | Expr::Extract { expr: e, .. } => vec![e.as_ref()],
            Expr::And(a, b)
            | Expr::Or(a, b)
            | Expr::Eq(a, b)
            | Expr::Ult(a, b)
            | Expr::Ule(a, b)
            | Expr::Add(a, b)
            | Expr::Sub(a, b)
            | Expr::Concat(a, b) => vec![a.as_ref(), b.as_ref()],
            Expr::Ite(c, t, e) => vec![c.as_ref(), t.as_ref(), e.as_ref()],
        }
    }

    fn operands_mut(&mut self) -> Vec<&mut Expr> {
        match self {
            Expr::Const { .. } | Expr::Symbol { .. } => Vec::new(),
            Expr::Not(e) | Expr::Extract { expr: e, .. } => vec![e.as_mut()],
            Expr::And(a, b)
            | Expr::Or(a, b)
            | Expr::Eq(a, b)
            | Expr::Ult(a, b)
            | Expr::Ule(a, b)
            | Expr::Add(a, b)
            | Expr::Sub(a, b)
            | Expr::Concat(a, b) => vec![a.as_mut(), b.as_mut()],
            Expr::Ite(c, t, e) => vec![c.as_mut(), t.as_mut(), e.as_mut()],
        }
    }

    /// Pre-order walk over every leaf
    pub fn walk(&self, visitor: &mut dyn ExprVisitor) {
        let mut stack = vec![self];
        while let Some(expr) = stack.pop() {
            match expr {
                Expr::Const { value, width } => visitor.visit_constant(*value, *width),
                Expr::Symbol { name, width } => visitor.visit_symbol(name, *width),
                _ => stack.extend(expr.operands().into_iter().rev()),
            }
        }
    }

    /// Rewrite symbols in place
    pub fn rewrite(&mut self, rewriter: &mut dyn ExprRewriter) {
        if let Expr::Symbol { name, width } = self {
            if let Some(replacement) = rewriter.rewrite_symbol(name, *width) {
                *self = replacement;
            }
            return;
        }
        for operand in self.operands_mut() {
            operand.rewrite(rewriter);
        }
    }

    /// Symbols referenced by this expression, with their widths
    pub fn symbols(&self) -> BTreeMap<String, u32> {
        let mut collector = SymbolCollector::default();
        self.walk(&mut collector);
        collector.symbols
    }

    /// Literal constants appearing in this expression
    pub fn constants(&self) -> BTreeSet<u64> {
        let mut collector = ConstantCollector::default();
        self.walk(&mut collector);
        collector.constants
    }

    /// Replace symbol labels according to `renames`
    pub fn rename_symbols(&mut self, renames: &BTreeMap<String, String>) {
        self.rewrite(&mut SymbolRenamer::new(renames));
    }

    /// Evaluate under a concrete assignment
    pub fn eval(&self, assignment: &Assignment) -> Result<u64, ExprError> {
        let width = self.width();
        if width == 0 || width > MAX_WIDTH {
            return Err(ExprError::UnsupportedWidth(width));
        }
        let value = match self {
            Expr::Const { value, .. } => *value,
            Expr::Symbol { name, .. } => *assignment
                .get(name)
                .ok_or_else(|| ExprError::UnboundSymbol(name.clone()))?,
            Expr::Not(e) => !e.eval(assignment)?,
            Expr::And(a, b) => a.eval(assignment)? & b.eval(assignment)?,
            Expr::Or(a, b) => a.eval(assignment)? | b.eval(assignment)?,
            Expr::Eq(a, b) => (a.eval(assignment)? == b.eval(assignment)?) as u64,
            Expr::Ult(a, b) => (a.eval(assignment)? < b.eval(assignment)?) as u64,
            Expr::Ule(a, b) => (a.eval(assignment)? <= b.eval(assignment)?) as u64,
            Expr::Add(a, b) => a.eval(assignment)?.wrapping_add(b.eval(assignment)?),
            Expr::Sub(a, b) => a.eval(assignment)?.wrapping_sub(b.eval(assignment)?),
            Expr::Extract { expr, offset, .. } => {
                let inner = expr.eval(assignment)?;
                if *offset >= MAX_WIDTH {
                    0
                } else {
                    inner >> offset
                }
            }
            Expr::Concat(high, low) => {
                let shift = low.width();
                if shift >= MAX_WIDTH {
                    return Err(ExprError::UnsupportedWidth(width));
                }
                (high.eval(assignment)? << shift) | low.eval(assignment)?
            }
            Expr::Ite(c, t, e) => {
                if c.eval(assignment)? != 0 {
                    t.eval(assignment)?
                } else {
                    e.eval(assignment)?
                }
            }
        };
        Ok(value & mask(width))
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Const { value, width: 1 } => write!(f, "{}", *value != 0),
            Expr::Const { value, width } => write!(f, "(w{} {})", width, value),
            Expr::Symbol { name, .. } => write!(f, "{}", name),
            Expr::Not(e) => write!(f, "(Not {})", e),
            Expr::And(a, b) => write!(f, "(And {} {})", a, b),
            Expr::Or(a, b) => write!(f, "(Or {} {})", a, b),
            Expr::Eq(a, b) => write!(f, "(Eq {} {})", a, b),
            Expr::Ult(a, b) => write!(f, "(Ult {} {})", a, b),
            Expr::Ule(a, b) => write!(f, "(Ule {} {})", a, b),
            Expr::Add(a, b) => write!(f, "(Add {} {})", a, b),
            Expr::Sub(a, b) => write!(f, "(Sub {} {})", a, b),
            Expr::Extract {
                expr,
                offset,
                width,
            } => write!(f, "(Extract w{} {} {})", width, offset, expr),
            Expr::Concat(a, b) => write!(f, "(Concat {} {})", a, b),
            Expr::Ite(c, t, e) => write!(f, "(Ite {} {} {})", c, t, e),
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Visitors
// ═══════════════════════════════════════════════════════════════════════════

/// Read-only visitor over expression leaves
pub trait ExprVisitor {
    fn visit_symbol(&mut self, _name: &str, _width: u32) {}
    fn visit_constant(&mut self, _value: u64, _width: u32) {}
}

/// In-place symbol rewriter
pub trait ExprRewriter {
    /// Replacement for a symbol, or `None` to keep it
    fn rewrite_symbol(&mut self, name: &str, width: u32) -> Option<Expr>;
}

#[derive(Default)]
struct SymbolCollector {
    symbols: BTreeMap<String, u32>,
}

impl ExprVisitor for SymbolCollector {
    fn visit_symbol(&mut self, name: &str, width: u32) {
        self.symbols.entry(name.to_string()).or_insert(width);
    }
}

#[derive(Default)]
struct ConstantCollector {
    constants: BTreeSet<u64>,
}

impl ExprVisitor for ConstantCollector {
    fn visit_constant(&mut self, value: u64, _width: u32) {
        self.constants.insert(value);
    }
}

/// Symbol-substitution rewriter driven by a label map
pub struct SymbolRenamer<'a> {
    renames: &'a BTreeMap<String, String>,
    replaced: usize,
}

impl<'a> SymbolRenamer<'a> {
    pub fn new(renames: &'a BTreeMap<String, String>) -> Self {
        Self {
            renames,
            replaced: 0,
        }
    }

    /// Number of symbol occurrences replaced so far
    pub fn replaced(&self) -> usize {
        self.replaced
    }
}

impl ExprRewriter for SymbolRenamer<'_> {
    fn rewrite_symbol(&mut self, name: &str, width: u32) -> Option<Expr> {
        let renamed = self.renames.get(name)?;
        self.replaced += 1;
        Some(Expr::symbol(renamed.clone(), width))
    }
}
