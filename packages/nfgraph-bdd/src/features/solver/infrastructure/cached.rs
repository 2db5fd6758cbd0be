//! Memoizing oracle wrapper
//!
//! The builder asks the same entailment question many times (every path of
//! a group against the same candidate condition). Answers are cached per
//! (constraints, expression) in an LRU.

use crate::features::solver::domain::{Entailment, SolverResult};
use crate::features::solver::ports::SolverToolbox;
use crate::shared::models::{ConstraintSet, Expr};
use lru::LruCache;
use std::cell::{Cell, RefCell};
use std::num::NonZeroUsize;
use tracing::trace;

type QueryKey = (ConstraintSet, Expr);

/// LRU cache in front of another oracle
pub struct CachedSolver<S> {
    inner: S,
    cache: RefCell<LruCache<QueryKey, Entailment>>,
    hits: Cell<u64>,
    misses: Cell<u64>,
}

/// Cache counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub entries: usize,
}

impl<S: SolverToolbox> CachedSolver<S> {
    pub fn new(inner: S, capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            inner,
            cache: RefCell::new(LruCache::new(capacity)),
            hits: Cell::new(0),
            misses: Cell::new(0),
        }
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.get(),
            misses: self.misses.get(),
            entries: self.cache.borrow().len(),
        }
    }

    pub fn clear(&self) {
        self.cache.borrow_mut().clear();
    }
}

impl<S: SolverToolbox> SolverToolbox for CachedSolver<S> {
    fn create_symbol(&self, base: &str, width: u32) -> Expr {
        self.inner.create_symbol(base, width)
    }

    fn check(&self, constraints: &ConstraintSet, expr: &Expr) -> SolverResult<Entailment> {
        let key = (constraints.clone(), expr.clone());
        if let Some(answer) = self.cache.borrow_mut().get(&key) {
            self.hits.set(self.hits.get() + 1);
            return Ok(*answer);
        }

        self.misses.set(self.misses.get() + 1);
        let answer = self.inner.check(constraints, expr)?;
        trace!(%expr, %answer, "Oracle query");
        self.cache.borrow_mut().put(key, answer);
        Ok(answer)
    }

    fn value_from_expr(&self, constraints: &ConstraintSet, expr: &Expr) -> SolverResult<u64> {
        self.inner.value_from_expr(constraints, expr)
    }
}
