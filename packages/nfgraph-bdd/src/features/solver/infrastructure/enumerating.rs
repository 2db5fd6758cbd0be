//! Enumerating oracle
//!
//! Decides entailment by evaluating the query over a finite set of models.
//! Narrow symbols are enumerated completely while the assignment budget
//! allows; the remaining symbols range over boundary values built from the
//! constants that appear in the query (0, 1, max, midpoint, every constant
//! and its neighbours, pairwise sums and differences). Wide-symbol answers
//! are therefore exact only for queries whose truth changes at those
//! boundaries, which covers the comparisons traces are made of.
//!
//! A search over boundary values that finds no model proves nothing, so
//! unsatisfiability is only reported when every domain was complete.

use crate::config::SolverConfig;
use crate::features::solver::domain::{Entailment, SolverError, SolverResult};
use crate::features::solver::ports::SolverToolbox;
use crate::shared::models::{mask, Assignment, ConstraintSet, Expr};
use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet};
use std::ops::ControlFlow;
use tracing::trace;

/// Model-enumeration oracle
#[derive(Debug)]
pub struct EnumeratingSolver {
    exhaustive_width: u32,
    max_assignments: u64,
    /// Uses per symbol base, for `create_symbol`
    issued: RefCell<BTreeMap<String, usize>>,
}

impl Default for EnumeratingSolver {
    fn default() -> Self {
        Self::from_config(&SolverConfig::default())
    }
}

struct Domain {
    name: String,
    values: Vec<u64>,
}

impl Domain {
    /// Whether `values` covers every value of a `width`-bit symbol
    fn is_complete(&self, width: u32) -> bool {
        width < 64 && self.values.len() as u64 == 1u64 << width
    }
}

/// Outcome of one model search
struct Search {
    found: bool,
    exhaustive: bool,
}

impl EnumeratingSolver {
    /// Widths above 63 are treated as 63
    pub fn new(exhaustive_width: u32, max_assignments: u64) -> Self {
        Self {
            exhaustive_width: exhaustive_width.min(63),
            max_assignments,
            issued: RefCell::new(BTreeMap::new()),
        }
    }

    pub fn from_config(config: &SolverConfig) -> Self {
        Self::new(config.exhaustive_width, config.max_assignments)
    }

    fn boundary_values(width: u32, constants: &BTreeSet<u64>) -> Vec<u64> {
        let m = mask(width);
        let mid = 1u64 << (width - 1);
        let mut values: BTreeSet<u64> = [0, 1, m, mid, mid - 1].into_iter().collect();

        let consts: Vec<u64> = constants.iter().map(|c| c & m).collect();
        for &c in &consts {
            values.insert(c);
            values.insert(c.wrapping_add(1) & m);
            values.insert(c.wrapping_sub(1) & m);
        }
        for &a in &consts {
            for &b in &consts {
                values.insert(a.wrapping_add(b) & m);
                values.insert(a.wrapping_sub(b) & m);
            }
        }
        values.into_iter().collect()
    }

    /// Pick a value domain per symbol within the assignment budget
    ///
    /// The flag tells whether every domain is complete.
    fn domains(&self, constraints: &ConstraintSet, expr: &Expr) -> SolverResult<(Vec<Domain>, bool)> {
        let mut symbols = constraints.symbols();
        for (name, width) in expr.symbols() {
            symbols.entry(name).or_insert(width);
        }
        let mut constants = expr.constants();
        for c in constraints {
            constants.extend(c.constants());
        }

        let mut domains: Vec<(u32, Domain)> = symbols
            .into_iter()
            .map(|(name, width)| {
                let values = Self::boundary_values(width.clamp(1, 64), &constants);
                (width, Domain { name, values })
            })
            .collect();

        let mut total = domains
            .iter()
            .fold(1u64, |acc, (_, d)| acc.saturating_mul(d.values.len() as u64));
        if total > self.max_assignments {
            return Err(SolverError::BudgetExceeded {
                required: total,
                budget: self.max_assignments,
            });
        }

        // Narrowest symbols are upgraded first
        let mut order: Vec<usize> = (0..domains.len()).collect();
        order.sort_by_key(|&i| domains[i].0);
        for i in order {
            let (width, domain) = &mut domains[i];
            if *width > self.exhaustive_width {
                continue;
            }
            let full = 1u64 << *width;
            let upgraded = (total / domain.values.len() as u64).saturating_mul(full);
            if upgraded <= self.max_assignments {
                domain.values = (0..full).collect();
                total = upgraded;
            }
        }

        let exhaustive = domains.iter().all(|(width, d)| d.is_complete(*width));
        trace!(
            symbols = domains.len(),
            assignments = total,
            exhaustive,
            "Enumeration domains"
        );
        Ok((domains.into_iter().map(|(_, d)| d).collect(), exhaustive))
    }

    /// Call `f` with every model of `constraints` and the value of `expr`
    ///
    /// Reports whether any model was found and whether the search was
    /// exhaustive.
    fn for_each_model<F>(&self, constraints: &ConstraintSet, expr: &Expr, mut f: F) -> SolverResult<Search>
    where
        F: FnMut(u64) -> ControlFlow<()>,
    {
        let (domains, exhaustive) = self.domains(constraints, expr)?;
        let mut assignment: Assignment = domains
            .iter()
            .map(|d| (d.name.clone(), d.values[0]))
            .collect();
        let mut cursor = vec![0usize; domains.len()];
        let mut found = false;

        'models: loop {
            let mut satisfied = true;
            for c in constraints {
                if c.eval(&assignment)? == 0 {
                    satisfied = false;
                    break;
                }
            }
            if satisfied {
                found = true;
                if f(expr.eval(&assignment)?).is_break() {
                    break;
                }
            }

            // Odometer step
            for (i, domain) in domains.iter().enumerate() {
                cursor[i] += 1;
                if cursor[i] < domain.values.len() {
                    assignment.insert(domain.name.clone(), domain.values[cursor[i]]);
                    continue 'models;
                }
                cursor[i] = 0;
                assignment.insert(domain.name.clone(), domain.values[0]);
            }
            break;
        }

        Ok(Search { found, exhaustive })
    }
}

impl SolverToolbox for EnumeratingSolver {
    fn create_symbol(&self, base: &str, width: u32) -> Expr {
        let mut issued = self.issued.borrow_mut();
        let count = issued.entry(base.to_string()).or_insert(0);
        let name = if *count == 0 {
            base.to_string()
        } else {
            format!("{}_{}", base, count)
        };
        *count += 1;
        Expr::symbol(name, width)
    }

    fn check(&self, constraints: &ConstraintSet, expr: &Expr) -> SolverResult<Entailment> {
        if !expr.is_bool() {
            return Err(SolverError::NotBoolean {
                expr: expr.to_string(),
                width: expr.width(),
            });
        }

        // Asserted constraints decide themselves
        if constraints.contains(expr) {
            return Ok(Entailment::AlwaysTrue);
        }
        if constraints.contains(&expr.clone().not()) {
            return Ok(Entailment::AlwaysFalse);
        }

        let mut saw_true = false;
        let mut saw_false = false;
        let search = self.for_each_model(constraints, expr, |value| {
            if value != 0 {
                saw_true = true;
            } else {
                saw_false = true;
            }
            if saw_true && saw_false {
                ControlFlow::Break(())
            } else {
                ControlFlow::Continue(())
            }
        })?;

        if !search.found {
            if search.exhaustive {
                return Err(SolverError::Unsatisfiable(constraints.to_string()));
            }
            trace!(%expr, "No boundary model, answering maybe");
            return Ok(Entailment::Maybe);
        }
        Ok(Entailment::from_observed(saw_true, saw_false))
    }

    fn value_from_expr(&self, constraints: &ConstraintSet, expr: &Expr) -> SolverResult<u64> {
        if let Some(value) = expr.as_constant() {
            return Ok(value);
        }

        let mut seen: Option<u64> = None;
        let mut constant = true;
        let search = self.for_each_model(constraints, expr, |value| match seen {
            Some(previous) if previous != value => {
                constant = false;
                ControlFlow::Break(())
            }
            _ => {
                seen = Some(value);
                ControlFlow::Continue(())
            }
        })?;

        if !search.found {
            if search.exhaustive {
                return Err(SolverError::Unsatisfiable(constraints.to_string()));
            }
            return Err(SolverError::Inconclusive(constraints.to_string()));
        }
        match seen {
            Some(value) if constant => Ok(value),
            _ => Err(SolverError::NotConstant(expr.to_string())),
        }
    }
}
