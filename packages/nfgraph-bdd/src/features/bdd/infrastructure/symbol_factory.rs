//! Deterministic symbol renaming
//!
//! Independent symbolic runs reuse solver labels, so two calls minting the
//! "same" symbol can alias downstream. The renaming pass walks both views,
//! gives every minted symbol a canonical label derived from its base name
//! and naming scope, and substitutes it through the minting node and its
//! whole subtree.
//!
//! Labels:
//! - root scope: `<base>__<n>`
//! - inside branch arm `b<id>t` / `b<id>f`: `<base>__b<id>t_<n>`
//!
//! `<n>` counts earlier symbols of the same base on the path from the root.

use crate::config::SymbolConfig;
use crate::errors::BddResult;
use crate::features::bdd::domain::{NodeArena, NodeId, NodeKind};
use crate::features::bdd::ports::{GeneratedSymbol, SymbolHook};
use crate::shared::models::{symbol_base_matches, Call, SymbolRenamer};
use crate::shared::utils::ScopeStack;
use ahash::{AHashMap, AHashSet};
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

/// Hook driven by the configured generator table
pub struct ConfiguredSymbolHook<'a> {
    generators: &'a BTreeMap<String, Vec<String>>,
}

impl<'a> ConfiguredSymbolHook<'a> {
    pub fn new(config: &'a SymbolConfig) -> Self {
        Self {
            generators: &config.generators,
        }
    }
}

impl SymbolHook for ConfiguredSymbolHook<'_> {
    fn generated_symbols(&self, call: &Call) -> Vec<GeneratedSymbol> {
        let Some(bases) = self.generators.get(&call.function_name) else {
            return Vec::new();
        };

        let labels: BTreeSet<String> = call
            .output_exprs()
            .into_iter()
            .flat_map(|expr| expr.symbols().into_keys())
            .collect();

        let mut claimed = AHashSet::new();
        let mut generated = Vec::new();
        for base in bases {
            for label in &labels {
                if symbol_base_matches(label, base) && claimed.insert(label.as_str()) {
                    generated.push(GeneratedSymbol {
                        base: base.clone(),
                        label: label.clone(),
                    });
                }
            }
        }
        generated
    }
}

/// Issues canonical labels
pub struct SymbolFactory {
    scopes: ScopeStack<AHashMap<String, usize>>,
    issued: AHashSet<String>,
}

impl Default for SymbolFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl SymbolFactory {
    pub fn new() -> Self {
        Self {
            scopes: ScopeStack::new(),
            issued: AHashSet::new(),
        }
    }

    pub fn enter_scope(&mut self, name: impl Into<String>) {
        self.scopes.push(name);
    }

    pub fn leave_scope(&mut self) {
        self.scopes.pop();
    }

    /// Next canonical label for `base` in the current scope
    pub fn canonical_label(&mut self, base: &str) -> String {
        loop {
            let counter = self.scopes.state_mut().entry(base.to_string()).or_insert(0);
            let n = *counter;
            *counter += 1;

            let label = match self.scopes.current() {
                None => format!("{}__{}", base, n),
                Some(scope) => format!("{}__{}_{}", base, scope, n),
            };
            if self.issued.insert(label.clone()) {
                return label;
            }
        }
    }
}

enum Task {
    Visit(NodeId),
    Enter(String),
    Leave,
}

/// Rename minted symbols across the views rooted at `roots`
///
/// Returns the number of symbols renamed.
pub fn rename_symbols(
    arena: &mut NodeArena,
    roots: &[NodeId],
    hook: &dyn SymbolHook,
) -> BddResult<usize> {
    let mut factory = SymbolFactory::new();
    let mut renamed = 0;

    for &root in roots {
        let mut tasks = vec![Task::Visit(root)];
        while let Some(task) = tasks.pop() {
            let id = match task {
                Task::Enter(scope) => {
                    factory.enter_scope(scope);
                    continue;
                }
                Task::Leave => {
                    factory.leave_scope();
                    continue;
                }
                Task::Visit(id) => id,
            };

            let generated = match &arena.node(id)?.kind {
                NodeKind::Branch(b) => {
                    if let (Some(on_true), Some(on_false)) = (b.on_true, b.on_false) {
                        tasks.extend([
                            Task::Leave,
                            Task::Visit(on_false),
                            Task::Enter(format!("b{}f", id)),
                            Task::Leave,
                            Task::Visit(on_true),
                            Task::Enter(format!("b{}t", id)),
                        ]);
                    }
                    continue;
                }
                NodeKind::Call(c) => hook.generated_symbols(&c.call),
                _ => continue,
            };

            let mut renames = BTreeMap::new();
            for symbol in generated {
                let label = factory.canonical_label(&symbol.base);
                if label != symbol.label {
                    renames.insert(symbol.label, label);
                }
            }
            if !renames.is_empty() {
                debug!("Renaming at node {}: {:?}", id, renames);
                renamed += renames.len();
                translate(arena, id, &renames)?;
            }

            if let Some(next) = arena.node(id)?.next() {
                tasks.push(Task::Visit(next));
            }
        }
    }

    Ok(renamed)
}

/// Substitute `renames` in the node at `root` and everything below it
fn translate(
    arena: &mut NodeArena,
    root: NodeId,
    renames: &BTreeMap<String, String>,
) -> BddResult<()> {
    for id in arena.subtree(root)? {
        let mut renamer = SymbolRenamer::new(renames);
        arena.node_mut(id)?.rewrite(&mut renamer);
    }
    Ok(())
}
