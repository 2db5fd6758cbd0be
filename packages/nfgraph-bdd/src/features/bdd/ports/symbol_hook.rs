//! Symbol generation hook
//!
//! Tells the renaming pass which solver symbols a call node mints. The
//! default mints nothing, which leaves every label as the solver chose it.

use crate::shared::models::Call;

/// A symbol minted by a call, by base name and solver label
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct GeneratedSymbol {
    pub base: String,
    pub label: String,
}

pub trait SymbolHook {
    /// Symbols `call` generates, in a stable order
    fn generated_symbols(&self, _call: &Call) -> Vec<GeneratedSymbol> {
        Vec::new()
    }
}

/// Hook that reports no generated symbols
#[derive(Debug, Clone, Copy, Default)]
pub struct NoGeneratedSymbols;

impl SymbolHook for NoGeneratedSymbols {}
