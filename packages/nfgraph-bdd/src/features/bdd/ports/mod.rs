//! Graph construction ports

pub mod symbol_hook;

pub use symbol_hook::{GeneratedSymbol, NoGeneratedSymbols, SymbolHook};
