//! Scope stack with per-scope state
//!
//! Tracks nested naming scopes during graph traversal. Entering a scope
//! copies the enclosing state, leaving it discards whatever the scope
//! accumulated, so sibling scopes start from the same baseline.

#[derive(Debug, Clone)]
struct Scope<T> {
    name: String,
    state: T,
}

/// Stack of named scopes, each owning a copy of `T`
#[derive(Debug, Clone)]
pub struct ScopeStack<T> {
    root: T,
    scopes: Vec<Scope<T>>,
}

impl<T: Clone + Default> Default for ScopeStack<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone + Default> ScopeStack<T> {
    /// Create a stack with an empty root state
    pub fn new() -> Self {
        Self {
            root: T::default(),
            scopes: Vec::new(),
        }
    }

    /// Enter a scope, inheriting a copy of the current state
    pub fn push(&mut self, name: impl Into<String>) {
        let state = self.state().clone();
        self.scopes.push(Scope {
            name: name.into(),
            state,
        });
    }

    /// Leave the innermost scope; the root scope is never popped
    pub fn pop(&mut self) -> Option<String> {
        self.scopes.pop().map(|scope| scope.name)
    }

    pub fn state(&self) -> &T {
        self.scopes.last().map_or(&self.root, |scope| &scope.state)
    }

    pub fn state_mut(&mut self) -> &mut T {
        match self.scopes.last_mut() {
            Some(scope) => &mut scope.state,
            None => &mut self.root,
        }
    }

    /// Innermost scope name, `None` at root
    pub fn current(&self) -> Option<&str> {
        self.scopes.last().map(|scope| scope.name.as_str())
    }
}
