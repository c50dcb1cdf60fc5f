//! Scope isolation: a shared base environment plus per-test overlays
//!
//! Every test file runs in its own [`Scope`] created by
//! [`BaseScope::new_scope`]. Lookups check the overlay first and fall through
//! to the base; writes always land in the overlay, so nothing a test declares
//! can reach the base or a sibling test.
//!
//! Host objects held by the base are shared by reference. An interpreter that
//! gives them interior mutability can still leak state between tests through
//! in-place mutation; only rebinding is isolated.

use crate::value::{Object, Value};
use std::rc::Rc;

/// A binding environment, optionally chained to a read-only parent
#[derive(Debug, Clone, Default)]
pub struct Scope {
    bindings: Object,
    parent: Option<Rc<Scope>>,
}

impl Scope {
    /// Create a top-level scope with no parent
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an overlay scope whose unresolved lookups fall through to `parent`
    pub fn with_parent(parent: Rc<Scope>) -> Self {
        Scope {
            bindings: Object::new(),
            parent: Some(parent),
        }
    }

    /// Resolve a name through the chain
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.bindings
            .get(name)
            .or_else(|| self.parent.as_deref().and_then(|p| p.get(name)))
    }

    /// Resolve a name in this scope only
    pub fn get_own(&self, name: &str) -> Option<&Value> {
        self.bindings.get(name)
    }

    pub fn has(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn has_own(&self, name: &str) -> bool {
        self.bindings.contains_key(name)
    }

    /// Bind a name in this scope, shadowing any parent binding
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.bindings.insert(name, value);
    }

    /// Remove a local binding; parent bindings become visible again
    pub fn delete(&mut self, name: &str) -> Option<Value> {
        self.bindings.remove(name)
    }

    /// Names bound directly in this scope, in declaration order
    pub fn own_names(&self) -> impl Iterator<Item = &str> {
        self.bindings.keys()
    }

    /// Every visible name: own names first, then unshadowed parent names
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.own_names().map(str::to_string).collect();
        if let Some(parent) = &self.parent {
            for name in parent.names() {
                if !self.has_own(&name) {
                    names.push(name);
                }
            }
        }
        names
    }

    pub fn parent(&self) -> Option<&Scope> {
        self.parent.as_deref()
    }
}

/// The shared environment holding the test framework and global fixtures
///
/// Built once per run by loading scripts into a plain [`Scope`], then frozen.
#[derive(Debug, Clone)]
pub struct BaseScope {
    scope: Rc<Scope>,
}

impl BaseScope {
    /// Freeze a fully loaded scope
    pub fn freeze(scope: Scope) -> Self {
        BaseScope {
            scope: Rc::new(scope),
        }
    }

    /// Create a fresh execution scope for one test file
    pub fn new_scope(&self) -> Scope {
        Scope::with_parent(Rc::clone(&self.scope))
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.scope.get(name)
    }

    pub fn names(&self) -> Vec<String> {
        self.scope.names()
    }
}

impl Default for BaseScope {
    fn default() -> Self {
        BaseScope::freeze(Scope::new())
    }
}
