use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::construct::value::Value;

/// One lexical frame: a symbol table plus a link to the frame it was
/// opened inside.
///
/// The global environment is the root `Env` (`parent: None`); every
/// `lambda` call pushes a child frame linked to the environment the
/// procedure closed over, not the caller's frame -- this is what gives
/// lexical (not dynamic) scoping. Lookup and `set!` both walk the parent
/// chain, which is the lexical-stack-then-global search spec.md §4.4
/// describes, expressed as one uniform chain instead of two separate
/// tables.
pub struct Env {
    bindings: RefCell<HashMap<String, Value>>,
    parent: Option<Rc<Env>>,
}

impl Env {
    pub fn global() -> Rc<Env> {
        Rc::new(Env { bindings: RefCell::new(HashMap::new()), parent: None })
    }

    pub fn child(parent: &Rc<Env>) -> Rc<Env> {
        Rc::new(Env { bindings: RefCell::new(HashMap::new()), parent: Some(Rc::clone(parent)) })
    }

    /// Binds `name` in this frame, shadowing any outer binding. Used by
    /// `define` and by procedure application to bind formals.
    pub fn define(&self, name: &str, value: Value) {
        self.bindings.borrow_mut().insert(name.to_string(), value);
    }

    pub fn get(&self, name: &str) -> Option<Value> {
        if let Some(value) = self.bindings.borrow().get(name) {
            return Some(value.clone());
        }
        self.parent.as_ref().and_then(|p| p.get(name))
    }

    /// `set!`: mutates the nearest enclosing binding. Returns `false` if
    /// `name` is unbound anywhere in the chain (an unresolved-symbol
    /// error, per spec.md §7).
    pub fn set(&self, name: &str, value: Value) -> bool {
        if self.bindings.borrow().contains_key(name) {
            self.bindings.borrow_mut().insert(name.to_string(), value);
            return true;
        }
        match &self.parent {
            Some(p) => p.set(name, value),
            None => false,
        }
    }

    pub fn is_bound(&self, name: &str) -> bool {
        self.bindings.borrow().contains_key(name)
            || self.parent.as_ref().map_or(false, |p| p.is_bound(name))
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn lexical_shadowing() {
        let global = Env::global();
        global.define("x", Value::Number(1.into()));
        let frame = Env::child(&global);
        frame.define("x", Value::Number(2.into()));
        assert_eq!(frame.get("x"), Some(Value::Number(2.into())));
        assert_eq!(global.get("x"), Some(Value::Number(1.into())));
    }

    #[test]
    fn set_reaches_outer_frame() {
        let global = Env::global();
        global.define("x", Value::Number(1.into()));
        let frame = Env::child(&global);
        assert!(frame.set("x", Value::Number(9.into())));
        assert_eq!(global.get("x"), Some(Value::Number(9.into())));
    }

    #[test]
    fn set_unbound_fails() {
        let global = Env::global();
        assert!(!global.set("nope", Value::Boolean(false)));
    }
}
