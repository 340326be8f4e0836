//! The tree-walking evaluator: `eval`/`apply`, dispatching to
//! [`crate::kernel::special_forms`] and [`crate::kernel::primitives`].

use std::fmt;
use std::rc::Rc;

use crate::construct::env::Env;
use crate::construct::value::{Arity, Compound, Value};
use crate::kernel::special_forms;

/// An evaluation-time failure: spec.md §7's "Unresolved symbol", "Arity
/// error", "Type error", "Applied non-procedure", and the eval-time half
/// of "Special-form misuse" (e.g. `else` outside a `cond` tail position).
///
/// Printing one of these and abandoning the current top-level form,
/// while leaving the interpreter's global state untouched, is exactly
/// spec.md §7's policy -- [`crate::Interp::eval_string`] is what actually
/// does the abandoning.
#[derive(Debug, Clone, PartialEq)]
pub struct Trace {
    pub message: String,
}

impl Trace {
    pub fn new(message: impl Into<String>) -> Trace { Trace { message: message.into() } }

    pub fn unresolved_symbol(name: &str) -> Trace {
        Trace::new(format!("Unbound variable: {}", name))
    }

    pub fn arity(name: &str, expected: Arity, got: usize) -> Trace {
        Trace::new(format!(
            "{} expects {} argument(s), got {}",
            name, expected, got
        ))
    }

    pub fn not_a_procedure(value: &Value) -> Trace {
        Trace::new(format!("The object {:?} is not applicable", value))
    }

    pub fn wrong_type(expected: &str, got: &Value) -> Trace {
        Trace::new(format!("Expected a {} but got {:?} ({})", expected, got, got.type_name()))
    }
}

impl fmt::Display for Trace {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Evaluation error: {}", self.message)
    }
}

/// `eval(form)`: self-evaluating types return themselves; a `Symbol`
/// resolves through the lexical chain to the global table; a `Vector`
/// evaluates element-wise (spec.md §4.4's dispatch table); a `Pair` whose
/// `car` names a special form dispatches there without evaluating the
/// arguments, otherwise evaluates `car`, re-checks whether *that* result
/// names a special form (spec.md §4.4's "Pair-otherwise" rule, which lets
/// a symbol bound to a special-form-looking value still be applied as a
/// procedure), and finally applies.
pub fn eval(form: &Value, env: &Rc<Env>) -> Result<Value, Trace> {
    match form {
        Value::EmptyList
        | Value::Boolean(_)
        | Value::Number(_)
        | Value::Character(_)
        | Value::String(_)
        | Value::Primitive(_)
        | Value::Compound(_) => Ok(form.clone()),

        Value::Symbol(name) => {
            env.get(name).ok_or_else(|| Trace::unresolved_symbol(name))
        },

        Value::Vector(cell) => {
            let evaluated: Result<Vec<Value>, Trace> =
                cell.borrow().iter().map(|v| eval(v, env)).collect();
            Ok(Value::Vector(Rc::new(std::cell::RefCell::new(evaluated?))))
        },

        Value::Pair(_) => eval_pair(form, env),
    }
}

fn eval_pair(form: &Value, env: &Rc<Env>) -> Result<Value, Trace> {
    let head = form.car().expect("eval_pair called on a non-pair");
    let tail = form.cdr().expect("eval_pair called on a non-pair");

    if let Value::Symbol(name) = &head {
        if let Some(handler) = special_forms::lookup(name) {
            return handler(&tail, env);
        }
    }

    let proc = eval(&head, env)?;
    apply(&proc, &eval_args(&tail, env)?)
}

fn eval_args(list: &Value, env: &Rc<Env>) -> Result<Vec<Value>, Trace> {
    let items = list.to_vec().ok_or_else(|| Trace::new("Combination is not a proper list"))?;
    items.iter().map(|v| eval(v, env)).collect()
}

/// `apply(proc, args)`. A primitive is called directly after an exact
/// arity check; a compound procedure binds `required` positionally,
/// binds `optional` positionally-or-to-its-default, collects any excess
/// into `rest`, evaluates its body in the new frame, and returns the last
/// form's value -- spec.md §4.4, with the arity derived fresh from the
/// procedure's formals (spec.md §9's bugfix) rather than a cached count.
pub fn apply(proc: &Value, args: &[Value]) -> Result<Value, Trace> {
    match proc {
        Value::Primitive(prim) => {
            if !prim.arity.accepts(args.len()) {
                return Err(Trace::arity(prim.name, prim.arity, args.len()));
            }
            (prim.func)(args)
        },
        Value::Compound(proc) => apply_compound(proc, args),
        other => Err(Trace::not_a_procedure(other)),
    }
}

fn apply_compound(proc: &Rc<Compound>, args: &[Value]) -> Result<Value, Trace> {
    let arity = proc.arity();
    if !arity.accepts(args.len()) {
        let name = proc.name.borrow().clone().unwrap_or_else(|| "lambda".to_string());
        return Err(Trace::arity(&name, arity, args.len()));
    }

    let frame = Env::child(&proc.env);
    let mut cursor = 0;

    for name in &proc.required {
        frame.define(name, args[cursor].clone());
        cursor += 1;
    }

    for optional in &proc.optional {
        let value = if cursor < args.len() {
            let v = args[cursor].clone();
            cursor += 1;
            v
        } else {
            eval(&optional.default, &frame)?
        };
        frame.define(&optional.name, value);
    }

    if let Some(rest) = &proc.rest {
        frame.define(rest, Value::list(args[cursor..].to_vec()));
    }

    let mut result = Value::Boolean(false);
    for form in &proc.body {
        result = eval(form, &frame)?;
    }
    Ok(result)
}
