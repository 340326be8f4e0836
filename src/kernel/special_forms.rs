//! The special-form table: forms whose operands are not evaluated
//! up front, resolved by symbol before argument evaluation
//! (spec.md §4.4).

use std::rc::Rc;

use crate::construct::env::Env;
use crate::construct::value::{Compound, Optional, Value};
use crate::eval::{apply, eval, Trace};

type Handler = fn(&Value, &Rc<Env>) -> Result<Value, Trace>;

/// Looks up `name` in the special-form table. `eval_pair` calls this
/// before evaluating any operand, which is what lets `if`, `quote`,
/// `lambda`, and friends see their operands unevaluated.
pub fn lookup(name: &str) -> Option<Handler> {
    Some(match name {
        "quote" => quote,
        "if" => if_form,
        "and" => and_form,
        "or" => or_form,
        "cond" => cond_form,
        "case" => case_form,
        "let" => let_form,
        "let*" => let_star_form,
        "letrec" => letrec_form,
        "do" => do_form,
        "delay" => delay_form,
        "begin" => begin_form,
        "define" => define_form,
        "set!" => set_bang_form,
        "lambda" => lambda_form,
        "quasiquote" => quasiquote_form,
        _ => return None,
    })
}

fn operands(tail: &Value) -> Result<Vec<Value>, Trace> {
    tail.to_vec().ok_or_else(|| Trace::new("Special form operands must be a proper list"))
}

fn eval_sequence(forms: &[Value], env: &Rc<Env>) -> Result<Value, Trace> {
    let mut result = Value::Boolean(false);
    for form in forms {
        result = eval(form, env)?;
    }
    Ok(result)
}

fn quote(tail: &Value, _env: &Rc<Env>) -> Result<Value, Trace> {
    let args = operands(tail)?;
    match args.as_slice() {
        [datum] => Ok(datum.clone()),
        _ => Err(Trace::new("quote expects exactly 1 operand")),
    }
}

fn if_form(tail: &Value, env: &Rc<Env>) -> Result<Value, Trace> {
    let args = operands(tail)?;
    match args.as_slice() {
        [test, then] => {
            if eval(test, env)?.truthy() { eval(then, env) } else { Ok(Value::Boolean(false)) }
        },
        [test, then, otherwise] => {
            if eval(test, env)?.truthy() { eval(then, env) } else { eval(otherwise, env) }
        },
        _ => Err(Trace::new("if expects 2 or 3 operands")),
    }
}

fn and_form(tail: &Value, env: &Rc<Env>) -> Result<Value, Trace> {
    let args = operands(tail)?;
    let mut result = Value::Boolean(true);
    for form in &args {
        result = eval(form, env)?;
        if !result.truthy() {
            return Ok(result);
        }
    }
    Ok(result)
}

fn or_form(tail: &Value, env: &Rc<Env>) -> Result<Value, Trace> {
    let args = operands(tail)?;
    for form in &args {
        let value = eval(form, env)?;
        if value.truthy() {
            return Ok(value);
        }
    }
    Ok(Value::Boolean(false))
}

fn as_clause(value: &Value) -> Result<Vec<Value>, Trace> {
    value.to_vec().ok_or_else(|| Trace::new("cond/case clause must be a proper list"))
}

fn cond_form(tail: &Value, env: &Rc<Env>) -> Result<Value, Trace> {
    let clauses = operands(tail)?;
    for (index, clause) in clauses.iter().enumerate() {
        let items = as_clause(clause)?;
        let (head, rest) = items.split_first().ok_or_else(|| Trace::new("cond clause is empty"))?;

        let is_else = matches!(head, Value::Symbol(s) if s == "else");
        if is_else {
            if index != clauses.len() - 1 {
                return Err(Trace::new("cond: `else` must be the last clause"));
            }
            return eval_sequence(rest, env);
        }

        let test = eval(head, env)?;
        if test.truthy() {
            return if rest.is_empty() { Ok(test) } else { eval_sequence(rest, env) };
        }
    }
    Ok(Value::Boolean(false))
}

fn case_form(tail: &Value, env: &Rc<Env>) -> Result<Value, Trace> {
    let args = operands(tail)?;
    let (key_expr, clauses) =
        args.split_first().ok_or_else(|| Trace::new("case expects a key and clauses"))?;
    let key = eval(key_expr, env)?;

    for (index, clause) in clauses.iter().enumerate() {
        let items = as_clause(clause)?;
        let (head, rest) = items.split_first().ok_or_else(|| Trace::new("case clause is empty"))?;

        let is_else = matches!(head, Value::Symbol(s) if s == "else");
        if is_else {
            if index != clauses.len() - 1 {
                return Err(Trace::new("case: `else` must be the last clause"));
            }
            return eval_sequence(rest, env);
        }

        let datums = head
            .to_vec()
            .ok_or_else(|| Trace::new("case clause datum list must be a proper list"))?;
        if datums.iter().any(|d| *d == key) {
            return eval_sequence(rest, env);
        }
    }
    Ok(Value::Boolean(false))
}

fn binding_pairs(bindings: &Value) -> Result<Vec<(String, Value)>, Trace> {
    let items = bindings
        .to_vec()
        .ok_or_else(|| Trace::new("let/let*/letrec bindings must be a proper list"))?;
    items
        .iter()
        .map(|binding| {
            let parts = as_clause(binding)?;
            match parts.as_slice() {
                [Value::Symbol(name), init] => Ok((name.clone(), init.clone())),
                _ => Err(Trace::new("each binding must be `(name init)`")),
            }
        })
        .collect()
}

fn let_form(tail: &Value, env: &Rc<Env>) -> Result<Value, Trace> {
    let args = operands(tail)?;
    let (first, rest) = args.split_first().ok_or_else(|| Trace::new("let expects bindings"))?;

    // Named let: `(let loop ((var init)...) body...)` desugars to a
    // letrec-bound procedure applied to the initial values, matching
    // `original_source/cscheme.h`'s `LET_VARIABLE_BINDING_SPEC_P`.
    if let Value::Symbol(loop_name) = first {
        let (bindings, body) =
            rest.split_first().ok_or_else(|| Trace::new("named let expects bindings"))?;
        let pairs = binding_pairs(bindings)?;
        let (names, inits): (Vec<String>, Vec<Value>) = pairs.into_iter().unzip();

        let frame = Env::child(env);
        let values: Result<Vec<Value>, Trace> = inits.iter().map(|i| eval(i, env)).collect();
        let proc = Value::Compound(Rc::new(Compound {
            name: std::cell::RefCell::new(Some(loop_name.clone())),
            required: names,
            optional: vec![],
            rest: None,
            body: body.to_vec(),
            env: Rc::clone(&frame),
        }));
        frame.define(loop_name, proc.clone());
        return apply(&proc, &values?);
    }

    let pairs = binding_pairs(first)?;
    let frame = Env::child(env);
    for (name, init) in &pairs {
        let value = eval(init, env)?;
        frame.define(name, value);
    }
    eval_sequence(rest, &frame)
}

fn let_star_form(tail: &Value, env: &Rc<Env>) -> Result<Value, Trace> {
    let args = operands(tail)?;
    let (bindings, body) = args.split_first().ok_or_else(|| Trace::new("let* expects bindings"))?;
    let pairs = binding_pairs(bindings)?;

    let frame = Env::child(env);
    for (name, init) in &pairs {
        let value = eval(init, &frame)?;
        frame.define(name, value);
    }
    eval_sequence(body, &frame)
}

fn letrec_form(tail: &Value, env: &Rc<Env>) -> Result<Value, Trace> {
    let args = operands(tail)?;
    let (bindings, body) = args.split_first().ok_or_else(|| Trace::new("letrec expects bindings"))?;
    let pairs = binding_pairs(bindings)?;

    let frame = Env::child(env);
    for (name, _) in &pairs {
        frame.define(name, Value::Boolean(false));
    }
    for (name, init) in &pairs {
        let value = eval(init, &frame)?;
        frame.define(name, value);
    }
    eval_sequence(body, &frame)
}

fn do_form(tail: &Value, env: &Rc<Env>) -> Result<Value, Trace> {
    let args = operands(tail)?;
    let (specs_val, rest) =
        args.split_first().ok_or_else(|| Trace::new("do expects iteration specs"))?;
    let (test_clause, commands) =
        rest.split_first().ok_or_else(|| Trace::new("do expects a test clause"))?;

    struct IterSpec {
        name: String,
        step: Option<Value>,
    }

    let specs_list =
        specs_val.to_vec().ok_or_else(|| Trace::new("do iteration specs must be a proper list"))?;
    let mut specs = Vec::with_capacity(specs_list.len());
    let frame = Env::child(env);

    for spec in &specs_list {
        let parts = as_clause(spec)?;
        let (name, init, step) = match parts.as_slice() {
            [Value::Symbol(name), init] => (name.clone(), init.clone(), None),
            [Value::Symbol(name), init, step] => (name.clone(), init.clone(), Some(step.clone())),
            _ => return Err(Trace::new("do iteration spec must be `(var init [step])`")),
        };
        let value = eval(&init, env)?;
        frame.define(&name, value);
        specs.push(IterSpec { name, step });
    }

    let test_parts = as_clause(test_clause)?;
    let (test, result_exprs) =
        test_parts.split_first().ok_or_else(|| Trace::new("do test clause is empty"))?;

    loop {
        if eval(test, &frame)?.truthy() {
            return eval_sequence(result_exprs, &frame);
        }

        for command in commands {
            eval(command, &frame)?;
        }

        let next_values: Result<Vec<Option<Value>>, Trace> = specs
            .iter()
            .map(|spec| spec.step.as_ref().map(|step| eval(step, &frame)).transpose())
            .collect();
        let next_values = next_values?;
        for (spec, value) in specs.iter().zip(next_values) {
            if let Some(value) = value {
                frame.define(&spec.name, value);
            }
        }
    }
}

fn delay_form(tail: &Value, env: &Rc<Env>) -> Result<Value, Trace> {
    let args = operands(tail)?;
    match args.as_slice() {
        [expr] => Ok(Value::Compound(Rc::new(Compound {
            name: std::cell::RefCell::new(None),
            required: vec![],
            optional: vec![],
            rest: None,
            body: vec![expr.clone()],
            env: Rc::clone(env),
        }))),
        _ => Err(Trace::new("delay expects exactly 1 operand")),
    }
}

fn begin_form(tail: &Value, env: &Rc<Env>) -> Result<Value, Trace> {
    eval_sequence(&operands(tail)?, env)
}

fn define_form(tail: &Value, env: &Rc<Env>) -> Result<Value, Trace> {
    let args = operands(tail)?;
    let (target, body) = args.split_first().ok_or_else(|| Trace::new("define expects a target"))?;

    match target {
        Value::Symbol(name) => match body {
            [] => {
                env.define(name, Value::Boolean(false));
                Ok(Value::Symbol(name.clone()))
            },
            [expr] => {
                let value = eval(expr, env)?;
                if let Value::Compound(proc) = &value {
                    if proc.name.borrow().is_none() {
                        *proc.name.borrow_mut() = Some(name.clone());
                    }
                }
                env.define(name, value);
                Ok(Value::Symbol(name.clone()))
            },
            _ => Err(Trace::new("define with a variable target expects exactly 1 value")),
        },
        Value::Pair(_) => {
            let header =
                target.to_vec_improper().ok_or_else(|| Trace::new("define: ill-formed header"))?;
            let name = match &header.proper[0] {
                Value::Symbol(name) => name.clone(),
                _ => return Err(Trace::new("define: procedure name must be a symbol")),
            };
            let (required, optional, rest) = parse_formals_from(&header.proper[1..], &header.tail)?;
            let proc = Value::Compound(Rc::new(Compound {
                name: std::cell::RefCell::new(Some(name.clone())),
                required,
                optional,
                rest,
                body: body.to_vec(),
                env: Rc::clone(env),
            }));
            env.define(&name, proc);
            Ok(Value::Symbol(name))
        },
        _ => Err(Trace::new("define: target must be a symbol or a procedure header")),
    }
}

fn set_bang_form(tail: &Value, env: &Rc<Env>) -> Result<Value, Trace> {
    let args = operands(tail)?;
    match args.as_slice() {
        [Value::Symbol(name), expr] => {
            let value = eval(expr, env)?;
            if env.set(name, value) {
                Ok(Value::Boolean(false))
            } else {
                Err(Trace::unresolved_symbol(name))
            }
        },
        [_, _] => Err(Trace::new("set! target must be a symbol")),
        _ => Err(Trace::new("set! expects exactly 2 operands")),
    }
}

fn lambda_form(tail: &Value, env: &Rc<Env>) -> Result<Value, Trace> {
    let args = operands(tail)?;
    let (formals, body) = args.split_first().ok_or_else(|| Trace::new("lambda expects formals"))?;

    let header = formals.to_vec_improper().ok_or_else(|| Trace::new("lambda: ill-formed formals"))?;
    let (required, optional, rest) = parse_formals_from(&header.proper, &header.tail)?;

    Ok(Value::Compound(Rc::new(Compound {
        name: std::cell::RefCell::new(None),
        required,
        optional,
        rest,
        body: body.to_vec(),
        env: Rc::clone(env),
    })))
}

/// Partitions a formals list into required/optional/rest, recognizing
/// the `#!optional` and `#!rest` markers (spec.md §4.4). `tail` is
/// whatever followed a dotted formals list (`(a b . rest)`), or
/// `EmptyList` for a proper list.
fn parse_formals_from(
    items: &[Value],
    tail: &Value,
) -> Result<(Vec<String>, Vec<Optional>, Option<String>), Trace> {
    let mut required = Vec::new();
    let mut optional = Vec::new();
    let mut rest = None;

    enum Mode {
        Required,
        Optional,
    }
    let mut mode = Mode::Required;
    let mut iter = items.iter();

    while let Some(item) = iter.next() {
        match item {
            Value::Symbol(s) if s == "#!optional" => mode = Mode::Optional,
            Value::Symbol(s) if s == "#!rest" => {
                let rest_name = iter
                    .next()
                    .and_then(|v| v.as_symbol())
                    .ok_or_else(|| Trace::new("#!rest must be followed by one symbol"))?;
                rest = Some(rest_name.to_string());
            },
            Value::Symbol(name) => match mode {
                Mode::Required => required.push(name.clone()),
                Mode::Optional => optional.push(Optional { name: name.clone(), default: Value::Boolean(false) }),
            },
            Value::Pair(_) => {
                // `(name default)` optional with an explicit default.
                let pair = item.to_vec().ok_or_else(|| Trace::new("ill-formed optional formal"))?;
                match pair.as_slice() {
                    [Value::Symbol(name), default] => {
                        optional.push(Optional { name: name.clone(), default: default.clone() })
                    },
                    _ => return Err(Trace::new("ill-formed `(name default)` optional formal")),
                }
            },
            _ => return Err(Trace::new("formals must be symbols")),
        }
    }

    if let Value::Symbol(name) = tail {
        rest = Some(name.clone());
    }

    Ok((required, optional, rest))
}

fn as_tagged(value: &Value, tag: &str) -> Option<Value> {
    let items = value.to_vec()?;
    if items.len() == 2 {
        if let Value::Symbol(s) = &items[0] {
            if s == tag {
                return Some(items[1].clone());
            }
        }
    }
    None
}

fn quasiquote_form(tail: &Value, env: &Rc<Env>) -> Result<Value, Trace> {
    let args = operands(tail)?;
    match args.as_slice() {
        [datum] => quasi(datum, env),
        _ => Err(Trace::new("quasiquote expects exactly 1 operand")),
    }
}

fn quasi(datum: &Value, env: &Rc<Env>) -> Result<Value, Trace> {
    if let Some(expr) = as_tagged(datum, "unquote") {
        return eval(&expr, env);
    }
    match datum {
        Value::Pair(_) => quasi_list(datum, env),
        Value::Vector(cell) => {
            let list = Value::list(cell.borrow().clone());
            let processed = quasi_list(&list, env)?;
            let items = processed.to_vec().expect("quasi_list always returns a proper list");
            Ok(Value::Vector(Rc::new(std::cell::RefCell::new(items))))
        },
        other => Ok(other.clone()),
    }
}

fn quasi_list(datum: &Value, env: &Rc<Env>) -> Result<Value, Trace> {
    match datum {
        Value::EmptyList => Ok(Value::EmptyList),
        Value::Pair(cell) => {
            if let Some(expr) = as_tagged(datum, "unquote") {
                return eval(&expr, env);
            }
            let (car, cdr) = cell.borrow().clone();
            if let Some(expr) = as_tagged(&car, "unquote-splicing") {
                let spliced = eval(&expr, env)?;
                let items = spliced
                    .to_vec()
                    .ok_or_else(|| Trace::new("unquote-splicing value must be a proper list"))?;
                let tail = quasi_list(&cdr, env)?;
                Ok(items.into_iter().rev().fold(tail, |acc, item| Value::cons(item, acc)))
            } else {
                let head = quasi(&car, env)?;
                let tail = quasi_list(&cdr, env)?;
                Ok(Value::cons(head, tail))
            }
        },
        other => quasi(other, env),
    }
}
