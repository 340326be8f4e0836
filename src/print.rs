//! The external representation (spec.md §6): turns a [`Value`] back into
//! the text a reader would accept, used by the REPL and by the grammar's
//! own round-trip tests.

use crate::construct::value::Value;

/// Abbreviates `(quote x)`/`(quasiquote x)`/`(unquote x)`/
/// `(unquote-splicing x)` at the head of a list to `'x`/`` `x ``/`,x`/
/// `,@x` -- spec.md §6: "the abbreviation is applied only at the head of
/// a pair whose car is the corresponding symbol".
fn abbreviation(value: &Value) -> Option<(&'static str, Value)> {
    let items = value.to_vec()?;
    if items.len() != 2 {
        return None;
    }
    let tag = items[0].as_symbol()?;
    let mark = match tag {
        "quote" => "'",
        "quasiquote" => "`",
        "unquote" => ",",
        "unquote-splicing" => ",@",
        _ => return None,
    };
    Some((mark, items[1].clone()))
}

fn print_character(c: char) -> String {
    match c {
        '\n' => "#\\newline".to_string(),
        ' ' => "#\\space".to_string(),
        other => format!("#\\{}", other),
    }
}

/// Renders `value` the way this crate's reader would read it back,
/// modulo whitespace (spec.md §8's round-trip property).
pub fn print(value: &Value) -> String {
    if let Some((mark, inner)) = abbreviation(value) {
        return format!("{}{}", mark, print(&inner));
    }

    match value {
        Value::EmptyList => "()".to_string(),
        Value::Boolean(true) => "#t".to_string(),
        Value::Boolean(false) => "#f".to_string(),
        Value::Number(n) => n.to_string(),
        Value::Symbol(s) => s.clone(),
        Value::Character(c) => print_character(*c),
        // Strings print without escape rewriting (spec.md §6): the raw
        // contents, wrapped in double quotes.
        Value::String(s) => format!("\"{}\"", s),
        Value::Vector(cell) => {
            let items: Vec<String> = cell.borrow().iter().map(print).collect();
            format!("#({})", items.join(" "))
        },
        Value::Pair(_) => print_pair(value),
        Value::Primitive(prim) => format!("#<primitive {}>", prim.name),
        Value::Compound(proc) => match &*proc.name.borrow() {
            Some(name) => format!("#<compound-procedure {}>", name),
            None => "#<compound-procedure>".to_string(),
        },
    }
}

/// Walks a (possibly dotted) pair chain, printing `( a b . c )`-shaped
/// output. A non-list tail prints with a literal ` . ` (spec.md §3/§6).
fn print_pair(value: &Value) -> String {
    let mut parts = Vec::new();
    let mut cursor = value.clone();

    loop {
        match cursor {
            Value::EmptyList => break,
            Value::Pair(cell) => {
                let (car, cdr) = cell.borrow().clone();
                parts.push(print(&car));
                cursor = cdr;
            },
            other => {
                parts.push(".".to_string());
                parts.push(print(&other));
                break;
            },
        }
    }

    format!("({})", parts.join(" "))
}

#[cfg(test)]
mod test {
    use std::rc::Rc;

    use num_bigint::BigInt;

    use super::*;

    #[test]
    fn prints_atoms() {
        assert_eq!(print(&Value::Boolean(true)), "#t");
        assert_eq!(print(&Value::Boolean(false)), "#f");
        assert_eq!(print(&Value::Number(BigInt::from(-7))), "-7");
        assert_eq!(print(&Value::symbol("foo")), "foo");
        assert_eq!(print(&Value::String("hi".to_string())), "\"hi\"");
        assert_eq!(print(&Value::Character('\n')), "#\\newline");
        assert_eq!(print(&Value::Character(' ')), "#\\space");
        assert_eq!(print(&Value::Character('x')), "#\\x");
    }

    #[test]
    fn prints_dotted_pair() {
        let v = Value::cons(Value::symbol("a"), Value::symbol("b"));
        assert_eq!(print(&v), "(a . b)");
    }

    #[test]
    fn prints_proper_list() {
        let v = Value::list(vec![Value::symbol("a"), Value::symbol("b"), Value::symbol("c")]);
        assert_eq!(print(&v), "(a b c)");
    }

    #[test]
    fn prints_quote_abbreviation() {
        let quoted = Value::list(vec![Value::symbol("quote"), Value::symbol("x")]);
        assert_eq!(print(&quoted), "'x");
    }

    #[test]
    fn prints_vector() {
        let v = Value::Vector(Rc::new(std::cell::RefCell::new(vec![
            Value::Number(BigInt::from(1)),
            Value::Number(BigInt::from(2)),
        ])));
        assert_eq!(print(&v), "#(1 2)");
    }

    #[test]
    fn empty_list_is_not_an_abbreviation() {
        assert_eq!(print(&Value::EmptyList), "()");
    }
}
