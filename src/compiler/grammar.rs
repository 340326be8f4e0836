//! The Scheme reader grammar: `DATUM`, the `LIST` family, `VECTOR`, and
//! the quote abbreviations, built once as a [`Grammar<Value>`].
//!
//! Scheme code is data (spec.md's homoiconic design): a `lambda` form and
//! a plain three-element list are read by exactly the same `LIST`
//! production. The grammar below only builds *data*; deciding that a
//! parenthesized form starting with the symbol `lambda` is a procedure
//! literal, not a three-element list, is the evaluator's job
//! ([`crate::kernel::special_forms`]), dispatching on the shape of the
//! datum the grammar already produced. This mirrors
//! `original_source/cscheme.h`'s own grammar: its `LAMBDA_P`/`IF_P`/
//! `COND_P`/etc. productions build ordinary pair-based S-expressions
//! indistinguishable from what generic list parsing would have produced;
//! only `eval`'s special-form table gives them meaning.
use std::str::FromStr;

use num_bigint::BigInt;

use crate::compiler::parse::{any, atomic, many0, many1, seq, Grammar};
use crate::compiler::token::Category;
use crate::construct::value::Value;

const DATUM: &str = "DATUM";
const CONSTANT: &str = "CONSTANT";
const SYMBOL: &str = "SYMBOL";
const LIST: &str = "LIST";
const SIMPLE_LIST: &str = "SIMPLE_LIST";
const DOTTED_LIST: &str = "DOTTED_LIST";
const DATUM_STAR: &str = "DATUM_STAR";
const DATUM_PLUS: &str = "DATUM_PLUS";
const VECTOR: &str = "VECTOR";
const ABBREVIATION: &str = "ABBREVIATION";
const QUOTE_ABBR: &str = "QUOTE_ABBR";
const QUASIQUOTE_ABBR: &str = "QUASIQUOTE_ABBR";
const UNQUOTE_ABBR: &str = "UNQUOTE_ABBR";
const UNQUOTE_SPLICING_ABBR: &str = "UNQUOTE_SPLICING_ABBR";

/// The top-level label [`Grammar::parse`] should bind: every complete
/// top-level form is a `DATUM` (spec.md §6's "parse each top-level form
/// with root `FORM`").
pub const FORM: &str = DATUM;

fn ignore(_: &crate::common::span::Spanned<crate::compiler::token::Token>) -> Value {
    Value::Boolean(false)
}

fn emit_boolean(tok: &crate::common::span::Spanned<crate::compiler::token::Token>) -> Value {
    Value::Boolean(tok.item.lexeme == "#t")
}

fn emit_number(tok: &crate::common::span::Spanned<crate::compiler::token::Token>) -> Value {
    let n = BigInt::from_str(&tok.item.lexeme)
        .unwrap_or_else(|_| panic!("lexer bug: NUMBER token {:?} is not an integer", tok.item.lexeme));
    Value::Number(n)
}

fn emit_character(tok: &crate::common::span::Spanned<crate::compiler::token::Token>) -> Value {
    let c = match tok.item.lexeme.as_str() {
        r"#\newline" => '\n',
        r"#\space" => ' ',
        other => other.chars().nth(2).unwrap_or_else(|| {
            panic!("lexer bug: CHARACTER token {:?} has no payload character", other)
        }),
    };
    Value::Character(c)
}

fn emit_string(tok: &crate::common::span::Spanned<crate::compiler::token::Token>) -> Value {
    let inner = &tok.item.lexeme[1..tok.item.lexeme.len() - 1];
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            match chars.next() {
                Some('n') => out.push('\n'),
                Some('t') => out.push('\t'),
                Some(other) => out.push(other),
                None => {},
            }
        } else {
            out.push(c);
        }
    }
    Value::String(out)
}

fn emit_symbol(tok: &crate::common::span::Spanned<crate::compiler::token::Token>) -> Value {
    Value::Symbol(tok.item.lexeme.clone())
}

fn datum_list(values: Vec<Value>) -> Value { Value::list(values) }

fn combine_simple_list(_: &Grammar<Value>, vals: Vec<Value>) -> Value { vals[1].clone() }

fn combine_dotted_list(_: &Grammar<Value>, vals: Vec<Value>) -> Value {
    let items = vals[1]
        .to_vec()
        .unwrap_or_else(|| panic!("grammar bug: DATUM_PLUS did not produce a proper list"));
    let tail = vals[3].clone();
    items.into_iter().rev().fold(tail, |acc, item| Value::cons(item, acc))
}

fn combine_vector(_: &Grammar<Value>, vals: Vec<Value>) -> Value {
    let items = vals[1]
        .to_vec()
        .unwrap_or_else(|| panic!("grammar bug: DATUM_STAR did not produce a proper list"));
    Value::Vector(std::rc::Rc::new(std::cell::RefCell::new(items)))
}

fn abbreviate(keyword: &str, datum: Value) -> Value {
    Value::list(vec![Value::symbol(keyword), datum])
}

fn combine_quote(_: &Grammar<Value>, vals: Vec<Value>) -> Value { abbreviate("quote", vals[1].clone()) }
fn combine_quasiquote(_: &Grammar<Value>, vals: Vec<Value>) -> Value {
    abbreviate("quasiquote", vals[1].clone())
}
fn combine_unquote(_: &Grammar<Value>, vals: Vec<Value>) -> Value {
    abbreviate("unquote", vals[1].clone())
}
fn combine_unquote_splicing(_: &Grammar<Value>, vals: Vec<Value>) -> Value {
    abbreviate("unquote-splicing", vals[1].clone())
}

/// Builds the reader grammar once. `Interp` keeps one of these for its
/// whole lifetime.
pub fn scheme_grammar() -> Grammar<Value> {
    let mut g = Grammar::new();

    // CONSTANT is really an `any` of four categories; one label can only
    // back one combinator, so each atom gets its own label and CONSTANT
    // is their `any`.
    g.register(atomic("CONSTANT_BOOLEAN", Category::Boolean, emit_boolean));
    g.register(atomic("CONSTANT_NUMBER", Category::Number, emit_number));
    g.register(atomic("CONSTANT_CHARACTER", Category::Character, emit_character));
    g.register(atomic("CONSTANT_STRING", Category::String, emit_string));
    g.register(any(
        CONSTANT,
        &["CONSTANT_BOOLEAN", "CONSTANT_NUMBER", "CONSTANT_CHARACTER", "CONSTANT_STRING"],
    ));

    g.register(atomic(SYMBOL, Category::Identifier, emit_symbol));

    g.register(atomic("OPEN_PAREN", Category::OpenParen, ignore));
    g.register(atomic("CLOSE_PAREN", Category::CloseParen, ignore));
    g.register(atomic("OPEN_VEC_PAREN", Category::OpenVecParen, ignore));
    g.register(atomic("DOT", Category::Dot, ignore));
    g.register(atomic("SINGLE_QUOTE", Category::SingleQuote, ignore));
    g.register(atomic("QUASI_QUOTE", Category::QuasiQuote, ignore));
    g.register(atomic("UNQUOTE", Category::Unquote, ignore));
    g.register(atomic("UNQUOTE_SPLICING", Category::UnquoteSplicing, ignore));

    g.register(many0(DATUM_STAR, DATUM, |_, vals| datum_list(vals)));
    g.register(many1(DATUM_PLUS, DATUM, |_, vals| datum_list(vals)));

    g.register(seq(SIMPLE_LIST, &["OPEN_PAREN", DATUM_STAR, "CLOSE_PAREN"], combine_simple_list));
    g.register(seq(
        DOTTED_LIST,
        &["OPEN_PAREN", DATUM_PLUS, "DOT", DATUM, "CLOSE_PAREN"],
        combine_dotted_list,
    ));
    g.register(any(LIST, &[SIMPLE_LIST, DOTTED_LIST]));

    g.register(seq(VECTOR, &["OPEN_VEC_PAREN", DATUM_STAR, "CLOSE_PAREN"], combine_vector));

    g.register(seq(QUOTE_ABBR, &["SINGLE_QUOTE", DATUM], combine_quote));
    g.register(seq(QUASIQUOTE_ABBR, &["QUASI_QUOTE", DATUM], combine_quasiquote));
    g.register(seq(UNQUOTE_ABBR, &["UNQUOTE", DATUM], combine_unquote));
    g.register(seq(
        UNQUOTE_SPLICING_ABBR,
        &["UNQUOTE_SPLICING", DATUM],
        combine_unquote_splicing,
    ));
    g.register(any(
        ABBREVIATION,
        &[QUOTE_ABBR, QUASIQUOTE_ABBR, UNQUOTE_SPLICING_ABBR, UNQUOTE_ABBR],
    ));

    g.register(any(DATUM, &[CONSTANT, SYMBOL, LIST, VECTOR, ABBREVIATION]));

    g
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::common::source::Source;
    use crate::compiler::lex::Lexer;
    use crate::print::print;

    fn read(src: &str) -> Value {
        let source = Source::source(src);
        let tokens: Vec<_> = Lexer::scheme()
            .lex(&source)
            .unwrap()
            .into_iter()
            .filter(|t| !t.item.category.is_trivia())
            .collect();
        scheme_grammar().parse(&tokens, FORM, &source).unwrap()
    }

    #[test]
    fn reads_application() {
        let v = read("(+ 1 2)");
        let items = v.to_vec().unwrap();
        assert_eq!(items.len(), 3);
        assert_eq!(items[0], Value::symbol("+"));
    }

    #[test]
    fn reads_dotted_pair() {
        let v = read("(a . b)");
        assert!(!v.is_list());
        assert_eq!(print(&v), "(a . b)");
    }

    #[test]
    fn reads_vector() {
        let v = read("#(1 2 3)");
        assert!(matches!(v, Value::Vector(_)));
    }

    #[test]
    fn reads_quote_abbreviation() {
        let v = read("'(a b . c)");
        let items = v.to_vec().unwrap();
        assert_eq!(items[0], Value::symbol("quote"));
        assert_eq!(print(&items[1]), "(a b . c)");
    }

    #[test]
    fn round_trip_print() {
        for src in ["(+ 1 2)", "(a b c)", "(a . b)", "#(1 2 3)", "'x", "42", "#t", "#f"] {
            let v = read(src);
            assert_eq!(print(&v), src);
        }
    }
}
