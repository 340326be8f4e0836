//! Lexing and parsing: turns program text into [`crate::Value`] data,
//! one top-level form at a time.

pub mod grammar;
pub mod lex;
pub mod parse;
pub mod syntax;

use std::rc::Rc;

use crate::common::source::Source;
use crate::common::span::Spanned;
use crate::compiler::lex::Lexer;
use crate::compiler::parse::Grammar;
use crate::compiler::syntax::Syntax;
use crate::compiler::token::Token;
use crate::construct::value::Value;

pub mod token;

/// Lexes `source`, then drops whitespace and comment tokens (spec.md
/// §4.1: trivia filtering is the driver's job, not the lexer's).
///
/// Takes the already-built `Lexer` rather than constructing one, mirroring
/// `original_source/clex.h`'s `lexer_lex(LexerEnv *le, ...)`: the rule
/// table is compiled once, not once per call.
#[inline(always)]
pub fn lex(lexer: &Lexer, source: &Rc<Source>) -> Result<Vec<Spanned<Token>>, Syntax> {
    let tokens = lexer.lex(source)?;
    Ok(tokens.into_iter().filter(|t| !t.item.category.is_trivia()).collect())
}

/// Splits a filtered token stream into one `Vec<Spanned<Token>>` per
/// top-level form by tracking paren/bracket depth, so each can be parsed
/// (and evaluated) independently -- an error in form 2 must not prevent
/// form 1 from having already run (spec.md §6/§7).
pub fn split_forms(tokens: Vec<Spanned<Token>>) -> Vec<Vec<Spanned<Token>>> {
    use crate::compiler::token::Category;

    let mut forms = Vec::new();
    let mut current = Vec::new();
    let mut depth: i64 = 0;
    // An abbreviation prefix (`'`/`` ` ``/`,`/`,@`) never completes a datum
    // on its own -- it always has one more token to go, chained prefixes
    // included (`''x`, `` `,x ``) -- so a form may only close at depth 0
    // once the most recently pushed token was not itself a prefix.
    let mut pending_prefix = false;

    for token in tokens {
        let opens = matches!(token.item.category, Category::OpenParen | Category::OpenVecParen);
        let closes = matches!(token.item.category, Category::CloseParen);
        let is_prefix = matches!(
            token.item.category,
            Category::SingleQuote | Category::QuasiQuote | Category::Unquote | Category::UnquoteSplicing
        );
        if opens {
            depth += 1;
        }
        current.push(token);
        if closes {
            depth -= 1;
        }
        pending_prefix = is_prefix;
        if depth == 0 && !pending_prefix && !current.is_empty() {
            forms.push(std::mem::take(&mut current));
        }
    }
    if !current.is_empty() {
        forms.push(current);
    }
    forms
}

/// Parses one top-level form's tokens into a [`Value`] datum.
#[inline(always)]
pub fn parse(
    grammar: &Grammar<Value>,
    tokens: &[Spanned<Token>],
    source: &Rc<Source>,
) -> Result<Value, Syntax> {
    grammar.parse(tokens, grammar::FORM, source)
}
