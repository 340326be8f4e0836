use std::rc::Rc;

use regex::Regex;

use crate::common::source::Source;
use crate::common::span::{Span, Spanned};
use crate::compiler::syntax::Syntax;
use crate::compiler::token::{Category, Token};

/// One `(category, pattern)` entry. Patterns are anchored at the start of
/// the remaining input (spec.md §4.1: "anchored at offset 0"); the first
/// rule in the table whose pattern matches a non-empty prefix wins.
struct LexerRule {
    category: Category,
    regex: Regex,
}

impl LexerRule {
    fn new(category: Category, pattern: &str) -> LexerRule {
        let anchored = format!("^(?:{})", pattern);
        let regex = Regex::new(&anchored)
            .unwrap_or_else(|e| panic!("invalid built-in lexer pattern {:?}: {}", pattern, e));
        LexerRule { category, regex }
    }
}

/// Regex-table-driven lexer. Construction order of the rule table is part
/// of the contract (see each rule's comment below); the table itself is
/// built once, in [`Lexer::scheme`].
pub struct Lexer {
    rules: Vec<LexerRule>,
}

impl Lexer {
    /// The lexer for this Scheme subset, with rules in the order
    /// `original_source/cscheme.h`'s `scheme_env_make` registers them.
    pub fn scheme() -> Lexer {
        let rules = vec![
            LexerRule::new(Category::Whitespace, r"[ \t\r\n]+"),
            // #t / #f must precede the general IDENTIFIER rule, else `t`
            // and `f` read as one-character identifiers and the `#` is
            // left dangling.
            LexerRule::new(Category::Boolean, r"#t"),
            LexerRule::new(Category::Boolean, r"#f"),
            LexerRule::new(Category::Comment, r";[^\n]*"),
            // `#!optional`/`#!rest` formals markers (spec.md §4.4) must
            // precede CHARACTER, whose `#\.` rule would otherwise never
            // fire here anyway (different second character) but which
            // sits in the same `#`-prefixed family of rules.
            LexerRule::new(Category::Identifier, r"#!optional|#!rest"),
            // NUMBER must precede the bare operator identifiers `+`, `-`,
            // `...` (spec.md §6's declared order): `-5` has to lex whole as
            // a negative literal, not as `-` followed by `5`. A lone `-`
            // still falls through to the identifier rule below, since
            // NUMBER requires at least one digit after the optional sign.
            LexerRule::new(Category::Number, r"-?[0-9]+"),
            LexerRule::new(Category::Identifier, r"\+|-|\.\.\."),
            // #\newline and #\space are named characters; anything else
            // after #\ is a single literal character.
            LexerRule::new(Category::Character, r"#\\newline"),
            LexerRule::new(Category::Character, r"#\\space"),
            LexerRule::new(Category::Character, r"#\\."),
            LexerRule::new(Category::String, r#""(\\.|[^"\\])*""#),
            // #( must precede plain (, else `#` is left unconsumed.
            LexerRule::new(Category::OpenVecParen, r"#\("),
            LexerRule::new(Category::OpenParen, r"\("),
            LexerRule::new(Category::CloseParen, r"\)"),
            LexerRule::new(Category::Dot, r"\."),
            LexerRule::new(Category::SingleQuote, r"'"),
            LexerRule::new(Category::QuasiQuote, "`"),
            // ,@ must precede plain , for the same reason #( precedes (.
            LexerRule::new(Category::UnquoteSplicing, r",@"),
            LexerRule::new(Category::Unquote, r","),
            LexerRule::new(
                Category::Identifier,
                r"[a-zA-Z!$%&*/:<=>?^_~][a-zA-Z0-9!$%&*/:<=>?^_~+\-.@]*",
            ),
        ];
        Lexer { rules }
    }

    /// Lexes the entire source into a token stream, including whitespace
    /// and comment tokens. Callers that want a parseable stream should run
    /// it through [`crate::compiler::lex`] first, which filters trivia.
    ///
    /// Returns `Err` on the first position no rule accepts; per spec.md
    /// §4.1/§7 this never panics and releases no partial state the caller
    /// needs to clean up (the `Vec` built so far is simply dropped).
    pub fn lex(&self, source: &Rc<Source>) -> Result<Vec<Spanned<Token>>, Syntax> {
        let mut tokens = Vec::new();
        let mut offset = 0;

        while offset < source.contents.len() {
            let remaining = &source.contents[offset..];
            let found = self.rules.iter().find_map(|rule| {
                rule.regex.find(remaining).filter(|m| m.end() > 0).map(|m| (rule.category, m.end()))
            });

            match found {
                Some((category, len)) => {
                    let lexeme = &remaining[..len];
                    let span = Span::new(source, offset, len);
                    tokens.push(Spanned::new(Token::new(category, lexeme), span));
                    offset += len;
                },
                None => {
                    let span = Span::point(source, offset);
                    return Err(Syntax::error(
                        &format!(
                            "Unrecognized input starting with {:?}",
                            remaining.chars().next().unwrap()
                        ),
                        &span,
                    ));
                },
            }
        }

        Ok(tokens)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn categories(src: &str) -> Vec<Category> {
        let source = Source::source(src);
        Lexer::scheme().lex(&source).unwrap().into_iter().map(|t| t.item.category).collect()
    }

    #[test]
    fn simple_application() {
        use Category::*;
        assert_eq!(
            categories("(+ 1 2)"),
            vec![OpenParen, Identifier, Whitespace, Number, Whitespace, Number, CloseParen]
        );
    }

    #[test]
    fn booleans_before_identifiers() {
        use Category::*;
        assert_eq!(categories("#t"), vec![Boolean]);
        assert_eq!(categories("#f"), vec![Boolean]);
    }

    #[test]
    fn vector_open_before_plain_open() {
        use Category::*;
        assert_eq!(categories("#(1 2)"), vec![OpenVecParen, Number, Whitespace, Number, CloseParen]);
    }

    #[test]
    fn unquote_splicing_before_unquote() {
        use Category::*;
        assert_eq!(categories(",@x"), vec![UnquoteSplicing, Identifier]);
        assert_eq!(categories(",x"), vec![Unquote, Identifier]);
    }

    #[test]
    fn characters() {
        use Category::*;
        assert_eq!(categories(r"#\newline"), vec![Character]);
        assert_eq!(categories(r"#\space"), vec![Character]);
        assert_eq!(categories(r"#\a"), vec![Character]);
    }

    #[test]
    fn unrecognized_input_errs() {
        let source = Source::source("(+ 1 @@@)");
        assert!(Lexer::scheme().lex(&source).is_err());
    }

    #[test]
    fn optional_and_rest_markers() {
        use Category::*;
        assert_eq!(categories("#!optional"), vec![Identifier]);
        assert_eq!(categories("#!rest"), vec![Identifier]);
    }

    #[test]
    fn dotted_pair_tokens() {
        use Category::*;
        assert_eq!(
            categories("(a . b)"),
            vec![OpenParen, Identifier, Whitespace, Dot, Whitespace, Identifier, CloseParen]
        );
    }
}
