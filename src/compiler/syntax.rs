use std::fmt;

use crate::common::span::Span;

/// An extra pointer into the source attached to a [`Syntax`] error, e.g.
/// "opening paren here" alongside the primary "unexpected end of input".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Note {
    pub span: Span,
    pub hint: Option<String>,
}

impl Note {
    pub fn new(span: Span) -> Note { Note { span, hint: None } }

    pub fn hinted(span: Span, hint: &str) -> Note {
        Note { span, hint: Some(hint.to_string()) }
    }
}

/// A lex or parse failure: spec.md §7's "Lex failure" / "Parse failure"
/// and the parse-time half of "Special-form misuse" (e.g. `else` used
/// outside a `cond` tail position is caught by the grammar, not the
/// evaluator).
///
/// Lexing and parsing never panic on malformed input; they return
/// `Err(Syntax)` and the caller (ultimately [`crate::Interp::eval_string`])
/// decides whether to keep going.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Syntax {
    pub reason: String,
    pub notes: Vec<Note>,
}

impl Syntax {
    pub fn error(reason: &str, span: &Span) -> Syntax {
        Syntax { reason: reason.to_string(), notes: vec![Note::new(span.clone())] }
    }

    pub fn error_with_note(reason: &str, span: &Span, hint: &str) -> Syntax {
        Syntax { reason: reason.to_string(), notes: vec![Note::hinted(span.clone(), hint)] }
    }

    pub fn error_no_note(reason: &str) -> Syntax {
        Syntax { reason: reason.to_string(), notes: vec![] }
    }

    pub fn add_note(mut self, note: Note) -> Syntax {
        self.notes.push(note);
        self
    }
}

impl fmt::Display for Syntax {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "Syntax error: {}", self.reason)?;
        for note in &self.notes {
            match &note.hint {
                Some(hint) => writeln!(f, "{}\n{}", note.span, hint)?,
                None => writeln!(f, "{}", note.span)?,
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::common::source::Source;

    #[test]
    fn error() {
        let source = Source::source("(+ 1 2");
        let span = Span::point(&source, 7);
        let syntax = Syntax::error("Unexpected end of input while parsing a list", &span);
        assert_eq!(syntax.reason, "Unexpected end of input while parsing a list");
        assert_eq!(syntax.notes.len(), 1);
    }
}
